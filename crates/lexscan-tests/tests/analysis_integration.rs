use std::sync::Arc;

use lexscan_analysis::{write_artifacts, ANALYSIS_FILE, EXTRACTED_TEXT_FILE};
use lexscan_core::analysis::AnalysisKind;
use lexscan_core::document::DocumentReference;
use lexscan_core::error::LexError;
use lexscan_core::ocr::TextBlock;
use lexscan_tests::{
    analyzer, failed, succeeded, EchoGenerator, MemoryObjectStore, OcrCall, ScriptedOcrService,
    BUCKET,
};

fn two_page_ocr() -> ScriptedOcrService {
    ScriptedOcrService::new(vec![succeeded(
        vec![TextBlock::line("MASTER SERVICES AGREEMENT"), TextBlock::word("MASTER")],
        Some("T1"),
    )])
    .with_page(
        "T1",
        succeeded(vec![TextBlock::line("Term: twelve months.")], None),
    )
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_stores_bytes_under_prefix() {
    let store = Arc::new(MemoryObjectStore::default());
    let analyzer = analyzer(
        store.clone(),
        Arc::new(ScriptedOcrService::new(vec![])),
        Arc::new(EchoGenerator::default()),
    );

    let reference = analyzer.upload("msa.pdf", b"%PDF".to_vec()).await.unwrap();

    assert_eq!(reference, DocumentReference::new(BUCKET, "uploads/msa.pdf"));
    assert_eq!(store.contents(&reference), Some(b"%PDF".to_vec()));
}

#[tokio::test]
async fn upload_rejects_empty_bodies_and_path_names() {
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        Arc::new(ScriptedOcrService::new(vec![])),
        Arc::new(EchoGenerator::default()),
    );

    let empty = analyzer.upload("msa.pdf", Vec::new()).await.unwrap_err();
    assert!(matches!(empty, LexError::InvalidInput(_)));

    let traversal = analyzer
        .upload("../secrets.pdf", b"x".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(traversal, LexError::InvalidInput(_)));
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_text_runs_three_prompts_in_report_order() {
    let generator = Arc::new(EchoGenerator::default());
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        Arc::new(ScriptedOcrService::new(vec![])),
        generator.clone(),
    );

    let sections = analyzer
        .analyze_text("The tenant shall pay rent.", &AnalysisKind::ALL)
        .await
        .unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 3);
    for (prompt, kind) in prompts.iter().zip(AnalysisKind::ALL) {
        assert_eq!(prompt, &kind.prompt("The tenant shall pay rent."));
    }
    assert!(sections.get(AnalysisKind::Summary).unwrap().starts_with("echo: Summarize"));
    assert!(sections.get(AnalysisKind::KeyClauses).unwrap().starts_with("echo: Extract"));
    assert!(sections.get(AnalysisKind::Risks).unwrap().starts_with("echo: Identify"));
}

#[tokio::test]
async fn analyze_text_runs_only_selected_kinds() {
    let generator = Arc::new(EchoGenerator::default());
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        Arc::new(ScriptedOcrService::new(vec![])),
        generator.clone(),
    );

    let sections = analyzer
        .analyze_text("text", &[AnalysisKind::Risks, AnalysisKind::Summary])
        .await
        .unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].starts_with("Summarize"));
    assert!(prompts[1].starts_with("Identify"));
    assert!(sections.clauses.is_none());

    let rendered = sections.render();
    assert!(rendered.starts_with("SUMMARY\n"));
    assert!(!rendered.contains("KEY CLAUSES"));
    assert!(rendered.contains("RISKS / UNUSUAL TERMS\n"));
}

#[tokio::test]
async fn empty_selection_is_rejected_without_generation() {
    let generator = Arc::new(EchoGenerator::default());
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        Arc::new(ScriptedOcrService::new(vec![])),
        generator.clone(),
    );

    let err = analyzer.analyze_text("text", &[]).await.unwrap_err();

    assert!(matches!(err, LexError::InvalidInput(_)));
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn process_upload_runs_the_full_pipeline() {
    let store = Arc::new(MemoryObjectStore::default());
    let ocr = Arc::new(two_page_ocr());
    let generator = Arc::new(EchoGenerator::default());
    let analyzer = analyzer(store, ocr.clone(), generator.clone());

    let report = analyzer
        .process_upload("msa.pdf", b"%PDF-1.7".to_vec(), &AnalysisKind::ALL)
        .await
        .unwrap();

    assert_eq!(
        report.extracted_text,
        "MASTER SERVICES AGREEMENT\nTerm: twelve months.\n"
    );
    assert_eq!(
        report.document,
        Some(DocumentReference::new(BUCKET, "uploads/msa.pdf"))
    );
    assert_eq!(
        ocr.calls()[0],
        OcrCall::Submit(DocumentReference::new(BUCKET, "uploads/msa.pdf"))
    );
    for prompt in generator.prompts() {
        assert!(prompt.ends_with("MASTER SERVICES AGREEMENT\nTerm: twelve months.\n"));
    }

    let rendered = report.render();
    assert!(rendered.starts_with("SUMMARY\necho: Summarize"));
    assert!(rendered.contains("\n\nKEY CLAUSES\necho: Extract"));
    assert!(rendered.contains("\n\nRISKS / UNUSUAL TERMS\necho: Identify"));
    assert!(rendered.ends_with("\n\n"));
}

#[tokio::test]
async fn failed_ocr_skips_generation() {
    let generator = Arc::new(EchoGenerator::default());
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        Arc::new(ScriptedOcrService::new(vec![failed("bad scan")])),
        generator.clone(),
    );

    let err = analyzer
        .process_upload("scan.png", b"png".to_vec(), &AnalysisKind::ALL)
        .await
        .unwrap_err();

    assert!(matches!(err, LexError::JobFailed { .. }));
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn generation_errors_surface_and_stop_remaining_sections() {
    let generator = Arc::new(EchoGenerator::failing("throttled"));
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        Arc::new(ScriptedOcrService::new(vec![])),
        generator.clone(),
    );

    let err = analyzer
        .analyze_text("text", &AnalysisKind::ALL)
        .await
        .unwrap_err();

    assert!(matches!(err, LexError::Generation(ref m) if m == "throttled"));
    assert_eq!(generator.prompts().len(), 1);
}

#[tokio::test]
async fn analyze_key_in_bucket_uses_key_verbatim() {
    let reference = DocumentReference::new(BUCKET, "contract.pdf");
    let ocr = Arc::new(ScriptedOcrService::new(vec![succeeded(
        vec![TextBlock::line("Clause 1")],
        None,
    )]));
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::with_objects(&[reference.clone()])),
        ocr,
        Arc::new(EchoGenerator::default()),
    );

    let resolved = analyzer.reference_for_key("contract.pdf").unwrap();
    assert_eq!(resolved, reference);

    let text = analyzer.extract(&resolved).await.unwrap();
    assert_eq!(text, "Clause 1\n");
}

#[tokio::test]
async fn uploaded_file_name_resolves_to_the_uploaded_object() {
    let ocr = Arc::new(ScriptedOcrService::new(vec![succeeded(
        vec![TextBlock::line("Clause 1")],
        None,
    )]));
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        ocr.clone(),
        Arc::new(EchoGenerator::default()),
    );

    let uploaded = analyzer
        .upload("contract.pdf", b"%PDF".to_vec())
        .await
        .unwrap();
    let resolved = analyzer.resolve("contract.pdf").unwrap();

    assert_eq!(resolved, uploaded);
    assert_eq!(analyzer.extract(&resolved).await.unwrap(), "Clause 1\n");
    assert_eq!(ocr.calls()[0], OcrCall::Submit(uploaded));
}

#[test]
fn resolve_keeps_keys_and_references_verbatim() {
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        Arc::new(ScriptedOcrService::new(vec![])),
        Arc::new(EchoGenerator::default()),
    );

    assert_eq!(
        analyzer.resolve("archive/2023/msa.pdf").unwrap(),
        DocumentReference::new(BUCKET, "archive/2023/msa.pdf")
    );
    assert_eq!(
        analyzer.resolve("s3://other-bucket/msa#2.pdf").unwrap(),
        DocumentReference::new("other-bucket", "msa#2.pdf")
    );
    assert!(analyzer.resolve("  ").is_err());
}

// ---------------------------------------------------------------------------
// Plain-text documents
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plain_text_upload_skips_ocr() {
    let ocr = Arc::new(ScriptedOcrService::new(vec![]));
    let generator = Arc::new(EchoGenerator::default());
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        ocr.clone(),
        generator.clone(),
    );

    let report = analyzer
        .process_upload(
            "lease.txt",
            b"The tenant shall pay rent.\n".to_vec(),
            &[AnalysisKind::Summary],
        )
        .await
        .unwrap();

    assert_eq!(report.extracted_text, "The tenant shall pay rent.\n");
    assert_eq!(
        report.document,
        Some(DocumentReference::new(BUCKET, "uploads/lease.txt"))
    );
    assert!(ocr.calls().is_empty());
    assert_eq!(
        generator.prompts(),
        vec![AnalysisKind::Summary.prompt("The tenant shall pay rent.\n")]
    );
}

#[tokio::test]
async fn plain_text_must_be_utf8_and_present() {
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        Arc::new(ScriptedOcrService::new(vec![])),
        Arc::new(EchoGenerator::default()),
    );

    let binary = analyzer
        .upload("garbled.txt", vec![0xff, 0xfe, 0x00])
        .await
        .unwrap();
    let err = analyzer.extract(&binary).await.unwrap_err();
    assert!(matches!(err, LexError::InvalidInput(_)));

    let missing = DocumentReference::new(BUCKET, "uploads/missing.txt");
    let err = analyzer.extract(&missing).await.unwrap_err();
    assert!(matches!(err, LexError::ReferenceNotFound { .. }));
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn write_artifacts_saves_text_and_report() {
    let analyzer = analyzer(
        Arc::new(MemoryObjectStore::default()),
        Arc::new(two_page_ocr()),
        Arc::new(EchoGenerator::default()),
    );
    let report = analyzer
        .process_upload("msa.pdf", b"%PDF".to_vec(), &AnalysisKind::ALL)
        .await
        .unwrap();

    let dir = std::env::temp_dir().join(format!("lexscan-test-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();

    write_artifacts(&dir, &report).await.unwrap();

    let text = tokio::fs::read_to_string(dir.join(EXTRACTED_TEXT_FILE))
        .await
        .unwrap();
    let rendered = tokio::fs::read_to_string(dir.join(ANALYSIS_FILE))
        .await
        .unwrap();
    assert_eq!(text, report.extracted_text);
    assert_eq!(rendered, report.render());

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
