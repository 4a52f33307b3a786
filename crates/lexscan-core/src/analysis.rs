use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::DocumentReference;
use crate::error::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Summary,
    KeyClauses,
    Risks,
}

impl AnalysisKind {
    /// Report order.
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::Summary,
        AnalysisKind::KeyClauses,
        AnalysisKind::Risks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnalysisKind::Summary => "summary",
            AnalysisKind::KeyClauses => "key_clauses",
            AnalysisKind::Risks => "risks",
        }
    }

    /// Deduplicate a selection and put it in report order.
    pub fn in_report_order(selected: &[AnalysisKind]) -> Vec<AnalysisKind> {
        AnalysisKind::ALL
            .into_iter()
            .filter(|kind| selected.contains(kind))
            .collect()
    }

    pub fn header(self) -> &'static str {
        match self {
            AnalysisKind::Summary => "SUMMARY",
            AnalysisKind::KeyClauses => "KEY CLAUSES",
            AnalysisKind::Risks => "RISKS / UNUSUAL TERMS",
        }
    }

    pub fn prompt(self, contract_text: &str) -> String {
        let instruction = match self {
            AnalysisKind::Summary => "Summarize the following legal contract in bullet points:",
            AnalysisKind::KeyClauses => {
                "Extract all important legal clauses and their purposes from this contract:"
            }
            AnalysisKind::Risks => {
                "Identify any potential risks or unusual terms in this contract and explain them clearly:"
            }
        };
        format!("{instruction}\n\n{contract_text}")
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisKind {
    type Err = LexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| {
                LexError::InvalidInput(format!(
                    "unknown analysis '{s}' (expected summary, key_clauses or risks)"
                ))
            })
    }
}

/// Generated text per analysis; sections that were not requested stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clauses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risks: Option<String>,
}

impl AnalysisSections {
    pub fn get(&self, kind: AnalysisKind) -> Option<&str> {
        match kind {
            AnalysisKind::Summary => self.summary.as_deref(),
            AnalysisKind::KeyClauses => self.clauses.as_deref(),
            AnalysisKind::Risks => self.risks.as_deref(),
        }
    }

    pub fn set(&mut self, kind: AnalysisKind, text: String) {
        match kind {
            AnalysisKind::Summary => self.summary = Some(text),
            AnalysisKind::KeyClauses => self.clauses = Some(text),
            AnalysisKind::Risks => self.risks = Some(text),
        }
    }

    /// Plain-text report: each present section is its header, the generated text, then a blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for kind in AnalysisKind::ALL {
            if let Some(text) = self.get(kind) {
                out.push_str(kind.header());
                out.push('\n');
                out.push_str(text);
                out.push_str("\n\n");
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub document: Option<DocumentReference>,
    pub extracted_text: String,
    pub sections: AnalysisSections,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn render(&self) -> String {
        self.sections.render()
    }
}
