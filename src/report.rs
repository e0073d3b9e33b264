//! Per-statement execution reports and deterministic content hashing.

use crate::executor::StepRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Three-valued query answer. `Unknown` means the name is defined but not
/// established in any proof context; it is never collapsed into `False`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruthValue {
    True,
    False,
    Unknown,
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    RuleDefinition,
    AxiomDefinition,
    PropositionDefinition,
    Assertion,
    Proof,
    Query,
    Symbolize,
    Pragma,
}

/// The structured outcome of executing one statement.
///
/// Reports are append-only records: the interpreter produces one per
/// statement, in program order, and never rewrites earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementReport {
    pub kind: StatementKind,
    /// The defined or queried name, where the statement has one.
    pub subject: Option<String>,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
    /// Tolerated contradictions and other non-fatal notices.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truth: Option<TruthValue>,
    /// Symbolic rendering, for SYMBOLIZE and successful proofs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation_hash: Option<String>,
}

impl StatementReport {
    pub fn new(kind: StatementKind, subject: Option<String>) -> Self {
        Self {
            kind,
            subject,
            success: true,
            message: String::new(),
            diagnostics: Vec::new(),
            flags: Vec::new(),
            truth: None,
            rendered: None,
            history: Vec::new(),
            derivation_hash: None,
        }
    }

    pub fn success(kind: StatementKind, subject: Option<String>, message: impl Into<String>) -> Self {
        let mut report = Self::new(kind, subject);
        report.message = message.into();
        report
    }

    pub fn failure(kind: StatementKind, subject: Option<String>, message: impl Into<String>) -> Self {
        let mut report = Self::new(kind, subject);
        report.success = false;
        report.message = message.into();
        report
    }
}

/// Compute a deterministic content-addressable hash for a derivation record.
pub fn compute_content_hash(obj: &serde_json::Value) -> String {
    // Compact serialization with sorted keys for determinism
    let serialized = canonical_json(obj);
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Produce canonical JSON with deterministic key ordering.
fn canonical_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            let pairs: Vec<String> = keys
                .into_iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).unwrap_or_default(),
                        canonical_json(&map[k])
                    )
                })
                .collect();
            format!("{{{}}}", pairs.join(","))
        }
        serde_json::Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        _ => serde_json::to_string(value).unwrap_or_else(|_| "null".to_string()),
    }
}
