//! Natural-language collaborator boundary.
//!
//! The interpreter talks to natural-language analysis only through the
//! [`NlpBridge`] trait, so the pattern-based implementation here can be
//! swapped for a real language model without touching the proof pipeline.

use crate::error::{FallError, FallResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Grammatical structure extracted from one declarative sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceStructure {
    pub subject: String,
    pub predicate: String,
    pub copula: String,
    pub quantifier: Option<String>,
}

/// Anything that can decompose a sentence into grammatical parts.
pub trait NlpBridge: Send + Sync {
    fn extract_structure(&self, sentence: &str) -> FallResult<SentenceStructure>;
}

/// Regex-driven bridge for simple copular sentences such as
/// "Socrates is a man" or "All men are mortal".
#[derive(Debug, Default, Clone)]
pub struct PatternBridge;

static COPULAR: OnceLock<Regex> = OnceLock::new();

fn copular_pattern() -> &'static Regex {
    COPULAR.get_or_init(|| {
        Regex::new(r"^(?:(All|Some|No|Every)\s+)?(.+?)\s+(is|are)\s+(?:an?\s+)?(.+?)\.?$")
            .expect("valid regex")
    })
}

impl NlpBridge for PatternBridge {
    fn extract_structure(&self, sentence: &str) -> FallResult<SentenceStructure> {
        let trimmed = sentence.trim();
        let captures = copular_pattern().captures(trimmed).ok_or_else(|| {
            FallError::Validation {
                field: "sentence".to_string(),
                message: format!("no grammatical structure recognized in '{}'", trimmed),
            }
        })?;
        let group = |i: usize| {
            captures
                .get(i)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };
        Ok(SentenceStructure {
            quantifier: captures.get(1).map(|m| m.as_str().to_string()),
            subject: group(2),
            copula: group(3),
            predicate: group(4),
        })
    }
}
