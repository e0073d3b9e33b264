//! Logical frameworks and the composable validation pipeline.

use crate::logic::{Operator, Proposition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A law a framework may enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Law {
    ExcludedMiddle,
    NonContradiction,
    Identity,
    ModalConsistency,
}

impl Law {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExcludedMiddle => "excluded_middle",
            Self::NonContradiction => "non_contradiction",
            Self::Identity => "identity",
            Self::ModalConsistency => "modal_consistency",
        }
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of framework semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkKind {
    Classical,
    Paraconsistent,
    Modal,
}

/// A named bundle of semantic rules: declared capabilities (requirement tags
/// it satisfies), declared incompatibilities, and the laws it enforces.
///
/// Framework instances are immutable after registration; selection and
/// validation never mutate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    id: String,
    kind: FrameworkKind,
    features: BTreeSet<String>,
    conflicts: BTreeSet<String>,
    laws: BTreeSet<Law>,
}

impl Framework {
    pub fn new(
        id: impl Into<String>,
        kind: FrameworkKind,
        features: impl IntoIterator<Item = String>,
        conflicts: impl IntoIterator<Item = String>,
        laws: impl IntoIterator<Item = Law>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            features: features.into_iter().collect(),
            conflicts: conflicts.into_iter().collect(),
            laws: laws.into_iter().collect(),
        }
    }

    /// Classical propositional logic: every proposition is true or false, and
    /// never both.
    pub fn classical() -> Self {
        Self::new(
            "classical",
            FrameworkKind::Classical,
            ["propositional".to_string(), "classical".to_string()],
            ["paraconsistent".to_string()],
            [Law::ExcludedMiddle, Law::NonContradiction, Law::Identity],
        )
    }

    /// Contradiction-tolerant variant: contradictions are flagged and
    /// recorded rather than rejected.
    pub fn paraconsistent() -> Self {
        Self::new(
            "paraconsistent",
            FrameworkKind::Paraconsistent,
            [
                "propositional".to_string(),
                "contradiction-tolerant".to_string(),
            ],
            ["classical".to_string()],
            [Law::ExcludedMiddle, Law::Identity],
        )
    }

    /// Classical semantics extended with modal accessibility reasoning.
    pub fn modal() -> Self {
        Self::new(
            "modal",
            FrameworkKind::Modal,
            [
                "propositional".to_string(),
                "classical".to_string(),
                "modal".to_string(),
                "accessibility".to_string(),
            ],
            [],
            [
                Law::ExcludedMiddle,
                Law::NonContradiction,
                Law::Identity,
                Law::ModalConsistency,
            ],
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> FrameworkKind {
        self.kind
    }

    pub fn laws(&self) -> &BTreeSet<Law> {
        &self.laws
    }

    pub fn features(&self) -> &BTreeSet<String> {
        &self.features
    }

    pub fn conflicts(&self) -> &BTreeSet<String> {
        &self.conflicts
    }

    pub fn enforces(&self, law: Law) -> bool {
        self.laws.contains(&law)
    }

    pub fn satisfies(&self, tag: &str) -> bool {
        self.features.contains(tag)
    }

    pub fn tolerates_contradiction(&self) -> bool {
        !self.enforces(Law::NonContradiction)
    }

    /// Whether two frameworks can be applied simultaneously.
    pub fn is_compatible(&self, other: &Framework) -> bool {
        !self.conflicts.contains(other.id()) && !other.conflicts.contains(self.id())
    }
}

/// One stage of the validation pipeline. Strategies always run in the
/// declared order so diagnostics are reproducible across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStrategy {
    Syntactic,
    Consistency,
    FrameworkLaws,
}

impl ValidationStrategy {
    pub const PIPELINE: [ValidationStrategy; 3] =
        [Self::Syntactic, Self::Consistency, Self::FrameworkLaws];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntactic => "syntactic",
            Self::Consistency => "consistency",
            Self::FrameworkLaws => "framework_laws",
        }
    }
}

/// A single violated-law diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawViolation {
    pub strategy: ValidationStrategy,
    pub law: Option<Law>,
    pub message: String,
}

/// Outcome of running the full validation pipeline over one proposition.
///
/// Every proposition receives a complete report: strategies append
/// diagnostics, they never abort the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violations: Vec<LawViolation>,
    /// Contradictions accepted under a contradiction-tolerant framework.
    pub flags: Vec<String>,
}

impl ValidationResult {
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }
}

/// Orchestrates the fixed strategy pipeline for one framework.
#[derive(Debug, Clone)]
pub struct Validator {
    framework: Framework,
}

impl Validator {
    /// Maximum proposition nesting depth accepted as well-formed.
    pub const MAX_DEPTH: usize = 64;

    pub fn new(framework: Framework) -> Self {
        Self { framework }
    }

    pub fn framework(&self) -> &Framework {
        &self.framework
    }

    /// Run the pipeline (syntactic, then consistency, then framework laws)
    /// over `proposition` against the already-established `context`.
    pub fn validate(
        &self,
        proposition: &Proposition,
        context: &[&Proposition],
    ) -> ValidationResult {
        let mut result = ValidationResult::default();
        for strategy in ValidationStrategy::PIPELINE {
            match strategy {
                ValidationStrategy::Syntactic => self.check_syntactic(proposition, &mut result),
                ValidationStrategy::Consistency => {
                    self.check_consistency(proposition, context, &mut result)
                }
                ValidationStrategy::FrameworkLaws => self.check_laws(proposition, &mut result),
            }
        }
        result.is_valid = result.violations.is_empty();
        result
    }

    fn check_syntactic(&self, proposition: &Proposition, result: &mut ValidationResult) {
        if let Some(symbol) = proposition.symbol() {
            if symbol.is_empty() {
                result.violations.push(LawViolation {
                    strategy: ValidationStrategy::Syntactic,
                    law: None,
                    message: "proposition symbol is empty".to_string(),
                });
            }
        }
        let depth = proposition.depth();
        if depth > Self::MAX_DEPTH {
            result.violations.push(LawViolation {
                strategy: ValidationStrategy::Syntactic,
                law: None,
                message: format!(
                    "nesting depth {} exceeds maximum {}",
                    depth,
                    Self::MAX_DEPTH
                ),
            });
        }
    }

    /// The candidate and its negation both established is a contradiction:
    /// a violation under non-contradiction frameworks, a flagged-but-accepted
    /// contradiction under tolerant ones.
    fn check_consistency(
        &self,
        proposition: &Proposition,
        context: &[&Proposition],
        result: &mut ValidationResult,
    ) {
        let contradicts = match proposition {
            Proposition::Compound { operator: Operator::Not, operands }
                if operands.len() == 1 =>
            {
                context.iter().any(|p| **p == operands[0])
            }
            _ => {
                let negation = proposition.negated();
                context.iter().any(|p| **p == negation)
            }
        };
        if !contradicts {
            return;
        }
        let message = format!(
            "'{}' contradicts an established proposition",
            proposition.render()
        );
        if self.framework.tolerates_contradiction() {
            result.flags.push(message);
        } else {
            result.violations.push(LawViolation {
                strategy: ValidationStrategy::Consistency,
                law: Some(Law::NonContradiction),
                message,
            });
        }
    }

    /// Framework-specific law checking: a conjunction containing both some
    /// operand and its negation violates non-contradiction on its own.
    fn check_laws(&self, proposition: &Proposition, result: &mut ValidationResult) {
        let Some(message) = internal_contradiction(proposition) else {
            return;
        };
        if self.framework.tolerates_contradiction() {
            result.flags.push(message);
        } else {
            result.violations.push(LawViolation {
                strategy: ValidationStrategy::FrameworkLaws,
                law: Some(Law::NonContradiction),
                message,
            });
        }
    }
}

/// Find a conjunction that contains both some component and its structural
/// negation, anywhere in the proposition tree.
fn internal_contradiction(proposition: &Proposition) -> Option<String> {
    if let Proposition::Compound { operator, operands } = proposition {
        if operator.is_conjunction() {
            for operand in operands {
                let negation = operand.negated();
                if operands.iter().any(|other| *other == negation) {
                    return Some(format!(
                        "contradiction found: conjunction of {} and {}",
                        operand.render(),
                        negation.render()
                    ));
                }
            }
        }
        for operand in operands {
            if let Some(message) = internal_contradiction(operand) {
                return Some(message);
            }
        }
    }
    None
}
