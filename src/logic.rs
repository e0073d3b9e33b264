//! Core logic types for FALL: operators, propositions, evaluation.

use crate::error::{FallError, FallResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Logic-type tag carried by every logical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicKind {
    Proposition,
    Operator,
    Symbol,
    Term,
}

/// Arity class of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Unary,
    Binary,
    /// One or more operands.
    Variadic,
}

impl Arity {
    pub fn accepts(&self, operand_count: usize) -> bool {
        match self {
            Self::Unary => operand_count == 1,
            Self::Binary => operand_count == 2,
            Self::Variadic => operand_count >= 1,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Unary => "exactly 1",
            Self::Binary => "exactly 2",
            Self::Variadic => "1 or more",
        }
    }
}

/// Boolean operator set.
///
/// Operators are immutable and looked up from the registry by name; evaluation
/// code never synthesizes new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Not,
    And,
    Or,
    Implies,
    Xor,
    Nand,
    Nor,
    Iff,
    AndN,
    OrN,
    NandN,
    NorN,
}

impl Operator {
    pub const ALL: [Operator; 12] = [
        Self::Not,
        Self::And,
        Self::Or,
        Self::Implies,
        Self::Xor,
        Self::Nand,
        Self::Nor,
        Self::Iff,
        Self::AndN,
        Self::OrN,
        Self::NandN,
        Self::NorN,
    ];

    /// Upper-case registry lookup key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Not => "NOT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Implies => "IMPLIES",
            Self::Xor => "XOR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Iff => "IFF",
            Self::AndN => "ANDN",
            Self::OrN => "ORN",
            Self::NandN => "NANDN",
            Self::NorN => "NORN",
        }
    }

    /// Canonical logical symbol used by SYMBOLIZE rendering.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Not => "¬",
            Self::And | Self::AndN => "∧",
            Self::Or | Self::OrN => "∨",
            Self::Implies => "→",
            Self::Xor => "⊕",
            Self::Nand | Self::NandN => "↑",
            Self::Nor | Self::NorN => "↓",
            Self::Iff => "↔",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Self::Not => Arity::Unary,
            Self::And | Self::Or | Self::Implies | Self::Xor | Self::Nand | Self::Nor
            | Self::Iff => Arity::Binary,
            Self::AndN | Self::OrN | Self::NandN | Self::NorN => Arity::Variadic,
        }
    }

    pub fn logic_kind(&self) -> LogicKind {
        LogicKind::Operator
    }

    /// Truth-functional application over already-evaluated operand values.
    ///
    /// Callers check operand count against [`Operator::arity`] first;
    /// [`Proposition::evaluate`] does so before delegating here.
    pub(crate) fn apply(&self, operands: &[bool]) -> bool {
        match self {
            Self::Not => !operands[0],
            Self::And => operands[0] && operands[1],
            Self::Or => operands[0] || operands[1],
            Self::Implies => !operands[0] || operands[1],
            Self::Xor => operands[0] != operands[1],
            Self::Nand => !(operands[0] && operands[1]),
            Self::Nor => !(operands[0] || operands[1]),
            Self::Iff => operands[0] == operands[1],
            Self::AndN => operands.iter().all(|v| *v),
            Self::OrN => operands.iter().any(|v| *v),
            Self::NandN => !operands.iter().all(|v| *v),
            Self::NorN => !operands.iter().any(|v| *v),
        }
    }

    /// Whether this operator is a (binary or variadic) conjunction.
    pub fn is_conjunction(&self) -> bool {
        matches!(self, Self::And | Self::AndN)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Evaluation context mapping free symbols to truth values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalContext {
    bindings: HashMap<String, bool>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, symbol: impl Into<String>, value: bool) -> &mut Self {
        self.bindings.insert(symbol.into(), value);
        self
    }

    pub fn lookup(&self, symbol: &str) -> Option<bool> {
        self.bindings.get(symbol).copied()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for EvalContext {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().map(|(s, v)| (s.into(), v)).collect(),
        }
    }
}

type NumericFn = Arc<dyn Fn() -> f64 + Send + Sync>;

/// A named, deferred numeric computation with a memoized result.
///
/// The wrapped computation is assumed pure; the cache is invalidated only by
/// constructing a new instance. Identity (equality and hash) is the symbol.
#[derive(Clone)]
pub struct NumericProposition {
    symbol: String,
    computation: NumericFn,
    cache: Arc<OnceLock<u64>>,
}

impl NumericProposition {
    pub fn new(
        symbol: impl Into<String>,
        computation: impl Fn() -> f64 + Send + Sync + 'static,
    ) -> FallResult<Self> {
        let symbol = symbol.into().trim().to_string();
        if symbol.is_empty() {
            return Err(FallError::Validation {
                field: "symbol".to_string(),
                message: "numeric proposition symbol cannot be empty".to_string(),
            });
        }
        Ok(Self {
            symbol,
            computation: Arc::new(computation),
            cache: Arc::new(OnceLock::new()),
        })
    }

    pub fn constant(symbol: impl Into<String>, value: f64) -> FallResult<Self> {
        Self::new(symbol, move || value)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Force the computation, memoizing the result for all later calls.
    pub fn value(&self) -> f64 {
        f64::from_bits(*self.cache.get_or_init(|| (self.computation)().to_bits()))
    }

    pub fn is_evaluated(&self) -> bool {
        self.cache.get().is_some()
    }

    fn combine(&self, other: &Self, op: char, f: fn(f64, f64) -> f64) -> FallResult<Self> {
        let (a, b) = (self.clone(), other.clone());
        Self::new(format!("({}{}{})", self.symbol, op, other.symbol), move || {
            f(a.value(), b.value())
        })
    }

    pub fn add(&self, other: &Self) -> FallResult<Self> {
        self.combine(other, '+', |a, b| a + b)
    }

    pub fn sub(&self, other: &Self) -> FallResult<Self> {
        self.combine(other, '-', |a, b| a - b)
    }

    pub fn mul(&self, other: &Self) -> FallResult<Self> {
        self.combine(other, '*', |a, b| a * b)
    }

    fn compare(&self, other: &Self, rel: &str, holds: bool) -> Proposition {
        Proposition::Atomic {
            symbol: format!("({}{}{})", self.symbol, rel, other.symbol),
            truth: Some(holds),
        }
    }

    /// Comparisons force both sides and yield fixed-truth derived propositions.
    pub fn lt(&self, other: &Self) -> Proposition {
        self.compare(other, "<", self.value() < other.value())
    }

    pub fn le(&self, other: &Self) -> Proposition {
        self.compare(other, "<=", self.value() <= other.value())
    }

    pub fn gt(&self, other: &Self) -> Proposition {
        self.compare(other, ">", self.value() > other.value())
    }

    pub fn ge(&self, other: &Self) -> Proposition {
        self.compare(other, ">=", self.value() >= other.value())
    }

    pub fn eq_value(&self, other: &Self) -> Proposition {
        self.compare(other, "=", self.value() == other.value())
    }
}

impl fmt::Debug for NumericProposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericProposition")
            .field("symbol", &self.symbol)
            .field("value", &self.cache.get().map(|bits| f64::from_bits(*bits)))
            .finish()
    }
}

impl PartialEq for NumericProposition {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for NumericProposition {}

impl Hash for NumericProposition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

/// A logical entity with a definite outcome under evaluation.
///
/// Equality and hash are structural (operator identity plus ordered operand
/// sequence), so propositions can serve as map keys. Structurally distinct but
/// logically equivalent propositions are not conflated here; equivalence is a
/// framework-level question.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Proposition {
    Atomic {
        symbol: String,
        truth: Option<bool>,
    },
    Compound {
        operator: Operator,
        operands: Vec<Proposition>,
    },
    Numeric(NumericProposition),
}

impl Proposition {
    /// Create an atomic proposition resolved from context at evaluation time.
    pub fn atomic(symbol: impl Into<String>) -> FallResult<Self> {
        Self::atom(symbol, None)
    }

    /// Create an atomic proposition with a fixed truth value.
    pub fn with_truth(symbol: impl Into<String>, truth: bool) -> FallResult<Self> {
        Self::atom(symbol, Some(truth))
    }

    fn atom(symbol: impl Into<String>, truth: Option<bool>) -> FallResult<Self> {
        let symbol = symbol.into().trim().to_string();
        if symbol.is_empty() {
            return Err(FallError::Validation {
                field: "symbol".to_string(),
                message: "proposition symbol cannot be empty".to_string(),
            });
        }
        Ok(Self::Atomic { symbol, truth })
    }

    /// Create a compound proposition, rejecting arity mismatch immediately.
    pub fn compound(operator: Operator, operands: Vec<Proposition>) -> FallResult<Self> {
        if !operator.arity().accepts(operands.len()) {
            return Err(FallError::ArityMismatch {
                operator: operator.name().to_string(),
                expected: operator.arity().describe().to_string(),
                actual: operands.len(),
            });
        }
        Ok(Self::Compound { operator, operands })
    }

    /// The structural negation of this proposition.
    pub fn negated(&self) -> Proposition {
        Self::Compound {
            operator: Operator::Not,
            operands: vec![self.clone()],
        }
    }

    pub fn logic_kind(&self) -> LogicKind {
        LogicKind::Proposition
    }

    /// The symbol of an atomic or numeric proposition.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Atomic { symbol, .. } => Some(symbol),
            Self::Numeric(n) => Some(n.symbol()),
            Self::Compound { .. } => None,
        }
    }

    /// Maximum nesting depth; atomics are depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Atomic { .. } | Self::Numeric(_) => 1,
            Self::Compound { operands, .. } => {
                1 + operands.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    /// Evaluate to a definite truth value.
    ///
    /// An atomic with neither a fixed truth value nor a context binding fails
    /// with an explicit unbound outcome.
    pub fn evaluate(&self, ctx: &EvalContext) -> FallResult<bool> {
        match self {
            Self::Atomic { symbol, truth } => truth
                .or_else(|| ctx.lookup(symbol))
                .ok_or_else(|| FallError::UnboundSymbol {
                    symbol: symbol.clone(),
                }),
            Self::Compound { operator, operands } => {
                // The variant is publicly constructible, so the construction
                // invariant is re-checked here rather than assumed.
                if !operator.arity().accepts(operands.len()) {
                    return Err(FallError::ArityMismatch {
                        operator: operator.name().to_string(),
                        expected: operator.arity().describe().to_string(),
                        actual: operands.len(),
                    });
                }
                let mut values = Vec::with_capacity(operands.len());
                for operand in operands {
                    values.push(operand.evaluate(ctx)?);
                }
                Ok(operator.apply(&values))
            }
            Self::Numeric(n) => Ok(n.value().is_finite()),
        }
    }

    /// Canonical symbolic rendering; unary and binary forms re-parse to a
    /// structurally equal proposition.
    pub fn render(&self) -> String {
        match self {
            Self::Atomic { symbol, .. } => symbol.clone(),
            Self::Numeric(n) => n.symbol().to_string(),
            Self::Compound { operator, operands } => match operator.arity() {
                Arity::Unary if operands.len() == 1 => {
                    format!("{}{}", operator.symbol(), operands[0].render())
                }
                _ => format!(
                    "({})",
                    operands
                        .iter()
                        .map(Self::render)
                        .collect::<Vec<_>>()
                        .join(&format!(" {} ", operator.symbol()))
                ),
            },
        }
    }

    /// Rewrite to a normal form with double negation eliminated and negated
    /// conjunctions/disjunctions pushed inward (De Morgan). Used for the
    /// optional semantic-equivalence goal check.
    pub fn normalized(&self) -> Proposition {
        match self {
            Self::Compound { operator: Operator::Not, operands } if operands.len() == 1 => match &operands[0] {
                Self::Compound { operator: Operator::Not, operands: inner }
                    if inner.len() == 1 =>
                {
                    inner[0].normalized()
                }
                Self::Compound { operator, operands: inner }
                    if matches!(operator, Operator::And | Operator::AndN) =>
                {
                    Self::Compound {
                        operator: if inner.len() == 2 { Operator::Or } else { Operator::OrN },
                        operands: inner.iter().map(|p| p.negated().normalized()).collect(),
                    }
                }
                Self::Compound { operator, operands: inner }
                    if matches!(operator, Operator::Or | Operator::OrN) =>
                {
                    Self::Compound {
                        operator: if inner.len() == 2 { Operator::And } else { Operator::AndN },
                        operands: inner.iter().map(|p| p.negated().normalized()).collect(),
                    }
                }
                other => other.normalized().negated(),
            },
            Self::Compound { operator, operands } => Self::Compound {
                operator: *operator,
                operands: operands.iter().map(Self::normalized).collect(),
            },
            other => other.clone(),
        }
    }

    /// Structural equality up to double-negation and De Morgan rewriting.
    pub fn equivalent(&self, other: &Proposition) -> bool {
        self == other || self.normalized() == other.normalized()
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Propositions serialize as their canonical rendering; numeric computations
/// have no serializable form.
impl Serialize for Proposition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.render())
    }
}
