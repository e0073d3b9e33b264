//! Abstract syntax tree for FALL programs.
//!
//! Statements are a closed enum: the parser can only ever produce nodes that
//! the interpreter knows how to execute.

use crate::logic::Operator;
use serde::Serialize;
use std::fmt;

/// A parsed program: a flat statement sequence in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    RuleDef(RuleDefinition),
    AxiomDef(AxiomDefinition),
    PropositionDef(PropositionDefinition),
    Assertion(Expr),
    Proof(ProofBlock),
    Query { name: String },
    Symbolize { name: String },
    Pragma(Pragma),
}

/// `DEFINE RULE name WHERE TAG CAN BE ALT | ALT AND ...`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDefinition {
    pub name: String,
    pub conditions: Vec<RuleCondition>,
}

/// One `TAG CAN BE a | b | c` clause of a rule definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleCondition {
    pub subject: String,
    pub alternatives: Vec<String>,
}

/// `DEFINE AXIOM name WHERE <pattern>`
///
/// The body is stored already split into premise patterns and an optional
/// conclusion pattern: a top-level implication contributes its antecedent
/// conjuncts as premises and its consequent as the conclusion; any other
/// shape contributes all its conjuncts as premises with no fixed conclusion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxiomDefinition {
    pub name: String,
    pub premises: Vec<Expr>,
    pub conclusion: Option<Expr>,
}

/// `DEFINE PROPOSITION name AS "text" WHERE "part" IS TAG AND ...`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropositionDefinition {
    pub name: String,
    pub text: String,
    pub tags: Vec<PropositionTag>,
}

/// One `"value" IS TAG` annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropositionTag {
    pub value: String,
    pub tag: String,
}

/// `BEGIN PROOF ... END PROOF`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofBlock {
    pub givens: Vec<String>,
    pub goal: Expr,
    pub using: Vec<String>,
    pub steps: Vec<ProofStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofStep {
    pub number: u32,
    pub action: StepAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StepAction {
    Assert(Expr),
    Infer {
        goal: Expr,
        premises: Vec<String>,
        via: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pragma {
    BridgeNlp(bool),
}

/// An expression over propositions. `Ident` leaves are resolved against the
/// environment at execution time, never at parse time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Ident(String),
    Bool(bool),
    Number(f64),
    Unary {
        op: Operator,
        operand: Box<Expr>,
    },
    Binary {
        op: Operator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn not(operand: Expr) -> Self {
        Self::Unary {
            op: Operator::Not,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: Operator, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Flatten nested ANDs into a conjunct list. Non-conjunctions are a
    /// single-element list of themselves.
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::Binary {
                op: Operator::And,
                lhs,
                rhs,
            } => {
                let mut parts = lhs.conjuncts();
                parts.extend(rhs.conjuncts());
                parts
            }
            other => vec![other],
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Bool(value) => write!(f, "{}", if *value { "TRUE" } else { "FALSE" }),
            Expr::Number(value) => write!(f, "{}", value),
            Expr::Unary { op, operand } => write!(f, "{}{}", op.symbol(), operand),
            Expr::Binary { op, lhs, rhs } => {
                write!(f, "({} {} {})", lhs, op.symbol(), rhs)
            }
        }
    }
}
