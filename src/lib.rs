//! FALL - Formal Assertion Logic Language
//!
//! Core modules for a formal-logic substrate with a mechanically checked
//! intermediate proof language.

pub mod error;
pub mod ast;
pub mod executor;
pub mod framework;
pub mod interpreter;
pub mod lexer;
pub mod logic;
pub mod nlp;
pub mod parser;
pub mod registry;
pub mod report;
pub mod selector;

pub use error::{FallError, FallResult};
pub use ast::{
    AxiomDefinition, Expr, Pragma, Program, ProofBlock, ProofStep, PropositionDefinition,
    PropositionTag, RuleCondition, RuleDefinition, Statement, StepAction,
};
pub use executor::{
    free_identifiers, match_pattern, realize, ExecutorConfig, Justification, ProofExecutor,
    ProofOutcome, ProofState, StepRecord,
};
pub use framework::{
    Framework, FrameworkKind, Law, LawViolation, ValidationResult, ValidationStrategy, Validator,
};
pub use interpreter::{Environment, Interpreter};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use logic::{Arity, EvalContext, LogicKind, NumericProposition, Operator, Proposition};
pub use nlp::{NlpBridge, PatternBridge, SentenceStructure};
pub use parser::{parse, Parser};
pub use registry::Registry;
pub use report::{compute_content_hash, StatementKind, StatementReport, TruthValue};
pub use selector::{FrameworkSelector, Selection};
