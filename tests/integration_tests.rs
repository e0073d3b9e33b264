//! Integration tests for the FALL pipeline: lexing, parsing, validation,
//! proof execution, and interpretation.

use fall::{
    compute_content_hash, match_pattern, parse, tokenize, Expr, FallError, Framework,
    FrameworkSelector, Interpreter, Justification, Operator, Parser, ProofState, Proposition,
    Registry, Selection, StatementKind, TokenKind, TruthValue, Validator,
};
use std::collections::HashMap;

// ============================================================================
// Test Fixtures
// ============================================================================

const SYLLOGISM: &str = r#"
DEFINE PROPOSITION p AS "Socrates is a man" WHERE "Socrates" IS SUBJECT AND "man" IS PREDICATE //
DEFINE PROPOSITION q AS "All men are mortal" WHERE "men" IS SUBJECT AND "mortal" IS PREDICATE //
DEFINE PROPOSITION r AS "Socrates is mortal" WHERE "Socrates" IS SUBJECT AND "mortal" IS PREDICATE //
DEFINE AXIOM Syllogism WHERE p IS TRUE AND q IS TRUE //
BEGIN PROOF //
GIVEN p, q //
PROVE r //
USING Syllogism //
STEP 1: ASSERT p AND q //
STEP 2: INFER r FROM [p, q] VIA Syllogism //
END PROOF //
QUERY r //
"#;

fn atom(symbol: &str) -> Proposition {
    Proposition::atomic(symbol).expect("valid symbol")
}

fn implies(lhs: Proposition, rhs: Proposition) -> Proposition {
    Proposition::compound(Operator::Implies, vec![lhs, rhs]).expect("binary arity")
}

// ============================================================================
// Lexer Tests
// ============================================================================

#[test]
fn test_tokenize_definition() {
    let tokens = tokenize(r#"DEFINE PROPOSITION p AS "it rains" //"#).expect("lex");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Define,
            TokenKind::Proposition,
            TokenKind::Ident,
            TokenKind::As,
            TokenKind::Str,
            TokenKind::Terminator,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[4].lexeme, "it rains");
}

#[test]
fn test_tokenize_connective_symbols() {
    let tokens = tokenize("p ∧ q ∨ ¬r → s ↔ t ⊕ u ↑ v ↓ w").expect("lex");
    let connectives: Vec<TokenKind> = tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Ident && t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        connectives,
        vec![
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::Implies,
            TokenKind::Iff,
            TokenKind::Xor,
            TokenKind::Nand,
            TokenKind::Nor,
        ]
    );
}

#[test]
fn test_tokenize_ascii_arrows() {
    let tokens = tokenize("p -> q <-> r").expect("lex");
    assert_eq!(tokens[1].kind, TokenKind::Implies);
    assert_eq!(tokens[3].kind, TokenKind::Iff);
}

#[test]
fn test_tokenize_comment_discarded() {
    let tokens = tokenize("p !- this is ignored\nq").expect("lex");
    let idents: Vec<&str> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Ident)
        .map(|t| t.lexeme.as_str())
        .collect();
    assert_eq!(idents, vec!["p", "q"]);
}

#[test]
fn test_tokenize_unterminated_string() {
    let result = tokenize(r#"DEFINE PROPOSITION p AS "no closing quote"#);
    assert!(matches!(result, Err(FallError::Lexical { line: 1, .. })));
}

#[test]
fn test_tokenize_unexpected_character() {
    let result = tokenize("p @ q");
    assert!(matches!(
        result,
        Err(FallError::Lexical { column: 3, .. })
    ));
}

#[test]
fn test_tokenize_positions() {
    let tokens = tokenize("p\n  q").expect("lex");
    assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    // tokens[1] is the newline terminator
    assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
}

// ============================================================================
// Parser Tests
// ============================================================================

#[test]
fn test_parse_proposition_definition() {
    let program = parse(
        r#"DEFINE PROPOSITION p AS "Socrates is a man" WHERE "Socrates" IS SUBJECT AND "man" IS PREDICATE //"#,
    )
    .expect("parse");
    assert_eq!(program.statements.len(), 1);
    match &program.statements[0] {
        fall::Statement::PropositionDef(def) => {
            assert_eq!(def.name, "p");
            assert_eq!(def.text, "Socrates is a man");
            assert_eq!(def.tags.len(), 2);
            assert_eq!(def.tags[0].value, "Socrates");
            assert_eq!(def.tags[0].tag, "SUBJECT");
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_parse_rule_alternatives() {
    let program =
        parse("DEFINE RULE SubjectPredicate WHERE SUBJECT CAN BE NOUN | PRONOUN AND PREDICATE CAN BE VERB //")
            .expect("parse");
    match &program.statements[0] {
        fall::Statement::RuleDef(rule) => {
            assert_eq!(rule.name, "SubjectPredicate");
            assert_eq!(rule.conditions.len(), 2);
            assert_eq!(rule.conditions[0].alternatives, vec!["NOUN", "PRONOUN"]);
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_parse_axiom_conjunction_shape() {
    let program = parse("DEFINE AXIOM Syllogism WHERE p IS TRUE AND q IS TRUE //").expect("parse");
    match &program.statements[0] {
        fall::Statement::AxiomDef(axiom) => {
            assert_eq!(axiom.premises.len(), 2);
            assert!(axiom.conclusion.is_none());
            assert_eq!(axiom.premises[0], Expr::Ident("p".to_string()));
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_parse_axiom_implication_shape() {
    let program =
        parse("DEFINE AXIOM ModusPonens WHERE a AND (a IMPLIES b) IMPLIES b //").expect("parse");
    match &program.statements[0] {
        fall::Statement::AxiomDef(axiom) => {
            assert_eq!(axiom.premises.len(), 2);
            assert_eq!(axiom.conclusion, Some(Expr::Ident("b".to_string())));
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_parse_is_false_sugar() {
    let program = parse("ASSERT p IS FALSE //").expect("parse");
    match &program.statements[0] {
        fall::Statement::Assertion(expr) => {
            assert_eq!(*expr, Expr::not(Expr::Ident("p".to_string())));
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_parse_implies_right_associative() {
    let program = parse("ASSERT a -> b -> c //").expect("parse");
    match &program.statements[0] {
        fall::Statement::Assertion(Expr::Binary { op, rhs, .. }) => {
            assert_eq!(*op, Operator::Implies);
            assert!(matches!(
                **rhs,
                Expr::Binary { op: Operator::Implies, .. }
            ));
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_parse_and_binds_tighter_than_or() {
    let program = parse("ASSERT a OR b AND c //").expect("parse");
    match &program.statements[0] {
        fall::Statement::Assertion(Expr::Binary { op, rhs, .. }) => {
            assert_eq!(*op, Operator::Or);
            assert!(matches!(**rhs, Expr::Binary { op: Operator::And, .. }));
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_parse_proof_block() {
    let program = parse(
        "BEGIN PROOF //\nGIVEN p, q //\nPROVE r //\nUSING Syllogism //\nSTEP 1: ASSERT p AND q //\nEND PROOF //",
    )
    .expect("parse");
    match &program.statements[0] {
        fall::Statement::Proof(proof) => {
            assert_eq!(proof.givens, vec!["p", "q"]);
            assert_eq!(proof.using, vec!["Syllogism"]);
            assert_eq!(proof.steps.len(), 1);
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_parse_proof_without_goal() {
    let result = parse("BEGIN PROOF //\nGIVEN p //\nEND PROOF //");
    assert!(matches!(result, Err(FallError::Syntax { .. })));
}

#[test]
fn test_parser_empty_token_stream() {
    let program = Parser::new(vec![]).program().expect("empty program");
    assert!(program.statements.is_empty());
}

#[test]
fn test_parse_syntax_error_reports_expectation() {
    let result = parse("DEFINE AXIOM //");
    match result {
        Err(FallError::Syntax { expected, .. }) => {
            assert!(expected.contains("axiom name"));
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

// ============================================================================
// Logic Tests
// ============================================================================

#[test]
fn test_arity_rejected_at_construction() {
    let result = Proposition::compound(Operator::Not, vec![atom("p"), atom("q")]);
    assert!(matches!(
        result,
        Err(FallError::ArityMismatch { operator, actual: 2, .. }) if operator == "NOT"
    ));
}

#[test]
fn test_evaluate_with_context() {
    let prop = implies(atom("p"), atom("q"));
    let ctx: fall::EvalContext = [("p", true), ("q", false)].into_iter().collect();
    assert_eq!(prop.evaluate(&ctx), Ok(false));
}

#[test]
fn test_evaluate_unbound_symbol() {
    let result = atom("p").evaluate(&fall::EvalContext::new());
    assert!(matches!(
        result,
        Err(FallError::UnboundSymbol { symbol }) if symbol == "p"
    ));
}

#[test]
fn test_render_symbolic_form() {
    let prop = implies(atom("p"), atom("q").negated());
    assert_eq!(prop.render(), "(p → ¬q)");
}

#[test]
fn test_double_negation_equivalence() {
    let p = atom("p");
    let double_negated = p.negated().negated();
    assert_ne!(p, double_negated);
    assert!(p.equivalent(&double_negated));
}

#[test]
fn test_de_morgan_equivalence() {
    // ¬(p ∧ q) is equivalent to (¬p ∨ ¬q)
    let conj = Proposition::compound(Operator::And, vec![atom("p"), atom("q")])
        .expect("binary arity")
        .negated();
    let disj = Proposition::compound(
        Operator::Or,
        vec![atom("p").negated(), atom("q").negated()],
    )
    .expect("binary arity");
    assert!(conj.equivalent(&disj));
}

#[test]
fn test_malformed_compound_does_not_panic() {
    // The variant is publicly constructible, so rendering and evaluation
    // stay total even when the operand count is wrong.
    let malformed = Proposition::Compound {
        operator: Operator::Not,
        operands: vec![],
    };
    assert_eq!(malformed.render(), "()");
    let _ = malformed.normalized();
    assert!(matches!(
        malformed.evaluate(&fall::EvalContext::new()),
        Err(FallError::ArityMismatch { actual: 0, .. })
    ));

    let overfull = Proposition::Compound {
        operator: Operator::Not,
        operands: vec![atom("p"), atom("q")],
    };
    let _ = overfull.render();
    assert!(matches!(
        overfull.evaluate(&fall::EvalContext::new()),
        Err(FallError::ArityMismatch { actual: 2, .. })
    ));
}

#[test]
fn test_numeric_memoization() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let numeric = fall::NumericProposition::new("n", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        42.0
    })
    .expect("valid symbol");

    assert!(!numeric.is_evaluated());
    assert_eq!(numeric.value(), 42.0);
    assert_eq!(numeric.value(), 42.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_numeric_comparison_fixed_truth() {
    let two = fall::NumericProposition::constant("two", 2.0).expect("symbol");
    let three = fall::NumericProposition::constant("three", 3.0).expect("symbol");
    let lt = two.lt(&three);
    assert_eq!(lt.evaluate(&fall::EvalContext::new()), Ok(true));
}

// ============================================================================
// Framework and Validator Tests
// ============================================================================

#[test]
fn test_classical_rejects_contradiction() {
    let validator = Validator::new(Framework::classical());
    let p = atom("p");
    let context = vec![&p];
    let result = validator.validate(&p.negated(), &context);
    assert!(!result.is_valid);
    assert!(result.flags.is_empty());
}

#[test]
fn test_paraconsistent_flags_contradiction() {
    let validator = Validator::new(Framework::paraconsistent());
    let p = atom("p");
    let context = vec![&p];
    let result = validator.validate(&p.negated(), &context);
    assert!(result.is_valid);
    assert_eq!(result.flags.len(), 1);
}

#[test]
fn test_internal_conjunction_contradiction() {
    let validator = Validator::new(Framework::classical());
    let contradiction =
        Proposition::compound(Operator::And, vec![atom("p"), atom("p").negated()])
            .expect("binary arity");
    let result = validator.validate(&contradiction, &[]);
    assert!(!result.is_valid);
}

#[test]
fn test_framework_compatibility() {
    let classical = Framework::classical();
    let paraconsistent = Framework::paraconsistent();
    let modal = Framework::modal();
    assert!(!classical.is_compatible(&paraconsistent));
    assert!(classical.is_compatible(&modal));
}

// ============================================================================
// Registry and Selector Tests
// ============================================================================

#[test]
fn test_standard_registry_contents() {
    let registry = Registry::standard();
    assert_eq!(registry.operator_count(), 12);
    assert_eq!(registry.operator("AND"), Some(Operator::And));
    assert!(registry.framework("classical").is_some());
    assert!(registry.framework("paraconsistent").is_some());
    assert!(registry.framework("modal").is_some());
}

#[test]
fn test_registry_rejects_duplicate_framework() {
    let mut registry = Registry::standard();
    let result = registry.register_framework(Framework::classical());
    assert!(matches!(
        result,
        Err(FallError::Redefinition { name }) if name == "classical"
    ));
}

#[test]
fn test_selector_prefers_conflict_free() {
    let registry = Registry::standard();
    let selector = FrameworkSelector::new(&registry);
    // Both classical and modal satisfy these tags; modal has no declared
    // conflicts and so scores higher.
    let requirements = vec!["propositional".to_string(), "classical".to_string()];
    match selector.select(&requirements) {
        Selection::Selected { framework, .. } => assert_eq!(framework.id(), "modal"),
        Selection::NoCompatibleFramework => panic!("expected a selection"),
    }
}

#[test]
fn test_selector_modal_requirement() {
    let registry = Registry::standard();
    let selector = FrameworkSelector::new(&registry);
    let requirements = vec!["accessibility".to_string()];
    match selector.select(&requirements) {
        Selection::Selected { framework, .. } => assert_eq!(framework.id(), "modal"),
        Selection::NoCompatibleFramework => panic!("expected a selection"),
    }
}

#[test]
fn test_selector_no_compatible_framework() {
    let registry = Registry::standard();
    let selector = FrameworkSelector::new(&registry);
    let requirements = vec!["quantum".to_string()];
    assert_eq!(
        selector.select(&requirements),
        Selection::NoCompatibleFramework
    );
}

// ============================================================================
// Pattern Matching Tests
// ============================================================================

#[test]
fn test_match_variable_binds_consistently() {
    let pattern = Expr::binary(
        Operator::And,
        Expr::Ident("x".to_string()),
        Expr::Ident("x".to_string()),
    );
    let same = Proposition::compound(Operator::And, vec![atom("p"), atom("p")]).expect("arity");
    let different =
        Proposition::compound(Operator::And, vec![atom("p"), atom("q")]).expect("arity");

    let mut bindings = HashMap::new();
    assert!(match_pattern(&pattern, &same, &mut bindings));

    bindings.clear();
    assert!(!match_pattern(&pattern, &different, &mut bindings));
}

#[test]
fn test_match_modus_ponens_shape() {
    // Pattern (a → b) against the concrete implication (p → q) binds a and b.
    let pattern = Expr::binary(
        Operator::Implies,
        Expr::Ident("a".to_string()),
        Expr::Ident("b".to_string()),
    );
    let target = implies(atom("p"), atom("q"));
    let mut bindings = HashMap::new();
    assert!(match_pattern(&pattern, &target, &mut bindings));
    assert_eq!(bindings.get("a"), Some(&atom("p")));
    assert_eq!(bindings.get("b"), Some(&atom("q")));
}

#[test]
fn test_derived_premise_checked_structurally() {
    // An atomic whose symbol happens to spell a compound's rendering must not
    // satisfy a derived justification citing the compound.
    let mut state = ProofState::new();
    let alias = Proposition::atomic("(p ∧ q)").expect("symbol");
    state
        .insert(alias, Justification::Asserted { step: 1 })
        .expect("insert");

    let conjunction =
        Proposition::compound(Operator::And, vec![atom("p"), atom("q")]).expect("arity");
    let result = state.insert(
        atom("r"),
        Justification::Derived {
            axiom: "Conjunction".to_string(),
            premises: vec![conjunction],
            step: 2,
        },
    );
    assert!(matches!(
        result,
        Err(FallError::UnjustifiedInference { step: 2, .. })
    ));
}

#[test]
fn test_match_operator_mismatch() {
    let pattern = Expr::binary(
        Operator::And,
        Expr::Ident("a".to_string()),
        Expr::Ident("b".to_string()),
    );
    let target = implies(atom("p"), atom("q"));
    let mut bindings = HashMap::new();
    assert!(!match_pattern(&pattern, &target, &mut bindings));
}

// ============================================================================
// Interpreter Tests
// ============================================================================

#[test]
fn test_syllogism_proof_succeeds() {
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(SYLLOGISM).expect("run");

    let proof = reports
        .iter()
        .find(|r| r.kind == StatementKind::Proof)
        .expect("proof report");
    assert!(proof.success, "proof failed: {}", proof.message);
    assert_eq!(proof.history.len(), 2);
    assert!(proof.history.iter().all(|record| record.success));
    assert!(proof.derivation_hash.is_some());

    let query = reports
        .iter()
        .find(|r| r.kind == StatementKind::Query)
        .expect("query report");
    assert_eq!(query.truth, Some(TruthValue::True));
}

#[test]
fn test_derivation_hash_deterministic() {
    let first = Interpreter::new().run_source(SYLLOGISM).expect("run");
    let second = Interpreter::new().run_source(SYLLOGISM).expect("run");

    let hash_of = |reports: &[fall::StatementReport]| {
        reports
            .iter()
            .find(|r| r.kind == StatementKind::Proof)
            .and_then(|r| r.derivation_hash.clone())
            .expect("derivation hash")
    };
    assert_eq!(hash_of(&first), hash_of(&second));
}

#[test]
fn test_proof_fails_on_unjustified_step() {
    let source = r#"
DEFINE PROPOSITION p AS "p holds" WHERE "p" IS SUBJECT //
DEFINE PROPOSITION r AS "r holds" WHERE "r" IS SUBJECT //
DEFINE AXIOM Weak WHERE p IS TRUE //
BEGIN PROOF //
GIVEN p //
PROVE r //
USING Weak //
STEP 1: INFER r FROM [r] VIA Weak //
END PROOF //
QUERY r //
"#;
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    let proof = reports
        .iter()
        .find(|r| r.kind == StatementKind::Proof)
        .expect("proof report");
    assert!(!proof.success);
    assert!(proof.derivation_hash.is_none());
    assert_eq!(proof.history.len(), 1);
    assert!(!proof.history[0].success);
    assert!(proof.history[0]
        .error
        .as_deref()
        .unwrap_or("")
        .contains("not established"));

    // A failed proof establishes nothing.
    let query = reports
        .iter()
        .find(|r| r.kind == StatementKind::Query)
        .expect("query report");
    assert_eq!(query.truth, Some(TruthValue::Unknown));
}

#[test]
fn test_infer_names_missing_premise() {
    let source = r#"
DEFINE PROPOSITION p AS "Socrates is a man" WHERE "Socrates" IS SUBJECT AND "man" IS PREDICATE //
DEFINE PROPOSITION q AS "All men are mortal" WHERE "men" IS SUBJECT AND "mortal" IS PREDICATE //
DEFINE PROPOSITION r AS "Socrates is mortal" WHERE "Socrates" IS SUBJECT AND "mortal" IS PREDICATE //
DEFINE AXIOM Syllogism WHERE p IS TRUE AND q IS TRUE //
BEGIN PROOF //
GIVEN p, q //
PROVE r //
USING Syllogism //
STEP 1: INFER r FROM [p] VIA Syllogism //
END PROOF //
QUERY r //
"#;
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    let proof = reports
        .iter()
        .find(|r| r.kind == StatementKind::Proof)
        .expect("proof report");
    assert!(!proof.success);
    let error = proof.history[0].error.as_deref().expect("step error");
    assert!(error.contains("q"), "error does not name the missing premise: {}", error);
    assert!(error.contains("no premise supplied for"));

    let query = reports
        .iter()
        .find(|r| r.kind == StatementKind::Query)
        .expect("query report");
    assert_eq!(query.truth, Some(TruthValue::Unknown));
}

#[test]
fn test_contradictory_assert_inside_proof() {
    let source = r#"
DEFINE PROPOSITION p AS "p holds" WHERE "p" IS SUBJECT //
DEFINE PROPOSITION q AS "q holds" WHERE "q" IS SUBJECT //
BEGIN PROOF //
GIVEN p //
PROVE q //
STEP 1: ASSERT NOT p //
STEP 2: ASSERT p //
END PROOF //
QUERY p //
"#;
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    let proof = reports
        .iter()
        .find(|r| r.kind == StatementKind::Proof)
        .expect("proof report");

    // The contradictory step is rejected, recorded, and aborts the block.
    assert!(!proof.success);
    assert_eq!(proof.history.len(), 1);
    assert!(!proof.history[0].success);
    assert!(proof.history[0]
        .error
        .as_deref()
        .unwrap_or("")
        .contains("classical"));

    // Execution continues past the failed block.
    let query = reports
        .iter()
        .find(|r| r.kind == StatementKind::Query)
        .expect("query report");
    assert!(query.success);
    assert_eq!(query.truth, Some(TruthValue::Unknown));
}

#[test]
fn test_classical_contradiction_rejected() {
    let source = r#"
DEFINE PROPOSITION p AS "it rains" WHERE "it" IS SUBJECT AND "rains" IS PREDICATE //
ASSERT p //
ASSERT NOT p //
"#;
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    assert!(reports[1].success);
    assert!(!reports[2].success);
    assert!(reports[2].message.contains("classical"));
}

#[test]
fn test_paraconsistent_contradiction_flagged() {
    let source = r#"
DEFINE PROPOSITION p AS "it rains" WHERE "it" IS SUBJECT AND "rains" IS PREDICATE //
ASSERT p //
ASSERT NOT p //
"#;
    let mut interpreter = Interpreter::with_framework("paraconsistent").expect("framework");
    let reports = interpreter.run_source(source).expect("run");
    assert!(reports[2].success);
    assert_eq!(reports[2].flags.len(), 1);
}

#[test]
fn test_query_unknown_truth_value() {
    let source = r#"
DEFINE PROPOSITION p AS "p holds" WHERE "p" IS SUBJECT //
QUERY p //
"#;
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    assert_eq!(reports[1].truth, Some(TruthValue::Unknown));
}

#[test]
fn test_query_undefined_name_fails() {
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source("QUERY ghost //").expect("run");
    assert!(!reports[0].success);
    assert!(reports[0].message.contains("unknown reference"));
}

#[test]
fn test_query_ambiguous_name() {
    let source = r#"
DEFINE PROPOSITION twin AS "twin holds" WHERE "twin" IS SUBJECT //
DEFINE AXIOM twin WHERE p IS TRUE //
QUERY twin //
"#;
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    assert!(!reports[2].success);
    assert!(reports[2].message.contains("multiple"));
}

#[test]
fn test_redefinition_rejected() {
    let source = r#"
DEFINE PROPOSITION p AS "first" WHERE "first" IS SUBJECT //
DEFINE PROPOSITION p AS "second" WHERE "second" IS SUBJECT //
"#;
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    assert!(reports[0].success);
    assert!(!reports[1].success);
    assert!(reports[1].message.contains("already defined"));
}

#[test]
fn test_bridge_extracts_structure() {
    let source = r#"
BRIDGE NLP ON //
DEFINE PROPOSITION p AS "Socrates is a man" //
"#;
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    assert!(reports[1].success, "{}", reports[1].message);

    let structure = interpreter
        .environment()
        .structure("p")
        .expect("extracted structure");
    assert_eq!(structure.subject, "Socrates");
    assert_eq!(structure.predicate, "man");
}

#[test]
fn test_bridge_off_requires_annotation() {
    let mut interpreter = Interpreter::new();
    let reports = interpreter
        .run_source(r#"DEFINE PROPOSITION p AS "Socrates is a man" //"#)
        .expect("run");
    assert!(!reports[0].success);
    assert!(reports[0].message.contains("NLP bridge is off"));
}

#[test]
fn test_bridge_quantifier_extraction() {
    let source = r#"
BRIDGE NLP ON //
DEFINE PROPOSITION q AS "All men are mortal" //
"#;
    let mut interpreter = Interpreter::new();
    interpreter.run_source(source).expect("run");
    let structure = interpreter
        .environment()
        .structure("q")
        .expect("structure");
    assert_eq!(structure.quantifier.as_deref(), Some("All"));
    assert_eq!(structure.subject, "men");
}

#[test]
fn test_symbolize_renders_definition() {
    let source = r#"
DEFINE PROPOSITION p AS "Socrates is a man" WHERE "Socrates" IS SUBJECT AND "man" IS PREDICATE //
SYMBOLIZE p //
"#;
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    assert!(reports[1].success);
    assert_eq!(reports[1].rendered.as_deref(), Some("p"));
    assert!(reports[1].message.contains("Socrates is a man"));
}

#[test]
fn test_unknown_framework_rejected() {
    let result = Interpreter::with_framework("dialetheist");
    assert!(matches!(
        result,
        Err(FallError::UnknownReference { name }) if name == "dialetheist"
    ));
}

#[test]
fn test_interpreter_for_requirements() {
    let interpreter =
        Interpreter::for_requirements(&["contradiction-tolerant".to_string()]).expect("select");
    assert_eq!(interpreter.environment().framework_id(), "paraconsistent");
}

#[test]
fn test_lex_error_aborts_run() {
    let mut interpreter = Interpreter::new();
    let result = interpreter.run_source("ASSERT p @ q //");
    assert!(matches!(result, Err(FallError::Lexical { .. })));
}

#[test]
fn test_proof_unknown_given() {
    let source = "BEGIN PROOF //\nGIVEN ghost //\nPROVE ghost //\nEND PROOF //";
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    assert!(!reports[0].success);
    assert!(reports[0].message.contains("ghost"));
}

// ============================================================================
// Content Hash Tests
// ============================================================================

#[test]
fn test_deterministic_hashing() {
    let obj = serde_json::json!({"b": 2, "a": 1, "c": {"z": 26, "y": 25}});
    assert_eq!(compute_content_hash(&obj), compute_content_hash(&obj));
}

#[test]
fn test_hash_key_order_independence() {
    let obj1 = serde_json::json!({"b": 2, "a": 1});
    let obj2 = serde_json::json!({"a": 1, "b": 2});
    assert_eq!(compute_content_hash(&obj1), compute_content_hash(&obj2));
}

#[test]
fn test_hash_different_values() {
    let obj1 = serde_json::json!({"a": 1});
    let obj2 = serde_json::json!({"a": 2});
    assert_ne!(compute_content_hash(&obj1), compute_content_hash(&obj2));
}

// ============================================================================
// End-to-End Test
// ============================================================================

#[test]
fn test_full_workflow() {
    let source = r#"
!- Grammar and vocabulary
DEFINE RULE SubjectPredicate WHERE SUBJECT CAN BE NOUN | PRONOUN AND PREDICATE CAN BE VERB | ADJECTIVE //
DEFINE PROPOSITION p AS "Socrates is a man" WHERE "Socrates" IS SUBJECT AND "man" IS PREDICATE //
DEFINE PROPOSITION q AS "All men are mortal" WHERE "men" IS SUBJECT AND "mortal" IS PREDICATE //
DEFINE PROPOSITION r AS "Socrates is mortal" WHERE "Socrates" IS SUBJECT AND "mortal" IS PREDICATE //

!- Inference schema
DEFINE AXIOM Syllogism WHERE p IS TRUE AND q IS TRUE //

!- The proof itself
BEGIN PROOF //
GIVEN p, q //
PROVE r //
USING Syllogism //
STEP 1: ASSERT p AND q //
STEP 2: INFER r FROM [p, q] VIA Syllogism //
END PROOF //

QUERY r //
SYMBOLIZE r //
"#;
    let mut interpreter = Interpreter::new();
    let reports = interpreter.run_source(source).expect("run");
    assert_eq!(reports.len(), 8);
    assert!(
        reports.iter().all(|r| r.success),
        "failures: {:?}",
        reports
            .iter()
            .filter(|r| !r.success)
            .map(|r| &r.message)
            .collect::<Vec<_>>()
    );

    let proof = reports
        .iter()
        .find(|r| r.kind == StatementKind::Proof)
        .expect("proof report");
    assert_eq!(proof.rendered.as_deref(), Some("r"));
    assert!(proof.derivation_hash.is_some());

    let query = reports
        .iter()
        .find(|r| r.kind == StatementKind::Query)
        .expect("query report");
    assert_eq!(query.truth, Some(TruthValue::True));
}
