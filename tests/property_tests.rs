//! Property tests for structural laws of the logic model and the lexer.

use fall::{
    parse, realize, tokenize, EvalContext, NumericProposition, Operator, Proposition, Statement,
    TokenKind,
};
use proptest::prelude::*;

fn arb_symbol() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn arb_proposition() -> impl Strategy<Value = Proposition> {
    let leaf = arb_symbol().prop_map(|s| Proposition::atomic(s).expect("non-empty symbol"));
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|p| p.negated()),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| {
                Proposition::compound(Operator::And, vec![a, b]).expect("binary arity")
            }),
            (inner.clone(), inner).prop_map(|(a, b)| {
                Proposition::compound(Operator::Or, vec![a, b]).expect("binary arity")
            }),
        ]
    })
}

proptest! {
    #[test]
    fn equivalence_is_reflexive(p in arb_proposition()) {
        prop_assert!(p.equivalent(&p));
    }

    #[test]
    fn double_negation_is_equivalent(p in arb_proposition()) {
        prop_assert!(p.equivalent(&p.negated().negated()));
    }

    #[test]
    fn normalization_is_idempotent(p in arb_proposition()) {
        let once = p.normalized();
        prop_assert_eq!(once.clone(), once.normalized());
    }

    #[test]
    fn negation_increases_depth(p in arb_proposition()) {
        prop_assert_eq!(p.negated().depth(), p.depth() + 1);
    }

    #[test]
    fn binary_operators_reject_wrong_arity(
        symbol in arb_symbol(),
        count in 3usize..8
    ) {
        let atom = Proposition::atomic(symbol).expect("non-empty symbol");
        let operands = vec![atom; count];
        prop_assert!(Proposition::compound(Operator::And, operands).is_err());
    }

    #[test]
    fn variadic_conjunction_evaluates_like_fold(
        values in prop::collection::vec(any::<bool>(), 1..6)
    ) {
        let operands: Vec<Proposition> = values
            .iter()
            .enumerate()
            .map(|(i, v)| Proposition::with_truth(format!("s{}", i), *v).expect("symbol"))
            .collect();
        let conjunction =
            Proposition::compound(Operator::AndN, operands).expect("variadic arity");
        let expected = values.iter().all(|v| *v);
        prop_assert_eq!(conjunction.evaluate(&EvalContext::new()), Ok(expected));
    }

    #[test]
    fn numeric_constant_memoizes_exact_value(value in any::<f64>()) {
        let numeric = NumericProposition::constant("n", value).expect("symbol");
        let first = numeric.value();
        let second = numeric.value();
        // Bitwise comparison so NaN round-trips too
        prop_assert_eq!(first.to_bits(), second.to_bits());
        prop_assert_eq!(first.to_bits(), value.to_bits());
    }

    #[test]
    fn lexer_terminates_on_arbitrary_ascii(source in "[ -~\n]{0,200}") {
        // Must produce a positioned error or a token stream ending in Eof,
        // never panic.
        if let Ok(tokens) = tokenize(&source) {
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        }
    }

    #[test]
    fn render_is_stable(p in arb_proposition()) {
        prop_assert_eq!(p.render(), p.clone().render());
    }

    #[test]
    fn render_reparses_to_equal_proposition(p in arb_proposition()) {
        // Unary and binary renderings are fully parenthesized, so the parsed
        // expression realizes back to a structurally equal proposition.
        let source = format!("ASSERT {} //", p.render());
        let program = parse(&source).expect("rendered form parses");
        let expr = match &program.statements[0] {
            Statement::Assertion(expr) => expr,
            other => panic!("unexpected statement: {:?}", other),
        };
        let reparsed = realize(expr).expect("realizable expression");
        prop_assert_eq!(reparsed, p);
    }
}
