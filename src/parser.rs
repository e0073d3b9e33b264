//! Recursive-descent parser for FALL.
//!
//! Consumes the full token stream and produces a [`Program`], or fails on the
//! first syntax error with the offending position, the token found, and what
//! was expected there. There is no error recovery.

use crate::ast::{
    AxiomDefinition, Expr, Pragma, Program, PropositionDefinition, ProofBlock, ProofStep,
    PropositionTag, RuleCondition, RuleDefinition, Statement, StepAction,
};
use crate::error::{FallError, FallResult};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::logic::Operator;

/// Parse a FALL source text into a program.
pub fn parse(source: &str) -> FallResult<Program> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).program()
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// The token stream need not end in `Eof`; one is appended if missing so
    /// lookahead is always defined.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                line,
                column,
            });
        }
        Self { tokens, current: 0 }
    }

    pub fn program(&mut self) -> FallResult<Program> {
        let mut statements = Vec::new();
        self.skip_terminators();
        while !self.check(TokenKind::Eof) {
            statements.push(self.statement()?);
            self.end_of_statement()?;
            self.skip_terminators();
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> FallResult<Statement> {
        if self.matches(TokenKind::Define) {
            return self.definition();
        }
        if self.matches(TokenKind::Assert) {
            return Ok(Statement::Assertion(self.expression()?));
        }
        if self.matches(TokenKind::Begin) {
            return Ok(Statement::Proof(self.proof_block()?));
        }
        if self.matches(TokenKind::Query) {
            let name = self.identifier("proposition or axiom name")?;
            return Ok(Statement::Query { name });
        }
        if self.matches(TokenKind::Symbolize) {
            let name = self.identifier("proposition name")?;
            return Ok(Statement::Symbolize { name });
        }
        if self.matches(TokenKind::Bridge) {
            self.consume(TokenKind::Nlp, "NLP")?;
            let enabled = if self.matches(TokenKind::On) {
                true
            } else if self.matches(TokenKind::Off) {
                false
            } else {
                return Err(self.unexpected("ON or OFF"));
            };
            return Ok(Statement::Pragma(Pragma::BridgeNlp(enabled)));
        }
        Err(self.unexpected("a statement"))
    }

    fn definition(&mut self) -> FallResult<Statement> {
        if self.matches(TokenKind::Rule) {
            return Ok(Statement::RuleDef(self.rule_definition()?));
        }
        if self.matches(TokenKind::Axiom) {
            return Ok(Statement::AxiomDef(self.axiom_definition()?));
        }
        if self.matches(TokenKind::Proposition) {
            return Ok(Statement::PropositionDef(self.proposition_definition()?));
        }
        Err(self.unexpected("RULE, AXIOM, or PROPOSITION"))
    }

    fn rule_definition(&mut self) -> FallResult<RuleDefinition> {
        let name = self.identifier("rule name")?;
        self.consume(TokenKind::Where, "WHERE")?;
        let mut conditions = vec![self.rule_condition()?];
        while self.matches(TokenKind::And) {
            conditions.push(self.rule_condition()?);
        }
        Ok(RuleDefinition { name, conditions })
    }

    fn rule_condition(&mut self) -> FallResult<RuleCondition> {
        let subject = self.identifier("grammatical category")?;
        self.consume(TokenKind::Can, "CAN")?;
        self.consume(TokenKind::Be, "BE")?;
        let mut alternatives = vec![self.identifier("alternative")?];
        while self.matches(TokenKind::Pipe) {
            alternatives.push(self.identifier("alternative")?);
        }
        Ok(RuleCondition {
            subject,
            alternatives,
        })
    }

    /// The axiom body is one pattern expression. A top-level implication
    /// splits into premise conjuncts and a conclusion pattern; any other
    /// shape yields premise conjuncts only.
    fn axiom_definition(&mut self) -> FallResult<AxiomDefinition> {
        let name = self.identifier("axiom name")?;
        self.consume(TokenKind::Where, "WHERE")?;
        let body = self.expression()?;
        let (premises, conclusion) = match body {
            Expr::Binary {
                op: Operator::Implies,
                lhs,
                rhs,
            } => (
                lhs.conjuncts().into_iter().cloned().collect(),
                Some(*rhs),
            ),
            other => (other.conjuncts().into_iter().cloned().collect(), None),
        };
        Ok(AxiomDefinition {
            name,
            premises,
            conclusion,
        })
    }

    fn proposition_definition(&mut self) -> FallResult<PropositionDefinition> {
        let name = self.identifier("proposition name")?;
        self.consume(TokenKind::As, "AS")?;
        let text = self.string("proposition text")?;
        let mut tags = Vec::new();
        if self.matches(TokenKind::Where) {
            tags.push(self.proposition_tag()?);
            while self.matches(TokenKind::And) {
                tags.push(self.proposition_tag()?);
            }
        }
        Ok(PropositionDefinition { name, text, tags })
    }

    fn proposition_tag(&mut self) -> FallResult<PropositionTag> {
        let value = self.string("tagged text fragment")?;
        self.consume(TokenKind::Is, "IS")?;
        let tag = self.identifier("grammatical tag")?;
        Ok(PropositionTag { value, tag })
    }

    fn proof_block(&mut self) -> FallResult<ProofBlock> {
        self.consume(TokenKind::Proof, "PROOF")?;
        self.end_of_statement()?;
        self.skip_terminators();

        let mut givens = Vec::new();
        let mut goal = None;
        let mut using = Vec::new();
        let mut steps = Vec::new();

        loop {
            if self.matches(TokenKind::End) {
                self.consume(TokenKind::Proof, "PROOF")?;
                break;
            }
            if self.matches(TokenKind::Given) {
                givens.push(self.identifier("given proposition name")?);
                while self.matches(TokenKind::Comma) {
                    givens.push(self.identifier("given proposition name")?);
                }
            } else if self.matches(TokenKind::Prove) {
                goal = Some(self.expression()?);
            } else if self.matches(TokenKind::Using) {
                using.push(self.identifier("axiom name")?);
                while self.matches(TokenKind::Comma) {
                    using.push(self.identifier("axiom name")?);
                }
            } else if self.matches(TokenKind::Step) {
                steps.push(self.proof_step()?);
            } else {
                return Err(self.unexpected("GIVEN, PROVE, USING, STEP, or END PROOF"));
            }
            self.end_of_statement()?;
            self.skip_terminators();
        }

        let goal = goal.ok_or_else(|| {
            let token = self.peek().clone();
            FallError::Syntax {
                line: token.line,
                column: token.column,
                found: "END PROOF".to_string(),
                expected: "a PROVE clause before the proof ends".to_string(),
            }
        })?;
        Ok(ProofBlock {
            givens,
            goal,
            using,
            steps,
        })
    }

    fn proof_step(&mut self) -> FallResult<ProofStep> {
        let number_token = self.consume(TokenKind::Number, "step number")?.clone();
        let number = number_token.lexeme.parse::<u32>().map_err(|_| FallError::Syntax {
            line: number_token.line,
            column: number_token.column,
            found: number_token.lexeme.clone(),
            expected: "an integer step number".to_string(),
        })?;
        self.consume(TokenKind::Colon, "':'")?;
        let action = if self.matches(TokenKind::Assert) {
            StepAction::Assert(self.expression()?)
        } else if self.matches(TokenKind::Infer) {
            let goal = self.expression()?;
            let mut premises = Vec::new();
            if self.matches(TokenKind::From) {
                self.consume(TokenKind::LBracket, "'['")?;
                premises.push(self.identifier("premise name")?);
                while self.matches(TokenKind::Comma) {
                    premises.push(self.identifier("premise name")?);
                }
                self.consume(TokenKind::RBracket, "']'")?;
            }
            self.consume(TokenKind::Via, "VIA")?;
            let via = self.identifier("axiom name")?;
            StepAction::Infer {
                goal,
                premises,
                via,
            }
        } else {
            return Err(self.unexpected("ASSERT or INFER"));
        };
        Ok(ProofStep { number, action })
    }

    // Expression grammar, loosest-binding first:
    //   IFF < IMPLIES (right) < OR XOR NOR < AND NAND < NOT < IS < primary

    fn expression(&mut self) -> FallResult<Expr> {
        self.parse_iff()
    }

    fn parse_iff(&mut self) -> FallResult<Expr> {
        let mut expr = self.parse_implies()?;
        while self.matches(TokenKind::Iff) {
            let rhs = self.parse_implies()?;
            expr = Expr::binary(Operator::Iff, expr, rhs);
        }
        Ok(expr)
    }

    fn parse_implies(&mut self) -> FallResult<Expr> {
        let lhs = self.parse_or()?;
        if self.matches(TokenKind::Implies) {
            let rhs = self.parse_implies()?;
            return Ok(Expr::binary(Operator::Implies, lhs, rhs));
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> FallResult<Expr> {
        let mut expr = self.parse_and()?;
        loop {
            let op = if self.matches(TokenKind::Or) {
                Operator::Or
            } else if self.matches(TokenKind::Xor) {
                Operator::Xor
            } else if self.matches(TokenKind::Nor) {
                Operator::Nor
            } else {
                break;
            };
            let rhs = self.parse_and()?;
            expr = Expr::binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> FallResult<Expr> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = if self.matches(TokenKind::And) {
                Operator::And
            } else if self.matches(TokenKind::Nand) {
                Operator::Nand
            } else {
                break;
            };
            let rhs = self.parse_unary()?;
            expr = Expr::binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> FallResult<Expr> {
        if self.matches(TokenKind::Not) {
            let operand = self.parse_unary()?;
            return Ok(Expr::not(operand));
        }
        self.parse_postfix()
    }

    /// `x IS TRUE` is sugar for `x`; `x IS FALSE` for `NOT x`.
    fn parse_postfix(&mut self) -> FallResult<Expr> {
        let expr = self.parse_primary()?;
        if self.matches(TokenKind::Is) {
            if self.matches(TokenKind::True) {
                return Ok(expr);
            }
            if self.matches(TokenKind::False) {
                return Ok(Expr::not(expr));
            }
            return Err(self.unexpected("TRUE or FALSE"));
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> FallResult<Expr> {
        if self.matches(TokenKind::True) {
            return Ok(Expr::Bool(true));
        }
        if self.matches(TokenKind::False) {
            return Ok(Expr::Bool(false));
        }
        if self.check(TokenKind::Number) {
            let token = self.advance().clone();
            let value = token.lexeme.parse::<f64>().map_err(|_| FallError::Syntax {
                line: token.line,
                column: token.column,
                found: token.lexeme.clone(),
                expected: "a numeric literal".to_string(),
            })?;
            return Ok(Expr::Number(value));
        }
        if self.check(TokenKind::Ident) {
            let token = self.advance();
            return Ok(Expr::Ident(token.lexeme.clone()));
        }
        if self.matches(TokenKind::LParen) {
            let expr = self.expression()?;
            self.consume(TokenKind::RParen, "')'")?;
            return Ok(expr);
        }
        Err(self.unexpected("an expression"))
    }

    // Token-stream plumbing.

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> FallResult<&Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.unexpected(expected))
    }

    fn identifier(&mut self, expected: &str) -> FallResult<String> {
        Ok(self.consume(TokenKind::Ident, expected)?.lexeme.clone())
    }

    fn string(&mut self, expected: &str) -> FallResult<String> {
        Ok(self.consume(TokenKind::Str, expected)?.lexeme.clone())
    }

    fn skip_terminators(&mut self) {
        while self.check(TokenKind::Terminator) {
            self.advance();
        }
    }

    fn end_of_statement(&mut self) -> FallResult<()> {
        if self.check(TokenKind::Eof) || self.matches(TokenKind::Terminator) {
            return Ok(());
        }
        Err(self.unexpected("'//' or end of line"))
    }

    fn unexpected(&self, expected: &str) -> FallError {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of input".to_string()
        } else {
            token.lexeme.clone()
        };
        FallError::Syntax {
            line: token.line,
            column: token.column,
            found,
            expected: expected.to_string(),
        }
    }
}
