//! Proof execution: step-by-step justification tracking for BEGIN PROOF
//! blocks.
//!
//! The executor is the only component allowed to add propositions to a proof
//! context, and every insertion carries a justification. A derived entry whose
//! premises are not already established is rejected at insertion time, so an
//! unsound context cannot be constructed even by buggy calling code.

use crate::ast::{AxiomDefinition, Expr, ProofBlock, PropositionDefinition, StepAction};
use crate::error::{FallError, FallResult};
use crate::framework::Validator;
use crate::logic::{NumericProposition, Proposition};
use crate::report::compute_content_hash;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

/// Why a proposition is established in a proof context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Justification {
    /// Listed in the proof's GIVEN clause.
    Given,
    /// Established by a top-level ASSERT before the proof began.
    TopLevelFact,
    /// Asserted by a proof step.
    Asserted { step: u32 },
    /// Inferred from established premises through a named axiom.
    Derived {
        axiom: String,
        premises: Vec<Proposition>,
        step: u32,
    },
}

/// Audit record for one executed proof step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: u32,
    pub action: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Insertion-ordered map of established propositions to their justifications,
/// plus the step-by-step audit trail.
#[derive(Debug, Clone, Default)]
pub struct ProofState {
    entries: IndexMap<Proposition, Justification>,
    history: Vec<StepRecord>,
}

impl ProofState {
    /// Maximum proof steps before execution is aborted.
    pub const MAX_STEPS: usize = 10_000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_established(&self, proposition: &Proposition) -> bool {
        self.entries.contains_key(proposition)
    }

    pub fn justification(&self, proposition: &Proposition) -> Option<&Justification> {
        self.entries.get(proposition)
    }

    /// Established propositions in insertion order.
    pub fn established(&self) -> impl Iterator<Item = &Proposition> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Establish a proposition. A derived justification must name premises
    /// that are already established, otherwise insertion fails and the
    /// context is unchanged.
    pub fn insert(
        &mut self,
        proposition: Proposition,
        justification: Justification,
    ) -> FallResult<()> {
        if let Justification::Derived { step, premises, .. } = &justification {
            for premise in premises {
                if !self.entries.contains_key(premise) {
                    return Err(FallError::UnjustifiedInference {
                        step: *step,
                        detail: format!("premise '{}' is not established", premise.render()),
                    });
                }
            }
        }
        self.entries.insert(proposition, justification);
        Ok(())
    }

    pub fn record(&mut self, record: StepRecord) -> FallResult<()> {
        if self.history.len() >= Self::MAX_STEPS {
            return Err(FallError::ResourceLimit {
                resource: "proof steps".to_string(),
                limit: Self::MAX_STEPS,
                actual: self.history.len() + 1,
            });
        }
        self.history.push(record);
        Ok(())
    }

    /// Deterministic hash of the full derivation chain: every established
    /// proposition with its justification, in insertion order. Identical
    /// proofs executed at different times hash identically.
    pub fn derivation_hash(&self) -> FallResult<String> {
        let chain: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|(proposition, justification)| {
                Ok(serde_json::json!({
                    "proposition": proposition.render(),
                    "justification": serde_json::to_value(justification)?,
                }))
            })
            .collect::<FallResult<_>>()?;
        Ok(compute_content_hash(&serde_json::Value::Array(chain)))
    }
}

/// Build the proposition an expression denotes. Identifiers become atomic
/// propositions named after themselves; resolution against definitions is the
/// caller's concern.
pub fn realize(expr: &Expr) -> FallResult<Proposition> {
    match expr {
        Expr::Ident(name) => Proposition::atomic(name.clone()),
        Expr::Bool(value) => Proposition::with_truth(if *value { "⊤" } else { "⊥" }, *value),
        Expr::Number(value) => Ok(Proposition::Numeric(NumericProposition::constant(
            value.to_string(),
            *value,
        )?)),
        Expr::Unary { op, operand } => {
            Proposition::compound(*op, vec![realize(operand)?])
        }
        Expr::Binary { op, lhs, rhs } => {
            Proposition::compound(*op, vec![realize(lhs)?, realize(rhs)?])
        }
    }
}

/// Collect the free identifier leaves of an expression, left to right.
pub fn free_identifiers(expr: &Expr) -> Vec<&str> {
    fn walk<'a>(expr: &'a Expr, out: &mut Vec<&'a str>) {
        match expr {
            Expr::Ident(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Bool(_) | Expr::Number(_) => {}
            Expr::Unary { operand, .. } => walk(operand, out),
            Expr::Binary { lhs, rhs, .. } => {
                walk(lhs, out);
                walk(rhs, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(expr, &mut out);
    out
}

/// First-order structural matching of an axiom pattern against a concrete
/// proposition. Identifier leaves are variables; a variable bound earlier in
/// the same match must bind to a structurally equal proposition later.
pub fn match_pattern(
    pattern: &Expr,
    target: &Proposition,
    bindings: &mut HashMap<String, Proposition>,
) -> bool {
    match (pattern, target) {
        (Expr::Ident(name), _) => match bindings.get(name) {
            Some(bound) => bound == target,
            None => {
                bindings.insert(name.clone(), target.clone());
                true
            }
        },
        (Expr::Bool(value), Proposition::Atomic { truth: Some(t), .. }) => value == t,
        (Expr::Number(value), Proposition::Numeric(n)) => n.symbol() == value.to_string(),
        (
            Expr::Unary { op, operand },
            Proposition::Compound { operator, operands },
        ) => op == operator && operands.len() == 1 && match_pattern(operand, &operands[0], bindings),
        (
            Expr::Binary { op, lhs, rhs },
            Proposition::Compound { operator, operands },
        ) => {
            op == operator
                && operands.len() == 2
                && match_pattern(lhs, &operands[0], bindings)
                && match_pattern(rhs, &operands[1], bindings)
        }
        _ => false,
    }
}

/// Tunable execution limits and goal-check behavior.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub max_steps: usize,
    pub timeout_secs: f64,
    /// Accept a goal that is logically equivalent to an established
    /// proposition, not only structurally equal.
    pub semantic_equivalence: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_steps: ProofState::MAX_STEPS,
            timeout_secs: 30.0,
            semantic_equivalence: true,
        }
    }
}

/// Final outcome of one proof block.
#[derive(Debug, Clone)]
pub struct ProofOutcome {
    pub success: bool,
    pub goal: Proposition,
    pub state: ProofState,
    pub error: Option<String>,
    /// Tolerated contradictions surfaced during validation.
    pub flags: Vec<String>,
    /// Present only for successful proofs.
    pub derivation_hash: Option<String>,
}

/// Drives a proof block to completion against a validator and the program's
/// definition tables.
#[derive(Debug, Clone)]
pub struct ProofExecutor {
    validator: Validator,
    config: ExecutorConfig,
}

impl ProofExecutor {
    pub fn new(validator: Validator, config: ExecutorConfig) -> Self {
        Self { validator, config }
    }

    /// Execute every step of `proof` in order.
    ///
    /// Unknown names (givens, axioms) are hard errors. A step whose inference
    /// cannot be justified is recorded as failed and aborts the remaining
    /// steps; the outcome then reports failure rather than an error.
    pub fn execute(
        &self,
        proof: &ProofBlock,
        axioms: &IndexMap<String, AxiomDefinition>,
        propositions: &IndexMap<String, PropositionDefinition>,
        facts: &IndexMap<Proposition, Justification>,
    ) -> FallResult<ProofOutcome> {
        let started = Instant::now();
        let mut state = ProofState::new();
        let mut flags = Vec::new();

        for (fact, _) in facts {
            state.insert(fact.clone(), Justification::TopLevelFact)?;
        }
        for given in &proof.givens {
            if !propositions.contains_key(given) {
                return Err(FallError::UnknownReference {
                    name: given.clone(),
                });
            }
            state.insert(Proposition::atomic(given.clone())?, Justification::Given)?;
        }
        for axiom in &proof.using {
            if !axioms.contains_key(axiom) {
                return Err(FallError::UnknownReference {
                    name: axiom.clone(),
                });
            }
        }

        let goal = realize(&proof.goal)?;
        debug!(goal = %goal.render(), givens = proof.givens.len(), "executing proof");

        let mut failure: Option<String> = None;
        for step in &proof.steps {
            if started.elapsed().as_secs_f64() > self.config.timeout_secs {
                return Err(FallError::Timeout {
                    operation: "proof execution".to_string(),
                    limit_secs: self.config.timeout_secs,
                });
            }
            if state.history().len() >= self.config.max_steps {
                return Err(FallError::ResourceLimit {
                    resource: "proof steps".to_string(),
                    limit: self.config.max_steps,
                    actual: state.history().len() + 1,
                });
            }
            let action_text = match &step.action {
                StepAction::Assert(expr) => format!("ASSERT {}", expr),
                StepAction::Infer { goal, premises, via } => {
                    format!("INFER {} FROM [{}] VIA {}", goal, premises.join(", "), via)
                }
            };
            let result = self.execute_step(step.number, &step.action, axioms, propositions, &mut state, &mut flags);
            match result {
                Ok(()) => {
                    state.record(StepRecord {
                        step: step.number,
                        action: action_text,
                        success: true,
                        error: None,
                    })?;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(step = step.number, error = %e, "proof step failed");
                    let message = e.to_string();
                    state.record(StepRecord {
                        step: step.number,
                        action: action_text,
                        success: false,
                        error: Some(message.clone()),
                    })?;
                    failure = Some(message);
                    break;
                }
            }
        }

        let established = failure.is_none() && self.goal_satisfied(&goal, &state);
        let derivation_hash = if established {
            Some(state.derivation_hash()?)
        } else {
            None
        };
        let error = failure.or_else(|| {
            if established {
                None
            } else {
                Some(format!("goal '{}' was not established", goal.render()))
            }
        });
        Ok(ProofOutcome {
            success: established,
            goal,
            state,
            error: if established { None } else { error },
            flags,
            derivation_hash,
        })
    }

    fn goal_satisfied(&self, goal: &Proposition, state: &ProofState) -> bool {
        if state.is_established(goal) {
            return true;
        }
        self.config.semantic_equivalence
            && state.established().any(|p| p.equivalent(goal))
    }

    fn execute_step(
        &self,
        step: u32,
        action: &StepAction,
        axioms: &IndexMap<String, AxiomDefinition>,
        propositions: &IndexMap<String, PropositionDefinition>,
        state: &mut ProofState,
        flags: &mut Vec<String>,
    ) -> FallResult<()> {
        match action {
            StepAction::Assert(expr) => {
                for name in free_identifiers(expr) {
                    if !propositions.contains_key(name) {
                        return Err(FallError::UnknownReference {
                            name: name.to_string(),
                        });
                    }
                    let atom = Proposition::atomic(name)?;
                    if !state.is_established(&atom) {
                        return Err(FallError::UnjustifiedInference {
                            step,
                            detail: format!(
                                "'{}' is defined but not established in this proof",
                                name
                            ),
                        });
                    }
                }
                let proposition = realize(expr)?;
                self.validate(step, &proposition, state, flags)?;
                state.insert(proposition, Justification::Asserted { step })
            }
            StepAction::Infer { goal, premises, via } => {
                let axiom = axioms.get(via).ok_or_else(|| FallError::UnknownReference {
                    name: via.clone(),
                })?;
                let mut resolved = Vec::with_capacity(premises.len());
                for name in premises {
                    let atom = Proposition::atomic(name.clone())?;
                    if !state.is_established(&atom) {
                        return Err(FallError::UnjustifiedInference {
                            step,
                            detail: format!("premise '{}' is not established", name),
                        });
                    }
                    resolved.push(atom);
                }
                if resolved.len() < axiom.premises.len() {
                    let missing: Vec<String> = axiom.premises[resolved.len()..]
                        .iter()
                        .map(|pattern| pattern.to_string())
                        .collect();
                    return Err(FallError::UnjustifiedInference {
                        step,
                        detail: format!(
                            "axiom '{}' takes {} premises, {} given; no premise supplied for {}",
                            via,
                            axiom.premises.len(),
                            resolved.len(),
                            missing.join(", ")
                        ),
                    });
                }
                if resolved.len() > axiom.premises.len() {
                    return Err(FallError::UnjustifiedInference {
                        step,
                        detail: format!(
                            "axiom '{}' takes {} premises, {} given",
                            via,
                            axiom.premises.len(),
                            resolved.len()
                        ),
                    });
                }
                let mut bindings = HashMap::new();
                for (slot, (pattern, premise)) in
                    axiom.premises.iter().zip(&resolved).enumerate()
                {
                    if !match_pattern(pattern, premise, &mut bindings) {
                        return Err(FallError::UnjustifiedInference {
                            step,
                            detail: format!(
                                "premise '{}' does not fit slot {} of axiom '{}'",
                                premise.render(),
                                slot + 1,
                                via
                            ),
                        });
                    }
                }
                let conclusion = realize(goal)?;
                if let Some(pattern) = &axiom.conclusion {
                    if !match_pattern(pattern, &conclusion, &mut bindings) {
                        return Err(FallError::UnjustifiedInference {
                            step,
                            detail: format!(
                                "conclusion '{}' does not follow from axiom '{}'",
                                conclusion.render(),
                                via
                            ),
                        });
                    }
                }
                self.validate(step, &conclusion, state, flags)?;
                state.insert(
                    conclusion,
                    Justification::Derived {
                        axiom: via.clone(),
                        premises: resolved,
                        step,
                    },
                )
            }
        }
    }

    fn validate(
        &self,
        step: u32,
        proposition: &Proposition,
        state: &ProofState,
        flags: &mut Vec<String>,
    ) -> FallResult<()> {
        let context: Vec<&Proposition> = state.established().collect();
        let result = self.validator.validate(proposition, &context);
        flags.extend(result.flags.iter().cloned());
        if result.is_valid {
            return Ok(());
        }
        debug!(step, proposition = %proposition.render(), "validation rejected proposition");
        Err(FallError::FrameworkIncompatible {
            framework: self.validator.framework().id().to_string(),
            violations: result.messages(),
        })
    }
}
