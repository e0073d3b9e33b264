//! Statement-by-statement execution of FALL programs.
//!
//! Lexical and syntax errors abort a run before any statement executes.
//! Runtime errors are scoped to their statement: the failure is captured in
//! that statement's report and execution continues, so one bad inference does
//! not hide the reports of later statements.

use crate::ast::{
    Expr, Pragma, Program, PropositionDefinition, RuleDefinition, Statement,
};
use crate::error::{FallError, FallResult};
use crate::executor::{
    free_identifiers, realize, ExecutorConfig, Justification, ProofExecutor, ProofOutcome,
};
use crate::framework::Validator;
use crate::logic::Proposition;
use crate::nlp::{NlpBridge, PatternBridge, SentenceStructure};
use crate::parser::parse;
use crate::registry::Registry;
use crate::report::{StatementKind, StatementReport, TruthValue};
use crate::selector::{FrameworkSelector, Selection};
use indexmap::IndexMap;
use std::time::Instant;
use tracing::{debug, info};

/// Accumulated program state: definition tables, established facts, and the
/// most recent proof outcome.
pub struct Environment {
    registry: Registry,
    framework_id: String,
    rules: IndexMap<String, RuleDefinition>,
    axioms: IndexMap<String, crate::ast::AxiomDefinition>,
    propositions: IndexMap<String, PropositionDefinition>,
    structures: IndexMap<String, SentenceStructure>,
    facts: IndexMap<Proposition, Justification>,
    last_proof: Option<ProofOutcome>,
    bridge: Box<dyn NlpBridge>,
    bridge_enabled: bool,
    config: ExecutorConfig,
}

impl Environment {
    pub fn new(registry: Registry, framework_id: impl Into<String>) -> Self {
        Self {
            registry,
            framework_id: framework_id.into(),
            rules: IndexMap::new(),
            axioms: IndexMap::new(),
            propositions: IndexMap::new(),
            structures: IndexMap::new(),
            facts: IndexMap::new(),
            last_proof: None,
            bridge: Box::new(PatternBridge),
            bridge_enabled: false,
            config: ExecutorConfig::default(),
        }
    }

    pub fn framework_id(&self) -> &str {
        &self.framework_id
    }

    pub fn last_proof(&self) -> Option<&ProofOutcome> {
        self.last_proof.as_ref()
    }

    pub fn structure(&self, name: &str) -> Option<&SentenceStructure> {
        self.structures.get(name)
    }

    pub fn is_fact(&self, proposition: &Proposition) -> bool {
        self.facts.contains_key(proposition)
    }

    fn validator(&self) -> FallResult<Validator> {
        let framework = self
            .registry
            .framework(&self.framework_id)
            .ok_or_else(|| FallError::UnknownReference {
                name: self.framework_id.clone(),
            })?;
        Ok(Validator::new(framework.clone()))
    }

    /// Whether `proposition` is established anywhere: as a top-level fact or
    /// in the most recent successful proof.
    fn established(&self, proposition: &Proposition) -> bool {
        if self.facts.contains_key(proposition) {
            return true;
        }
        match &self.last_proof {
            Some(outcome) if outcome.success => outcome.state.is_established(proposition),
            _ => false,
        }
    }
}

/// Executes parsed programs against an [`Environment`].
pub struct Interpreter {
    env: Environment,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter over the standard registry under classical semantics.
    pub fn new() -> Self {
        Self {
            env: Environment::new(Registry::standard(), "classical"),
        }
    }

    /// An interpreter pinned to a named registered framework.
    pub fn with_framework(framework_id: &str) -> FallResult<Self> {
        let registry = Registry::standard();
        if registry.framework(framework_id).is_none() {
            return Err(FallError::UnknownReference {
                name: framework_id.to_string(),
            });
        }
        Ok(Self {
            env: Environment::new(registry, framework_id),
        })
    }

    /// An interpreter whose framework is chosen by requirement-tag scoring.
    pub fn for_requirements(requirements: &[String]) -> FallResult<Self> {
        let registry = Registry::standard();
        let framework_id = match FrameworkSelector::new(&registry).select(requirements) {
            Selection::Selected { framework, score } => {
                info!(framework = framework.id(), score, "framework selected");
                framework.id().to_string()
            }
            Selection::NoCompatibleFramework => {
                return Err(FallError::Validation {
                    field: "requirements".to_string(),
                    message: format!(
                        "no registered framework satisfies [{}]",
                        requirements.join(", ")
                    ),
                })
            }
        };
        Ok(Self {
            env: Environment::new(registry, framework_id),
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn set_config(&mut self, config: ExecutorConfig) {
        self.env.config = config;
    }

    /// Parse and run a source text. Lexical and syntax errors fail the whole
    /// run; no statement executes.
    pub fn run_source(&mut self, source: &str) -> FallResult<Vec<StatementReport>> {
        let program = parse(source)?;
        self.run(&program)
    }

    /// Run an already-parsed program, producing one report per statement.
    pub fn run(&mut self, program: &Program) -> FallResult<Vec<StatementReport>> {
        let mut reports = Vec::with_capacity(program.statements.len());
        for statement in &program.statements {
            let report = match self.execute(statement) {
                Ok(report) => report,
                Err(e) => StatementReport::failure(kind_of(statement), subject_of(statement), e.to_string()),
            };
            debug!(
                kind = ?report.kind,
                subject = report.subject.as_deref().unwrap_or(""),
                success = report.success,
                "statement executed"
            );
            reports.push(report);
        }
        Ok(reports)
    }

    fn execute(&mut self, statement: &Statement) -> FallResult<StatementReport> {
        match statement {
            Statement::RuleDef(rule) => self.define_rule(rule.clone()),
            Statement::AxiomDef(axiom) => self.define_axiom(axiom.clone()),
            Statement::PropositionDef(definition) => self.define_proposition(definition.clone()),
            Statement::Assertion(expr) => self.assert_fact(expr),
            Statement::Proof(proof) => self.run_proof(proof),
            Statement::Query { name } => self.query(name),
            Statement::Symbolize { name } => self.symbolize(name),
            Statement::Pragma(Pragma::BridgeNlp(enabled)) => {
                self.env.bridge_enabled = *enabled;
                Ok(StatementReport::success(
                    StatementKind::Pragma,
                    None,
                    format!("NLP bridge {}", if *enabled { "enabled" } else { "disabled" }),
                ))
            }
        }
    }

    fn define_rule(&mut self, rule: RuleDefinition) -> FallResult<StatementReport> {
        if self.env.rules.contains_key(&rule.name) {
            return Err(FallError::Redefinition {
                name: rule.name.clone(),
            });
        }
        let report = StatementReport::success(
            StatementKind::RuleDefinition,
            Some(rule.name.clone()),
            format!(
                "rule '{}' defined with {} condition(s)",
                rule.name,
                rule.conditions.len()
            ),
        );
        self.env.rules.insert(rule.name.clone(), rule);
        Ok(report)
    }

    fn define_axiom(&mut self, axiom: crate::ast::AxiomDefinition) -> FallResult<StatementReport> {
        if self.env.axioms.contains_key(&axiom.name) {
            return Err(FallError::Redefinition {
                name: axiom.name.clone(),
            });
        }
        let shape = match &axiom.conclusion {
            Some(conclusion) => format!(
                "{} premise(s) concluding {}",
                axiom.premises.len(),
                conclusion
            ),
            None => format!("{} premise(s), open conclusion", axiom.premises.len()),
        };
        let report = StatementReport::success(
            StatementKind::AxiomDefinition,
            Some(axiom.name.clone()),
            format!("axiom '{}' defined: {}", axiom.name, shape),
        );
        self.env.axioms.insert(axiom.name.clone(), axiom);
        Ok(report)
    }

    fn define_proposition(
        &mut self,
        definition: PropositionDefinition,
    ) -> FallResult<StatementReport> {
        if self.env.propositions.contains_key(&definition.name) {
            return Err(FallError::Redefinition {
                name: definition.name.clone(),
            });
        }
        let mut report = StatementReport::success(
            StatementKind::PropositionDefinition,
            Some(definition.name.clone()),
            format!("proposition '{}' defined", definition.name),
        );

        let structure = if self.env.bridge_enabled {
            let started = Instant::now();
            let extracted = self.env.bridge.extract_structure(&definition.text);
            if started.elapsed().as_secs_f64() > self.env.config.timeout_secs {
                return Err(FallError::Timeout {
                    operation: "sentence analysis".to_string(),
                    limit_secs: self.env.config.timeout_secs,
                });
            }
            match extracted {
                Ok(structure) => Some(structure),
                Err(e) if !definition.tags.is_empty() => {
                    report.diagnostics.push(e.to_string());
                    Some(structure_from_tags(&definition))
                }
                Err(e) => return Err(e),
            }
        } else {
            if definition.tags.is_empty() {
                return Err(FallError::Validation {
                    field: "proposition".to_string(),
                    message: format!(
                        "'{}' has no WHERE annotation and the NLP bridge is off",
                        definition.name
                    ),
                });
            }
            Some(structure_from_tags(&definition))
        };

        // Tags outside every defined grammatical category are suspicious but
        // not fatal.
        if !self.env.rules.is_empty() {
            for tag in &definition.tags {
                if !self.known_category(&tag.tag) {
                    report.diagnostics.push(format!(
                        "tag '{}' does not appear in any defined rule",
                        tag.tag
                    ));
                }
            }
        }

        if let Some(structure) = structure {
            self.env
                .structures
                .insert(definition.name.clone(), structure);
        }
        self.env
            .propositions
            .insert(definition.name.clone(), definition);
        Ok(report)
    }

    fn known_category(&self, tag: &str) -> bool {
        self.env.rules.values().any(|rule| {
            rule.conditions.iter().any(|condition| {
                condition.subject == tag
                    || condition.alternatives.iter().any(|alt| alt == tag)
            })
        })
    }

    fn assert_fact(&mut self, expr: &Expr) -> FallResult<StatementReport> {
        for name in free_identifiers(expr) {
            if !self.env.propositions.contains_key(name) {
                return Err(FallError::UnknownReference {
                    name: name.to_string(),
                });
            }
        }
        let proposition = realize(expr)?;
        let validator = self.env.validator()?;
        let context: Vec<&Proposition> = self.env.facts.keys().collect();
        let result = validator.validate(&proposition, &context);
        if !result.is_valid {
            return Err(FallError::FrameworkIncompatible {
                framework: self.env.framework_id.clone(),
                violations: result.messages(),
            });
        }
        let rendered = proposition.render();
        let mut report = StatementReport::success(
            StatementKind::Assertion,
            None,
            format!("asserted {}", rendered),
        );
        report.rendered = Some(rendered);
        report.flags = result.flags;
        self.env
            .facts
            .insert(proposition, Justification::TopLevelFact);
        Ok(report)
    }

    fn run_proof(&mut self, proof: &crate::ast::ProofBlock) -> FallResult<StatementReport> {
        let validator = self.env.validator()?;
        let executor = ProofExecutor::new(validator, self.env.config.clone());
        let outcome = executor.execute(
            proof,
            &self.env.axioms,
            &self.env.propositions,
            &self.env.facts,
        )?;

        let mut report = StatementReport::new(StatementKind::Proof, None);
        report.success = outcome.success;
        report.rendered = Some(outcome.goal.render());
        report.history = outcome.state.history().to_vec();
        report.flags = outcome.flags.clone();
        report.derivation_hash = outcome.derivation_hash.clone();
        report.message = if outcome.success {
            format!("proved {}", outcome.goal.render())
        } else {
            outcome
                .error
                .clone()
                .unwrap_or_else(|| "proof failed".to_string())
        };
        self.env.last_proof = Some(outcome);
        Ok(report)
    }

    fn query(&self, name: &str) -> FallResult<StatementReport> {
        let in_propositions = self.env.propositions.contains_key(name);
        let in_axioms = self.env.axioms.contains_key(name);
        if in_propositions && in_axioms {
            return Err(FallError::AmbiguousQuery {
                name: name.to_string(),
            });
        }
        if in_axioms {
            let mut report = StatementReport::success(
                StatementKind::Query,
                Some(name.to_string()),
                format!("'{}' is an axiom and holds by definition", name),
            );
            report.truth = Some(TruthValue::True);
            return Ok(report);
        }
        if !in_propositions {
            return Err(FallError::UnknownReference {
                name: name.to_string(),
            });
        }
        let atom = Proposition::atomic(name)?;
        let truth = if self.env.established(&atom) {
            TruthValue::True
        } else if self.env.established(&atom.negated()) {
            TruthValue::False
        } else {
            TruthValue::Unknown
        };
        let mut report = StatementReport::success(
            StatementKind::Query,
            Some(name.to_string()),
            format!("'{}' is {}", name, truth),
        );
        report.truth = Some(truth);
        Ok(report)
    }

    fn symbolize(&self, name: &str) -> FallResult<StatementReport> {
        let definition = self.env.propositions.get(name).ok_or_else(|| {
            FallError::UnknownReference {
                name: name.to_string(),
            }
        })?;
        let rendered = Proposition::atomic(name)?.render();
        let mut report = StatementReport::success(
            StatementKind::Symbolize,
            Some(name.to_string()),
            format!("{} ≔ \"{}\"", rendered, definition.text),
        );
        if let Some(structure) = self.env.structures.get(name) {
            report.diagnostics.push(format!(
                "subject '{}', predicate '{}'",
                structure.subject, structure.predicate
            ));
        }
        report.rendered = Some(rendered);
        Ok(report)
    }
}

fn structure_from_tags(definition: &PropositionDefinition) -> SentenceStructure {
    let find = |wanted: &str| {
        definition
            .tags
            .iter()
            .find(|tag| tag.tag.eq_ignore_ascii_case(wanted))
            .map(|tag| tag.value.clone())
            .unwrap_or_default()
    };
    SentenceStructure {
        subject: find("SUBJECT"),
        predicate: find("PREDICATE"),
        copula: "is".to_string(),
        quantifier: None,
    }
}

fn kind_of(statement: &Statement) -> StatementKind {
    match statement {
        Statement::RuleDef(_) => StatementKind::RuleDefinition,
        Statement::AxiomDef(_) => StatementKind::AxiomDefinition,
        Statement::PropositionDef(_) => StatementKind::PropositionDefinition,
        Statement::Assertion(_) => StatementKind::Assertion,
        Statement::Proof(_) => StatementKind::Proof,
        Statement::Query { .. } => StatementKind::Query,
        Statement::Symbolize { .. } => StatementKind::Symbolize,
        Statement::Pragma(_) => StatementKind::Pragma,
    }
}

fn subject_of(statement: &Statement) -> Option<String> {
    match statement {
        Statement::RuleDef(rule) => Some(rule.name.clone()),
        Statement::AxiomDef(axiom) => Some(axiom.name.clone()),
        Statement::PropositionDef(definition) => Some(definition.name.clone()),
        Statement::Query { name } | Statement::Symbolize { name } => Some(name.clone()),
        Statement::Assertion(_) | Statement::Proof(_) | Statement::Pragma(_) => None,
    }
}
