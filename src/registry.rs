//! Statically populated lookup tables for operators and frameworks.
//!
//! Registries are built once during a startup phase and are read-only
//! thereafter; components that need lookups receive them by reference.

use crate::error::{FallError, FallResult};
use crate::framework::Framework;
use crate::logic::Operator;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    operators: BTreeMap<String, Operator>,
    frameworks: BTreeMap<String, Framework>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard registry: the full boolean operator set plus the
    /// classical, paraconsistent, and modal frameworks.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for operator in Operator::ALL {
            // Names in Operator::ALL are distinct, so registration cannot fail.
            let _ = registry.register_operator(operator);
        }
        let _ = registry.register_framework(Framework::classical());
        let _ = registry.register_framework(Framework::paraconsistent());
        let _ = registry.register_framework(Framework::modal());
        registry
    }

    pub fn register_operator(&mut self, operator: Operator) -> FallResult<()> {
        let name = operator.name().to_string();
        if self.operators.contains_key(&name) {
            return Err(FallError::Redefinition { name });
        }
        self.operators.insert(name, operator);
        Ok(())
    }

    pub fn register_framework(&mut self, framework: Framework) -> FallResult<()> {
        let id = framework.id().to_string();
        if self.frameworks.contains_key(&id) {
            return Err(FallError::Redefinition { name: id });
        }
        self.frameworks.insert(id, framework);
        Ok(())
    }

    pub fn operator(&self, name: &str) -> Option<Operator> {
        self.operators.get(name).copied()
    }

    pub fn framework(&self, id: &str) -> Option<&Framework> {
        self.frameworks.get(id)
    }

    /// Registered frameworks in lexical id order.
    pub fn frameworks(&self) -> impl Iterator<Item = &Framework> {
        self.frameworks.values()
    }

    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }
}
