//! Rule registry
//!
//! Built once at startup from a fixed list, read-only afterwards. Iteration
//! follows registration order so scan reports are reproducible.

use crate::config::Config;
use crate::library;
use crate::rule::{Rule, RuleError};
use std::collections::HashMap;
use thiserror::Error;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate rule id: {0}")]
    DuplicateId(String),

    #[error("Rule not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Rule id to rule mapping, in registration order
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in rule library
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for rule in library::builtin_rules()? {
            registry.register(rule)?;
        }
        log::debug!("Registered {} built-in rules", registry.len());
        Ok(registry)
    }

    pub fn register(&mut self, rule: Rule) -> Result<(), RegistryError> {
        if self.index.contains_key(&rule.id) {
            return Err(RegistryError::DuplicateId(rule.id));
        }
        log::debug!("Registering rule {}", rule.id);
        self.index.insert(rule.id.clone(), self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Result<&Rule, RegistryError> {
        self.index
            .get(id)
            .map(|&i| &self.rules[i])
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// All rules, in registration order
    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules enabled by the configuration, in registration order
    pub fn select(&self, config: &Config) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| config.is_rule_enabled(&r.id))
            .collect()
    }
}
