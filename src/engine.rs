//! Scan engine: runs the active rules over every element of a tree

use crate::config::Config;
use crate::element::{Element, ElementId, ElementTree};
use crate::evaluation::{EvaluationCode, RuleResult};
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleError};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-rule timing statistics
#[derive(Debug, Clone, Default)]
pub struct RuleTiming {
    pub rule_id: String,
    /// Total time spent on this rule
    pub total_time: Duration,
    /// Number of elements the rule was evaluated against
    pub evaluation_count: usize,
    /// Number of elements the rule applied to
    pub applicable_count: usize,
    /// Number of results that were neither Pass nor NotApplicable
    pub finding_count: usize,
}

impl RuleTiming {
    pub fn new(rule_id: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            ..Default::default()
        }
    }

    /// Average time per evaluation
    pub fn avg_time(&self) -> Duration {
        if self.evaluation_count > 0 {
            self.total_time / self.evaluation_count as u32
        } else {
            Duration::ZERO
        }
    }
}

/// Result of a scan
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Reported results, in tree pre-order then registration order
    pub results: Vec<RuleResult>,

    pub elements_scanned: usize,

    /// Number of active rules
    pub rules_run: usize,

    /// Count of every evaluated code, NotApplicable included
    pub counts: BTreeMap<EvaluationCode, usize>,

    pub duration: Duration,

    /// Per-rule timing statistics (rule_id -> timing)
    pub rule_timings: HashMap<String, RuleTiming>,
}

impl ScanResult {
    pub fn count(&self, code: EvaluationCode) -> usize {
        self.counts.get(&code).copied().unwrap_or(0)
    }

    /// Any Fail or Error
    pub fn has_blocking(&self) -> bool {
        self.count(EvaluationCode::Fail) + self.count(EvaluationCode::Error) > 0
    }

    /// Any Note or Unknown
    pub fn has_advisories(&self) -> bool {
        self.count(EvaluationCode::Note) + self.count(EvaluationCode::Unknown) > 0
    }

    /// Results that need attention
    pub fn findings(&self) -> impl Iterator<Item = &RuleResult> {
        self.results.iter().filter(|r| r.code.is_finding())
    }

    /// Get exit code (0 = clean, 1 = advisories, 2 = blocking findings)
    pub fn exit_code(&self) -> i32 {
        if self.has_blocking() {
            2
        } else if self.has_advisories() {
            1
        } else {
            0
        }
    }

    /// Merge another result into this one, appending its results
    pub fn merge(&mut self, other: ScanResult) {
        self.results.extend(other.results);
        self.elements_scanned += other.elements_scanned;
        for (code, n) in other.counts {
            *self.counts.entry(code).or_insert(0) += n;
        }

        for (rule_id, timing) in other.rule_timings {
            let entry = self
                .rule_timings
                .entry(rule_id)
                .or_insert_with(|| RuleTiming::new(&timing.rule_id));
            entry.total_time += timing.total_time;
            entry.evaluation_count += timing.evaluation_count;
            entry.applicable_count += timing.applicable_count;
            entry.finding_count += timing.finding_count;
        }
    }

    /// Get rule timings sorted by total time (descending)
    pub fn sorted_timings(&self) -> Vec<&RuleTiming> {
        let mut timings: Vec<_> = self.rule_timings.values().collect();
        timings.sort_by(|a, b| b.total_time.cmp(&a.total_time));
        timings
    }

    /// Format timing statistics as a table
    pub fn format_timings(&self) -> String {
        let timings = self.sorted_timings();
        if timings.is_empty() {
            return "No timing data available".to_string();
        }

        let mut output = String::from("Rule Timing Statistics:\n");
        output.push_str(&format!(
            "{:<32} {:>12} {:>12} {:>8} {:>8} {:>8}\n",
            "Rule ID", "Total", "Avg", "Evals", "Applied", "Findings"
        ));
        output.push_str(&"-".repeat(86));
        output.push('\n');

        for timing in timings {
            output.push_str(&format!(
                "{:<32} {:>10.2}ms {:>10.2}µs {:>8} {:>8} {:>8}\n",
                timing.rule_id,
                timing.total_time.as_secs_f64() * 1000.0,
                timing.avg_time().as_secs_f64() * 1_000_000.0,
                timing.evaluation_count,
                timing.applicable_count,
                timing.finding_count
            ));
        }

        output
    }
}

/// Evaluates the configured rule set against element trees
pub struct Engine {
    registry: Arc<RuleRegistry>,
    config: Config,
}

impl Engine {
    pub fn new(registry: Arc<RuleRegistry>, config: Config) -> Self {
        Self { registry, config }
    }

    /// Evaluate every active rule against every element of the tree
    pub fn scan(&self, tree: &ElementTree) -> ScanResult {
        let start = Instant::now();
        let rules = self.registry.select(&self.config);
        let elements: Vec<Element<'_>> = tree.iter().collect();

        log::debug!(
            "Scanning {} elements with {} rules",
            elements.len(),
            rules.len()
        );

        let partials: Vec<ScanResult> = if self.config.engine.parallel && elements.len() > 1 {
            let threads = if self.config.engine.jobs > 0 {
                self.config.engine.jobs
            } else {
                num_cpus::get()
            };
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(|| {
                    elements
                        .par_iter()
                        .map(|e| self.scan_element(&rules, *e))
                        .collect()
                }),
                Err(e) => {
                    log::warn!("Thread pool unavailable ({}), scanning sequentially", e);
                    self.scan_sequential(&rules, &elements)
                }
            }
        } else {
            self.scan_sequential(&rules, &elements)
        };

        let mut combined = ScanResult {
            rules_run: rules.len(),
            ..Default::default()
        };
        for partial in partials {
            combined.merge(partial);
        }
        combined.duration = start.elapsed();

        log::info!(
            "Scanned {} elements in {:.2}ms: {} findings",
            combined.elements_scanned,
            combined.duration.as_secs_f64() * 1000.0,
            combined.findings().count()
        );
        combined
    }

    /// Every active rule's result for one element, NotApplicable included
    pub fn evaluate_element(
        &self,
        tree: &ElementTree,
        id: ElementId,
    ) -> Result<Vec<RuleResult>, RuleError> {
        let element = tree.get(id).ok_or_else(|| {
            RuleError::InvalidArgument(format!("element {} is not in the tree", id))
        })?;

        Ok(self
            .registry
            .select(&self.config)
            .into_iter()
            .map(|rule| self.evaluate_rule(rule, element))
            .collect())
    }

    fn scan_sequential(&self, rules: &[&Rule], elements: &[Element<'_>]) -> Vec<ScanResult> {
        elements
            .iter()
            .map(|e| self.scan_element(rules, *e))
            .collect()
    }

    fn scan_element(&self, rules: &[&Rule], element: Element<'_>) -> ScanResult {
        let mut result = ScanResult {
            elements_scanned: 1,
            ..Default::default()
        };

        for rule in rules {
            let start = Instant::now();
            let outcome = self.evaluate_rule(rule, element);
            let elapsed = start.elapsed();

            let timing = result
                .rule_timings
                .entry(rule.id.clone())
                .or_insert_with(|| RuleTiming::new(&rule.id));
            timing.total_time += elapsed;
            timing.evaluation_count += 1;
            if outcome.code != EvaluationCode::NotApplicable {
                timing.applicable_count += 1;
            }
            if outcome.code.is_finding() {
                timing.finding_count += 1;
            }

            *result.counts.entry(outcome.code).or_insert(0) += 1;

            if outcome.code != EvaluationCode::NotApplicable
                || self.config.engine.report_not_applicable
            {
                result.results.push(outcome);
            }
        }

        result
    }

    /// Evaluate one rule, applying any configured severity override
    fn evaluate_rule(&self, rule: &Rule, element: Element<'_>) -> RuleResult {
        let mut outcome = rule.evaluate_detailed(element);

        if let Some(severity) = self.config.severity_override(&rule.id) {
            if outcome.code.is_finding() && outcome.code == rule.severity.failing_code() {
                outcome.code = severity.failing_code();
            }
        }

        outcome
    }
}
