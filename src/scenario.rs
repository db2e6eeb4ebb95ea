//! Scenario runner for comparing projection policies
//!
//! Holds one input set and runs it under several repayment and cash timing
//! configurations. Each run is independent, so batches run in parallel.

use crate::assumptions::CorporateTax;
use crate::inputs::ProjectionInputs;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult, ProjectionSummary};
use rayon::prelude::*;

/// Headline figures for one configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ScenarioOutcome {
    pub config: ProjectionConfig,
    pub summary: ProjectionSummary,
}

#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    inputs: ProjectionInputs,
    tax: CorporateTax,
}

impl ScenarioRunner {
    pub fn new(inputs: ProjectionInputs) -> Self {
        Self {
            inputs,
            tax: CorporateTax::default(),
        }
    }

    pub fn with_tax(inputs: ProjectionInputs, tax: CorporateTax) -> Self {
        Self { inputs, tax }
    }

    /// Run a single projection with the given config
    pub fn run(&self, config: ProjectionConfig) -> ProjectionResult {
        ProjectionEngine::with_tax(config, self.tax).project(&self.inputs)
    }

    /// Run several configurations, results in the order of `configs`
    pub fn run_scenarios(&self, configs: &[ProjectionConfig]) -> Vec<ProjectionResult> {
        configs.par_iter().map(|config| self.run(*config)).collect()
    }

    /// Summaries for every repayment x cash timing combination
    pub fn compare_all(&self) -> Vec<ScenarioOutcome> {
        let configs = ProjectionConfig::all_combinations();
        self.run_scenarios(&configs)
            .into_iter()
            .map(|result| ScenarioOutcome {
                config: result.config,
                summary: result.summary(),
            })
            .collect()
    }
}
