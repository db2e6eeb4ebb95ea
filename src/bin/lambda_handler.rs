//! AWS Lambda handler for running projections
//!
//! Accepts the projection inputs and policy choices as a JSON event and returns
//! the annual view, the headline summary, and optionally the monthly records.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use profit_projection::{
    ActionPlanRow, AnnualRecord, PeriodRecord, ProjectRow, ProjectionConfig, ProjectionEngine,
    ProjectionInputs, ProjectionSummary, SimulationParameters,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Input for one projection
#[derive(Debug, Deserialize)]
pub struct ProjectionRequest {
    pub parameters: SimulationParameters,

    #[serde(default)]
    pub projects: Vec<ProjectRow>,

    #[serde(default)]
    pub action_plans: Vec<ActionPlanRow>,

    /// Repayment and cash timing policies (defaults: fixed-target, collection-schedule)
    #[serde(default)]
    pub config: ProjectionConfig,

    /// Include the 60 monthly records in the response
    #[serde(default)]
    pub include_monthly: bool,

    /// Start the annual view with a year-0 opening-balance row
    #[serde(default = "default_opening_row")]
    pub opening_row: bool,
}

fn default_opening_row() -> bool {
    true
}

/// Output from the projection
#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub config: ProjectionConfig,
    pub summary: ProjectionSummary,
    pub plan_columns: Vec<String>,
    pub annual: Vec<AnnualRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly: Option<Vec<PeriodRecord>>,
    pub execution_time_ms: u64,
}

async fn handler(event: LambdaEvent<ProjectionRequest>) -> Result<ProjectionResponse, Error> {
    let start = Instant::now();
    let request = event.payload;

    // Reject inputs the engine assumes are clean
    request.parameters.validate()?;

    let inputs = ProjectionInputs::new(request.parameters, request.projects, request.action_plans);
    let result = ProjectionEngine::new(request.config).project(&inputs);

    let annual = if request.opening_row {
        result.annual_with_opening()
    } else {
        result.annual()
    };

    info!(
        "Projected {} projects / {} action plans in {:?}",
        inputs.projects.len(),
        inputs.action_plans.len(),
        start.elapsed()
    );

    Ok(ProjectionResponse {
        config: result.config,
        summary: result.summary(),
        plan_columns: result.plan_columns.clone(),
        annual,
        monthly: request.include_monthly.then_some(result.records),
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
