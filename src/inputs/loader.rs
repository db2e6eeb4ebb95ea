//! Persisted projection configuration
//!
//! A single text file holds three sections, each introduced by a marker line
//! and followed by CSV with a header row:
//!
//! ```text
//! [parameters]
//! start_period,initial_cash,initial_debt,...
//! 2025-04,10000,50000,...
//! [projects]
//! name,monthly_revenue,collection_lag_months
//! Base business,8333.33,1
//! [action_plans]
//! category,name,monthly_impact,effective_from
//! Revenue,New client,2000,2025-10
//! ```
//!
//! Project and action plan rows that cannot be parsed are skipped with a
//! warning. A missing section or an invalid parameters row fails the load.

use super::{ActionPlanRow, PlanCategory, ProjectRow, ProjectionInputs, SimulationParameters};
use crate::error::ConfigError;
use crate::period::YearMonth;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::{debug, warn};
use std::fs;
use std::io::Write;
use std::path::Path;

pub const PARAMETERS_SECTION: &str = "parameters";
pub const PROJECTS_SECTION: &str = "projects";
pub const ACTION_PLANS_SECTION: &str = "action_plans";

const UTF8_BOM: char = '\u{feff}';

/// Raw project row; fields are validated individually so one bad row does not fail the load
#[derive(Debug, serde::Deserialize)]
struct CsvProjectRow {
    #[serde(default)]
    name: String,
    #[serde(default)]
    monthly_revenue: String,
    #[serde(default)]
    collection_lag_months: String,
}

impl CsvProjectRow {
    fn into_project(self) -> Result<ProjectRow, String> {
        let monthly_revenue: f64 = self
            .monthly_revenue
            .trim()
            .parse()
            .map_err(|_| format!("monthly_revenue {:?} is not a number", self.monthly_revenue))?;
        if !monthly_revenue.is_finite() || monthly_revenue < 0.0 {
            return Err(format!("monthly_revenue {} must be a non-negative amount", monthly_revenue));
        }

        let collection_lag_months = parse_lag(self.collection_lag_months.trim())?;

        Ok(ProjectRow {
            name: self.name,
            monthly_revenue,
            collection_lag_months,
        })
    }
}

/// Lags exported by spreadsheet tools often come back as `2.0`
fn parse_lag(raw: &str) -> Result<u32, String> {
    if let Ok(lag) = raw.parse::<u32>() {
        return Ok(lag);
    }
    match raw.parse::<f64>() {
        Ok(lag) if lag >= 0.0 && lag.fract() == 0.0 && lag <= u32::MAX as f64 => Ok(lag as u32),
        _ => Err(format!("collection_lag_months {:?} is not a non-negative integer", raw)),
    }
}

#[derive(Debug, serde::Deserialize)]
struct CsvActionPlanRow {
    #[serde(default)]
    category: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    monthly_impact: String,
    #[serde(default)]
    effective_from: String,
}

impl CsvActionPlanRow {
    fn into_action_plan(self) -> Result<ActionPlanRow, String> {
        let category: PlanCategory = self.category.trim().parse().map_err(|e| format!("{e}"))?;

        let monthly_impact: f64 = self
            .monthly_impact
            .trim()
            .parse()
            .map_err(|_| format!("monthly_impact {:?} is not a number", self.monthly_impact))?;
        if !monthly_impact.is_finite() {
            return Err(format!("monthly_impact {} is not finite", monthly_impact));
        }

        let effective_from = self.effective_from.trim();
        let effective_from = if effective_from.is_empty() {
            None
        } else {
            match effective_from.parse::<YearMonth>() {
                Ok(period) => Some(period),
                Err(e) => {
                    debug!("Action plan {:?} treated as never active: {}", self.name, e);
                    None
                }
            }
        };

        Ok(ActionPlanRow {
            category,
            name: self.name,
            monthly_impact,
            effective_from,
        })
    }
}

/// Section bodies keyed by marker
#[derive(Debug, Default)]
struct Sections {
    parameters: Option<String>,
    projects: Option<String>,
    action_plans: Option<String>,
}

impl Sections {
    fn body_mut(&mut self, section: &str) -> &mut Option<String> {
        match section {
            PARAMETERS_SECTION => &mut self.parameters,
            PROJECTS_SECTION => &mut self.projects,
            _ => &mut self.action_plans,
        }
    }
}

fn section_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim();
    let name = trimmed.strip_prefix('[')?.strip_suffix(']')?.trim();
    [PARAMETERS_SECTION, PROJECTS_SECTION, ACTION_PLANS_SECTION]
        .into_iter()
        .find(|section| section.eq_ignore_ascii_case(name))
}

fn split_sections(text: &str) -> Sections {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let mut sections = Sections::default();
    let mut current: Option<&'static str> = None;

    for line in text.lines() {
        if let Some(marker) = section_marker(line) {
            sections.body_mut(marker).get_or_insert_with(String::new).clear();
            current = Some(marker);
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        match current {
            Some(marker) => {
                let body = sections.body_mut(marker).get_or_insert_with(String::new);
                body.push_str(line);
                body.push('\n');
            }
            None => debug!("Ignoring line outside any section: {:?}", line),
        }
    }

    sections
}

/// Names are kept verbatim, so row sections trim headers only and clean numeric fields by hand
fn csv_reader(body: &str, trim: Trim) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .trim(trim)
        .flexible(true)
        .from_reader(body.as_bytes())
}

fn parse_parameters(body: &str) -> Result<SimulationParameters, ConfigError> {
    let mut reader = csv_reader(body, Trim::All);
    let params = reader
        .deserialize::<SimulationParameters>()
        .next()
        .ok_or(ConfigError::MissingRow(PARAMETERS_SECTION))?
        .map_err(|source| ConfigError::Csv {
            section: PARAMETERS_SECTION,
            source,
        })?;
    params.validate()?;
    Ok(params)
}

fn parse_projects(body: &str) -> Result<Vec<ProjectRow>, ConfigError> {
    let mut reader = csv_reader(body, Trim::Headers);
    let mut projects = Vec::new();

    for (index, result) in reader.deserialize::<CsvProjectRow>().enumerate() {
        let parsed = result.map_err(|e| e.to_string()).and_then(CsvProjectRow::into_project);
        match parsed {
            Ok(project) => projects.push(project),
            Err(reason) => warn!("Skipping project row {}: {}", index + 1, reason),
        }
    }

    Ok(projects)
}

fn parse_action_plans(body: &str) -> Result<Vec<ActionPlanRow>, ConfigError> {
    let mut reader = csv_reader(body, Trim::Headers);
    let mut plans = Vec::new();

    for (index, result) in reader.deserialize::<CsvActionPlanRow>().enumerate() {
        let parsed = result
            .map_err(|e| e.to_string())
            .and_then(CsvActionPlanRow::into_action_plan);
        match parsed {
            Ok(plan) => plans.push(plan),
            Err(reason) => warn!("Skipping action plan row {}: {}", index + 1, reason),
        }
    }

    Ok(plans)
}

/// Parse a persisted configuration from text
pub fn parse_config(text: &str) -> Result<ProjectionInputs, ConfigError> {
    let sections = split_sections(text);

    let parameters = sections
        .parameters
        .as_deref()
        .ok_or(ConfigError::MissingSection(PARAMETERS_SECTION))
        .and_then(parse_parameters)?;
    let projects = sections
        .projects
        .as_deref()
        .ok_or(ConfigError::MissingSection(PROJECTS_SECTION))
        .and_then(parse_projects)?;
    let action_plans = sections
        .action_plans
        .as_deref()
        .ok_or(ConfigError::MissingSection(ACTION_PLANS_SECTION))
        .and_then(parse_action_plans)?;

    debug!(
        "Loaded configuration: {} projects, {} action plans",
        projects.len(),
        action_plans.len()
    );

    Ok(ProjectionInputs {
        parameters,
        projects,
        action_plans,
    })
}

/// Load a persisted configuration from a file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ProjectionInputs, ConfigError> {
    let text = fs::read_to_string(path)?;
    parse_config(&text)
}

fn write_section<W: Write>(
    writer: &mut W,
    section: &'static str,
    header: &[&str],
    rows: Vec<Vec<String>>,
) -> Result<(), ConfigError> {
    writeln!(writer, "[{}]", section)?;

    let mut csv_writer = WriterBuilder::new().from_writer(&mut *writer);
    let csv_error = |source: csv::Error| ConfigError::Csv { section, source };
    csv_writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        csv_writer.write_record(&row).map_err(csv_error)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a configuration in the persisted format
pub fn write_config<W: Write>(inputs: &ProjectionInputs, mut writer: W) -> Result<(), ConfigError> {
    let p = &inputs.parameters;
    write_section(
        &mut writer,
        PARAMETERS_SECTION,
        &[
            "start_period",
            "initial_cash",
            "initial_debt",
            "gross_margin_rate",
            "operating_margin_rate",
            "ordinary_margin_rate",
            "monthly_repayment_target",
            "initial_annual_depreciation",
            "depreciation_decay_rate",
        ],
        vec![vec![
            p.start_period.to_string(),
            p.initial_cash.to_string(),
            p.initial_debt.to_string(),
            p.gross_margin_rate.to_string(),
            p.operating_margin_rate.to_string(),
            p.ordinary_margin_rate.to_string(),
            p.monthly_repayment_target.to_string(),
            p.initial_annual_depreciation.to_string(),
            p.depreciation_decay_rate.to_string(),
        ]],
    )?;

    write_section(
        &mut writer,
        PROJECTS_SECTION,
        &["name", "monthly_revenue", "collection_lag_months"],
        inputs
            .projects
            .iter()
            .map(|project| {
                vec![
                    project.name.clone(),
                    project.monthly_revenue.to_string(),
                    project.collection_lag_months.to_string(),
                ]
            })
            .collect(),
    )?;

    write_section(
        &mut writer,
        ACTION_PLANS_SECTION,
        &["category", "name", "monthly_impact", "effective_from"],
        inputs
            .action_plans
            .iter()
            .map(|plan| {
                vec![
                    plan.category.to_string(),
                    plan.name.clone(),
                    plan.monthly_impact.to_string(),
                    plan.effective_from.map(|p| p.to_string()).unwrap_or_default(),
                ]
            })
            .collect(),
    )?;

    Ok(())
}

/// Render a configuration in the persisted format
pub fn config_to_string(inputs: &ProjectionInputs) -> Result<String, ConfigError> {
    let mut buffer = Vec::new();
    write_config(inputs, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Save a configuration to a file
pub fn save_config<P: AsRef<Path>>(path: P, inputs: &ProjectionInputs) -> Result<(), ConfigError> {
    let mut writer = std::io::BufWriter::new(fs::File::create(path)?);
    write_config(inputs, &mut writer)?;
    writer.flush()?;
    Ok(())
}
