//! CSV export of monthly and annual projection tables
//!
//! Numbers are written at full precision; rounding is left to whatever
//! displays the file.

use super::annual::AnnualRecord;
use super::cashflows::{PeriodRecord, ProjectionResult};
use crate::error::ExportError;
use csv::WriterBuilder;
use std::io::Write;

/// Byte order mark that makes spreadsheet tools detect UTF-8
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const MONTHLY_COLUMNS: [&str; 19] = [
    "Period",
    "Month",
    "FiscalYear",
    "Revenue",
    "CostOfSales",
    "GrossProfit",
    "SGA",
    "OperatingProfit",
    "OrdinaryProfit",
    "Tax",
    "NetProfit",
    "Depreciation",
    "SimpleCashFlow",
    "Repayment",
    "DebtBalance",
    "CashIn",
    "CashOut",
    "CashBalance",
    "Receivables",
];

const ANNUAL_COLUMNS: [&str; 22] = [
    "FiscalYear",
    "FirstPeriod",
    "LastPeriod",
    "Revenue",
    "CostOfSales",
    "GrossProfit",
    "SGA",
    "OperatingProfit",
    "OrdinaryProfit",
    "Tax",
    "NetProfit",
    "Depreciation",
    "SimpleCashFlow",
    "Repayment",
    "DebtBalance",
    "CashIn",
    "CashOut",
    "CashBalance",
    "Receivables",
    "GrossMargin",
    "OperatingMargin",
    "OrdinaryMargin",
];

/// CSV output options
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvOptions {
    /// Prefix the file with a UTF-8 byte order mark
    pub utf8_bom: bool,

    /// Start the annual table with a year-0 opening-balance row
    pub opening_row: bool,
}

fn header(fixed: &[&str], plan_columns: &[String]) -> Vec<String> {
    fixed
        .iter()
        .map(|c| c.to_string())
        .chain(plan_columns.iter().cloned())
        .collect()
}

fn monthly_row(record: &PeriodRecord) -> Vec<String> {
    let mut row = vec![
        record.period.to_string(),
        record.projection_month.to_string(),
        record.fiscal_year.to_string(),
        record.revenue.to_string(),
        record.cost_of_sales.to_string(),
        record.gross_profit.to_string(),
        record.sga.to_string(),
        record.operating_profit.to_string(),
        record.ordinary_profit.to_string(),
        record.tax.to_string(),
        record.net_profit.to_string(),
        record.depreciation.to_string(),
        record.simple_cash_flow.to_string(),
        record.repayment_actual.to_string(),
        record.debt_balance.to_string(),
        record.cash_in.to_string(),
        record.cash_out.to_string(),
        record.cash_balance.to_string(),
        record.receivables.to_string(),
    ];
    row.extend(record.plan_impacts.iter().map(|p| p.amount.to_string()));
    row
}

fn annual_row(record: &AnnualRecord) -> Vec<String> {
    let period = |p: Option<crate::period::YearMonth>| p.map(|p| p.to_string()).unwrap_or_default();
    let mut row = vec![
        record.fiscal_year.to_string(),
        period(record.first_period),
        period(record.last_period),
        record.revenue.to_string(),
        record.cost_of_sales.to_string(),
        record.gross_profit.to_string(),
        record.sga.to_string(),
        record.operating_profit.to_string(),
        record.ordinary_profit.to_string(),
        record.tax.to_string(),
        record.net_profit.to_string(),
        record.depreciation.to_string(),
        record.simple_cash_flow.to_string(),
        record.repayment_actual.to_string(),
        record.debt_balance.to_string(),
        record.cash_in.to_string(),
        record.cash_out.to_string(),
        record.cash_balance.to_string(),
        record.receivables.to_string(),
        record.gross_margin_ratio().to_string(),
        record.operating_margin_ratio().to_string(),
        record.ordinary_margin_ratio().to_string(),
    ];
    row.extend(record.plan_impacts.iter().map(|p| p.amount.to_string()));
    row
}

fn write_table<W: Write>(
    mut writer: W,
    header: Vec<String>,
    rows: impl Iterator<Item = Vec<String>>,
    options: &CsvOptions,
) -> Result<(), ExportError> {
    if options.utf8_bom {
        writer.write_all(UTF8_BOM)?;
    }
    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(&header)?;
    for row in rows {
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write one row per month
pub fn write_monthly_csv<W: Write>(
    result: &ProjectionResult,
    writer: W,
    options: &CsvOptions,
) -> Result<(), ExportError> {
    write_table(
        writer,
        header(&MONTHLY_COLUMNS, &result.plan_columns),
        result.records.iter().map(monthly_row),
        options,
    )
}

/// Write one row per projection year
pub fn write_annual_csv<W: Write>(
    result: &ProjectionResult,
    writer: W,
    options: &CsvOptions,
) -> Result<(), ExportError> {
    let rows = if options.opening_row {
        result.annual_with_opening()
    } else {
        result.annual()
    };
    write_table(
        writer,
        header(&ANNUAL_COLUMNS, &result.plan_columns),
        rows.iter().map(annual_row),
        options,
    )
}

/// Monthly table as a string
pub fn monthly_csv_string(result: &ProjectionResult, options: &CsvOptions) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_monthly_csv(result, &mut buffer, options)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
