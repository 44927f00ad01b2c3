//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use report_lib::{CostLineItem, Report, ReportEntry};
use std::fmt::Write;
use tabled::{settings::Style, Table, Tabled};

const IDLE_HEADER: &str = "=== Idle Resources Report ===";
const COSTS_HEADER: &str = "=== Costs by Service ===";

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text lines (default)
    #[default]
    Text,
    /// Table format
    Table,
    /// JSON format
    Json,
}

/// Row for the idle instances table
#[derive(Tabled)]
struct IdleRow {
    #[tabled(rename = "Instance")]
    instance: String,
    #[tabled(rename = "Avg CPU")]
    avg_cpu: String,
    #[tabled(rename = "Compartment")]
    compartment: String,
}

/// Row for the cost line item table
#[derive(Tabled)]
struct CostRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

/// Render one idle instance line
pub fn idle_line(entry: &ReportEntry) -> String {
    format!(
        "Instance: {} | Avg CPU: {}% | Compartment: {}",
        entry.instance_name, entry.avg_cpu_util, entry.compartment
    )
}

/// Render one cost line, substituting defaults for missing fields
pub fn cost_line(item: &CostLineItem) -> String {
    format!(
        "Service: {} | Cost: {} {}",
        item.description_or_default(),
        item.amount_or_default(),
        item.currency_or_default()
    )
}

/// Render the report as two plain-text sections
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", IDLE_HEADER);
    for entry in &report.idle_instances {
        let _ = writeln!(out, "{}", idle_line(entry));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", COSTS_HEADER);
    for item in &report.costs {
        let _ = writeln!(out, "{}", cost_line(item));
    }

    out
}

/// Render the report as two rounded tables under the same headings
pub fn render_table(report: &Report) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", IDLE_HEADER);
    if !report.idle_instances.is_empty() {
        let rows: Vec<IdleRow> = report
            .idle_instances
            .iter()
            .map(|e| IdleRow {
                instance: e.instance_name.clone(),
                avg_cpu: format!("{:.2}%", e.avg_cpu_util),
                compartment: e.compartment.clone(),
            })
            .collect();
        let _ = writeln!(out, "{}", Table::new(rows).with(Style::rounded()));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", COSTS_HEADER);
    if !report.costs.is_empty() {
        let rows: Vec<CostRow> = report
            .costs
            .iter()
            .map(|c| CostRow {
                service: c.description_or_default().to_string(),
                cost: format_currency(c.amount_or_default(), c.currency_or_default()),
            })
            .collect();
        let _ = writeln!(out, "{}", Table::new(rows).with(Style::rounded()));
    }

    out
}

/// Write the report to stdout in the requested format
pub fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(report)),
        OutputFormat::Table => print!("{}", render_table(report)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Format currency
pub fn format_currency(amount: f64, currency: &str) -> String {
    match currency {
        "USD" => format!("${:.2}", amount),
        "EUR" => format!("€{:.2}", amount),
        "GBP" => format!("£{:.2}", amount),
        _ => format!("{:.2} {}", amount, currency),
    }
}
