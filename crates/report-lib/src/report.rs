//! Idle detection and report assembly
//!
//! Each record is reduced to the arithmetic mean of the first aggregated
//! datapoint of every sample collected for it. This is a mean of per-call
//! single-point reads, not a full-window mean.

use crate::cloud::CloudContext;
use crate::collector::{collect_costs, collect_performance, CollectOptions, PerformanceRecords};
use crate::error::{ReportError, Result};
use crate::models::{CostLineItem, MetricSample, ReportEntry};
use crate::observability::ReportLogger;
use crate::window::ReportWindow;
use serde::Serialize;

/// CPU utilization percentage below which an instance counts as idle
pub const DEFAULT_IDLE_THRESHOLD: f64 = 5.0;

/// Options for a report run
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Strict upper bound on the mean CPU utilization
    pub threshold: f64,
    pub collect: CollectOptions,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_IDLE_THRESHOLD,
            collect: CollectOptions::default(),
        }
    }
}

/// Complete output of one run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub window: ReportWindow,
    pub threshold: f64,
    pub idle_instances: Vec<ReportEntry>,
    pub costs: Vec<CostLineItem>,
}

/// First aggregated datapoint of the first metric stream in a sample
fn first_datapoint_value(sample: &MetricSample) -> Result<f64> {
    let stream = sample
        .metrics
        .first()
        .ok_or_else(|| ReportError::EmptyMetricResponse {
            instance: sample.display_name.clone(),
        })?;

    stream
        .aggregated_datapoints
        .first()
        .map(|dp| dp.value)
        .ok_or_else(|| ReportError::NoDatapoints {
            instance: sample.display_name.clone(),
        })
}

/// Reduce accumulated samples to idle report entries
///
/// # Errors
/// Fails if any sample has no metric stream or its first stream has no
/// datapoints. The whole report is abandoned in that case.
pub fn build_idle_report(records: &PerformanceRecords, threshold: f64) -> Result<Vec<ReportEntry>> {
    let mut entries = Vec::new();

    for record in records.iter() {
        let first = record.samples.first().ok_or_else(|| ReportError::NoSamples {
            key: record.key.clone(),
        })?;

        let mut total = 0.0;
        for sample in &record.samples {
            total += first_datapoint_value(sample)?;
        }
        let avg_cpu_util = total / record.samples.len() as f64;

        if avg_cpu_util < threshold {
            entries.push(ReportEntry {
                instance_name: record.display_name().to_string(),
                instance_id: first.instance_id.clone(),
                avg_cpu_util,
                compartment: first.compartment_name.clone(),
            });
        }
    }

    Ok(entries)
}

/// Run the full pipeline: metrics, then costs, then idle detection
pub async fn generate_report(
    ctx: &CloudContext,
    window: ReportWindow,
    options: ReportOptions,
    logger: &ReportLogger,
) -> Result<Report> {
    logger.log_run_started(&window);

    let records = collect_performance(ctx, &window, options.collect, logger).await?;
    let costs = collect_costs(ctx, &window, logger).await?;

    let idle_instances = build_idle_report(&records, options.threshold)?;
    logger.log_report_built(records.len(), idle_instances.len(), options.threshold);

    Ok(Report {
        window,
        threshold: options.threshold,
        idle_instances,
        costs,
    })
}
