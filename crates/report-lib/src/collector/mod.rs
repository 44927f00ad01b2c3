//! Resource, metric and cost collection
//!
//! Collection walks compartments in the order the identity service returns
//! them, then instances in compute order, issuing one metrics query per
//! running instance. Every call is awaited before the next one starts and any
//! failure aborts the walk.

mod costs;

#[cfg(test)]
mod tests;

pub use costs::{collect_costs, usage_request};

use crate::cloud::CloudContext;
use crate::error::Result;
use crate::models::{MetricQuery, MetricSample, COMPUTE_AGENT_NAMESPACE, CPU_UTILIZATION_METRIC};
use crate::observability::ReportLogger;
use crate::window::ReportWindow;
use std::collections::HashMap;

/// How samples are grouped into performance records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Group by display name; same-named instances in different compartments
    /// collapse into one record
    #[default]
    DisplayName,
    /// Group by instance id
    InstanceId,
}

/// Options for metric collection
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectOptions {
    pub key_strategy: KeyStrategy,
    /// Add a `resourceId` dimension filter to each metrics query
    pub scope_query_to_instance: bool,
}

/// Samples accumulated under one key
#[derive(Debug, Clone)]
pub struct PerformanceRecord {
    pub key: String,
    pub samples: Vec<MetricSample>,
}

impl PerformanceRecord {
    /// Display name of the first sample, falling back to the key
    pub fn display_name(&self) -> &str {
        self.samples
            .first()
            .map(|s| s.display_name.as_str())
            .unwrap_or(&self.key)
    }
}

/// Ordered accumulation of samples; keys keep first-insertion order
#[derive(Debug, Clone, Default)]
pub struct PerformanceRecords {
    records: Vec<PerformanceRecord>,
    index: HashMap<String, usize>,
}

impl PerformanceRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample under `key`, creating the record on first use
    pub fn push(&mut self, key: impl Into<String>, sample: MetricSample) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.records[pos].samples.push(sample),
            None => {
                self.index.insert(key.clone(), self.records.len());
                self.records.push(PerformanceRecord {
                    key,
                    samples: vec![sample],
                });
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&PerformanceRecord> {
        self.index.get(key).map(|&pos| &self.records[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PerformanceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Build the CPU utilization query expression
pub fn cpu_query_expression(resource_id: Option<&str>) -> String {
    match resource_id {
        Some(id) => format!("{}[1m]{{resourceId = \"{}\"}}.mean()", CPU_UTILIZATION_METRIC, id),
        None => format!("{}[1m].mean()", CPU_UTILIZATION_METRIC),
    }
}

/// Collect one CPU utilization sample per running instance
pub async fn collect_performance(
    ctx: &CloudContext,
    window: &ReportWindow,
    options: CollectOptions,
    logger: &ReportLogger,
) -> Result<PerformanceRecords> {
    let compartments = ctx.identity.list_compartments(&ctx.tenancy_id).await?;
    logger.log_compartments_listed(compartments.len());

    let mut records = PerformanceRecords::new();

    for compartment in &compartments {
        let instances = ctx.compute.list_instances(&compartment.id).await?;
        let running: Vec<_> = instances.iter().filter(|i| i.is_running()).collect();
        logger.log_compartment_scanned(&compartment.name, instances.len(), running.len());

        for instance in running {
            let resource_filter = options
                .scope_query_to_instance
                .then_some(instance.id.as_str());
            let query = MetricQuery {
                namespace: COMPUTE_AGENT_NAMESPACE.to_string(),
                query: cpu_query_expression(resource_filter),
                start_time: window.start_iso(),
                end_time: window.end_iso(),
            };

            let metrics = ctx
                .monitoring
                .summarize_metrics_data(&compartment.id, &query)
                .await?;
            logger.log_metric_fetched(&instance.display_name, &compartment.name, metrics.len());

            let key = match options.key_strategy {
                KeyStrategy::DisplayName => instance.display_name.clone(),
                KeyStrategy::InstanceId => instance.id.clone(),
            };
            records.push(
                key,
                MetricSample {
                    compartment_name: compartment.name.clone(),
                    instance_id: instance.id.clone(),
                    display_name: instance.display_name.clone(),
                    metrics,
                },
            );
        }
    }

    Ok(records)
}
