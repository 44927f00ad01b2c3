//! Core data models for the idle report
//!
//! Provider payloads use camelCase field names; every type here maps them
//! onto snake_case Rust fields.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Monitoring namespace for compute agent telemetry
pub const COMPUTE_AGENT_NAMESPACE: &str = "oci_computeagent";

/// CPU utilization metric name within the compute agent namespace
pub const CPU_UTILIZATION_METRIC: &str = "CpuUtilization";

/// Granularity requested from the usage API
pub const DAILY_GRANULARITY: &str = "DAILY";

/// Lifecycle state of a compartment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompartmentLifecycleState {
    Creating,
    Active,
    Inactive,
    Deleting,
    Deleted,
    #[serde(other)]
    Other,
}

/// Organizational scoping unit from the identity service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compartment {
    pub id: String,
    pub name: String,
    pub lifecycle_state: CompartmentLifecycleState,
}

/// Lifecycle state of a compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceLifecycleState {
    Moving,
    Provisioning,
    Running,
    Starting,
    Stopping,
    Stopped,
    CreatingImage,
    Terminating,
    Terminated,
    #[serde(other)]
    Other,
}

/// Compute instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub display_name: String,
    pub lifecycle_state: InstanceLifecycleState,
}

impl Instance {
    /// Only running instances are queried for metrics
    pub fn is_running(&self) -> bool {
        self.lifecycle_state == InstanceLifecycleState::Running
    }
}

/// Request body for a metrics summary query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricQuery {
    pub namespace: String,
    pub query: String,
    pub start_time: String,
    pub end_time: String,
}

/// A single summarized value over a sub-interval
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDatapoint {
    pub timestamp: String,
    pub value: f64,
}

/// One metric stream returned by a metrics summary query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricData {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub dimensions: HashMap<String, String>,
    #[serde(default)]
    pub aggregated_datapoints: Vec<AggregatedDatapoint>,
}

/// Metric response for one running instance, tagged with its compartment
#[derive(Debug, Clone, Serialize)]
pub struct MetricSample {
    pub compartment_name: String,
    pub instance_id: String,
    pub display_name: String,
    pub metrics: Vec<MetricData>,
}

/// Request body for the usage API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageRequest {
    pub tenant_id: String,
    pub time_usage_started: String,
    pub time_usage_ended: String,
    pub granularity: String,
}

/// Usage API response envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAggregation {
    #[serde(default)]
    pub items: Vec<CostLineItem>,
}

/// Daily cost record; the backend may omit any field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLineItem {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub computed_amount: Option<f64>,
    #[serde(default)]
    pub computed_quantity: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub time_usage_started: Option<String>,
    #[serde(default)]
    pub time_usage_ended: Option<String>,
}

impl CostLineItem {
    pub const DEFAULT_DESCRIPTION: &'static str = "service not identified";
    pub const DEFAULT_CURRENCY: &'static str = "USD";

    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(Self::DEFAULT_DESCRIPTION)
    }

    pub fn amount_or_default(&self) -> f64 {
        self.computed_amount.unwrap_or(0.0)
    }

    pub fn currency_or_default(&self) -> &str {
        self.currency.as_deref().unwrap_or(Self::DEFAULT_CURRENCY)
    }
}

/// One idle instance in the final report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEntry {
    pub instance_name: String,
    pub instance_id: String,
    pub avg_cpu_util: f64,
    pub compartment: String,
}
