//! Cloud provider API seams
//!
//! Each provider service the report consumes sits behind its own trait so the
//! collectors can run against the HTTP backend or an in-memory fake. A
//! [`CloudContext`] bundles the handles together with the tenancy id and is
//! passed explicitly to every collection step.

mod oci;

pub use oci::{OciClient, OciEndpoints};

use crate::error::Result;
use crate::models::{Compartment, Instance, MetricData, MetricQuery, UsageAggregation, UsageRequest};
use std::sync::Arc;

pub use async_trait::async_trait;

/// Identity service: compartment enumeration
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// List active compartments under the tenancy, nested ones included
    async fn list_compartments(&self, tenancy_id: &str) -> Result<Vec<Compartment>>;
}

/// Compute service: instance enumeration
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// List instances in a compartment (first page only)
    async fn list_instances(&self, compartment_id: &str) -> Result<Vec<Instance>>;
}

/// Monitoring service: aggregated metric queries
#[async_trait]
pub trait MonitoringApi: Send + Sync {
    /// Summarize metric data for a query scoped to a compartment
    async fn summarize_metrics_data(
        &self,
        compartment_id: &str,
        query: &MetricQuery,
    ) -> Result<Vec<MetricData>>;
}

/// Usage service: cost and usage summaries
#[async_trait]
pub trait UsageApi: Send + Sync {
    /// Request summarized usage for the tenancy
    async fn request_summarized_usages(&self, request: &UsageRequest) -> Result<UsageAggregation>;
}

/// Explicitly constructed set of API handles for one run
#[derive(Clone)]
pub struct CloudContext {
    pub tenancy_id: String,
    pub identity: Arc<dyn IdentityApi>,
    pub compute: Arc<dyn ComputeApi>,
    pub monitoring: Arc<dyn MonitoringApi>,
    pub usage: Arc<dyn UsageApi>,
}

impl CloudContext {
    /// Build a context where one backend serves all four services
    pub fn from_backend<B>(tenancy_id: impl Into<String>, backend: Arc<B>) -> Self
    where
        B: IdentityApi + ComputeApi + MonitoringApi + UsageApi + 'static,
    {
        Self {
            tenancy_id: tenancy_id.into(),
            identity: backend.clone(),
            compute: backend.clone(),
            monitoring: backend.clone(),
            usage: backend,
        }
    }
}
