//! Structured logging for report runs
//!
//! Events go through `tracing` with a stable `event` field so they can be
//! filtered or shipped as JSON. The report itself is never logged; it is
//! written to stdout by the caller.

use crate::window::ReportWindow;
use tracing::{debug, info};

/// Structured logger for collection and report events
#[derive(Clone)]
pub struct ReportLogger {
    tenancy_id: String,
}

impl ReportLogger {
    pub fn new(tenancy_id: impl Into<String>) -> Self {
        Self {
            tenancy_id: tenancy_id.into(),
        }
    }

    pub fn tenancy_id(&self) -> &str {
        &self.tenancy_id
    }

    /// Log the start of a run
    pub fn log_run_started(&self, window: &ReportWindow) {
        info!(
            event = "run_started",
            tenancy = %self.tenancy_id,
            window_start = %window.start_iso(),
            window_end = %window.end_iso(),
            "Starting idle resource report"
        );
    }

    /// Log the outcome of compartment enumeration
    pub fn log_compartments_listed(&self, count: usize) {
        info!(
            event = "compartments_listed",
            tenancy = %self.tenancy_id,
            compartments = count,
            "Listed active compartments"
        );
    }

    /// Log a compartment scan
    pub fn log_compartment_scanned(&self, compartment: &str, instances: usize, running: usize) {
        debug!(
            event = "compartment_scanned",
            tenancy = %self.tenancy_id,
            compartment = %compartment,
            instances = instances,
            running = running,
            "Scanned compartment instances"
        );
    }

    /// Log a metric fetch for one instance
    pub fn log_metric_fetched(&self, instance: &str, compartment: &str, streams: usize) {
        debug!(
            event = "metric_fetched",
            tenancy = %self.tenancy_id,
            instance = %instance,
            compartment = %compartment,
            streams = streams,
            "Fetched CPU utilization"
        );
    }

    /// Log cost collection
    pub fn log_costs_fetched(&self, items: usize) {
        info!(
            event = "costs_fetched",
            tenancy = %self.tenancy_id,
            items = items,
            "Fetched daily cost line items"
        );
    }

    /// Log the built report
    pub fn log_report_built(&self, candidates: usize, idle: usize, threshold: f64) {
        info!(
            event = "report_built",
            tenancy = %self.tenancy_id,
            candidates = candidates,
            idle = idle,
            threshold = threshold,
            "Built idle resource report"
        );
    }
}
