//! Idle compute and cost reporting library
//!
//! This crate provides the core functionality for:
//! - Enumerating compartments and running compute instances
//! - Collecting aggregated CPU utilization samples per instance
//! - Collecting daily cost line items for the tenancy
//! - Reducing samples into an idle-instance report

pub mod cloud;
pub mod collector;
pub mod error;
pub mod models;
pub mod observability;
pub mod report;
pub mod window;

pub use cloud::{CloudContext, ComputeApi, IdentityApi, MonitoringApi, OciClient, OciEndpoints, UsageApi};
pub use collector::{collect_costs, collect_performance, CollectOptions, KeyStrategy, PerformanceRecords};
pub use error::{ReportError, Result};
pub use models::*;
pub use observability::ReportLogger;
pub use report::{build_idle_report, generate_report, Report, ReportOptions, DEFAULT_IDLE_THRESHOLD};
pub use window::ReportWindow;
