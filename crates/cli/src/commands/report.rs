//! Idle resource and cost report command

use anyhow::{Context, Result};
use report_lib::{
    generate_report, CloudContext, CollectOptions, KeyStrategy, OciClient, OciEndpoints,
    ReportLogger, ReportOptions, ReportWindow,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::ProviderConfig;
use crate::output::{print_report, OutputFormat};

/// Everything the report command needs from the command line
#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub config_file: Option<String>,
    pub profile: String,
    pub endpoint_override: Option<String>,
    pub threshold: f64,
    pub key_strategy: KeyStrategy,
    pub scope_query_to_instance: bool,
    pub timeout: Duration,
    pub format: OutputFormat,
}

/// Build the cloud context from the provider config
fn build_context(args: &ReportArgs, provider: &ProviderConfig) -> Result<CloudContext> {
    let endpoints = match &args.endpoint_override {
        Some(url) => OciEndpoints::single(url),
        None => OciEndpoints::for_region(&provider.region),
    }
    .context("Invalid service endpoint")?;

    info!(
        region = %provider.region,
        identity = %endpoints.identity,
        "Using service endpoints"
    );

    let client = OciClient::new(endpoints, args.timeout).context("Failed to create HTTP client")?;
    Ok(CloudContext::from_backend(provider.tenancy.clone(), Arc::new(client)))
}

/// Collect metrics and costs, then print the report
pub async fn run_report(args: &ReportArgs) -> Result<()> {
    let provider = ProviderConfig::load(args.config_file.as_deref(), &args.profile)
        .context("Failed to load provider config")?;
    info!(profile = %provider.profile, "Loaded provider config");

    let ctx = build_context(args, &provider)?;
    let logger = ReportLogger::new(&provider.tenancy);

    let options = ReportOptions {
        threshold: args.threshold,
        collect: CollectOptions {
            key_strategy: args.key_strategy,
            scope_query_to_instance: args.scope_query_to_instance,
        },
    };

    let report = generate_report(&ctx, ReportWindow::trailing_week(), options, &logger)
        .await
        .context("Failed to generate report")?;

    print_report(&report, args.format)
}
