//! Idle Report CLI
//!
//! Lists running compute instances whose average CPU utilization over the
//! last seven full days is below a threshold, followed by the daily cost line
//! items for the same window.

mod commands;
mod config;
mod output;

use clap::{Parser, ValueEnum};
use commands::report::{run_report, ReportArgs};
use report_lib::{KeyStrategy, DEFAULT_IDLE_THRESHOLD};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Idle Report CLI
#[derive(Parser)]
#[command(name = "idle-report")]
#[command(author, version, about = "Report idle compute instances and daily costs", long_about = None)]
pub struct Cli {
    /// Provider config file (defaults to ~/.oci/config)
    #[arg(long, env = "OCI_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Profile section to read from the config file
    #[arg(long, env = "OCI_CLI_PROFILE", default_value = config::DEFAULT_PROFILE)]
    pub profile: String,

    /// Send every API call to this base URL instead of the regional endpoints
    #[arg(long)]
    pub endpoint_override: Option<String>,

    /// CPU utilization percentage below which an instance is reported
    #[arg(long, default_value_t = DEFAULT_IDLE_THRESHOLD)]
    pub threshold: f64,

    /// How metric samples are grouped before averaging
    #[arg(long, default_value = "name")]
    pub group_by: GroupBy,

    /// Filter each metrics query to the instance's resource id
    #[arg(long)]
    pub scope_query_to_instance: bool,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Output format
    #[arg(long, short, default_value = "text")]
    pub format: output::OutputFormat,

    /// Enable verbose logging on stderr
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

/// Grouping key for metric samples
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum GroupBy {
    /// Instance display name; same-named instances are merged
    #[default]
    Name,
    /// Instance id
    Id,
}

impl From<GroupBy> for KeyStrategy {
    fn from(group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Name => KeyStrategy::DisplayName,
            GroupBy::Id => KeyStrategy::InstanceId,
        }
    }
}

impl Cli {
    fn report_args(&self) -> ReportArgs {
        ReportArgs {
            config_file: self.config_file.clone(),
            profile: self.profile.clone(),
            endpoint_override: self.endpoint_override.clone(),
            threshold: self.threshold,
            key_strategy: self.group_by.into(),
            scope_query_to_instance: self.scope_query_to_instance,
            timeout: Duration::from_secs(self.timeout_secs),
            format: self.format,
        }
    }
}

/// Logs go to stderr so stdout carries only the report
fn init_tracing(verbose: bool, json: bool) {
    let default_directive = if verbose {
        "warn,report_lib=debug,idle_report=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run_report(&cli.report_args()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_behaviour() {
        let cli = Cli::try_parse_from(["idle-report"]).unwrap();
        let args = cli.report_args();
        assert_eq!(args.profile, "DEFAULT");
        assert_eq!(args.threshold, 5.0);
        assert_eq!(args.key_strategy, KeyStrategy::DisplayName);
        assert!(!args.scope_query_to_instance);
        assert!(matches!(args.format, output::OutputFormat::Text));
    }

    #[test]
    fn test_group_by_id() {
        let cli = Cli::try_parse_from(["idle-report", "--group-by", "id", "--threshold", "10"]).unwrap();
        let args = cli.report_args();
        assert_eq!(args.key_strategy, KeyStrategy::InstanceId);
        assert_eq!(args.threshold, 10.0);
    }
}
