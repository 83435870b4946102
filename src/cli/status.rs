//! Status command implementation

use crate::api::HealthResponse;
use crate::cli::StatusArgs;
use crate::health::now_ms;
use colored::Colorize;
use std::fmt::Write;
use std::time::Duration;

/// Format duration in a human-readable way
fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Describe an epoch-ms timestamp relative to `now_ms` ("never" for 0).
fn format_timestamp(epoch_ms: u64, now_ms: u64) -> String {
    if epoch_ms == 0 {
        return "never".to_string();
    }
    let age_secs = now_ms.saturating_sub(epoch_ms) / 1000;
    format!("{} ago", format_duration(age_secs))
}

/// Format health as pretty text
pub fn format_status_pretty(status: &HealthResponse, now_ms: u64) -> String {
    let mut output = String::new();

    let ready_display = if status.judge_ready {
        "Ready".green()
    } else if status.last_judge_success_ms == 0 {
        "Not ready (no successful judgment yet)".yellow()
    } else {
        "Not ready (last success is stale)".yellow()
    };

    writeln!(output, "Status: {}", status.status.green()).unwrap();
    writeln!(output, "Uptime: {}", format_duration(status.uptime_seconds)).unwrap();
    writeln!(output, "Judge: {}", ready_display).unwrap();
    writeln!(
        output,
        "Last success: {}",
        format_timestamp(status.last_judge_success_ms, now_ms)
    )
    .unwrap();
    write!(
        output,
        "Last failure: {}",
        format_timestamp(status.last_judge_failure_ms, now_ms)
    )
    .unwrap();

    output
}

/// Fetch `/health` from a running server.
pub async fn fetch_status(
    base_url: &str,
    timeout: Duration,
) -> Result<HealthResponse, Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let url = format!("{}/health", base_url.trim_end_matches('/'));

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(format!("{} returned HTTP {}", url, response.status()).into());
    }
    Ok(response.json::<HealthResponse>().await?)
}

/// Handle `emoji-judge status` command
pub async fn handle_status(args: &StatusArgs) -> Result<String, Box<dyn std::error::Error>> {
    let status = fetch_status(&args.url, Duration::from_secs(args.timeout)).await?;

    if args.json {
        Ok(serde_json::to_string_pretty(&status)?)
    } else {
        Ok(format_status_pretty(&status, now_ms()))
    }
}
