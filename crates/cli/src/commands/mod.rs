pub mod config;
pub mod migrate;
pub mod process;
pub mod seed;

use std::future::Future;

use maildesk_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

/// Outcome of a subcommand: one JSON report line for stdout plus the
/// process exit status.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

/// Failure shorthand used inside command bodies: error class, detail,
/// exit code.
pub(crate) type Failure = (&'static str, String, u8);

#[derive(Debug, Serialize)]
struct Report<'a> {
    command: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<&'a str>,
    message: &'a str,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let report = Report { command, status: "ok", error_class: None, message: &message };
        Self { exit_code: 0, output: render(&report) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let message = message.into();
        let report =
            Report { command, status: "error", error_class: Some(error_class), message: &message };
        Self { exit_code, output: render(&report) }
    }
}

/// Loads configuration, folding validation problems into a
/// `config_validation` failure report.
pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

/// Runs a command body on a fresh current-thread runtime. Runtime
/// construction errors and body failures both come back as reports.
pub(crate) fn execute<T>(
    command: &str,
    body: impl Future<Output = Result<T, Failure>>,
) -> Result<T, CommandResult> {
    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("async runtime unavailable: {error}"),
                3,
            )
        })?;

    runtime.block_on(body).map_err(|(error_class, message, exit_code)| {
        CommandResult::failure(command, error_class, message, exit_code)
    })
}

fn render(report: &Report<'_>) -> String {
    serde_json::to_string(report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":{:?},\"status\":\"error\",\"error_class\":\"serialization\",\"message\":{:?}}}",
            report.command,
            error.to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::CommandResult;

    #[test]
    fn success_report_carries_no_error_class() {
        let result = CommandResult::success("migrate", "database schema is up to date");

        assert_eq!(result.exit_code, 0);
        let report: serde_json::Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(report["command"], "migrate");
        assert_eq!(report["status"], "ok");
        assert!(report.get("error_class").is_none());
    }

    #[test]
    fn failure_report_names_the_error_class_and_exit_code() {
        let result = CommandResult::failure("seed", "db_connectivity", "no such file", 4);

        assert_eq!(result.exit_code, 4);
        let report: serde_json::Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(report["status"], "error");
        assert_eq!(report["error_class"], "db_connectivity");
        assert_eq!(report["message"], "no such file");
    }
}
