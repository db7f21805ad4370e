//! Human and machine readable reports of a deposit response.

use crate::response::DepositResponse;
use crate::status::DepositStatus;
use colored::*;
use serde::Serialize;

/// The deposit fields of a response, ready for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositSummary {
    pub http_status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_archive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_status: Option<DepositStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_final: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_swh_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_swh_id_context: Option<String>,
}

impl DepositSummary {
    pub fn from_response(response: &DepositResponse) -> Self {
        let status = response.deposit_status();
        Self {
            http_status: response.status(),
            deposit_id: response.deposit_id().map(str::to_string),
            deposit_date: response.deposit_date().map(|date| date.to_rfc3339()),
            deposit_archive: response.deposit_archive().map(str::to_string),
            deposit_status: status,
            status_description: status.map(|s| s.description().to_string()),
            is_final: status.map(|s| s.is_final()),
            deposit_swh_id: response.deposit_swh_id().map(str::to_string),
            deposit_swh_id_context: response.deposit_swh_id_context().map(str::to_string),
        }
    }

    /// Format the summary with colors for terminal output
    pub fn format_colored(&self) -> String {
        let mut output = String::new();

        let http = self.http_status.to_string();
        let http = if (200..300).contains(&self.http_status) {
            http.green().bold()
        } else {
            http.red().bold()
        };
        output.push_str(&format!("{} {}\n", "HTTP".bright_black(), http));

        if let Some(status) = self.deposit_status {
            let label = match status {
                DepositStatus::Done => status.as_str().green().bold(),
                DepositStatus::Rejected | DepositStatus::Failed => status.as_str().red().bold(),
                _ => status.as_str().yellow().bold(),
            };
            output.push_str(&format!("{:<12} {} ({})", "status", label, status.description()));
            if status.is_final() {
                output.push_str(&format!(" {}", "[final]".bright_black()));
            }
            output.push('\n');
        }

        for (name, value) in self.fields() {
            output.push_str(&format!("{:<12} {}\n", name, value.bright_blue()));
        }

        output
    }

    /// Format without colors for logs or non-terminal output
    pub fn format_plain(&self) -> String {
        let mut output = format!("HTTP {}\n", self.http_status);
        if let Some(status) = self.deposit_status {
            output.push_str(&format!("{:<12} {} ({})", "status", status, status.description()));
            if status.is_final() {
                output.push_str(" [final]");
            }
            output.push('\n');
        }
        for (name, value) in self.fields() {
            output.push_str(&format!("{:<12} {}\n", name, value));
        }
        output
    }

    fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("id", &self.deposit_id),
            ("date", &self.deposit_date),
            ("archive", &self.deposit_archive),
            ("swhid", &self.deposit_swh_id),
            ("swhid ctx", &self.deposit_swh_id_context),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|value| (name, value)))
        .collect()
    }
}
