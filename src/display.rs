//! Console rendering of per-tick status.

use crate::agent::StatusSnapshot;
use colored::Colorize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Quiet,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "quiet" => Ok(OutputFormat::Quiet),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Render one status line in the requested format. `Quiet` renders nothing.
#[must_use]
pub fn render(status: &StatusSnapshot, format: OutputFormat) -> Option<String> {
    match format {
        OutputFormat::Table => Some(format_status_line(status)),
        OutputFormat::Json => Some(format_json_line(status)),
        OutputFormat::Quiet => None,
    }
}

#[must_use]
pub fn format_status_line(status: &StatusSnapshot) -> String {
    let illumination = if status.is_sunlit {
        "Sunlit".bright_yellow()
    } else {
        "Shaded".bright_black()
    };
    let link = if status.is_connected {
        "Visible".bright_green()
    } else {
        "NotVisible".white()
    };
    let mode = if status.is_power_saving_mode {
        "PowerSaving".bright_red()
    } else {
        "Normal".bright_cyan()
    };

    let mut line = format!("{:.0} deg, {illumination}, || ", status.angle_deg);
    if let Some(record) = status.record {
        line.push_str(&format!(
            "time: {:.2}, {link}, battery: {:.2}, mode: {mode}, temp: {:.4}, angularVelocity: {:.4}, c_torque: {:.4}",
            record.time_s,
            record.battery_voltage,
            record.temperature,
            record.angular_velocity,
            record.control_torque,
        ));
    } else {
        line.push_str(&format!("{link}, mode: {mode}"));
    }
    line
}

#[must_use]
pub fn format_json_line(status: &StatusSnapshot) -> String {
    // StatusSnapshot holds only plain numbers, bools and strings
    serde_json::to_string(status).unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
}
