//! Output formatting helpers for CLI commands

use crate::evaluation::EvaluationResult;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Format an evaluation for humans, colored by score band.
pub fn format_evaluation(target: &str, result: &EvaluationResult) -> String {
    let score = format!("{}/100", result.score);
    let score = match result.score {
        80..=100 => score.green(),
        50..=79 => score.yellow(),
        _ => score.red(),
    };
    format!(
        "{} {}\n{} {}\n{} {}",
        "Target:".bold(),
        target,
        "Score:".bold(),
        score,
        "Feedback:".bold(),
        result.feedback
    )
}

/// Format an evaluation as JSON, matching the HTTP response body.
pub fn format_evaluation_json(result: &EvaluationResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
}

/// Format credential labels as a table
pub fn format_credentials_table(labels: &[String], source: &str) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Slot", "Label", "Source"]);

    for (slot, label) in labels.iter().enumerate() {
        table.add_row(vec![
            Cell::new(slot),
            Cell::new(label),
            Cell::new(source),
        ]);
    }

    format!(
        "{}\n{} credential(s) in rotation",
        table,
        labels.len().to_string().bold()
    )
}

/// Format credential labels as JSON
pub fn format_credentials_json(labels: &[String], source: &str) -> String {
    let value = json!({
        "size": labels.len(),
        "source": source,
        "credentials": labels,
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}
