//! Output formatting: JSON bodies and one-line notification rendering.

use std::io::{self, IsTerminal, Write};

use chrono::Local;
use owo_colors::OwoColorize;
use serde_json::{Value, json};

use unifi_events_core::Notification;

use crate::cli::{ColorMode, OutputFormat};

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── JSON values ──────────────────────────────────────────────────────

pub fn render_value(format: OutputFormat, value: &Value) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
        OutputFormat::JsonCompact => value.to_string(),
        OutputFormat::Plain => match value {
            Value::Array(items) => items
                .iter()
                .map(plain_label)
                .collect::<Vec<_>>()
                .join("\n"),
            other => plain_label(other),
        },
    }
}

/// Best human label for a controller object.
fn plain_label(value: &Value) -> String {
    ["name", "desc", "hostname", "mac"]
        .iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str))
        .map_or_else(|| value.to_string(), str::to_owned)
}

// ── Notifications ────────────────────────────────────────────────────

pub fn render_notification(format: OutputFormat, note: &Notification, color: bool) -> String {
    let time = Local::now();
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            let doc = json!({
                "time": time.to_rfc3339(),
                "channel": note.channel(),
                "payload": notification_payload(note),
            });
            if format == OutputFormat::Json {
                serde_json::to_string_pretty(&doc).unwrap_or_default()
            } else {
                doc.to_string()
            }
        }
        OutputFormat::Plain => {
            let stamp = time.format("%H:%M:%S").to_string();
            let channel = format!("{:<22}", note.channel());
            let detail = notification_detail(note);
            if color {
                let channel = match note {
                    Notification::Error(_) => channel.red().to_string(),
                    Notification::Event(_) => channel.green().to_string(),
                    _ => channel.cyan().to_string(),
                };
                format!("{} {channel} {detail}", stamp.dimmed())
            } else {
                format!("{stamp} {channel} {detail}")
            }
        }
    }
}

fn notification_payload(note: &Notification) -> Value {
    match note {
        Notification::Event(event) => event.payload.clone(),
        Notification::Reconnecting { attempt } => json!({ "attempt": attempt }),
        Notification::Error(err) => json!({ "error": err.to_string() }),
        Notification::Connected | Notification::Disconnected => Value::Null,
    }
}

fn notification_detail(note: &Notification) -> String {
    match note {
        Notification::Event(event) => event
            .payload
            .get("msg")
            .and_then(Value::as_str)
            .or_else(|| event.key())
            .unwrap_or_default()
            .to_owned(),
        Notification::Reconnecting { attempt } => format!("attempt {attempt}"),
        Notification::Error(err) => err.to_string(),
        Notification::Connected => "event stream open".into(),
        Notification::Disconnected => "connection lost".into(),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
