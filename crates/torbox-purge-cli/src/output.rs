use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use purge_core::{CleanupReport, FlaggedItem, Scan, SchedulerSummary};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.message("success", "✓".green().to_string(), msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        if self.is_human() {
            println!("{}", msg.as_ref());
        } else {
            self.print_json(&json!({ "type": "info", "message": msg.as_ref() }));
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.message("warning", "⚠".yellow().to_string(), msg.as_ref());
    }

    fn message(&self, kind: &str, marker: String, msg: &str) {
        if self.quiet {
            return;
        }
        if self.is_human() {
            println!("{} {}", marker, msg);
        } else {
            self.print_json(&json!({ "type": kind, "message": msg }));
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && !self.is_human() {
            return;
        }
        self.print_json(data);
    }

    /// Outcome of a single cleanup run. Partial failures are shown as a warning.
    pub fn report(&self, report: &CleanupReport) {
        if !self.is_human() {
            self.json(&report_json(report));
        } else if report.failed > 0 || report.fetch_errors > 0 {
            self.warn(report_summary(report));
        } else {
            self.success(report_summary(report));
        }
    }

    pub fn daemon_stopped(&self, summary: &SchedulerSummary) {
        if !self.is_human() {
            self.json(&json!({
                "type": "daemon_stopped",
                "runs": summary.runs,
                "last_report": summary.last_report.as_ref().map(report_json),
            }));
            return;
        }
        self.success(format!("Stopped after {} run(s)", summary.runs));
        if let Some(report) = &summary.last_report {
            self.info(format!("Last run: {}", report_summary(report)));
        }
    }

    /// Items a run would delete, as a table or a JSON document
    pub fn scan(&self, scan: &Scan) {
        let flagged = &scan.classification.flagged;
        if !self.is_human() {
            self.json(&json!({
                "fetched": scan.fetched,
                "fetch_errors": scan.fetch_errors,
                "unparseable": scan.classification.unparseable,
                "flagged": flagged.iter().map(flagged_json).collect::<Vec<_>>(),
            }));
            return;
        }

        if scan.fetch_errors > 0 {
            self.warn(format!(
                "{} categor{} could not be fully fetched; results are partial",
                scan.fetch_errors,
                if scan.fetch_errors == 1 { "y" } else { "ies" }
            ));
        }

        if flagged.is_empty() {
            self.success(format!("Fetched {} items, nothing to delete", scan.fetched));
            return;
        }

        self.info(flagged_table(flagged).to_string());
        self.info(format!(
            "{} of {} items would be deleted",
            flagged.len(),
            scan.fetched
        ));
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Human => {
                println!("{}", data);
            }
        }
    }
}

fn report_json(report: &CleanupReport) -> serde_json::Value {
    json!({
        "fetched": report.fetched,
        "selected": report.selected,
        "deleted": report.deleted,
        "failed": report.failed,
        "unparseable": report.unparseable,
        "fetch_errors": report.fetch_errors,
        "dry_run": report.dry_run,
        "duration_ms": report.duration.as_millis() as u64,
    })
}

fn report_summary(report: &CleanupReport) -> String {
    let mut summary = format!(
        "Fetched {} items, selected {}, deleted {}, failed {}",
        report.fetched, report.selected, report.deleted, report.failed
    );
    if report.dry_run {
        summary.push_str(" (dry run)");
    }
    if report.fetch_errors > 0 {
        summary.push_str(&format!(", {} fetch error(s)", report.fetch_errors));
    }
    if report.unparseable > 0 {
        summary.push_str(&format!(", {} unparseable", report.unparseable));
    }
    summary
}

fn flagged_table(flagged: &[FlaggedItem]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Category", "State", "Age", "Reason", "Name"]);
    for entry in flagged {
        table.add_row(vec![
            entry.item.id.to_string(),
            entry.item.category.to_string(),
            entry.item.state.to_string(),
            format_age(entry.age_seconds()),
            format!("{:?}", entry.reason).to_lowercase(),
            entry.item.name.clone().unwrap_or_default(),
        ]);
    }
    table
}

fn flagged_json(entry: &FlaggedItem) -> serde_json::Value {
    json!({
        "id": entry.item.id,
        "category": entry.item.category,
        "state": entry.item.state,
        "name": entry.item.name,
        "created_at": entry.item.created_at,
        "age_seconds": entry.age_seconds(),
        "reason": entry.reason,
    })
}

fn format_age(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
