//! Rendering of audit entries for the terminal

use clap::ValueEnum;
use console::style;
use entaudit::{AuditEntry, PageInfo};
use serde::Serialize;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable lines
    Text,
    /// Pretty printed JSON on stdout
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_entries(entries: &[AuditEntry]) {
    if entries.is_empty() {
        println!("{}", style("No audit entries.").dim());
        return;
    }
    for entry in entries {
        println!("{}", format_entry(entry));
    }
}

pub fn print_page_footer(info: &PageInfo) {
    println!();
    println!(
        "{}",
        style(format!(
            "Page {}/{} ({} entries, {} per page)",
            info.page, info.total_pages, info.total_count, info.page_size
        ))
        .dim()
    );
}

fn format_entry(entry: &AuditEntry) -> String {
    let mut line = format!(
        "{} {} {} {}",
        style(format!("#{}", entry.id)).bold(),
        style(format!("{:<10}", entry.kind.as_str())).cyan(),
        style(format!("object={}", entry.object_id)).green(),
        style(entry.created_at.to_rfc3339()).dim(),
    );
    if let Some(context) = &entry.context {
        line.push_str(&format!(" {}", style(format!("context={}", context)).yellow()));
    }
    if !entry.payload.is_empty() {
        let payload = serde_json::Value::Object(entry.payload.clone());
        line.push_str(&format!(" {}", payload));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use entaudit::{AuditType, ObjectId};

    #[test]
    fn test_format_entry_includes_context_and_payload() {
        console::set_colors_enabled(false);
        let mut payload = serde_json::Map::new();
        payload.insert("blame_user".to_string(), "ana".into());
        let entry = AuditEntry {
            id: 12,
            kind: AuditType::Update,
            object_id: ObjectId::Int(3),
            context: Some("req-9".to_string()),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
            payload,
        };

        let line = format_entry(&entry);
        assert!(line.starts_with("#12 update"));
        assert!(line.contains("object=3"));
        assert!(line.contains("context=req-9"));
        assert!(line.contains(r#""blame_user":"ana""#));
    }
}
