//! Entries sharing a correlation context

use crate::output::{print_entries, print_json, OutputFormat};
use anyhow::Result;
use clap::Args;
use console::style;
use entaudit::AuditReader;

#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Context tag to look up
    pub tag: String,

    /// Restrict to one entity type
    #[arg(long)]
    pub entity: Option<String>,
}

pub async fn context(reader: &AuditReader, args: ContextArgs, format: OutputFormat) -> Result<()> {
    if let Some(entity) = args.entity.as_deref() {
        let entries = reader.context_audit(entity, &args.tag).await?;
        return match format {
            OutputFormat::Json => print_json(&entries),
            OutputFormat::Text => {
                print_entries(&entries);
                Ok(())
            }
        };
    }

    let grouped = reader.context_audits(&args.tag).await?;
    match format {
        OutputFormat::Json => print_json(&grouped),
        OutputFormat::Text => {
            if grouped.is_empty() {
                println!("{}", style(format!("No entries tagged {}.", args.tag)).dim());
            }
            for (entity_type, entries) in &grouped {
                println!("{}", style(entity_type).bold().underlined());
                print_entries(entries);
                println!();
            }
            Ok(())
        }
    }
}
