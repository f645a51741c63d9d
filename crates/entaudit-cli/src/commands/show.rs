//! Show one audit entry by primary key

use crate::output::{print_entries, print_json, OutputFormat};
use anyhow::{bail, Result};
use clap::Args;
use entaudit::AuditReader;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Entity type, as named in the mapping file
    pub entity: String,

    /// Row id of the audit entry (not the entity id)
    pub id: i64,
}

pub async fn show(reader: &AuditReader, args: ShowArgs, format: OutputFormat) -> Result<()> {
    let entries = reader.audit(args.entity.as_str(), args.id).await?;
    let Some(entry) = entries.first() else {
        bail!("no audit entry {} for {}", args.id, args.entity);
    };

    match format {
        OutputFormat::Json => print_json(entry),
        OutputFormat::Text => {
            print_entries(&entries);
            Ok(())
        }
    }
}
