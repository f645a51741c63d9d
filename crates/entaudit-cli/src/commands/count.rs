//! Count audit entries of one entity type

use crate::output::{print_json, OutputFormat};
use anyhow::Result;
use clap::Args;
use entaudit::{AuditReader, ObjectId};
use serde_json::json;

#[derive(Args, Debug)]
pub struct CountArgs {
    /// Entity type, as named in the mapping file
    pub entity: String,

    /// Only entries of this entity instance
    #[arg(long)]
    pub id: Option<String>,

    /// Only entries of this operation type
    #[arg(long = "type")]
    pub kind: Option<String>,
}

pub async fn count(reader: &AuditReader, args: CountArgs, format: OutputFormat) -> Result<()> {
    let reader = match args.kind.as_deref() {
        Some(kind) => reader.filter_by(kind),
        None => reader.clone(),
    };
    let object_id = args.id.as_deref().map(ObjectId::parse);
    let total = reader.audits_count(args.entity.as_str(), object_id).await?;

    match format {
        OutputFormat::Json => print_json(&json!({ "entity": args.entity, "count": total })),
        OutputFormat::Text => {
            println!("{}", total);
            Ok(())
        }
    }
}
