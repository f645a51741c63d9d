//! Paginated audit history of one entity type

use crate::output::{print_entries, print_json, print_page_footer, OutputFormat};
use anyhow::Result;
use clap::Args;
use entaudit::{AuditReader, ObjectId, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use serde_json::json;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Entity type, as named in the mapping file
    pub entity: String,

    /// Only entries of this entity instance
    #[arg(long)]
    pub id: Option<String>,

    /// Page to show (1-based)
    #[arg(long, default_value_t = DEFAULT_PAGE)]
    pub page: u32,

    /// Entries per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Only entries of this operation type (insert, update, associate, dissociate, remove)
    #[arg(long = "type")]
    pub kind: Option<String>,
}

pub async fn list(reader: &AuditReader, args: ListArgs, format: OutputFormat) -> Result<()> {
    let reader = match args.kind.as_deref() {
        Some(kind) => reader.filter_by(kind),
        None => reader.clone(),
    };
    let object_id = args.id.as_deref().map(ObjectId::parse);

    let pager = reader
        .audits_pager(args.entity.as_str(), object_id, Some(args.page), Some(args.page_size))
        .await?;
    let entries = pager.current_page_results().await?;
    let info = pager.info();

    match format {
        OutputFormat::Json => print_json(&json!({ "page": info, "entries": entries })),
        OutputFormat::Text => {
            print_entries(&entries);
            print_page_footer(&info);
            Ok(())
        }
    }
}
