//! List auditable entity types

use crate::output::{print_json, OutputFormat};
use anyhow::Result;
use console::style;
use entaudit::AuditReader;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct EntityTables {
    table: String,
    audit_table: String,
}

pub fn entities(reader: &AuditReader, format: OutputFormat) -> Result<()> {
    let mut entities = BTreeMap::new();
    for (entity_type, table) in reader.entities()? {
        let audit_table = reader.audit_table_name(entity_type.as_str())?.to_string();
        entities.insert(entity_type, EntityTables { table, audit_table });
    }

    if format == OutputFormat::Json {
        return print_json(&entities);
    }

    if entities.is_empty() {
        println!("{}", style("No auditable entities configured.").dim());
        return Ok(());
    }
    let width = entities.keys().map(String::len).max().unwrap_or(0);
    for (entity_type, tables) in &entities {
        let name = format!("{:<width$}", entity_type, width = width);
        println!(
            "{}  {} {} {}",
            style(name).bold(),
            tables.table,
            style("->").dim(),
            tables.audit_table
        );
    }
    Ok(())
}
