use std::path::Path;

use colored::Colorize;
use uuid::Uuid;

use super::open_db;
use flows::{FlowError, Result};

pub fn run(db_path: &Path, id: &str, json: bool) -> Result<()> {
    let id = parse_id(id)?;
    let db = open_db(db_path)?;
    let flow = db.get_flow(id)?.ok_or(FlowError::NotFound(id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&flow)?);
        return Ok(());
    }

    println!("ID:          {}", flow.id);
    println!("Name:        {}", flow.name.bold());
    if let Some(ref desc) = flow.description {
        println!("Description: {desc}");
    }
    println!("Created:     {}", flow.created_at.to_rfc3339());
    println!("Updated:     {}", flow.updated_at.to_rfc3339());
    match flow.data {
        Some(ref data) => println!("Data:\n{}", serde_json::to_string_pretty(data)?),
        None => println!("Data:        {}", "(none)".bright_black()),
    }
    Ok(())
}

pub fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|e| FlowError::Invalid(format!("invalid flow id {id:?}: {e}")))
}
