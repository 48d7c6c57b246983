pub mod delete;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod serve;
pub mod show;

use std::path::Path;

use colored::Colorize;
use flows::Result;
use flows::db::Database;
use flows::models::Flow;

/// Open the database and make sure the schema is current.
pub fn open_db(db_path: &Path) -> Result<Database> {
    let db = Database::open(db_path)?;
    db.migrate()?;
    Ok(db)
}

/// Print a list of flows as a table or JSON.
pub fn print_flows(flows: &[Flow], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(flows)?);
        return Ok(());
    }

    if flows.is_empty() {
        println!("No flows found.");
        return Ok(());
    }

    println!("{:<36}  {:<32}  {:<20}  DESCRIPTION", "ID", "NAME", "UPDATED");
    println!("{}", "-".repeat(110));
    for f in flows {
        println!(
            "{:<36}  {:<32}  {:<20}  {}",
            f.id.to_string().bright_black(),
            truncate(&f.name, 32).bold(),
            f.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            truncate(f.description.as_deref().unwrap_or(""), 40),
        );
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}
