use std::path::Path;

use super::open_db;
use flows::Result;

/// Write every flow as a pretty JSON array, to `output` or stdout.
pub fn run(db_path: &Path, output: Option<&Path>) -> Result<()> {
    let db = open_db(db_path)?;
    let flows = db.list_flows()?;
    let body = serde_json::to_string_pretty(&flows)?;

    match output {
        Some(path) => {
            std::fs::write(path, body)?;
            eprintln!("Exported {} flow(s) to {}", flows.len(), path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}
