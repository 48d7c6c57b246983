use std::path::Path;

use super::{open_db, print_flows};
use flows::Result;
use flows::transfer;

/// Import flows from a file in the same formats the upload endpoint accepts.
pub fn run(db_path: &Path, file: &Path, json: bool) -> Result<()> {
    let contents = std::fs::read(file)?;
    let list = transfer::parse_upload(&contents)?;
    let db = open_db(db_path)?;
    let flows = db.insert_flows(list.flows)?;

    if json {
        return print_flows(&flows, true);
    }
    println!("Imported {} flow(s) from {}", flows.len(), file.display());
    Ok(())
}
