use std::path::Path;

use super::open_db;
use super::show::parse_id;
use flows::Result;

pub fn run(db_path: &Path, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let db = open_db(db_path)?;
    db.delete_flow(id)?;
    println!("Deleted flow {id}");
    Ok(())
}
