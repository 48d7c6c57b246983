use std::path::Path;

use super::open_db;
use flows::Result;

pub fn run(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = open_db(db_path)?;
    db.set_config("version", env!("CARGO_PKG_VERSION"))?;

    println!("Initialized flows database at {}", db_path.display());
    Ok(())
}
