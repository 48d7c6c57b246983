use std::path::Path;

use super::{open_db, print_flows};
use flows::Result;

pub fn run(db_path: &Path, json: bool) -> Result<()> {
    let db = open_db(db_path)?;
    let flows = db.list_flows()?;
    print_flows(&flows, json)
}
