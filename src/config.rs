use std::path::PathBuf;

use crate::error::Result;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7860;

/// Settings for `web::serve`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(db_path: PathBuf) -> Self {
        ServerConfig {
            db_path,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `.flows/flows.db` under the current directory.
pub fn default_db_path() -> Result<PathBuf> {
    let mut p = std::env::current_dir()?;
    p.push(".flows");
    p.push("flows.db");
    Ok(p)
}
