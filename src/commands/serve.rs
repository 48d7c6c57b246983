use flows::Result;
use flows::config::ServerConfig;
use flows::web;

pub fn run(config: ServerConfig) -> Result<()> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(web::serve(&config))
}
