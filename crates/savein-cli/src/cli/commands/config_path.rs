//! `savein config-path` – print config and log locations.

use anyhow::Result;
use savein_core::{config, logging};
use std::path::Path;

pub fn run_config_path(explicit: Option<&Path>) -> Result<()> {
    match explicit {
        Some(path) => println!("config: {}", path.display()),
        None => println!("config: {}", config::config_path()?.display()),
    }
    println!("log:    {}", logging::log_file_path()?.display());
    Ok(())
}
