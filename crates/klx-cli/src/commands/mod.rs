pub mod batch;
pub mod config;
pub mod convert;
pub mod extract;
pub mod output;
pub mod process;
pub mod serve;

use std::path::Path;

use klx_core::KlxConfig;

/// Load the configuration named with `-c`, else the user config file, else
/// defaults. A field mapping file in the working directory applies on top.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<KlxConfig> {
    let user_config = config::default_config_path();
    let path = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path)
        }
        None if user_config.exists() => Some(user_config.as_path()),
        None => None,
    };

    Ok(KlxConfig::load(path, Path::new("."))?)
}
