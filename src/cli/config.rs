use std::fs;
use std::path::PathBuf;

use crate::session::FileStorage;

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("HANUMAN_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("hanuman").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Session store files live under `<config dir>/session`
pub fn session_storage() -> anyhow::Result<FileStorage> {
    let dir = get_config_dir()?.join("session");
    Ok(FileStorage::open(dir)?)
}
