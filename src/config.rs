//! Program configuration.
//!
//! Lives in a TOML dotfile in the user's home directory. On first run the
//! file does not exist yet; it is created with empty defaults so the user
//! has something to edit. Environment variables and `~` in the library path
//! are expanded on load only; the file on disk keeps whatever the user
//! wrote.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

/// Config file name inside the home (or explicitly given) directory.
pub const CONFIG_FILENAME: &str = ".inpxcat";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the library and its index archive.
    pub library_path: String,
    /// File name of the index archive inside `library_path`.
    pub index_filename: String,
}

impl Config {
    /// Load the configuration, creating a default file on first run.
    ///
    /// `dir` overrides the directory holding the config file; `None` means
    /// the user's home. Any failure here is fatal to the program.
    pub fn load(dir: Option<&Path>) -> Result<Config> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::home_dir().context("can't detect user's home directory")?,
        };
        let path = dir.join(CONFIG_FILENAME);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Self::create_default(&path);
            }
            Err(err) => {
                return Err(err).context(format!("can't read config file {}", path.display()));
            }
        };

        let mut config: Config = toml::from_str(&text)
            .with_context(|| format!("can't decode config file {}", path.display()))?;
        config.library_path = shellexpand::full(&config.library_path)
            .context("can't expand library path")?
            .into_owned();

        Ok(config)
    }

    /// Write a default config to `path` and return it.
    fn create_default(path: &Path) -> Result<Config> {
        let config = Config::default();
        let text = toml::to_string(&config).context("can't encode default config")?;
        fs::write(path, text)
            .with_context(|| format!("can't create config file {}", path.display()))?;
        info!("created default config at {}", path.display());
        Ok(config)
    }
}
