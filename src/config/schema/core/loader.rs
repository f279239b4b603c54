use super::Config;
use super::types::{expand_path, trustward_home};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let trustward_dir = trustward_home();
        let config_path = trustward_dir.join("config.toml");

        if !trustward_dir.exists() {
            fs::create_dir_all(&trustward_dir).context("Failed to create .trustward directory")?;
            fs::create_dir_all(trustward_dir.join("workspace"))
                .context("Failed to create workspace directory")?;
            fs::create_dir_all(trustward_dir.join("state"))
                .context("Failed to create state directory")?;
        }

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            let mut config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.apply_env_overrides();
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    /// Load a config file; directories are resolved relative to the
    /// file's parent directory unless overridden.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let base = path
            .parent()
            .map_or_else(|| Path::new(".").to_path_buf(), Path::to_path_buf);
        config.config_path = path.to_path_buf();
        config.workspace_dir = config
            .workspace
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map_or_else(|| base.join("workspace"), expand_path);
        config.state_dir = base.join("state");

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
