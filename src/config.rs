use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration defaults that can be saved to a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_file_search: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

impl Config {
    /// Create a new empty config
    pub fn new() -> Self {
        Config {
            directory: None,
            artist_url: None,
            per_file_search: None,
            request_delay_ms: None,
            user_agent: None,
            verbose: None,
        }
    }

    /// Get the config file path (~/.state/utatag/defaults.toml)
    pub fn get_config_path() -> Result<PathBuf, io::Error> {
        let home = std::env::var("HOME").map_err(|_| {
            io::Error::new(io::ErrorKind::NotFound, "HOME environment variable not set")
        })?;

        let config_dir = Path::new(&home).join(".state").join("utatag");
        Ok(config_dir.join("defaults.toml"))
    }

    /// Load config from file
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Return empty config if file doesn't exist
            return Ok(Config::new());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    /// Merge this config with another, preferring values from other
    pub fn merge(&mut self, other: &Config) {
        if other.directory.is_some() {
            self.directory = other.directory.clone();
        }
        if other.artist_url.is_some() {
            self.artist_url = other.artist_url.clone();
        }
        if other.per_file_search.is_some() {
            self.per_file_search = other.per_file_search;
        }
        if other.request_delay_ms.is_some() {
            self.request_delay_ms = other.request_delay_ms;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent.clone();
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
    }

    /// Print the config in a human-readable format
    pub fn print(&self, title: &str) {
        println!("{}:", title);

        if let Some(directory) = &self.directory {
            println!("  Music directory:    {}", directory);
        }
        if let Some(artist_url) = &self.artist_url {
            println!("  Artist URL:         {}", artist_url);
        }
        if let Some(per_file_search) = self.per_file_search {
            println!(
                "  Per-file search:    {}",
                if per_file_search { "enabled" } else { "disabled" }
            );
        }
        if let Some(request_delay_ms) = self.request_delay_ms {
            println!("  Request delay:      {} ms", request_delay_ms);
        }
        if let Some(user_agent) = &self.user_agent {
            println!("  User agent:         {}", user_agent);
        }
        if let Some(verbose) = self.verbose {
            println!(
                "  Verbose output:     {}",
                if verbose { "enabled" } else { "disabled" }
            );
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config::new();
        base.directory = Some("/music".to_string());
        base.request_delay_ms = Some(500);

        let mut overlay = Config::new();
        overlay.request_delay_ms = Some(1000);
        overlay.verbose = Some(true);

        base.merge(&overlay);
        assert_eq!(base.directory.as_deref(), Some("/music"));
        assert_eq!(base.request_delay_ms, Some(1000));
        assert_eq!(base.verbose, Some(true));
    }

    #[test]
    fn test_unset_fields_are_not_serialized() {
        let mut config = Config::new();
        config.artist_url = Some("https://www.uta-net.com/artist/12795/".to_string());

        let toml_string = toml::to_string_pretty(&config).unwrap();
        assert!(toml_string.contains("artist_url"));
        assert!(!toml_string.contains("directory"));

        let parsed: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.artist_url, config.artist_url);
        assert!(parsed.directory.is_none());
    }
}
