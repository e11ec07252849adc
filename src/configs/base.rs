use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{common::errors::ConfigurationError, configs::*};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub youtube: YouTubeConfig,
    #[serde(default)]
    pub library: LibraryConfig,
}

impl Config {
    /// Loads `config.toml`, falling back to `config.default.toml`.
    pub fn load() -> Result<Self, ConfigurationError> {
        let config_path = if Path::new("config.toml").exists() {
            "config.toml"
        } else if Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            return Err(ConfigurationError::File(
                "config.toml or config.default.toml not found".into(),
            ));
        };

        Self::load_from(config_path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        // The logger is not up yet and stdout carries command output.
        eprintln!("Loading configuration from: {}", path.display());

        let config_str = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::File(format!("{}: {}", path.display(), e)))?;

        Self::parse(&config_str)
            .map_err(|e| ConfigurationError::File(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(config_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(config_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.youtube.base_url, "https://www.youtube.com");
        assert_eq!(config.youtube.connect_timeout_secs, 30);
        assert_eq!(config.youtube.read_timeout_secs, 30);
        assert_eq!(config.youtube.clients.search, "WEB");
        assert_eq!(config.youtube.clients.playback.first().map(String::as_str), Some("ANDROID_MUSIC"));
        assert!(config.youtube.watch_page.enabled);
        assert!(config.youtube.ytdlp.enabled);
        assert_eq!(config.library.path, "library.json");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::parse(
            r#"
            [logging]
            level = "debug"

            [logging.file]
            path = "logs/lumena.log"

            [youtube]
            gl = "DE"

            [youtube.clients]
            playback = ["IOS", "WEB"]

            [youtube.ytdlp]
            enabled = false
            path = "/usr/bin/yt-dlp"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        let file = config.logging.file.unwrap();
        assert_eq!(file.path, "logs/lumena.log");
        assert_eq!(file.max_lines, 10_000);
        assert_eq!(config.youtube.gl, "DE");
        assert_eq!(config.youtube.hl, "en");
        assert_eq!(config.youtube.clients.playback, vec!["IOS", "WEB"]);
        assert_eq!(config.youtube.clients.search, "WEB");
        assert!(!config.youtube.ytdlp.enabled);
        assert_eq!(config.youtube.ytdlp.path.as_deref(), Some("/usr/bin/yt-dlp"));
        assert_eq!(config.youtube.ytdlp.timeout_secs, 60);
    }

    #[test]
    fn test_bundled_default_config_parses() {
        let config = Config::parse(include_str!("../../config.default.toml")).unwrap();
        assert_eq!(
            config.youtube.clients.playback,
            crate::sources::youtube::clients::DEFAULT_PRIORITY.to_vec()
        );
        assert_eq!(config.logging.level.as_deref(), Some("info"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[youtube]\nhl = \"de\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.youtube.hl, "de");
        assert_eq!(config.youtube.gl, "US");
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigurationError::File(_)));
    }
}
