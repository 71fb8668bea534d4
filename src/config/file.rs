//! Optional TOML configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

const CONFIG_DIR: &str = ".bedrock-agent-chat";
const CONFIG_FILE: &str = "config.toml";

/// Values read from `~/.bedrock-agent-chat/config.toml`. Every key is optional;
/// environment variables take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub agent_id: Option<String>,
    pub agent_alias_id: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

impl ConfigFile {
    /// Read a config file, returning `None` if it does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, AgentError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AgentError::Io(err)),
        };
        let file = toml::from_str(&raw).map_err(|e| {
            AgentError::Configuration(format!("invalid config file {}: {e}", path.display()))
        })?;
        Ok(Some(file))
    }

    /// Load the file at [`default_path`], or an empty config.
    pub fn load_default() -> Result<Self, AgentError> {
        Ok(Self::load(&default_path())?.unwrap_or_default())
    }
}

pub fn default_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(CONFIG_DIR))
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR))
        .join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        assert_eq!(ConfigFile::load(&dir.path().join("none.toml")).unwrap(), None);
    }

    #[test]
    fn parses_all_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "agent_id = \"AGENT\"\nagent_alias_id = \"ALIAS\"\nregion = \"us-west-2\"\nendpoint = \"http://localhost:9000\"\n",
        )
        .unwrap();

        let file = ConfigFile::load(&path).unwrap().unwrap();
        assert_eq!(file.agent_id.as_deref(), Some("AGENT"));
        assert_eq!(file.agent_alias_id.as_deref(), Some("ALIAS"));
        assert_eq!(file.region.as_deref(), Some("us-west-2"));
        assert_eq!(file.endpoint.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn unknown_keys_are_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "agent = \"typo\"\n").unwrap();

        let err = ConfigFile::load(&path).unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)), "unexpected error: {err}");
    }

    #[test]
    fn default_path_ends_with_config_file() {
        let path = default_path();
        assert!(path.ends_with(Path::new(CONFIG_DIR).join(CONFIG_FILE)));
    }
}
