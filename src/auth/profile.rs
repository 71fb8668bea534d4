//! Shared credentials file (`~/.aws/credentials`).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::credentials::AwsCredentials;
use super::error::AuthError;

pub const DEFAULT_PROFILE: &str = "default";

/// `~/.aws/credentials`, if a home directory is known.
pub fn default_credentials_path() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().join(".aws").join("credentials"))
}

/// Load one profile's static keys. `None` if the file or the profile is
/// absent, or the profile lacks either key.
pub fn load_profile(path: &Path, profile: &str) -> Result<Option<AwsCredentials>, AuthError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(AuthError::CredentialsFile {
                path: path.display().to_string(),
                source,
            })
        }
    };

    let Some(keys) = parse_profiles(&raw).remove(profile) else {
        return Ok(None);
    };

    let get = |key: &str| keys.get(key).filter(|v| !v.is_empty()).cloned();
    let (Some(access_key_id), Some(secret_access_key)) =
        (get("aws_access_key_id"), get("aws_secret_access_key"))
    else {
        return Ok(None);
    };

    Ok(Some(AwsCredentials {
        access_key_id,
        secret_access_key,
        session_token: get("aws_session_token"),
    }))
}

/// INI sections to key/value maps. Keys are lowercased; `[profile name]`
/// headers are accepted as `name`.
fn parse_profiles(raw: &str) -> HashMap<String, HashMap<String, String>> {
    let mut profiles: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let section = section.trim();
            let name = section.strip_prefix("profile ").unwrap_or(section).trim();
            profiles.entry(name.to_string()).or_default();
            current = Some(name.to_string());
            continue;
        }

        if let (Some(section), Some((key, value))) = (&current, line.split_once('=')) {
            if let Some(keys) = profiles.get_mut(section) {
                keys.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }
    }

    profiles
}
