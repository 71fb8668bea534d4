//! Configuration resolution tests.

use std::collections::HashMap;
use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use bedrock_agent_chat::config::{AgentConfig, ConfigFile, DEFAULT_REGION};
use bedrock_agent_chat::error::AgentError;
use bedrock_agent_chat::types::AgentRef;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn environment_alone_is_enough() {
    let config = AgentConfig::resolve(
        env(&[("AGENT_ID", "AGENT123"), ("AGENT_ALIAS_ID", "ALIAS456")]),
        ConfigFile::default(),
    )
    .unwrap();

    assert_eq!(config.agent, AgentRef::new("AGENT123", "ALIAS456"));
    assert_eq!(config.region, DEFAULT_REGION);
    assert_eq!(config.endpoint, None);
    assert_eq!(
        config.endpoint_url(),
        "https://bedrock-agent-runtime.ap-northeast-1.amazonaws.com"
    );
}

#[test]
fn missing_ids_are_all_named() {
    let err = AgentConfig::resolve(env(&[]), ConfigFile::default()).unwrap_err();
    match err {
        AgentError::Configuration(message) => {
            assert_eq!(message, "Missing required environment variables: AGENT_ID, AGENT_ALIAS_ID");
        }
        other => panic!("expected Configuration, got {other:?}"),
    }

    let err = AgentConfig::resolve(env(&[("AGENT_ID", "AGENT123")]), ConfigFile::default()).unwrap_err();
    assert!(err.to_string().ends_with("Missing required environment variables: AGENT_ALIAS_ID"));
}

#[test]
fn blank_values_count_as_missing() {
    let err = AgentConfig::resolve(
        env(&[("AGENT_ID", "  "), ("AGENT_ALIAS_ID", "ALIAS456")]),
        ConfigFile::default(),
    )
    .unwrap_err();
    assert!(err.to_string().ends_with("Missing required environment variables: AGENT_ID"));
}

#[test]
fn environment_wins_over_the_file() {
    let file = ConfigFile {
        agent_id: Some("FILE_AGENT".into()),
        agent_alias_id: Some("FILE_ALIAS".into()),
        region: Some("eu-west-1".into()),
        endpoint: Some("http://file.example".into()),
    };
    let config = AgentConfig::resolve(
        env(&[
            ("AGENT_ID", "ENV_AGENT"),
            ("AWS_REGION", "us-east-1"),
            ("BEDROCK_AGENT_ENDPOINT", "http://localhost:4566/"),
        ]),
        file,
    )
    .unwrap();

    assert_eq!(config.agent, AgentRef::new("ENV_AGENT", "FILE_ALIAS"));
    assert_eq!(config.region, "us-east-1");
    assert_eq!(config.endpoint_url(), "http://localhost:4566");
}

#[test]
fn file_on_disk_fills_everything_in() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "agent_id = \"AGENT123\"\nagent_alias_id = \"ALIAS456\"\nregion = \"us-west-2\"\n",
    )
    .unwrap();

    let file = ConfigFile::load(&path).unwrap().unwrap();
    let config = AgentConfig::resolve(env(&[]), file).unwrap();

    assert_eq!(config.agent, AgentRef::new("AGENT123", "ALIAS456"));
    assert_eq!(
        config.endpoint_url(),
        "https://bedrock-agent-runtime.us-west-2.amazonaws.com"
    );
}

#[test]
fn malformed_file_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "agent_id = [unterminated").unwrap();

    let err = ConfigFile::load(&path).unwrap_err();
    assert!(matches!(err, AgentError::Configuration(_)));
}
