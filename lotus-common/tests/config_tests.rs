//! Tests for configuration resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate LOTUS_* variables are marked with #[serial].

use lotus_common::config::{resolve_database_path, TomlConfig};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

const ENV_VAR: &str = "LOTUS_TEST_DATABASE";

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    env::set_var(ENV_VAR, "/tmp/from-env.db");
    let config = TomlConfig {
        database_path: Some(PathBuf::from("/tmp/from-toml.db")),
        ..Default::default()
    };

    let path = resolve_database_path(Some(Path::new("/tmp/from-cli.db")), ENV_VAR, &config);
    assert_eq!(path, PathBuf::from("/tmp/from-cli.db"));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(ENV_VAR, "/tmp/from-env.db");
    let config = TomlConfig {
        database_path: Some(PathBuf::from("/tmp/from-toml.db")),
        ..Default::default()
    };

    let path = resolve_database_path(None, ENV_VAR, &config);
    assert_eq!(path, PathBuf::from("/tmp/from-env.db"));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_toml_used_without_cli_or_env() {
    env::remove_var(ENV_VAR);
    let config = TomlConfig {
        database_path: Some(PathBuf::from("/tmp/from-toml.db")),
        ..Default::default()
    };

    let path = resolve_database_path(None, ENV_VAR, &config);
    assert_eq!(path, PathBuf::from("/tmp/from-toml.db"));
}

#[test]
#[serial]
fn test_compiled_default_ends_in_lotus_db() {
    env::remove_var(ENV_VAR);

    let path = resolve_database_path(None, ENV_VAR, &TomlConfig::default());
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("lotus.db"));
}

#[test]
#[serial]
fn test_mail_key_env_overrides_toml() {
    env::set_var("LOTUS_MAIL_API_KEY", "env-key");
    let mut config = TomlConfig::default();
    config.mail.api_key = Some("toml-key".to_string());

    assert_eq!(config.mail_api_key().as_deref(), Some("env-key"));

    env::remove_var("LOTUS_MAIL_API_KEY");
    assert_eq!(config.mail_api_key().as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_blank_image_key_is_ignored() {
    env::remove_var("LOTUS_IMAGE_API_KEY");
    let mut config = TomlConfig::default();
    config.image.api_key = Some("   ".to_string());

    assert!(config.image_api_key().is_none());
}

#[test]
fn test_load_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[identity]\nheader = \"x-client-id\"").unwrap();

    let config = TomlConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.identity_header(), "x-client-id");
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let result = TomlConfig::load(Some(Path::new("/nonexistent/lotus/config.toml")));
    assert!(result.is_err());
}
