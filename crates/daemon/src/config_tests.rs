// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn missing_path_yields_defaults() {
    let config = DaemonConfig::load(None).unwrap();
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert!(config.auth.user_tokens.is_empty());
}

#[test]
fn full_config_parses() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
bind_addr = "0.0.0.0:9000"
base_url = "https://fuzz.example.com"
instance_name = "prod"
latest_agent_version = "2.1.0"

[auth]
admin_tokens = {{ "secret-admin" = "ops" }}
user_tokens = {{ "secret-user" = "dev" }}

[timers]
tasks_secs = 5
"#
    )
    .unwrap();

    let config = DaemonConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.bind_addr, "0.0.0.0:9000");
    assert_eq!(config.auth.admin_tokens.get("secret-admin").map(String::as_str), Some("ops"));
    assert_eq!(config.driver_intervals().tasks, std::time::Duration::from_secs(5));
    // Unset timers keep their defaults.
    assert_eq!(config.driver_intervals().workers, std::time::Duration::from_secs(90));

    let engine = config.engine_config();
    assert_eq!(engine.base_url, "https://fuzz.example.com");
    assert_eq!(engine.latest_agent_version.as_deref(), Some("2.1.0"));
}

#[test]
fn malformed_config_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "bind_addr = [1, 2]").unwrap();
    assert!(matches!(
        DaemonConfig::load(Some(file.path())),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn unreadable_path_is_a_read_error() {
    let missing = std::path::Path::new("/definitely/not/here.toml");
    assert!(matches!(DaemonConfig::load(Some(missing)), Err(ConfigError::Read { .. })));
}
