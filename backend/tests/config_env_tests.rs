//! Configuration and repository selection from environment variables.

mod support;

use std::io::Write;

use timetable_rust::config::AppConfig;
use timetable_rust::db::{RepositoryFactory, RepositoryType};

const ALL_VARS: [&str; 5] = [
    "REPOSITORY_TYPE",
    "TIMETABLE_DATA_DIR",
    "GENERATOR_ENDPOINT",
    "HOST",
    "PORT",
];

fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
    ALL_VARS.iter().map(|k| (*k, None)).collect()
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(&cleared(), || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_repository_type_from_env_with_data_dir() {
    let mut env = cleared();
    env.push(("TIMETABLE_DATA_DIR", Some("/tmp/timetables")));
    support::with_scoped_env(&env, || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::File);
    });
}

#[test]
fn test_explicit_repository_type_wins() {
    let mut env = cleared();
    env.push(("TIMETABLE_DATA_DIR", Some("/tmp/timetables")));
    env.push(("REPOSITORY_TYPE", Some("memory")));
    support::with_scoped_env(&env, || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_env_overrides_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("timetable.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
[repository]
type = "local"

[server]
port = 9000

[generation]
periods_per_day = 6
"#
    )
    .unwrap();

    let data_dir = dir.path().join("data");
    let data_dir_str = data_dir.to_str().unwrap().to_string();
    let mut env = cleared();
    env.push(("REPOSITORY_TYPE", Some("file")));
    env.push(("TIMETABLE_DATA_DIR", Some(data_dir_str.as_str())));
    env.push(("GENERATOR_ENDPOINT", Some("http://localhost:9/generate")));
    env.push(("PORT", Some("8181")));

    let config = support::with_scoped_env(&env, || {
        let mut config = AppConfig::from_file(&path).unwrap();
        config.apply_env_overrides().unwrap();
        config
    });

    assert_eq!(config.repository.repository_type(), Ok(RepositoryType::File));
    assert_eq!(config.repository.data_dir, data_dir);
    assert_eq!(config.generator.kind, "http");
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.generation_params().periods_per_day, 6);

    let generator = config.generator.build().unwrap();
    assert_eq!(generator.name(), "http");
    RepositoryFactory::from_settings(&config.repository).unwrap();
    assert!(data_dir.is_dir());
}

#[test]
fn test_invalid_port_is_rejected() {
    let mut env = cleared();
    env.push(("PORT", Some("eighty")));
    support::with_scoped_env(&env, || {
        let mut config = AppConfig::default();
        assert!(config.apply_env_overrides().is_err());
    });
}
