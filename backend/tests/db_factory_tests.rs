//! Tests for db::factory module - repository creation and configuration.

mod support;

use std::str::FromStr;

use magic_incubator::db::factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
use magic_incubator::db::repository::StartupRepository;
use magic_incubator::db::JsonFileConfig;

#[test]
fn test_repository_type_from_str_local() {
    assert_eq!(RepositoryType::from_str("local").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("memory").unwrap(), RepositoryType::Local);
}

#[test]
fn test_repository_type_from_str_json() {
    assert_eq!(RepositoryType::from_str("json").unwrap(), RepositoryType::JsonFile);
    assert_eq!(RepositoryType::from_str(" Json-File ").unwrap(), RepositoryType::JsonFile);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("mongo");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", None), ("DATA_FILE", None)], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_repository_type_from_env_with_data_file() {
    support::with_scoped_env(
        &[("REPOSITORY_TYPE", None), ("DATA_FILE", Some("/tmp/incubator.json"))],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::JsonFile);
        },
    );
}

#[test]
fn test_repository_type_explicit_env_wins() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATA_FILE", Some("/tmp/incubator.json")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_unparseable_env_falls_back_to_local() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("cassandra"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_json_config_from_env() {
    support::with_scoped_env(&[("DATA_FILE", Some("/srv/magic/db.json"))], || {
        let config = JsonFileConfig::from_env();
        assert_eq!(config.path, std::path::PathBuf::from("/srv/magic/db.json"));
    });
    support::with_scoped_env(&[("DATA_FILE", None)], || {
        let config = JsonFileConfig::from_env();
        assert_eq!(
            config.path,
            std::path::PathBuf::from(magic_incubator::db::DEFAULT_DATA_FILE)
        );
    });
}

#[tokio::test]
async fn test_factory_creates_local() {
    let repo = RepositoryFactory::create(RepositoryType::Local, None)
        .await
        .unwrap();
    assert_eq!(repo.storage_kind(), "local");
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_factory_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("nested").join("store.json");
    let config_path = dir.path().join("repository.toml");
    std::fs::write(
        &config_path,
        format!(
            "[repository]\ntype = \"json\"\n\n[json]\npath = \"{}\"\n",
            data.display()
        ),
    )
    .unwrap();

    let repo = RepositoryFactory::from_config_file(&config_path).await.unwrap();
    assert_eq!(repo.storage_kind(), "json");
}

#[tokio::test]
async fn test_factory_rejects_unknown_type_in_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("repository.toml");
    std::fs::write(&config_path, "[repository]\ntype = \"mongo\"\n").unwrap();

    assert!(RepositoryFactory::from_config_file(&config_path).await.is_err());
    assert!(RepositoryBuilder::new().from_config_file(&config_path).is_err());
}
