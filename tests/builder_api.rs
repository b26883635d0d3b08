#![allow(missing_docs)]

use std::path::PathBuf;

use streamgear::{ConfigError, UploadConfig, UploadLimits, Uploader, UploaderBuilder};

#[test]
fn builder_default_is_permissive() {
    let builder = UploaderBuilder::default();
    assert_eq!(builder.config(), &UploadConfig::default());

    let uploader = Uploader::builder()
        .build()
        .expect("default builder config should be valid");
    assert_eq!(uploader.config(), &UploadConfig::default());
}

#[test]
fn fluent_chaining_sets_expected_configuration() {
    let limits = UploadLimits {
        max_replay_bytes: Some(1024),
    };

    let uploader = Uploader::builder()
        .base_dir("/srv/uploads")
        .spool_dir("/var/spool/uploads")
        .limits(limits.clone())
        .build()
        .expect("builder config should validate");

    assert_eq!(
        uploader.config(),
        &UploadConfig {
            base_dir: Some(PathBuf::from("/srv/uploads")),
            spool_dir: Some(PathBuf::from("/var/spool/uploads")),
            limits,
        }
    );
}

#[test]
fn max_replay_bytes_shorthand_updates_limits() {
    let builder = Uploader::builder().max_replay_bytes(64);
    assert_eq!(builder.config().limits.max_replay_bytes, Some(64));
}

#[test]
fn build_surfaces_config_errors() {
    let result = Uploader::builder().max_replay_bytes(0).build();
    assert!(matches!(result, Err(ConfigError::InvalidReplayLimit)));
}

#[test]
fn with_config_validates_limits() {
    let config = UploadConfig {
        limits: UploadLimits {
            max_replay_bytes: Some(0),
        },
        ..UploadConfig::default()
    };
    assert!(matches!(
        Uploader::with_config(config),
        Err(ConfigError::InvalidReplayLimit)
    ));
}

#[test]
fn resolved_spool_dir_defaults_to_temp_dir() {
    let config = UploadConfig::default();
    assert_eq!(config.resolved_spool_dir(), std::env::temp_dir());

    let config = UploadConfig {
        spool_dir: Some(PathBuf::from("/var/spool/uploads")),
        ..UploadConfig::default()
    };
    assert_eq!(
        config.resolved_spool_dir(),
        PathBuf::from("/var/spool/uploads")
    );
}
