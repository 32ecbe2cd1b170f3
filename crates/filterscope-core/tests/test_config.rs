use std::time::Duration;

use filterscope_core::config::PreviewConfig;
use filterscope_core::error::ConfigError;
use filterscope_core::filters::FilterSpec;
use filterscope_core::viewport::Resample;

#[test]
fn test_defaults() {
    let config = PreviewConfig::default();
    assert_eq!(config.tick_interval(), Duration::from_millis(10));
    assert_eq!(config.read_failure_threshold, 5);
    assert_eq!(config.resample, Resample::Linear);
    assert!(!config.threaded_capture);
    assert_eq!(config.filter, FilterSpec::Identity);
}

#[test]
fn test_empty_toml_gives_defaults() {
    assert_eq!(PreviewConfig::from_toml("").unwrap(), PreviewConfig::default());
}

#[test]
fn test_partial_toml_overrides() {
    let config = PreviewConfig::from_toml(
        r#"
tick_interval_ms = 33
resample = "nearest"

[filter]
kind = "gaussian_blur"
kernel_size = 7
sigma = 2.0
"#,
    )
    .unwrap();

    assert_eq!(config.tick_interval_ms, 33);
    assert_eq!(config.resample, Resample::Nearest);
    assert_eq!(config.read_failure_threshold, 5);
    assert_eq!(config.filter, FilterSpec::GaussianBlur { kernel_size: 7, sigma: 2.0 });
}

#[test]
fn test_edge_filters_use_short_tags() {
    let config = PreviewConfig::from_toml("[filter]\nkind = \"canny\"\nthreshold1 = 10.0\nthreshold2 = 20.0\n").unwrap();
    assert_eq!(config.filter, FilterSpec::CannyEdge { threshold1: 10.0, threshold2: 20.0 });
}

#[test]
fn test_roundtrip_through_file() {
    let config = PreviewConfig {
        tick_interval_ms: 20,
        threaded_capture: true,
        filter: FilterSpec::SobelEdge { kernel_size: 5 },
        ..PreviewConfig::default()
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preview.toml");
    std::fs::write(&path, config.to_toml().unwrap()).unwrap();

    assert_eq!(PreviewConfig::load(&path).unwrap(), config);
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let err = PreviewConfig::from_toml("[filter]\nkind = \"emboss\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = PreviewConfig::load(std::path::Path::new("/nonexistent/preview.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
