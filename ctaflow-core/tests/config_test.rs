//! Layered settings loading from real files.

use std::io::Write;
use std::path::Path;

use ctaflow_core::config::{build_setting, StrategyKind, StrategySetting};
use ctaflow_core::engine::NullSink;
use ctaflow_core::error::ConfigError;
use ctaflow_core::factory::AnyEngine;
use ctaflow_core::synthetic::random_walk;
use tempfile::NamedTempFile;

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn json_file_overrides_defaults() {
    let file = write_temp(".json", r#"{"fast_window": 15, "atr_multiplier": 2.5}"#);
    let setting = build_setting(StrategyKind::TrendFollowing, Some(file.path()), &[]).unwrap();
    let StrategySetting::TrendFollowing(s) = setting else {
        panic!("wrong kind");
    };
    assert_eq!(s.fast_window, 15);
    assert_eq!(s.atr_multiplier, 2.5);
    assert_eq!(s.slow_window, 60);
}

#[test]
fn toml_file_is_detected_by_extension() {
    let file = write_temp(".toml", "boll_window = 30\nexit_dev = 0.0\n");
    let setting = build_setting(StrategyKind::MeanReversion, Some(file.path()), &[]).unwrap();
    let StrategySetting::MeanReversion(s) = setting else {
        panic!("wrong kind");
    };
    assert_eq!(s.boll_window, 30);
    assert_eq!(s.exit_dev, 0.0);
}

#[test]
fn overrides_win_over_file() {
    let file = write_temp(".json", r#"{"limit_pct": 0.2, "fixed_size": 200}"#);
    let setting = build_setting(
        StrategyKind::LimitBreakout,
        Some(file.path()),
        &["limit_pct=0.1".to_string()],
    )
    .unwrap();
    let StrategySetting::LimitBreakout(s) = setting else {
        panic!("wrong kind");
    };
    assert_eq!(s.limit_pct, 0.1);
    assert_eq!(s.fixed_size, 200);
}

#[test]
fn non_object_file_is_rejected() {
    let file = write_temp(".json", "[1, 2, 3]");
    let err = build_setting(StrategyKind::TrendFollowing, Some(file.path()), &[]).unwrap_err();
    assert!(matches!(err, ConfigError::NotAnObject { .. }));
}

#[test]
fn missing_file_reports_path() {
    let path = Path::new("/definitely/not/here/settings.json");
    let err = build_setting(StrategyKind::TrendFollowing, Some(path), &[]).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("settings.json"));
}

#[test]
fn malformed_files_are_rejected() {
    let json = write_temp(".json", "{ not json");
    assert!(matches!(
        build_setting(StrategyKind::TrendFollowing, Some(json.path()), &[]),
        Err(ConfigError::Json(_))
    ));

    let toml = write_temp(".toml", "fast_window = ");
    assert!(matches!(
        build_setting(StrategyKind::TrendFollowing, Some(toml.path()), &[]),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn unknown_key_in_file_is_rejected() {
    let file = write_temp(".json", r#"{"boll_window": 20}"#);
    assert!(build_setting(StrategyKind::TrendFollowing, Some(file.path()), &[]).is_err());
}

#[test]
fn invalid_values_fail_validation() {
    let file = write_temp(".json", r#"{"slow_window": 120}"#);
    let err = build_setting(StrategyKind::TrendFollowing, Some(file.path()), &[]).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::HistoryTooShort {
            history_size: 100,
            warmup: 140
        }
    ));

    let err = build_setting(
        StrategyKind::TrendFollowing,
        None,
        &["slow_window=120".into(), "history_size=150".into()],
    );
    assert!(err.is_ok());
}

#[test]
fn defaults_render_to_loadable_toml() {
    for kind in StrategyKind::ALL {
        let rendered = kind.default_setting().to_toml().unwrap();
        let file = write_temp(".toml", &rendered);
        let loaded = build_setting(kind, Some(file.path()), &[]).unwrap();
        assert_eq!(loaded, kind.default_setting());
        assert_eq!(
            loaded.fingerprint().unwrap(),
            kind.default_setting().fingerprint().unwrap()
        );
    }
}

#[test]
fn oversized_history_builds_and_runs() {
    let huge = format!("history_size={}", 1usize << 62);
    let setting = build_setting(StrategyKind::MeanReversion, None, &[huge]).unwrap();
    let mut engine = AnyEngine::from_setting(&setting).unwrap();
    let summary = engine.run(&random_walk(60, 2, 100.0), &mut NullSink);
    assert_eq!(summary.bars, 60);
    assert_eq!(summary.skipped, setting.warmup_bars() - 1);
}

#[test]
fn oversized_window_is_rejected_without_overflow() {
    let huge = format!("slow_window={}", i64::MAX);
    let err = build_setting(StrategyKind::TrendFollowing, None, &[huge]).unwrap_err();
    assert!(matches!(err, ConfigError::HistoryTooShort { history_size: 100, .. }));
}
