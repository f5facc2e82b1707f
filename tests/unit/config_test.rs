//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use batch_dispatch::config::{DispatchConfig, GateConfig, SchedulerOptions};

#[test]
fn test_default_config_is_valid() {
    let config = DispatchConfig::default();
    assert!(config.validate().is_ok());
    assert!(config.scheduler.wait_for_jobs_on_shutdown);
    assert!(!config.scheduler.auto_startup);
    assert!(config.scheduler.thread_count > 0);
    assert!(config.gate.enabled);
}

#[test]
fn test_scheduler_options_invalid_thread_count() {
    let invalid = SchedulerOptions {
        thread_count: 0,
        ..SchedulerOptions::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_gate_invalid_poll_interval() {
    let invalid = GateConfig {
        enabled: true,
        poll_interval_ms: 0,
    };
    assert!(invalid.validate().is_err());

    let disabled = GateConfig {
        enabled: false,
        poll_interval_ms: 0,
    };
    assert!(disabled.validate().is_ok());
}

#[test]
fn test_gate_poll_interval_duration() {
    let gate = GateConfig {
        enabled: true,
        poll_interval_ms: 250,
    };
    assert_eq!(gate.poll_interval(), Duration::from_millis(250));
}

#[test]
fn test_dispatch_config_from_json() {
    let json = r#"{
        "scheduler": {
            "wait_for_jobs_on_shutdown": false,
            "auto_startup": false,
            "thread_count": 4
        },
        "gate": {
            "enabled": true,
            "poll_interval_ms": 100
        }
    }"#;

    let config = DispatchConfig::from_json_str(json).unwrap();
    assert!(!config.scheduler.wait_for_jobs_on_shutdown);
    assert_eq!(config.scheduler.thread_count, 4);
    assert_eq!(config.gate.poll_interval_ms, 100);
}

#[test]
fn test_dispatch_config_from_partial_json_uses_defaults() {
    let config = DispatchConfig::from_json_str(r#"{ "gate": { "poll_interval_ms": 50 } }"#).unwrap();
    assert!(config.scheduler.wait_for_jobs_on_shutdown);
    assert!(config.gate.enabled);
    assert_eq!(config.gate.poll_interval_ms, 50);
}

#[test]
fn test_dispatch_config_from_json_rejects_invalid() {
    let json = r#"{ "scheduler": { "thread_count": 0 } }"#;
    assert!(DispatchConfig::from_json_str(json).is_err());
    assert!(DispatchConfig::from_json_str("not json").is_err());
}

#[test]
fn test_dispatch_config_from_lookup() {
    let vars: HashMap<&str, &str> = [
        ("BATCH_DISPATCH_WAIT_ON_SHUTDOWN", "false"),
        ("BATCH_DISPATCH_THREADS", "2"),
        ("BATCH_DISPATCH_GATE_POLL_MS", "20"),
    ]
    .into_iter()
    .collect();

    let config =
        DispatchConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string())).unwrap();
    assert!(!config.scheduler.wait_for_jobs_on_shutdown);
    assert_eq!(config.scheduler.thread_count, 2);
    assert_eq!(config.gate.poll_interval_ms, 20);
    assert!(config.gate.enabled);
}

#[test]
fn test_dispatch_config_from_lookup_rejects_bad_value() {
    let err = DispatchConfig::from_lookup(|key| {
        (key == "BATCH_DISPATCH_THREADS").then(|| "many".to_string())
    })
    .unwrap_err();
    assert!(err.contains("BATCH_DISPATCH_THREADS"));
}
