use std::collections::HashMap;
use std::time::Duration;

use chemreport_rust::{AppConfig, AppError, ModelConfig};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |k| map.get(k).cloned()
}

#[test]
fn empty_environment_yields_defaults() {
    let cfg = AppConfig::from_lookup(&env(&[])).unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert!(cfg.orchestrator.enable_cache);
    assert!(cfg.orchestrator.enable_detailed_audit);
}

#[test]
fn full_environment_is_read() {
    let cfg = AppConfig::from_lookup(&env(&[("DATABASE_URL", "postgres://u:p@localhost/chem"),
                                            ("DATABASE_MAX_CONNECTIONS", "4"),
                                            ("DATABASE_CONNECT_TIMEOUT_SECS", "2"),
                                            ("GOOGLE_GENERATIVE_AI_API_KEY", "k-123"),
                                            ("GEMINI_MODEL", "gemini-pro"),
                                            ("MODEL_TEMPERATURE", "0.7"),
                                            ("MODEL_TIMEOUT_SECS", "5"),
                                            ("CHEMREPORT_ENABLE_CACHE", "off"),
                                            ("CHEMREPORT_CACHE_TTL_SECS", "3600")])).unwrap();
    let db = cfg.database.expect("db");
    assert_eq!(db.url, "postgres://u:p@localhost/chem");
    assert_eq!(db.max_connections, 4);
    assert_eq!(db.connect_timeout, Duration::from_secs(2));
    assert!(!cfg.orchestrator.enable_cache);
    assert_eq!(cfg.cache_ttl, Some(Duration::from_secs(3600)));

    let gemini = cfg.model.gemini().expect("gemini");
    assert_eq!(gemini.model, "gemini-pro");
    assert_eq!(gemini.timeout, Duration::from_secs(5));
    assert_eq!(cfg.model.synthesizer().temperature, 0.7);
}

#[test]
fn invalid_values_are_config_errors() {
    for pairs in [&[("MODEL_TEMPERATURE", "3.5")][..],
                  &[("MODEL_TEMPERATURE", "warm")],
                  &[("DATABASE_URL", "postgres://x"), ("DATABASE_MIN_CONNECTIONS", "-1")],
                  &[("CHEMREPORT_DETAILED_AUDIT", "maybe")]]
    {
        let err = AppConfig::from_lookup(&env(pairs)).unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "{pairs:?}");
        assert_eq!(err.exit_code(), 3);
    }
}

#[test]
fn zero_ttl_means_no_expiry() {
    let cfg = AppConfig::from_lookup(&env(&[("CHEMREPORT_CACHE_TTL_SECS", "0")])).unwrap();
    assert_eq!(cfg.cache_ttl, None);
    let model = ModelConfig::from_lookup(&env(&[("MODEL_TIMEOUT_SECS", "0")])).unwrap();
    assert_eq!(model.timeout, Duration::from_secs(1));
}
