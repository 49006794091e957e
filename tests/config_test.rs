use spam_ingest::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_RESULTS, IngestConfig, IngestError, Ingestor,
};

#[test]
fn test_defaults() {
    let config = IngestConfig::default();

    assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
    assert_eq!(config.max_results, 40);
    assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    assert_eq!(
        config.normalizer.boilerplate_patterns,
        [r"\[image: Google\]"]
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = IngestConfig::from_toml_str(
        r#"
        max_results = 10

        [normalizer]
        boilerplate_literals = ["Sent from my phone"]
        "#,
    )
    .unwrap();

    assert_eq!(config.max_results, 10);
    assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    assert_eq!(config.normalizer.boilerplate_literals, ["Sent from my phone"]);
    assert_eq!(config.normalizer.boilerplate_patterns.len(), 1);

    let ingestor = Ingestor::from_config(&config).unwrap();
    assert_eq!(
        ingestor.normalizer().normalize("Hi [image: Google] Sent from my phone"),
        "hi"
    );
}

#[test]
fn test_json_config() {
    let config =
        IngestConfig::from_json_str(r#"{"concurrency": 2, "normalizer": {"boilerplate_patterns": []}}"#)
            .unwrap();

    assert_eq!(config.concurrency, 2);
    assert!(config.normalizer.boilerplate_patterns.is_empty());
}

#[test]
fn test_zero_limits_are_rejected() {
    assert!(matches!(
        IngestConfig::from_toml_str("max_results = 0"),
        Err(IngestError::Config(_))
    ));
    assert!(matches!(
        IngestConfig::from_toml_str("concurrency = 0"),
        Err(IngestError::Config(_))
    ));
}

#[test]
fn test_invalid_pattern_is_rejected() {
    let result = IngestConfig::from_toml_str(
        r#"
        [normalizer]
        boilerplate_patterns = ["[unclosed"]
        "#,
    );

    assert!(matches!(result, Err(IngestError::Pattern { .. })));
}

#[test]
fn test_malformed_toml() {
    assert!(matches!(
        IngestConfig::from_toml_str("max_results = \"many\""),
        Err(IngestError::Config(_))
    ));
}
