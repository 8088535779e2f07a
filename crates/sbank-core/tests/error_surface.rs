use sbank_core::errors::{ErrorInfo, SbankError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("param", "nhood_size")
        .with_context("value", "-1")
}

#[test]
fn config_error_surface() {
    let err = SbankError::Config(sample_info("non-positive", "nhood_size must be positive"));
    assert_eq!(err.info().code, "non-positive");
    assert!(err.info().context.contains_key("param"));
    assert!(err.is_config());
}

#[test]
fn invariant_error_surface() {
    let err = SbankError::Invariant(sample_info("unsorted-bank", "bank order broken"));
    assert_eq!(err.info().code, "unsorted-bank");
    assert!(!err.is_config());
}

#[test]
fn serde_error_surface() {
    let err = SbankError::Serde(sample_info("bank-read", "missing file").with_hint("check path"));
    assert_eq!(err.info().hint.as_deref(), Some("check path"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("serde error: missing file (code: bank-read)"));
    assert!(rendered.contains("param=nhood_size"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = SbankError::Config(ErrorInfo::new("unknown-frame", "bad frame"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Config");
    assert_eq!(json["detail"]["code"], "unknown-frame");
    let decoded: SbankError = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, err);
}
