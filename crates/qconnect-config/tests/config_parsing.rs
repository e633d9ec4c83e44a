use std::{env, fs};

use qconnect_config::{ConfigError, ServerConfigResolver, load_config};

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("qconnect.toml");

    let toml_content = r#"
[logging]
level = "warn"

[http]
request_timeout_ms = 15000

[[servers]]
id = "test"
display_name = "Local e2e HAPI"
base_address = "http://localhost:8080/fhir"

[[servers]]
id = "ehx"
display_name = "eHealthExchange"
base_address = "https://gateway.example.org/fhir/r4"
trust_self_signed = true
request_timeout_ms = 60000

[servers.headers]
x-pou = "PUBHLTH"
x-destination = "CernerHelios"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.servers.len(), 2);
    assert_eq!(cfg.logging.level, "warn");
    assert_eq!(cfg.http.request_timeout_ms, 15_000);
    let ehx = &cfg.servers[1];
    assert!(ehx.trust_self_signed);
    assert_eq!(ehx.headers.get("x-pou").map(String::as_str), Some("PUBHLTH"));
    assert_eq!(ehx.headers.len(), 2);

    let registry = cfg.registry();
    assert_eq!(registry.resolve("test").unwrap().request_timeout_ms, Some(15_000));
    assert_eq!(registry.resolve("eHealthExchange").unwrap().request_timeout_ms, Some(60_000));
    assert!(matches!(
        registry.resolve("missing"),
        Err(ConfigError::ServerNotFound(_))
    ));

    // 2) Env override should win over file
    unsafe {
        env::set_var("QCONNECT__HTTP__REQUEST_TIMEOUT_MS", "2500");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.http.request_timeout_ms, 2500);
    unsafe {
        env::remove_var("QCONNECT__HTTP__REQUEST_TIMEOUT_MS");
    }

    // 3) Invalid config should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[[servers]]
id = "test"
display_name = "Local"
base_address = "not a url"
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.to_string().contains("base_address"));

    // 4) Explicit path that does not exist is an error
    let missing = dir.path().join("missing.toml");
    assert!(load_config(missing.to_str()).is_err());
}
