//! Layered configuration: file, nested environment overrides and flat flags.

use dload_core::{ConfigManager, Loader, LoaderError, ResourceType, TaskState};
use std::collections::HashMap;
use std::io::Write;

const CONFIG: &str = r#"
include_default_references = true
preloaded = ["jquery"]

[options]
link_styles = true

[references.charts]
requirements = ["jquery"]
resources.script = ["/js/charts.js"]
resources.style = ["/css/charts.css"]
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn test_file_and_environment_layers() -> anyhow::Result<()> {
    let file = write_config(CONFIG);
    let variables = HashMap::from([
        ("DLOAD__OPTIONS__DEBUG".to_string(), "true".to_string()),
        ("DLOAD_CACHE_SCRIPTS".to_string(), "false".to_string()),
    ]);

    let manager = ConfigManager::load_with_environment(Some(file.path()), variables)?;
    let config = manager.config();

    assert!(config.options.link_styles);
    assert!(config.options.debug);
    assert!(!config.options.cache_scripts);
    assert!(!config.options.allow_cross_domain);
    assert_eq!(config.preloaded, vec!["jquery"]);
    assert_eq!(manager.source(), Some(file.path()));

    let charts = &config.references["charts"];
    assert_eq!(charts.requirements, vec!["jquery"]);
    assert_eq!(charts.urls(&ResourceType::script()), ["/js/charts.js"]);
    assert_eq!(charts.urls(&ResourceType::style()), ["/css/charts.css"]);
    Ok(())
}

#[test]
fn test_environment_only_uses_defaults() {
    let manager = ConfigManager::load_with_environment(None, HashMap::new()).unwrap();
    let config = manager.config();

    assert!(config.references.is_empty());
    assert!(config.preloaded.is_empty());
    assert!(config.options.cache_scripts);
    assert!(manager.source().is_none());
}

#[test]
fn test_invalid_flag_is_reported() {
    let variables = HashMap::from([("DLOAD_DEBUG".to_string(), "maybe".to_string())]);
    let result = ConfigManager::load_with_environment(None, variables);
    assert!(matches!(result, Err(LoaderError::InvalidEnvironment { .. })));
}

#[test]
fn test_missing_file_is_a_configuration_error() {
    let result = ConfigManager::load_with_environment(
        Some(std::path::Path::new("/nonexistent/dload.toml")),
        HashMap::new(),
    );
    assert!(matches!(result, Err(LoaderError::ConfigurationError(_))));
}

#[tokio::test]
async fn test_loader_from_configuration() -> anyhow::Result<()> {
    let file = write_config(CONFIG);
    let manager = ConfigManager::load_with_environment(Some(file.path()), HashMap::new())?;
    let loader = Loader::from_config_manager(&manager)?;

    assert_eq!(loader.refs().names(), vec!["charts", "jquery", "ui"]);
    assert!(loader.opts().link_styles);
    assert_eq!(
        loader.promises().get("jquery").map(|task| task.state()),
        Some(TaskState::Resolved(None))
    );
    Ok(())
}
