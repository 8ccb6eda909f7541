use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Load configuration from a TOML or YAML file (chosen by extension),
/// layered under `APP_`-prefixed environment variables.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        _ => FileFormat::Toml,
    };
    let config = Config::builder()
        .add_source(File::from(path).format(format))
        .add_source(Environment::with_prefix("APP").separator("_"))
        .build()?;
    Ok(config)
}

/// Resolve a `${key}` or `${key:default}` placeholder against `config`;
/// anything else passes through verbatim.
pub fn resolve_value(value: &str, config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    let Some(inner) = value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    else {
        return Ok(value.to_string());
    };

    match inner.split_once(':') {
        Some((key, default)) => Ok(config
            .get_string(key)
            .unwrap_or_else(|_| default.to_string())),
        None => Ok(config.get_string(inner)?),
    }
}

/// Per-task schedule settings, deserialized from a config table such as
///
/// ```toml
/// [app.cleanup]
/// cron = "0 0 3 * * *"
/// enabled = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSettings {
    pub cron: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}
