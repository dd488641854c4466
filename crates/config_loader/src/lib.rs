//! # Config Loader
//!
//! 读取 `monitor.toml`（或同结构的 `.json`），解析为 `MonitorBlueprint` 并校验。
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("monitor.toml")).unwrap();
//! println!("Listening on {}", blueprint.source.bind_addr());
//! ```

mod parser;
mod validator;

pub use contracts::MonitorBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse and validate; the format follows the file extension
    pub fn load_from_path(path: &Path) -> Result<MonitorBlueprint, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<MonitorBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Re-check a blueprint after CLI overrides
    pub fn validate(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Render a blueprint as the TOML this loader reads back
    pub fn to_toml(blueprint: &MonitorBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SensorId, SourceKind};
    use std::io::Write;

    const MOCK_TOML: &str = r#"
[source]
kind = "mock"

[source.mock]
offline = ["left"]
cycle_hz = 20.0

[sensors]
expected = ["front", "right", "rear", "left"]

[assembler]
frames_per_publish = 2
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MOCK_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.source.kind, SourceKind::Mock);
        assert_eq!(bp.source.mock.offline, vec![SensorId::Left]);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MOCK_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.source.kind, bp2.source.kind);
        assert_eq!(bp.sensors.expected, bp2.sensors.expected);
        assert_eq!(bp.sensors.mounts, bp2.sensors.mounts);
        assert_eq!(
            bp.assembler.frames_per_publish,
            bp2.assembler.frames_per_publish
        );
    }

    #[test]
    fn test_json_matches_toml() {
        let bp = ConfigLoader::load_from_str(MOCK_TOML, ConfigFormat::Toml).unwrap();
        let json = serde_json::to_string(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.source.mock.offline, bp2.source.mock.offline);
        assert_eq!(bp.queues.obstacle, bp2.queues.obstacle);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[sensors]
expected = ["front", "front"]
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MOCK_TOML.as_bytes()).unwrap();

        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(bp.assembler.frames_per_publish, 2);
    }

    #[test]
    fn test_sample_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/monitor.toml");
        let bp = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(bp.source.kind, contracts::SourceKind::Mock);
        assert_eq!(bp.source.mock.offline, vec![contracts::SensorId::Rear]);
        assert_eq!(bp.sensors.mounts, contracts::default_mounts());
    }

    #[test]
    fn test_load_from_path_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
