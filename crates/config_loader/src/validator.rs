//! 配置校验模块
//!
//! 校验规则：
//! - 数值范围 (validator derive)
//! - expected 传感器非空且唯一
//! - mount 唯一，且不为 undefined 配置挂载
//! - replay 源必须给出文件路径

use std::collections::HashSet;

use ::validator::Validate;
use contracts::{ContractError, MonitorBlueprint, SensorId, SourceKind};

/// 校验 MonitorBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    validate_ranges(blueprint)?;
    validate_expected_sensors(blueprint)?;
    validate_mounts(blueprint)?;
    validate_source(blueprint)?;
    Ok(())
}

/// 数值范围校验
fn validate_ranges(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))
}

/// 校验 expected 传感器集合
fn validate_expected_sensors(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let expected = &blueprint.sensors.expected;
    if expected.is_empty() {
        return Err(ContractError::config_validation(
            "sensors.expected",
            "at least one expected sensor is required",
        ));
    }

    let mut seen = HashSet::new();
    for sensor in expected {
        if !seen.insert(*sensor) {
            return Err(ContractError::config_validation(
                format!("sensors.expected[{sensor}]"),
                "duplicate expected sensor",
            ));
        }
    }
    Ok(())
}

/// 校验挂载表
fn validate_mounts(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, mount) in blueprint.sensors.mounts.iter().enumerate() {
        if mount.sensor == SensorId::Undefined {
            return Err(ContractError::config_validation(
                format!("sensors.mounts[{idx}].sensor"),
                "undefined sensor cannot have a mount",
            ));
        }
        if !seen.insert(mount.sensor) {
            return Err(ContractError::config_validation(
                format!("sensors.mounts[{idx}].sensor"),
                format!("duplicate mount for sensor '{}'", mount.sensor),
            ));
        }
    }
    Ok(())
}

/// 校验数据源
fn validate_source(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let source = &blueprint.source;
    if source.kind == SourceKind::Replay && source.replay_path.is_none() {
        return Err(ContractError::config_validation(
            "source.replay_path",
            "replay source requires replay_path",
        ));
    }
    if source.kind == SourceKind::Udp && source.bind_host.trim().is_empty() {
        return Err(ContractError::config_validation(
            "source.bind_host",
            "bind_host cannot be empty",
        ));
    }
    Ok(())
}
