//! 配置校验模块
//!
//! 校验规则：
//! - 字段约束 (validator derive: 名称长度、超时范围)
//! - channel 名称唯一
//! - capabilities 非空且无重复
//! - webhook 必须提供合法 url
//! - file 的 path 参数非空

use std::collections::HashSet;

use contracts::{ChannelConfig, ChannelType, ContractError, NotifyBlueprint};
use validator::{Validate, ValidateUrl};

/// 校验 NotifyBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &NotifyBlueprint) -> Result<(), ContractError> {
    validate_field_rules(blueprint)?;
    validate_channel_names(blueprint)?;
    validate_capabilities(blueprint)?;
    validate_channel_params(blueprint)?;
    Ok(())
}

/// 校验 derive 声明的字段约束
fn validate_field_rules(blueprint: &NotifyBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|e| {
        let field = e
            .errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "blueprint".to_string());
        ContractError::config_validation(field, e.to_string())
    })
}

/// 校验 channel 名称唯一性
fn validate_channel_names(blueprint: &NotifyBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for channel in &blueprint.channels {
        if !seen.insert(channel.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("channels[name={}]", channel.name),
                "duplicate channel name",
            ));
        }
    }
    Ok(())
}

/// 校验 capabilities
fn validate_capabilities(blueprint: &NotifyBlueprint) -> Result<(), ContractError> {
    for channel in &blueprint.channels {
        if channel.capabilities.is_empty() {
            return Err(ContractError::config_validation(
                format!("channels[{}].capabilities", channel.name),
                "at least one capability is required",
            ));
        }
        let unique: HashSet<_> = channel.capabilities.iter().collect();
        if unique.len() != channel.capabilities.len() {
            return Err(ContractError::config_validation(
                format!("channels[{}].capabilities", channel.name),
                "duplicate capability",
            ));
        }
    }
    Ok(())
}

/// 校验类型相关参数
fn validate_channel_params(blueprint: &NotifyBlueprint) -> Result<(), ContractError> {
    for channel in &blueprint.channels {
        match channel.channel_type {
            ChannelType::Log => {}
            ChannelType::File => validate_file_params(channel)?,
            ChannelType::Webhook => validate_webhook_params(channel)?,
        }
    }
    Ok(())
}

fn validate_file_params(channel: &ChannelConfig) -> Result<(), ContractError> {
    match channel.params.get("path") {
        Some(path) if path.trim().is_empty() => Err(ContractError::config_validation(
            format!("channels[{}].params.path", channel.name),
            "path cannot be empty",
        )),
        _ => Ok(()),
    }
}

fn validate_webhook_params(channel: &ChannelConfig) -> Result<(), ContractError> {
    let field = format!("channels[{}].params.url", channel.name);
    let url = channel
        .params
        .get("url")
        .ok_or_else(|| ContractError::config_validation(&field, "webhook requires 'url'"))?;

    if !url.validate_url() {
        return Err(ContractError::config_validation(
            field,
            format!("invalid url '{url}'"),
        ));
    }
    Ok(())
}
