//! Data Transfer Objects
//!
//! 平台交互回调的请求/响应结构，以及内部接口的统一响应格式

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::application::ports::{Attachment, Interaction, InteractionOption, OptionValue};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Interaction DTOs
// ============================================================================

/// 交互类型
pub mod interaction_type {
    pub const PING: u8 = 1;
    pub const APPLICATION_COMMAND: u8 = 2;
}

/// 交互响应类型
pub mod callback_type {
    pub const PONG: u8 = 1;
    pub const CHANNEL_MESSAGE: u8 = 4;
    pub const DEFERRED_CHANNEL_MESSAGE: u8 = 5;
}

/// 选项类型：附件
const ATTACHMENT_OPTION_TYPE: u8 = 11;

#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberPayload {
    pub user: UserPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentPayload {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolvedPayload {
    #[serde(default)]
    pub attachments: HashMap<String, AttachmentPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandDataPayload {
    pub name: String,
    #[serde(default)]
    pub options: Vec<OptionPayload>,
    #[serde(default)]
    pub resolved: ResolvedPayload,
}

/// 平台推送的交互
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub member: Option<MemberPayload>,
    #[serde(default)]
    pub user: Option<UserPayload>,
    #[serde(default)]
    pub data: Option<CommandDataPayload>,
}

impl InteractionPayload {
    /// 转换为命令调用，缺少必要字段时返回错误描述
    pub fn into_interaction(self) -> Result<Interaction, String> {
        let data = self.data.ok_or("missing command data")?;
        let guild_id = self.guild_id.ok_or("command must be used in a guild")?;
        let user_id = self
            .member
            .map(|m| m.user.id)
            .or(self.user.map(|u| u.id))
            .ok_or("missing invoking user")?;

        let resolved = data.resolved.attachments;
        let options = data
            .options
            .into_iter()
            .filter_map(|option| {
                let raw = match option.value? {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                let value = if option.kind == ATTACHMENT_OPTION_TYPE {
                    let attachment = resolved.get(&raw)?;
                    OptionValue::Attachment(Attachment {
                        url: attachment.url.clone(),
                        filename: attachment.filename.clone(),
                        content_type: attachment.content_type.clone(),
                    })
                } else {
                    OptionValue::Text(raw)
                };
                Some(InteractionOption {
                    name: option.name,
                    value,
                })
            })
            .collect();

        Ok(Interaction {
            id: self.id,
            token: self.token,
            command_name: data.name,
            guild_id,
            user_id,
            options,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct MessageData {
    pub content: String,
}

/// 交互响应
#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: callback_type::PONG,
            data: None,
        }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: callback_type::CHANNEL_MESSAGE,
            data: Some(MessageData {
                content: content.into(),
            }),
        }
    }

    pub fn deferred() -> Self {
        Self {
            kind: callback_type::DEFERRED_CHANNEL_MESSAGE,
            data: None,
        }
    }
}

// ============================================================================
// Voice event / status DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoiceEventAck {
    /// 事件是否对应仍在跟踪的流
    pub known: bool,
}
