//! Interaction Port - 入站命令交互与单次回复
//!
//! 网关适配器把平台推送的命令调用转换为 [`Interaction`]，核心通过
//! [`InteractionReply`] 回复。每次调用只有第一次回复生效，之后的回复被静默丢弃。

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::PublishError;

/// 附件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// 选项值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Text(String),
    Attachment(Attachment),
}

/// 命令选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionOption {
    pub name: String,
    pub value: OptionValue,
}

/// 一次命令调用
#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: String,
    /// 用于延迟回复的交互令牌
    pub token: String,
    pub command_name: String,
    pub guild_id: String,
    pub user_id: String,
    pub options: Vec<InteractionOption>,
}

impl Interaction {
    pub fn text_option(&self, name: &str) -> Option<&str> {
        self.options.iter().find_map(|o| match &o.value {
            OptionValue::Text(text) if o.name == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn attachment_option(&self, name: &str) -> Option<&Attachment> {
        self.options.iter().find_map(|o| match &o.value {
            OptionValue::Attachment(attachment) if o.name == name => Some(attachment),
            _ => None,
        })
    }
}

/// 单次回复句柄
#[derive(Debug)]
pub struct InteractionReply {
    sender: Option<oneshot::Sender<String>>,
}

impl InteractionReply {
    pub fn new() -> (Self, oneshot::Receiver<String>) {
        let (tx, rx) = oneshot::channel();
        (Self { sender: Some(tx) }, rx)
    }

    /// 发送回复，仅第一次调用生效
    ///
    /// 返回回复是否送达；重复回复或对端已放弃时返回 false。
    pub fn reply(&mut self, content: impl Into<String>) -> bool {
        match self.sender.take() {
            Some(sender) => sender.send(content.into()).is_ok(),
            None => {
                tracing::debug!("Interaction already replied, suppressing");
                false
            }
        }
    }

    pub fn is_replied(&self) -> bool {
        self.sender.is_none()
    }
}

/// 延迟回复端口
///
/// 平台要求短时间内应答，超时后先回延迟确认，处理结果再通过该端口补发。
#[async_trait]
pub trait InteractionFollowupPort: Send + Sync {
    async fn edit_original_response(
        &self,
        interaction_token: &str,
        content: &str,
    ) -> Result<(), PublishError>;
}
