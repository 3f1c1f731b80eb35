//! Sound Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SoundError;

/// 平台对单个 choice 名称/值的长度上限
pub const MAX_CHOICE_TEXT_LEN: usize = 100;

/// 音效唯一标识
///
/// 新上传的音效使用 32 位十六进制随机串，同时也是磁盘上的文件名。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundId(String);

impl SoundId {
    /// 生成新的随机标识
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn parse(raw: impl Into<String>) -> Result<Self, SoundError> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > MAX_CHOICE_TEXT_LEN {
            return Err(SoundError::InvalidId(raw));
        }
        // 标识会被拼进文件路径
        if raw.contains(['/', '\\']) || raw.starts_with('.') {
            return Err(SoundError::InvalidId(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 音效显示名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundName(String);

impl SoundName {
    pub fn new(name: impl Into<String>) -> Result<Self, SoundError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(SoundError::InvalidName("name cannot be empty".to_string()));
        }
        if name.chars().count() > MAX_CHOICE_TEXT_LEN {
            return Err(SoundError::InvalidName(format!(
                "name cannot exceed {} characters",
                MAX_CHOICE_TEXT_LEN
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SoundName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
