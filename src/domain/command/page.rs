//! Command Context - 分页
//!
//! 平台限制单个命令最多携带固定数量的 choice，超出时按目录顺序切成多页，
//! 每页发布为一个同义命令。

use serde::{Deserialize, Serialize};

/// 命令选项中的一个候选值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// 展示给用户的名称
    #[serde(rename = "name")]
    pub label: String,
    /// 回传给服务端的值（音效标识）
    pub value: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// 一页命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPage {
    pub base_name: String,
    pub suffix_index: usize,
    pub choices: Vec<Choice>,
}

impl CommandPage {
    /// 第 0 页使用基础名，其余页追加页号
    pub fn name(&self) -> String {
        if self.suffix_index == 0 {
            self.base_name.clone()
        } else {
            format!("{}{}", self.base_name, self.suffix_index)
        }
    }
}

/// 将音效列表切分为命令页
///
/// 页数为 `ceil(len / max_choices)`，第 i 页包含 `[i * max, (i + 1) * max)`。
/// `max_choices` 为 0 时按 1 处理。
pub fn build_pages(choices: &[Choice], base_name: &str, max_choices: usize) -> Vec<CommandPage> {
    choices
        .chunks(max_choices.max(1))
        .enumerate()
        .map(|(suffix_index, chunk)| CommandPage {
            base_name: base_name.to_string(),
            suffix_index,
            choices: chunk.to_vec(),
        })
        .collect()
}
