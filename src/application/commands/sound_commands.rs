//! Sound Commands - 播放与音效库相关命令

use crate::application::ports::{Attachment, VoiceChannelRef};

/// 播放音效
#[derive(Debug, Clone)]
pub struct PlaySound {
    /// 请求者当前所在语音频道
    pub requester_channel: Option<VoiceChannelRef>,
    pub sound_id: Option<String>,
}

/// 播放响应
#[derive(Debug, Clone)]
pub struct PlaySoundResponse {
    pub sound_id: String,
    pub sound_name: String,
    pub channel: VoiceChannelRef,
}

/// 停止当前播放（保留语音连接）
#[derive(Debug, Clone, Default)]
pub struct StopPlayback;

/// 从附件新增音效
#[derive(Debug, Clone)]
pub struct AddSound {
    pub name: Option<String>,
    pub attachment: Option<Attachment>,
}

/// 新增音效响应
#[derive(Debug, Clone)]
pub struct AddSoundResponse {
    pub sound_id: String,
    pub name: String,
    /// 命令集合是否已重新发布
    pub republished: bool,
}

/// 删除音效
#[derive(Debug, Clone)]
pub struct RemoveSound {
    pub sound_id: Option<String>,
}

/// 删除音效响应
#[derive(Debug, Clone)]
pub struct RemoveSoundResponse {
    pub sound_id: String,
    pub republished: bool,
}

/// 重建并发布完整命令集合
#[derive(Debug, Clone, Default)]
pub struct PublishCommands;

/// 发布响应
#[derive(Debug, Clone)]
pub struct PublishCommandsResponse {
    pub command_count: usize,
    pub sound_count: usize,
    /// 播放命令的页数
    pub play_pages: usize,
}
