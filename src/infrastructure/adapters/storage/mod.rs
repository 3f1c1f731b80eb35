//! Storage Adapters - 音效文件存储

mod sound_storage;

pub use sound_storage::{probe_audio, HttpFileIngestion, SoundStorageConfig};
