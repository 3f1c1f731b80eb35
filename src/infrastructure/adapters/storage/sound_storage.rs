//! Sound Storage - 附件下载与音频校验
//!
//! 实现 FileIngestionPort trait。附件以随机标识为文件名落盘到 sounds 目录，
//! 下载过程中限制大小，落盘后用 symphonia 探测格式，非音频文件会被删除。

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{FileIngestionPort, IngestedFile, IngestionError};
use crate::domain::sound::SoundId;

/// 音效存储配置
#[derive(Debug, Clone)]
pub struct SoundStorageConfig {
    /// 音频文件目录
    pub sounds_dir: PathBuf,
    /// 单个附件的大小上限
    pub max_download_bytes: u64,
    /// 下载超时（秒）
    pub timeout_secs: u64,
}

impl Default for SoundStorageConfig {
    fn default() -> Self {
        Self {
            sounds_dir: PathBuf::from("./sounds"),
            max_download_bytes: 8 * 1024 * 1024,
            timeout_secs: 30,
        }
    }
}

/// 文件系统音效存储
pub struct HttpFileIngestion {
    client: Client,
    config: SoundStorageConfig,
}

impl HttpFileIngestion {
    /// 创建存储并确保目录存在
    pub async fn new(config: SoundStorageConfig) -> Result<Self, IngestionError> {
        fs::create_dir_all(&config.sounds_dir)
            .await
            .map_err(|e| IngestionError::IoError(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IngestionError::DownloadFailure(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn sounds_dir(&self) -> &Path {
        &self.config.sounds_dir
    }

    fn sound_path(&self, id: &SoundId) -> PathBuf {
        self.config.sounds_dir.join(id.as_str())
    }

    /// 流式下载到目标路径，返回写入字节数
    async fn download(&self, url: &str, path: &Path) -> Result<u64, IngestionError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                IngestionError::DownloadFailure(format!("Timed out fetching '{}'", url))
            } else {
                IngestionError::DownloadFailure(e.to_string())
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IngestionError::DownloadFailure(format!(
                "Failed to get '{}' ({})",
                url, status
            )));
        }

        let limit = self.config.max_download_bytes;
        if let Some(size) = response.content_length() {
            if size > limit {
                return Err(IngestionError::TooLarge { size, limit });
            }
        }

        let mut file = fs::File::create(path)
            .await
            .map_err(|e| IngestionError::IoError(e.to_string()))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| IngestionError::DownloadFailure(e.to_string()))?;
            written += chunk.len() as u64;
            if written > limit {
                return Err(IngestionError::TooLarge {
                    size: written,
                    limit,
                });
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| IngestionError::IoError(e.to_string()))?;
        }

        file.flush()
            .await
            .map_err(|e| IngestionError::IoError(e.to_string()))?;

        Ok(written)
    }

    async fn remove_partial(path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial download");
            }
        }
    }
}

/// 探测文件是否为可识别的音频
pub fn probe_audio(path: &Path) -> Result<String, IngestionError> {
    let file = std::fs::File::open(path).map_err(|e| IngestionError::IoError(e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| IngestionError::InvalidFileType(e.to_string()))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| IngestionError::InvalidFileType("No audio track found".to_string()))?;

    Ok(format!("{:?}", track.codec_params.codec))
}

#[async_trait]
impl FileIngestionPort for HttpFileIngestion {
    async fn ingest(&self, url: &str) -> Result<IngestedFile, IngestionError> {
        let id = SoundId::generate();
        let path = self.sound_path(&id);

        tracing::debug!(url = %url, sound_id = %id, "Downloading attachment");

        let size = match self.download(url, &path).await {
            Ok(size) => size,
            Err(e) => {
                Self::remove_partial(&path).await;
                return Err(e);
            }
        };

        let probe_path = path.clone();
        let probed = tokio::task::spawn_blocking(move || probe_audio(&probe_path))
            .await
            .map_err(|e| IngestionError::IoError(e.to_string()))
            .and_then(|result| result);

        let codec = match probed {
            Ok(codec) => codec,
            Err(e) => {
                tracing::info!(url = %url, error = %e, "Attachment is not audio, discarding");
                Self::remove_partial(&path).await;
                return Err(e);
            }
        };

        tracing::info!(
            sound_id = %id,
            size = size,
            codec = %codec,
            path = %path.display(),
            "Attachment stored"
        );

        Ok(IngestedFile {
            id: id.into_inner(),
            path,
        })
    }

    async fn discard(&self, path: &Path) -> Result<(), IngestionError> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Sound file deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IngestionError::IoError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use tempfile::TempDir;

    /// 8kHz 单声道 16bit PCM WAV
    fn wav_bytes(samples: usize) -> Vec<u8> {
        let data_len = (samples * 2) as u32;
        let mut buf = Vec::with_capacity(44 + samples * 2);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_len).to_le_bytes());
        buf.extend_from_slice(b"WAVE");
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&8000u32.to_le_bytes());
        buf.extend_from_slice(&16000u32.to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        for i in 0..samples {
            let sample = ((i % 40) as i16 - 20) * 500;
            buf.extend_from_slice(&sample.to_le_bytes());
        }
        buf
    }

    async fn serve_attachments() -> String {
        let app = Router::new()
            .route(
                "/moo.wav",
                get(|| async { ([(header::CONTENT_TYPE, "audio/wav")], wav_bytes(800)) }),
            )
            .route(
                "/notes.txt",
                get(|| async { "definitely not audio, just some words".into_response() }),
            )
            .route(
                "/huge.wav",
                get(|| async { ([(header::CONTENT_TYPE, "audio/wav")], wav_bytes(100_000)) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn storage(dir: &TempDir, max_download_bytes: u64) -> HttpFileIngestion {
        HttpFileIngestion::new(SoundStorageConfig {
            sounds_dir: dir.path().join("sounds"),
            max_download_bytes,
            timeout_secs: 5,
        })
        .await
        .unwrap()
    }

    fn stored_files(storage: &HttpFileIngestion) -> usize {
        std::fs::read_dir(storage.sounds_dir()).unwrap().count()
    }

    #[test]
    fn test_probe_detects_wav() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip");
        std::fs::write(&path, wav_bytes(400)).unwrap();
        assert!(probe_audio(&path).is_ok());

        let text = dir.path().join("text");
        std::fs::write(&text, b"hello world, this is plain text").unwrap();
        assert!(matches!(
            probe_audio(&text),
            Err(IngestionError::InvalidFileType(_))
        ));
    }

    #[tokio::test]
    async fn test_ingest_stores_audio_under_random_id() {
        let base = serve_attachments().await;
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, 1024 * 1024).await;

        let file = storage
            .ingest(&format!("{}/moo.wav", base))
            .await
            .unwrap();

        assert_eq!(file.id.len(), 32);
        assert!(file.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(file.path, storage.sounds_dir().join(&file.id));
        assert_eq!(std::fs::read(&file.path).unwrap(), wav_bytes(800));

        storage.discard(&file.path).await.unwrap();
        assert!(!file.path.exists());
        // 再次删除不报错
        storage.discard(&file.path).await.unwrap();
    }

    #[tokio::test]
    async fn test_ingest_rejects_non_audio_and_cleans_up() {
        let base = serve_attachments().await;
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, 1024 * 1024).await;

        let err = storage
            .ingest(&format!("{}/notes.txt", base))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestionError::InvalidFileType(_)));
        assert_eq!(stored_files(&storage), 0);
    }

    #[tokio::test]
    async fn test_ingest_failure_statuses_and_limits() {
        let base = serve_attachments().await;
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, 4096).await;

        let err = storage
            .ingest(&format!("{}/missing.wav", base))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestionError::DownloadFailure(msg) if msg.contains("404")));

        let err = storage
            .ingest(&format!("{}/huge.wav", base))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestionError::TooLarge { limit: 4096, .. }));
        assert_eq!(stored_files(&storage), 0);
    }
}
