//! Library Command Handlers - 音效增删
//!
//! 目录变更后整体重新发布命令集合。发布失败只记录日志，变更本身仍然生效。

use std::sync::Arc;

use super::PublishCommandsHandler;
use crate::application::commands::{
    AddSound, AddSoundResponse, PublishCommands, RemoveSound, RemoveSoundResponse,
};
use crate::application::error::{
    ApplicationError, MISSING_ATTACHMENT, MISSING_SOUND_NAME, SOUND_NOT_FOUND,
};
use crate::application::ports::{FileIngestionPort, SoundCatalogPort};
use crate::domain::sound::{SoundId, SoundName};

async fn republish(publisher: &PublishCommandsHandler) -> bool {
    match publisher.handle(PublishCommands).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Republish after library change failed");
            false
        }
    }
}

/// Add Sound Handler - 下载附件、入库、重新发布
pub struct AddSoundHandler {
    ingestion: Arc<dyn FileIngestionPort>,
    catalog: Arc<dyn SoundCatalogPort>,
    publisher: Arc<PublishCommandsHandler>,
}

impl AddSoundHandler {
    pub fn new(
        ingestion: Arc<dyn FileIngestionPort>,
        catalog: Arc<dyn SoundCatalogPort>,
        publisher: Arc<PublishCommandsHandler>,
    ) -> Self {
        Self {
            ingestion,
            catalog,
            publisher,
        }
    }

    pub async fn handle(&self, cmd: AddSound) -> Result<AddSoundResponse, ApplicationError> {
        let attachment = cmd
            .attachment
            .ok_or_else(|| ApplicationError::user_input(MISSING_ATTACHMENT))?;

        let raw_name = cmd.name.unwrap_or_default();
        if raw_name.trim().is_empty() {
            return Err(ApplicationError::user_input(MISSING_SOUND_NAME));
        }
        let name = SoundName::new(raw_name)
            .map_err(|_| ApplicationError::user_input("Sound name is too long!"))?;

        let file = self.ingestion.ingest(&attachment.url).await?;

        let record = match self.catalog.add(&file.id, &file.path, name.as_str()).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(discard_err) = self.ingestion.discard(&file.path).await {
                    tracing::warn!(
                        path = %file.path.display(),
                        error = %discard_err,
                        "Failed to discard orphaned sound file"
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            sound_id = %record.id,
            sound_name = %record.name,
            "Sound added"
        );

        let republished = republish(&self.publisher).await;

        Ok(AddSoundResponse {
            sound_id: record.id,
            name: record.name,
            republished,
        })
    }
}

/// Remove Sound Handler - 删除记录与文件、重新发布
pub struct RemoveSoundHandler {
    ingestion: Arc<dyn FileIngestionPort>,
    catalog: Arc<dyn SoundCatalogPort>,
    publisher: Arc<PublishCommandsHandler>,
}

impl RemoveSoundHandler {
    pub fn new(
        ingestion: Arc<dyn FileIngestionPort>,
        catalog: Arc<dyn SoundCatalogPort>,
        publisher: Arc<PublishCommandsHandler>,
    ) -> Self {
        Self {
            ingestion,
            catalog,
            publisher,
        }
    }

    pub async fn handle(&self, cmd: RemoveSound) -> Result<RemoveSoundResponse, ApplicationError> {
        let raw_id = cmd
            .sound_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApplicationError::user_input(MISSING_SOUND_NAME))?;

        // 非法标识不可能存在于目录中
        let id = SoundId::parse(raw_id).map_err(|_| ApplicationError::user_input(SOUND_NOT_FOUND))?;

        let record = self
            .catalog
            .find(id.as_str())
            .await?
            .ok_or_else(|| ApplicationError::user_input(SOUND_NOT_FOUND))?;

        if !self.catalog.remove(id.as_str()).await? {
            return Err(ApplicationError::user_input(SOUND_NOT_FOUND));
        }

        if let Err(e) = self.ingestion.discard(&record.file_path).await {
            tracing::warn!(
                sound_id = %record.id,
                path = %record.file_path.display(),
                error = %e,
                "Failed to delete sound file"
            );
        }

        tracing::info!(sound_id = %record.id, sound_name = %record.name, "Sound removed");

        let republished = republish(&self.publisher).await;

        Ok(RemoveSoundResponse {
            sound_id: id.into_inner(),
            republished,
        })
    }
}
