use std::path::Path;

use axum::body::Bytes;
use chrono::Utc;
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use shared_database::{collections, StoreGateway};
use shared_models::StoredFile;

use crate::models::ChatError;

pub struct FileService {
    gateway: StoreGateway,
    upload_dir: String,
}

impl FileService {
    pub fn new(gateway: StoreGateway, upload_dir: String) -> Self {
        Self {
            gateway,
            upload_dir,
        }
    }

    /// Writes the upload to disk under a `{uuid}_{original}` name and
    /// records its metadata. The disk write is the core operation; the
    /// metadata insert is best-effort since the file is already servable
    /// at its URL.
    pub async fn store(
        &self,
        uploader_id: &str,
        room_id: Option<String>,
        file: Option<(String, Bytes)>,
    ) -> Result<StoredFile, ChatError> {
        let (original_name, data) = file.ok_or(ChatError::MissingFile)?;
        if original_name.is_empty() {
            return Err(ChatError::EmptyFileName);
        }
        let room_id = room_id
            .filter(|r| !r.trim().is_empty())
            .ok_or(ChatError::MissingRoomId)?;

        let stored_name = format!("{}_{}", Uuid::new_v4(), original_name);
        let dir = Path::new(&self.upload_dir);
        fs::create_dir_all(dir).await?;
        fs::write(dir.join(&stored_name), &data).await?;

        let stored = StoredFile {
            id: Uuid::new_v4().to_string(),
            chat_room_id: room_id,
            uploaded_by: uploader_id.to_string(),
            original_name,
            file_url: format!("/uploads/chat/{}", stored_name),
            stored_name,
            size_bytes: data.len() as u64,
            uploaded_at: Utc::now(),
        };

        match serde_json::to_value(&stored) {
            Ok(document) => {
                if let Err(e) = self
                    .gateway
                    .insert_one(collections::CHAT_FILES, document)
                    .await
                {
                    warn!("File metadata storage failed, but file was uploaded: {}", e);
                }
            }
            Err(e) => warn!("File metadata storage failed, but file was uploaded: {}", e),
        }

        Ok(stored)
    }
}
