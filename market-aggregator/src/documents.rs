use crate::database::uuid_column;
use crate::types::{AggregatorError, DocumentStatus, Result, UploadedDocument};
use chrono::{DateTime, Utc};
use mime_guess::mime;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// MIME type from the file extension, `application/octet-stream` when unknown.
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

/// Text, JSON, XML and YAML documents, including `+json`/`+xml` suffixed types.
pub fn is_text_like(mime_type: &str) -> bool {
    let Ok(parsed) = mime_type.parse::<mime::Mime>() else {
        return false;
    };

    parsed.type_() == mime::TEXT
        || parsed.subtype() == mime::JSON
        || parsed.subtype() == mime::XML
        || parsed.subtype().as_str().contains("yaml")
        || matches!(parsed.suffix(), Some(suffix) if suffix == mime::JSON || suffix == mime::XML)
}

/// Uploaded files: bytes in a storage directory, metadata in SQLite.
pub struct DocumentStore {
    db: SqlitePool,
    storage_dir: PathBuf,
}

impl DocumentStore {
    pub fn new(db: SqlitePool, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            storage_dir: storage_dir.into(),
        }
    }

    pub async fn setup_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS uploaded_documents (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                storage_path TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                mime_type TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Copy a local file into storage and record it.
    pub async fn upload(&self, source: &Path) -> Result<UploadedDocument> {
        let filename = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| AggregatorError::General(format!("Not a file: {}", source.display())))?
            .to_string();

        tokio::fs::create_dir_all(&self.storage_dir).await?;

        let id = Uuid::new_v4();
        let stored = self.storage_dir.join(format!("{}-{}", id, filename));
        let size_bytes = tokio::fs::copy(source, &stored).await?;

        let document = UploadedDocument {
            id,
            filename,
            storage_path: stored.to_string_lossy().into_owned(),
            size_bytes,
            mime_type: guess_mime_type(source),
            status: DocumentStatus::Uploaded,
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO uploaded_documents (id, filename, storage_path, size_bytes, mime_type, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(document.id.to_string())
        .bind(&document.filename)
        .bind(&document.storage_path)
        .bind(document.size_bytes as i64)
        .bind(&document.mime_type)
        .bind(document.status.as_str())
        .bind(document.created_at)
        .execute(&self.db)
        .await;

        if let Err(e) = inserted {
            // No stored file without a row.
            if let Err(remove_err) = tokio::fs::remove_file(&stored).await {
                warn!("Could not remove {}: {}", stored.display(), remove_err);
            }
            return Err(e.into());
        }

        info!(
            "Uploaded {} ({} bytes, {}) as {}",
            document.filename, document.size_bytes, document.mime_type, document.id
        );
        Ok(document)
    }

    pub async fn list(&self) -> Result<Vec<UploadedDocument>> {
        let rows = sqlx::query(
            "SELECT * FROM uploaded_documents ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.db)
        .await?;
        rows.iter().map(row_to_document).collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<UploadedDocument> {
        let row = sqlx::query("SELECT * FROM uploaded_documents WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some(row) => row_to_document(&row),
            None => Err(AggregatorError::DocumentNotFound { id }),
        }
    }

    pub async fn set_status(&self, id: Uuid, status: DocumentStatus) -> Result<()> {
        let updated = sqlx::query("UPDATE uploaded_documents SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&self.db)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(AggregatorError::DocumentNotFound { id });
        }
        Ok(())
    }

    /// Remove the row and the stored file. A file already gone is not an error.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let document = self.get(id).await?;

        sqlx::query("DELETE FROM uploaded_documents WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.db)
            .await?;

        match tokio::fs::remove_file(&document.storage_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Stored file for {} was already missing", id);
            }
            Err(e) => return Err(e.into()),
        }

        info!("Deleted document {} ({})", document.filename, id);
        Ok(())
    }

    /// Contents of a text-like document.
    pub async fn read_text(&self, document: &UploadedDocument) -> Result<String> {
        if !is_text_like(&document.mime_type) {
            return Err(AggregatorError::UnsupportedDocument {
                mime_type: document.mime_type.clone(),
            });
        }
        let bytes = tokio::fs::read(&document.storage_path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn row_to_document(row: &SqliteRow) -> Result<UploadedDocument> {
    let size_bytes: i64 = row.try_get("size_bytes")?;
    let status: String = row.try_get("status")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(UploadedDocument {
        id: uuid_column(row, "id")?,
        filename: row.try_get("filename")?,
        storage_path: row.try_get("storage_path")?,
        size_bytes: u64::try_from(size_bytes).unwrap_or_default(),
        mime_type: row.try_get("mime_type")?,
        status: status.parse().map_err(AggregatorError::Parse)?,
        created_at,
    })
}
