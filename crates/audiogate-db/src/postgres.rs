//! PostgreSQL implementation of the intent store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use audiogate_core::{UploadIntent, UploadStatus};

use crate::store::{ConditionalUpdate, UploadIntentChanges, UploadIntentStore};

const INTENT_COLUMNS: &str = r#"
    id, status::text AS status, bucket, object_key, content_type, file_name,
    file_size_bytes, upload_url_expires_at, processing_message_id,
    error_detail, created_at, updated_at
"#;

/// Store for upload-intent records backed by the `upload_intents` table.
#[derive(Clone)]
pub struct PgUploadIntentStore {
    pool: PgPool,
}

impl PgUploadIntentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape with the status as text; converted into the core model.
#[derive(sqlx::FromRow)]
struct UploadIntentRow {
    id: Uuid,
    status: String,
    bucket: String,
    object_key: String,
    content_type: String,
    file_name: String,
    file_size_bytes: Option<i64>,
    upload_url_expires_at: DateTime<Utc>,
    processing_message_id: Option<String>,
    error_detail: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UploadIntentRow> for UploadIntent {
    type Error = anyhow::Error;

    fn try_from(row: UploadIntentRow) -> Result<Self> {
        Ok(UploadIntent {
            id: row.id,
            status: row.status.parse()?,
            bucket: row.bucket,
            object_key: row.object_key,
            content_type: row.content_type,
            file_name: row.file_name,
            file_size_bytes: row.file_size_bytes,
            upload_url_expires_at: row.upload_url_expires_at,
            processing_message_id: row.processing_message_id,
            error_detail: row.error_detail,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UploadIntentStore for PgUploadIntentStore {
    #[tracing::instrument(skip(self, intent), fields(upload_id = %intent.id))]
    async fn create(&self, intent: &UploadIntent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO upload_intents (
                id, status, bucket, object_key, content_type, file_name,
                file_size_bytes, upload_url_expires_at, processing_message_id,
                error_detail, created_at, updated_at
            )
            VALUES ($1, $2::upload_status, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(intent.id)
        .bind(intent.status.as_str())
        .bind(&intent.bucket)
        .bind(&intent.object_key)
        .bind(&intent.content_type)
        .bind(&intent.file_name)
        .bind(intent.file_size_bytes)
        .bind(intent.upload_url_expires_at)
        .bind(&intent.processing_message_id)
        .bind(&intent.error_detail)
        .bind(intent.created_at)
        .bind(intent.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert upload intent")?;

        tracing::debug!(upload_id = %intent.id, "Upload intent created");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<UploadIntent>> {
        let row = sqlx::query_as::<_, UploadIntentRow>(&format!(
            "SELECT {} FROM upload_intents WHERE id = $1",
            INTENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch upload intent")?;

        row.map(UploadIntent::try_from).transpose()
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update(
        &self,
        id: Uuid,
        changes: UploadIntentChanges,
    ) -> Result<Option<UploadIntent>> {
        let row = sqlx::query_as::<_, UploadIntentRow>(&format!(
            r#"
            UPDATE upload_intents
            SET status = COALESCE($2::upload_status, status),
                file_size_bytes = COALESCE($3, file_size_bytes),
                processing_message_id = COALESCE($4, processing_message_id),
                error_detail = COALESCE($5, error_detail),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INTENT_COLUMNS
        ))
        .bind(id)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.file_size_bytes)
        .bind(changes.processing_message_id)
        .bind(changes.error_detail)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update upload intent")?;

        row.map(UploadIntent::try_from).transpose()
    }

    #[tracing::instrument(skip(self, changes), fields(expected = %expected))]
    async fn update_if_status(
        &self,
        id: Uuid,
        expected: UploadStatus,
        changes: UploadIntentChanges,
    ) -> Result<Option<ConditionalUpdate>> {
        // Single conditional UPDATE; the WHERE clause makes the status
        // transition atomic so only one of two racing callers proceeds.
        let row = sqlx::query_as::<_, UploadIntentRow>(&format!(
            r#"
            UPDATE upload_intents
            SET status = COALESCE($3::upload_status, status),
                file_size_bytes = COALESCE($4, file_size_bytes),
                processing_message_id = COALESCE($5, processing_message_id),
                error_detail = COALESCE($6, error_detail),
                updated_at = NOW()
            WHERE id = $1 AND status = $2::upload_status
            RETURNING {}
            "#,
            INTENT_COLUMNS
        ))
        .bind(id)
        .bind(expected.as_str())
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.file_size_bytes)
        .bind(changes.processing_message_id)
        .bind(changes.error_detail)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to conditionally update upload intent")?;

        if let Some(row) = row {
            return Ok(Some(ConditionalUpdate::Updated(row.try_into()?)));
        }

        // Precondition failed or record missing; read back to tell which.
        match self.get(id).await? {
            Some(current) => {
                tracing::debug!(
                    upload_id = %id,
                    expected = %expected,
                    actual = %current.status,
                    "Conditional update lost the race"
                );
                Ok(Some(ConditionalUpdate::Stale(current)))
            }
            None => Ok(None),
        }
    }
}
