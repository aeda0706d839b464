use crate::database::uuid_column;
use crate::types::{
    AggregatorError, Result, SavedSearch, SearchOptions, SearchResult, SourceSelection,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

/// Saved-search snapshots in SQLite.
pub struct SearchStore {
    db: SqlitePool,
}

impl SearchStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn setup_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS saved_searches (
                id TEXT PRIMARY KEY,
                query TEXT NOT NULL,
                sources TEXT NOT NULL,
                max_results INTEGER NOT NULL,
                results TEXT NOT NULL,
                synthesis TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Persist a snapshot of a finished search.
    pub async fn save_search(
        &self,
        options: &SearchOptions,
        results: &[SearchResult],
        synthesis: Option<&str>,
    ) -> Result<SavedSearch> {
        let saved = SavedSearch {
            id: Uuid::new_v4(),
            query: options.query.trim().to_string(),
            sources: options.sources,
            max_results: options.max_results,
            results: results.to_vec(),
            synthesis: synthesis.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO saved_searches (id, query, sources, max_results, results, synthesis, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(saved.id.to_string())
        .bind(&saved.query)
        .bind(serde_json::to_string(&saved.sources)?)
        .bind(saved.max_results as i64)
        .bind(serde_json::to_string(&saved.results)?)
        .bind(saved.synthesis.as_deref())
        .bind(saved.created_at)
        .execute(&self.db)
        .await?;

        info!(
            "Saved search '{}' with {} results as {}",
            saved.query,
            saved.results.len(),
            saved.id
        );
        Ok(saved)
    }

    /// Most recent first.
    pub async fn list_searches(&self, limit: u32) -> Result<Vec<SavedSearch>> {
        let rows = sqlx::query(
            "SELECT * FROM saved_searches ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(row_to_saved_search).collect()
    }

    pub async fn get_search(&self, id: Uuid) -> Result<SavedSearch> {
        let row = sqlx::query("SELECT * FROM saved_searches WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some(row) => row_to_saved_search(&row),
            None => Err(AggregatorError::SearchNotFound { id }),
        }
    }

    pub async fn delete_search(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM saved_searches WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.db)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AggregatorError::SearchNotFound { id });
        }
        debug!("Deleted saved search {}", id);
        Ok(())
    }
}

fn row_to_saved_search(row: &SqliteRow) -> Result<SavedSearch> {
    let sources: String = row.try_get("sources")?;
    let results: String = row.try_get("results")?;
    let max_results: i64 = row.try_get("max_results")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(SavedSearch {
        id: uuid_column(row, "id")?,
        query: row.try_get("query")?,
        sources: serde_json::from_str::<SourceSelection>(&sources)?,
        max_results: usize::try_from(max_results).unwrap_or_default(),
        results: serde_json::from_str(&results)?,
        synthesis: row.try_get("synthesis")?,
        created_at,
    })
}
