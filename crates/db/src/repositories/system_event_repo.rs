//! Repository for the `system_events` table.

use sqlx::PgPool;

use crate::models::system_event::SystemEvent;

/// Column list for `system_events` queries.
const COLUMNS: &str = "id, level, component, message, created_at";

/// Default page size for the operator event trail.
const DEFAULT_LIMIT: i64 = 100;

/// Write/read operations for the operator-facing event trail.
pub struct SystemEventRepo;

impl SystemEventRepo {
    /// Persist one event row.
    pub async fn record(
        pool: &PgPool,
        level: &str,
        component: &str,
        message: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO system_events (level, component, message) VALUES ($1, $2, $3)")
            .bind(level)
            .bind(component)
            .bind(message)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// List the most recent events, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: Option<i64>,
    ) -> Result<Vec<SystemEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM system_events \
             ORDER BY id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, SystemEvent>(&query)
            .bind(limit.unwrap_or(DEFAULT_LIMIT))
            .fetch_all(pool)
            .await
    }
}
