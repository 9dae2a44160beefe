//! Repository for the `providers` table.

use sqlx::PgPool;
use vmshift_core::types::DbId;

use crate::models::provider::Provider;
use crate::models::status::ProviderKind;

/// Column list for `providers` queries.
const COLUMNS: &str = "id, name, kind_id, api_url, username, secret, verify_tls, created_at";

/// CRUD operations for registered providers.
pub struct ProviderRepo;

impl ProviderRepo {
    /// Register a new provider. The caller has already resolved the wire
    /// kind name to a [`ProviderKind`].
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        name: &str,
        kind: ProviderKind,
        api_url: &str,
        username: Option<&str>,
        secret: Option<&str>,
        verify_tls: bool,
    ) -> Result<Provider, sqlx::Error> {
        let query = format!(
            "INSERT INTO providers (name, kind_id, api_url, username, secret, verify_tls) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Provider>(&query)
            .bind(name)
            .bind(kind.id())
            .bind(api_url)
            .bind(username)
            .bind(secret)
            .bind(verify_tls)
            .fetch_one(pool)
            .await
    }

    /// Find a provider by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Provider>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM providers WHERE id = $1");
        sqlx::query_as::<_, Provider>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all providers, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Provider>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM providers ORDER BY id DESC");
        sqlx::query_as::<_, Provider>(&query).fetch_all(pool).await
    }

    /// Delete a provider. Returns `false` if no such row existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM providers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
