//! # Client Repository
//!
//! Database operations for clients.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use stockroom_core::{Client, ClientFilter, ClientPatch, NewClient, Page};
use tracing::debug;

use super::{like_pattern, LIKE_ESCAPE};
use crate::error::{DbError, DbResult};

const CLIENT_COLUMNS: &str = "id, name, phone, registration_date";

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Registers a client. `registration_date` is today (UTC).
    pub async fn create(&self, client: &NewClient) -> DbResult<Client> {
        client
            .validate()
            .map_err(|e| DbError::invalid("Client", e))?;

        let today = Utc::now().date_naive();
        debug!(name = %client.name, "Creating client");

        let created: Client = sqlx::query_as(&format!(
            "INSERT INTO clients (name, phone, registration_date) VALUES (?1, ?2, ?3) \
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(client.name.trim())
        .bind(client.phone.trim())
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Searches clients by name and phone substrings, ordered by id.
    pub async fn find(&self, filter: &ClientFilter, page: Page) -> DbResult<Vec<Client>> {
        debug!(?filter, limit = page.limit, offset = page.offset, "Searching clients");

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE 1 = 1"));

        if let Some(name) = filter.name() {
            qb.push(" AND name LIKE ")
                .push_bind(like_pattern(name))
                .push(LIKE_ESCAPE);
        }
        if let Some(phone) = filter.phone() {
            qb.push(" AND phone LIKE ")
                .push_bind(like_pattern(phone))
                .push(LIKE_ESCAPE);
        }
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        let clients = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(clients)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Client>> {
        let client =
            sqlx::query_as(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(client)
    }

    /// Applies a partial update and returns the stored result.
    ///
    /// ## Errors
    /// - `Invalid` - empty patch, or a blank name
    /// - `NotFound` - no client with `id`
    pub async fn update(&self, id: i64, patch: &ClientPatch) -> DbResult<Client> {
        patch.validate().map_err(|e| DbError::invalid("Client", e))?;

        debug!(id, "Updating client");

        let updated: Option<Client> = sqlx::query_as(&format!(
            "UPDATE clients SET name = COALESCE(?2, name), phone = COALESCE(?3, phone) \
             WHERE id = ?1 RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.phone.as_deref().map(str::trim))
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("Client", id))
    }

    /// Deletes a client. Fails with a foreign key violation while the client
    /// has sales.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting client");

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        Ok(())
    }
}
