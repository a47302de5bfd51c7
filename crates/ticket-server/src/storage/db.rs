//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use ticket_types::{NewTicket, Ticket};

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    /// Open (creating if missing) a file-backed database.
    ///
    /// The schema is not touched; call [`Database::init_schema`] before use.
    pub async fn open(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        if let Some(parent) = Path::new(database_path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        tracing::info!("SQLite connection established");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` is its own database, so the pool
    /// is pinned to one connection that is never recycled.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Create the tickets table if it does not exist. Safe to run on every start.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                issue_type TEXT NOT NULL DEFAULT '',
                subcategory TEXT NOT NULL DEFAULT '',
                priority INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'open',
                owner TEXT NOT NULL DEFAULT '',
                is_incident BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .context("Failed to create tickets table")?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let result = sqlx::query(
            r#"
            INSERT INTO tickets (subject, description, issue_type, subcategory,
                                 priority, status, owner, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&ticket.subject)
        .bind(&ticket.description)
        .bind(&ticket.issue_type)
        .bind(&ticket.subcategory)
        .bind(ticket.priority)
        .bind(&ticket.status)
        .bind(&ticket.owner)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&*self.pool)
        .await
        .context("Failed to insert ticket")?;

        Ok(ticket.with_id(result.last_insert_rowid()))
    }

    pub async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        let row: Option<TicketRow> = sqlx::query_as(
            r#"
            SELECT id, subject, description, issue_type, subcategory,
                   priority, status, owner, created_at, updated_at
            FROM tickets WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .with_context(|| format!("Failed to load ticket {}", id))?;

        Ok(row.map(|r| r.into()))
    }

    pub async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            r#"
            SELECT id, subject, description, issue_type, subcategory,
                   priority, status, owner, created_at, updated_at
            FROM tickets
            ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .context("Failed to list tickets")?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Exact, case-sensitive match on `owner`
    pub async fn list_tickets_by_owner(&self, owner: &str) -> Result<Vec<Ticket>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            r#"
            SELECT id, subject, description, issue_type, subcategory,
                   priority, status, owner, created_at, updated_at
            FROM tickets WHERE owner = ?1
            ORDER BY id
            "#,
        )
        .bind(owner)
        .fetch_all(&*self.pool)
        .await
        .with_context(|| format!("Failed to list tickets for owner {}", owner))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Write back every mutable column. Returns false if the id does not exist.
    pub async fn save_ticket(&self, ticket: &Ticket) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET subject = ?1, description = ?2, issue_type = ?3, subcategory = ?4,
                priority = ?5, status = ?6, owner = ?7, updated_at = ?8
            WHERE id = ?9
            "#,
        )
        .bind(&ticket.subject)
        .bind(&ticket.description)
        .bind(&ticket.issue_type)
        .bind(&ticket.subcategory)
        .bind(ticket.priority)
        .bind(&ticket.status)
        .bind(&ticket.owner)
        .bind(ticket.updated_at)
        .bind(ticket.id)
        .execute(&*self.pool)
        .await
        .with_context(|| format!("Failed to save ticket {}", ticket.id))?;

        Ok(result.rows_affected() > 0)
    }
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i64,
    subject: String,
    description: String,
    issue_type: String,
    subcategory: String,
    priority: i64,
    status: String,
    owner: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TicketRow> for Ticket {
    fn from(r: TicketRow) -> Self {
        Ticket {
            id: r.id,
            subject: r.subject,
            description: r.description,
            issue_type: r.issue_type,
            subcategory: r.subcategory,
            priority: r.priority,
            status: r.status,
            owner: r.owner,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
