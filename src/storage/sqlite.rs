//! SQLite storage backend.
//!
//! Persists fragment metadata and payloads in two tables keyed by
//! (owner_id, id), behind an r2d2 connection pool. Calls are issued
//! synchronously from the async trait methods; SQLite operations here are
//! short single-row statements.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::{Error, Result};
use crate::ids::{FragmentId, OwnerId};
use crate::model::Fragment;

use super::{DataStore, MetadataStore};

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS fragments (
    owner_id TEXT NOT NULL,
    id       TEXT NOT NULL,
    type     TEXT NOT NULL,
    size     INTEGER NOT NULL,
    created  TEXT NOT NULL,
    updated  TEXT NOT NULL,
    version  INTEGER NOT NULL,
    PRIMARY KEY (owner_id, id)
);
CREATE TABLE IF NOT EXISTS fragment_data (
    owner_id TEXT NOT NULL,
    id       TEXT NOT NULL,
    data     BLOB NOT NULL,
    PRIMARY KEY (owner_id, id)
);
";

/// Initialize a database pool backed by the given file path.
///
/// Creates the database file and schema when missing.
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::storage(format!("Failed to create connection pool: {e}")))?;

    let conn = get_conn(&pool)?;
    conn.execute_batch(SCHEMA)
        .map_err(|e| Error::storage(format!("Failed to create schema: {e}")))?;

    Ok(pool)
}

/// Initialize an in-memory database pool for testing.
///
/// The database is lost when the pool is dropped.
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = Pool::builder()
        // One connection: each connection to :memory: is its own database.
        .max_size(1)
        .build(manager)
        .map_err(|e| Error::storage(format!("Failed to create in-memory pool: {e}")))?;

    let conn = get_conn(&pool)?;
    conn.execute_batch(SCHEMA)
        .map_err(|e| Error::storage(format!("Failed to create schema: {e}")))?;

    Ok(pool)
}

/// Get a connection from the pool, converting the r2d2 error.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::storage(format!("Failed to get connection from pool: {e}")))
}

/// Fragment storage over a SQLite pool; serves as both metadata and data
/// store.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Raw column values of one `fragments` row.
type FragmentRow = (String, String, String, i64, String, String, i64);

fn parse_fragment_row(row: &rusqlite::Row) -> rusqlite::Result<FragmentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn fragment_from_row(row: FragmentRow) -> Result<Fragment> {
    let (owner_id, id, content_type, size, created, updated, version) = row;
    let id: FragmentId = id
        .parse()
        .map_err(|e| Error::storage(format!("Corrupt fragment id in database: {e}")))?;
    Fragment::from_parts(
        id,
        OwnerId::new(owner_id),
        parse_timestamp(&created)?,
        parse_timestamp(&updated)?,
        content_type,
        size as u64,
        version as u64,
    )
    .map_err(|e| Error::storage(format!("Corrupt fragment record in database: {e}")))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::storage(format!("Corrupt timestamp in database: {e}")))
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::storage(e.to_string())
}

fn list_sync(conn: &Connection, owner: &OwnerId) -> Result<Vec<Fragment>> {
    let mut stmt = conn
        .prepare(
            "SELECT owner_id, id, type, size, created, updated, version
             FROM fragments
             WHERE owner_id = :owner_id
             ORDER BY created, id",
        )
        .map_err(db_err)?;

    let rows = stmt
        .query_map(
            rusqlite::named_params! { ":owner_id": owner.as_str() },
            parse_fragment_row,
        )
        .map_err(db_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_err)?;

    rows.into_iter().map(fragment_from_row).collect()
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Fragment>> {
        let conn = get_conn(&self.pool)?;
        list_sync(&conn, owner)
    }

    async fn read(&self, owner: &OwnerId, id: FragmentId) -> Result<Option<Fragment>> {
        let conn = get_conn(&self.pool)?;
        let result = conn.query_row(
            "SELECT owner_id, id, type, size, created, updated, version
             FROM fragments
             WHERE owner_id = :owner_id AND id = :id",
            rusqlite::named_params! {
                ":owner_id": owner.as_str(),
                ":id": id.to_string(),
            },
            parse_fragment_row,
        );

        match result {
            Ok(row) => Ok(Some(fragment_from_row(row)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn write(&self, fragment: &Fragment) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO fragments (owner_id, id, type, size, created, updated, version)
             VALUES (:owner_id, :id, :type, :size, :created, :updated, :version)
             ON CONFLICT (owner_id, id) DO UPDATE SET
                 type = excluded.type,
                 size = excluded.size,
                 updated = excluded.updated,
                 version = excluded.version",
            rusqlite::named_params! {
                ":owner_id": fragment.owner_id().as_str(),
                ":id": fragment.id().to_string(),
                ":type": fragment.type_str(),
                ":size": fragment.size() as i64,
                ":created": fragment.created().to_rfc3339(),
                ":updated": fragment.updated().to_rfc3339(),
                ":version": fragment.version() as i64,
            },
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, owner: &OwnerId, id: FragmentId) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let affected = conn
            .execute(
                "DELETE FROM fragments WHERE owner_id = :owner_id AND id = :id",
                rusqlite::named_params! {
                    ":owner_id": owner.as_str(),
                    ":id": id.to_string(),
                },
            )
            .map_err(db_err)?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn read(&self, owner: &OwnerId, id: FragmentId) -> Result<Option<Bytes>> {
        let conn = get_conn(&self.pool)?;
        let result = conn.query_row(
            "SELECT data FROM fragment_data WHERE owner_id = :owner_id AND id = :id",
            rusqlite::named_params! {
                ":owner_id": owner.as_str(),
                ":id": id.to_string(),
            },
            |row| row.get::<_, Vec<u8>>(0),
        );

        match result {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn write(&self, owner: &OwnerId, id: FragmentId, data: Bytes) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO fragment_data (owner_id, id, data)
             VALUES (:owner_id, :id, :data)
             ON CONFLICT (owner_id, id) DO UPDATE SET data = excluded.data",
            rusqlite::named_params! {
                ":owner_id": owner.as_str(),
                ":id": id.to_string(),
                ":data": data.as_ref(),
            },
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, owner: &OwnerId, id: FragmentId) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let affected = conn
            .execute(
                "DELETE FROM fragment_data WHERE owner_id = :owner_id AND id = :id",
                rusqlite::named_params! {
                    ":owner_id": owner.as_str(),
                    ":id": id.to_string(),
                },
            )
            .map_err(db_err)?;
        Ok(affected > 0)
    }
}
