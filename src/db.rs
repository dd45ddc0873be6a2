use anyhow::{Context, Result};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteRow},
};
use std::{path::Path, str::FromStr};

use crate::{
    error::{AppError, AppResult},
    listing::{Listing, ListingDraft, Status},
};

/// Columns added after the first release of the `ships` table.
/// Each is added on startup only when missing.
const LATE_COLUMNS: &[(&str, &str)] = &[
    ("length", "TEXT NOT NULL DEFAULT ''"),
    ("type", "TEXT NOT NULL DEFAULT ''"),
    ("flag", "TEXT NOT NULL DEFAULT ''"),
    ("location", "TEXT NOT NULL DEFAULT ''"),
    ("engine", "TEXT NOT NULL DEFAULT ''"),
    ("condition", "TEXT NOT NULL DEFAULT ''"),
    ("description", "TEXT NOT NULL DEFAULT ''"),
    ("status", "TEXT NOT NULL DEFAULT 'active'"),
];

const SELECT_LISTING: &str = "SELECT id, title, price, year, image, length, \"type\", flag, \
     location, engine, condition, description, status FROM ships";

pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    let url = format!("sqlite:{}", db_path.display());
    let opts = SqliteConnectOptions::from_str(&url)
        .context("Invalid DB path")?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(opts)
        .await
        .context("Failed to open SQLite database")?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create or upgrade the `ships` table. Safe to run any number of times.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    // AUTOINCREMENT keeps ids of purged rows from ever being handed out again.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ships (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT    NOT NULL,
            price       TEXT    NOT NULL,
            year        TEXT    NOT NULL,
            image       TEXT    NOT NULL,
            length      TEXT    NOT NULL DEFAULT '',
            \"type\"    TEXT    NOT NULL DEFAULT '',
            flag        TEXT    NOT NULL DEFAULT '',
            location    TEXT    NOT NULL DEFAULT '',
            engine      TEXT    NOT NULL DEFAULT '',
            condition   TEXT    NOT NULL DEFAULT '',
            description TEXT    NOT NULL DEFAULT '',
            status      TEXT    NOT NULL DEFAULT 'active'
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create ships table")?;

    for (column, decl) in LATE_COLUMNS {
        if ensure_column(pool, "ships", column, decl).await? {
            tracing::info!("Added column ships.{}", column);
        }
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ships_status ON ships(status)")
        .execute(pool)
        .await
        .context("Failed to create ships status index")?;

    Ok(())
}

/// Add `column` to `table` unless it already exists. Returns whether it was added.
async fn ensure_column(pool: &SqlitePool, table: &str, column: &str, decl: &str) -> Result<bool> {
    let existing: Vec<String> = sqlx::query("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to inspect table {table}"))?
        .into_iter()
        .map(|r| r.get::<String, _>("name"))
        .collect();

    if existing.iter().any(|c| c.eq_ignore_ascii_case(column)) {
        return Ok(false);
    }

    sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN \"{column}\" {decl}"))
        .execute(pool)
        .await
        .with_context(|| format!("Failed to add column {table}.{column}"))?;
    Ok(true)
}

// ── Listing store ─────────────────────────────────────────────────────────────

/// Insert a validated listing. Status is always `active`.
pub async fn create_listing(pool: &SqlitePool, draft: &ListingDraft) -> AppResult<i64> {
    let result = sqlx::query(
        "INSERT INTO ships (title, price, year, image, length, \"type\", flag, location, \
         engine, condition, description, status) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&draft.title)
    .bind(&draft.price)
    .bind(&draft.year)
    .bind(&draft.image)
    .bind(&draft.length)
    .bind(&draft.kind)
    .bind(&draft.flag)
    .bind(&draft.location)
    .bind(&draft.engine)
    .bind(&draft.condition)
    .bind(&draft.description)
    .bind(Status::Active.as_str())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Listings in `status`, newest first.
pub async fn list_listings(pool: &SqlitePool, status: Status) -> AppResult<Vec<Listing>> {
    let rows = sqlx::query(&format!("{SELECT_LISTING} WHERE status = ? ORDER BY id DESC"))
        .bind(status.as_str())
        .fetch_all(pool)
        .await?;

    let listings = rows
        .iter()
        .map(listing_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(listings)
}

pub async fn list_active(pool: &SqlitePool) -> AppResult<Vec<Listing>> {
    list_listings(pool, Status::Active).await
}

pub async fn list_trash(pool: &SqlitePool) -> AppResult<Vec<Listing>> {
    list_listings(pool, Status::Trash).await
}

/// Fetch a listing in any status.
pub async fn get_listing(pool: &SqlitePool, id: i64) -> AppResult<Listing> {
    let row = sqlx::query(&format!("{SELECT_LISTING} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(listing_from_row(&row)?)
}

/// Move a listing to `status`. Returns `false` when the id is unknown or the
/// listing is already in that status.
pub async fn set_status(pool: &SqlitePool, id: i64, status: Status) -> AppResult<bool> {
    let result = sqlx::query("UPDATE ships SET status = ? WHERE id = ? AND status != ?")
        .bind(status.as_str())
        .bind(id)
        .bind(status.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn trash_listing(pool: &SqlitePool, id: i64) -> AppResult<bool> {
    set_status(pool, id, Status::Trash).await
}

pub async fn restore_listing(pool: &SqlitePool, id: i64) -> AppResult<bool> {
    set_status(pool, id, Status::Active).await
}

/// Permanently remove a listing, whatever its status.
pub async fn purge_listing(pool: &SqlitePool, id: i64) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM ships WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn listing_from_row(row: &SqliteRow) -> Result<Listing, sqlx::Error> {
    // Rows written by the first schema may hold NULLs in the text columns.
    let text = |col: &str| -> Result<String, sqlx::Error> {
        Ok(row.try_get::<Option<String>, _>(col)?.unwrap_or_default())
    };

    let status = row
        .try_get::<String, _>("status")?
        .parse::<Status>()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(e),
        })?;

    Ok(Listing {
        id: row.try_get("id")?,
        title: text("title")?,
        price: text("price")?,
        year: text("year")?,
        image: text("image")?,
        length: text("length")?,
        kind: text("type")?,
        flag: text("flag")?,
        location: text("location")?,
        engine: text("engine")?,
        condition: text("condition")?,
        description: text("description")?,
        status,
    })
}

/// Single-connection in-memory database with the schema applied.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}
