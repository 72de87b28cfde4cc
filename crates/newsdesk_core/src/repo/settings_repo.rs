//! Filing granularity settings.
//!
//! # Responsibility
//! - Define the provider seam the filing pipeline reads granularity from.
//! - Persist the two sort flags in the `sorting_settings` table.
//!
//! # Invariants
//! - Missing keys read as `false`.

use crate::model::granularity::GranularityConfig;
use crate::repo::error::StoreResult;
use crate::repo::schema::ensure_connection_ready;
use rusqlite::{params, Connection, OptionalExtension};

const SORT_BY_MONTH_KEY: &str = "sort_by_month";
const SORT_BY_DAY_KEY: &str = "sort_by_day";

/// Source of the active granularity configuration.
pub trait ConfigProvider {
    /// Returns the configuration for the current write.
    fn granularity(&self) -> StoreResult<GranularityConfig>;
}

impl ConfigProvider for GranularityConfig {
    fn granularity(&self) -> StoreResult<GranularityConfig> {
        Ok(*self)
    }
}

/// SQLite-backed settings store.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn, "sorting_settings", &["key", "value", "updated_at"])?;
        Ok(Self { conn })
    }

    /// Loads the persisted configuration.
    pub fn load(&self) -> StoreResult<GranularityConfig> {
        Ok(GranularityConfig {
            sort_by_month: self.read_flag(SORT_BY_MONTH_KEY)?,
            sort_by_day: self.read_flag(SORT_BY_DAY_KEY)?,
        })
    }

    /// Persists both flags.
    pub fn save(&self, config: &GranularityConfig) -> StoreResult<()> {
        self.write_flag(SORT_BY_MONTH_KEY, config.sort_by_month)?;
        self.write_flag(SORT_BY_DAY_KEY, config.sort_by_day)?;
        Ok(())
    }

    fn read_flag(&self, key: &str) -> StoreResult<bool> {
        let value: Option<i64> = self
            .conn
            .query_row(
                "SELECT value FROM sorting_settings WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value == Some(1))
    }

    fn write_flag(&self, key: &str, value: bool) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO sorting_settings (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, i64::from(value)],
        )?;
        Ok(())
    }
}

impl ConfigProvider for SqliteSettingsRepository<'_> {
    fn granularity(&self) -> StoreResult<GranularityConfig> {
        self.load()
    }
}
