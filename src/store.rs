use crate::boundaries::BoundaryLayer;
use crate::error::Result;
use crate::types::{GeocodeResult, OrdinanceRecord};
use rusqlite::{params, Connection};
use std::path::Path;
use wkt::ToWkt;

/// Scoped handle over the durable incremental store.
///
/// Opened once at pipeline start, passed explicitly, and released when
/// dropped; one process per store, concurrent runs are the caller's problem.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (and initialize if absent) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory store, for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        init(&conn)?;
        Ok(Self { conn })
    }

    /// Merge ordinance rows into the store: existing record numbers are
    /// overwritten, new ones inserted, nothing deleted.
    pub fn upsert_ordinances(&self, records: &[OrdinanceRecord]) -> Result<()> {
        let mut stmt = self.conn.prepare(
            r#"
            INSERT INTO ordinances (
              record_number, matter_id, status, sub_status, introduction_date,
              final_action_date, title, record_create_date, matter_category,
              last_publication_date, address
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(record_number) DO UPDATE SET
              matter_id=excluded.matter_id,
              status=excluded.status,
              sub_status=excluded.sub_status,
              introduction_date=excluded.introduction_date,
              final_action_date=excluded.final_action_date,
              title=excluded.title,
              record_create_date=excluded.record_create_date,
              matter_category=excluded.matter_category,
              last_publication_date=excluded.last_publication_date,
              address=excluded.address
            "#,
        )?;
        for record in records {
            stmt.execute(params![
                record.record_number,
                record.matter_id,
                record.status,
                record.sub_status,
                record.introduction_date,
                record.final_action_date,
                record.title,
                record.record_create_date,
                record.matter_category,
                record.last_publication_date,
                record.address,
            ])?;
        }
        Ok(())
    }

    /// Merge geocode attempts into the store; re-geocoding overwrites.
    pub fn upsert_geocodes(&self, results: &[GeocodeResult]) -> Result<()> {
        let mut stmt = self.conn.prepare(
            r#"
            INSERT INTO geocodes (record_number, matched_address, coordinates)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(record_number) DO UPDATE SET
              matched_address=excluded.matched_address,
              coordinates=excluded.coordinates
            "#,
        )?;
        for result in results {
            stmt.execute(params![
                result.record_number,
                result.matched_address,
                result.coordinates,
            ])?;
        }
        Ok(())
    }

    /// Maximum `lastPublicationDate` across stored ordinances, or `None` on a
    /// fresh store. ISO-8601 UTC timestamps compare correctly as text.
    pub fn last_watermark(&self) -> Result<Option<String>> {
        let max: Option<String> = self.conn.query_row(
            "SELECT MAX(last_publication_date) FROM ordinances
             WHERE last_publication_date <> ''",
            [],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    /// All stored ordinance rows, ordered by introduction date.
    pub fn all_ordinances(&self) -> Result<Vec<OrdinanceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT record_number, matter_id, status, sub_status, introduction_date,
                    final_action_date, title, record_create_date, matter_category,
                    last_publication_date, address
             FROM ordinances ORDER BY introduction_date, record_number",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(OrdinanceRecord {
                record_number: row.get(0)?,
                matter_id: row.get(1)?,
                status: row.get(2)?,
                sub_status: row.get(3)?,
                introduction_date: row.get(4)?,
                final_action_date: row.get(5)?,
                title: row.get(6)?,
                record_create_date: row.get(7)?,
                matter_category: row.get(8)?,
                last_publication_date: row.get(9)?,
                address: row.get(10)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// All stored geocode attempts.
    pub fn all_geocodes(&self) -> Result<Vec<GeocodeResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT record_number, matched_address, coordinates
             FROM geocodes ORDER BY record_number",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(GeocodeResult {
                record_number: row.get(0)?,
                matched_address: row.get(1)?,
                coordinates: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Persist the reference boundary layers if they are not stored yet.
    ///
    /// Static reference data, not observational: create-if-absent, never
    /// upserted or altered by later runs.
    pub fn ensure_reference_layers(
        &self,
        communities: &BoundaryLayer,
        wards: &BoundaryLayer,
    ) -> Result<()> {
        self.ensure_layer("communities", communities)?;
        self.ensure_layer("wards", wards)?;
        Ok(())
    }

    /// Names stored in a reference layer table ("communities" or "wards").
    pub fn reference_layer_names(&self, table: &str) -> Result<Vec<String>> {
        let table = reference_table(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT name FROM {table} ORDER BY name"))?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn ensure_layer(&self, table: &str, layer: &BoundaryLayer) -> Result<()> {
        let table = reference_table(table)?;
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        if count > 0 {
            return Ok(());
        }
        let mut stmt = self
            .conn
            .prepare(&format!("INSERT INTO {table} (name, geometry) VALUES (?1, ?2)"))?;
        for polygon in layer.iter() {
            stmt.execute(params![polygon.name, polygon.geometry.wkt_string()])?;
        }
        Ok(())
    }
}

/// Reference tables hold static data and are addressed by a fixed name set;
/// anything else is a caller bug surfaced as a config error.
fn reference_table(table: &str) -> Result<&str> {
    match table {
        "communities" | "wards" => Ok(table),
        other => Err(crate::error::Error::Config(format!(
            "unknown reference layer table {other:?}"
        ))),
    }
}

fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS ordinances (
          record_number TEXT PRIMARY KEY,
          matter_id TEXT NOT NULL,
          status TEXT NOT NULL,
          sub_status TEXT NOT NULL,
          introduction_date TEXT NOT NULL,
          final_action_date TEXT,
          title TEXT NOT NULL,
          record_create_date TEXT NOT NULL,
          matter_category TEXT NOT NULL,
          last_publication_date TEXT NOT NULL,
          address TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_ordinances_last_publication
          ON ordinances(last_publication_date);

        CREATE TABLE IF NOT EXISTS geocodes (
          record_number TEXT PRIMARY KEY,
          matched_address TEXT,
          coordinates TEXT
        );

        CREATE TABLE IF NOT EXISTS communities (
          name TEXT PRIMARY KEY,
          geometry TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS wards (
          name TEXT PRIMARY KEY,
          geometry TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}
