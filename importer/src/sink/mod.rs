//! Persistence of accepted customers.
//!
//! The pipeline only knows the [`RecordSink`] trait. [`SqliteSink`] stores
//! rows in a local SQLite database.

use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::SinkResult;
use crate::models::Customer;

/// Accepts a batch of validated customers.
pub trait RecordSink {
    /// Store every customer of the batch. Returns the number stored.
    fn insert_batch(&mut self, customers: &[Customer]) -> SinkResult<usize>;
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    surname TEXT NOT NULL,
    email TEXT NOT NULL,
    age INTEGER NOT NULL,
    location TEXT NOT NULL,
    country_code TEXT
)";

const INSERT: &str = "INSERT INTO customers (name, surname, email, age, location, country_code)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// SQLite-backed sink writing to the `customers` table.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> SinkResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// Throwaway database, mostly for tests and dry runs.
    pub fn in_memory() -> SinkResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> SinkResult<Self> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self { conn })
    }

    /// Number of stored customers.
    pub fn count(&self) -> SinkResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All stored customers in insertion order.
    pub fn customers(&self) -> SinkResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, surname, email, age, location, country_code FROM customers ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Customer {
                name: row.get(0)?,
                surname: row.get(1)?,
                email: row.get(2)?,
                age: row.get(3)?,
                location: row.get(4)?,
                country_code: row.get(5)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl RecordSink for SqliteSink {
    fn insert_batch(&mut self, customers: &[Customer]) -> SinkResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT)?;
            for c in customers {
                stmt.execute(params![
                    c.name,
                    c.surname.as_deref().unwrap_or_default(),
                    c.email,
                    c.age,
                    c.location,
                    c.country_code,
                ])?;
            }
        }
        tx.commit()?;
        Ok(customers.len())
    }
}
