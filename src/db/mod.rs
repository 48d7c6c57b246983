use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use uuid::Uuid;

use crate::error::{FlowError, Result};
use crate::models::{self, Flow, FlowCreate, FlowUpdate};

const FLOW_COLUMNS: &str = "id, name, description, data, created_at, updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(Database { conn })
    }

    /// Open a private in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Database { conn })
    }

    /// Create the schema tables if they don't exist, then run any pending version-gated migrations.
    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS flows (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT,
                data        TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_flows_created ON flows(created_at);
            ",
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO config (key, value) VALUES ('schema_version', '0')",
            [],
        )?;

        run_migrations(&self.conn)
    }

    // -- Config --

    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    // -- Flows --

    pub fn insert_flow(&self, input: FlowCreate) -> Result<Flow> {
        input.validate()?;
        let flow = Flow::from_create(input);
        insert_row(&self.conn, &flow)?;
        tracing::info!(id = %flow.id, name = %flow.name, "flow created");
        Ok(flow)
    }

    /// Insert several flows in one transaction. Either every flow is stored
    /// or none is.
    pub fn insert_flows(&self, inputs: Vec<FlowCreate>) -> Result<Vec<Flow>> {
        models::validate_all(&inputs)?;

        let tx = self.conn.unchecked_transaction()?;
        let mut flows = Vec::with_capacity(inputs.len());
        for input in inputs {
            let flow = Flow::from_create(input);
            insert_row(&tx, &flow)?;
            flows.push(flow);
        }
        tx.commit()?;

        tracing::info!(count = flows.len(), "flows created");
        Ok(flows)
    }

    pub fn get_flow(&self, id: Uuid) -> Result<Option<Flow>> {
        let sql = format!("SELECT {FLOW_COLUMNS} FROM flows WHERE id = ?1");
        let flow = self
            .conn
            .query_row(&sql, params![id.to_string()], row_to_flow)
            .optional()?;
        Ok(flow)
    }

    /// All flows, oldest first.
    pub fn list_flows(&self) -> Result<Vec<Flow>> {
        let sql = format!("SELECT {FLOW_COLUMNS} FROM flows ORDER BY created_at ASC, rowid ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_flow)?;

        let mut flows = Vec::new();
        for row in rows {
            flows.push(row?);
        }
        Ok(flows)
    }

    pub fn count_flows(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM flows", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Apply the fields present in `update`, bump `updated_at`, and return the
    /// stored result. An empty update only bumps the timestamp.
    pub fn update_flow(&self, id: Uuid, update: &FlowUpdate) -> Result<Flow> {
        update.validate()?;

        let mut sets = Vec::new();
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();
        let mut idx = 1;

        if let Some(Some(name)) = &update.name {
            sets.push(format!("name = ?{idx}"));
            param_values.push(Box::new(name.clone()));
            idx += 1;
        }
        if let Some(description) = &update.description {
            sets.push(format!("description = ?{idx}"));
            param_values.push(Box::new(description.clone()));
            idx += 1;
        }
        if let Some(data) = &update.data {
            let text = data.as_ref().map(serde_json::to_string).transpose()?;
            sets.push(format!("data = ?{idx}"));
            param_values.push(Box::new(text));
            idx += 1;
        }

        sets.push(format!("updated_at = ?{idx}"));
        param_values.push(Box::new(Utc::now().to_rfc3339()));
        idx += 1;

        let sql = format!("UPDATE flows SET {} WHERE id = ?{idx}", sets.join(", "));
        param_values.push(Box::new(id.to_string()));

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let rows_changed = self.conn.execute(&sql, params_ref.as_slice())?;
        if rows_changed == 0 {
            return Err(FlowError::NotFound(id));
        }

        tracing::info!(%id, "flow updated");
        self.get_flow(id)?.ok_or(FlowError::NotFound(id))
    }

    pub fn delete_flow(&self, id: Uuid) -> Result<()> {
        let rows_changed = self
            .conn
            .execute("DELETE FROM flows WHERE id = ?1", params![id.to_string()])?;
        if rows_changed == 0 {
            return Err(FlowError::NotFound(id));
        }
        tracing::info!(%id, "flow deleted");
        Ok(())
    }
}

/// Read the current schema version from the config table.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let value = conn
        .query_row(
            "SELECT value FROM config WHERE key = 'schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    match value {
        Some(v) => v
            .parse::<i32>()
            .map_err(|e| FlowError::Invalid(format!("invalid schema_version value: {e}"))),
        None => Ok(0),
    }
}

/// Run all pending schema migrations in order. Version 0 is the baseline
/// created by `migrate()` and needs no further steps.
fn run_migrations(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;
    tracing::debug!(version, "schema up to date");
    Ok(())
}

fn insert_row(conn: &Connection, flow: &Flow) -> Result<()> {
    let data = flow.data.as_ref().map(serde_json::to_string).transpose()?;
    conn.execute(
        "INSERT INTO flows (id, name, description, data, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            flow.id.to_string(),
            flow.name,
            flow.description,
            data,
            flow.created_at.to_rfc3339(),
            flow.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn row_to_flow(row: &Row) -> rusqlite::Result<Flow> {
    let id_str: String = row.get(0)?;
    let data_str: Option<String> = row.get(3)?;
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| conversion_error(0, e))?;
    let data = data_str
        .map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| conversion_error(3, e))?;

    Ok(Flow {
        id,
        name: row.get(1)?,
        description: row.get(2)?,
        data,
        created_at: parse_timestamp(&created_str),
        updated_at: parse_timestamp(&updated_str),
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}
