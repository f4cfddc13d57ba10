use super::types::TableSnapshot;
use crate::config::DirectParams;
use crate::error::{ExportError, ExportResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::{debug, error, info};
use std::time::Duration;
use tokio_postgres::types::Type;
use tokio_postgres::{Client, NoTls, Row};
use uuid::Uuid;

// Defensive bound; the original behavior does not rely on a timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a complete snapshot of a table over a direct PostgreSQL
/// connection.
///
/// Opens one connection, prepares and executes a single unfiltered
/// `SELECT *` against the named table, takes the column header from the
/// statement metadata, and renders every value to text. The connection is
/// exclusively owned by this call and released when the client is
/// dropped, on success and on every failure path.
///
/// # Arguments
///
/// * `params` - Direct connection parameters.
/// * `table` - Name of the table to snapshot.
///
/// # Returns
///
/// * `Ok(TableSnapshot)` - Header and all rows at fetch time.
/// * `Err(ExportError::Connection)` - The database was unreachable or the
///   credentials were rejected.
/// * `Err(ExportError::Query)` - The table does not exist, the query
///   failed server-side, or a column could not be rendered.
pub async fn fetch_postgres_snapshot(
    params: &DirectParams,
    table: &str,
) -> ExportResult<TableSnapshot> {
    let client = connect(params).await?;

    let sql = build_select(table);
    debug!("Executing: {}", sql);
    let statement = client.prepare(&sql).await.map_err(|e| {
        ExportError::query(format!("failed to prepare snapshot query for {}", table), e)
    })?;

    // The header comes from the statement metadata, so it survives an
    // empty table.
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();

    let rows = client
        .query(&statement, &[])
        .await
        .map_err(|e| ExportError::query(format!("snapshot query failed for {}", table), e))?;
    info!("Fetched {} row(s) from {}", rows.len(), table);

    let mut rendered = Vec::with_capacity(rows.len());
    for row in &rows {
        rendered.push(render_row(row)?);
    }

    Ok(TableSnapshot {
        table: table.to_string(),
        columns,
        rows: rendered,
    })
}

/// Verifies that the direct connection parameters reach the database.
///
/// Runs a `SELECT current_user, current_database()` probe and logs the
/// result. No file is touched.
pub async fn check_postgres_connection(params: &DirectParams) -> ExportResult<()> {
    let client = connect(params).await?;
    let row = client
        .query_one("SELECT current_user, current_database()", &[])
        .await
        .map_err(|e| ExportError::query("connection probe query failed", e))?;
    let user: String = row
        .try_get(0)
        .map_err(|e| ExportError::query("failed to decode probe result", e))?;
    let database: String = row
        .try_get(1)
        .map_err(|e| ExportError::query("failed to decode probe result", e))?;
    info!("Connected as {} to database {}", user, database);
    Ok(())
}

/// Opens one connection with a bounded connect timeout and spawns the
/// background task driving it. The task ends when the client is dropped.
async fn connect(params: &DirectParams) -> ExportResult<Client> {
    let mut config = tokio_postgres::Config::new();
    config
        .host(&params.host)
        .port(params.port)
        .dbname(&params.dbname)
        .user(&params.user)
        .password(&params.password)
        .connect_timeout(CONNECT_TIMEOUT);

    let (client, connection) = config.connect(NoTls).await.map_err(|e| {
        ExportError::connection(
            format!(
                "failed to connect to {}:{}/{}",
                params.host, params.port, params.dbname
            ),
            e,
        )
    })?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("Database connection error: {}", e);
        }
    });

    Ok(client)
}

/// Builds the single unfiltered read issued per export.
fn build_select(table: &str) -> String {
    format!("SELECT * FROM {}", quote_ident(table))
}

/// Quotes an identifier for interpolation into the statement text,
/// doubling any embedded double quotes.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Renders every column of a row to text, aligned to the statement's
/// column order.
fn render_row(row: &Row) -> ExportResult<Vec<String>> {
    let mut values = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        values.push(render_value(row, idx, column.type_(), column.name())?);
    }
    Ok(values)
}

/// Renders one value to text by its PostgreSQL type.
///
/// NULL renders as an empty string. Types outside the rendered families
/// are a query error naming the column and type rather than silently
/// mangled output.
fn render_value(row: &Row, idx: usize, ty: &Type, column: &str) -> ExportResult<String> {
    let value = match ty.name() {
        "bool" => decode(row.try_get::<_, Option<bool>>(idx), column, ty)?,
        "int2" => decode(row.try_get::<_, Option<i16>>(idx), column, ty)?,
        "int4" => decode(row.try_get::<_, Option<i32>>(idx), column, ty)?,
        "int8" => decode(row.try_get::<_, Option<i64>>(idx), column, ty)?,
        "float4" => decode(row.try_get::<_, Option<f32>>(idx), column, ty)?,
        "float8" => decode(row.try_get::<_, Option<f64>>(idx), column, ty)?,
        "text" | "varchar" | "bpchar" | "name" | "citext" => {
            decode(row.try_get::<_, Option<String>>(idx), column, ty)?
        }
        "uuid" => decode(row.try_get::<_, Option<Uuid>>(idx), column, ty)?,
        "timestamp" => decode(row.try_get::<_, Option<NaiveDateTime>>(idx), column, ty)?,
        "timestamptz" => decode(row.try_get::<_, Option<DateTime<Utc>>>(idx), column, ty)?,
        "date" => decode(row.try_get::<_, Option<NaiveDate>>(idx), column, ty)?,
        "time" => decode(row.try_get::<_, Option<NaiveTime>>(idx), column, ty)?,
        "json" | "jsonb" => decode(row.try_get::<_, Option<serde_json::Value>>(idx), column, ty)?,
        other => {
            return Err(ExportError::query_message(format!(
                "column {} has unsupported type {}",
                column, other
            )))
        }
    };
    Ok(value.unwrap_or_default())
}

/// Maps a decoded optional value to its text form, attaching the column
/// name and type to any driver error.
fn decode<T: ToString>(
    result: Result<Option<T>, tokio_postgres::Error>,
    column: &str,
    ty: &Type,
) -> ExportResult<Option<String>> {
    result
        .map(|value| value.map(|v| v.to_string()))
        .map_err(|e| {
            ExportError::query(
                format!("failed to decode column {} ({})", column, ty.name()),
                e,
            )
        })
}
