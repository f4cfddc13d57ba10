use super::types::TableSnapshot;
use crate::config::SupabaseParams;
use crate::error::{ExportError, ExportResult};
use log::{debug, info};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::time::Duration;

// Defensive bound; the original behavior does not rely on a timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a complete snapshot of a table through the hosted Supabase
/// (PostgREST) endpoint.
///
/// Issues a single `GET {url}/rest/v1/{table}?select=*` authenticated
/// with the service role key and converts the returned JSON record set
/// into a snapshot. The column header is the key order of the first
/// record; an empty record set carries no metadata, so its snapshot has
/// no columns.
///
/// # Arguments
///
/// * `params` - Hosted endpoint parameters.
/// * `table` - Name of the table to snapshot.
///
/// # Returns
///
/// * `Ok(TableSnapshot)` - Header and all records at fetch time.
/// * `Err(ExportError::Connection)` - The endpoint was unreachable or
///   the service role key was rejected.
/// * `Err(ExportError::Query)` - The table read was rejected or the
///   response was not a JSON record set.
///
/// # Examples
///
/// ```rust,no_run
/// use table_snapshot::config::SupabaseParams;
/// use table_snapshot::fetch::fetch_supabase_snapshot;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let params = SupabaseParams {
///         url: "https://abc.supabase.co".to_string(),
///         service_role: "service-key".to_string(),
///     };
///     let snapshot = fetch_supabase_snapshot(&params, "users").await?;
///     println!("Fetched {} record(s)", snapshot.row_count());
///     Ok(())
/// }
/// ```
pub async fn fetch_supabase_snapshot(
    params: &SupabaseParams,
    table: &str,
) -> ExportResult<TableSnapshot> {
    let url = build_rest_url(&params.url, table);
    debug!("Requesting {}", url);

    let response = rest_client()?
        .get(&url)
        .query(&[("select", "*")])
        .header("apikey", &params.service_role)
        .bearer_auth(&params.service_role)
        .send()
        .await
        .map_err(|e| ExportError::connection(format!("request to {} failed", url), e))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ExportError::connection_message(format!(
            "service role key rejected by {} ({})",
            url, status
        )));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ExportError::query_message(format!(
            "read of table {} rejected with {}: {}",
            table,
            status,
            body.trim()
        )));
    }

    let records: Vec<Map<String, Value>> = response
        .json()
        .await
        .map_err(|e| ExportError::query(format!("invalid JSON record set from {}", url), e))?;
    info!("Fetched {} record(s) from {}", records.len(), table);

    Ok(snapshot_from_records(table, &records))
}

/// Verifies that the hosted endpoint is reachable with the configured
/// service role key by probing the PostgREST root. No file is touched.
pub async fn check_supabase_connection(params: &SupabaseParams) -> ExportResult<()> {
    let url = format!("{}rest/v1/", normalize_url(&params.url));
    let response = rest_client()?
        .get(&url)
        .header("apikey", &params.service_role)
        .bearer_auth(&params.service_role)
        .send()
        .await
        .map_err(|e| ExportError::connection(format!("probe of {} failed", url), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExportError::connection_message(format!(
            "probe of {} failed with {}",
            url, status
        )));
    }
    info!("Reached PostgREST endpoint at {}", url);
    Ok(())
}

/// Builds an HTTP client with a bounded request timeout.
fn rest_client() -> ExportResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ExportError::connection("failed to build HTTP client", e))
}

/// Builds the REST endpoint of a table under the project URL.
fn build_rest_url(project_url: &str, table: &str) -> String {
    format!("{}rest/v1/{}", normalize_url(project_url), table)
}

/// Normalizes the project URL by ensuring it ends with a trailing slash.
fn normalize_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Converts a JSON record set into a snapshot.
///
/// The header is the key order of the first record (the order the
/// endpoint returned). Null renders as an empty string, strings render
/// verbatim, and nested arrays/objects render as compact JSON. A key
/// missing from a later record renders as empty.
fn snapshot_from_records(table: &str, records: &[Map<String, Value>]) -> TableSnapshot {
    let columns: Vec<String> = records
        .first()
        .map(|record| record.keys().cloned().collect())
        .unwrap_or_default();

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(column).map(render_json_value).unwrap_or_default())
                .collect()
        })
        .collect();

    TableSnapshot {
        table: table.to_string(),
        columns,
        rows,
    }
}

/// Renders one JSON value to its text form.
fn render_json_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().expect("test record must be an object").clone()
    }

    /// Tests the `normalize_url` function to ensure it correctly adds a trailing slash.
    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("https://abc.supabase.co"),
            "https://abc.supabase.co/"
        );
        assert_eq!(
            normalize_url("https://abc.supabase.co/"),
            "https://abc.supabase.co/"
        );
    }

    /// Tests the REST endpoint built for a table.
    #[test]
    fn test_build_rest_url() {
        assert_eq!(
            build_rest_url("https://abc.supabase.co", "users"),
            "https://abc.supabase.co/rest/v1/users"
        );
    }

    /// Tests that the header follows the first record's key order and
    /// rows align to it.
    #[test]
    fn test_snapshot_from_records() {
        let records = vec![
            record(json!({"id": 1, "name": "alice"})),
            record(json!({"id": 2, "name": "bob"})),
        ];
        let snapshot = snapshot_from_records("users", &records);

        assert_eq!(snapshot.table, "users");
        assert_eq!(snapshot.columns, vec!["id", "name"]);
        assert_eq!(
            snapshot.rows,
            vec![vec!["1", "alice"], vec!["2", "bob"]]
        );
        assert_eq!(snapshot.row_count(), 2);
    }

    /// Tests null, boolean, and nested value rendering.
    #[test]
    fn test_snapshot_value_rendering() {
        let records = vec![record(json!({
            "id": 7,
            "email": null,
            "active": true,
            "profile": {"plan": "free"},
            "tags": ["a", "b"]
        }))];
        let snapshot = snapshot_from_records("users", &records);

        assert_eq!(
            snapshot.rows[0],
            vec!["7", "", "true", "{\"plan\":\"free\"}", "[\"a\",\"b\"]"]
        );
    }

    /// Tests that a key missing from a later record renders as empty.
    #[test]
    fn test_snapshot_missing_key_renders_empty() {
        let records = vec![
            record(json!({"id": 1, "name": "alice"})),
            record(json!({"id": 2})),
        ];
        let snapshot = snapshot_from_records("users", &records);

        assert_eq!(snapshot.rows[1], vec!["2", ""]);
    }

    /// Tests that an empty record set produces an empty snapshot; the
    /// endpoint returns no metadata for it.
    #[test]
    fn test_snapshot_from_empty_record_set() {
        let snapshot = snapshot_from_records("users", &[]);

        assert!(snapshot.columns.is_empty());
        assert!(snapshot.rows.is_empty());
        assert_eq!(snapshot.row_count(), 0);
    }
}
