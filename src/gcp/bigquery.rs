//! BigQuery implementation of the query executor seam, plus schema-coerced
//! tabular uploads.
//!
//! Both operations are thin calls to documented REST endpoints:
//!
//! - [`run_sql`](BigQueryClient::run_sql) uses `jobs.query` and flattens the
//!   response into a [`Table`];
//! - [`upload_table`](BigQueryClient::upload_table) reads the destination
//!   schema with `tables.get`, coerces each column to its schema type
//!   (timezone-localizing datetimes to UTC), and submits a CSV load job,
//!   waiting for it to reach `DONE`.
//!
//! Upload failures are logged and returned - fail loud, never retried.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use url::Url;

use crate::cache::QueryExecutor;
use crate::config::constants::{
    LOAD_JOB_POLL_INTERVAL, LOAD_JOB_WAIT_LIMIT, QUERY_TIMEOUT_MS,
};
use crate::config::LakecoreConfig;
use crate::errors::WarehouseError;
use crate::gcp::auth::GcpAuthenticator;
use crate::table::Table;

/// Append or replace semantics for a tabular upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDisposition {
    /// Append rows to whatever the table already holds.
    Append,
    /// Replace the table's contents.
    Replace,
}

impl WriteDisposition {
    /// Wire value for the load job configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            WriteDisposition::Append => "WRITE_APPEND",
            WriteDisposition::Replace => "WRITE_TRUNCATE",
        }
    }
}

/// The closed set of column types this wrapper coerces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Passed through verbatim.
    String,
    /// Parsed as `i64` (tolerating a trailing `.0`).
    Integer,
    /// Parsed as `f64`.
    Float,
    /// Parsed from common timestamp shapes and localized to UTC.
    Datetime,
}

impl ColumnType {
    /// Map a BigQuery schema type string onto the closed coercion set.
    pub fn from_schema_type(ty: &str) -> Option<Self> {
        match ty {
            "STRING" => Some(ColumnType::String),
            "INTEGER" | "INT64" => Some(ColumnType::Integer),
            "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => Some(ColumnType::Float),
            "TIMESTAMP" | "DATETIME" | "DATE" => Some(ColumnType::Datetime),
            _ => None,
        }
    }
}

/// One column of a destination table's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Coercion target type.
    pub ty: ColumnType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    schema: Option<ResponseSchema>,
    #[serde(default)]
    rows: Vec<ResponseRow>,
    page_token: Option<String>,
    job_reference: Option<JobReference>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseSchema {
    fields: Vec<SchemaField>,
}

#[derive(Debug, Deserialize)]
struct SchemaField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Debug, Deserialize)]
struct ResponseRow {
    f: Vec<ResponseCell>,
}

#[derive(Debug, Deserialize)]
struct ResponseCell {
    v: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableResource {
    schema: Option<ResponseSchema>,
}

/// Client for warehouse query execution and tabular uploads.
pub struct BigQueryClient {
    http: reqwest::Client,
    auth: GcpAuthenticator,
    project: String,
    location: String,
    base_url: Url,
}

impl std::fmt::Debug for BigQueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigQueryClient")
            .field("project", &self.project)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl BigQueryClient {
    /// Create a client from resolved credentials and deployment config.
    pub fn new(auth: GcpAuthenticator, config: &LakecoreConfig) -> Result<Self, WarehouseError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout.max(std::time::Duration::from_millis(
                QUERY_TIMEOUT_MS + 10_000,
            )))
            .build()?;
        Ok(Self {
            http,
            auth,
            project: config.warehouse_project.clone(),
            location: config.warehouse_location.clone(),
            base_url: config.bigquery_base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, WarehouseError> {
        self.base_url
            .join(path)
            .map_err(|e| WarehouseError::malformed_response(e.to_string()))
    }

    /// Run a query and return its result as a table.
    ///
    /// The request carries a generous server-side completion wait; a query
    /// that still is not done is [`WarehouseError::QueryIncomplete`], not a
    /// retry loop. Results spanning multiple pages are collected by
    /// following the page token through `getQueryResults`.
    pub async fn run_sql(&self, sql: &str) -> Result<Table, WarehouseError> {
        let url = self.endpoint(&format!(
            "/bigquery/v2/projects/{}/queries",
            self.project
        ))?;
        let body = json!({
            "query": sql,
            "useLegacySql": false,
            "location": self.location,
            "timeoutMs": QUERY_TIMEOUT_MS,
        });

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.auth.authorization_header().await?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: QueryResponse = response.json().await?;
        if !parsed.job_complete {
            return Err(WarehouseError::QueryIncomplete);
        }

        let job_id = parsed
            .job_reference
            .as_ref()
            .and_then(|r| r.job_id.clone());
        let mut page_token = parsed.page_token.clone();
        let mut table = response_to_table(parsed)?;

        while let Some(token) = page_token {
            let job_id = job_id
                .as_deref()
                .ok_or_else(|| WarehouseError::malformed_response("paged response has no jobId"))?;
            let page = self.query_results_page(job_id, &token).await?;
            append_rows(&mut table, page.rows)?;
            page_token = page.page_token;
        }

        info!(rows = table.len(), "warehouse query completed");
        Ok(table)
    }

    /// Fetch one further page of a completed query's results.
    async fn query_results_page(
        &self,
        job_id: &str,
        page_token: &str,
    ) -> Result<QueryResponse, WarehouseError> {
        let url = self.endpoint(&format!(
            "/bigquery/v2/projects/{}/queries/{job_id}",
            self.project
        ))?;

        let response = self
            .http
            .get(url)
            .query(&[
                ("location", self.location.as_str()),
                ("pageToken", page_token),
            ])
            .header(AUTHORIZATION, self.auth.authorization_header().await?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Read the destination table's schema, restricted to the closed
    /// coercion set.
    pub async fn table_schema(
        &self,
        dataset: &str,
        table: &str,
    ) -> Result<Vec<ColumnSpec>, WarehouseError> {
        let url = self.endpoint(&format!(
            "/bigquery/v2/projects/{}/datasets/{dataset}/tables/{table}",
            self.project
        ))?;

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.auth.authorization_header().await?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let resource: TableResource = response.json().await?;
        let fields = resource
            .schema
            .ok_or_else(|| WarehouseError::malformed_response("table resource has no schema"))?
            .fields;

        fields
            .into_iter()
            .map(|field| {
                let ty = ColumnType::from_schema_type(&field.ty).ok_or(
                    WarehouseError::UnsupportedColumnType {
                        column: field.name.clone(),
                        ty: field.ty.clone(),
                    },
                )?;
                Ok(ColumnSpec {
                    name: field.name,
                    ty,
                })
            })
            .collect()
    }

    /// Upload a table to `dataset.table`, coercing columns to the
    /// destination schema first.
    ///
    /// Data columns are reordered to match the schema; a schema column
    /// missing from the data is a [`WarehouseError::SchemaMismatch`]. The
    /// load job is submitted with the requested [`WriteDisposition`] and
    /// awaited until `DONE`.
    pub async fn upload_table(
        &self,
        dataset: &str,
        table: &str,
        data: &Table,
        disposition: WriteDisposition,
    ) -> Result<(), WarehouseError> {
        let result = self
            .upload_table_inner(dataset, table, data, disposition)
            .await;
        if let Err(e) = &result {
            error!(dataset, table, error = %e, "tabular upload failed");
        }
        result
    }

    async fn upload_table_inner(
        &self,
        dataset: &str,
        table: &str,
        data: &Table,
        disposition: WriteDisposition,
    ) -> Result<(), WarehouseError> {
        let schema = self.table_schema(dataset, table).await?;
        for column in data.columns() {
            if !schema.iter().any(|spec| spec.name == *column) {
                warn!(dataset, table, column, "column absent from destination schema, dropping");
            }
        }
        let coerced = coerce_to_schema(data, &schema)?;
        let csv = coerced
            .to_csv()
            .map_err(|e| WarehouseError::malformed_response(e.to_string()))?;

        let job = json!({
            "configuration": {
                "load": {
                    "destinationTable": {
                        "projectId": self.project,
                        "datasetId": dataset,
                        "tableId": table,
                    },
                    "sourceFormat": "CSV",
                    "skipLeadingRows": 1,
                    "writeDisposition": disposition.as_str(),
                }
            },
            "jobReference": {
                "projectId": self.project,
                "location": self.location,
            }
        });

        let boundary = "lakecore_load_boundary";
        let body = multipart_related_body(&job, &csv, boundary);

        let url = self.endpoint(&format!(
            "/upload/bigquery/v2/projects/{}/jobs?uploadType=multipart",
            self.project
        ))?;

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.auth.authorization_header().await?)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let submitted: Value = response.json().await?;
        let job_id = submitted
            .pointer("/jobReference/jobId")
            .and_then(Value::as_str)
            .ok_or_else(|| WarehouseError::malformed_response("load job has no jobId"))?
            .to_string();

        self.await_load_job(&job_id).await?;
        info!(dataset, table, rows = data.len(), disposition = disposition.as_str(), "tabular upload completed");
        Ok(())
    }

    /// Wait for a load job to reach `DONE`, checking at a fixed interval.
    async fn await_load_job(&self, job_id: &str) -> Result<(), WarehouseError> {
        let url = self.endpoint(&format!(
            "/bigquery/v2/projects/{}/jobs/{job_id}?location={}",
            self.project, self.location
        ))?;
        let deadline = std::time::Instant::now() + LOAD_JOB_WAIT_LIMIT;

        loop {
            let response = self
                .http
                .get(url.clone())
                .header(AUTHORIZATION, self.auth.authorization_header().await?)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(WarehouseError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let job: Value = response.json().await?;
            if job.pointer("/status/state").and_then(Value::as_str) == Some("DONE") {
                if let Some(error_result) = job.pointer("/status/errorResult") {
                    return Err(WarehouseError::LoadJobFailed {
                        message: error_result
                            .pointer("/message")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown load error")
                            .to_string(),
                    });
                }
                return Ok(());
            }

            if std::time::Instant::now() >= deadline {
                return Err(WarehouseError::LoadJobFailed {
                    message: format!("job {job_id} did not finish within the wait limit"),
                });
            }
            tokio::time::sleep(LOAD_JOB_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl QueryExecutor for BigQueryClient {
    async fn execute(&self, sql: &str) -> Result<Table, WarehouseError> {
        self.run_sql(sql).await
    }
}

/// Flatten a `jobs.query` response into a table.
fn response_to_table(response: QueryResponse) -> Result<Table, WarehouseError> {
    let schema = response
        .schema
        .ok_or_else(|| WarehouseError::malformed_response("query response has no schema"))?;
    let columns: Vec<String> = schema.fields.into_iter().map(|f| f.name).collect();

    let mut table = Table::new(columns);
    append_rows(&mut table, response.rows)?;
    Ok(table)
}

/// Append one response page's rows to an already-shaped table.
fn append_rows(table: &mut Table, rows: Vec<ResponseRow>) -> Result<(), WarehouseError> {
    for row in rows {
        let cells = row.f.into_iter().map(|cell| cell_to_string(cell.v)).collect();
        table
            .push_row(cells)
            .map_err(|e| WarehouseError::malformed_response(e.to_string()))?;
    }
    Ok(())
}

/// Cell values arrive as JSON strings or null; anything else is rendered
/// back to its JSON text.
fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Reorder `data` into schema order and coerce every cell to its column
/// type. Data columns absent from the schema are dropped; schema columns
/// absent from the data are an error.
fn coerce_to_schema(data: &Table, schema: &[ColumnSpec]) -> Result<Table, WarehouseError> {
    let mut indices = Vec::with_capacity(schema.len());
    for spec in schema {
        let idx = data
            .column_index(&spec.name)
            .ok_or_else(|| WarehouseError::SchemaMismatch {
                column: spec.name.clone(),
            })?;
        indices.push(idx);
    }

    let columns = schema.iter().map(|s| s.name.clone()).collect();
    let mut coerced = Table::new(columns);
    for row in data.rows() {
        let mut cells = Vec::with_capacity(schema.len());
        for (spec, &idx) in schema.iter().zip(&indices) {
            cells.push(coerce_cell(&row[idx], spec)?);
        }
        coerced
            .push_row(cells)
            .map_err(|e| WarehouseError::malformed_response(e.to_string()))?;
    }
    Ok(coerced)
}

/// Coerce one cell to its schema column type. Empty cells pass through as
/// empty (NULL in the CSV load).
fn coerce_cell(value: &str, spec: &ColumnSpec) -> Result<String, WarehouseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    match spec.ty {
        ColumnType::String => Ok(value.to_string()),
        ColumnType::Integer => {
            if let Ok(v) = trimmed.parse::<i64>() {
                return Ok(v.to_string());
            }
            // Tolerate float-shaped integers like "3.0".
            match trimmed.parse::<f64>() {
                Ok(v) if v.fract() == 0.0 => Ok((v as i64).to_string()),
                _ => Err(WarehouseError::coercion_failed(
                    &spec.name, trimmed, "integer",
                )),
            }
        }
        ColumnType::Float => trimmed
            .parse::<f64>()
            .map(|v| v.to_string())
            .map_err(|_| WarehouseError::coercion_failed(&spec.name, trimmed, "float")),
        ColumnType::Datetime => parse_datetime_utc(trimmed)
            .map(|dt| dt.to_rfc3339())
            .ok_or_else(|| WarehouseError::coercion_failed(&spec.name, trimmed, "datetime")),
    }
}

/// Parse the timestamp shapes that show up in loosely-typed tables and
/// localize to UTC. Naive timestamps are taken as already-UTC.
fn parse_datetime_utc(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    None
}

/// Assemble a `multipart/related` body: JSON job configuration first, CSV
/// data second.
fn multipart_related_body(job: &Value, csv: &[u8], boundary: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(csv.len() + 512);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(job.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
    body.extend_from_slice(csv);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
