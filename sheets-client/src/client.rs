//! Values API client
//!
//! All reads use `UNFORMATTED_VALUE` so numbers come back as numbers, and
//! all writes use `RAW` so strings such as `+998901234567` or
//! `2024-05-01 10:00:00` are stored verbatim instead of being parsed by
//! the spreadsheet.

use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::a1;
use crate::auth::{ServiceAccountAuth, ServiceAccountKey};
use crate::error::{SheetsError, SheetsResult};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// A cell value to write
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl Cell {
    fn to_json(&self) -> Value {
        match self {
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Number(n) => json!(n),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: AppendUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Google Sheets values client bound to one spreadsheet
pub struct SheetsClient {
    spreadsheet_id: String,
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    /// Sheet title -> numeric sheet id (needed for row deletion)
    sheet_ids: RwLock<HashMap<String, i64>>,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("auth", &self.auth)
            .finish()
    }
}

impl SheetsClient {
    /// Create a client; `timeout` applies to every HTTP request
    pub fn new(
        spreadsheet_id: impl Into<String>,
        key: ServiceAccountKey,
        timeout: Duration,
    ) -> SheetsResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let auth = ServiceAccountAuth::new(key, http.clone())?;
        Ok(Self {
            spreadsheet_id: spreadsheet_id.into(),
            http,
            auth,
            sheet_ids: RwLock::new(HashMap::new()),
        })
    }

    /// Read a range; every cell is rendered as a string, rows keep their
    /// natural (possibly ragged) length.
    #[instrument(skip(self))]
    pub async fn get_rows(&self, range: &str) -> SheetsResult<Vec<Vec<String>>> {
        let mut url = self.values_url(range)?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("dateTimeRenderOption", "FORMATTED_STRING");

        let body: ValueRange = self.send(Method::GET, url, None).await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Append one row after the last non-empty row of the table that starts
    /// at `range`. Returns the 1-based row number it landed on.
    #[instrument(skip(self, row))]
    pub async fn append_row(&self, range: &str, row: Vec<Cell>) -> SheetsResult<u32> {
        let mut url = self.values_url(&format!("{range}:append"))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let payload = json!({
            "majorDimension": "ROWS",
            "values": [row.iter().map(Cell::to_json).collect::<Vec<_>>()],
        });
        let body: AppendResponse = self.send(Method::POST, url, Some(payload)).await?;

        a1::first_row(&body.updates.updated_range).ok_or_else(|| {
            SheetsError::Decode(format!(
                "cannot read row from updated range {}",
                body.updates.updated_range
            ))
        })
    }

    /// Overwrite the cells of `range` with `rows`
    #[instrument(skip(self, rows))]
    pub async fn update_range(&self, range: &str, rows: Vec<Vec<Cell>>) -> SheetsResult<()> {
        let mut url = self.values_url(range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let payload = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows
                .iter()
                .map(|row| row.iter().map(Cell::to_json).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
        });
        let _: Value = self.send(Method::PUT, url, Some(payload)).await?;
        Ok(())
    }

    /// Remove a whole row from `sheet`, shifting the rows below it up
    #[instrument(skip(self))]
    pub async fn delete_row(&self, sheet: &str, row: u32) -> SheetsResult<()> {
        if row == 0 {
            return Err(SheetsError::Decode("row numbers are 1-based".to_string()));
        }
        let sheet_id = self.sheet_id(sheet).await?;
        let url = self.spreadsheet_url(":batchUpdate")?;
        let payload = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row - 1,
                        "endIndex": row,
                    }
                }
            }]
        });
        let _: Value = self.send(Method::POST, url, Some(payload)).await?;
        Ok(())
    }

    /// Numeric id of a sheet, fetched once per title
    async fn sheet_id(&self, title: &str) -> SheetsResult<i64> {
        if let Some(id) = self.sheet_ids.read().await.get(title) {
            return Ok(*id);
        }

        let mut url = self.spreadsheet_url("")?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");
        let meta: SpreadsheetMeta = self.send(Method::GET, url, None).await?;

        let mut ids = self.sheet_ids.write().await;
        for entry in meta.sheets {
            ids.insert(entry.properties.title, entry.properties.sheet_id);
        }
        ids.get(title)
            .copied()
            .ok_or_else(|| SheetsError::Decode(format!("sheet not found: {title}")))
    }

    fn spreadsheet_url(&self, suffix: &str) -> SheetsResult<Url> {
        let mut url = Url::parse(API_BASE)
            .map_err(|e| SheetsError::Decode(format!("invalid API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Decode("API base cannot have segments".to_string()))?
            .push(&format!("{}{suffix}", self.spreadsheet_id));
        Ok(url)
    }

    fn values_url(&self, range: &str) -> SheetsResult<Url> {
        let mut url = self.spreadsheet_url("")?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Decode("API base cannot have segments".to_string()))?
            .push("values")
            .push(range);
        Ok(url)
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> SheetsResult<T> {
        let token = self.auth.access_token().await?;
        debug!(%method, path = url.path(), "Sheets request");

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            warn!(status = status.as_u16(), %message, "Sheets API call failed");
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SheetsError::Decode(e.to_string()))
    }
}

/// Render a JSON cell as the text a user would see
fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
