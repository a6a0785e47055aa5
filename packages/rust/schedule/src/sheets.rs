//! Google Sheets reader for the reading plan.
//!
//! The spreadsheet is opened by title (Drive `files.list`) unless an ID is
//! configured, then the first worksheet is read through Sheets `values.get`.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use dailybread_shared::{AppConfig, DailyBreadError, Result, ScheduleConfig};

use crate::auth::{ServiceAccountKey, fetch_access_token};
use crate::{ReferenceSource, ScheduleRow};

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Without a sheet title the range resolves against the first worksheet.
const VALUE_RANGE: &str = "A:Z";

const DATE_COLUMN: &str = "Date";
const REFERENCE_COLUMN: &str = "Reference";

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Reads the reading plan from a Google spreadsheet.
pub struct SheetsClient {
    client: Client,
    key: ServiceAccountKey,
    sheet_name: String,
    spreadsheet_id: Option<String>,
    sheets_api: Url,
    drive_api: Url,
}

impl SheetsClient {
    /// Create a client from a parsed key and the `[schedule]` settings.
    pub fn new(key: ServiceAccountKey, settings: &ScheduleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DailyBreadError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            key,
            sheet_name: settings.sheet_name.clone(),
            spreadsheet_id: settings.spreadsheet_id.clone(),
            sheets_api: parse_base(&settings.sheets_api_url)?,
            drive_api: parse_base(&settings.drive_api_url)?,
        })
    }

    /// Load the credentials file named by the config and build a client.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let key = ServiceAccountKey::from_file(&config.credentials_path())?;
        Self::new(key, &config.schedule)
    }

    /// Resolve the spreadsheet title to its ID.
    async fn find_spreadsheet(&self, token: &str) -> Result<String> {
        if let Some(id) = &self.spreadsheet_id {
            return Ok(id.clone());
        }

        let url = endpoint(&self.drive_api, &["drive", "v3", "files"])?;
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            self.sheet_name.replace('\\', "\\\\").replace('\'', "\\'")
        );

        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "1"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await
            .map_err(|e| DailyBreadError::Network(format!("{url}: {e}")))?;

        let list: FileList = read_json(response, "drive files.list").await?;
        let file = list.files.into_iter().next().ok_or_else(|| {
            DailyBreadError::schedule(format!(
                "spreadsheet '{}' not found or not shared with {}",
                self.sheet_name, self.key.client_email
            ))
        })?;

        debug!(spreadsheet_id = %file.id, "spreadsheet resolved by name");
        Ok(file.id)
    }

    async fn read_values(&self, token: &str, spreadsheet_id: &str) -> Result<Vec<Vec<String>>> {
        let url = endpoint(
            &self.sheets_api,
            &["v4", "spreadsheets", spreadsheet_id, "values", VALUE_RANGE],
        )?;

        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DailyBreadError::Network(format!("{url}: {e}")))?;

        let range: ValueRange = read_json(response, "sheets values.get").await?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }
}

impl ReferenceSource for SheetsClient {
    #[instrument(skip_all, fields(sheet = %self.sheet_name))]
    async fn rows(&self) -> Result<Vec<ScheduleRow>> {
        let token = fetch_access_token(&self.client, &self.key, SCOPES).await?;
        let id = self.find_spreadsheet(&token).await?;
        let values = self.read_values(&token, &id).await?;
        let rows = rows_from_values(&values)?;
        info!(rows = rows.len(), "reading plan fetched from spreadsheet");
        Ok(rows)
    }
}

/// Turn a header-first value grid into schedule rows.
///
/// The header row must contain `Date` and `Reference`; short rows are padded
/// with empty cells.
pub fn rows_from_values(values: &[Vec<String>]) -> Result<Vec<ScheduleRow>> {
    let Some((header, body)) = values.split_first() else {
        return Ok(Vec::new());
    };

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DailyBreadError::schedule(format!("missing column '{name}'")))
    };
    let date_idx = column(DATE_COLUMN)?;
    let reference_idx = column(REFERENCE_COLUMN)?;

    let cell = |row: &[String], idx: usize| row.get(idx).cloned().unwrap_or_default();

    Ok(body
        .iter()
        .map(|row| ScheduleRow::new(cell(row, date_idx), cell(row, reference_idx)))
        .collect())
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| DailyBreadError::config(format!("invalid API URL '{raw}': {e}")))
}

/// Append path segments (percent-encoded) to an API base URL.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| DailyBreadError::config(format!("API URL cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DailyBreadError::schedule(format!(
            "{what} returned HTTP {status}: {body}"
        )));
    }
    response
        .json()
        .await
        .map_err(|e| DailyBreadError::parse(format!("{what}: {e}")))
}
