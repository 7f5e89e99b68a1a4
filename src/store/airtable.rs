//! Airtable-backed announcement store (REST API v0).
//!
//! Reads records from one table of one base. Each operation maps to a
//! single endpoint; list fetches follow the `offset` cursor until the
//! server stops returning one.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::AirtableConfig;
use crate::error::{BoardError, Result};
use crate::model::announcement::Announcement;

use super::AnnouncementStore;

const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Envelope returned by the list endpoint.
#[derive(Debug, serde::Deserialize)]
struct RecordPage {
    records: Vec<RecordEnvelope>,
    offset: Option<String>,
}

/// One API record: the store id wraps the announcement fields.
#[derive(Debug, serde::Deserialize)]
struct RecordEnvelope {
    id: String,
    fields: Announcement,
}

impl RecordEnvelope {
    fn into_announcement(self) -> Announcement {
        let mut announcement = self.fields;
        announcement.id = self.id;
        announcement
    }
}

#[derive(Debug)]
pub struct AirtableStore {
    client: Client,
    api_url: String,
    token: String,
    base_id: String,
    table: String,
}

impl AirtableStore {
    /// Build a store from the `[airtable]` config section.
    ///
    /// Fails with [`BoardError::StoreNotConfigured`] when the API key
    /// (config or `AIRTABLE_API_KEY`) or the base id is missing.
    pub fn from_config(cfg: &AirtableConfig) -> Result<Self> {
        let token = cfg.resolved_api_key();
        if token.is_empty() {
            return Err(BoardError::StoreNotConfigured(
                "missing API key; set [airtable].api_key or AIRTABLE_API_KEY".into(),
            ));
        }
        if cfg.base_id.is_empty() {
            return Err(BoardError::StoreNotConfigured(
                "missing [airtable].base_id".into(),
            ));
        }
        Ok(Self::new(
            DEFAULT_API_URL,
            token,
            cfg.base_id.clone(),
            cfg.table.clone(),
        ))
    }

    /// Build against an explicit API URL. Tests point this at a local
    /// mock server.
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        base_id: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            token: token.into(),
            base_id: base_id.into(),
            table: table.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/{}/{}", self.api_url, self.base_id, self.table)
    }

    fn api_error(resp: reqwest::blocking::Response) -> BoardError {
        let status = resp.status().as_u16();
        let body = resp.text().unwrap_or_default();
        BoardError::Api { status, body }
    }

    /// Fetch every page of the table, reporting the running record count
    /// to `progress` after each page.
    pub fn fetch_all_paged(&self, progress: Option<&dyn Fn(usize)>) -> Result<Vec<Announcement>> {
        let url = self.table_url();
        let mut out: Vec<Announcement> = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).bearer_auth(&self.token);
            if let Some(cursor) = &offset {
                request = request.query(&[("offset", cursor.as_str())]);
            }
            let resp = request.send()?;
            if !resp.status().is_success() {
                return Err(Self::api_error(resp));
            }

            let page: RecordPage = resp.json()?;
            out.extend(page.records.into_iter().map(RecordEnvelope::into_announcement));
            if let Some(report) = progress {
                report(out.len());
            }

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!(count = out.len(), "Fetched announcements from Airtable");
        Ok(out)
    }
}

impl AnnouncementStore for AirtableStore {
    fn fetch_all(&self) -> Result<Vec<Announcement>> {
        self.fetch_all_paged(None)
    }

    fn fetch_by_id(&self, id: &str) -> Result<Option<Announcement>> {
        let url = format!("{}/{}", self.table_url(), id);
        let resp = self.client.get(&url).bearer_auth(&self.token).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::api_error(resp));
        }
        let envelope: RecordEnvelope = resp.json()?;
        Ok(Some(envelope.into_announcement()))
    }

    fn latest(&self) -> Result<Option<Announcement>> {
        // Sort server-side, newest first, and take a single record
        let query = [
            ("maxRecords", "1"),
            ("sort[0][field]", "SentTime"),
            ("sort[0][direction]", "desc"),
        ];
        let resp = self
            .client
            .get(self.table_url())
            .bearer_auth(&self.token)
            .query(&query)
            .send()?;
        if !resp.status().is_success() {
            return Err(Self::api_error(resp));
        }
        let page: RecordPage = resp.json()?;
        Ok(page
            .records
            .into_iter()
            .next()
            .map(RecordEnvelope::into_announcement))
    }
}
