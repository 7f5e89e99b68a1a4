//! Core announcement record type.

/// Reference to a file attached to an announcement.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AttachmentRef {
    /// Download URL for the attachment (may be empty on malformed records).
    pub url: String,

    /// Original filename, when the uploader provided one.
    pub filename: String,
}

/// A single school announcement as stored in the record store.
///
/// Field names mirror the Airtable table schema, so the `fields` object of
/// an API record (or an element of a JSON export) deserializes directly
/// into this struct. Every field is optional on the wire; missing fields
/// default to empty.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Announcement {
    /// Record-store id (`rec…`). Empty for ad-hoc records that never
    /// round-tripped through a store.
    pub id: String,

    /// Headline of the announcement.
    #[serde(rename = "Title")]
    pub title: String,

    /// Full body text.
    #[serde(rename = "Description")]
    pub description: String,

    /// Display name of the person who posted it.
    #[serde(rename = "SentByUser")]
    pub sent_by: String,

    /// Raw timestamp string as the upstream portal produced it.
    /// Parsed lazily by [`crate::parser::sent_time`]; kept verbatim here.
    #[serde(rename = "SentTime")]
    pub sent_time: String,

    /// Attached files, possibly empty.
    #[serde(rename = "Attachments")]
    pub attachments: Vec<AttachmentRef>,

    /// Stable identifier assigned by the announcement portal, when present.
    #[serde(rename = "AnnouncementId")]
    pub announcement_id: Option<String>,
}

impl Announcement {
    /// Title, description and sender concatenated and lowercased, the text
    /// that free-text relevance scoring runs against.
    pub fn searchable_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.sent_by).to_lowercase()
    }

    /// First attachment that carries a usable URL.
    pub fn first_attachment(&self) -> Option<&AttachmentRef> {
        self.attachments.iter().find(|a| !a.url.is_empty())
    }
}
