//! Record data structure.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Separator used when media locators are flattened into a single column.
pub const MEDIA_SEPARATOR: &str = " | ";

/// One captured feed entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable identifier taken from the entry element
    pub id: String,

    /// Author label (often empty in channels)
    pub sender: String,

    /// Machine-readable time when available, otherwise the displayed label
    pub timestamp: String,

    /// Body text (empty for pure media entries)
    pub text: String,

    /// Attached resource locators, in document order
    pub media: Vec<String>,

    /// Origin of a forwarded entry
    pub forwarded_from: String,

    /// Quoted context of a reply
    pub reply_to: String,
}

impl Record {
    /// Column names in export order.
    pub const FIELDS: [&'static str; 7] = [
        "id",
        "sender",
        "timestamp",
        "text",
        "media",
        "forwardedFrom",
        "replyTo",
    ];

    /// Create an otherwise empty record with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Scalar column values, aligned with [`Record::FIELDS`].
    pub fn columns(&self) -> [Cow<'_, str>; 7] {
        [
            Cow::Borrowed(self.id.as_str()),
            Cow::Borrowed(self.sender.as_str()),
            Cow::Borrowed(self.timestamp.as_str()),
            Cow::Borrowed(self.text.as_str()),
            Cow::Owned(self.media.join(MEDIA_SEPARATOR)),
            Cow::Borrowed(self.forwarded_from.as_str()),
            Cow::Borrowed(self.reply_to.as_str()),
        ]
    }
}
