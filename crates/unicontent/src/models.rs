use crate::validation::{MissingFieldError, validate};
use crate::errors::StoreError;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Unvalidated input from an ingestion process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub name: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl CandidateRecord {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            content: Some(content.into()),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// A record that passed validation and is ready to be stored.
///
/// Only validation constructs this type, and it has no setters, so a value
/// always carries a non-empty `name`, `url` and `content` and the
/// `created_at` fixed at validation time. Deserializing one runs the same
/// validation as [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CandidateRecord")]
pub struct NewContentRecord {
    name: String,
    url: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl NewContentRecord {
    pub fn new(
        name: String,
        url: String,
        content: String,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, MissingFieldError> {
        validate(CandidateRecord {
            name: Some(name),
            url: Some(url),
            content: Some(content),
            created_at,
        })
    }

    pub(crate) fn from_parts(
        name: String,
        url: String,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            url,
            content,
            created_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl TryFrom<CandidateRecord> for NewContentRecord {
    type Error = MissingFieldError;

    fn try_from(candidate: CandidateRecord) -> Result<Self, Self::Error> {
        validate(candidate)
    }
}

/// A stored record together with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRecord {
    id: i32,
    #[serde(flatten)]
    record: NewContentRecord,
}

impl ContentRecord {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        self.record.name()
    }

    pub fn url(&self) -> &str {
        self.record.url()
    }

    pub fn content(&self) -> &str {
        self.record.content()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.record.created_at()
    }

    pub fn record(&self) -> &NewContentRecord {
        &self.record
    }

    pub fn into_parts(self) -> (i32, NewContentRecord) {
        (self.id, self.record)
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::content_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ContentRecordRow {
    pub id: i32,
    pub name: String,
    pub url: String,
    pub content: String,
    pub created_at_secs: i64,
    pub created_at_nanos: i32,
}

impl TryFrom<ContentRecordRow> for ContentRecord {
    type Error = StoreError;

    fn try_from(row: ContentRecordRow) -> Result<Self, Self::Error> {
        let created_at = u32::try_from(row.created_at_nanos)
            .ok()
            .and_then(|nanos| DateTime::from_timestamp(row.created_at_secs, nanos))
            .ok_or(StoreError::CorruptTimestamp { id: row.id })?;

        // Rows are only ever written from validated records.
        Ok(ContentRecord {
            id: row.id,
            record: NewContentRecord::from_parts(row.name, row.url, row.content, created_at),
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::content_records)]
pub(crate) struct InsertableContentRecord<'a> {
    pub name: &'a str,
    pub url: &'a str,
    pub content: &'a str,
    pub created_at_secs: i64,
    pub created_at_nanos: i32,
}

impl<'a> From<&'a NewContentRecord> for InsertableContentRecord<'a> {
    fn from(record: &'a NewContentRecord) -> Self {
        // Sub-second nanos stay below 2e9 even for leap seconds.
        InsertableContentRecord {
            name: &record.name,
            url: &record.url,
            content: &record.content,
            created_at_secs: record.created_at.timestamp(),
            created_at_nanos: record.created_at.timestamp_subsec_nanos() as i32,
        }
    }
}
