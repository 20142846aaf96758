use crate::models::{CandidateRecord, NewContentRecord};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// The fields a candidate must carry before it can be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Name,
    Url,
    Content,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Url => "url",
            RequiredField::Content => "content",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing required field: {field}")]
pub struct MissingFieldError {
    pub field: RequiredField,
}

impl MissingFieldError {
    pub fn new(field: RequiredField) -> Self {
        Self { field }
    }
}

/// Source of the timestamp used when a candidate omits `createdAt`.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that never goes backwards.
///
/// Each instance remembers the latest instant it handed out and clamps any
/// earlier reading from its source up to that instant. This holds across the
/// whole `DateTime<Utc>` range. One instance can be shared between threads;
/// callers that need non-decreasing `createdAt` values across a batch should
/// share one instance for the whole batch.
#[derive(Debug)]
pub struct MonotonicClock<C = SystemClock> {
    source: C,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock<SystemClock> {
    pub fn new() -> Self {
        Self::with_source(SystemClock)
    }
}

impl Default for MonotonicClock<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MonotonicClock<C> {
    pub fn with_source(source: C) -> Self {
        Self {
            source,
            last: Mutex::new(None),
        }
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&self) -> DateTime<Utc> {
        // The guarded value is a plain timestamp, so a poisoned lock still
        // holds a usable one.
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        let reading = self.source.now();
        let issued = match *last {
            Some(previous) if previous > reading => previous,
            _ => reading,
        };
        *last = Some(issued);
        issued
    }
}

fn require_text(
    value: Option<String>,
    field: RequiredField,
    is_blank: fn(&str) -> bool,
) -> Result<String, MissingFieldError> {
    match value {
        Some(text) if !is_blank(&text) => Ok(text),
        _ => Err(MissingFieldError::new(field)),
    }
}

/// Checks required fields in the order `name`, `url`, `content` and fills
/// `createdAt` from the system clock when it is absent.
///
/// The wall clock can step backwards, so successive calls are not
/// guaranteed to produce non-decreasing timestamps. Callers that need that
/// ordering should use [`validate_with_clock`] with one shared
/// [`MonotonicClock`].
pub fn validate(candidate: CandidateRecord) -> Result<NewContentRecord, MissingFieldError> {
    validate_with_clock(candidate, &SystemClock)
}

pub fn validate_with_clock<C: Clock + ?Sized>(
    candidate: CandidateRecord,
    clock: &C,
) -> Result<NewContentRecord, MissingFieldError> {
    // `name` must have visible characters; `url` and `content` only need to
    // be non-empty and are kept byte-for-byte.
    let name = require_text(candidate.name, RequiredField::Name, |s: &str| {
        s.trim().is_empty()
    })?;
    let url = require_text(candidate.url, RequiredField::Url, str::is_empty)?;
    let content = require_text(candidate.content, RequiredField::Content, str::is_empty)?;

    let created_at = candidate.created_at.unwrap_or_else(|| clock.now());

    Ok(NewContentRecord::from_parts(name, url, content, created_at))
}
