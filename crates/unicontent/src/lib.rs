//! Validated records of unstructured content scraped from university web
//! pages, and a SQLite store for them.

pub mod db;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod validation;

pub use errors::StoreError;
pub use models::{CandidateRecord, ContentRecord, NewContentRecord};
pub use validation::{
    Clock, MissingFieldError, MonotonicClock, RequiredField, SystemClock, validate,
    validate_with_clock,
};
