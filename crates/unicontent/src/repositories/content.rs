use super::traits::{ContentRepository, DEFAULT_LIST_LIMIT, ListContentParams, ListContentResult};
use crate::errors::StoreError;
use crate::models::{ContentRecord, ContentRecordRow, InsertableContentRecord, NewContentRecord};
use crate::schema::content_records;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, instrument};

#[derive(Clone)]
pub struct SqliteContentRepository {
    db: Arc<Mutex<SqliteConnection>>,
}

impl SqliteContentRepository {
    pub fn new(db: Arc<Mutex<SqliteConnection>>) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<MutexGuard<'_, SqliteConnection>, StoreError> {
        self.db.lock().map_err(|_| {
            error!("Database connection lock poisoned");
            StoreError::LockPoisoned
        })
    }
}

fn filtered(params: &ListContentParams) -> content_records::BoxedQuery<'static, Sqlite> {
    let mut query = content_records::table.into_boxed();

    if let Some(since) = params.since {
        let (secs, nanos) = split_instant(since);
        let other_second = content_records::created_at_secs.gt(secs);
        let same_second = content_records::created_at_secs
            .eq(secs)
            .and(content_records::created_at_nanos.ge(nanos));
        query = query.filter(other_second.or(same_second));
    }
    if let Some(until) = params.until {
        let (secs, nanos) = split_instant(until);
        let other_second = content_records::created_at_secs.lt(secs);
        let same_second = content_records::created_at_secs
            .eq(secs)
            .and(content_records::created_at_nanos.le(nanos));
        query = query.filter(other_second.or(same_second));
    }

    query
}

fn split_instant(instant: DateTime<Utc>) -> (i64, i32) {
    (instant.timestamp(), instant.timestamp_subsec_nanos() as i32)
}

fn log_db_error(err: diesel::result::Error) -> StoreError {
    error!(error = %err, "Database error occurred");
    StoreError::Database(err)
}

#[async_trait]
impl ContentRepository for SqliteContentRepository {
    #[instrument(skip_all, fields(name = %record.name(), url = %record.url(), content_length = record.content().len()))]
    async fn create(&self, record: &NewContentRecord) -> Result<ContentRecord, StoreError> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(content_records::table)
            .values(InsertableContentRecord::from(record))
            .returning(ContentRecordRow::as_returning())
            .get_result(&mut *conn)
            .map_err(log_db_error)?;

        info!(id = row.id, "Stored content record");
        ContentRecord::try_from(row)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Option<ContentRecord>, StoreError> {
        let mut conn = self.conn()?;
        let row = content_records::table
            .find(id)
            .select(ContentRecordRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(log_db_error)?;

        debug!(found = row.is_some(), "Looked up content record");
        row.map(ContentRecord::try_from).transpose()
    }

    #[instrument(skip_all, fields(limit = params.limit, offset = params.offset, has_since = params.since.is_some(), has_until = params.until.is_some()))]
    async fn list(&self, params: &ListContentParams) -> Result<ListContentResult, StoreError> {
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let mut conn = self.conn()?;

        let total: i64 = filtered(params)
            .count()
            .get_result(&mut *conn)
            .map_err(log_db_error)?;

        let rows = filtered(params)
            .order((
                content_records::created_at_secs.asc(),
                content_records::created_at_nanos.asc(),
                content_records::id.asc(),
            ))
            .limit(i64::from(limit))
            .offset(i64::from(offset))
            .select(ContentRecordRow::as_select())
            .load(&mut *conn)
            .map_err(log_db_error)?;

        debug!(returned = rows.len(), total, "Listed content records");

        Ok(ListContentResult {
            items: rows
                .into_iter()
                .map(ContentRecord::try_from)
                .collect::<Result<_, _>>()?,
            total: total.max(0) as u64,
        })
    }
}
