use crate::errors::StoreError;
use crate::models::{CandidateRecord, ContentRecord, NewContentRecord};
use crate::validation::{Clock, validate_with_clock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub const DEFAULT_LIST_LIMIT: u32 = 50;

#[derive(Debug, Clone, Default)]
pub struct ListContentParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ListContentResult {
    pub items: Vec<ContentRecord>,
    /// Matching records before `limit`/`offset` are applied.
    pub total: u64,
}

/// Storage for validated records. The store owns id assignment: `create`
/// hands back the record with its new id, and ids are never reused.
#[async_trait]
pub trait ContentRepository: Clone + Send + Sync + 'static {
    async fn create(&self, record: &NewContentRecord) -> Result<ContentRecord, StoreError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<ContentRecord>, StoreError>;
    async fn list(&self, params: &ListContentParams) -> Result<ListContentResult, StoreError>;

    /// Validates `candidate` and stores it. A rejected candidate comes back
    /// as [`StoreError::Validation`] and nothing is written.
    async fn create_candidate(
        &self,
        candidate: CandidateRecord,
        clock: &(dyn Clock + Sync),
    ) -> Result<ContentRecord, StoreError> {
        let record = validate_with_clock(candidate, clock)?;
        self.create(&record).await
    }
}
