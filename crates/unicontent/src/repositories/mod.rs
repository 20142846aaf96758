mod content;
mod traits;

pub use content::SqliteContentRepository;
pub use traits::{ContentRepository, DEFAULT_LIST_LIMIT, ListContentParams, ListContentResult};
