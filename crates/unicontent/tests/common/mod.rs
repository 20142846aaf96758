#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex};
use unicontent::db::establish_connection;
use unicontent::repositories::SqliteContentRepository;
use unicontent::{CandidateRecord, NewContentRecord, validate};

pub fn establish_test_connection() -> SqliteConnection {
    establish_connection(":memory:").expect("Failed to create in-memory database")
}

pub fn create_test_repository() -> (SqliteContentRepository, Arc<Mutex<SqliteConnection>>) {
    let db = Arc::new(Mutex::new(establish_test_connection()));
    (SqliteContentRepository::new(db.clone()), db)
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap()
}

pub fn record_at(name: &str, created_at: DateTime<Utc>) -> NewContentRecord {
    validate(
        CandidateRecord::new(
            name,
            format!("https://{}.edu", name.to_lowercase()),
            format!("About {name}..."),
        )
        .with_created_at(created_at),
    )
    .expect("Test record should be valid")
}

pub mod test_utils {
    use diesel::prelude::*;
    use diesel::sqlite::SqliteConnection;
    use unicontent::schema::content_records;

    pub fn count_content_records(conn: &mut SqliteConnection) -> i64 {
        content_records::table
            .count()
            .get_result(conn)
            .expect("Failed to count content records")
    }

    pub fn delete_content_record(conn: &mut SqliteConnection, id: i32) {
        diesel::delete(content_records::table.find(id))
            .execute(conn)
            .expect("Failed to delete content record");
    }
}
