use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use unicontent::db::establish_connection;
use unicontent::repositories::{ContentRepository, ListContentParams, SqliteContentRepository};
use unicontent::{CandidateRecord, Clock, MonotonicClock, StoreError};

mod import;

#[derive(Parser)]
#[command(name = "unicontent")]
#[command(about = "Store scraped university web content as validated records")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and store a single record
    Add {
        /// Name of the source, e.g. the university
        #[arg(short, long)]
        name: String,
        /// URL the content was scraped from
        #[arg(short, long)]
        url: String,
        #[command(flatten)]
        content: ContentSource,
        /// Creation time in RFC 3339; defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        created_at: Option<DateTime<Utc>>,
    },
    /// Import scraper output: a JSON array or JSON Lines of records
    Import {
        path: PathBuf,
        /// Name to use for entries that carry none
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Print one stored record as JSON
    Show { id: i32 },
    /// Print stored records as JSON Lines, oldest first
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
        #[arg(long, value_parser = parse_timestamp)]
        since: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_timestamp)]
        until: Option<DateTime<Utc>>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ContentSource {
    /// Scraped text
    #[arg(short, long)]
    content: Option<String>,
    /// File holding the scraped text
    #[arg(long)]
    content_file: Option<PathBuf>,
}

impl ContentSource {
    fn read(self) -> Result<String> {
        match (self.content, self.content_file) {
            (Some(text), _) => Ok(text),
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display())),
            (None, None) => bail!("No content given"),
        }
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| format!("expected an RFC 3339 timestamp: {err}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("unicontent=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let connection = establish_connection(&cli.database_url)
        .with_context(|| format!("Failed to open database {}", cli.database_url))?;
    info!(database_url = %cli.database_url, "Connected to database");

    let repo = SqliteContentRepository::new(Arc::new(Mutex::new(connection)));
    let clock = MonotonicClock::new();

    match cli.command {
        Commands::Add {
            name,
            url,
            content,
            created_at,
        } => {
            let candidate = CandidateRecord {
                name: Some(name),
                url: Some(url),
                content: Some(content.read()?),
                created_at,
            };
            let id = add_content(&repo, &clock, candidate).await?;
            println!("{id}");
        }
        Commands::Import { path, name } => {
            let summary = import_file(&repo, &clock, &path, name.as_deref()).await?;
            println!("stored {} rejected {}", summary.stored, summary.rejected);
        }
        Commands::Show { id } => match repo.find_by_id(id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => bail!("No content record with id {id}"),
        },
        Commands::List {
            limit,
            offset,
            since,
            until,
        } => {
            let params = ListContentParams {
                limit,
                offset,
                since,
                until,
            };
            let result = repo.list(&params).await?;
            for record in &result.items {
                println!("{}", serde_json::to_string(record)?);
            }
            info!(
                returned = result.items.len(),
                total = result.total,
                "Listed content records"
            );
        }
    }

    Ok(())
}

async fn add_content<R: ContentRepository>(
    repo: &R,
    clock: &(dyn Clock + Sync),
    candidate: CandidateRecord,
) -> Result<i32> {
    let stored = repo
        .create_candidate(candidate, clock)
        .await
        .map_err(|err| {
            if err.is_validation() {
                anyhow::Error::new(err).context("Content record rejected")
            } else {
                err.into()
            }
        })?;
    Ok(stored.id())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ImportSummary {
    stored: usize,
    rejected: usize,
}

async fn import_file<R: ContentRepository>(
    repo: &R,
    clock: &(dyn Clock + Sync),
    path: &Path,
    fallback_name: Option<&str>,
) -> Result<ImportSummary> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entries = import::parse_entries(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut summary = ImportSummary::default();
    for (index, mut candidate) in entries.into_iter().enumerate() {
        if candidate.name.is_none() {
            candidate.name = fallback_name.map(str::to_owned);
        }

        match repo.create_candidate(candidate, clock).await {
            Ok(_) => summary.stored += 1,
            Err(StoreError::Validation(err)) => {
                warn!(entry = index, field = %err.field, "Skipping invalid entry");
                summary.rejected += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        stored = summary.stored,
        rejected = summary.rejected,
        path = %path.display(),
        "Import finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_repo() -> SqliteContentRepository {
        let connection = establish_connection(":memory:").unwrap();
        SqliteContentRepository::new(Arc::new(Mutex::new(connection)))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_requires_exactly_one_content_source() {
        let args = |extra: &[&'static str]| {
            let mut args = vec![
                "unicontent",
                "--database-url",
                ":memory:",
                "add",
                "-n",
                "MIT",
                "-u",
                "https://mit.edu",
            ];
            args.extend_from_slice(extra);
            args
        };

        assert!(Cli::try_parse_from(args(&[])).is_err());
        assert!(Cli::try_parse_from(args(&["-c", "text", "--content-file", "x.txt"])).is_err());
        assert!(Cli::try_parse_from(args(&["-c", "text"])).is_ok());
    }

    #[test]
    fn test_parse_timestamp_normalises_offset() {
        let parsed = parse_timestamp("2024-09-01T14:30:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-09-01T12:30:00+00:00");
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_add_content_rejects_blank_name() {
        let repo = test_repo();
        let clock = MonotonicClock::new();

        let err = add_content(&repo, &clock, CandidateRecord::new(" ", "https://mit.edu", "text"))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Missing required field: name"));

        let listed = repo.list(&ListContentParams::default()).await.unwrap();
        assert_eq!(listed.total, 0);
    }

    #[tokio::test]
    async fn test_import_counts_rejected_entries_and_continues() {
        let repo = test_repo();
        let clock = MonotonicClock::new();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"url": "https://www.ox.ac.uk/a", "title": "A", "content": "first", "depth": 0}},
                {{"url": "https://www.ox.ac.uk/b", "content": ""}},
                {{"name": "Cambridge", "url": "https://www.cam.ac.uk", "content": "third"}}
            ]"#
        )
        .unwrap();

        let summary = import_file(&repo, &clock, file.path(), Some("Oxford"))
            .await
            .unwrap();
        assert_eq!(summary, ImportSummary { stored: 2, rejected: 1 });

        let listed = repo.list(&ListContentParams::default()).await.unwrap();
        let names: Vec<&str> = listed.items.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Oxford", "Cambridge"]);
    }

    #[tokio::test]
    async fn test_import_without_fallback_name_rejects_unnamed() {
        let repo = test_repo();
        let clock = MonotonicClock::new();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"url": "https://mit.edu", "content": "text"}}"#).unwrap();

        let summary = import_file(&repo, &clock, file.path(), None).await.unwrap();
        assert_eq!(summary, ImportSummary { stored: 0, rejected: 1 });
    }
}
