use diesel::prelude::*;
use futures::{ future::{ BoxFuture, FutureExt }, stream::{ self, StreamExt, TryStreamExt } };
use tracing::{ debug, info };
use uuid::Uuid;

use crate::{
    config::database::PgPool,
    models::{ NewReport, Report, ReportRow },
    repositories::{ Criteria, ReportQuery, ReportStore, ReportStream, StoreError },
    schema::reports,
};

/// Rows fetched per round trip while a `find` stream is being drained.
pub const DEFAULT_CHUNK_SIZE: i64 = 256;

const CREATE_REPORTS_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS reports (
        seq BIGSERIAL UNIQUE,
        id VARCHAR(64) PRIMARY KEY,
        group_name TEXT,
        name TEXT,
        enabled BOOLEAN NOT NULL DEFAULT TRUE,
        fields JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at TIMESTAMP NOT NULL DEFAULT NOW()
    )";

// tables created before group and name became unbounded
const WIDEN_REPORT_COLUMNS: &str =
    "ALTER TABLE reports ALTER COLUMN group_name TYPE TEXT, ALTER COLUMN name TYPE TEXT";

const CREATE_REPORTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS reports_enabled_group_seq_idx ON reports (enabled, group_name, seq)";

/// Postgres-backed store. Each report is a row with its generated fields in a JSONB column.
#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
    chunk_size: i64,
}

impl PgReportStore {
    /// Wraps the pool and makes sure the `reports` table exists.
    pub async fn connect(pool: PgPool) -> Result<Self, StoreError> {
        let setup_pool = pool.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut conn = setup_pool.get()?;
            diesel::sql_query(CREATE_REPORTS_TABLE).execute(&mut conn)?;
            diesel::sql_query(WIDEN_REPORT_COLUMNS).execute(&mut conn)?;
            diesel::sql_query(CREATE_REPORTS_INDEX).execute(&mut conn)?;
            Ok(())
        }).await??;

        info!("Postgres report store ready");

        Ok(Self {
            pool,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    pub fn with_chunk_size(mut self, chunk_size: i64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

/// Where the next chunk of a `find` stream starts.
///
/// The first chunk honours the query's `skip` as a plain offset. Every later chunk
/// continues after the last sequence number seen, so rows inserted meanwhile never
/// shift the window.
#[derive(Debug)]
struct Cursor {
    criteria: Vec<Criteria>,
    offset: i64,
    after_seq: Option<i64>,
    remaining: Option<i64>,
    exhausted: bool,
}

impl Cursor {
    fn new(query: ReportQuery) -> Self {
        Self {
            criteria: query.criteria,
            offset: query.skip.map(to_i64).unwrap_or(0),
            after_seq: None,
            remaining: query.limit.map(to_i64),
            exhausted: false,
        }
    }

    /// Rows to request next, `None` once the stream is finished.
    fn next_take(&self, chunk_size: i64) -> Option<i64> {
        if self.exhausted {
            return None;
        }

        let take = match self.remaining {
            Some(remaining) => remaining.min(chunk_size),
            None => chunk_size,
        };
        (take > 0).then_some(take)
    }

    /// Moves past a chunk that asked for `take` rows and got `fetched`, the last of
    /// which carried `last_seq`.
    fn advance(&mut self, take: i64, fetched: i64, last_seq: Option<i64>) {
        self.exhausted = fetched < take;
        self.offset = 0;
        self.after_seq = last_seq.or(self.after_seq);
        self.remaining = self.remaining.map(|remaining| (remaining - fetched).max(0));
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn load_chunk(
    pool: &PgPool,
    criteria: &[Criteria],
    offset_val: i64,
    after_seq: Option<i64>,
    take: i64
) -> Result<Vec<ReportRow>, StoreError> {
    use crate::schema::reports::dsl::*;

    let mut conn = pool.get()?;
    let mut query = reports.into_boxed();

    for criterion in criteria {
        query = match criterion {
            Criteria::Enabled(flag) => query.filter(enabled.eq(*flag)),
            Criteria::Group(value) => query.filter(group_name.eq(value.clone())),
        };
    }

    if let Some(last) = after_seq {
        query = query.filter(seq.gt(last));
    }

    let rows = query
        .order(seq.asc())
        .offset(offset_val)
        .limit(take)
        .select(ReportRow::as_select())
        .load::<ReportRow>(&mut conn)?;

    Ok(rows)
}

type ReportChunk = stream::Iter<std::vec::IntoIter<Result<Report, StoreError>>>;

async fn next_chunk(
    pool: PgPool,
    mut cursor: Cursor,
    chunk_size: i64
) -> Result<Option<(ReportChunk, Cursor)>, StoreError> {
    let Some(take) = cursor.next_take(chunk_size) else {
        return Ok(None);
    };

    let criteria = cursor.criteria.clone();
    let (offset_val, after_seq) = (cursor.offset, cursor.after_seq);
    let rows = tokio::task::spawn_blocking(move || {
        load_chunk(&pool, &criteria, offset_val, after_seq, take)
    }).await??;

    debug!(rows = rows.len(), offset = offset_val, "Loaded report chunk");

    cursor.advance(
        take,
        rows.len() as i64,
        rows.last().map(|row| row.seq)
    );

    let items: Vec<Result<Report, StoreError>> = rows
        .into_iter()
        .map(|row| Ok(Report::from(row)))
        .collect();

    Ok(Some((stream::iter(items), cursor)))
}

impl ReportStore for PgReportStore {
    fn save(&self, report: Report) -> BoxFuture<'static, Result<Report, StoreError>> {
        let pool = self.pool.clone();

        (async move {
            let handle = tokio::task::spawn_blocking(move || -> Result<Report, StoreError> {
                let mut conn = pool.get()?;
                let new_id = report.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                let new_report = NewReport::from_report(&report, new_id);

                let row: ReportRow = diesel
                    ::insert_into(reports::table)
                    .values(&new_report)
                    .returning(ReportRow::as_returning())
                    .get_result(&mut conn)?;

                Ok(Report::from(row))
            });

            handle.await.unwrap_or_else(|e| Err(StoreError::from(e)))
        }).boxed()
    }

    fn find(&self, query: ReportQuery) -> ReportStream {
        let pool = self.pool.clone();
        let chunk_size = self.chunk_size;

        stream
            ::try_unfold(Cursor::new(query), move |cursor| next_chunk(pool.clone(), cursor, chunk_size))
            .try_flatten()
            .boxed()
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
