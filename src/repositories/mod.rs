pub mod memory_report_repository;
pub mod report_repository;

use futures::{ future::BoxFuture, stream::BoxStream };
use thiserror::Error;
use diesel::{ result::Error as DieselError, r2d2::PoolError as R2D2Error };

use crate::models::Report;

pub use memory_report_repository::InMemoryReportStore;
pub use report_repository::PgReportStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")] Diesel(#[from] DieselError),

    #[error("Connection pool error: {0}")] Pool(#[from] R2D2Error),

    #[error("Store task failed: {0}")] Task(#[from] tokio::task::JoinError),

    #[error("Store unavailable: {0}")] Unavailable(String),
}

/// A single equality filter a store must honour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criteria {
    Enabled(bool),
    Group(String),
}

impl Criteria {
    pub fn matches(&self, report: &Report) -> bool {
        match self {
            Criteria::Enabled(flag) => report.enabled == *flag,
            Criteria::Group(group) => report.group.as_deref() == Some(group.as_str()),
        }
    }
}

/// Filter plus optional skip/limit, handed to [`ReportStore::find`].
///
/// Every criterion must hold for a report to match. `skip` and `limit` are both `None`
/// for an unpaged query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub criteria: Vec<Criteria>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl ReportQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_criteria(&mut self, criteria: Criteria) -> &mut Self {
        self.criteria.push(criteria);
        self
    }

    pub fn skip(&mut self, skip: u64) -> &mut Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_paged(&self) -> bool {
        self.skip.is_some() || self.limit.is_some()
    }

    pub fn matches(&self, report: &Report) -> bool {
        self.criteria.iter().all(|criteria| criteria.matches(report))
    }
}

pub type ReportStream = BoxStream<'static, Result<Report, StoreError>>;

/// The document store the service reads from and writes to.
///
/// `find` is lazy: nothing is read until the stream is polled, and items arrive in the
/// store's insertion order.
pub trait ReportStore: Send + Sync + 'static {
    fn save(&self, report: Report) -> BoxFuture<'static, Result<Report, StoreError>>;

    fn find(&self, query: ReportQuery) -> ReportStream;

    /// Short backend label, reported by the health check.
    fn backend(&self) -> &'static str;
}
