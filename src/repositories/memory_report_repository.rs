use std::sync::Arc;

use futures::{ future::{ BoxFuture, FutureExt }, stream::{ self, StreamExt } };
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    models::Report,
    repositories::{ ReportQuery, ReportStore, ReportStream, StoreError },
};

/// Process-local store. Documents are kept in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryReportStore {
    documents: Arc<RwLock<Vec<Report>>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    pub async fn all(&self) -> Vec<Report> {
        self.documents.read().await.clone()
    }
}

/// Documents examined per read-lock acquisition while a `find` stream is drained.
const SCAN_CHUNK: usize = 64;

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Progress of a `find` stream through the document list.
struct Scan {
    query: ReportQuery,
    position: usize,
    to_skip: usize,
    remaining: usize,
}

// Documents are only ever appended, so an index stays valid between chunks.
async fn next_scan_chunk(
    documents: Arc<RwLock<Vec<Report>>>,
    mut scan: Scan
) -> Option<(Vec<Result<Report, StoreError>>, Scan)> {
    if scan.remaining == 0 {
        return None;
    }

    let documents = documents.read().await;
    if scan.position >= documents.len() {
        return None;
    }

    let end = scan.position.saturating_add(SCAN_CHUNK).min(documents.len());
    let mut chunk = Vec::new();

    for report in &documents[scan.position..end] {
        scan.position += 1;
        if !scan.query.matches(report) {
            continue;
        }
        if scan.to_skip > 0 {
            scan.to_skip -= 1;
            continue;
        }

        chunk.push(Ok(report.clone()));
        scan.remaining -= 1;
        if scan.remaining == 0 {
            break;
        }
    }

    Some((chunk, scan))
}

impl ReportStore for InMemoryReportStore {
    fn save(&self, mut report: Report) -> BoxFuture<'static, Result<Report, StoreError>> {
        let documents = Arc::clone(&self.documents);

        (async move {
            if report.id.is_none() {
                report.id = Some(Uuid::new_v4().to_string());
            }
            documents.write().await.push(report.clone());
            Ok(report)
        }).boxed()
    }

    fn find(&self, query: ReportQuery) -> ReportStream {
        let documents = Arc::clone(&self.documents);
        let scan = Scan {
            to_skip: query.skip.map(to_usize).unwrap_or(0),
            remaining: query.limit.map(to_usize).unwrap_or(usize::MAX),
            position: 0,
            query,
        };

        stream
            ::unfold(scan, move |scan| next_scan_chunk(Arc::clone(&documents), scan))
            .flat_map(stream::iter)
            .boxed()
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
