use std::{ sync::Arc, time::Instant };

use tracing::{ info, warn };

use crate::{
    dto::ReportCreation,
    models::Report,
    repositories::{ ReportStore, ReportStream, StoreError },
    services::pagination::{ build_query, Pageable },
    utils::ReportGenerator,
};

/// Saves handed out before the dispatch loop yields back to the runtime.
pub const DISPATCH_BATCH: u64 = 1024;

/// Listing and bulk creation on top of a report store and a report generator.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    generator: Arc<dyn ReportGenerator>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>, generator: Arc<dyn ReportGenerator>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    /// Saves one report and waits for the stored copy.
    pub async fn create(&self, report: Report) -> Result<Report, StoreError> {
        self.store.save(report).await
    }

    /// Streams the enabled reports of a page, optionally for a single group.
    pub fn get_all(&self, group: Option<&str>, pageable: Pageable) -> ReportStream {
        self.store.find(build_query(group, pageable))
    }

    /// Dispatches `creation.amount` detached saves and returns without waiting for them.
    ///
    /// Each generated report is saved on its own `tokio` task; a failed save is logged and
    /// dropped. The loop yields every `DISPATCH_BATCH` reports so a large `amount` does not
    /// hold a worker thread for the whole dispatch.
    pub async fn create_reports(&self, creation: ReportCreation) -> ReportCreation {
        let started = Instant::now();

        for n in 0..creation.amount {
            if n > 0 && n % DISPATCH_BATCH == 0 {
                tokio::task::yield_now().await;
            }

            let report = self.generator.generate(&creation.group);
            let save = self.store.save(report);

            tokio::spawn(async move {
                if let Err(e) = save.await {
                    warn!(error = %e, "Detached report save failed");
                }
            });
        }

        info!(
            "Time elapsed for ({}): {}",
            creation.amount,
            started.elapsed().as_millis()
        );

        creation
    }
}
