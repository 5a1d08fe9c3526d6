use crate::constants::{DEFAULT_MAX_PAGES, PAGE_SIZE};
use crate::envelope::{self, TransactionRecord};
use crate::error::{DashboardError, EnvelopeError};
use crate::metrics::{ENVELOPES_SKIPPED, PAGES_WALKED};
use crate::node::NodeApi;

/// Walks the node's transaction list page by page until it returns an empty page.
#[derive(Debug)]
pub struct PageWalker<'a, N> {
    node: &'a N,
    page_size: u64,
    max_pages: Option<u64>,
}

impl<'a, N: NodeApi> PageWalker<'a, N> {
    pub fn new(node: &'a N) -> Self {
        Self {
            node,
            page_size: PAGE_SIZE,
            max_pages: Some(DEFAULT_MAX_PAGES),
        }
    }

    /// Cap the number of page requests per walk, including the final empty page.
    /// `None` lets the walk run until the node returns an empty page.
    pub fn max_pages(mut self, max_pages: Option<u64>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Fetch every page and decode each envelope's signing time.
    ///
    /// Envelopes without a usable signing time are skipped. A structurally
    /// invalid envelope, or any upstream failure, aborts the walk.
    pub async fn walk_all(&self) -> Result<Vec<TransactionRecord>, DashboardError> {
        let mut records = Vec::new();
        let mut skipped: u64 = 0;
        let mut page: u64 = 0;

        loop {
            if let Some(max) = self.max_pages {
                if page >= max {
                    tracing::error!(
                        pages = page,
                        records = records.len(),
                        "node kept returning transactions, giving up"
                    );
                    return Err(DashboardError::PageLimitExceeded(max));
                }
            }

            let start = page * self.page_size;
            let end = start + self.page_size;
            let envelopes = self.node.transactions(start, end).await?;
            PAGES_WALKED.inc();

            if envelopes.is_empty() {
                break;
            }

            for item in &envelopes {
                match envelope::decode(item) {
                    Ok(record) => records.push(record),
                    Err(EnvelopeError::MissingTimestamp) => {
                        tracing::warn!(start, "TX with invalid signing time, skipping");
                        ENVELOPES_SKIPPED.inc();
                        skipped += 1;
                    }
                    Err(e) => {
                        tracing::error!(start, error = %e, "aborting transaction walk");
                        return Err(e.into());
                    }
                }
            }
            page += 1;
        }

        tracing::debug!(
            pages = page + 1,
            records = records.len(),
            skipped,
            "transaction walk complete"
        );
        Ok(records)
    }
}
