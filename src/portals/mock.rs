// src/portals/mock.rs
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use super::{Portal, PortalPosting};
use crate::error::{RelayError, Result};
use crate::recruit::JobSummary;

/// Board that accepts everything and remembers nothing. For demos and tests.
#[derive(Default)]
pub struct MockPortal {
    published: AtomicU64,
}

impl MockPortal {
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Portal for MockPortal {
    fn name(&self) -> &str {
        "mock"
    }

    async fn publish(&self, job: &JobSummary) -> Result<PortalPosting> {
        let title = job.title.as_deref().unwrap_or_default();
        if title.trim().is_empty() {
            return Err(RelayError::Validation("job has no title".to_string()));
        }

        let sequence = self.published.fetch_add(1, Ordering::Relaxed) + 1;
        info!("Mock portal posting '{}' ({})", title, job.id);

        Ok(PortalPosting {
            portal: self.name().to_string(),
            reference: format!("mock-{}-{}", job.id, sequence),
            url: None,
        })
    }
}
