// src/portals/careers.rs
use async_trait::async_trait;

use super::{Portal, PortalPosting};
use crate::error::Result;
use crate::recruit::mapping::apply_url;
use crate::recruit::JobSummary;

/// The provider's hosted careers page. Openings appear there once created,
/// so publishing only resolves the public link.
pub struct CareersPortal {
    careers_url: String,
}

impl CareersPortal {
    pub fn new(careers_url: &str) -> Self {
        Self {
            careers_url: careers_url.to_string(),
        }
    }
}

#[async_trait]
impl Portal for CareersPortal {
    fn name(&self) -> &str {
        "careers"
    }

    async fn publish(&self, job: &JobSummary) -> Result<PortalPosting> {
        Ok(PortalPosting {
            portal: self.name().to_string(),
            reference: job.id.clone(),
            url: Some(apply_url(&self.careers_url, &job.id)),
        })
    }
}
