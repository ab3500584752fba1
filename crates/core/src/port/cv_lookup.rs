// CV / Resume lookup port
//
// File storage lives elsewhere; the core only needs the primary document URL.

use crate::domain::CandidateId;
use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CvLookup: Send + Sync {
    /// Primary CV URL for a candidate, if one has been uploaded
    async fn primary_cv_url(&self, candidate_id: &CandidateId) -> Result<Option<String>>;
}
