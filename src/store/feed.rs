use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::models::Visit;

/// One change to the visits collection. Inserts carry `new_val`; deletes
/// carry only `old_val` and act as tombstones for feed readers.
#[derive(Debug, Clone)]
pub struct Change {
    pub old_val: Option<Visit>,
    pub new_val: Option<Visit>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("visit feed fell behind by {0} changes")]
    Lagged(u64),
}

/// Live subscription to newly created visits.
///
/// Each call to [`VisitFeed::next`] resolves to one of three outcomes: the
/// next visit, the end of the feed (`Ok(None)`), or an error after which the
/// feed should not be read again. Dropping the feed unsubscribes.
#[derive(Debug)]
pub struct VisitFeed {
    changes: broadcast::Receiver<Change>,
}

impl VisitFeed {
    pub(crate) fn new(changes: broadcast::Receiver<Change>) -> Self {
        Self { changes }
    }

    pub async fn next(&mut self) -> Result<Option<Visit>, FeedError> {
        loop {
            match self.changes.recv().await {
                Ok(Change { new_val: Some(visit), .. }) if !visit.id.is_empty() => {
                    return Ok(Some(visit));
                }
                Ok(Change { old_val: Some(visit), new_val: None }) => {
                    tracing::trace!(visit_id = %visit.id, "skipping deleted visit");
                }
                // A visit without an id, or an empty change.
                Ok(_) => continue,
                Err(RecvError::Closed) => return Ok(None),
                Err(RecvError::Lagged(skipped)) => return Err(FeedError::Lagged(skipped)),
            }
        }
    }
}
