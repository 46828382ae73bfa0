//! Listing source whose responses are released by the test.
//!
//! Every `list` call parks on a oneshot channel until the test calls
//! [`GatedListingSource::release`], so overlapping refreshes can be resolved
//! in any order.

use ignore_tree_ports::{BoxFuture, FileEntry, FolderId, ListingRequest, ListingSourcePort};
use ignore_tree_shared::{ErrorEnvelope, RequestContext, Result};
use std::sync::Mutex;
use tokio::sync::{Notify, oneshot};

struct Gate {
    request: ListingRequest,
    reply: oneshot::Sender<Result<Vec<FileEntry>>>,
}

/// Listing source resolved on demand.
#[derive(Default)]
pub struct GatedListingSource {
    gates: Mutex<Vec<Gate>>,
    requests: Mutex<Vec<ListingRequest>>,
    requested: Notify,
}

impl GatedListingSource {
    /// Create a source with no pending requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far, released or not.
    pub fn requests(&self) -> Vec<ListingRequest> {
        self.requests.lock().expect("request lock").clone()
    }

    /// Number of requests still waiting for a response.
    pub fn pending(&self) -> usize {
        self.gates.lock().expect("gate lock").len()
    }

    /// Wait until at least `count` requests have been received.
    pub async fn wait_for_requests(&self, count: usize) {
        loop {
            let notified = self.requested.notified();
            if self.requests.lock().expect("request lock").len() >= count {
                return;
            }
            notified.await;
        }
    }

    /// Answer the oldest pending request for `folder`.
    ///
    /// Returns false when nothing is pending for that folder.
    pub fn release(&self, folder: &FolderId, response: Result<Vec<FileEntry>>) -> bool {
        let gate = {
            let mut gates = self.gates.lock().expect("gate lock");
            gates
                .iter()
                .position(|gate| &gate.request.folder == folder)
                .map(|position| gates.remove(position))
        };
        gate.is_some_and(|gate| gate.reply.send(response).is_ok())
    }
}

impl ListingSourcePort for GatedListingSource {
    fn list(
        &self,
        _ctx: &RequestContext,
        request: ListingRequest,
    ) -> BoxFuture<'_, Result<Vec<FileEntry>>> {
        let (reply, response) = oneshot::channel();
        self.requests
            .lock()
            .expect("request lock")
            .push(request.clone());
        self.gates
            .lock()
            .expect("gate lock")
            .push(Gate { request, reply });
        self.requested.notify_waiters();
        Box::pin(async move {
            response
                .await
                .unwrap_or_else(|_| Err(ErrorEnvelope::cancelled("listing gate dropped")))
        })
    }
}
