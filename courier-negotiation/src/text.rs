//! Endpoints that speak the text codec instead of typed messages.

use tokio::sync::mpsc;

use crate::endpoint::VehicleHandle;
use crate::messages::{CommitReply, ProposalReply, RefusalReason, VehicleMessage};
use crate::wire;

const INBOX_CAPACITY: usize = 16;

/// Produces the text answer to one text payload.
pub trait TextResponder: Send + 'static {
    /// Answer `content`, a call or a commit payload.
    fn respond(&mut self, content: &str) -> String;
}

impl<F> TextResponder for F
where
    F: FnMut(&str) -> String + Send + 'static,
{
    fn respond(&mut self, content: &str) -> String {
        self(content)
    }
}

/// Adapter that lets the coordinator negotiate with a text responder.
///
/// Calls and commits are encoded with [`wire`], answers are decoded back
/// into typed replies and anything unreadable is treated as an invalid
/// request. The responder owns its own route feasibility. Status requests
/// go unanswered, so surveys skip text endpoints.
#[derive(Debug)]
pub struct TextEndpoint<R> {
    id: String,
    responder: R,
}

impl<R: TextResponder> TextEndpoint<R> {
    /// Wrap `responder` as vehicle `id`.
    pub fn new(id: impl Into<String>, responder: R) -> Self {
        Self {
            id: id.into(),
            responder,
        }
    }

    /// Run the adapter on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(self) -> VehicleHandle {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let handle = VehicleHandle::new(self.id.clone(), sender);
        tokio::spawn(self.run(inbox));
        handle
    }

    /// Serve messages until the channel closes.
    pub async fn run(mut self, mut inbox: mpsc::Receiver<VehicleMessage>) {
        while let Some(message) = inbox.recv().await {
            self.handle(message);
        }
        log::debug!("{}: text inbox closed", self.id);
    }

    fn handle(&mut self, message: VehicleMessage) {
        match message {
            VehicleMessage::Proposal { call, reply } => {
                let answer = self.responder.respond(&wire::encode_call(&call));
                let decoded = wire::decode_reply(&answer).unwrap_or_else(|err| {
                    log::warn!("{}: {err}", self.id);
                    ProposalReply::Refuse(RefusalReason::InvalidRequest)
                });
                let _ignored = reply.send(decoded);
            }
            VehicleMessage::Commit { commit, reply } => {
                let answer = self.responder.respond(&wire::encode_commit(&commit));
                let decoded = wire::decode_commit_reply(&answer).unwrap_or_else(|| {
                    log::warn!("{}: unreadable commit answer {answer:?}", self.id);
                    CommitReply::Refuse(RefusalReason::InvalidRequest)
                });
                let _ignored = reply.send(decoded);
            }
            VehicleMessage::Status { reply } => drop(reply),
            VehicleMessage::Route(route) => {
                log::info!(
                    "{}: route size={} distance={:.1}",
                    self.id,
                    route.stops.len(),
                    route.distance
                );
            }
        }
    }
}
