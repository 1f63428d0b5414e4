use std::collections::HashMap;
use std::sync::Arc;

use sketchpad_shared::{SignalEvent, SignalServerMessage};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

pub type PeerSender = mpsc::UnboundedSender<SignalServerMessage>;

#[derive(Clone)]
pub struct AppState {
    pub channel: Arc<RwLock<SignalChannel>>,
    pub freshness_ms: u64,
}

impl AppState {
    pub fn new(freshness_ms: u64) -> Self {
        Self {
            channel: Arc::new(RwLock::new(SignalChannel::default())),
            freshness_ms,
        }
    }
}

/// Everyone listening for signals, plus the most recent accepted one so a
/// late subscriber can still see it while it is fresh.
#[derive(Default)]
pub struct SignalChannel {
    pub peers: HashMap<Uuid, PeerSender>,
    pub latest: Option<SignalEvent>,
}
