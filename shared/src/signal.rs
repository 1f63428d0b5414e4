use std::collections::HashSet;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// How long a sent signal stays deliverable.
pub const SIGNAL_FRESHNESS_MS: u64 = 5_000;
pub const MAX_SENDER_LEN: usize = 64;
pub const MAX_MESSAGE_LEN: usize = 280;
pub const DEFAULT_SENDER: &str = "anonymous";
pub const DEFAULT_MESSAGE: &str = "Signal sent";

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq, Eq)]
pub struct SignalEvent {
    pub sender: String,
    pub timestamp_ms: u64,
    pub message: String,
}

impl SignalEvent {
    pub fn new(sender: impl Into<String>, message: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            sender: sender.into(),
            timestamp_ms,
            message: message.into(),
        }
    }

    /// Fresh means no older than `window_ms` and not further than
    /// `window_ms` in the future, which tolerates small clock skew.
    pub fn is_fresh(&self, now_ms: u64, window_ms: u64) -> bool {
        within_window(self.timestamp_ms, now_ms, window_ms)
    }

    pub fn sanitized(mut self) -> Self {
        self.sender = clean_text(&self.sender, MAX_SENDER_LEN, DEFAULT_SENDER);
        self.message = clean_text(&self.message, MAX_MESSAGE_LEN, DEFAULT_MESSAGE);
        self
    }
}

fn within_window(timestamp_ms: u64, now_ms: u64, window_ms: u64) -> bool {
    now_ms.saturating_sub(timestamp_ms) <= window_ms
        && timestamp_ms.saturating_sub(now_ms) <= window_ms
}

fn clean_text(value: &str, max_chars: usize, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    trimmed.chars().take(max_chars).collect()
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SignalClientMessage {
    #[serde(rename = "signal:send")]
    Send { signal: SignalEvent },
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SignalServerMessage {
    #[serde(rename = "signal:received")]
    Received { signal: SignalEvent },
    #[serde(rename = "signal:rejected")]
    Rejected { reason: String },
}

/// Subscriber-side filter: hands out each signal at most once, and only
/// while it is fresh. A signal is identified by sender and timestamp.
#[derive(Clone, Debug)]
pub struct SignalFeed {
    window_ms: u64,
    delivered: HashSet<(String, u64)>,
}

impl Default for SignalFeed {
    fn default() -> Self {
        Self::new(SIGNAL_FRESHNESS_MS)
    }
}

impl SignalFeed {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            delivered: HashSet::new(),
        }
    }

    pub fn accept(&mut self, event: SignalEvent, now_ms: u64) -> Option<SignalEvent> {
        let window_ms = self.window_ms;
        // Anything outside the window is rejected below, so its key can go.
        self.delivered
            .retain(|(_, timestamp_ms)| within_window(*timestamp_ms, now_ms, window_ms));
        if !event.is_fresh(now_ms, window_ms) {
            return None;
        }
        if !self
            .delivered
            .insert((event.sender.clone(), event.timestamp_ms))
        {
            return None;
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_window_is_inclusive() {
        let event = SignalEvent::new("a", "hi", 10_000);
        assert!(event.is_fresh(10_000, SIGNAL_FRESHNESS_MS));
        assert!(event.is_fresh(15_000, SIGNAL_FRESHNESS_MS));
        assert!(!event.is_fresh(15_001, SIGNAL_FRESHNESS_MS));
        assert!(event.is_fresh(5_000, SIGNAL_FRESHNESS_MS));
        assert!(!event.is_fresh(4_999, SIGNAL_FRESHNESS_MS));
    }

    #[test]
    fn feed_drops_stale_and_repeated_signals() {
        let mut feed = SignalFeed::default();
        let first = SignalEvent::new("a", "hi", 1_000);
        assert_eq!(feed.accept(first.clone(), 2_000), Some(first.clone()));
        assert_eq!(feed.accept(first, 2_500), None);
        assert_eq!(feed.accept(SignalEvent::new("c", "late", 3_000), 9_000), None);
        assert!(feed.accept(SignalEvent::new("d", "new", 8_000), 9_000).is_some());
    }

    #[test]
    fn feed_delivers_fresh_signals_older_than_the_last_one() {
        let mut feed = SignalFeed::default();
        let ahead = SignalEvent::new("a", "hi", 12_000);
        assert!(feed.accept(ahead, 10_000).is_some());
        let behind = SignalEvent::new("b", "hi", 11_000);
        assert_eq!(feed.accept(behind.clone(), 11_000), Some(behind));
    }

    #[test]
    fn feed_keeps_distinct_senders_in_the_same_millisecond() {
        let mut feed = SignalFeed::default();
        assert!(feed.accept(SignalEvent::new("a", "hi", 10_000), 10_000).is_some());
        assert!(feed.accept(SignalEvent::new("c", "hi", 10_000), 10_000).is_some());
        assert!(feed.accept(SignalEvent::new("c", "hi", 10_000), 10_500).is_none());
    }

    #[test]
    fn sanitize_trims_and_defaults() {
        let event = SignalEvent::new("   ", "x".repeat(400), 1).sanitized();
        assert_eq!(event.sender, DEFAULT_SENDER);
        assert_eq!(event.message.chars().count(), MAX_MESSAGE_LEN);
        let event = SignalEvent::new(" Ana ", "", 1).sanitized();
        assert_eq!(event.sender, "Ana");
        assert_eq!(event.message, DEFAULT_MESSAGE);
    }

    #[test]
    fn json_frames_are_tagged() {
        let message = SignalClientMessage::Send {
            signal: SignalEvent::new("a", "hi", 7),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "signal:send");
        assert_eq!(json["signal"]["timestamp_ms"], 7);
    }

    #[test]
    fn binary_frames_decode_back() {
        let message = SignalServerMessage::Rejected {
            reason: "stale".into(),
        };
        let bytes = bincode::encode_to_vec(&message, bincode::config::standard()).unwrap();
        let (decoded, _): (SignalServerMessage, usize) =
            bincode::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        assert_eq!(decoded, message);
    }
}
