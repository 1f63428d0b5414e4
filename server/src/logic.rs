use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use sketchpad_shared::{SignalClientMessage, SignalEvent, SignalServerMessage};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::state::SignalChannel;

pub enum Outcome {
    /// Deliver to every peer, sender included.
    Broadcast(SignalServerMessage),
    /// Deliver to the sender only.
    Reply(SignalServerMessage),
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

pub fn apply_client_message(
    channel: &mut SignalChannel,
    message: SignalClientMessage,
    now_ms: u64,
    freshness_ms: u64,
) -> Outcome {
    match message {
        SignalClientMessage::Send { signal } => {
            let signal = signal.sanitized();
            if !signal.is_fresh(now_ms, freshness_ms) {
                return Outcome::Reply(SignalServerMessage::Rejected {
                    reason: format!(
                        "signal timestamp {} is outside the {freshness_ms}ms window",
                        signal.timestamp_ms
                    ),
                });
            }
            // Sender clocks differ, so ordering only decides what gets replayed.
            if channel
                .latest
                .as_ref()
                .map_or(true, |latest| signal.timestamp_ms >= latest.timestamp_ms)
            {
                channel.latest = Some(signal.clone());
            }
            Outcome::Broadcast(SignalServerMessage::Received { signal })
        }
    }
}

/// The signal a newly connected peer should see right away, if any.
pub fn replay_for_new_peer(
    channel: &SignalChannel,
    now_ms: u64,
    freshness_ms: u64,
) -> Option<SignalEvent> {
    channel
        .latest
        .as_ref()
        .filter(|signal| signal.is_fresh(now_ms, freshness_ms))
        .cloned()
}

pub async fn broadcast_all(channel: &Arc<RwLock<SignalChannel>>, message: SignalServerMessage) {
    let mut stale = Vec::new();
    {
        let channel = channel.read().await;
        for (id, tx) in channel.peers.iter() {
            if tx.send(message.clone()).is_err() {
                stale.push(*id);
            }
        }
    }

    if !stale.is_empty() {
        let mut channel = channel.write().await;
        for id in stale {
            channel.peers.remove(&id);
        }
        tracing::debug!(peers = channel.peers.len(), "pruned closed signal peers");
    }
}

pub async fn send_to(
    channel: &Arc<RwLock<SignalChannel>>,
    peer: Uuid,
    message: SignalServerMessage,
) {
    let failed = {
        let channel = channel.read().await;
        channel
            .peers
            .get(&peer)
            .is_some_and(|tx| tx.send(message).is_err())
    };
    if failed {
        channel.write().await.peers.remove(&peer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchpad_shared::SIGNAL_FRESHNESS_MS;
    use tokio::sync::mpsc;

    fn send(sender: &str, timestamp_ms: u64) -> SignalClientMessage {
        SignalClientMessage::Send {
            signal: SignalEvent::new(sender, "ping", timestamp_ms),
        }
    }

    #[test]
    fn fresh_signal_is_broadcast_and_remembered() {
        let mut channel = SignalChannel::default();
        let outcome = apply_client_message(&mut channel, send("ana", 10_000), 11_000, SIGNAL_FRESHNESS_MS);
        let Outcome::Broadcast(SignalServerMessage::Received { signal }) = outcome else {
            panic!("expected broadcast");
        };
        assert_eq!(signal.sender, "ana");
        assert_eq!(channel.latest, Some(signal));
    }

    #[test]
    fn stale_signal_is_rejected_to_sender_only() {
        let mut channel = SignalChannel::default();
        let outcome = apply_client_message(&mut channel, send("ana", 1_000), 7_000, SIGNAL_FRESHNESS_MS);
        assert!(matches!(
            outcome,
            Outcome::Reply(SignalServerMessage::Rejected { .. })
        ));
        assert!(channel.latest.is_none());
    }

    #[test]
    fn out_of_order_signal_does_not_replace_newer_one() {
        let mut channel = SignalChannel::default();
        apply_client_message(&mut channel, send("a", 9_000), 9_500, SIGNAL_FRESHNESS_MS);
        let outcome = apply_client_message(&mut channel, send("b", 8_000), 9_500, SIGNAL_FRESHNESS_MS);
        assert!(matches!(outcome, Outcome::Broadcast(_)));
        assert_eq!(channel.latest.as_ref().map(|s| s.sender.as_str()), Some("a"));
    }

    #[test]
    fn fresh_signal_behind_a_fast_clock_is_still_broadcast() {
        let mut channel = SignalChannel::default();
        let ahead = apply_client_message(&mut channel, send("a", 12_000), 10_000, SIGNAL_FRESHNESS_MS);
        assert!(matches!(ahead, Outcome::Broadcast(_)));

        let outcome = apply_client_message(&mut channel, send("b", 11_000), 11_000, SIGNAL_FRESHNESS_MS);
        let Outcome::Broadcast(SignalServerMessage::Received { signal }) = outcome else {
            panic!("fresh signal should be broadcast");
        };
        assert_eq!(signal.sender, "b");
        assert_eq!(channel.latest.as_ref().map(|s| s.sender.as_str()), Some("a"));
    }

    #[test]
    fn same_millisecond_signals_are_both_broadcast() {
        let mut channel = SignalChannel::default();
        let first = apply_client_message(&mut channel, send("a", 10_000), 10_000, SIGNAL_FRESHNESS_MS);
        let second = apply_client_message(&mut channel, send("b", 10_000), 10_000, SIGNAL_FRESHNESS_MS);
        assert!(matches!(first, Outcome::Broadcast(_)));
        assert!(matches!(second, Outcome::Broadcast(_)));
        assert_eq!(channel.latest.as_ref().map(|s| s.sender.as_str()), Some("b"));
    }

    #[test]
    fn replay_only_while_fresh() {
        let mut channel = SignalChannel::default();
        apply_client_message(&mut channel, send("a", 10_000), 10_000, SIGNAL_FRESHNESS_MS);
        assert!(replay_for_new_peer(&channel, 14_000, SIGNAL_FRESHNESS_MS).is_some());
        assert!(replay_for_new_peer(&channel, 16_000, SIGNAL_FRESHNESS_MS).is_none());
    }

    #[tokio::test]
    async fn broadcast_reaches_peers_and_prunes_closed_ones() {
        let channel = Arc::new(RwLock::new(SignalChannel::default()));
        let (live_tx, mut live_rx) = mpsc::unbounded_channel();
        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        drop(dead_rx);
        let live = Uuid::new_v4();
        {
            let mut guard = channel.write().await;
            guard.peers.insert(live, live_tx);
            guard.peers.insert(Uuid::new_v4(), dead_tx);
        }

        let message = SignalServerMessage::Received {
            signal: SignalEvent::new("a", "hi", 1),
        };
        broadcast_all(&channel, message.clone()).await;

        assert_eq!(live_rx.recv().await, Some(message));
        let guard = channel.read().await;
        assert_eq!(guard.peers.len(), 1);
        assert!(guard.peers.contains_key(&live));
    }

    #[tokio::test]
    async fn send_to_targets_one_peer() {
        let channel = Arc::new(RwLock::new(SignalChannel::default()));
        let (a_tx, mut a_rx) = mpsc::unbounded_channel();
        let (b_tx, mut b_rx) = mpsc::unbounded_channel();
        let a = Uuid::new_v4();
        {
            let mut guard = channel.write().await;
            guard.peers.insert(a, a_tx);
            guard.peers.insert(Uuid::new_v4(), b_tx);
        }
        let reply = SignalServerMessage::Rejected {
            reason: "stale".into(),
        };
        send_to(&channel, a, reply.clone()).await;
        assert_eq!(a_rx.recv().await, Some(reply));
        assert!(b_rx.try_recv().is_err());
    }
}
