//! Peer scheduling state for smooth weighted round robin.
//!
//! # Responsibilities
//! - Hold per-tag weight and ramp state (`current_weight`, `effective_weight`)
//! - Create peers lazily the first round their tag is alive
//! - Evict peers as soon as their tag leaves the candidate set
//! - Run the selection round

use std::collections::{BTreeMap, HashMap};
use crate::balancer::weight::MAX_WEIGHT;

/// A schedulable outbound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    tag: String,
    /// Fixed at creation; a changed weight table needs eviction to take effect.
    weight: i64,
    current_weight: i64,
    /// Always in `(0, weight]`; only ever ramps back up toward `weight`.
    effective_weight: i64,
}

impl Peer {
    fn new(tag: &str, weight: i64) -> Self {
        let weight = weight.clamp(1, MAX_WEIGHT);
        Self {
            tag: tag.to_string(),
            weight,
            current_weight: 0,
            effective_weight: weight,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }

    pub fn current_weight(&self) -> i64 {
        self.current_weight
    }

    pub fn effective_weight(&self) -> i64 {
        self.effective_weight
    }
}

/// Peers keyed by tag.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<String, Peer>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn get(&self, tag: &str) -> Option<&Peer> {
        self.peers.get(tag)
    }

    /// Run one selection round over `status` (tag → alive).
    ///
    /// Peers whose tag is not a key of `status` are evicted first. Alive tags
    /// are visited in key order, so ties go to the smallest tag. Present but
    /// dead tags keep their peer untouched. `resolve` is consulted only when
    /// a peer is created.
    pub fn select<F>(&mut self, status: &BTreeMap<String, bool>, resolve: F) -> Option<String>
    where
        F: Fn(&str) -> i64,
    {
        let before = self.peers.len();
        self.peers.retain(|tag, _| status.contains_key(tag));
        let evicted = before - self.peers.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted peers that left the candidate set");
            crate::observability::metrics::record_peers_evicted(evicted);
        }

        let mut total: i64 = 0;
        let mut best: Option<(&String, i64)> = None;
        for (tag, _) in status.iter().filter(|(_, alive)| **alive) {
            let peer = self.peers.entry(tag.clone()).or_insert_with(|| {
                let peer = Peer::new(tag, resolve(tag));
                tracing::trace!(outbound = %tag, weight = peer.weight, "Peer created");
                peer
            });

            peer.current_weight = peer.current_weight.saturating_add(peer.effective_weight);
            total = total.saturating_add(peer.effective_weight);
            if peer.effective_weight < peer.weight {
                peer.effective_weight += 1;
            }

            if best.map_or(true, |(_, weight)| peer.current_weight > weight) {
                best = Some((tag, peer.current_weight));
            }
        }

        let (tag, _) = best?;
        let peer = self.peers.get_mut(tag)?;
        peer.current_weight = peer.current_weight.saturating_sub(total);
        Some(peer.tag.clone())
    }
}
