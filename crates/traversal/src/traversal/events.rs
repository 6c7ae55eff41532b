//! Traversal event publication.
//!
//! Side effects (audio, particles, HUD, statistics) never live inside the
//! traversal systems. Each observable occurrence is published as a
//! [`TraversalEvent`] through the [`EventHub`], and any number of
//! collaborators subscribe independently without overwriting each other.
//! Delivery is synchronous and in subscription order, so behavior stays
//! deterministic under the fixed-tick loop.

use serde::{Deserialize, Serialize};

use super::jetpack::JetpackPhase;
use super::mantle::MantlePhase;
use crate::probe::SurfaceKind;

/// An observable traversal occurrence, fired once per occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TraversalEvent {
    /// A jump impulse was applied.
    Jumped,

    /// Ground contact was (re)established.
    Landed {
        /// Downward speed at the moment of contact (positive, m/s).
        impact_speed: f32,
        /// What was landed on; picks the audio/decal cue.
        surface: SurfaceKind,
    },

    /// A landing exceeded the fall-damage threshold.
    FallDamage {
        /// Damage amount, scaled by excess impact speed.
        amount: f32,
    },

    /// A jetpack boost began.
    BoostStarted,

    /// A jetpack boost ended (depletion, duration cap, or explicit stop).
    BoostEnded,

    /// Jetpack fuel level changed.
    FuelChanged {
        /// Current fuel.
        fuel: f32,
        /// Tank capacity.
        max_fuel: f32,
    },

    /// The jetpack state machine changed phase.
    JetpackPhaseChanged { phase: JetpackPhase },

    /// The mantle state machine changed phase.
    MantlePhaseChanged { phase: MantlePhase },
}

/// Subscriber list for traversal events.
///
/// Subscribers are boxed closures invoked synchronously on every emit.
/// There is no unsubscribe; the hub lives and dies with the owning
/// player session.
#[derive(Default)]
pub struct EventHub {
    sinks: Vec<Box<dyn FnMut(&TraversalEvent)>>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.sinks.len())
            .finish()
    }
}

impl EventHub {
    /// Create a hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Called for every subsequent event.
    pub fn subscribe(&mut self, sink: impl FnMut(&TraversalEvent) + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sinks.len()
    }

    /// Publish an event to all subscribers.
    pub fn emit(&mut self, event: TraversalEvent) {
        log::trace!("traversal event: {:?}", event);
        for sink in &mut self.sinks {
            sink(&event);
        }
    }
}
