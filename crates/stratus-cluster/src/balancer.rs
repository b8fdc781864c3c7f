//! Balancer switch.
//!
//! A tri-state flag (unknown, on, off) stored in an `AtomicU8`.
//! Lock-free and safe for concurrent access.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::info;

use crate::collaborators::BalancerState;

const UNKNOWN: u8 = 0;
const ON: u8 = 1;
const OFF: u8 = 2;

/// Whether automatic rebalancing is enabled.
#[derive(Debug)]
pub struct BalancerSwitch {
    state: AtomicU8,
}

impl BalancerSwitch {
    /// A switch whose state is not yet known.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(UNKNOWN),
        }
    }

    /// A switch starting in the given state.
    pub fn with_state(on: bool) -> Self {
        let switch = Self::new();
        switch.state.store(encode(on), Ordering::Release);
        switch
    }

    /// Set the switch, returning the previous state.
    pub fn set(&self, on: bool) -> Option<bool> {
        let prev = decode(self.state.swap(encode(on), Ordering::AcqRel));
        if prev != Some(on) {
            info!(balancer_on = on, "balancer switch changed");
        }
        prev
    }
}

impl Default for BalancerSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl BalancerState for BalancerSwitch {
    fn is_balancer_on(&self) -> Option<bool> {
        decode(self.state.load(Ordering::Acquire))
    }
}

fn encode(on: bool) -> u8 {
    if on { ON } else { OFF }
}

fn decode(state: u8) -> Option<bool> {
    match state {
        ON => Some(true),
        OFF => Some(false),
        _ => None,
    }
}
