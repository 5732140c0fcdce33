//! Session state machines.
//!
//! One machine per vendor channel. Each implements the channel's callback
//! trait, advances its own state word, and enqueues everything of interest
//! onto the inbound buffer. Callbacks do no classification and call no
//! downstream handler; that all happens on the dispatcher thread.
//!
//! The state word is the single source of truth for availability: there is
//! no separate "connected" flag to drift out of sync with it.

mod market_data;
mod trader;

pub use market_data::MdSession;
pub use trader::TraderSession;

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of one vendor session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// No front connection (initial state, and after any disconnect)
    Disconnected = 0,
    /// TCP session up, not yet logged in
    FrontConnected = 1,
    /// Authenticate request in flight (trading channel only)
    Authenticating = 2,
    /// Login acknowledged; the channel is usable
    LoggedIn = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::FrontConnected,
            2 => Self::Authenticating,
            3 => Self::LoggedIn,
            _ => Self::Disconnected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::FrontConnected => "front-connected",
            Self::Authenticating => "authenticating",
            Self::LoggedIn => "logged-in",
        }
    }
}

/// Lock-free state word shared between vendor callbacks and caller threads
#[derive(Debug)]
pub(crate) struct AtomicSessionState(AtomicU8);

impl AtomicSessionState {
    pub fn new() -> Self {
        Self(AtomicU8::new(SessionState::Disconnected as u8))
    }

    pub fn load(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, state: SessionState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Set the new state, returning the previous one
    pub fn swap(&self, state: SessionState) -> SessionState {
        SessionState::from_u8(self.0.swap(state as u8, Ordering::AcqRel))
    }

    pub fn is_logged_in(&self) -> bool {
        self.load() == SessionState::LoggedIn
    }
}
