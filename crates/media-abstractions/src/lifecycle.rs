//! Source/sink lifecycle state machine
//!
//! Every media source and sink moves through the same four states:
//! `Created -> Started <-> Paused -> Closed`, with `Closed` terminal.
//! [`Lifecycle`] owns the current state and enforces the transition table,
//! so the concrete components only decide *when* to transition, never
//! *whether* a transition is legal. A failed transition leaves the state
//! unchanged.

use crate::error::MediaError;
use std::fmt;
use tracing::debug;

/// Lifecycle state of a media source or sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MediaState {
    /// Constructed but not yet producing/consuming samples
    Created,
    /// Actively producing or ingesting samples
    Started,
    /// Suspended; resources held, samples produced in this state are lost
    Paused,
    /// Terminal; all resources released, every operation fails
    Closed,
}

impl fmt::Display for MediaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Started => write!(f, "started"),
            Self::Paused => write!(f, "paused"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// State holder with checked transitions
///
/// Embedded by concrete sources and sinks. Not internally synchronized:
/// a single external owner is assumed to drive the lifecycle calls.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: MediaState,
}

impl Lifecycle {
    /// Create a new lifecycle in the `Created` state
    pub fn new() -> Self {
        Self {
            state: MediaState::Created,
        }
    }

    /// Current state
    pub fn state(&self) -> MediaState {
        self.state
    }

    /// Whether the component is currently started
    pub fn is_started(&self) -> bool {
        self.state == MediaState::Started
    }

    /// Whether the component is currently paused
    pub fn is_paused(&self) -> bool {
        self.state == MediaState::Paused
    }

    /// Whether the component has been closed
    pub fn is_closed(&self) -> bool {
        self.state == MediaState::Closed
    }

    /// Transition `Created -> Started`
    pub fn start(&mut self) -> Result<(), MediaError> {
        match self.state {
            MediaState::Created => {
                self.transition(MediaState::Started);
                Ok(())
            }
            MediaState::Closed => Err(MediaError::Closed),
            from => Err(MediaError::InvalidTransition {
                from,
                operation: "start",
            }),
        }
    }

    /// Transition `Started -> Paused`
    pub fn pause(&mut self) -> Result<(), MediaError> {
        match self.state {
            MediaState::Started => {
                self.transition(MediaState::Paused);
                Ok(())
            }
            MediaState::Closed => Err(MediaError::Closed),
            from => Err(MediaError::InvalidTransition {
                from,
                operation: "pause",
            }),
        }
    }

    /// Transition `Paused -> Started`
    pub fn resume(&mut self) -> Result<(), MediaError> {
        match self.state {
            MediaState::Paused => {
                self.transition(MediaState::Started);
                Ok(())
            }
            MediaState::Closed => Err(MediaError::Closed),
            from => Err(MediaError::InvalidTransition {
                from,
                operation: "resume",
            }),
        }
    }

    /// Transition to `Closed` from any state; idempotent once closed
    pub fn close(&mut self) {
        if self.state != MediaState::Closed {
            self.transition(MediaState::Closed);
        }
    }

    /// Fail with [`MediaError::Closed`] if the component has been closed
    pub fn ensure_open(&self) -> Result<(), MediaError> {
        if self.is_closed() {
            Err(MediaError::Closed)
        } else {
            Ok(())
        }
    }

    /// Check that the active format may be (re)pinned right now
    ///
    /// Format changes are accepted in `Created` and `Paused` only; changing
    /// the format of a running component is rejected rather than risking
    /// silently dropped in-flight samples.
    pub fn ensure_format_change_allowed(&self) -> Result<(), MediaError> {
        match self.state {
            MediaState::Created | MediaState::Paused => Ok(()),
            MediaState::Closed => Err(MediaError::Closed),
            from => Err(MediaError::InvalidTransition {
                from,
                operation: "set format",
            }),
        }
    }

    fn transition(&mut self, to: MediaState) {
        debug!("media lifecycle transition: {} -> {}", self.state, to);
        self.state = to;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
