//! One-shot completion signalling between audio resources and the player
//!
//! Every resource bound by a playback session is tagged with a
//! [`PlaybackToken`]. When the resource reaches its natural end it fires its
//! [`CompletionSignal`], which posts the token into a [`CompletionSink`].
//! The receiver compares the token against the currently bound one, so a
//! completion from a resource that has since been released is recognisably
//! stale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Generation tag of one bound audio resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaybackToken(u64);

impl PlaybackToken {
    /// Create a token with an explicit generation
    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    /// Raw generation value
    pub const fn generation(self) -> u64 {
        self.0
    }

    /// Token for the next generation
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for PlaybackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receiver side of completion signals
///
/// Called from whatever thread the audio engine runs its end-of-track
/// detection on. Implementations must not block.
pub type CompletionSink = Arc<dyn Fn(PlaybackToken) + Send + Sync>;

/// "Track ended" notification for exactly one resource
///
/// `fire` consumes the signal, so it can be delivered at most once. Dropping
/// the signal without firing it (e.g. when a resource is released manually)
/// means no completion is ever delivered for that resource.
pub struct CompletionSignal {
    token: PlaybackToken,
    sink: CompletionSink,
}

impl CompletionSignal {
    /// Create a signal that will post `token` into `sink`
    pub fn new(token: PlaybackToken, sink: CompletionSink) -> Self {
        Self { token, sink }
    }

    /// Token of the resource this signal belongs to
    pub fn token(&self) -> PlaybackToken {
        self.token
    }

    /// Deliver the completion
    pub fn fire(self) {
        (self.sink)(self.token);
    }
}

impl fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSignal")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
