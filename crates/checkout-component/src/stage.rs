//! Lifecycle Stages

use std::fmt;

/// Stages of one checkout attempt.
///
/// Exactly one terminal outcome (`Completed`, `Cancelled`, `Errored`) is
/// reached per render cycle; a declined instrument detours through
/// `DeclinedRetry` back to `AwaitingInteraction` instead of terminating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Configuring,
    SdkLoading,
    Rendering,
    AwaitingInteraction,
    Capturing,
    Completed,
    DeclinedRetry,
    Cancelled,
    Errored,
}

impl Stage {
    /// Whether `next` is a legal successor of `self`.
    ///
    /// `Configuring` is additionally reachable from `AwaitingInteraction` and
    /// every terminal stage: re-mounting starts a fresh render cycle whenever
    /// no capture is in flight.
    pub fn can_transition(self, next: Stage) -> bool {
        use Stage::{
            AwaitingInteraction, Cancelled, Capturing, Completed, Configuring, DeclinedRetry,
            Errored, Idle, Rendering, SdkLoading,
        };
        matches!(
            (self, next),
            (Idle | AwaitingInteraction | Completed | Cancelled | Errored, Configuring)
                | (Configuring, SdkLoading)
                | (SdkLoading, Rendering)
                | (Rendering, AwaitingInteraction)
                | (AwaitingInteraction, Capturing | Cancelled | Errored)
                | (Capturing, Completed | DeclinedRetry | Errored)
                | (DeclinedRetry, AwaitingInteraction)
                | (Configuring | SdkLoading | Rendering, Errored)
        )
    }

    /// Whether the attempt is over.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Completed | Stage::Cancelled | Stage::Errored)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Configuring => "configuring",
            Stage::SdkLoading => "sdk_loading",
            Stage::Rendering => "rendering",
            Stage::AwaitingInteraction => "awaiting_interaction",
            Stage::Capturing => "capturing",
            Stage::Completed => "completed",
            Stage::DeclinedRetry => "declined_retry",
            Stage::Cancelled => "cancelled",
            Stage::Errored => "errored",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
