//! Reports describing what a single datagram did to the reassembler.

use std::{fmt, num::NonZeroUsize};

use super::CompletedFrame;

/// Coverage of the in-flight frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Distinct byte positions written so far.
    pub covered: usize,
    /// Declared frame length.
    pub total: usize,
}

impl Progress {
    /// Bytes still missing.
    #[must_use]
    pub const fn missing(&self) -> usize { self.total.saturating_sub(self.covered) }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.covered, self.total)
    }
}

/// Why a datagram left the reassembler untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Sentinel present but fewer than 12 bytes; split headers are not
    /// buffered.
    ShortHeader,
    /// Fewer than 4 bytes, so no offset can be read.
    ShortFragment,
    /// A fragment arrived with no frame in progress.
    Idle,
    /// The fragment starts at or past the end of the in-flight frame.
    OffsetOutOfRange { offset: u32, total_size: usize },
    /// The fragment carries no bytes.
    EmptyPayload,
    /// The header declares a frame larger than the configured cap.
    FrameTooLarge { declared: u32, limit: NonZeroUsize },
}

impl DropReason {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ShortHeader => "short_header",
            Self::ShortFragment => "short_fragment",
            Self::Idle => "idle",
            Self::OffsetOutOfRange { .. } => "offset_out_of_range",
            Self::EmptyPayload => "empty_payload",
            Self::FrameTooLarge { .. } => "frame_too_large",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortHeader => f.write_str("header datagram shorter than 12 bytes"),
            Self::ShortFragment => f.write_str("fragment datagram shorter than 4 bytes"),
            Self::Idle => f.write_str("fragment received with no frame in progress"),
            Self::OffsetOutOfRange { offset, total_size } => {
                write!(f, "fragment offset {offset} outside frame of {total_size} bytes")
            }
            Self::EmptyPayload => f.write_str("fragment carries no payload"),
            Self::FrameTooLarge { declared, limit } => {
                write!(f, "header declares {declared} bytes, limit is {limit}")
            }
        }
    }
}

/// State change caused by one datagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedEvent {
    /// A header started a new frame that is not yet complete.
    Started { total_size: usize },
    /// A fragment was merged into the in-flight frame. `newly_covered` is
    /// zero for a pure duplicate.
    Progressed {
        newly_covered: usize,
        progress: Progress,
    },
    /// The frame is fully covered; the reassembler is idle again.
    Completed(CompletedFrame),
    /// The datagram was ignored.
    Dropped(DropReason),
}

/// Result of [`Reassembler::ingest`](super::Reassembler::ingest).
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct FeedOutcome {
    /// What the datagram did.
    pub event: FeedEvent,
    /// Coverage of an incomplete frame discarded because this datagram was a
    /// header. Superseded frames are never delivered.
    pub superseded: Option<Progress>,
}

impl FeedOutcome {
    pub(crate) const fn new(event: FeedEvent) -> Self {
        Self {
            event,
            superseded: None,
        }
    }

    pub(crate) const fn dropped(reason: DropReason) -> Self { Self::new(FeedEvent::Dropped(reason)) }

    pub(crate) fn superseding(mut self, superseded: Option<Progress>) -> Self {
        self.superseded = superseded;
        self
    }

    /// Return the completed frame, if this datagram finished one.
    #[must_use]
    pub fn into_completed(self) -> Option<CompletedFrame> {
        match self.event {
            FeedEvent::Completed(frame) => Some(frame),
            _ => None,
        }
    }

    /// Return the reason the datagram was ignored, if it was.
    #[must_use]
    pub fn drop_reason(&self) -> Option<DropReason> {
        match self.event {
            FeedEvent::Dropped(reason) => Some(reason),
            _ => None,
        }
    }

    /// Report whether this datagram completed a frame.
    #[must_use]
    pub const fn is_completed(&self) -> bool { matches!(self.event, FeedEvent::Completed(_)) }
}
