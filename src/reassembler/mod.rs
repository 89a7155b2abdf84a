//! Inbound state machine that rebuilds frames from unreliable datagrams.
//!
//! [`Reassembler`] holds at most one in-flight frame. A header datagram
//! always starts a fresh frame, silently discarding any incomplete one.
//! Fragment datagrams write byte ranges into that frame in any order and any
//! number of times; a per-byte coverage mask ensures duplicates and overlaps
//! are never counted twice. The frame is handed out exactly once, at the
//! datagram that covers its final missing byte.
//!
//! The reassembler performs no I/O and no logging. Callers that want to
//! report drops or abandoned frames use [`Reassembler::ingest`], which
//! describes every transition; [`Reassembler::feed`] returns only completed
//! frames.

mod frame;
mod outcome;

use std::num::NonZeroUsize;

pub use frame::CompletedFrame;
use frame::InFlightFrame;
pub use outcome::{DropReason, FeedEvent, FeedOutcome, Progress};

use crate::datagram::{self, Datagram, DatagramError, Fragment, FrameHeader};

/// Largest frame accepted by [`Reassembler::new`]: 16 MiB.
pub const DEFAULT_MAX_FRAME_SIZE: NonZeroUsize = match NonZeroUsize::new(16 * 1024 * 1024) {
    Some(limit) => limit,
    None => panic!("default frame size limit must be non-zero"),
};

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Assembling(InFlightFrame),
}

/// Single-frame reassembler for the header/fragment datagram protocol.
///
/// # Examples
///
/// ```
/// use snapwire::{
///     datagram::{encode_fragment, encode_header},
///     reassembler::Reassembler,
/// };
///
/// let mut reassembler = Reassembler::new();
/// assert!(reassembler.feed(&encode_header(4, 0, &[1, 2])).is_none());
/// let frame = reassembler
///     .feed(&encode_fragment(2, &[3, 4]))
///     .expect("frame complete");
/// assert_eq!(frame.payload(), &[1, 2, 3, 4]);
/// assert!(reassembler.is_idle());
/// ```
#[derive(Debug)]
pub struct Reassembler {
    max_frame_size: NonZeroUsize,
    state: State,
}

impl Default for Reassembler {
    fn default() -> Self { Self::new() }
}

impl Reassembler {
    /// Create an idle reassembler accepting frames up to
    /// [`DEFAULT_MAX_FRAME_SIZE`].
    #[must_use]
    pub fn new() -> Self { Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE) }

    /// Create an idle reassembler that refuses headers declaring more than
    /// `max_frame_size` bytes.
    #[must_use]
    pub fn with_max_frame_size(max_frame_size: NonZeroUsize) -> Self {
        Self {
            max_frame_size,
            state: State::Idle,
        }
    }

    /// Configured frame size cap.
    #[must_use]
    pub const fn max_frame_size(&self) -> NonZeroUsize { self.max_frame_size }

    /// Submit one datagram payload, returning the frame it completed, if any.
    pub fn feed(&mut self, payload: &[u8]) -> Option<CompletedFrame> {
        self.ingest(payload).into_completed()
    }

    /// Submit one datagram payload and report the resulting transition.
    pub fn ingest(&mut self, payload: &[u8]) -> FeedOutcome {
        match datagram::parse(payload) {
            Ok(Datagram::Header(header)) => self.start_frame(header),
            Ok(Datagram::Fragment(fragment)) => self.apply_fragment(fragment),
            Err(DatagramError::ShortHeader { .. }) => FeedOutcome::dropped(DropReason::ShortHeader),
            Err(DatagramError::ShortFragment { .. }) => {
                FeedOutcome::dropped(DropReason::ShortFragment)
            }
        }
    }

    /// Coverage of the in-flight frame, or `None` while idle.
    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        match &self.state {
            State::Idle => None,
            State::Assembling(frame) => Some(frame.progress()),
        }
    }

    /// Report whether no frame is in progress.
    #[must_use]
    pub const fn is_idle(&self) -> bool { matches!(self.state, State::Idle) }

    /// Discard any in-flight frame, returning its coverage.
    pub fn reset(&mut self) -> Option<Progress> {
        match std::mem::take(&mut self.state) {
            State::Idle => None,
            State::Assembling(frame) => Some(frame.progress()),
        }
    }

    fn start_frame(&mut self, header: FrameHeader<'_>) -> FeedOutcome {
        let superseded = self.reset();

        let limit = self.max_frame_size;
        let total_size = match usize::try_from(header.total_size) {
            Ok(size) if size <= limit.get() => size,
            _ => {
                return FeedOutcome::dropped(DropReason::FrameTooLarge {
                    declared: header.total_size,
                    limit,
                })
                .superseding(superseded);
            }
        };

        let mut frame = InFlightFrame::new(total_size);
        if let Ok(offset) = usize::try_from(header.initial_offset) {
            frame.write(offset, header.initial_payload);
        }
        self.state = State::Assembling(frame);

        let event = self
            .take_if_complete()
            .map_or(FeedEvent::Started { total_size }, FeedEvent::Completed);
        FeedOutcome::new(event).superseding(superseded)
    }

    fn apply_fragment(&mut self, fragment: Fragment<'_>) -> FeedOutcome {
        let State::Assembling(frame) = &mut self.state else {
            return FeedOutcome::dropped(DropReason::Idle);
        };

        let total_size = frame.total_size();
        let offset = match usize::try_from(fragment.offset) {
            Ok(offset) if offset < total_size => offset,
            _ => {
                return FeedOutcome::dropped(DropReason::OffsetOutOfRange {
                    offset: fragment.offset,
                    total_size,
                });
            }
        };
        if fragment.payload.is_empty() {
            return FeedOutcome::dropped(DropReason::EmptyPayload);
        }

        let newly_covered = frame.write(offset, fragment.payload);
        let progress = frame.progress();

        let event = self
            .take_if_complete()
            .map_or(FeedEvent::Progressed { newly_covered, progress }, FeedEvent::Completed);
        FeedOutcome::new(event)
    }

    fn take_if_complete(&mut self) -> Option<CompletedFrame> {
        match std::mem::take(&mut self.state) {
            State::Assembling(frame) if frame.is_complete() => Some(frame.into_completed()),
            other => {
                self.state = other;
                None
            }
        }
    }
}
