#![doc(html_root_url = "https://docs.rs/snapwire/latest")]
//! Public API for the `snapwire` library.
//!
//! Camera devices stream JPEG frames as UDP datagrams: a header announcing
//! the frame size, followed by fragments tagged with byte offsets. This crate
//! rebuilds those frames despite loss, duplication, and reordering, and hands
//! each completed frame to pluggable sinks.

pub mod byte_order;
pub mod datagram;
pub mod fragmenter;
pub mod metrics;
pub mod reassembler;
pub mod receiver;
pub mod sink;

pub use datagram::{Datagram, DatagramError, FRAME_MAGIC};
pub use fragmenter::{FragmentBatch, Fragmenter, FragmenterError};
pub use reassembler::{CompletedFrame, DropReason, FeedEvent, FeedOutcome, Progress, Reassembler};
pub use receiver::{Receiver, ReceiverConfig, ReceiverError, ReceiverStats};
pub use sink::{FrameMeta, FrameSink, SinkError};
