//! Wire protocol for the dispatch fabric.
//!
//! Everything that crosses a socket is either an [`Envelope`] (the one
//! request frame) or a [`JobReply`] (the one response frame). Frames are
//! length-prefixed JSON; see [`codec`].

pub mod codec;
pub mod message;

pub use codec::{read_frame, write_frame, MAX_FRAME_BYTES};
pub use message::{Envelope, JobDescriptor, JobReply, SatelliteInfo};
