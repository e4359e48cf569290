//! FIX wire layer: tag registry, message model, codec, and stream framing.

pub mod codec;
pub mod framing;
pub mod message;
pub mod tags;

pub use codec::{CodecError, DecodedMessage, FixCodec, PIPE, SOH};
pub use framing::{FixFrameCodec, MAX_FRAME_BYTES};
pub use message::FixMessage;
pub use tags::{MsgType, Tag};
