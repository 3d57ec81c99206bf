//! Protocol module containing wire constants, envelope types and the codec.

pub mod codec;
pub mod messages;

pub use codec::{classify, decode_envelope, encode_result, CodecError, Frame};
pub use messages::*;
