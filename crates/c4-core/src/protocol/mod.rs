//! Protocol module containing the wire message types and the JSON codec.

pub mod codec;
pub mod messages;

pub use codec::{decode, encode, CodecError};
pub use messages::*;
