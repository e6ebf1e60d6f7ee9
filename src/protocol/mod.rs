//! Wire protocol: package framing and the inner message codec.

pub mod message;
pub mod package;
pub mod utf8;

pub use message::{Message, MessageType, RawMessage, RawRoute, RouteDictionary};
pub use package::{Frame, HEADER_LEN, MAX_BODY_SIZE, PackageType, decode_all, encode};
pub use utf8::decode_utf8;
