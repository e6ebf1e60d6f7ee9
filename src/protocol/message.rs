//! Inner message codec for the body of `Data` packages.
//!
//! ```text
//! +------+------------------+-------------------------+---------+
//! | flag | id (varint, opt) | route (code or len+str) |  body   |
//! +------+------------------+-------------------------+---------+
//!   flag = message type << 1 | route compressed
//! ```
//!
//! Requests and responses carry an id; requests, notifies and pushes carry a
//! route. A compressed route is a two-byte code resolved through a
//! [`RouteDictionary`].

use std::collections::HashMap;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::utf8::decode_utf8;

const ROUTE_COMPRESSED: u8 = 0x1;
const TYPE_MASK: u8 = 0x7;
const MAX_ROUTE_LEN: usize = u8::MAX as usize;

/// Kind of an inner message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Client request expecting a response (0).
    Request,
    /// Client notification without a response (1).
    Notify,
    /// Server response to a request (2).
    Response,
    /// Server-initiated push (3).
    Push,
}

impl MessageType {
    /// Create a message type from its wire code.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidMessage` for codes above 3.
    pub fn from_u8(code: u8) -> Result<Self> {
        match code {
            0 => Ok(MessageType::Request),
            1 => Ok(MessageType::Notify),
            2 => Ok(MessageType::Response),
            3 => Ok(MessageType::Push),
            other => Err(Error::InvalidMessage(format!("unknown message type {other}"))),
        }
    }

    /// Wire code of this message type.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            MessageType::Request => 0,
            MessageType::Notify => 1,
            MessageType::Response => 2,
            MessageType::Push => 3,
        }
    }

    /// Whether messages of this type carry an id.
    #[inline]
    #[must_use]
    pub const fn has_id(self) -> bool {
        matches!(self, MessageType::Request | MessageType::Response)
    }

    /// Whether messages of this type carry a route.
    #[inline]
    #[must_use]
    pub const fn has_route(self) -> bool {
        matches!(
            self,
            MessageType::Request | MessageType::Notify | MessageType::Push
        )
    }
}

/// Route as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRoute {
    /// Route name bytes.
    Name(Bytes),
    /// Compressed route code.
    Code(u16),
    /// No route (responses).
    None,
}

/// An inner message before text decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Message id, `0` for types that carry none.
    pub id: u32,
    /// Message type.
    pub kind: MessageType,
    /// Route field.
    pub route: RawRoute,
    /// Body bytes.
    pub body: Bytes,
}

/// Mapping from compressed route codes to route names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDictionary {
    codes: HashMap<u16, String>,
}

impl RouteDictionary {
    /// Create an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route under a code, returning the previous route if any.
    pub fn insert(&mut self, code: u16, route: impl Into<String>) -> Option<String> {
        self.codes.insert(code, route.into())
    }

    /// Look up the route for a code.
    #[must_use]
    pub fn get(&self, code: u16) -> Option<&str> {
        self.codes.get(&code).map(String::as_str)
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<R: Into<String>> FromIterator<(u16, R)> for RouteDictionary {
    fn from_iter<I: IntoIterator<Item = (u16, R)>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().map(|(c, r)| (c, r.into())).collect(),
        }
    }
}

/// A decoded application message with text route and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message id, `0` for notifies and pushes.
    pub id: u32,
    /// Message type.
    pub kind: MessageType,
    /// Route, empty for responses.
    pub route: String,
    /// Body text.
    pub body: String,
}

impl Message {
    /// Decode route and body text of a raw message.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidUtf8` if route or body is not UTF-8
    /// - `Error::UnknownRouteCode` if a compressed route is not in `routes`
    pub fn from_raw(raw: RawMessage, routes: &RouteDictionary) -> Result<Self> {
        let route = match raw.route {
            RawRoute::Name(name) => decode_utf8(&name)?,
            RawRoute::Code(code) => routes
                .get(code)
                .map(str::to_owned)
                .ok_or(Error::UnknownRouteCode(code))?,
            RawRoute::None => String::new(),
        };

        Ok(Self {
            id: raw.id,
            kind: raw.kind,
            route,
            body: decode_utf8(&raw.body)?,
        })
    }
}

/// Decode an inner message from a `Data` package body.
///
/// # Errors
///
/// Returns `Error::InvalidMessage` for an empty buffer, an unknown type, an
/// overlong id, or a truncated route.
pub fn decode(buf: &[u8]) -> Result<RawMessage> {
    let (&flag, mut rest) = buf
        .split_first()
        .ok_or_else(|| Error::InvalidMessage("empty message".into()))?;

    let compressed = flag & ROUTE_COMPRESSED != 0;
    let kind = MessageType::from_u8((flag >> 1) & TYPE_MASK)?;

    let mut id = 0;
    if kind.has_id() {
        let (value, consumed) = decode_varint(rest)?;
        id = value;
        rest = &rest[consumed..];
    }

    let route = if !kind.has_route() {
        RawRoute::None
    } else if compressed {
        if rest.len() < 2 {
            return Err(Error::InvalidMessage("truncated route code".into()));
        }
        let code = u16::from_be_bytes([rest[0], rest[1]]);
        rest = &rest[2..];
        RawRoute::Code(code)
    } else {
        let (&len, tail) = rest
            .split_first()
            .ok_or_else(|| Error::InvalidMessage("missing route length".into()))?;
        let len = len as usize;
        if tail.len() < len {
            return Err(Error::InvalidMessage("truncated route".into()));
        }
        rest = &tail[len..];
        RawRoute::Name(Bytes::copy_from_slice(&tail[..len]))
    };

    Ok(RawMessage {
        id,
        kind,
        route,
        body: Bytes::copy_from_slice(rest),
    })
}

/// Encode an inner message.
///
/// # Errors
///
/// - `Error::RouteTooLong` if an uncompressed route exceeds 255 bytes
/// - `Error::InvalidMessage` if the route presence does not match the type
pub fn encode(message: &RawMessage) -> Result<Bytes> {
    let kind = message.kind;
    let compressed = matches!(message.route, RawRoute::Code(_));

    match (&message.route, kind.has_route()) {
        (RawRoute::None, true) => {
            return Err(Error::InvalidMessage("route required".into()));
        }
        (RawRoute::Name(_) | RawRoute::Code(_), false) => {
            return Err(Error::InvalidMessage("route not allowed".into()));
        }
        _ => {}
    }

    let mut buf = BytesMut::with_capacity(1 + 5 + 2 + message.body.len());
    buf.put_u8((kind.as_u8() << 1) | u8::from(compressed));

    if kind.has_id() {
        encode_varint(message.id, &mut buf);
    }

    match &message.route {
        RawRoute::Name(name) => {
            if name.len() > MAX_ROUTE_LEN {
                return Err(Error::RouteTooLong(name.len()));
            }
            buf.put_u8(name.len() as u8);
            buf.put_slice(name);
        }
        RawRoute::Code(code) => buf.put_u16(*code),
        RawRoute::None => {}
    }

    buf.put_slice(&message.body);
    Ok(buf.freeze())
}

fn decode_varint(buf: &[u8]) -> Result<(u32, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i >= 5 {
            break;
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            let id = u32::try_from(value)
                .map_err(|_| Error::InvalidMessage("message id overflow".into()))?;
            return Ok((id, i + 1));
        }
    }
    Err(Error::InvalidMessage("truncated message id".into()))
}

fn encode_varint(mut value: u32, buf: &mut BytesMut) {
    loop {
        let group = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.put_u8(group);
            return;
        }
        buf.put_u8(group | 0x80);
    }
}
