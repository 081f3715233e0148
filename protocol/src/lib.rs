//! Wire format for the Minecraft status handshake.
//!
//! Implements just enough of the protocol to ask a server how many players
//! are online: the VarInt primitives, the handshake and status-request
//! frames, and a narrow scanner that pulls `"online":N` out of the status
//! JSON. The read side works over any `AsyncRead`, so the probe client and
//! test servers share the same functions.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Protocol version sent in the handshake. Status queries are answered
/// regardless of the version the target actually speaks.
pub const PROTOCOL_VERSION: i32 = 4;

/// Packet id shared by the handshake, the status request and the status
/// response.
pub const PACKET_ID_STATUS: i32 = 0x00;

/// Next-state value selecting the status flow after the handshake.
pub const NEXT_STATE_STATUS: i32 = 1;

/// A VarInt carries 7 data bits per byte; a 32-bit value never needs more.
const MAX_VARINT_BYTES: usize = 5;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("VarInt exceeds {MAX_VARINT_BYTES} bytes")]
    VarIntTooLong,
    #[error("negative length prefix {0}")]
    NegativeLength(i32),
    #[error("unexpected packet id {0:#04x}")]
    UnexpectedPacket(i32),
    #[error("string payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Append `value` to `buf` in VarInt encoding (7 data bits per byte, high
/// bit set on every byte but the last).
pub fn write_varint(buf: &mut Vec<u8>, value: i32) {
    let mut remaining = value as u32;
    loop {
        if remaining & !0x7F == 0 {
            buf.push(remaining as u8);
            return;
        }
        buf.push((remaining as u8 & 0x7F) | 0x80);
        remaining >>= 7;
    }
}

/// Read one VarInt. Streams that keep the continuation bit set past
/// [`MAX_VARINT_BYTES`] are malformed.
pub async fn read_varint<R>(reader: &mut R) -> Result<i32, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut value: u32 = 0;
    for position in 0..MAX_VARINT_BYTES {
        let byte = reader.read_u8().await?;
        value |= u32::from(byte & 0x7F) << (position * 7);
        if byte & 0x80 == 0 {
            return Ok(value as i32);
        }
    }
    Err(ProtocolError::VarIntTooLong)
}

/// Append a VarInt-length-prefixed UTF-8 string to `buf`.
pub fn write_string(buf: &mut Vec<u8>, value: &str) {
    write_varint(buf, value.len() as i32);
    buf.extend_from_slice(value.as_bytes());
}

/// Read a VarInt-length-prefixed UTF-8 string.
pub async fn read_string<R>(reader: &mut R) -> Result<String, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let length = read_varint(reader).await?;
    let length = usize::try_from(length).map_err(|_| ProtocolError::NegativeLength(length))?;
    let mut bytes = vec![0u8; length];
    reader.read_exact(&mut bytes).await?;
    Ok(String::from_utf8(bytes)?)
}

/// Prefix a packet body with its VarInt length, yielding a complete frame.
pub fn frame(body: Vec<u8>) -> Vec<u8> {
    let mut framed = Vec::with_capacity(body.len() + 2);
    write_varint(&mut framed, body.len() as i32);
    framed.extend_from_slice(&body);
    framed
}

/// Build the handshake frame announcing a status query for `host:port`.
///
/// Body layout: packet id `0x00`, VarInt protocol version, string host,
/// big-endian u16 port, VarInt next-state. The returned bytes carry the
/// VarInt length prefix and go on the wire as-is.
pub fn handshake(protocol_version: i32, host: &str, port: u16) -> Vec<u8> {
    let mut body = Vec::with_capacity(host.len() + 8);
    write_varint(&mut body, PACKET_ID_STATUS);
    write_varint(&mut body, protocol_version);
    write_string(&mut body, host);
    body.extend_from_slice(&port.to_be_bytes());
    write_varint(&mut body, NEXT_STATE_STATUS);
    frame(body)
}

/// Build the status-request frame: an empty packet with id `0x00`.
pub fn status_request() -> Vec<u8> {
    let mut body = Vec::with_capacity(1);
    write_varint(&mut body, PACKET_ID_STATUS);
    frame(body)
}

/// Read a status response frame and return the raw JSON document it
/// carries. Any packet id other than `0x00` is a protocol error.
pub async fn read_status_response<R>(reader: &mut R) -> Result<String, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let _length = read_varint(reader).await?;
    let packet_id = read_varint(reader).await?;
    if packet_id != PACKET_ID_STATUS {
        return Err(ProtocolError::UnexpectedPacket(packet_id));
    }
    read_string(reader).await
}

/// Pull the online-player count out of a status JSON document.
///
/// This is a substring scanner, not a JSON parser: it finds `"online":`,
/// takes everything up to the next `,` or `}` and parses it as a
/// non-negative integer. Documents that do not carry the usual
/// `"players":{"online":N,...}` shape yield `None` rather than an error.
pub fn online_count(json: &str) -> Option<u32> {
    const KEY: &str = "\"online\":";
    let start = json.find(KEY)? + KEY.len();
    let rest = &json[start..];
    let end = rest.find([',', '}'])?;
    rest[..end].trim().parse().ok()
}
