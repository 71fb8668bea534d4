//! `application/vnd.amazon.eventstream` framing.
//!
//! Every message on the wire is laid out as:
//!
//! ```text
//! [total length u32][headers length u32][prelude crc u32]
//! [headers ...][payload ...][message crc u32]
//! ```
//!
//! All integers are big-endian. The prelude CRC covers the first 8 bytes,
//! the message CRC covers everything before it.

mod crc;

use uuid::Uuid;

use crate::error::AgentError;

use self::crc::crc32;

const PRELUDE_LEN: usize = 12;
const MESSAGE_CRC_LEN: usize = 4;
const MIN_MESSAGE_LEN: usize = PRELUDE_LEN + MESSAGE_CRC_LEN;
const MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;
const MAX_HEADERS_LEN: usize = 128 * 1024;

pub const MESSAGE_TYPE: &str = ":message-type";
pub const EVENT_TYPE: &str = ":event-type";
pub const EXCEPTION_TYPE: &str = ":exception-type";
pub const CONTENT_TYPE: &str = ":content-type";

/// Typed header value (type tags 0 through 9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Bytes(Vec<u8>),
    String(String),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Uuid(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: HeaderValue,
}

impl Header {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: HeaderValue::String(value.into()),
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        // Names are at most 255 bytes and string values at most 65535 bytes
        // on the wire.
        out.push(self.name.len() as u8);
        out.extend_from_slice(self.name.as_bytes());
        match &self.value {
            HeaderValue::Bool(true) => out.push(0),
            HeaderValue::Bool(false) => out.push(1),
            HeaderValue::Byte(v) => {
                out.push(2);
                out.extend_from_slice(&v.to_be_bytes());
            }
            HeaderValue::Short(v) => {
                out.push(3);
                out.extend_from_slice(&v.to_be_bytes());
            }
            HeaderValue::Int(v) => {
                out.push(4);
                out.extend_from_slice(&v.to_be_bytes());
            }
            HeaderValue::Long(v) => {
                out.push(5);
                out.extend_from_slice(&v.to_be_bytes());
            }
            HeaderValue::Bytes(v) => {
                out.push(6);
                out.extend_from_slice(&(v.len() as u16).to_be_bytes());
                out.extend_from_slice(v);
            }
            HeaderValue::String(v) => {
                out.push(7);
                out.extend_from_slice(&(v.len() as u16).to_be_bytes());
                out.extend_from_slice(v.as_bytes());
            }
            HeaderValue::Timestamp(v) => {
                out.push(8);
                out.extend_from_slice(&v.to_be_bytes());
            }
            HeaderValue::Uuid(v) => {
                out.push(9);
                out.extend_from_slice(v.as_bytes());
            }
        }
    }
}

/// One decoded event-stream message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub headers: Vec<Header>,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(headers: Vec<Header>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            headers,
            payload: payload.into(),
        }
    }

    /// An `event` message carrying a JSON payload.
    pub fn event(event_type: &str, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(
            vec![
                Header::string(EVENT_TYPE, event_type),
                Header::string(CONTENT_TYPE, "application/json"),
                Header::string(MESSAGE_TYPE, "event"),
            ],
            payload,
        )
    }

    /// An `exception` message as the service sends for mid-stream failures.
    pub fn exception(exception_type: &str, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(
            vec![
                Header::string(EXCEPTION_TYPE, exception_type),
                Header::string(CONTENT_TYPE, "application/json"),
                Header::string(MESSAGE_TYPE, "exception"),
            ],
            payload,
        )
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.iter().find(|h| h.name == name).map(|h| &h.value)
    }

    pub fn header_str(&self, name: &str) -> Option<&str> {
        match self.header(name)? {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut headers = Vec::new();
        for header in &self.headers {
            header.encode_into(&mut headers);
        }

        let total_len = PRELUDE_LEN + headers.len() + self.payload.len() + MESSAGE_CRC_LEN;
        let mut out = Vec::with_capacity(total_len);
        out.extend_from_slice(&(total_len as u32).to_be_bytes());
        out.extend_from_slice(&(headers.len() as u32).to_be_bytes());
        let prelude_crc = crc32(&out);
        out.extend_from_slice(&prelude_crc.to_be_bytes());
        out.extend_from_slice(&headers);
        out.extend_from_slice(&self.payload);
        let message_crc = crc32(&out);
        out.extend_from_slice(&message_crc.to_be_bytes());
        out
    }
}

/// Incremental decoder fed with arbitrary byte chunks from the transport.
#[derive(Debug, Default)]
pub struct MessageDecoder {
    buffer: Vec<u8>,
}

impl MessageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// True when no partial frame is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Pop the next complete message, or `None` if more bytes are needed.
    pub fn next_message(&mut self) -> Result<Option<Message>, AgentError> {
        if self.buffer.len() < PRELUDE_LEN {
            return Ok(None);
        }

        let total_len = read_u32(&self.buffer[0..4]) as usize;
        let headers_len = read_u32(&self.buffer[4..8]) as usize;
        let prelude_crc = read_u32(&self.buffer[8..12]);

        let computed = crc32(&self.buffer[..8]);
        if computed != prelude_crc {
            return Err(AgentError::Protocol(format!(
                "prelude checksum mismatch (expected {prelude_crc:#010x}, got {computed:#010x})"
            )));
        }
        if !(MIN_MESSAGE_LEN..=MAX_MESSAGE_LEN).contains(&total_len) {
            return Err(AgentError::Protocol(format!("invalid message length {total_len}")));
        }
        if headers_len > MAX_HEADERS_LEN || headers_len > total_len - MIN_MESSAGE_LEN {
            return Err(AgentError::Protocol(format!("invalid headers length {headers_len}")));
        }

        if self.buffer.len() < total_len {
            return Ok(None);
        }

        let frame: Vec<u8> = self.buffer.drain(..total_len).collect();
        let crc_offset = total_len - MESSAGE_CRC_LEN;
        let message_crc = read_u32(&frame[crc_offset..]);
        let computed = crc32(&frame[..crc_offset]);
        if computed != message_crc {
            return Err(AgentError::Protocol(format!(
                "message checksum mismatch (expected {message_crc:#010x}, got {computed:#010x})"
            )));
        }

        let headers_end = PRELUDE_LEN + headers_len;
        let headers = decode_headers(&frame[PRELUDE_LEN..headers_end])?;
        let payload = frame[headers_end..crc_offset].to_vec();

        Ok(Some(Message { headers, payload }))
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], AgentError> {
        let end = self.pos + n;
        if end > self.buf.len() {
            return Err(AgentError::Protocol("truncated header block".into()));
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], AgentError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn remaining(&self) -> bool {
        self.pos < self.buf.len()
    }
}

fn decode_headers(block: &[u8]) -> Result<Vec<Header>, AgentError> {
    let mut cursor = Cursor { buf: block, pos: 0 };
    let mut headers = Vec::new();

    while cursor.remaining() {
        let [name_len] = cursor.take_array::<1>()?;
        let name = std::str::from_utf8(cursor.take(name_len as usize)?)
            .map_err(|_| AgentError::Protocol("header name is not UTF-8".into()))?
            .to_string();
        let [type_tag] = cursor.take_array::<1>()?;

        let value = match type_tag {
            0 => HeaderValue::Bool(true),
            1 => HeaderValue::Bool(false),
            2 => HeaderValue::Byte(i8::from_be_bytes(cursor.take_array()?)),
            3 => HeaderValue::Short(i16::from_be_bytes(cursor.take_array()?)),
            4 => HeaderValue::Int(i32::from_be_bytes(cursor.take_array()?)),
            5 => HeaderValue::Long(i64::from_be_bytes(cursor.take_array()?)),
            6 => {
                let len = u16::from_be_bytes(cursor.take_array()?) as usize;
                HeaderValue::Bytes(cursor.take(len)?.to_vec())
            }
            7 => {
                let len = u16::from_be_bytes(cursor.take_array()?) as usize;
                let value = std::str::from_utf8(cursor.take(len)?).map_err(|_| {
                    AgentError::Protocol(format!("header {name} is not UTF-8"))
                })?;
                HeaderValue::String(value.to_string())
            }
            8 => HeaderValue::Timestamp(i64::from_be_bytes(cursor.take_array()?)),
            9 => HeaderValue::Uuid(Uuid::from_bytes(cursor.take_array()?)),
            other => {
                return Err(AgentError::Protocol(format!(
                    "unknown header value type {other} for {name}"
                )))
            }
        };

        headers.push(Header { name, value });
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_message(text: &str) -> Message {
        Message::event("chunk", format!("{{\"bytes\":\"{text}\"}}"))
    }

    #[test]
    fn decodes_message_split_at_every_byte() {
        let message = chunk_message("aGVsbG8=");
        let wire = message.encode();

        let mut decoder = MessageDecoder::new();
        let mut decoded = Vec::new();
        for byte in &wire {
            decoder.push(std::slice::from_ref(byte));
            if let Some(m) = decoder.next_message().unwrap() {
                decoded.push(m);
            }
        }

        assert_eq!(decoded, vec![message]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn decodes_back_to_back_messages_from_one_buffer() {
        let first = chunk_message("YQ==");
        let second = Message::event("trace", "{\"trace\":{}}");
        let mut wire = first.encode();
        wire.extend(second.encode());

        let mut decoder = MessageDecoder::new();
        decoder.push(&wire);
        assert_eq!(decoder.next_message().unwrap(), Some(first));
        assert_eq!(decoder.next_message().unwrap(), Some(second));
        assert_eq!(decoder.next_message().unwrap(), None);
    }

    #[test]
    fn typed_headers_survive_encoding() {
        let id = Uuid::new_v4();
        let message = Message::new(
            vec![
                Header { name: "t".into(), value: HeaderValue::Bool(true) },
                Header { name: "f".into(), value: HeaderValue::Bool(false) },
                Header { name: "b".into(), value: HeaderValue::Byte(-3) },
                Header { name: "s".into(), value: HeaderValue::Short(1024) },
                Header { name: "i".into(), value: HeaderValue::Int(-70_000) },
                Header { name: "l".into(), value: HeaderValue::Long(1 << 40) },
                Header { name: "raw".into(), value: HeaderValue::Bytes(vec![0, 255]) },
                Header { name: "ts".into(), value: HeaderValue::Timestamp(1_700_000_000_000) },
                Header { name: "id".into(), value: HeaderValue::Uuid(id) },
            ],
            Vec::new(),
        );

        let mut decoder = MessageDecoder::new();
        decoder.push(&message.encode());
        assert_eq!(decoder.next_message().unwrap(), Some(message));
    }

    #[test]
    fn header_lookup_by_name() {
        let message = Message::exception("throttlingException", "{}");
        assert_eq!(message.header_str(MESSAGE_TYPE), Some("exception"));
        assert_eq!(message.header_str(EXCEPTION_TYPE), Some("throttlingException"));
        assert_eq!(message.header_str(EVENT_TYPE), None);
    }

    #[test]
    fn corrupted_payload_fails_message_checksum() {
        let mut wire = chunk_message("YQ==").encode();
        let payload_byte = wire.len() - 6;
        wire[payload_byte] ^= 0xFF;

        let mut decoder = MessageDecoder::new();
        decoder.push(&wire);
        let err = decoder.next_message().unwrap_err();
        assert!(err.to_string().contains("message checksum"));
    }

    #[test]
    fn corrupted_prelude_is_rejected_before_waiting_for_body() {
        let mut wire = chunk_message("YQ==").encode();
        wire[3] ^= 0x01;

        let mut decoder = MessageDecoder::new();
        decoder.push(&wire[..PRELUDE_LEN]);
        let err = decoder.next_message().unwrap_err();
        assert!(err.to_string().contains("prelude checksum"));
    }

    #[test]
    fn partial_prelude_waits_for_more_bytes() {
        let wire = chunk_message("YQ==").encode();
        let mut decoder = MessageDecoder::new();
        decoder.push(&wire[..5]);
        assert_eq!(decoder.next_message().unwrap(), None);
        assert!(!decoder.is_empty());
    }
}
