//! FIX tag=value codec.
//!
//! Stateless translation between [`FixMessage`] and wire frames. The codec
//! owns the session identity (BeginString and CompIDs) so callers supply
//! only the message body, sequence number, and sending time. Sequence
//! numbers and connection state live in the session layer, never here.

use std::str::FromStr;

use thiserror::Error;

use super::message::FixMessage;
use super::tags::{MsgType, Tag};
use crate::domain::session::SessionConfig;
use crate::domain::shared::Timestamp;

/// Standard FIX field delimiter (ASCII 0x01).
pub const SOH: char = '\x01';

/// Human-readable delimiter for logs, demos, and test fixtures.
pub const PIPE: char = '|';

/// Errors from encoding or decoding a single frame.
///
/// `Malformed`, `ChecksumMismatch`, and `BodyLengthMismatch` are
/// message-level: the caller discards the frame and the session lives.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame violates tag=value structure or header ordering.
    #[error("Malformed message: {0}")]
    Malformed(String),
    /// The declared CheckSum (10) does not match the computed value.
    #[error("CheckSum mismatch: declared {declared:03}, computed {computed:03}")]
    ChecksumMismatch {
        /// Value carried in tag 10.
        declared: u32,
        /// Mod-256 sum computed over the frame.
        computed: u32,
    },
    /// The declared BodyLength (9) does not match the counted bytes.
    #[error("BodyLength mismatch: declared {declared}, actual {actual}")]
    BodyLengthMismatch {
        /// Value carried in tag 9.
        declared: usize,
        /// Byte count from after the BodyLength field through the
        /// delimiter preceding CheckSum.
        actual: usize,
    },
    /// A required field is absent.
    #[error("Missing required tag {0}")]
    MissingTag(Tag),
    /// A field is present but its value does not parse.
    #[error("Invalid value for tag {tag}: '{value}'")]
    InvalidValue {
        /// The offending tag.
        tag: Tag,
        /// The raw value.
        value: String,
    },
    /// The message cannot be represented on the wire.
    #[error("Cannot encode message: {0}")]
    Encoding(String),
    /// Transport failure surfaced through the framing layer.
    #[error("Transport error: {0}")]
    Io(#[from] std::io::Error),
}

/// A validated inbound message.
///
/// Header fields are lifted out; the remaining body fields stay in wire
/// order behind the accessor methods.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    /// MsgSeqNum (34).
    pub seq: u64,
    /// SenderCompID (49).
    pub sender_comp_id: String,
    /// TargetCompID (56).
    pub target_comp_id: String,
    /// SendingTime (52).
    pub sending_time: Timestamp,
    body: FixMessage,
}

impl DecodedMessage {
    /// Get the message type.
    #[must_use]
    pub const fn msg_type(&self) -> MsgType {
        self.body.msg_type()
    }

    /// Get a body field value, if present.
    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.body.get(tag)
    }

    /// Get a required body field value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingTag`] if the field is absent.
    pub fn require(&self, tag: Tag) -> Result<&str, CodecError> {
        self.body.require(tag)
    }

    /// Parse a required body field.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingTag`] or [`CodecError::InvalidValue`].
    pub fn get_parsed<T: FromStr>(&self, tag: Tag) -> Result<T, CodecError> {
        self.body.get_parsed(tag)
    }

    /// Parse an optional body field.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidValue`] if present but unparseable.
    pub fn parse_opt<T: FromStr>(&self, tag: Tag) -> Result<Option<T>, CodecError> {
        self.body.parse_opt(tag)
    }

    /// Get the message body.
    #[must_use]
    pub const fn body(&self) -> &FixMessage {
        &self.body
    }
}

/// Encoder/decoder bound to one session identity.
#[derive(Debug, Clone)]
pub struct FixCodec {
    begin_string: String,
    sender_comp_id: String,
    target_comp_id: String,
    delimiter: char,
}

impl FixCodec {
    /// Codec for our side of the session, using the standard SOH delimiter.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            begin_string: config.begin_string.clone(),
            sender_comp_id: config.sender_comp_id.clone(),
            target_comp_id: config.target_comp_id.clone(),
            delimiter: SOH,
        }
    }

    /// Codec for the counterparty side of the same session, with the
    /// CompIDs swapped. Used by the broker simulator.
    #[must_use]
    pub fn counterparty(config: &SessionConfig) -> Self {
        Self {
            begin_string: config.begin_string.clone(),
            sender_comp_id: config.target_comp_id.clone(),
            target_comp_id: config.sender_comp_id.clone(),
            delimiter: SOH,
        }
    }

    /// Switch the field delimiter, e.g. to [`PIPE`] for readable frames.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Get the field delimiter.
    #[must_use]
    pub const fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Encode a message into a complete frame.
    ///
    /// Header layout is fixed: 8, 9, 35, 49, 56, 34, 52, body fields in
    /// order, 10. BodyLength counts the bytes from after the BodyLength
    /// field's delimiter through the delimiter preceding CheckSum.
    /// CheckSum is the mod-256 sum of every preceding byte, three digits
    /// zero-padded.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encoding`] if a field value contains the
    /// delimiter character.
    pub fn encode(
        &self,
        message: &FixMessage,
        seq: u64,
        sending_time: Timestamp,
    ) -> Result<String, CodecError> {
        let d = self.delimiter;

        let mut body = String::with_capacity(128);
        push_field(&mut body, Tag::MSG_TYPE, message.msg_type().as_wire(), d);
        push_field(&mut body, Tag::SENDER_COMP_ID, &self.sender_comp_id, d);
        push_field(&mut body, Tag::TARGET_COMP_ID, &self.target_comp_id, d);
        push_field(&mut body, Tag::MSG_SEQ_NUM, &seq.to_string(), d);
        push_field(&mut body, Tag::SENDING_TIME, &sending_time.to_fix_sending_time(), d);

        for (tag, value) in message.fields() {
            if value.contains(d) {
                return Err(CodecError::Encoding(format!(
                    "value for tag {tag} contains the field delimiter"
                )));
            }
            push_field(&mut body, *tag, value, d);
        }

        let mut frame = format!("8={}{d}9={}{d}", self.begin_string, body.len());
        frame.push_str(&body);

        let computed = checksum(frame.as_bytes());
        frame.push_str(&format!("10={computed:03}{d}"));

        Ok(frame)
    }

    /// Decode and validate a complete frame.
    ///
    /// # Errors
    ///
    /// Returns a message-level error if the frame is structurally invalid,
    /// declares the wrong BodyLength or CheckSum, or is missing a required
    /// header field.
    pub fn decode(&self, raw: &str) -> Result<DecodedMessage, CodecError> {
        let d = self.delimiter;
        let trimmed = raw.strip_suffix(d).unwrap_or(raw);
        if trimmed.is_empty() {
            return Err(CodecError::Malformed("empty frame".to_string()));
        }

        let raw_pieces: Vec<&str> = trimmed.split(d).collect();
        let mut pieces: Vec<(Tag, &str)> = Vec::with_capacity(raw_pieces.len());
        for piece in &raw_pieces {
            let (tag_str, value) = piece.split_once('=').ok_or_else(|| {
                CodecError::Malformed(format!("field without '=': '{piece}'"))
            })?;
            let tag_num: u16 = tag_str
                .parse()
                .map_err(|_| CodecError::Malformed(format!("unparseable tag: '{tag_str}'")))?;
            pieces.push((Tag(tag_num), value));
        }

        for required_once in [Tag::BEGIN_STRING, Tag::BODY_LENGTH, Tag::CHECK_SUM, Tag::MSG_TYPE] {
            if pieces.iter().filter(|(tag, _)| *tag == required_once).count() > 1 {
                return Err(CodecError::Malformed(format!(
                    "duplicate tag {required_once}"
                )));
            }
        }

        let (first_tag, begin_value) = pieces[0];
        if first_tag != Tag::BEGIN_STRING {
            return Err(CodecError::Malformed(
                "message does not start with BeginString".to_string(),
            ));
        }
        if begin_value != self.begin_string {
            return Err(CodecError::InvalidValue {
                tag: Tag::BEGIN_STRING,
                value: begin_value.to_string(),
            });
        }

        let (second_tag, length_value) = *pieces
            .get(1)
            .ok_or_else(|| CodecError::Malformed("missing BodyLength".to_string()))?;
        if second_tag != Tag::BODY_LENGTH {
            return Err(CodecError::Malformed(
                "BodyLength must be the second field".to_string(),
            ));
        }
        let declared: usize = length_value
            .parse()
            .map_err(|_| CodecError::InvalidValue {
                tag: Tag::BODY_LENGTH,
                value: length_value.to_string(),
            })?;

        let (last_tag, checksum_value) = pieces[pieces.len() - 1];
        if last_tag != Tag::CHECK_SUM {
            return Err(CodecError::Malformed(
                "message does not end with CheckSum".to_string(),
            ));
        }

        // Body runs from the third field through the one before CheckSum.
        let actual: usize = raw_pieces[2..raw_pieces.len() - 1]
            .iter()
            .map(|piece| piece.len() + 1)
            .sum();
        if declared != actual {
            return Err(CodecError::BodyLengthMismatch { declared, actual });
        }

        if checksum_value.len() != 3 || !checksum_value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::InvalidValue {
                tag: Tag::CHECK_SUM,
                value: checksum_value.to_string(),
            });
        }
        let declared_sum: u32 = checksum_value
            .parse()
            .map_err(|_| CodecError::InvalidValue {
                tag: Tag::CHECK_SUM,
                value: checksum_value.to_string(),
            })?;
        let region = trimmed.len() - raw_pieces[raw_pieces.len() - 1].len();
        let computed = checksum(&trimmed.as_bytes()[..region]);
        if declared_sum != computed {
            return Err(CodecError::ChecksumMismatch {
                declared: declared_sum,
                computed,
            });
        }

        let body_pieces = &pieces[2..pieces.len() - 1];
        let find = |tag: Tag| {
            body_pieces
                .iter()
                .find(|(t, _)| *t == tag)
                .map(|(_, v)| *v)
        };

        let msg_type_value = find(Tag::MSG_TYPE).ok_or(CodecError::MissingTag(Tag::MSG_TYPE))?;
        let msg_type =
            MsgType::from_wire(msg_type_value).ok_or_else(|| CodecError::InvalidValue {
                tag: Tag::MSG_TYPE,
                value: msg_type_value.to_string(),
            })?;

        let seq_value = find(Tag::MSG_SEQ_NUM).ok_or(CodecError::MissingTag(Tag::MSG_SEQ_NUM))?;
        let seq: u64 = seq_value.parse().map_err(|_| CodecError::InvalidValue {
            tag: Tag::MSG_SEQ_NUM,
            value: seq_value.to_string(),
        })?;

        let sender_comp_id = find(Tag::SENDER_COMP_ID)
            .ok_or(CodecError::MissingTag(Tag::SENDER_COMP_ID))?
            .to_string();
        let target_comp_id = find(Tag::TARGET_COMP_ID)
            .ok_or(CodecError::MissingTag(Tag::TARGET_COMP_ID))?
            .to_string();

        let time_value =
            find(Tag::SENDING_TIME).ok_or(CodecError::MissingTag(Tag::SENDING_TIME))?;
        let sending_time = Timestamp::parse_fix_sending_time(time_value).map_err(|_| {
            CodecError::InvalidValue {
                tag: Tag::SENDING_TIME,
                value: time_value.to_string(),
            }
        })?;

        let header_tags = [
            Tag::MSG_TYPE,
            Tag::MSG_SEQ_NUM,
            Tag::SENDER_COMP_ID,
            Tag::TARGET_COMP_ID,
            Tag::SENDING_TIME,
        ];
        let mut body = FixMessage::new(msg_type);
        for (tag, value) in body_pieces {
            if !header_tags.contains(tag) {
                body = body.with_field(*tag, *value);
            }
        }

        Ok(DecodedMessage {
            seq,
            sender_comp_id,
            target_comp_id,
            sending_time,
            body,
        })
    }
}

fn push_field(out: &mut String, tag: Tag, value: &str, delimiter: char) {
    out.push_str(&tag.value().to_string());
    out.push('=');
    out.push_str(value);
    out.push(delimiter);
}

/// Mod-256 sum of the byte values.
fn checksum(bytes: &[u8]) -> u32 {
    u32::from(bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b)))
}
