//! Outbound FIX message construction.
//!
//! A [`FixMessage`] carries a message type and ordered body fields. The
//! session header (8, 9, 35, 49, 56, 34, 52) and trailer (10) are owned by
//! the codec at encode time, never set here.

use std::str::FromStr;

use super::codec::CodecError;
use super::tags::{MsgType, Tag};

/// Message type plus ordered body fields, before session framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixMessage {
    msg_type: MsgType,
    fields: Vec<(Tag, String)>,
}

impl FixMessage {
    /// Create an empty message of the given type.
    #[must_use]
    pub const fn new(msg_type: MsgType) -> Self {
        Self {
            msg_type,
            fields: Vec::new(),
        }
    }

    /// Append a body field, builder style. Field order is preserved.
    #[must_use]
    pub fn with_field(mut self, tag: Tag, value: impl Into<String>) -> Self {
        self.fields.push((tag, value.into()));
        self
    }

    /// Get the message type.
    #[must_use]
    pub const fn msg_type(&self) -> MsgType {
        self.msg_type
    }

    /// Get the body fields in order.
    #[must_use]
    pub fn fields(&self) -> &[(Tag, String)] {
        &self.fields
    }

    /// Get the first value for a tag, if present.
    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Get a required field value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingTag`] if the field is absent.
    pub fn require(&self, tag: Tag) -> Result<&str, CodecError> {
        self.get(tag).ok_or(CodecError::MissingTag(tag))
    }

    /// Parse a required field value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingTag`] if the field is absent, or
    /// [`CodecError::InvalidValue`] if it does not parse.
    pub fn get_parsed<T: FromStr>(&self, tag: Tag) -> Result<T, CodecError> {
        let value = self.require(tag)?;
        value.parse().map_err(|_| CodecError::InvalidValue {
            tag,
            value: value.to_string(),
        })
    }

    /// Parse an optional field value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidValue`] if the field is present but
    /// does not parse. An absent field is `Ok(None)`.
    pub fn parse_opt<T: FromStr>(&self, tag: Tag) -> Result<Option<T>, CodecError> {
        match self.get(tag) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| CodecError::InvalidValue {
                    tag,
                    value: value.to_string(),
                }),
        }
    }

    // ========================================================================
    // Admin message constructors
    // ========================================================================

    /// Logon (35=A) with no encryption and the given heartbeat interval.
    #[must_use]
    pub fn logon(heart_bt_int_secs: u64) -> Self {
        Self::new(MsgType::Logon)
            .with_field(Tag::ENCRYPT_METHOD, "0")
            .with_field(Tag::HEART_BT_INT, heart_bt_int_secs.to_string())
    }

    /// Heartbeat (35=0), echoing a TestReqID when answering a TestRequest.
    #[must_use]
    pub fn heartbeat(test_req_id: Option<&str>) -> Self {
        let msg = Self::new(MsgType::Heartbeat);
        match test_req_id {
            Some(id) => msg.with_field(Tag::TEST_REQ_ID, id),
            None => msg,
        }
    }

    /// TestRequest (35=1) demanding a Heartbeat that echoes the id.
    #[must_use]
    pub fn test_request(test_req_id: impl Into<String>) -> Self {
        Self::new(MsgType::TestRequest).with_field(Tag::TEST_REQ_ID, test_req_id)
    }

    /// ResendRequest (35=2) for the inclusive sequence range `begin..=end`.
    #[must_use]
    pub fn resend_request(begin: u64, end: u64) -> Self {
        Self::new(MsgType::ResendRequest)
            .with_field(Tag::BEGIN_SEQ_NO, begin.to_string())
            .with_field(Tag::END_SEQ_NO, end.to_string())
    }

    /// SequenceReset-GapFill (35=4, 123=Y) advancing the peer to `new_seq_no`.
    #[must_use]
    pub fn sequence_reset_gap_fill(new_seq_no: u64) -> Self {
        Self::new(MsgType::SequenceReset)
            .with_field(Tag::GAP_FILL_FLAG, "Y")
            .with_field(Tag::NEW_SEQ_NO, new_seq_no.to_string())
    }

    /// Logout (35=5) with an optional reason.
    #[must_use]
    pub fn logout(text: Option<&str>) -> Self {
        let msg = Self::new(MsgType::Logout);
        match text {
            Some(text) => msg.with_field(Tag::TEXT, text),
            None => msg,
        }
    }
}
