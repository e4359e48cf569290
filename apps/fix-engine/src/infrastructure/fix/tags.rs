//! FIX tag registry.
//!
//! Typed tag numbers for every field the engine reads or writes, plus the
//! message type registry. Raw integers never appear at call sites.

use std::fmt;

/// A FIX field tag number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u16);

impl Tag {
    /// BeginString (8), always the first field of a message.
    pub const BEGIN_STRING: Self = Self(8);
    /// BodyLength (9), always the second field of a message.
    pub const BODY_LENGTH: Self = Self(9);
    /// CheckSum (10), always the last field of a message.
    pub const CHECK_SUM: Self = Self(10);
    /// AvgPx (6), volume-weighted average fill price.
    pub const AVG_PX: Self = Self(6);
    /// BeginSeqNo (7), first sequence number of a resend range.
    pub const BEGIN_SEQ_NO: Self = Self(7);
    /// ClOrdID (11), client-assigned order identifier.
    pub const CL_ORD_ID: Self = Self(11);
    /// CumQty (14), total quantity filled so far.
    pub const CUM_QTY: Self = Self(14);
    /// EndSeqNo (16), last sequence number of a resend range, 0 = infinity.
    pub const END_SEQ_NO: Self = Self(16);
    /// ExecID (17), counterparty-assigned execution identifier.
    pub const EXEC_ID: Self = Self(17);
    /// HandlInst (21), order handling instruction.
    pub const HANDL_INST: Self = Self(21);
    /// LastPx (31), price of this fill.
    pub const LAST_PX: Self = Self(31);
    /// LastQty (32), quantity of this fill (LastShares in FIX 4.2).
    pub const LAST_QTY: Self = Self(32);
    /// MsgSeqNum (34), message sequence number.
    pub const MSG_SEQ_NUM: Self = Self(34);
    /// MsgType (35).
    pub const MSG_TYPE: Self = Self(35);
    /// NewSeqNo (36), target sequence number of a SequenceReset.
    pub const NEW_SEQ_NO: Self = Self(36);
    /// OrderID (37), counterparty-assigned order identifier.
    pub const ORDER_ID: Self = Self(37);
    /// OrderQty (38), total order quantity.
    pub const ORDER_QTY: Self = Self(38);
    /// OrdStatus (39), current order status.
    pub const ORD_STATUS: Self = Self(39);
    /// OrdType (40), order type (2 = limit).
    pub const ORD_TYPE: Self = Self(40);
    /// OrigClOrdID (41), ClOrdID of the order a cancel refers to.
    pub const ORIG_CL_ORD_ID: Self = Self(41);
    /// Price (44), limit price.
    pub const PRICE: Self = Self(44);
    /// SenderCompID (49), message origin.
    pub const SENDER_COMP_ID: Self = Self(49);
    /// SendingTime (52), UTC timestamp the message left the sender.
    pub const SENDING_TIME: Self = Self(52);
    /// Side (54), 1 = buy, 2 = sell.
    pub const SIDE: Self = Self(54);
    /// Symbol (55).
    pub const SYMBOL: Self = Self(55);
    /// TargetCompID (56), message destination.
    pub const TARGET_COMP_ID: Self = Self(56);
    /// Text (58), free-form reason or comment.
    pub const TEXT: Self = Self(58);
    /// TransactTime (60), UTC timestamp of the business event.
    pub const TRANSACT_TIME: Self = Self(60);
    /// EncryptMethod (98), 0 = none.
    pub const ENCRYPT_METHOD: Self = Self(98);
    /// HeartBtInt (108), heartbeat interval in seconds.
    pub const HEART_BT_INT: Self = Self(108);
    /// TestReqID (112), identifier echoed between TestRequest and Heartbeat.
    pub const TEST_REQ_ID: Self = Self(112);
    /// GapFillFlag (123), Y = SequenceReset fills a gap rather than resetting.
    pub const GAP_FILL_FLAG: Self = Self(123);
    /// ExecType (150), purpose of an ExecutionReport.
    pub const EXEC_TYPE: Self = Self(150);
    /// LeavesQty (151), quantity still open.
    pub const LEAVES_QTY: Self = Self(151);

    /// Get the raw tag number.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Get the field name for diagnostics, if the tag is in the registry.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            6 => Some("AvgPx"),
            7 => Some("BeginSeqNo"),
            8 => Some("BeginString"),
            9 => Some("BodyLength"),
            10 => Some("CheckSum"),
            11 => Some("ClOrdID"),
            14 => Some("CumQty"),
            16 => Some("EndSeqNo"),
            17 => Some("ExecID"),
            21 => Some("HandlInst"),
            31 => Some("LastPx"),
            32 => Some("LastQty"),
            34 => Some("MsgSeqNum"),
            35 => Some("MsgType"),
            36 => Some("NewSeqNo"),
            37 => Some("OrderID"),
            38 => Some("OrderQty"),
            39 => Some("OrdStatus"),
            40 => Some("OrdType"),
            41 => Some("OrigClOrdID"),
            44 => Some("Price"),
            49 => Some("SenderCompID"),
            52 => Some("SendingTime"),
            54 => Some("Side"),
            55 => Some("Symbol"),
            56 => Some("TargetCompID"),
            58 => Some("Text"),
            60 => Some("TransactTime"),
            98 => Some("EncryptMethod"),
            108 => Some("HeartBtInt"),
            112 => Some("TestReqID"),
            123 => Some("GapFillFlag"),
            150 => Some("ExecType"),
            151 => Some("LeavesQty"),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({name})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// FIX message types the engine speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgType {
    /// Heartbeat (35=0).
    Heartbeat,
    /// TestRequest (35=1).
    TestRequest,
    /// ResendRequest (35=2).
    ResendRequest,
    /// Session-level Reject (35=3).
    Reject,
    /// SequenceReset (35=4).
    SequenceReset,
    /// Logout (35=5).
    Logout,
    /// ExecutionReport (35=8).
    ExecutionReport,
    /// OrderCancelReject (35=9).
    OrderCancelReject,
    /// Logon (35=A).
    Logon,
    /// NewOrderSingle (35=D).
    NewOrderSingle,
    /// OrderCancelRequest (35=F).
    OrderCancelRequest,
}

impl MsgType {
    /// Get the wire value carried in tag 35.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::OrderCancelReject => "9",
            Self::Logon => "A",
            Self::NewOrderSingle => "D",
            Self::OrderCancelRequest => "F",
        }
    }

    /// Parse a tag 35 wire value.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "0" => Some(Self::Heartbeat),
            "1" => Some(Self::TestRequest),
            "2" => Some(Self::ResendRequest),
            "3" => Some(Self::Reject),
            "4" => Some(Self::SequenceReset),
            "5" => Some(Self::Logout),
            "8" => Some(Self::ExecutionReport),
            "9" => Some(Self::OrderCancelReject),
            "A" => Some(Self::Logon),
            "D" => Some(Self::NewOrderSingle),
            "F" => Some(Self::OrderCancelRequest),
            _ => None,
        }
    }

    /// Returns true for session-layer messages handled by the engine itself.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::TestRequest
                | Self::ResendRequest
                | Self::Reject
                | Self::SequenceReset
                | Self::Logout
                | Self::Logon
        )
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Heartbeat => "Heartbeat",
            Self::TestRequest => "TestRequest",
            Self::ResendRequest => "ResendRequest",
            Self::Reject => "Reject",
            Self::SequenceReset => "SequenceReset",
            Self::Logout => "Logout",
            Self::ExecutionReport => "ExecutionReport",
            Self::OrderCancelReject => "OrderCancelReject",
            Self::Logon => "Logon",
            Self::NewOrderSingle => "NewOrderSingle",
            Self::OrderCancelRequest => "OrderCancelRequest",
        };
        write!(f, "{s}")
    }
}
