//! MAC SDU/PDU types and header size constants.

/// Serialized size of the generic MAC header.
pub const GENERIC_HEADER_BYTES: u32 = 6;
/// Serialized size of the bandwidth-request header.
pub const BANDWIDTH_REQUEST_HEADER_BYTES: u32 = 6;
/// Serialized size of the fragmentation subheader.
pub const FRAGMENT_SUBHEADER_BYTES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacHeaderType {
    Generic,
    BandwidthRequest,
}

impl MacHeaderType {
    pub fn header_bytes(self) -> u32 {
        match self {
            MacHeaderType::Generic => GENERIC_HEADER_BYTES,
            MacHeaderType::BandwidthRequest => BANDWIDTH_REQUEST_HEADER_BYTES,
        }
    }
}

/// An SDU waiting in a connection queue: a payload plus the MAC header it
/// will carry on the air.
#[derive(Debug, Clone)]
pub struct MacSdu {
    pub id: u64,
    pub payload_bytes: u32,
    pub header_type: MacHeaderType,
}

impl MacSdu {
    pub fn new(id: u64, payload_bytes: u32, header_type: MacHeaderType) -> Self {
        Self {
            id,
            payload_bytes,
            header_type,
        }
    }

    /// Size of the whole SDU on the wire (header + payload), unfragmented.
    pub fn wire_bytes(&self) -> u32 {
        self.header_type.header_bytes() + self.payload_bytes
    }
}

/// Position of a PDU within a fragmentation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentStage {
    /// Unfragmented SDU, no subheader.
    Whole,
    First,
    Middle,
    Last,
}

impl FragmentStage {
    pub fn is_fragment(self) -> bool {
        !matches!(self, FragmentStage::Whole)
    }
}

/// A PDU as it leaves the station inside a burst.
#[derive(Debug, Clone)]
pub struct MacPdu {
    /// Id of the SDU this PDU carries (a piece of).
    pub sdu_id: u64,
    /// Total bytes on the wire: header, subheader if any, payload carried.
    pub size_bytes: u32,
    pub header_type: MacHeaderType,
    pub fragment: FragmentStage,
}
