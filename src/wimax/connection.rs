//! Unidirectional MAC connection: a CID, a type, and one uplink queue.

use super::cid::{Cid, ConnectionType};
use super::mac_queue::{MacQueue, UplinkQueue};
use super::pdu::{MacHeaderType, MacPdu, MacSdu};

#[derive(Debug)]
pub struct Connection {
    cid: Cid,
    kind: ConnectionType,
    queue: Box<dyn UplinkQueue>,
}

impl Connection {
    pub fn new(cid: Cid, kind: ConnectionType) -> Self {
        Self::with_queue(cid, kind, Box::new(MacQueue::default()))
    }

    /// Build a connection around a caller-supplied queue implementation.
    pub fn with_queue(cid: Cid, kind: ConnectionType, queue: Box<dyn UplinkQueue>) -> Self {
        Self { cid, kind, queue }
    }

    pub fn cid(&self) -> Cid {
        self.cid
    }

    pub fn kind(&self) -> ConnectionType {
        self.kind
    }

    pub fn queue(&self) -> &dyn UplinkQueue {
        self.queue.as_ref()
    }

    pub fn queue_mut(&mut self) -> &mut dyn UplinkQueue {
        self.queue.as_mut()
    }

    pub fn has_packets(&self, header_type: Option<MacHeaderType>) -> bool {
        self.queue.has_packets(header_type)
    }

    pub fn enqueue(&mut self, sdu: MacSdu) -> Result<(), MacSdu> {
        self.queue.enqueue(sdu)
    }

    pub fn dequeue(&mut self, header_type: MacHeaderType) -> Option<MacPdu> {
        self.queue.dequeue(header_type)
    }

    pub fn dequeue_fragment(&mut self, header_type: MacHeaderType, cap_bytes: u32) -> Option<MacPdu> {
        self.queue.dequeue_fragment(header_type, cap_bytes)
    }
}
