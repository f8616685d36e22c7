//! Per-connection MAC queue with fragmentation state.
//!
//! The queue, not the scheduler, owns the in-progress-fragmentation state
//! of its head-of-line packet. Two contract points the scheduler relies on:
//!
//! - the reported header size of a head packet with a fragmentation chain
//!   in progress *includes* the pending 2-byte subheader;
//! - a fragment returned by [`UplinkQueue::dequeue_fragment`] never exceeds
//!   `cap_bytes` in total (header + subheader + payload).

use std::collections::VecDeque;

use super::pdu::{FragmentStage, MacHeaderType, MacPdu, MacSdu, FRAGMENT_SUBHEADER_BYTES};

/// Default queue depth in packets.
pub const DEFAULT_QUEUE_PACKETS: usize = 1024;

/// Scheduler-facing view of a connection's uplink queue.
pub trait UplinkQueue: std::fmt::Debug {
    /// Enqueue an SDU; the rejected SDU comes back on overflow.
    fn enqueue(&mut self, sdu: MacSdu) -> Result<(), MacSdu>;

    /// Any packet queued? With `Some(t)`, only packets of header type `t` count.
    fn has_packets(&self, header_type: Option<MacHeaderType>) -> bool;

    /// Bytes needed to send the whole head-of-line packet of the given type,
    /// including its MAC header and any pending fragment subheader.
    /// 0 when no such packet is queued.
    fn first_required_bytes(&self, header_type: MacHeaderType) -> u32;

    /// Header bytes of the head-of-line packet, including the pending
    /// fragment subheader when a chain is in progress.
    fn first_header_bytes(&self, header_type: MacHeaderType) -> u32;

    /// True when the head-of-line packet has already shipped fragments
    /// (i.e. no *new* subheader needs to be synthesized for it).
    fn is_fragmentation_in_progress(&self, header_type: MacHeaderType) -> bool;

    /// Dequeue the whole head-of-line packet (the final fragment when a
    /// chain is in progress).
    fn dequeue(&mut self, header_type: MacHeaderType) -> Option<MacPdu>;

    /// Dequeue a fragment whose total size fits in `cap_bytes`. Returns
    /// `None` when not even header + subheader + one payload byte fits.
    fn dequeue_fragment(&mut self, header_type: MacHeaderType, cap_bytes: u32) -> Option<MacPdu>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct QueuedSdu {
    sdu: MacSdu,
    /// Payload bytes already shipped in earlier fragments.
    sent_payload: u32,
    in_fragmentation: bool,
}

impl QueuedSdu {
    fn remaining_payload(&self) -> u32 {
        self.sdu.payload_bytes.saturating_sub(self.sent_payload)
    }

    fn header_bytes(&self) -> u32 {
        let mut bytes = self.sdu.header_type.header_bytes();
        if self.in_fragmentation {
            bytes += FRAGMENT_SUBHEADER_BYTES;
        }
        bytes
    }

    fn required_bytes(&self) -> u32 {
        self.header_bytes() + self.remaining_payload()
    }
}

/// FIFO MAC queue, bounded in packets, drop-tail.
#[derive(Debug)]
pub struct MacQueue {
    max_packets: usize,
    q: VecDeque<QueuedSdu>,
}

impl Default for MacQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_PACKETS)
    }
}

impl MacQueue {
    pub fn new(max_packets: usize) -> Self {
        Self {
            max_packets,
            q: VecDeque::new(),
        }
    }

    /// First queued packet of the given header type, if any.
    fn front_index(&self, header_type: MacHeaderType) -> Option<usize> {
        self.q
            .iter()
            .position(|e| e.sdu.header_type == header_type)
    }
}

impl UplinkQueue for MacQueue {
    fn enqueue(&mut self, sdu: MacSdu) -> Result<(), MacSdu> {
        if self.q.len() >= self.max_packets {
            return Err(sdu);
        }
        self.q.push_back(QueuedSdu {
            sdu,
            sent_payload: 0,
            in_fragmentation: false,
        });
        Ok(())
    }

    fn has_packets(&self, header_type: Option<MacHeaderType>) -> bool {
        match header_type {
            None => !self.q.is_empty(),
            Some(t) => self.q.iter().any(|e| e.sdu.header_type == t),
        }
    }

    fn first_required_bytes(&self, header_type: MacHeaderType) -> u32 {
        self.front_index(header_type)
            .map(|i| self.q[i].required_bytes())
            .unwrap_or(0)
    }

    fn first_header_bytes(&self, header_type: MacHeaderType) -> u32 {
        self.front_index(header_type)
            .map(|i| self.q[i].header_bytes())
            .unwrap_or(0)
    }

    fn is_fragmentation_in_progress(&self, header_type: MacHeaderType) -> bool {
        self.front_index(header_type)
            .map(|i| self.q[i].in_fragmentation)
            .unwrap_or(false)
    }

    fn dequeue(&mut self, header_type: MacHeaderType) -> Option<MacPdu> {
        let idx = self.front_index(header_type)?;
        let entry = self.q.remove(idx).expect("index from position");
        let fragment = if entry.in_fragmentation {
            FragmentStage::Last
        } else {
            FragmentStage::Whole
        };
        Some(MacPdu {
            sdu_id: entry.sdu.id,
            size_bytes: entry.required_bytes(),
            header_type,
            fragment,
        })
    }

    fn dequeue_fragment(&mut self, header_type: MacHeaderType, cap_bytes: u32) -> Option<MacPdu> {
        let idx = self.front_index(header_type)?;
        let overhead = self.q[idx].sdu.header_type.header_bytes() + FRAGMENT_SUBHEADER_BYTES;
        if cap_bytes <= overhead {
            return None;
        }

        let entry = &mut self.q[idx];
        let room = cap_bytes - overhead;
        let remaining = entry.remaining_payload();
        let take = room.min(remaining);

        if take == remaining {
            // The cap swallows everything left; this is the closing fragment.
            let entry = self.q.remove(idx).expect("index from position");
            return Some(MacPdu {
                sdu_id: entry.sdu.id,
                size_bytes: overhead + take,
                header_type,
                fragment: FragmentStage::Last,
            });
        }

        let fragment = if entry.in_fragmentation {
            FragmentStage::Middle
        } else {
            entry.in_fragmentation = true;
            FragmentStage::First
        };
        entry.sent_payload += take;
        Some(MacPdu {
            sdu_id: entry.sdu.id,
            size_bytes: overhead + take,
            header_type,
            fragment,
        })
    }

    fn len(&self) -> usize {
        self.q.len()
    }
}
