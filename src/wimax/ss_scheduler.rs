//! Subscriber-station uplink scheduler.
//!
//! One scheduler per station. Given a grant of PHY symbols, it selects a
//! single connection by strict priority and drains that connection's queue
//! into a burst, packing whole packets while they fit and falling back to
//! fragmentation on transport connections. The scheduler keeps no state
//! across grants except the poll-me flag; fragmentation progress lives in
//! the queue.

use tracing::{debug, trace};

use crate::sim::SimTime;

use super::burst::Burst;
use super::cid::Cid;
use super::pdu::{MacHeaderType, FRAGMENT_SUBHEADER_BYTES};
use super::phy::Modulation;
use super::service_flow::FlowKind;
use super::station::SubscriberStation;

/// One rung of the uplink priority ladder.
#[derive(Debug, Clone, Copy)]
enum Rung {
    InitialRanging,
    Basic,
    Primary,
    Flows(FlowKind),
    Broadcast,
}

/// First eligible rung wins. Management traffic preempts data,
/// deadline-bound classes preempt best effort, broadcast chatter goes
/// last. Adding a class is one line here.
const UPLINK_LADDER: &[Rung] = &[
    Rung::InitialRanging,
    Rung::Basic,
    Rung::Primary,
    Rung::Flows(FlowKind::Ugs),
    Rung::Flows(FlowKind::Rtps),
    Rung::Flows(FlowKind::Nrtps),
    Rung::Flows(FlowKind::Be),
    Rung::Broadcast,
];

#[derive(Debug, Default)]
pub struct SsScheduler {
    poll_me: bool,
}

impl SsScheduler {
    /// Signal that best-effort connections want to be polled; the station
    /// reads this when it builds bandwidth-request messages.
    pub fn set_poll_me(&mut self, poll_me: bool) {
        self.poll_me = poll_me;
    }

    pub fn poll_me(&self) -> bool {
        self.poll_me
    }

    /// Pack one uplink grant.
    ///
    /// With `connection = None` a connection is chosen via
    /// [`Self::select_connection`] and written back. A caller-supplied
    /// connection must have packets queued; passing an empty one is a
    /// contract violation and panics. Returns the burst, possibly empty.
    pub fn schedule(
        &mut self,
        station: &mut SubscriberStation,
        now: SimTime,
        mut available_symbols: u16,
        modulation: Modulation,
        header_type: MacHeaderType,
        connection: &mut Option<Cid>,
    ) -> Burst {
        let mut burst = Burst::new();

        match *connection {
            None => *connection = self.select_connection(station, now),
            Some(cid) => {
                let conn = station
                    .connection(cid)
                    .unwrap_or_else(|| panic!("scheduling on unknown connection {cid:?}"));
                assert!(
                    conn.has_packets(None),
                    "scheduling on connection {cid:?} with no packets"
                );
            }
        }

        let Some(cid) = *connection else {
            trace!("no eligible connection, empty burst");
            return burst;
        };
        let kind = station
            .connection(cid)
            .map(|c| c.kind())
            .expect("selected connection exists");

        loop {
            let available_bytes = station.phy().bytes_for(available_symbols, modulation);

            let conn = station
                .connection_mut(cid)
                .expect("selected connection exists");
            if !conn.has_packets(Some(header_type)) {
                break;
            }
            let required_bytes = conn.queue().first_required_bytes(header_type);
            trace!(available_bytes, required_bytes, "packing step");

            let pdu = if available_bytes >= required_bytes {
                // The whole packet (or the closing fragment) fits.
                conn.dequeue(header_type)
            } else if kind.can_fragment() {
                let mut header_bytes = conn.queue().first_header_bytes(header_type);
                if !conn.queue().is_fragmentation_in_progress(header_type) {
                    // A fresh chain needs its subheader synthesized.
                    header_bytes += FRAGMENT_SUBHEADER_BYTES;
                }
                if available_bytes > header_bytes {
                    conn.dequeue_fragment(header_type, available_bytes)
                } else {
                    // Not even header + one payload byte.
                    break;
                }
            } else {
                // Management and broadcast traffic never fragments.
                break;
            };

            let Some(pdu) = pdu else {
                break;
            };

            let cost = station.phy().symbols_for(pdu.size_bytes, modulation);
            available_symbols = available_symbols.saturating_sub(cost);
            debug!(
                pdu_bytes = pdu.size_bytes,
                symbols_left = available_symbols,
                fragment = ?pdu.fragment,
                "packed pdu"
            );
            burst.push(pdu);
        }

        burst
    }

    /// Walk the priority ladder and return the first eligible connection.
    ///
    /// A winning UGS/rtPS flow has its deadline re-armed; the grant it just
    /// won consumes the pending one.
    pub fn select_connection(
        &self,
        station: &mut SubscriberStation,
        now: SimTime,
    ) -> Option<Cid> {
        for rung in UPLINK_LADDER {
            let picked = match rung {
                Rung::InitialRanging => {
                    mgmt_with_packets(station.initial_ranging_connection())
                }
                Rung::Basic => mgmt_with_packets(station.basic_connection()),
                Rung::Primary => mgmt_with_packets(station.primary_connection()),
                Rung::Flows(kind) => self.select_flow(station, *kind, now),
                Rung::Broadcast => mgmt_with_packets(station.broadcast_connection()),
            };
            if let Some(cid) = picked {
                debug!(?rung, ?cid, "selected connection");
                return Some(cid);
            }
        }
        trace!("no connection selected");
        None
    }

    /// First eligible flow of a class, in registry insertion order.
    ///
    /// rtPS/nrtPS/BE only ever win data grants here; for bandwidth-request
    /// packets the caller passes the connection into [`Self::schedule`]
    /// directly and selection is skipped. UGS checks any header type.
    fn select_flow(
        &self,
        station: &mut SubscriberStation,
        kind: FlowKind,
        now: SimTime,
    ) -> Option<Cid> {
        let frame_duration = station.phy().frame_duration();

        let mut winner = None;
        for flow in station.flows().flows_of(kind) {
            let conn = station
                .connection(flow.cid())
                .expect("flow connection exists");
            let has_packets = match kind {
                FlowKind::Ugs => conn.has_packets(None),
                _ => conn.has_packets(Some(MacHeaderType::Generic)),
            };
            if has_packets && flow.grant_due(now, frame_duration) {
                winner = Some((flow.sfid(), flow.cid()));
                break;
            }
        }

        let (sfid, cid) = winner?;
        if let Some(flow) = station.flows_mut().get_mut(sfid) {
            flow.rearm(now);
        }
        Some(cid)
    }
}

fn mgmt_with_packets(conn: &super::connection::Connection) -> Option<Cid> {
    conn.has_packets(None).then(|| conn.cid())
}
