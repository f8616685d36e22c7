//! Subscriber station: the capability bundle the scheduler works against.
//!
//! Owns the four fixed management connections, the transport connections
//! and their service flows, the PHY, and the scheduler itself.

use crate::sim::SimTime;

use super::burst::Burst;
use super::cid::{Cid, ConnectionType};
use super::connection::Connection;
use super::mac_queue::UplinkQueue;
use super::pdu::{MacHeaderType, MacSdu};
use super::phy::{Modulation, UplinkPhy};
use super::service_flow::{Scheduling, ServiceFlowRegistry};
use super::ss_scheduler::SsScheduler;

/// First CID handed out to transport connections.
const FIRST_TRANSPORT_CID: u16 = 0x0100;

#[derive(Debug)]
pub struct SubscriberStation {
    initial_ranging: Connection,
    basic: Connection,
    primary: Connection,
    broadcast: Connection,
    transports: Vec<Connection>,
    flows: ServiceFlowRegistry,
    phy: Box<dyn UplinkPhy>,
    scheduler: SsScheduler,
    next_transport_cid: u16,
}

impl SubscriberStation {
    /// Default basic/primary CIDs; there is no base station here to assign
    /// them, so the station picks its own.
    pub fn new(phy: Box<dyn UplinkPhy>) -> Self {
        Self::with_cids(Cid(0x0001), Cid(0x0002), phy)
    }

    pub fn with_cids(basic: Cid, primary: Cid, phy: Box<dyn UplinkPhy>) -> Self {
        Self {
            initial_ranging: Connection::new(Cid::INITIAL_RANGING, ConnectionType::InitialRanging),
            basic: Connection::new(basic, ConnectionType::Basic),
            primary: Connection::new(primary, ConnectionType::Primary),
            broadcast: Connection::new(Cid::BROADCAST, ConnectionType::Broadcast),
            transports: Vec::new(),
            flows: ServiceFlowRegistry::default(),
            phy,
            scheduler: SsScheduler::default(),
            next_transport_cid: FIRST_TRANSPORT_CID,
        }
    }

    pub fn phy(&self) -> &dyn UplinkPhy {
        self.phy.as_ref()
    }

    pub fn initial_ranging_connection(&self) -> &Connection {
        &self.initial_ranging
    }

    pub fn basic_connection(&self) -> &Connection {
        &self.basic
    }

    pub fn primary_connection(&self) -> &Connection {
        &self.primary
    }

    pub fn broadcast_connection(&self) -> &Connection {
        &self.broadcast
    }

    pub fn flows(&self) -> &ServiceFlowRegistry {
        &self.flows
    }

    pub fn flows_mut(&mut self) -> &mut ServiceFlowRegistry {
        &mut self.flows
    }

    /// Create a transport connection bound to a new service flow of the
    /// given class; returns the connection's CID.
    pub fn add_service_flow(&mut self, scheduling: Scheduling) -> Cid {
        let cid = self.alloc_transport_cid();
        self.transports
            .push(Connection::new(cid, ConnectionType::Transport));
        self.flows.register(cid, scheduling);
        cid
    }

    /// Like [`Self::add_service_flow`] with a caller-supplied queue
    /// implementation behind the connection.
    pub fn add_service_flow_with_queue(
        &mut self,
        scheduling: Scheduling,
        queue: Box<dyn UplinkQueue>,
    ) -> Cid {
        let cid = self.alloc_transport_cid();
        self.transports
            .push(Connection::with_queue(cid, ConnectionType::Transport, queue));
        self.flows.register(cid, scheduling);
        cid
    }

    fn alloc_transport_cid(&mut self) -> Cid {
        let cid = Cid(self.next_transport_cid);
        self.next_transport_cid = self
            .next_transport_cid
            .checked_add(1)
            .expect("transport CID space exhausted");
        cid
    }

    pub fn connection(&self, cid: Cid) -> Option<&Connection> {
        [
            &self.initial_ranging,
            &self.basic,
            &self.primary,
            &self.broadcast,
        ]
        .into_iter()
        .find(|c| c.cid() == cid)
        .or_else(|| self.transports.iter().find(|c| c.cid() == cid))
    }

    pub fn connection_mut(&mut self, cid: Cid) -> Option<&mut Connection> {
        if self.initial_ranging.cid() == cid {
            return Some(&mut self.initial_ranging);
        }
        if self.basic.cid() == cid {
            return Some(&mut self.basic);
        }
        if self.primary.cid() == cid {
            return Some(&mut self.primary);
        }
        if self.broadcast.cid() == cid {
            return Some(&mut self.broadcast);
        }
        self.transports.iter_mut().find(|c| c.cid() == cid)
    }

    /// Enqueue an SDU on a connection. Unknown CIDs are a programming
    /// error; a full queue hands the SDU back.
    pub fn enqueue(&mut self, cid: Cid, sdu: MacSdu) -> Result<(), MacSdu> {
        let conn = self
            .connection_mut(cid)
            .unwrap_or_else(|| panic!("enqueue on unknown connection {cid:?}"));
        conn.enqueue(sdu)
    }

    /// Run the scheduler for one uplink grant.
    pub fn serve_grant(
        &mut self,
        now: SimTime,
        available_symbols: u16,
        modulation: Modulation,
        header_type: MacHeaderType,
        connection: &mut Option<Cid>,
    ) -> Burst {
        // Move the scheduler out so it can borrow the rest of the station.
        let mut scheduler = std::mem::take(&mut self.scheduler);
        let burst = scheduler.schedule(
            self,
            now,
            available_symbols,
            modulation,
            header_type,
            connection,
        );
        self.scheduler = scheduler;
        burst
    }

    pub fn set_poll_me(&mut self, poll_me: bool) {
        self.scheduler.set_poll_me(poll_me);
    }

    pub fn poll_me(&self) -> bool {
        self.scheduler.poll_me()
    }
}
