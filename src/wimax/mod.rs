//! WiMAX subscriber-station (SS) uplink MAC components.
//!
//! The heart of this module is [`SsScheduler`]: given an uplink grant of
//! PHY symbols, it picks one connection by strict priority and drains its
//! queue into a burst, fragmenting on transport connections when a whole
//! packet does not fit.

mod burst;
mod cid;
mod connection;
mod mac_queue;
mod pdu;
mod phy;
mod service_flow;
mod ss_scheduler;
mod station;

pub use burst::Burst;
pub use cid::{Cid, ConnectionType};
pub use connection::Connection;
pub use mac_queue::{MacQueue, UplinkQueue, DEFAULT_QUEUE_PACKETS};
pub use pdu::{
    FragmentStage, MacHeaderType, MacPdu, MacSdu, BANDWIDTH_REQUEST_HEADER_BYTES,
    FRAGMENT_SUBHEADER_BYTES, GENERIC_HEADER_BYTES,
};
pub use phy::{Modulation, OfdmPhy, ParseModulationError, UplinkPhy};
pub use service_flow::{FlowKind, Scheduling, ServiceFlow, ServiceFlowRegistry};
pub use ss_scheduler::SsScheduler;
pub use station::SubscriberStation;
