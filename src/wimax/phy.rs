//! PHY symbol/byte conversion.
//!
//! The scheduler never does modulation math itself; it converts through
//! this interface. The one rule callers rely on:
//! `bytes_for(symbols_for(b, m), m) >= b` for every byte count `b`.

use std::str::FromStr;

use thiserror::Error;

use crate::sim::SimTime;

/// OFDM modulation and coding schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    Bpsk12,
    Qpsk12,
    Qpsk34,
    Qam16_12,
    Qam16_34,
    Qam64_23,
    Qam64_34,
}

impl Modulation {
    /// Data bytes carried by one OFDM symbol (the FEC block size).
    pub fn bytes_per_symbol(self) -> u32 {
        match self {
            Modulation::Bpsk12 => 12,
            Modulation::Qpsk12 => 24,
            Modulation::Qpsk34 => 36,
            Modulation::Qam16_12 => 48,
            Modulation::Qam16_34 => 72,
            Modulation::Qam64_23 => 96,
            Modulation::Qam64_34 => 108,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error(
    "unknown modulation {0:?} (expected bpsk12, qpsk12, qpsk34, qam16-12, qam16-34, qam64-23 or qam64-34)"
)]
pub struct ParseModulationError(String);

impl FromStr for Modulation {
    type Err = ParseModulationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "bpsk12" => Ok(Modulation::Bpsk12),
            "qpsk12" => Ok(Modulation::Qpsk12),
            "qpsk34" => Ok(Modulation::Qpsk34),
            "qam16-12" => Ok(Modulation::Qam16_12),
            "qam16-34" => Ok(Modulation::Qam16_34),
            "qam64-23" => Ok(Modulation::Qam64_23),
            "qam64-34" => Ok(Modulation::Qam64_34),
            other => Err(ParseModulationError(other.to_string())),
        }
    }
}

/// Uplink PHY capability consumed by the scheduler.
pub trait UplinkPhy: std::fmt::Debug {
    /// Bytes a grant of `symbols` can carry. Monotone in `symbols`.
    fn bytes_for(&self, symbols: u16, modulation: Modulation) -> u32;

    /// Symbols needed for `bytes`, rounding up.
    fn symbols_for(&self, bytes: u32, modulation: Modulation) -> u16;

    fn frame_duration(&self) -> SimTime;
}

/// Table-driven OFDM PHY.
#[derive(Debug, Clone)]
pub struct OfdmPhy {
    frame_duration: SimTime,
}

impl OfdmPhy {
    pub fn new(frame_duration: SimTime) -> Self {
        Self { frame_duration }
    }
}

impl Default for OfdmPhy {
    fn default() -> Self {
        Self::new(SimTime::from_millis(10))
    }
}

impl UplinkPhy for OfdmPhy {
    fn bytes_for(&self, symbols: u16, modulation: Modulation) -> u32 {
        symbols as u32 * modulation.bytes_per_symbol()
    }

    fn symbols_for(&self, bytes: u32, modulation: Modulation) -> u16 {
        let per = modulation.bytes_per_symbol();
        let symbols = (bytes as u64 + per as u64 - 1) / per as u64;
        symbols.min(u16::MAX as u64) as u16
    }

    fn frame_duration(&self) -> SimTime {
        self.frame_duration
    }
}
