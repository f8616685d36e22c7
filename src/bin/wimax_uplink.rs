use clap::Parser;
use std::any::Any;
use tracing::info;
use wsim_rs::sim::{Event, SimTime, Simulator, World};
use wsim_rs::wimax::{
    MacHeaderType, MacSdu, Modulation, OfdmPhy, Scheduling, SubscriberStation,
};

#[derive(Debug, Parser)]
#[command(
    name = "wimax-uplink",
    about = "Drive one WiMAX subscriber station through a series of uplink grants"
)]
struct Args {
    /// Symbols granted per frame
    #[arg(long, default_value_t = 40)]
    symbols_per_frame: u16,

    /// Uplink modulation
    #[arg(long, default_value = "qpsk34")]
    modulation: Modulation,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 20)]
    frames: u32,

    /// Frame duration (ms)
    #[arg(long, default_value_t = 5)]
    frame_ms: u64,

    /// UGS voice packet payload (bytes), one packet enqueued per frame slot
    #[arg(long, default_value_t = 120)]
    voice_payload: u32,

    /// Best-effort bulk packet payload (bytes)
    #[arg(long, default_value_t = 1494)]
    bulk_payload: u32,

    /// Number of best-effort bulk packets to enqueue up front
    #[arg(long, default_value_t = 8)]
    bulk_packets: u32,
}

/// World: one subscriber station plus burst accounting.
struct SsWorld {
    station: SubscriberStation,
    bursts: u64,
    sent_pdus: u64,
    sent_bytes: u64,
}

impl World for SsWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Event: one uplink grant per frame, self-rescheduling.
struct UplinkGrant {
    remaining_frames: u32,
    symbols: u16,
    modulation: Modulation,
}

impl Event for UplinkGrant {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let UplinkGrant {
            remaining_frames,
            symbols,
            modulation,
        } = *self;
        let w = world
            .as_any_mut()
            .downcast_mut::<SsWorld>()
            .expect("world must be SsWorld");

        let mut connection = None;
        let burst = w.station.serve_grant(
            sim.now(),
            symbols,
            modulation,
            MacHeaderType::Generic,
            &mut connection,
        );

        if !burst.is_empty() {
            info!(
                now = ?sim.now(),
                ?connection,
                pdus = burst.len(),
                bytes = burst.total_bytes(),
                "uplink burst"
            );
            w.bursts += 1;
            w.sent_pdus += burst.len() as u64;
            w.sent_bytes += burst.total_bytes() as u64;
        }

        if remaining_frames > 1 {
            let frame = w.station.phy().frame_duration();
            sim.schedule_in(
                frame,
                UplinkGrant {
                    remaining_frames: remaining_frames - 1,
                    symbols,
                    modulation,
                },
            );
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let phy = OfdmPhy::new(SimTime::from_millis(args.frame_ms));
    let mut station = SubscriberStation::new(Box::new(phy));

    let voice_cid = station.add_service_flow(Scheduling::Ugs {
        grant_interval: SimTime::from_millis(args.frame_ms),
    });
    let video_cid = station.add_service_flow(Scheduling::Rtps {
        polling_interval: SimTime::from_millis(args.frame_ms.saturating_mul(4)),
    });
    let bulk_cid = station.add_service_flow(Scheduling::Be);

    // One ranging request plus a little primary management chatter, then a
    // voice packet per frame, some video, and a bulk backlog.
    let mut sdu_id = 0;
    let mut next_sdu = |payload: u32| {
        sdu_id += 1;
        MacSdu::new(sdu_id, payload, MacHeaderType::Generic)
    };

    let ranging_cid = station.initial_ranging_connection().cid();
    let primary_cid = station.primary_connection().cid();
    station
        .enqueue(ranging_cid, next_sdu(34))
        .expect("enqueue ranging");
    station
        .enqueue(primary_cid, next_sdu(58))
        .expect("enqueue management");

    for _ in 0..args.frames {
        station
            .enqueue(voice_cid, next_sdu(args.voice_payload))
            .expect("enqueue voice");
    }
    for _ in 0..4 {
        station
            .enqueue(video_cid, next_sdu(args.voice_payload.saturating_mul(4)))
            .expect("enqueue video");
    }
    for _ in 0..args.bulk_packets {
        station
            .enqueue(bulk_cid, next_sdu(args.bulk_payload))
            .expect("enqueue bulk");
    }

    let mut sim = Simulator::default();
    let mut world = SsWorld {
        station,
        bursts: 0,
        sent_pdus: 0,
        sent_bytes: 0,
    };

    sim.schedule(
        SimTime::ZERO,
        UplinkGrant {
            remaining_frames: args.frames,
            symbols: args.symbols_per_frame,
            modulation: args.modulation,
        },
    );
    sim.run(&mut world);

    println!(
        "done @ {:?}, frames={}, bursts={}, pdus={}, bytes={}, poll_me={}",
        sim.now(),
        args.frames,
        world.bursts,
        world.sent_pdus,
        world.sent_bytes,
        world.station.poll_me()
    );
}
