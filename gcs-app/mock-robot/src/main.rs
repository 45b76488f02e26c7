use std::{
    io::ErrorKind,
    net::{SocketAddr, UdpSocket},
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use gcs_core::utils::{config::RECV_BUFFER_SIZE, protocol::Command};
use tracing::{debug, info, warn};

/// Wheel RPMs used for the fixed-speed vocabulary.
const CRUISE_RPM: f32 = 60.0;
const BOOST_RPM: f32 = 120.0;
/// Heading change per period per RPM of wheel difference (degrees).
const TURN_GAIN: f32 = 0.02;

#[derive(Parser)]
#[clap(version = "1.0", about = "Stand-in robot for bench-testing ground control")]
struct Opts {
    /// Address to listen on for commands
    #[clap(long, default_value = "0.0.0.0:4210")]
    bind: String,
    /// Telemetry period (ms)
    #[clap(long, default_value_t = 100)]
    period_ms: u64,
}

/// Open-loop wheel state driven straight from the last command.
#[derive(Debug, Default)]
struct Wheels {
    rpm: (f32, f32),
    heading: f32,
}

impl Wheels {
    fn apply(
        &mut self,
        command: Command,
    ) {
        self.rpm = match command {
            Command::Forward => (CRUISE_RPM, CRUISE_RPM),
            Command::Boost => (BOOST_RPM, BOOST_RPM),
            Command::Left => (CRUISE_RPM / 2.0, CRUISE_RPM),
            Command::Right => (CRUISE_RPM, CRUISE_RPM / 2.0),
            Command::RotateQ => (-CRUISE_RPM, CRUISE_RPM),
            Command::RotateE => (CRUISE_RPM, -CRUISE_RPM),
            Command::Stop => (0.0, 0.0),
            Command::Move(n) => (n as f32, n as f32),
            Command::CurveLeft(n) => (n as f32 / 2.0, n as f32),
            Command::CurveRight(n) => (n as f32, n as f32 / 2.0),
            Command::RotateLeft(n) => (-(n as f32), n as f32),
            Command::RotateRight(n) => (n as f32, -(n as f32)),
        };
    }

    fn step(&mut self) {
        self.heading = (self.heading + (self.rpm.1 - self.rpm.0) * TURN_GAIN).rem_euclid(360.0);
    }

    /// `rpm0,rpm1,load0,load1,0,0,heading`
    fn frame(&self) -> String {
        let load = |rpm: f32| rpm.abs() / BOOST_RPM;
        format!(
            "{:.0},{:.0},{:.2},{:.2},0,0,{:.1}",
            self.rpm.0,
            self.rpm.1,
            load(self.rpm.0),
            load(self.rpm.1),
            self.heading
        )
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opts: Opts = Opts::parse();
    let period = Duration::from_millis(opts.period_ms);

    let socket =
        UdpSocket::bind(&opts.bind).with_context(|| format!("cannot bind {}", opts.bind))?;
    socket.set_read_timeout(Some(period))?;
    info!(addr = %socket.local_addr()?, "mock robot listening");

    let mut wheels = Wheels::default();
    let mut ground: Option<SocketAddr> = None;
    let mut next_frame = Instant::now() + period;
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    loop {
        match socket.recv_from(&mut buf) {
            Ok((len, from)) => {
                let token = String::from_utf8_lossy(&buf[..len]);
                match token.parse::<Command>() {
                    Ok(command) => {
                        info!(%from, %command, "command received");
                        wheels.apply(command);
                    }
                    Err(error) => warn!(%from, %error, "ignoring datagram"),
                }
                if ground != Some(from) {
                    info!(%from, "streaming telemetry");
                    ground = Some(from);
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => debug!(error = %e, "receive failed"),
        }

        if Instant::now() >= next_frame {
            next_frame += period;
            wheels.step();
            if let Some(peer) = ground {
                if let Err(e) = socket.send_to(wheels.frame().as_bytes(), peer) {
                    debug!(error = %e, %peer, "telemetry send failed");
                }
            }
        }
    }
}
