//! Reference constants and client configuration.
//!
//! The client has no configuration files. Every knob is a constant here,
//! optionally overridden by the command-line options of the binaries.

use core::{fmt, time::Duration};

use serde::Serialize;

/// Robot address used by the reference bench setup.
pub const DEFAULT_PEER_HOST: &str = "192.168.100.22";
/// UDP port the robot firmware listens on.
pub const DEFAULT_PEER_PORT: u16 = 4210;
/// Local bind address for the UDP transport (ephemeral port).
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:0";
/// Baud rate of the serial transmitter bridge.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Delay after opening the serial port; the bridge board resets on open.
pub const SERIAL_SETTLE: Duration = Duration::from_millis(2000);
/// Read timeout on the serial reader half.
pub const SERIAL_READ_TIMEOUT: Duration = Duration::from_millis(100);
/// Tick period of the polled profile.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Starting value of the target RPM in the polled profile.
pub const DEFAULT_TARGET_RPM: u32 = 20;
/// Minimum field count of a status telemetry frame.
pub const MIN_STATUS_FIELDS: usize = 7;
/// Receive buffer size; one datagram never exceeds this.
pub const RECV_BUFFER_SIZE: usize = 1024;
/// Pause of the telemetry loop after a receive error other than a timeout.
pub const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);
/// Key-release inference window for terminals that never report releases.
///
/// Must exceed the initial autorepeat delay of the desktop (660 ms on a
/// stock X11 server), or a held key is released before its first repeat.
pub const DEFAULT_RELEASE_TIMEOUT: Duration = Duration::from_millis(750);

/// Which key-to-command state machine drives the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Edge-triggered `FORWARD`/`BOOST`/... vocabulary.
    #[default]
    Edge,
    /// 50 ms polled `M:<rpm>`/`CL:<rpm>`/... vocabulary.
    Polled,
}

/// How telemetry frames are rendered on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Overwritten `[STATUS]` line built from fixed field positions.
    #[default]
    Status,
    /// Overwritten `[TELEMETRY]` line echoing the payload verbatim.
    Raw,
    /// One JSON object per frame.
    Json,
}

/// Physical link to the robot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportKind {
    /// Datagram socket to `peer_host:peer_port`.
    Udp { bind: String },
    /// Byte-stream serial bridge.
    Serial {
        path: String,
        baud_rate: u32,
        #[serde(with = "millis")]
        settle: Duration,
    },
}

/// Complete runtime configuration of the ground-control client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    pub peer_host: String,
    pub peer_port: u16,
    pub transport: TransportKind,
    pub profile: Profile,
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    pub initial_rpm: u32,
    /// Send `STOP` whenever the drive key is released.
    pub momentary_stop: bool,
    pub display: DisplayMode,
    #[serde(with = "millis")]
    pub release_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            peer_host: DEFAULT_PEER_HOST.into(),
            peer_port: DEFAULT_PEER_PORT,
            transport: TransportKind::Udp {
                bind: DEFAULT_BIND_ADDR.into(),
            },
            profile: Profile::default(),
            poll_interval: POLL_INTERVAL,
            initial_rpm: DEFAULT_TARGET_RPM,
            momentary_stop: true,
            display: DisplayMode::default(),
            release_timeout: DEFAULT_RELEASE_TIMEOUT,
        }
    }
}

/// Rendered as one JSON object, for startup logs.
impl fmt::Display for ClientConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

mod millis {
    use core::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
