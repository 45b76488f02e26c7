mod keyboard;

use std::{
    io::{self, Write},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use gcs_core::utils::{
    config::{
        ClientConfig, DisplayMode, Profile, TransportKind, DEFAULT_BAUD_RATE,
        DEFAULT_BIND_ADDR, DEFAULT_PEER_HOST, DEFAULT_PEER_PORT, DEFAULT_RELEASE_TIMEOUT,
        DEFAULT_TARGET_RPM, POLL_INTERVAL, SERIAL_SETTLE,
    },
    connection::{serial, udp, CommandSink, FrameSource},
    controllers::{self, InputTracker, Key, KeyEvent},
    protocol::Command,
    Teleop, TelemetryIngestor,
};
use keyboard::{Input, Keyboard};
use tracing::{error, info};

/// Poll period of the input loop when no tick is due.
const IDLE_WAIT: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    /// FORWARD/BOOST/LEFT/RIGHT/ROTATE_Q/ROTATE_E/STOP on key transitions
    Edge,
    /// M/CL/CR/RL/RR:<rpm> every tick, arrow keys set the RPM
    Polled,
}

#[derive(Clone, Copy, ValueEnum)]
enum DisplayArg {
    Status,
    Raw,
    Json,
}

#[derive(Parser)]
#[clap(version = "1.0", about = "Robobook ground-control teleoperation client")]
struct Opts {
    /// Robot address (IP or hostname)
    #[clap(long, default_value = DEFAULT_PEER_HOST)]
    peer: String,
    /// Robot UDP port
    #[clap(long, default_value_t = DEFAULT_PEER_PORT)]
    port: u16,
    /// Local UDP bind address
    #[clap(long, default_value = DEFAULT_BIND_ADDR)]
    bind: String,
    /// Talk to a serial transmitter bridge instead of UDP
    #[clap(long)]
    serial: Option<String>,
    /// Serial baud rate
    #[clap(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,
    /// Wait after opening the serial port (ms)
    #[clap(long, default_value_t = SERIAL_SETTLE.as_millis() as u64)]
    settle_ms: u64,
    /// Key-to-command profile
    #[clap(long, value_enum, default_value_t = ProfileArg::Edge)]
    profile: ProfileArg,
    /// Tick period of the polled profile (ms)
    #[clap(long, default_value_t = POLL_INTERVAL.as_millis() as u64)]
    tick_ms: u64,
    /// Starting target RPM of the polled profile
    #[clap(long, default_value_t = DEFAULT_TARGET_RPM)]
    initial_rpm: u32,
    /// Keep driving after W is released
    #[clap(long)]
    no_momentary_stop: bool,
    /// Telemetry display
    #[clap(long, value_enum, default_value_t = DisplayArg::Status)]
    display: DisplayArg,
    /// Treat a key as released after this long without a repeat (ms); keep it
    /// above the terminal's initial autorepeat delay
    #[clap(long, default_value_t = DEFAULT_RELEASE_TIMEOUT.as_millis() as u64)]
    release_timeout_ms: u64,
}

impl From<Opts> for ClientConfig {
    fn from(opts: Opts) -> Self {
        let transport = match opts.serial {
            Some(path) => TransportKind::Serial {
                path,
                baud_rate: opts.baud,
                settle: Duration::from_millis(opts.settle_ms),
            },
            None => TransportKind::Udp { bind: opts.bind },
        };
        ClientConfig {
            peer_host: opts.peer,
            peer_port: opts.port,
            transport,
            profile: match opts.profile {
                ProfileArg::Edge => Profile::Edge,
                ProfileArg::Polled => Profile::Polled,
            },
            poll_interval: Duration::from_millis(opts.tick_ms),
            initial_rpm: opts.initial_rpm,
            momentary_stop: !opts.no_momentary_stop,
            display: match opts.display {
                DisplayArg::Status => DisplayMode::Status,
                DisplayArg::Raw => DisplayMode::Raw,
                DisplayArg::Json => DisplayMode::Json,
            },
            release_timeout: Duration::from_millis(opts.release_timeout_ms),
        }
    }
}

type Sink = Box<dyn CommandSink + Send>;
type Source = Box<dyn FrameSource + Send>;

/// Build both halves of the link. Any failure here is fatal.
fn open_link(config: &ClientConfig) -> anyhow::Result<(Sink, Source)> {
    match &config.transport {
        TransportKind::Udp { bind } => {
            let (tx, rx) = udp::open(bind, &config.peer_host, config.peer_port).with_context(
                || {
                    format!(
                        "cannot reach robot at {}:{}",
                        config.peer_host, config.peer_port
                    )
                },
            )?;
            Ok((Box::new(tx), Box::new(rx)))
        }
        TransportKind::Serial {
            path,
            baud_rate,
            settle,
        } => {
            let (tx, rx) = serial::open(path, *baud_rate, *settle)
                .with_context(|| format!("cannot open serial bridge {path}"))?;
            Ok((Box::new(tx), Box::new(rx)))
        }
    }
}

fn print_banner(config: &ClientConfig) {
    println!("========================================");
    println!("   ROBOBOOK GROUND CONTROL");
    println!("========================================");
    match config.profile {
        Profile::Edge => {
            println!("Hold W          : Move Forward");
            println!("Hold SHIFT + W  : High-Speed Boost");
            if config.momentary_stop {
                println!("Release W       : Automatic Stop");
            }
            println!("A / D           : Adjust Heading");
            println!("Q / E           : Pivot Rotation");
            println!("S               : Emergency Stop");
        }
        Profile::Polled => {
            println!("UP / DOWN       : Target RPM ({})", config.initial_rpm);
            println!("W               : Forward");
            println!("A / D           : Curve While Moving");
            println!("Q / E           : Pivot In Place");
            println!("S / none        : Stop");
        }
    }
    println!("ESC / CTRL+C    : Quit");
    println!("========================================");
}

/// Console note for transitions the operator should notice.
fn announce(
    event: KeyEvent,
    command: Command,
) {
    let note = match (event, command) {
        (KeyEvent::Release(Key::W), Command::Stop) => "Key W released: robot STOP initiated.",
        (KeyEvent::Press(Key::Shift(_)), Command::Boost) => "Shift pressed: high-speed boost.",
        (KeyEvent::Release(Key::Shift(_)), Command::Forward) => {
            "Shift released: returning to normal speed."
        }
        _ => return,
    };
    // Raw mode: no implicit carriage return.
    print!("\r\n[EVENT] {note}\r\n");
    let _ = io::stdout().flush();
}

/// Key handling on the calling thread until the operator quits.
fn run_input<T, S>(
    keyboard: &mut Keyboard,
    teleop: &mut Teleop<T, S>,
) -> io::Result<()>
where
    T: InputTracker,
    S: CommandSink,
{
    let tick = teleop.tracker().tick_interval();
    let mut next_tick = Instant::now();
    let mut shown_rpm = None;

    loop {
        let wait = match tick {
            Some(_) => next_tick.saturating_duration_since(Instant::now()),
            None => IDLE_WAIT,
        };

        match keyboard.next(wait)? {
            Some(Input::Quit) => break,
            Some(Input::Key(event)) => {
                if let Some(command) = teleop.handle(event) {
                    announce(event, command);
                }
            }
            None => {}
        }

        if let Some(period) = tick {
            let now = Instant::now();
            if now >= next_tick {
                teleop.tick();
                next_tick = (next_tick + period).max(now);
            }
        }

        let rpm = teleop.tracker().target_rpm();
        if rpm != shown_rpm {
            if let Some(rpm) = rpm {
                print!("\r\n[RPM] TARGET RPM: {rpm}\r\n");
                let _ = io::stdout().flush();
            }
            shown_rpm = rpm;
        }
    }

    info!("operator quit");
    teleop.stop();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let opts: Opts = Opts::parse();
    let config = ClientConfig::from(opts);
    info!(%config, "starting ground control");

    let (sink, source) = open_link(&config)?;
    print_banner(&config);

    let ingestor = TelemetryIngestor::new(source, io::stdout(), config.display);
    let _telemetry: JoinHandle<()> = thread::Builder::new()
        .name("telemetry".into())
        .spawn(move || {
            ingestor.run();
        })
        .context("cannot start telemetry thread")?;

    let mut teleop = Teleop::new(controllers::tracker_for(&config), sink);
    let mut keyboard = Keyboard::open(config.release_timeout).context("cannot use terminal")?;
    let result = run_input(&mut keyboard, &mut teleop);
    drop(keyboard);

    if let Err(e) = &result {
        error!("input loop failed: {:?}", e);
    }
    let stats = teleop.dispatcher().stats();
    info!(sent = stats.sent, dropped = stats.dropped, "ground control stopped");
    println!();
    result.context("keyboard input failed")
}
