mod alert;
mod clock;
mod config;
mod network;
mod timer;

use std::{
    path::PathBuf,
    process::ExitCode,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use alert::AlertSignal;
use clap::Parser;
use clock::LinuxClock;
use config::Config;
use fern::colors::Color;
use network::UdpNetwork;
use ptp_proto::{Alert, ClockIdentity, Port, PortState};
use rand::{rngs::StdRng, SeedableRng};
use timer::TokioTimers;
use tokio::runtime::Handle;

/// The engine runs at least this often, even without alerts
const POLL_INTERVAL: Duration = Duration::from_millis(100);

type LinuxPort = Port<UdpNetwork, LinuxClock, TokioTimers, StdRng>;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file to use
    #[clap(long, short = 'c', default_value = "ptpd.toml")]
    config: PathBuf,
}

fn setup_logger(level: log::LevelFilter) -> Result<(), fern::InitError> {
    let colors = fern::colors::ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::BrightGreen)
        .debug(Color::BrightBlue)
        .trace(Color::BrightBlack);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            use std::time::{SystemTime, UNIX_EPOCH};

            let delta = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();

            let h = delta.as_secs() % (24 * 60 * 60) / (60 * 60);
            let m = delta.as_secs() % (60 * 60) / 60;
            let s = delta.as_secs() % 60;
            let f = delta.subsec_micros();

            out.finish(format_args!(
                "{}[{}][{}] {}",
                format_args!("[{h:02}:{m:02}:{s:02}.{f:06}]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

/// The configured identity, or one derived from a hardware address
fn clock_identity(config: &Config) -> ClockIdentity {
    if let Some(identity) = config.identity {
        return identity;
    }

    match network::find_mac_address(config.port.interface) {
        Ok(Some(mac)) => ClockIdentity::from_mac_address(mac),
        Ok(None) => {
            log::warn!("no usable hardware address, using a random clock identity");
            ClockIdentity::from_mac_address(rand::random())
        }
        Err(error) => {
            log::warn!("could not list interfaces ({error}), using a random clock identity");
            ClockIdentity::from_mac_address(rand::random())
        }
    }
}

/// Drive the engine until `stop` is set
fn run_engine(mut port: LinuxPort, alert: Arc<AlertSignal>, stop: Arc<AtomicBool>) {
    let mut last_state = port.state();

    while !stop.load(Ordering::Relaxed) {
        port.do_state();
        while port.has_pending() && !stop.load(Ordering::Relaxed) {
            port.do_state();
        }

        let state = port.state();
        if state != last_state {
            if state == PortState::Slave {
                log::info!(
                    "synchronizing to {} via {}",
                    port.parent_ds().grandmaster_identity(),
                    port.parent_ds().parent_port_identity()
                );
            }
            last_state = state;
        }

        alert.wait_timeout(POLL_INTERVAL);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error loading config {}: {error}", args.config.display());
            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = setup_logger(config.loglevel) {
        eprintln!("could not setup logging: {error}");
        return ExitCode::FAILURE;
    }

    let identity = clock_identity(&config);
    log::info!("clock identity {identity}");

    let alert = Arc::new(AlertSignal::new());
    let handle = Handle::current();
    let port = Port::new(
        config.protocol_config(identity),
        UdpNetwork::new(handle.clone(), config.port.interface, alert.clone()),
        LinuxClock::REALTIME,
        TokioTimers::new(handle, alert.clone()),
        StdRng::from_entropy(),
    );

    let stop = Arc::new(AtomicBool::new(false));
    let engine = tokio::task::spawn_blocking({
        let alert = alert.clone();
        let stop = stop.clone();
        move || run_engine(port, alert, stop)
    });

    if let Err(error) = tokio::signal::ctrl_c().await {
        log::error!("could not wait for shutdown signal: {error}");
    }

    log::info!("shutting down");
    stop.store(true, Ordering::Relaxed);
    alert.alert();

    match engine.await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("engine stopped unexpectedly: {error}");
            ExitCode::FAILURE
        }
    }
}
