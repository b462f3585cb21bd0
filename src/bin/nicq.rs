//! nicq - per-queue NIC statistics monitor.
//!
//! Shows packet and byte counts plus throughput for every queue of one or
//! more network interfaces, as a full-screen dashboard, plain text, or a log
//! file.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[cfg(target_os = "linux")]
use nicq::source::EthtoolSource;
use nicq::output::{LogFormat, LogSink, Sink, TextSink};
use nicq::source::MockSource;
use nicq::tui::App;
use nicq::{
    CounterSource, Interface, InterfaceOptions, Monitor, ParserRegistry, QueueZeroPolicy,
};

/// Per-queue NIC statistics monitor.
#[derive(Parser)]
#[command(name = "nicq", about = "Per-queue NIC statistics monitor", version)]
struct Args {
    /// Network interfaces to monitor.
    #[arg(required_unless_present = "list_drivers")]
    interfaces: Vec<String>,

    /// Fall back to the generic parser for unknown drivers.
    #[arg(short, long)]
    generic: bool,

    /// Plain text output instead of the dashboard.
    #[arg(short, long)]
    text: bool,

    /// Log mode: append records to a file.
    #[arg(short, long)]
    log: bool,

    /// Log file.
    #[arg(short, long, value_name = "PATH", default_value = "nicq.log")]
    file: PathBuf,

    /// Log record format: tsv or json.
    #[arg(long, default_value = "tsv", value_parser = parse_format)]
    format: LogFormat,

    /// Refresh interval in seconds (fractions allowed).
    #[arg(short, long, default_value = "1", value_parser = parse_interval)]
    interval: Duration,

    /// Ignore queue counters that read zero at startup.
    #[arg(long)]
    skip_idle_queues: bool,

    /// TOML file with extra driver definitions.
    #[arg(long, value_name = "PATH")]
    drivers: Option<PathBuf>,

    /// Read scripted counters instead of the hardware. The driver is picked
    /// from the interface name: mlx*, vmx*/ens*, e1000*, anything else ixgbe.
    #[arg(long)]
    demo: bool,

    /// List the supported drivers and exit.
    #[arg(long)]
    list_drivers: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Dashboard,
    Text,
    Log,
}

impl Args {
    fn mode(&self) -> Mode {
        if self.log {
            Mode::Log
        } else if self.text {
            Mode::Text
        } else {
            Mode::Dashboard
        }
    }
}

/// Parses a positive, possibly fractional number of seconds.
fn parse_interval(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid interval '{}': {}", s, e))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("interval must be positive, got '{}'", s));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid interval '{}': {}", s, e))
}

fn parse_format(s: &str) -> Result<LogFormat, String> {
    s.parse()
}

/// Initializes the tracing subscriber on stderr.
/// Default level is INFO; the dashboard only lets errors through.
fn init_logging(verbose: u8, quiet: bool, mode: Mode) {
    let level = if quiet || mode == Mode::Dashboard {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn demo_source(name: &str) -> MockSource {
    if name.starts_with("mlx") {
        MockSource::mlx5_demo(4)
    } else if name.starts_with("vmx") || name.starts_with("ens") {
        MockSource::vmxnet3_demo(2)
    } else if name.starts_with("e1000") {
        MockSource::unknown_driver_demo()
    } else {
        MockSource::ixgbe_demo(4)
    }
}

#[cfg(target_os = "linux")]
fn open_source(name: &str, demo: bool) -> Result<Box<dyn CounterSource>, Box<dyn Error>> {
    if demo {
        return Ok(Box::new(demo_source(name)));
    }
    Ok(Box::new(EthtoolSource::open(name)?))
}

#[cfg(not(target_os = "linux"))]
fn open_source(name: &str, demo: bool) -> Result<Box<dyn CounterSource>, Box<dyn Error>> {
    if !demo {
        warn!("ethtool is only available on Linux, using demo counters");
    }
    Ok(Box::new(demo_source(name)))
}

/// Text and log modes: render every cycle until interrupted.
fn run_lines<S: CounterSource, K: Sink>(
    mut monitor: Monitor<S>,
    mut sink: K,
) -> Result<(), Box<dyn Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    while running.load(Ordering::SeqCst) {
        let report = monitor.next_report()?;
        sink.write_report(&report)?;
    }

    info!("Interrupted, exiting");
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut registry = ParserRegistry::builtin()?;
    if let Some(path) = &args.drivers {
        let count = registry.load_file(path)?;
        info!("Loaded {} driver definitions from {}", count, path.display());
    }

    if args.list_drivers {
        for (driver, kind) in registry.drivers() {
            println!("{:<16} {}", driver, kind);
        }
        return Ok(());
    }

    let options = InterfaceOptions {
        allow_generic: args.generic,
        zero_policy: if args.skip_idle_queues {
            QueueZeroPolicy::SkipZero
        } else {
            QueueZeroPolicy::Include
        },
    };

    let mut interfaces = Vec::with_capacity(args.interfaces.len());
    for name in &args.interfaces {
        let source = open_source(name, args.demo)?;
        let iface = Interface::open(name.as_str(), source, &registry, &options)?;
        info!(
            "{}: driver {} ({} parser), {} queues",
            iface.name(),
            iface.driver(),
            iface.parser_name(),
            iface.queue_count()
        );
        interfaces.push(iface);
    }

    let monitor = Monitor::new(interfaces, args.interval);
    debug!("Polling every {:?}", args.interval);

    match args.mode() {
        Mode::Dashboard => App::new(monitor).run()?,
        Mode::Text => run_lines(monitor, TextSink::new(io::stdout().lock()))?,
        Mode::Log => {
            let sink = LogSink::open(&args.file, args.format)?;
            info!("Logging to {}", args.file.display());
            run_lines(monitor, sink)?
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet, args.mode());

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("1"), Ok(Duration::from_secs(1)));
        assert_eq!(parse_interval("0.25"), Ok(Duration::from_millis(250)));
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("-1").is_err());
        assert!(parse_interval("inf").is_err());
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn test_mode() {
        let args = Args::parse_from(["nicq", "eth0"]);
        assert_eq!(args.mode(), Mode::Dashboard);
        let args = Args::parse_from(["nicq", "-t", "eth0"]);
        assert_eq!(args.mode(), Mode::Text);
        let args = Args::parse_from(["nicq", "-t", "-l", "eth0"]);
        assert_eq!(args.mode(), Mode::Log);
    }

    #[test]
    fn test_args_require_interface() {
        assert!(Args::try_parse_from(["nicq"]).is_err());
        assert!(Args::try_parse_from(["nicq", "--list-drivers"]).is_ok());
    }

    #[test]
    fn test_demo_sources_open() {
        let registry = ParserRegistry::builtin().unwrap();
        let options = InterfaceOptions {
            allow_generic: true,
            ..Default::default()
        };
        for name in ["eth0", "mlx0", "ens160", "e1000-0"] {
            let iface = Interface::open(name, demo_source(name), &registry, &options);
            assert!(iface.is_ok(), "{name}");
        }
    }
}
