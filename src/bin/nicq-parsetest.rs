//! nicq-parsetest - runs a driver parser over `ethtool -S` output.
//!
//! Prints every `name: value` line with its classification:
//!
//! ```text
//!   0 |   0 RX B | [0]: rx_bytes: 1234
//!   1 |          | [0]: rx_errors: 0
//!   2 | tot TX P | tx_ucast_frames: 99
//! ```

use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use nicq::parser::{Classification, DriverParser, ParseContext};
use nicq::source::dump::parse_line;
use nicq::{ParserRegistry, Slot};

/// Check how a driver parser classifies ethtool statistics.
#[derive(Parser)]
#[command(name = "nicq-parsetest", version)]
struct Args {
    /// Driver name, as reported by `ethtool -i`.
    driver: String,

    /// Input file, `-` for stdin.
    #[arg(default_value = "-")]
    infile: PathBuf,

    /// TOML file with extra driver definitions.
    #[arg(long, value_name = "PATH")]
    drivers: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
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

fn describe(slot: Slot) -> String {
    format!("{} {}", slot.direction.as_str(), slot.metric.as_str())
}

/// Classification columns for one line; blank when nothing matched.
fn columns(class: &Classification) -> String {
    if let Some((slot, queue)) = class.queue {
        format!("{:>3} {}", queue, describe(slot))
    } else if let Some(slot) = class.total {
        format!("tot {}", describe(slot))
    } else {
        " ".repeat(8)
    }
}

/// Classifies every counter line of `input`, threading parser state through
/// the lines in order.
fn annotate(
    parser: &DriverParser,
    input: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let mut ctx = ParseContext::new();
    let mut counter = 0usize;

    for (lineno, line) in input.lines().enumerate() {
        let Some(parsed) = parse_line(lineno + 1, line)? else {
            continue;
        };
        let class = parser.classify(&mut ctx, &parsed.name, parsed.value);
        writeln!(out, "{:>3} | {} | {}", counter, columns(&class), line)?;
        counter += 1;
    }
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut registry = ParserRegistry::builtin()?;
    if let Some(path) = &args.drivers {
        registry.load_file(path)?;
    }

    let parser = registry
        .find(&args.driver)
        .ok_or_else(|| format!("couldn't find driver {}", args.driver))?;

    let input = if args.infile.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.infile)
            .map_err(|e| format!("{}: {}", args.infile.display(), e))?
    };

    annotate(parser, &input, &mut io::stdout().lock())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
