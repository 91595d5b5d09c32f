use clap::{Parser, Subcommand};
use rawserial::config::ConfigLoader;
use rawserial::trace::hex_dump;
use rawserial::{logging, PortHandle};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Open a serial device with a rawserial options string and talk to it.",
    long_about = "Opens DEVICE in raw blocking mode, configured from an options string such as \
                  'baudrate=9600;bitsperchar=8;parity=none;stopbits=1;autocts=off;autorts=off', \
                  then runs one command against it."
)]
struct Args {
    /// Configuration file (defaults to the standard search path)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trace every driver operation
    #[arg(short, long)]
    debug: bool,

    /// Options string; overrides the configured default
    #[arg(short, long)]
    options: Option<String>,

    /// Device path or configured alias
    device: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the line settings in effect after configuration
    Info,
    /// Print how many bytes are waiting to be read
    Available,
    /// Write data to the port
    Send {
        /// Text to send, or hex pairs with --hex
        data: String,
        /// Interpret DATA as hex, e.g. "0d0a" or "0D 0A"
        #[arg(long)]
        hex: bool,
    },
    /// Read exactly COUNT bytes and print them as hex
    Recv { count: usize },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::load_from(path),
        None => ConfigLoader::load(),
    };
    let config = match loader {
        Ok(loader) => loader.into_config(),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.logging);
    rawserial::set_debug_enabled(args.debug || config.driver.debug);

    let device = config.driver.resolve_port(&args.device);
    let options = args.options.or(config.driver.default_options);

    match run(&device, options.as_deref(), args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    device: &str,
    options: Option<&str>,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut port = PortHandle::open(device, options)?;

    let result = match command {
        Command::Info => port.line_settings().map(|settings| {
            println!("{}: {}", port.name(), settings);
            println!("  raw: {}", settings.raw);
            println!("  vmin: {}, vtime: {}", settings.min_read, settings.read_timeout);
        }),
        Command::Available => port.available().map(|n| println!("{n}")),
        Command::Send { data, hex } => {
            let bytes = if hex { parse_hex(&data)? } else { data.into_bytes() };
            port.write_buffer(&bytes).map(|()| println!("sent {} bytes", bytes.len()))
        }
        Command::Recv { count } => {
            let mut buf = vec![0u8; count];
            port
                .read_buffer(&mut buf)
                .map(|n| println!("{n} bytes:{}", hex_dump(&buf[..n])))
        }
    };

    port.close();
    Ok(result?)
}

fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in '{text}'"));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let s: String = pair.iter().collect();
            u8::from_str_radix(&s, 16).map_err(|_| format!("invalid hex byte '{s}'"))
        })
        .collect()
}
