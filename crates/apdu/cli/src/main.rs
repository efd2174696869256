use std::time::Duration;

use apdu_transport_at::{
    AtConfig, AtTransport, DEFAULT_BAUD_RATE, DEFAULT_MAX_LINE_LEN, HexMode, SerialChannel,
    SerialConfig,
};
use clap::{Parser, Subcommand};
use tracing::info;

mod shell;
mod utils;

#[derive(Parser)]
#[command(version, about = "Exchange APDUs with a SIM through a modem's AT+CSIM interface")]
struct Cli {
    /// Serial port of the modem's AT interface
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate of the serial port
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Deadline for one exchange in milliseconds, 0 waits forever
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Longest response line accepted from the modem
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LEN)]
    max_line: usize,

    /// Reject non-hex characters in modem replies
    #[arg(long)]
    strict_hex: bool,

    /// Skip +CME ERROR lines instead of failing on them
    #[arg(long)]
    no_cme: bool,

    /// Trace level output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available serial ports
    Ports,

    /// Send a single APDU and print the response
    Send {
        /// APDU as hex, spaces allowed
        #[arg(required = true, num_args = 1..)]
        apdu: Vec<String>,
    },

    /// Interactive APDU shell
    Shell,
}

impl Cli {
    fn at_config(&self) -> AtConfig {
        let timeout = (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms));
        let hex_mode = if self.strict_hex {
            HexMode::Strict
        } else {
            HexMode::Lenient
        };

        AtConfig::new()
            .with_timeout(timeout)
            .with_max_line_len(self.max_line)
            .with_hex_mode(hex_mode)
            .with_cme_errors(!self.no_cme)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Commands::Ports = cli.command {
        return utils::list_ports();
    }

    let path = cli
        .port
        .clone()
        .ok_or("No serial port given, use --port (see `csim ports`)")?;
    info!("Using port: {}", path);

    let channel = SerialChannel::new(SerialConfig::new(path).with_baud_rate(cli.baud));
    let mut transport = AtTransport::with_config(channel, cli.at_config());
    transport.open()?;

    let result = match &cli.command {
        Commands::Ports => unreachable!(), // Already handled above
        Commands::Send { apdu } => utils::send_command(&mut transport, &apdu.join("")),
        Commands::Shell => shell::run(&mut transport),
    };

    transport.close();
    result
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(true)
        .init();
}
