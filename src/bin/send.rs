//! Telly Sender
//!
//! Command-line client that pushes text to a Telly receiver.

use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Telly Sender
#[derive(Parser, Debug)]
#[command(name = "telly-send")]
#[command(about = "Send text, presets or the current time to a Telly receiver")]
#[command(version)]
struct Args {
    /// Receiver address
    #[arg(short, long, default_value = "192.168.1.100:5000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a line of text once
    Text {
        /// Words to send, joined with spaces
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Send the local time (HH:MM:SS) repeatedly
    Time {
        /// Delay between sends in milliseconds
        #[arg(short, long, default_value = "1000")]
        interval_ms: u64,

        /// Stop after this many sends (runs until interrupted if omitted)
        #[arg(short, long)]
        count: Option<u64>,
    },

    /// Send one of the quick-send presets
    Preset {
        #[arg(value_enum)]
        name: Preset,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    Solar,
    #[value(name = "67")]
    SixtySeven,
    Goat,
    Clear,
}

impl Preset {
    fn text(self) -> &'static str {
        match self {
            Preset::Solar => "This is MSU Solar Car!",
            Preset::SixtySeven => "67",
            Preset::Goat => "The Telly team",
            Preset::Clear => "---",
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> std::io::Result<()> {
    let mut stream = connect(&args.server)?;
    tracing::info!("Connected to {}", args.server);

    match &args.command {
        Commands::Text { words } => send(&mut stream, &words.join(" ")),
        Commands::Preset { name } => send(&mut stream, name.text()),
        Commands::Time { interval_ms, count } => {
            let interval = Duration::from_millis(*interval_ms);
            let mut sent = 0u64;
            loop {
                let now = chrono::Local::now().format("%H:%M:%S").to_string();
                send(&mut stream, &now)?;
                sent += 1;

                if count.is_some_and(|limit| sent >= limit) {
                    return Ok(());
                }
                thread::sleep(interval);
            }
        }
    }
}

fn connect(server: &str) -> std::io::Result<TcpStream> {
    let addrs: Vec<SocketAddr> = server.to_socket_addrs()?.collect();
    let mut last_err = None;

    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                stream.set_write_timeout(Some(CONNECT_TIMEOUT))?;
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{server} did not resolve to any address"),
        )
    }))
}

fn send(stream: &mut TcpStream, text: &str) -> std::io::Result<()> {
    stream.write_all(text.as_bytes())?;
    tracing::info!("Sent: {}", text);
    Ok(())
}
