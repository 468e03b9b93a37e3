use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use soundbound_lib::Soundbound;
use soundbound_lib::bus::{RegisterBus, TraceBus};
use soundbound_lib::command::Command;
use soundbound_lib::config::DeviceConfig;
use soundbound_lib::constants::QUERY_RESPONSE_SIZE;
use soundbound_lib::engine::ByteRead;
use soundbound_lib::packet::{QueryResponse, encode_set_volume};
use soundbound_lib::registry::SpeakerRegistry;

/// Pause between idle ticks of the serve loop
const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Parser)]
#[command(name = "soundbound", about = "Soundbound audio-panning controller")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the device-side serve loop with a tracing-backed register bus
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:4242")]
        listen: String,
        /// JSON speaker table; the built-in stereo table when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Query a controller's version, speakers and device name
    Query { addr: String },
    /// Set one speaker's volume
    SetVolume {
        addr: String,
        /// Speaker id, a single ASCII character
        id: char,
        /// Logical volume, 0-100
        #[arg(value_parser = clap::value_parser!(u8).range(..=100))]
        volume: u8,
    },
    /// Ask the controller to start the audio stream
    Start { addr: String },
    /// Ask the controller to stop the audio stream
    Stop { addr: String },
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        CliCommand::Serve { listen, config } => serve(&listen, config),
        CliCommand::Query { addr } => query(&addr),
        CliCommand::SetVolume { addr, id, volume } => set_volume(&addr, id, volume),
        CliCommand::Start { addr } => send_simple(&addr, Command::Start),
        CliCommand::Stop { addr } => send_simple(&addr, Command::Stop),
    }
}

/// Byte source over a non-blocking TCP stream.
///
/// Both "no data yet" and a closed peer map to the engine's sentinel;
/// the `closed` flag lets the serve loop end the session once the peer
/// is really gone.
struct TcpByteStream {
    stream: TcpStream,
    closed: bool,
}

impl TcpByteStream {
    fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;

        Ok(TcpByteStream { stream, closed: false })
    }
}

impl ByteRead for TcpByteStream {
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];

        match self.stream.read(&mut byte) {
            Ok(0) => {
                self.closed = true;
                None
            }
            Ok(_) => Some(byte[0]),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => None,
            Err(_) => {
                self.closed = true;
                None
            }
        }
    }
}

impl Write for TcpByteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // responses are written blocking, reads stay non-blocking
        self.stream.set_nonblocking(false)?;
        let written = self.stream.write(buf);
        self.stream.set_nonblocking(true)?;

        written
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

fn serve(listen: &str, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config: DeviceConfig = match config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => DeviceConfig::stereo_demo(),
    };

    let registry = SpeakerRegistry::new(&config, TraceBus)?;
    let mut engine = Soundbound::new(registry);
    engine.registry_mut().init_volumes();

    let listener = TcpListener::bind(listen)?;
    info!(%listen, "listening for controller connections");

    loop {
        let (stream, peer) = listener.accept()?;
        info!(%peer, "controller connected");

        if let Err(err) = serve_client(&mut engine, stream) {
            warn!(%err, "session ended with error");
        }

        info!(%peer, "controller disconnected");
    }
}

/// One tick per iteration: while a frame is in flight the engine only
/// accumulates; otherwise the next byte is classified and immediate
/// commands are handled here.
fn serve_client<B: RegisterBus>(
    engine: &mut Soundbound<B>,
    stream: TcpStream,
) -> Result<(), Box<dyn Error>> {
    let mut client = TcpByteStream::new(stream)?;

    while !client.closed || engine.is_capturing() {
        if engine.is_capturing() {
            if let Err(err) = engine.advance(&mut client) {
                warn!(%err, "volume request rejected");
            }

            continue;
        }

        match engine.receive_command(&mut client) {
            Command::QueryData => {
                info!("query received");
                engine.send_query_response(&mut client)?;
            }
            Command::Start => info!("stream start requested"),
            Command::Stop => info!("stream stop requested"),
            Command::Unknown(byte) => warn!(byte, "unknown command byte"),
            Command::NoCommand => thread::sleep(POLL_INTERVAL),
            Command::SetVolume => {}
        }
    }

    Ok(())
}

fn query(addr: &str) -> Result<(), Box<dyn Error>> {
    let mut stream = TcpStream::connect(addr)?;
    stream.write_all(&[u8::from(Command::QueryData)])?;

    let mut buf = [0u8; QUERY_RESPONSE_SIZE];
    stream.read_exact(&mut buf)?;

    let response = QueryResponse::parse(&buf)?;

    println!("Device: {}", response.device_name);
    println!("Protocol: v{}.{}", response.major, response.minor);

    let ids: Vec<String> = response
        .speaker_ids
        .iter()
        .map(|id| (*id as char).to_string())
        .collect();
    println!("Speakers: {}", ids.join(", "));

    Ok(())
}

fn set_volume(addr: &str, id: char, volume: u8) -> Result<(), Box<dyn Error>> {
    if !id.is_ascii() {
        return Err(format!("speaker id {id:?} is not an ASCII character").into());
    }

    let mut stream = TcpStream::connect(addr)?;
    stream.write_all(&encode_set_volume(id as u8, volume))?;

    println!("Speaker '{id}' volume set to {volume}");

    Ok(())
}

fn send_simple(addr: &str, cmd: Command) -> Result<(), Box<dyn Error>> {
    let mut stream = TcpStream::connect(addr)?;
    stream.write_all(&[u8::from(cmd)])?;

    println!("Sent {cmd}");

    Ok(())
}
