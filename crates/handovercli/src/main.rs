//! Command-line tool for inspecting and building Bluetooth handover tag payloads

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use handover::gap::AddressType;
use handover::negotiator::{resolve_collision, CollisionOutcome};
use handover::oob::{decode_payload, SubFormat};
use handover::{decode, encode, BdAddr, HandoverRecord, NdefMessage, OobPairingMaterial, Transport};
use log::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "handover")]
#[command(about = "Bluetooth NFC handover payload tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a tag payload given as hex
    Decode {
        /// NDEF message, or a bare OOB payload with --format
        hex: String,
        /// Treat the input as a bare OOB payload of this format
        #[arg(short, long)]
        format: Option<Format>,
    },
    /// Build a handover select message advertising a device
    Select {
        /// Device address, e.g. 00:1B:DC:0F:10:2A
        address: String,
        #[command(flatten)]
        device: DeviceArgs,
        /// Mark the carrier as still powering up
        #[arg(long)]
        activating: bool,
    },
    /// Build a handover request message advertising a device
    Request {
        address: String,
        #[command(flatten)]
        device: DeviceArgs,
    },
    /// Resolve a handover request collision between two 2-byte randoms
    Collision {
        /// Local random, as 4 hex digits
        local: String,
        /// Remote random, as 4 hex digits
        remote: String,
    },
}

#[derive(clap::Args)]
struct DeviceArgs {
    /// Advertise an LE carrier instead of BR/EDR
    #[arg(long)]
    le: bool,
    /// Device name (LE only)
    #[arg(short, long)]
    name: Option<String>,
    /// The address is a random device address (LE only)
    #[arg(long)]
    random: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Classic,
    Le,
    Nokia,
}

impl From<Format> for SubFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Classic => SubFormat::Classic,
            Format::Le => SubFormat::LowEnergy,
            Format::Nokia => SubFormat::Legacy,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&cleaned).with_context(|| format!("invalid hex: {}", input))
}

fn device_record(address: &str, device: &DeviceArgs) -> Result<HandoverRecord> {
    let address: BdAddr = address.parse()?;
    if !device.le {
        return Ok(HandoverRecord::for_address(address, Transport::Classic));
    }

    let mut record = HandoverRecord::for_address(address, Transport::LowEnergy);
    let address_type = if device.random {
        AddressType::Random
    } else {
        AddressType::Public
    };
    let mut oob = OobPairingMaterial::new(address, address_type);
    oob.device_name = device.name.clone();
    record.name = device.name.clone().unwrap_or_default();
    record.oob = Some(oob);
    Ok(record)
}

fn print_record(record: &HandoverRecord) {
    println!("valid:       {}", record.valid);
    println!("transport:   {}", record.transport);
    match &record.address {
        Some(address) => println!("address:     {}", address),
        None => println!("address:     -"),
    }
    if !record.name.is_empty() {
        println!("name:        {}", record.name);
    }
    if let Some(class) = &record.device_class {
        println!("class:       {:?}", class);
    }
    for uuid in &record.uuids {
        println!("uuid:        {}", uuid);
    }
    if let Some(oob) = &record.oob {
        println!("oob:         {:?}", oob);
    }
    if record.carrier_activating {
        println!("carrier:     activating");
    }
}

fn print_message(bytes: &[u8]) {
    let Ok(message) = NdefMessage::parse(bytes) else {
        return;
    };
    for (i, record) in message.records().iter().enumerate() {
        println!(
            "record {}:    {:?} {:?} id={:?} payload={}",
            i,
            record.tnf,
            String::from_utf8_lossy(&record.record_type),
            String::from_utf8_lossy(&record.id),
            hex::encode(&record.payload)
        );
    }
}

fn parse_random(input: &str) -> Result<[u8; 2]> {
    let bytes = parse_hex(input)?;
    bytes
        .try_into()
        .map_err(|_| anyhow!("collision random must be 2 bytes: {}", input))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode { hex, format } => {
            let bytes = parse_hex(&hex)?;
            debug!("Decoding {} bytes", bytes.len());
            let record = match format {
                Some(format) => decode_payload(format.into(), &bytes),
                None => {
                    print_message(&bytes);
                    decode(&bytes)
                }
            };
            print_record(&record);
        }
        Commands::Select {
            address,
            device,
            activating,
        } => {
            let mut record = device_record(&address, &device)?;
            record.carrier_activating = activating;
            println!("{}", hex::encode(encode(&record, false)));
        }
        Commands::Request { address, device } => {
            let record = device_record(&address, &device)?;
            println!("{}", hex::encode(encode(&record, true)));
        }
        Commands::Collision { local, remote } => {
            let outcome = resolve_collision(parse_random(&local)?, parse_random(&remote)?);
            let role = match outcome {
                CollisionOutcome::Requester => "requester",
                CollisionOutcome::Selector => "selector",
                CollisionOutcome::Retry => "retry with a new random",
            };
            println!("{}", role);
        }
    }

    Ok(())
}
