//! NES260 loader
//!
//! Sends `.nes` images and controller state to the KV260 board over its
//! USB UART, and shows what the board prints back.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use dialoguer::console::style;
use nes260_protocol::{ButtonPair, Buttons, HostCommand};
use serialport::SerialPort;
use structopt::StructOpt;

mod config;
mod link;
mod loader;
mod monitor;

use config::HostConfig;
use monitor::{wait_for_loaded, LineReader};

const PROGRESS: [char; 4] = ['/', '-', '\\', '|'];

#[derive(Debug, StructOpt)]
#[structopt(name = "nes260", about = "Load NES games onto the KV260 FPGA board")]
struct Opt {
    /// Config file (default: ./nes260.toml if present)
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Serial port of the board
    #[structopt(long)]
    port: Option<String>,

    /// Baud rate
    #[structopt(long)]
    baud: Option<u32>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// List USB serial ports
    Ports,
    /// Send an iNES image to the board
    Load {
        #[structopt(parse(from_os_str))]
        file: PathBuf,
        /// Do not wait for the board to confirm the load
        #[structopt(long)]
        no_wait: bool,
    },
    /// Send one controller update (names like a+start, or 0x09)
    Buttons {
        #[structopt(parse(try_from_str = Buttons::parse))]
        player1: Buttons,
        #[structopt(parse(try_from_str = Buttons::parse), default_value = "none")]
        player2: Buttons,
    },
    /// Print everything the board sends
    Monitor,
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let mut config = HostConfig::load(opt.config.as_deref())?;
    if let Some(baud) = opt.baud {
        config.serial.baudrate = baud;
    }
    if let Some(port) = opt.port {
        config.serial.port = Some(port);
    }
    config.validate()?;

    match opt.command {
        Command::Ports => list_ports(),
        Command::Load { file, no_wait } => {
            let mut port = connect(&config)?;
            load(port.as_mut(), &file, &config, !no_wait)
        }
        Command::Buttons { player1, player2 } => {
            let mut port = connect(&config)?;
            let pair = ButtonPair::new(player1, player2);
            loader::send_command(&mut port, &HostCommand::Buttons(pair), 1, |_, _| {})?;
            println!("Buttons: {} / {}", player1, player2);
            Ok(())
        }
        Command::Monitor => {
            let mut port = connect(&config)?;
            monitor(port.as_mut())
        }
    }
}

fn connect(config: &HostConfig) -> anyhow::Result<Box<dyn SerialPort>> {
    let name = link::select_port(config.serial.port.as_deref())?;
    link::open(&name, &config.uart())
}

fn list_ports() -> anyhow::Result<()> {
    let ports = link::usb_ports()?;
    if ports.is_empty() {
        println!("No USB serial ports found. Connect the board's USB cable and try again.");
    }
    for port in &ports {
        println!("{}", link::describe(port));
    }
    Ok(())
}

fn load(
    port: &mut dyn SerialPort,
    file: &Path,
    config: &HostConfig,
    wait: bool,
) -> anyhow::Result<()> {
    let image = fs::read(file).with_context(|| format!("cannot open {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("{}", style(name).bold());
    println!("{}", loader::describe_image(&image));

    let chunk_size = config.loader.chunk_size;
    let mut chunks = 0usize;
    loader::send_command(port, &HostCommand::LoadImage(&image), chunk_size, |sent, total| {
        print!("\r{} {}/{} bytes", PROGRESS[chunks % PROGRESS.len()], sent, total);
        let _ = io::stdout().flush();
        chunks += 1;
    })?;
    println!("\rSent {} bytes over serial line.", image.len());

    if !wait {
        return Ok(());
    }

    let timeout = Duration::from_millis(config.loader.ack_timeout_ms);
    let mut reader = LineReader::new(port);
    let loaded = wait_for_loaded(&mut reader, timeout, |line| {
        println!("{}", style(line).dim());
    })
    .context("failed to read from serial port")?;

    if !loaded {
        bail!(
            "board did not confirm the load within {} ms",
            config.loader.ack_timeout_ms
        );
    }
    println!("{}", style("OK").green().bold());
    Ok(())
}

fn monitor(port: &mut dyn SerialPort) -> anyhow::Result<()> {
    let mut reader = LineReader::new(port);
    let mut lines = Vec::new();
    loop {
        let open = reader
            .poll(&mut lines)
            .context("failed to read from serial port")?;
        for line in lines.drain(..) {
            println!("{}", line);
        }
        if !open {
            return Ok(());
        }
    }
}
