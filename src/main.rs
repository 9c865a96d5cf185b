use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

mod config;
mod output;
mod pixel_format;
mod protocol;
mod sweep;

use config::Config;
use output::SerialLink;
use sweep::{FrameEncoder, Sweep};

#[derive(Parser)]
#[command(name = "ada_sweep")]
#[command(about = "Adalight sweep\n\nStreams a single lit pixel across a serial LED strip in a loop.", long_about = None)]
struct Cli {
    /// Path to configuration file (JSON). Built-in defaults are used without it.
    config: Option<PathBuf>,

    /// Serial device path (overrides config)
    #[arg(long)]
    port: Option<String>,

    /// Number of LEDs on the strip (overrides config)
    #[arg(long)]
    led_count: Option<usize>,

    /// Delay between frames in milliseconds (overrides config)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Stop after this many frames (0 runs until interrupted, like omitting it)
    #[arg(long)]
    frames: Option<u64>,

    /// Send an all-black frame before exiting
    #[arg(long)]
    blank_on_exit: bool,

    /// List serial ports present on this machine and exit
    #[arg(long)]
    list_ports: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Enable detailed debug (hex dumps every frame)
    #[arg(long)]
    ddebug: bool,
}

impl Cli {
    /// Load the config file, if any, and apply command-line overrides
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(port) = &self.port {
            config.port = port.clone();
        }
        if let Some(led_count) = self.led_count {
            config.led_count = led_count;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.frame_delay_ms = delay_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

fn list_ports() -> Result<()> {
    let ports = serialport::available_ports().context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{}", port.port_name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_ports {
        return list_ports();
    }

    let config = cli.resolve_config()?;

    // ddebug implies debug
    let debug = cli.debug || cli.ddebug;

    let encoder = FrameEncoder::from_config(&config)?;
    let mut sweep = Sweep::new(encoder, config.frame_delay(), cli.ddebug)?;
    let mut link = SerialLink::new(&config, debug);

    if debug {
        println!("Sweeping {} LEDs on {} ({} @ {} baud, {} ms/frame)",
                 config.led_count, config.port, config.pixel_format,
                 config.baud_rate, config.frame_delay_ms);
        println!("(Press Ctrl-C to stop)");
    }

    // Set up Ctrl-C handler with graceful shutdown
    let running = sweep.get_running_flag();
    let result = ctrlc::set_handler(move || {
        if debug {
            println!("\nShutting down...");
        }
        running.store(false, std::sync::atomic::Ordering::Relaxed);
    });

    if let Err(e) = result {
        eprintln!("Warning: Could not set Ctrl-C handler: {}", e);
    }

    // Run sweep (blocks until shutdown); the link closes when dropped
    let frames_sent = sweep.run(&mut link, cli.frames)?;

    if cli.blank_on_exit {
        if let Err(e) = sweep.blank(&mut link) {
            eprintln!("Warning: Could not blank strip: {}", e);
        }
    }

    if debug {
        println!("✓ Stopped after {} frames", frames_sent);
    }

    Ok(())
}
