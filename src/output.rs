use anyhow::{Context, Result};
use serialport::SerialPort;
use std::io::Write;
use std::thread;
use std::time::Duration;

use crate::config::Config;

/// Destination for encoded frames
pub trait Link {
    /// Open the connection if it is not open yet. Calling it again is a no-op.
    fn ensure_open(&mut self) -> Result<()>;

    /// Write a complete frame, blocking until every byte is handed to the device
    fn send(&mut self, frame: &[u8]) -> Result<()>;
}

/// Serial port connection to the strip controller.
///
/// The port is opened lazily and closed when the link is dropped.
pub struct SerialLink {
    port_name: String,
    baud_rate: u32,
    timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
    debug: bool,
}

impl SerialLink {
    pub fn new(config: &Config, debug: bool) -> Self {
        SerialLink {
            port_name: config.port.clone(),
            baud_rate: config.baud_rate,
            timeout: config.timeout(),
            port: None,
            debug,
        }
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn open_port(&self) -> Result<Box<dyn SerialPort>> {
        let mut port = serialport::new(&self.port_name, self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(self.timeout)
            .open()
            .context(format!("Failed to open serial port {}", self.port_name))?;

        // Boards that reset on DTR expect it asserted
        if let Err(e) = port.write_data_terminal_ready(true) {
            eprintln!("Warning: Failed to set DTR on {}: {}", self.port_name, e);
        }

        // Allow device to initialize
        thread::sleep(Duration::from_millis(100));

        Ok(port)
    }
}

impl Link for SerialLink {
    fn ensure_open(&mut self) -> Result<()> {
        if self.port.is_none() {
            let port = self.open_port()?;
            if self.debug {
                println!("✓ Opened {} @ {} baud", self.port_name, self.baud_rate);
            }
            self.port = Some(port);
        }
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        let port = self
            .port
            .as_mut()
            .context(format!("Serial port {} is not open", self.port_name))?;

        let result = port
            .write_all(frame)
            .context(format!("Serial error on {}", self.port_name))
            .and_then(|_| port.flush().context(format!("Failed to flush {}", self.port_name)));

        if result.is_err() {
            // Leave the handle closed so a later ensure_open starts fresh
            self.port = None;
        }
        result
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        if self.port.take().is_some() && self.debug {
            println!("✓ Closed {}", self.port_name);
        }
    }
}
