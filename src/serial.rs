use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use log::{info, warn};
use serialport::SerialPort;
use crate::config::validate_baud_rate;
use crate::telemetry::error::GrapherError;
use crate::telemetry::source::{ReadOutcome, Transport};
const READ_TIMEOUT: Duration = Duration::from_millis(50);
/// Serial device transport. Reads time out quickly so the read loop can
/// notice cancellation.
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
    name: String,
    baud: u32,
}
impl SerialTransport {
    pub fn open(name: &str, baud: u32) -> Result<Self, GrapherError> {
        validate_baud_rate(baud)?;
        let port = serialport::new(name, baud).timeout(READ_TIMEOUT).open()?;
        info!("opened serial port {name} @ {baud}");
        Ok(Self {
            port: Some(port),
            name: name.to_owned(),
            baud,
        })
    }
    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, GrapherError> {
        self.port
            .as_mut()
            .ok_or_else(|| GrapherError::Connection(format!("{} is closed", self.name)))
    }
}
impl Transport for SerialTransport {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, GrapherError> {
        let port = self.port()?;
        match port.read(buf) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(n) => Ok(ReadOutcome::Data(n)),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                Ok(ReadOutcome::Pending)
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(ReadOutcome::Pending),
            Err(e) => Err(GrapherError::Connection(e.to_string())),
        }
    }
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), GrapherError> {
        let port = self.port()?;
        port.write_all(bytes)
            .and_then(|_| port.flush())
            .map_err(|e| GrapherError::Connection(e.to_string()))
    }
    fn close(&mut self) {
        if self.port.take().is_some() {
            info!("closed serial port {}", self.name);
        }
    }
    fn describe(&self) -> String {
        format!("{} @ {}", self.name, self.baud)
    }
}
/// Names of the serial ports the OS reports, empty when enumeration fails.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(err) => {
            warn!("serial port enumeration failed: {err}");
            Vec::new()
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn rejects_out_of_range_baud_before_opening() {
        let err = SerialTransport::open("/dev/does-not-exist", 12).err().unwrap();
        assert!(matches!(err, GrapherError::InvalidBaudRate(12)));
    }
    #[test]
    fn missing_device_is_a_connection_error() {
        let err = SerialTransport::open("/dev/live-grapher-missing", 9600)
            .err()
            .unwrap();
        assert!(matches!(err, GrapherError::Connection(_)));
    }
}
