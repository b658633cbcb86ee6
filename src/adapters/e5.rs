//! LoRa-E5 radio adapter.
//!
//! Implements [`Transport`] over the Seeed LoRa-E5 module's AT command
//! UART.  The module owns join state, duty-cycle limits and RF timing;
//! the meter only hands it hex payloads and drains its notification
//! lines.
//!
//! Wire format of an uplink, as the module sees it:
//! ```text
//! AT+MSGHEX="050000FF00000102D102A8"\r\n
//! ```
//!
//! On non-espidf targets the adapter is a scripted double: tests queue
//! inbound bytes and inspect the frames the meter sent.

use crate::link::transport::Transport;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

/// Payload of the boot reboot-notice message (type tag only, no body).
pub const REBOOT_PAYLOAD: &[u8] = b"01";

/// Failures at the module UART boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum E5Error {
    /// Payload contains bytes that cannot ride inside an AT command.
    NonAscii,
    /// The UART driver returned an error code.
    Uart(i32),
}

/// The LoRa-E5 module behind its AT-command UART.
pub struct E5Transport {
    #[cfg(not(target_os = "espidf"))]
    inbox: VecDeque<u8>,
    #[cfg(not(target_os = "espidf"))]
    sent: Vec<Vec<u8>>,
}

impl E5Transport {
    /// On the device the UART driver must already be installed by
    /// `hw_init::init_peripherals`.
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            inbox: VecDeque::new(),
            #[cfg(not(target_os = "espidf"))]
            sent: Vec::new(),
        }
    }

    /// Send the boot reboot notice so the backend can flag counter
    /// discontinuities against meter restarts.
    pub fn send_reboot(&mut self) -> Result<(), E5Error> {
        self.write_frame(REBOOT_PAYLOAD)
    }
}

impl Default for E5Transport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "espidf")]
impl Transport for E5Transport {
    type Error = E5Error;

    fn read_byte(&mut self) -> Result<Option<u8>, E5Error> {
        hw_init::uart_read_byte().map_err(E5Error::Uart)
    }

    fn write_frame(&mut self, payload: &[u8]) -> Result<(), E5Error> {
        if !payload.is_ascii() {
            return Err(E5Error::NonAscii);
        }
        hw_init::uart_write(b"AT+MSGHEX=\"").map_err(E5Error::Uart)?;
        hw_init::uart_write(payload).map_err(E5Error::Uart)?;
        hw_init::uart_write(b"\"\r\n").map_err(E5Error::Uart)?;
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl Transport for E5Transport {
    type Error = E5Error;

    fn read_byte(&mut self) -> Result<Option<u8>, E5Error> {
        Ok(self.inbox.pop_front())
    }

    fn write_frame(&mut self, payload: &[u8]) -> Result<(), E5Error> {
        if !payload.is_ascii() {
            return Err(E5Error::NonAscii);
        }
        self.sent.push(payload.to_vec());
        Ok(())
    }
}

// ── Simulation scripting ──────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl E5Transport {
    /// Queue a module notification line (terminator appended).
    pub fn sim_push_line(&mut self, line: &str) {
        self.inbox.extend(line.bytes());
        self.inbox.extend(*b"\r\n");
    }

    /// Frames handed to the module so far, in send order.
    pub fn sim_sent_frames(&self) -> &[Vec<u8>] {
        &self.sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_bytes_come_back_in_order() {
        let mut radio = E5Transport::new();
        radio.sim_push_line("+MSG: Done");

        let mut seen = Vec::new();
        while let Ok(Some(b)) = radio.read_byte() {
            seen.push(b);
        }
        assert_eq!(seen, b"+MSG: Done\r\n");
        assert_eq!(radio.read_byte(), Ok(None));
    }

    #[test]
    fn frames_are_recorded_in_send_order() {
        let mut radio = E5Transport::new();
        radio.write_frame(b"050000FF00000102D102A8").unwrap();
        radio.send_reboot().unwrap();

        let frames = radio.sim_sent_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], b"050000FF00000102D102A8");
        assert_eq!(frames[1], REBOOT_PAYLOAD);
    }

    #[test]
    fn non_ascii_payload_is_rejected() {
        let mut radio = E5Transport::new();
        assert_eq!(radio.write_frame(&[0x05, 0xFF]), Err(E5Error::NonAscii));
        assert!(radio.sim_sent_frames().is_empty());
    }
}
