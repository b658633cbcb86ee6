//! Transport abstraction — the radio module as a byte stream.
//!
//! The meter core never speaks the module's AT protocol; it sees exactly
//! two capabilities: poll one inbound byte, send one complete uplink
//! payload.  Concrete implementations:
//! - LoRa-E5 UART adapter (on-device)
//! - scripted in-memory double (host tests)

/// Byte-oriented radio channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Non-blocking read of the next inbound byte.
    /// Returns `Ok(None)` when nothing is pending.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Hand one complete uplink payload to the radio.  The adapter owns
    /// any module-side framing; message loss past this point is not the
    /// core's problem and is never retried within an interval.
    fn write_frame(&mut self, payload: &[u8]) -> Result<(), Self::Error>;
}

/// A null transport that discards all writes and never reads.
/// Useful on a bench rig with no radio fitted.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read_byte(&mut self) -> Result<Option<u8>, ()> {
        Ok(None)
    }

    fn write_frame(&mut self, _payload: &[u8]) -> Result<(), ()> {
        Ok(())
    }
}
