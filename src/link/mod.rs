//! Radio link layer.
//!
//! The byte-stream [`Transport`](transport::Transport) boundary to the
//! LoRa-E5 module, the fixed-width uplink payload codec, and the
//! newline-delimited downlink line framer.  Everything here is pure with
//! respect to hardware — concrete UART plumbing lives in
//! [`adapters`](crate::adapters).

pub mod framer;
pub mod transport;
pub mod uplink;

pub use framer::{LineFramer, MAX_LINE_LEN};
pub use transport::{NullTransport, Transport};
