//! Gateway protocol definitions
//!
//! Outbound commands and the JSON / MessagePack frame encodings.

mod commands;
pub mod encoding;

pub use commands::{ClientCommand, Credentials};
pub use encoding::FrameError;
