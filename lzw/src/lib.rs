//! LZW encoder and decoder over opaque byte buffers.
//!
//! This crate builds an adaptive dictionary over a byte stream, packs the resulting
//! variable width codes into bytes, and reverses the process losslessly.
//! The variant is picked through a [Config]: code width range, dictionary size,
//! bit ordering, optional GIF style clear and end codes, where codes grow wider, and
//! what happens when the dictionary fills up.
//!
//! The compressed stream does not carry its own length. Whoever owns the container
//! format (a BMP or PGM header for example) has to store the original length and hand
//! it back to the decoder.
//!
//! It works with any [std::io::Read] and [std::io::Write].
//!
//! # Examples
//!
//! ```
//! use lzw_codec::{decoder::Decoder, encoder::Encoder, Config};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let data = [65, 65, 65, 65, 65];
//!     let config = Config::default();
//!
//!     let compressed = Encoder::encode_to_vec(&data[..], &config)?;
//!     assert_eq!(compressed, [0x20, 0xC0, 0x20, 0x00]);
//!
//!     let decompressed = Decoder::decode_to_vec(&compressed[..], data.len(), &config)?;
//!     assert_eq!(decompressed, data);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decoder;
pub mod dictionary;
pub mod encoder;
mod io;

pub use config::{Config, ConfigError, WhenFull, WidthSwitch};

/// The bit ordering when packing or unpacking codes.
///
/// GIF uses little endian packing, the fixed width variants and the default
/// configuration use big endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Most significant bit first.
    BigEndian,
    /// Least significant bit first.
    LittleEndian,
}
