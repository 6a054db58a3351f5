//! Contains the encoders, variable code width and fixed code width flavors.

use std::io::{Read, Write};

use log::debug;
use thiserror::Error;

use crate::{
    config::{ConfigError, WhenFull},
    dictionary::{Dictionary, CLEAR_CODE, END_CODE},
    io::{BitPacker, CodeWriter},
    Config, Endianness,
};

/// The error type for encoding operations.
///
/// Encapsulate [std::io::Error] and reject configurations the codec can't honor.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// An I/O error happened when reading or writing data.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

/// Summary of an encoding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeStats {
    /// Bytes read from the input.
    pub input_len: usize,
    /// Codes written, control codes included.
    pub code_count: usize,
    /// Bytes written to the output, padding included.
    pub compressed_len: usize,
    /// How many times the dictionary filled up and started over.
    pub resets: usize,
}

/// LZW encoder for any valid [Config]. Prefer the [GifStyleEncoder] or the
/// [FixedEncoder] if they fit your needs.
pub struct Encoder;

impl Encoder {
    /// Compress `data` with the codec variant described by `config`.
    ///
    /// The length of `data` is not part of the output: keep it around, the decoder
    /// needs it.
    ///
    /// # Arguments
    ///
    /// * `data` - The source data to be compressed.
    /// * `into` - The output where compressed data should be written.
    /// * `config` - The codec variant, see [Config].
    ///
    /// # Errors
    ///
    /// This function can fail on an [std::io::Error] or an invalid configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use lzw_codec::{
    ///     encoder::{Encoder, EncodingError},
    ///     Config,
    /// };
    ///
    /// fn main() -> Result<(), EncodingError> {
    ///     let data = [0, 0, 1, 3];
    ///     let mut output = vec![];
    ///
    ///     let stats = Encoder::encode(&data[..], &mut output, &Config::default())?;
    ///
    ///     assert_eq!(output, [0x00, 0x00, 0x00, 0x20, 0x30]);
    ///     assert_eq!(stats.code_count, 4);
    ///     Ok(())
    /// }
    /// ```
    pub fn encode<R: Read, W: Write>(
        data: R,
        into: W,
        config: &Config,
    ) -> Result<EncodeStats, EncodingError> {
        config.validate()?;

        match config.endianness {
            Endianness::BigEndian => Encoder::inner_encode(
                data,
                BitPacker::new(into, bitstream_io::BigEndian),
                config,
            ),
            Endianness::LittleEndian => Encoder::inner_encode(
                data,
                BitPacker::new(into, bitstream_io::LittleEndian),
                config,
            ),
        }
    }

    /// Compress `data` with the codec variant described by `config`.
    /// Convenient wrapper that creates a [Vec<u8>] under the hood.
    ///
    /// # Errors
    ///
    /// This function can fail on an [std::io::Error] or an invalid configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use lzw_codec::{
    ///     encoder::{Encoder, EncodingError},
    ///     Config,
    /// };
    ///
    /// fn main() -> Result<(), EncodingError> {
    ///     let output = Encoder::encode_to_vec(&[65, 65, 65, 65, 65][..], &Config::FIXED_12)?;
    ///
    ///     assert_eq!(output, [0x04, 0x11, 0x00, 0x10, 0x00]);
    ///     Ok(())
    /// }
    /// ```
    pub fn encode_to_vec<R: Read>(data: R, config: &Config) -> Result<Vec<u8>, EncodingError> {
        let mut output = vec![];
        Encoder::encode(data, &mut output, config)?;
        Ok(output)
    }

    fn inner_encode<R: Read, C: CodeWriter>(
        data: R,
        codes: C,
        config: &Config,
    ) -> Result<EncodeStats, EncodingError> {
        let mut codes = codes;
        let mut stats = EncodeStats::default();

        let mut dictionary = Dictionary::new(config);

        let mut bytes = data.bytes();
        let first = match bytes.next() {
            Some(byte) => byte?,
            None => {
                // Empty input, empty output, whatever the variant.
                codes.flush()?;
                debug!("nothing to encode");
                return Ok(stats);
            }
        };
        stats.input_len = 1;

        if config.control_codes {
            codes.write(CLEAR_CODE, dictionary.code_width())?;
            stats.code_count += 1;
        }

        let mut current = u16::from(first);

        for byte in bytes {
            let byte = byte?;
            stats.input_len += 1;

            if let Some(code) = dictionary.lookup(current, byte) {
                current = code;
                continue;
            }

            codes.write(current, dictionary.code_width())?;
            stats.code_count += 1;

            match dictionary.insert(current, byte) {
                Some(_) if dictionary.is_full() && config.when_full == WhenFull::Reset => {
                    if config.control_codes {
                        codes.write(CLEAR_CODE, dictionary.code_width())?;
                        stats.code_count += 1;
                    }
                    dictionary.reset();
                    stats.resets += 1;
                    debug!(
                        "dictionary full after {} input bytes, reset",
                        stats.input_len
                    );
                }
                Some(_) => {}
                // The sequence missed the lookup, so only a frozen full dictionary refuses it.
                None => debug_assert!(dictionary.is_full()),
            }

            current = u16::from(byte);
        }

        codes.write(current, dictionary.code_width())?;
        stats.code_count += 1;

        if config.control_codes {
            // Written the way the decoder would read a code following `current`.
            codes.write(END_CODE, dictionary.pending_code_width())?;
            stats.code_count += 1;
        }

        codes.fill()?;
        codes.flush()?;

        stats.compressed_len = ((codes.bits_written() + 7) / 8) as usize;

        debug!(
            "encoded {} bytes into {} codes, {} bytes, {} resets",
            stats.input_len, stats.code_count, stats.compressed_len, stats.resets
        );

        Ok(stats)
    }
}

/// LZW encoder tuned for GIF.
///
/// Codes start at 9 bits and grow up to 12, a clear code opens the stream and follows
/// every dictionary reset, an end of information code closes it. The data is written
/// using little endian packing in the output [std::io::Write].
pub struct GifStyleEncoder;

impl GifStyleEncoder {
    /// Compress data with LZW, using GIF style variable encoding.
    ///
    /// # Errors
    ///
    /// This function can fail on an [std::io::Error].
    ///
    /// # Examples
    ///
    /// ```
    /// use lzw_codec::encoder::{EncodingError, GifStyleEncoder};
    ///
    /// fn main() -> Result<(), EncodingError> {
    ///     let data = [0, 0, 1, 3];
    ///     let mut output = vec![];
    ///
    ///     GifStyleEncoder::encode(&data[..], &mut output)?;
    ///
    ///     assert_eq!(output, [0x00, 0x01, 0x00, 0x08, 0x30, 0x20, 0x20]);
    ///     Ok(())
    /// }
    /// ```
    pub fn encode<R: Read, W: Write>(data: R, into: W) -> Result<EncodeStats, EncodingError> {
        Encoder::encode(data, into, &Config::GIF)
    }

    /// Compress data with LZW, using GIF style variable encoding.
    /// Convenient wrapper that creates a [Vec<u8>] under the hood.
    pub fn encode_to_vec<R: Read>(data: R) -> Result<Vec<u8>, EncodingError> {
        Encoder::encode_to_vec(data, &Config::GIF)
    }
}

/// LZW encoder writing fixed 12 bit codes.
///
/// There is no clear or end of information codes: As soon as the dictionary is full,
/// we stop increasing its size.
pub struct FixedEncoder;

impl FixedEncoder {
    /// Compress data with LZW outputting fixed code of 12 bits.
    ///
    /// For really small amount data like the one showcased in the example, the compressed might
    /// take more space than the original data. Variable code size compression is generally better.
    ///
    /// # Arguments
    ///
    /// * `data` - The source data to be compressed.
    /// * `into` - The output where compressed data should be written.
    /// * `endianness` - Bit ordering when writing compressed data.
    ///
    /// # Errors
    ///
    /// This function can fail on an [std::io::Error].
    ///
    /// # Examples
    ///
    /// ```
    /// use lzw_codec::{
    ///     encoder::{EncodingError, FixedEncoder},
    ///     Endianness,
    /// };
    ///
    /// fn main() -> Result<(), EncodingError> {
    ///     let data = [0, 0, 1, 3];
    ///     let mut output = vec![];
    ///
    ///     FixedEncoder::encode(&data[..], &mut output, Endianness::LittleEndian)?;
    ///
    ///     assert_eq!(output, [0x0, 0x0, 0x0, 0x1, 0x30, 0x0]);
    ///     Ok(())
    /// }
    /// ```
    pub fn encode<R: Read, W: Write>(
        data: R,
        into: W,
        endianness: Endianness,
    ) -> Result<EncodeStats, EncodingError> {
        let config = Config {
            endianness,
            ..Config::FIXED_12
        };
        Encoder::encode(data, into, &config)
    }

    /// Compress data with LZW outputting fixed code of 12 bits.
    /// Convenient wrapper that creates a [Vec<u8>] under the hood.
    pub fn encode_to_vec<R: Read>(
        data: R,
        endianness: Endianness,
    ) -> Result<Vec<u8>, EncodingError> {
        let mut output = vec![];
        FixedEncoder::encode(data, &mut output, endianness)?;
        Ok(output)
    }
}
