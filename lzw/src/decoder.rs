//! Contains the decoders, rebuilding the dictionary in lockstep with the encoder.

use std::io::{ErrorKind, Read, Write};

use log::debug;
use thiserror::Error;

use crate::{
    config::{ConfigError, WhenFull},
    dictionary::{Dictionary, CLEAR_CODE, END_CODE},
    io::{BitUnpacker, CodeReader},
    Config, Endianness,
};

/// Why a code could not be turned back into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Corruption {
    /// The code is neither assigned yet nor the one about to be assigned.
    #[error("code {code} is not defined, the next code to assign is {next_code}")]
    UndefinedCode { code: u16, next_code: usize },
    /// Right after the start or a clear code, only single byte codes are valid.
    #[error("code {0} was expected to be a single byte code")]
    NotSingleton(u16),
    /// Following the prefixes of this code loops or leaves the dictionary.
    #[error("the prefix chain of code {0} is broken")]
    BrokenChain(u16),
    /// The code would add a sequence the dictionary already holds.
    #[error("code {0} would add a sequence already in the dictionary")]
    DuplicateEntry(u16),
}

/// The error type for decoding operations.
#[derive(Debug, Error)]
pub enum DecodingError {
    /// An I/O error happened when reading or writing data.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// The compressed data ended before the expected length was rebuilt.
    #[error("compressed stream ended after {codes_read} codes")]
    TruncatedStream { codes_read: usize },
    /// The code at position `index` in the stream can't be decoded.
    #[error("corrupt code at position {index}: {reason}")]
    CorruptStream { index: usize, reason: Corruption },
    /// The stream decodes to a different length than the one expected.
    #[error("expected {expected} decoded bytes, stream holds {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Summary of a decoding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeStats {
    /// Bytes written to the output.
    pub output_len: usize,
    /// Codes read, control codes included.
    pub code_count: usize,
    /// How many times the dictionary started over.
    pub resets: usize,
}

/// LZW decoder for any valid [Config].
pub struct Decoder;

impl Decoder {
    /// Decompress `data`, which must have been produced with the same `config`.
    ///
    /// # Arguments
    ///
    /// * `data` - The compressed data.
    /// * `into` - The output where decompressed data should be written.
    /// * `expected_len` - Length of the original data. The stream doesn't record it,
    ///   decoding stops as soon as that many bytes are rebuilt and the padding bits
    ///   are never looked at.
    /// * `config` - The codec variant used for compression.
    ///
    /// # Errors
    ///
    /// This function fails on an invalid configuration, on an [std::io::Error], when
    /// the data is too short, corrupt, or decodes to a length other than `expected_len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lzw_codec::{
    ///     decoder::{Decoder, DecodingError},
    ///     Config,
    /// };
    ///
    /// fn main() -> Result<(), DecodingError> {
    ///     let data = [0x20, 0xC0, 0x20, 0x00];
    ///     let mut output = vec![];
    ///
    ///     let stats = Decoder::decode(&data[..], &mut output, 5, &Config::default())?;
    ///
    ///     assert_eq!(output, [65, 65, 65, 65, 65]);
    ///     assert_eq!(stats.code_count, 3);
    ///     Ok(())
    /// }
    /// ```
    pub fn decode<R: Read, W: Write>(
        data: R,
        into: W,
        expected_len: usize,
        config: &Config,
    ) -> Result<DecodeStats, DecodingError> {
        config.validate()?;

        match config.endianness {
            Endianness::BigEndian => Decoder::inner_decode(
                BitUnpacker::new(data, bitstream_io::BigEndian),
                into,
                expected_len,
                config,
            ),
            Endianness::LittleEndian => Decoder::inner_decode(
                BitUnpacker::new(data, bitstream_io::LittleEndian),
                into,
                expected_len,
                config,
            ),
        }
    }

    /// Decompress `data` into a new [Vec<u8>] of `expected_len` bytes.
    ///
    /// # Errors
    ///
    /// Same as [Decoder::decode].
    ///
    /// # Examples
    ///
    /// ```
    /// use lzw_codec::{
    ///     decoder::{Decoder, DecodingError},
    ///     Config,
    /// };
    ///
    /// fn main() -> Result<(), DecodingError> {
    ///     let data = [0x00, 0x00, 0x00, 0x20, 0x30];
    ///
    ///     let output = Decoder::decode_to_vec(&data[..], 4, &Config::default())?;
    ///
    ///     assert_eq!(output, [0, 0, 1, 3]);
    ///     Ok(())
    /// }
    /// ```
    pub fn decode_to_vec<R: Read>(
        data: R,
        expected_len: usize,
        config: &Config,
    ) -> Result<Vec<u8>, DecodingError> {
        let mut output = Vec::with_capacity(expected_len);
        Decoder::decode(data, &mut output, expected_len, config)?;
        Ok(output)
    }

    fn inner_decode<C: CodeReader, W: Write>(
        codes: C,
        into: W,
        expected_len: usize,
        config: &Config,
    ) -> Result<DecodeStats, DecodingError> {
        let mut codes = codes;
        let mut into = into;

        let mut dictionary = Dictionary::new(config);
        // Without clear codes in the stream, the decoder starts over where the
        // encoder filled its table, one entry ahead of ours.
        let implicit_reset = !config.control_codes && config.when_full == WhenFull::Reset;

        let mut sequence = Vec::with_capacity(config.max_size);
        let mut previous: Option<u16> = None;
        let mut stats = DecodeStats::default();

        while stats.output_len < expected_len {
            let width = match previous {
                Some(_) => dictionary.pending_code_width(),
                None => dictionary.code_width(),
            };
            let code = codes.read(width).map_err(|error| match error.kind() {
                ErrorKind::UnexpectedEof => DecodingError::TruncatedStream {
                    codes_read: stats.code_count,
                },
                _ => DecodingError::Io(error),
            })?;
            let index = stats.code_count;
            stats.code_count += 1;

            if config.control_codes {
                if code == CLEAR_CODE {
                    if index > 0 {
                        stats.resets += 1;
                        debug!("clear code at position {index}, dictionary reset");
                    }
                    dictionary.reset();
                    previous = None;
                    continue;
                }
                if code == END_CODE {
                    return Err(DecodingError::LengthMismatch {
                        expected: expected_len,
                        actual: stats.output_len,
                    });
                }
            }

            let corrupt = |reason: Corruption| DecodingError::CorruptStream { index, reason };

            match previous {
                None => {
                    let byte = u8::try_from(code)
                        .map_err(|_| corrupt(Corruption::NotSingleton(code)))?;
                    sequence.clear();
                    sequence.push(byte);
                }
                Some(prefix) => {
                    let next_code = dictionary.size();
                    if usize::from(code) < next_code {
                        dictionary.expand(code, &mut sequence).map_err(corrupt)?;
                    } else if usize::from(code) == next_code && !dictionary.is_full() {
                        // The code being defined by this very step: previous sequence
                        // followed by its own first byte.
                        dictionary.expand(prefix, &mut sequence).map_err(corrupt)?;
                        let first = sequence[0];
                        sequence.push(first);
                    } else {
                        return Err(corrupt(Corruption::UndefinedCode { code, next_code }));
                    }

                    if !dictionary.is_full() && dictionary.insert(prefix, sequence[0]).is_none() {
                        return Err(corrupt(Corruption::DuplicateEntry(code)));
                    }
                }
            }

            let actual = stats.output_len + sequence.len();
            if actual > expected_len {
                return Err(DecodingError::LengthMismatch {
                    expected: expected_len,
                    actual,
                });
            }
            into.write_all(&sequence)?;
            stats.output_len = actual;
            previous = Some(code);

            if implicit_reset && dictionary.size() + 1 >= dictionary.max_size() {
                stats.resets += 1;
                debug!("dictionary full after code {index}, reset");
                dictionary.reset();
                previous = None;
            }
        }

        into.flush()?;

        debug!(
            "decoded {} codes into {} bytes, {} resets",
            stats.code_count, stats.output_len, stats.resets
        );

        Ok(stats)
    }
}

/// LZW decoder for data written by the [GifStyleEncoder](crate::encoder::GifStyleEncoder).
///
/// Little endian packing, 9 to 12 bit codes, clear and end of information codes.
pub struct GifStyleDecoder;

impl GifStyleDecoder {
    /// Decompress GIF style data.
    ///
    /// # Errors
    ///
    /// Same as [Decoder::decode].
    ///
    /// # Examples
    ///
    /// ```
    /// use lzw_codec::decoder::{DecodingError, GifStyleDecoder};
    ///
    /// fn main() -> Result<(), DecodingError> {
    ///     let data = [0x00, 0x01, 0x00, 0x08, 0x30, 0x20, 0x20];
    ///     let mut output = vec![];
    ///
    ///     GifStyleDecoder::decode(&data[..], &mut output, 4)?;
    ///
    ///     assert_eq!(output, [0, 0, 1, 3]);
    ///     Ok(())
    /// }
    /// ```
    pub fn decode<R: Read, W: Write>(
        data: R,
        into: W,
        expected_len: usize,
    ) -> Result<DecodeStats, DecodingError> {
        Decoder::decode(data, into, expected_len, &Config::GIF)
    }

    /// Decompress GIF style data into a new [Vec<u8>].
    pub fn decode_to_vec<R: Read>(data: R, expected_len: usize) -> Result<Vec<u8>, DecodingError> {
        Decoder::decode_to_vec(data, expected_len, &Config::GIF)
    }
}

/// LZW decoder for fixed 12 bit codes, see [FixedEncoder](crate::encoder::FixedEncoder).
pub struct FixedDecoder;

impl FixedDecoder {
    /// Decompress data made of fixed 12 bit codes.
    ///
    /// # Errors
    ///
    /// Same as [Decoder::decode].
    ///
    /// # Examples
    ///
    /// ```
    /// use lzw_codec::{
    ///     decoder::{DecodingError, FixedDecoder},
    ///     Endianness,
    /// };
    ///
    /// fn main() -> Result<(), DecodingError> {
    ///     let data = [0x0, 0x0, 0x0, 0x1, 0x30, 0x0];
    ///
    ///     let output = FixedDecoder::decode_to_vec(&data[..], 4, Endianness::LittleEndian)?;
    ///
    ///     assert_eq!(output, [0, 0, 1, 3]);
    ///     Ok(())
    /// }
    /// ```
    pub fn decode<R: Read, W: Write>(
        data: R,
        into: W,
        expected_len: usize,
        endianness: Endianness,
    ) -> Result<DecodeStats, DecodingError> {
        let config = Config {
            endianness,
            ..Config::FIXED_12
        };
        Decoder::decode(data, into, expected_len, &config)
    }

    /// Decompress data made of fixed 12 bit codes into a new [Vec<u8>].
    pub fn decode_to_vec<R: Read>(
        data: R,
        expected_len: usize,
        endianness: Endianness,
    ) -> Result<Vec<u8>, DecodingError> {
        let mut output = Vec::with_capacity(expected_len);
        FixedDecoder::decode(data, &mut output, expected_len, endianness)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use bitstream_io::LittleEndian;

    use crate::{
        config::WidthSwitch,
        io::{BitPacker, CodeWriter},
    };

    use super::*;

    const TOBEORNOT: &[u8] = b"TOBEORNOTTOBEORTOBEORNOT";

    #[test]
    fn decode_repeated_byte() -> Result<(), DecodingError> {
        let data = [0x20, 0xC0, 0x20, 0x00];

        let mut decoded = vec![];
        let stats = Decoder::decode(&data[..], &mut decoded, 5, &Config::VARIABLE)?;

        assert_eq!(decoded, [65; 5]);
        assert_eq!(
            stats,
            DecodeStats {
                output_len: 5,
                code_count: 3,
                resets: 0
            }
        );

        Ok(())
    }

    #[test]
    fn decode_tobeornot() -> Result<(), DecodingError> {
        let data = [
            0x2a, 0x13, 0xc8, 0x44, 0x52, 0x79, 0x48, 0x9c, 0x4f, 0x2a, 0x40, 0x20, 0x50, 0x48,
            0x4c, 0x0e, 0x0b, 0x07,
        ];

        let decoded = Decoder::decode_to_vec(&data[..], TOBEORNOT.len(), &Config::VARIABLE)?;

        assert_eq!(decoded, TOBEORNOT);

        Ok(())
    }

    #[test]
    fn decode_tobeornot_gif() -> Result<(), DecodingError> {
        let data = [
            0x00, 0xa9, 0x3c, 0x11, 0x52, 0xe4, 0x89, 0x14, 0x27, 0x4f, 0xa8, 0x08, 0x24, 0x68,
            0x70, 0x61, 0xc1, 0x83, 0x09, 0x03, 0x02,
        ];

        let decoded = GifStyleDecoder::decode_to_vec(&data[..], TOBEORNOT.len())?;

        assert_eq!(decoded, TOBEORNOT);

        Ok(())
    }

    #[test]
    fn decode_repeated_byte_in_every_preset() -> Result<(), DecodingError> {
        let cases: [(Config, &[u8]); 3] = [
            (Config::GIF, &[0x00, 0x83, 0x08, 0x14, 0x18, 0x10]),
            (Config::FIXED_12, &[0x04, 0x11, 0x00, 0x10, 0x00]),
            (Config::WORD_16, &[0x41, 0x00, 0x00, 0x01, 0x00, 0x01]),
        ];

        for (config, data) in cases {
            let decoded = Decoder::decode_to_vec(data, 5, &config)?;
            assert_eq!(decoded, [65; 5], "{config:?}");
        }

        Ok(())
    }

    #[test]
    fn decode_with_eight_bit_start() -> Result<(), DecodingError> {
        let config = Config {
            min_code_width: 8,
            width_switch: WidthSwitch::Deferred,
            ..Config::VARIABLE
        };

        assert_eq!(Decoder::decode_to_vec(&[0x41][..], 1, &config)?, [65]);
        assert_eq!(
            Decoder::decode_to_vec(&[0x00, 0x00, 0x00, 0x40, 0x60][..], 4, &config)?,
            [0, 0, 1, 3]
        );

        Ok(())
    }

    #[test]
    fn decode_code_defined_by_itself() -> Result<(), DecodingError> {
        // Codes 97, 97, 98, 257, 259, 258, 258: code 259 is read while being defined.
        let data = [0x30, 0x98, 0x4c, 0x50, 0x18, 0x1c, 0x0a, 0x04];

        let decoded = Decoder::decode_to_vec(&data[..], 12, &Config::VARIABLE)?;

        assert_eq!(decoded, b"aabababababa");

        Ok(())
    }

    #[test]
    fn decode_nothing() -> Result<(), DecodingError> {
        let mut decoded = vec![];
        let stats = Decoder::decode(std::io::empty(), &mut decoded, 0, &Config::GIF)?;

        assert!(decoded.is_empty());
        assert_eq!(stats, DecodeStats::default());

        Ok(())
    }

    #[test]
    fn decode_fixed_little_endian() -> Result<(), DecodingError> {
        let data = [0x0, 0x0, 0x0, 0x1, 0x30, 0x0];

        let decoded = FixedDecoder::decode_to_vec(&data[..], 4, Endianness::LittleEndian)?;

        assert_eq!(decoded, [0, 0, 1, 3]);

        Ok(())
    }

    #[test]
    fn undefined_code_is_corrupt() {
        // 65 then 300 on 9 bits, while the next code to assign is 256.
        let data = [0x20, 0xCB, 0x00];

        let error = Decoder::decode_to_vec(&data[..], 10, &Config::VARIABLE).unwrap_err();

        assert!(matches!(
            error,
            DecodingError::CorruptStream {
                index: 1,
                reason: Corruption::UndefinedCode {
                    code: 300,
                    next_code: 256
                }
            }
        ));
    }

    #[test]
    fn first_code_must_be_a_byte() {
        // 300 on 9 bits.
        let data = [0x96, 0x00];

        let error = Decoder::decode_to_vec(&data[..], 1, &Config::VARIABLE).unwrap_err();

        assert!(matches!(
            error,
            DecodingError::CorruptStream {
                index: 0,
                reason: Corruption::NotSingleton(300)
            }
        ));
    }

    #[test]
    fn missing_data_is_truncated() {
        let data = [0x20, 0xC0];

        let error = Decoder::decode_to_vec(&data[..], 5, &Config::VARIABLE).unwrap_err();

        assert!(matches!(
            error,
            DecodingError::TruncatedStream { codes_read: 1 }
        ));
    }

    #[test]
    fn overshooting_length_is_a_mismatch() {
        // The last code expands to two bytes while only one is left to rebuild.
        let data = [0x20, 0xC0, 0x20, 0x00];

        let error = Decoder::decode_to_vec(&data[..], 4, &Config::VARIABLE).unwrap_err();

        assert!(matches!(
            error,
            DecodingError::LengthMismatch {
                expected: 4,
                actual: 5
            }
        ));
    }

    #[test]
    fn early_end_code_is_a_mismatch() {
        let data = [0x00, 0x83, 0x04, 0x04];

        let error = GifStyleDecoder::decode_to_vec(&data[..], 2).unwrap_err();

        assert!(matches!(
            error,
            DecodingError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn clear_code_restarts_the_dictionary() -> Result<(), DecodingError> {
        let mut data = vec![];
        let mut writer = BitPacker::new(&mut data, LittleEndian);
        for code in [CLEAR_CODE, 97, 98, 258, CLEAR_CODE, 98, 97, END_CODE] {
            writer.write(code, 9)?;
        }
        writer.fill()?;
        drop(writer);

        let mut decoded = vec![];
        let stats = GifStyleDecoder::decode(&data[..], &mut decoded, 6)?;

        assert_eq!(decoded, b"ababba");
        assert_eq!(stats.resets, 1);
        assert_eq!(stats.code_count, 7);

        Ok(())
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = Config {
            max_size: 1000,
            ..Config::VARIABLE
        };

        let error = Decoder::decode_to_vec(&[0x00][..], 1, &config).unwrap_err();

        assert!(matches!(
            error,
            DecodingError::InvalidConfiguration(ConfigError::NotPowerOfTwo(1000))
        ));
    }

    #[test]
    fn decode_multiple_times() -> Result<(), DecodingError> {
        let data = [0x00, 0x83, 0x08, 0x14, 0x18, 0x10];

        let decoded1 = GifStyleDecoder::decode_to_vec(&data[..], 5)?;
        let decoded2 = GifStyleDecoder::decode_to_vec(&data[..], 5)?;

        assert_eq!(decoded1, decoded2);

        Ok(())
    }
}
