//! Codec configuration and its validation.

use thiserror::Error;

use crate::Endianness;

/// Number of single byte codes every dictionary starts with.
pub(crate) const SINGLETON_COUNT: usize = 256;

/// Widest code the packer can carry.
const MAX_SUPPORTED_WIDTH: u8 = 16;

/// What the dictionary does once every code of the code space is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenFull {
    /// Go back to the initial table. With control codes enabled, a clear code is
    /// written so the decoder follows.
    Reset,
    /// Stop adding entries and keep using the table as it is.
    Freeze,
}

/// When codes get one bit wider.
///
/// Encoder and decoder derive the width from the dictionary size alone, this only
/// moves the switch point by one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthSwitch {
    /// As soon as the next code to assign no longer fits: the width is the smallest
    /// one with `2^width > size`.
    Immediate,
    /// One code later, once the largest assigned code no longer fits. GIF decoders
    /// expect this.
    Deferred,
}

/// Error returned when a [Config] describes a codec that can't work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("minimum code width {min} can't hold the initial codes, it should be at least {required}")]
    MinCodeWidth { min: u8, required: u8 },
    #[error("maximum code width {0} is above the supported 16 bits")]
    MaxCodeWidth(u8),
    #[error("code width range {min}..={max} is empty")]
    EmptyWidthRange { min: u8, max: u8 },
    #[error("dictionary size {0} is not a power of two")]
    NotPowerOfTwo(usize),
    #[error("dictionary size {max_size} leaves no room after the {first_code} initial codes")]
    NoRoomToGrow { max_size: usize, first_code: usize },
    #[error("dictionary size {max_size} needs codes wider than {max_code_width} bits")]
    SizeExceedsWidth { max_size: usize, max_code_width: u8 },
}

/// Describes one variant of the codec.
///
/// Encoder and decoder must be given the same configuration, nothing about it is
/// written in the compressed stream.
///
/// # Examples
///
/// ```
/// use lzw_codec::{Config, Endianness};
///
/// let tiff_like = Config {
///     endianness: Endianness::BigEndian,
///     ..Config::GIF
/// };
/// assert!(tiff_like.validate().is_ok());
///
/// let broken = Config {
///     max_size: 3000,
///     ..Config::default()
/// };
/// assert!(broken.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Bit ordering of the packed codes.
    pub endianness: Endianness,
    /// Codes are never written narrower than this.
    pub min_code_width: u8,
    /// Codes are never written wider than this.
    pub max_code_width: u8,
    /// Size of the code space, control codes included. Must be a power of two.
    pub max_size: usize,
    /// Reserve 256 as a clear code and 257 as an end of information code.
    pub control_codes: bool,
    /// Behavior once `max_size` codes are assigned.
    pub when_full: WhenFull,
    /// Where codes grow past a power of two. Irrelevant for fixed width codes.
    pub width_switch: WidthSwitch,
}

impl Config {
    /// Variable code width from 9 to 12 bits, big endian packing, no control codes.
    /// The dictionary starts over silently when its 4096 codes are used.
    pub const VARIABLE: Self = Self {
        endianness: Endianness::BigEndian,
        min_code_width: 9,
        max_code_width: 12,
        max_size: 4096,
        control_codes: false,
        when_full: WhenFull::Reset,
        width_switch: WidthSwitch::Immediate,
    };

    /// GIF flavored: little endian packing, 9 to 12 bits, clear and end codes, widths
    /// switching the way GIF decoders read them.
    pub const GIF: Self = Self {
        endianness: Endianness::LittleEndian,
        min_code_width: 9,
        max_code_width: 12,
        max_size: 4096,
        control_codes: true,
        when_full: WhenFull::Reset,
        width_switch: WidthSwitch::Deferred,
    };

    /// Fixed 12 bit codes, big endian packing. The dictionary stops growing once full.
    pub const FIXED_12: Self = Self {
        endianness: Endianness::BigEndian,
        min_code_width: 12,
        max_code_width: 12,
        max_size: 4096,
        control_codes: false,
        when_full: WhenFull::Freeze,
        width_switch: WidthSwitch::Immediate,
    };

    /// One little endian 16 bit word per code, 4096 entries, frozen once full.
    pub const WORD_16: Self = Self {
        endianness: Endianness::LittleEndian,
        min_code_width: 16,
        max_code_width: 16,
        max_size: 4096,
        control_codes: false,
        when_full: WhenFull::Freeze,
        width_switch: WidthSwitch::Immediate,
    };

    /// The first code assigned to a new dictionary entry.
    pub const fn first_code(&self) -> usize {
        if self.control_codes {
            SINGLETON_COUNT + 2
        } else {
            SINGLETON_COUNT
        }
    }

    /// Checks that encoder and decoder can both work with this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let first_code = self.first_code();
        let required = bit_length(first_code - 1);

        if self.min_code_width < required {
            return Err(ConfigError::MinCodeWidth {
                min: self.min_code_width,
                required,
            });
        }
        if self.max_code_width > MAX_SUPPORTED_WIDTH {
            return Err(ConfigError::MaxCodeWidth(self.max_code_width));
        }
        if self.min_code_width > self.max_code_width {
            return Err(ConfigError::EmptyWidthRange {
                min: self.min_code_width,
                max: self.max_code_width,
            });
        }
        if !self.max_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo(self.max_size));
        }
        if self.max_size <= first_code {
            return Err(ConfigError::NoRoomToGrow {
                max_size: self.max_size,
                first_code,
            });
        }
        if self.max_size > 1 << self.max_code_width {
            return Err(ConfigError::SizeExceedsWidth {
                max_size: self.max_size,
                max_code_width: self.max_code_width,
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::VARIABLE
    }
}

/// Number of bits needed to write `value`.
pub(crate) const fn bit_length(value: usize) -> u8 {
    (usize::BITS - value.leading_zeros()) as u8
}
