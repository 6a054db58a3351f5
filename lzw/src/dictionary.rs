//! The code table shared, in spirit, by the encoder and the decoder.
//!
//! Both sides start from the same 256 single byte entries and insert the same
//! `(prefix, symbol)` pairs in the same order, so code numbers and code widths stay
//! in lockstep without ever being transmitted.

use indexmap::IndexSet;
use log::trace;

use crate::{
    config::{bit_length, Config, WidthSwitch},
    decoder::Corruption,
};

/// Code telling the decoder to go back to the initial table, when control codes are enabled.
pub const CLEAR_CODE: u16 = 256;
/// Code marking the end of the data, when control codes are enabled.
pub const END_CODE: u16 = 257;

/// A dictionary entry: the byte sequence of `prefix` followed by `symbol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Word {
    prefix: u16,
    symbol: u8,
}

/// Public view of a dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// `None` only for the 256 single byte entries.
    pub prefix: Option<u16>,
    pub symbol: u8,
}

/// Dictionary of byte sequences, indexed by code.
///
/// The 256 single byte entries are implicit. Entries added later live in an
/// insertion ordered set: the position in the set gives the code, and the set
/// itself answers `(prefix, symbol)` lookups.
pub struct Dictionary {
    words: IndexSet<Word>,
    first_code: usize,
    max_size: usize,
    min_code_width: u8,
    max_code_width: u8,
    width_switch: WidthSwitch,
}

impl Dictionary {
    /// Creates a dictionary holding the initial table. `config` is expected to be valid.
    pub fn new(config: &Config) -> Self {
        let first_code = config.first_code();
        let words = IndexSet::with_capacity(config.max_size.saturating_sub(first_code));

        Self {
            words,
            first_code,
            max_size: config.max_size,
            min_code_width: config.min_code_width,
            max_code_width: config.max_code_width,
            width_switch: config.width_switch,
        }
    }

    /// Drops every entry but the initial table.
    pub fn reset(&mut self) {
        self.words.clear();
    }

    /// The next code to be assigned. Counts the reserved control codes.
    #[inline]
    pub fn size(&self) -> usize {
        self.first_code + self.words.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.size() >= self.max_size
    }

    /// Code of the sequence `prefix` + `symbol`, if known.
    #[inline]
    pub fn lookup(&self, prefix: u16, symbol: u8) -> Option<u16> {
        self.words
            .get_full(&Word { prefix, symbol })
            .and_then(|(index, _)| u16::try_from(self.first_code + index).ok())
    }

    /// Adds the sequence `prefix` + `symbol` under the next code and returns that code.
    ///
    /// Returns `None` when the dictionary is full or already holds that sequence.
    pub fn insert(&mut self, prefix: u16, symbol: u8) -> Option<u16> {
        if self.is_full() {
            return None;
        }

        let code = u16::try_from(self.size()).ok()?;
        let width = self.code_width();
        let (_, added) = self.words.insert_full(Word { prefix, symbol });
        if !added {
            return None;
        }

        let new_width = self.code_width();
        if new_width > width {
            trace!("code width grows to {new_width} bits after code {code}");
        }

        Some(code)
    }

    /// Width of the codes written right now, kept within the configured range.
    ///
    /// With [WidthSwitch::Immediate] it is the smallest width with `2^width > size`, so
    /// the code about to be assigned already fits. With [WidthSwitch::Deferred] only the
    /// largest assigned code has to fit.
    #[inline]
    pub fn code_width(&self) -> u8 {
        self.width_for(self.size())
    }

    /// Width once one more entry is added, or the current width if there is no room.
    ///
    /// The decoder is always one entry behind the encoder: it can only add the entry
    /// for a code once it has seen the code that follows.
    #[inline]
    pub fn pending_code_width(&self) -> u8 {
        self.width_for((self.size() + 1).min(self.max_size))
    }

    fn width_for(&self, size: usize) -> u8 {
        let largest = match self.width_switch {
            WidthSwitch::Immediate => size,
            WidthSwitch::Deferred => size.saturating_sub(1),
        };
        bit_length(largest).clamp(self.min_code_width, self.max_code_width)
    }

    /// Returns the entry for `code`. Control codes and unassigned codes have none.
    pub fn entry(&self, code: u16) -> Option<Entry> {
        if let Ok(symbol) = u8::try_from(code) {
            return Some(Entry {
                prefix: None,
                symbol,
            });
        }

        let index = usize::from(code).checked_sub(self.first_code)?;
        self.words.get_index(index).map(|word| Entry {
            prefix: Some(word.prefix),
            symbol: word.symbol,
        })
    }

    /// Writes the byte sequence of `code` into `sequence`, replacing its content.
    ///
    /// Walks the prefix links back to a single byte entry, then reverses.
    pub fn expand(&self, code: u16, sequence: &mut Vec<u8>) -> Result<(), Corruption> {
        sequence.clear();

        let mut current = code;
        loop {
            let entry = self.entry(current).ok_or(Corruption::UndefinedCode {
                code: current,
                next_code: self.size(),
            })?;
            sequence.push(entry.symbol);

            match entry.prefix {
                None => break,
                Some(prefix) if prefix < current && sequence.len() < self.max_size => {
                    current = prefix;
                }
                Some(_) => return Err(Corruption::BrokenChain(code)),
            }
        }

        sequence.reverse();
        Ok(())
    }
}
