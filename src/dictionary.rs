//! Dictionary Lookup (spec §4.5): binary search over the sorted built-in
//! dictionary, or binary/linear search over a user dictionary depending on
//! its signed entry count.
//!
//! Grounded on `src/dictionary.rs::lookup_dictionary_v3`/
//! `lookup_dictionary_v4_plus` in the teacher crate for the binary-search
//! shape (lexicographic compare over packed words); generalized here to
//! take the key width as a parameter rather than hard-coding it per
//! version, per SPEC_FULL.md's key-width supplement.

use crate::charset::CharacterSet;
use crate::error::Result;
use crate::memory::MemoryBus;
use crate::text::alphabet::AlphabetTables;
use crate::text::encode::{encode_bytes, TargetWidth};

/// Encoded dictionary key width (spec.md's [SUPPLEMENT] on version-dependent
/// key width): `Short` is the V3 6-Z-character/4-byte key, `Long` is the
/// V4+ 9-Z-character/6-byte key spec.md's worked examples use by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyWidth {
    Short,
    #[default]
    Long,
}

impl KeyWidth {
    fn z_chars(self) -> usize {
        match self {
            KeyWidth::Short => 6,
            KeyWidth::Long => 9,
        }
    }

    fn bytes(self) -> usize {
        2 * self.z_chars() / 3
    }
}

/// Look up `key_bytes` (plain CHARCODE, not yet encoded) in the dictionary
/// at `user_dict` (`None` = built-in, per spec.md's `userDict == 0`
/// convention) against `header.dictionary`. Returns the entry's byte
/// address, or 0 on a miss (a dictionary miss is not an error, per spec §7
/// item 4).
pub fn lookup(
    memory: &impl MemoryBus,
    key_bytes: &[u8],
    user_dict: Option<u32>,
    key_width: KeyWidth,
    alphabets: &AlphabetTables,
    charset: &CharacterSet,
) -> Result<u32> {
    let key = encode_bytes(
        key_bytes,
        TargetWidth::Exact(key_width.z_chars()),
        alphabets,
        charset,
    )?;

    let dict_header_addr = user_dict.unwrap_or(memory.header().dictionary);
    let separator_count = memory.get_byte(dict_header_addr)? as u32;
    let base = dict_header_addr + 1 + separator_count;

    let entry_length = memory.get_byte(base)? as u32;
    let raw_count = memory.get_word(base + 1)?;
    let entries_addr = base + 3;
    let key_bytes_width = key_width.bytes();

    let unsorted = user_dict.is_some() && (raw_count as i16) < 0;
    let count = if unsorted {
        (raw_count as i16).unsigned_abs() as u32
    } else {
        raw_count as u32
    };

    let entry_key = |index: u32| -> Result<Vec<u8>> {
        let addr = entries_addr + index * entry_length;
        let mut bytes = vec![0u8; key_bytes_width];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = memory.get_byte(addr + i as u32)?;
        }
        Ok(bytes)
    };

    if unsorted {
        for i in 0..count {
            if entry_key(i)? == key {
                return Ok(entries_addr + i * entry_length);
            }
        }
        return Ok(0);
    }

    let mut lo = 0i64;
    let mut hi = count as i64 - 1;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let candidate = entry_key(mid as u32)?;
        match candidate.cmp(&key) {
            std::cmp::Ordering::Equal => return Ok(entries_addr + mid as u32 * entry_length),
            std::cmp::Ordering::Less => lo = mid + 1,
            std::cmp::Ordering::Greater => hi = mid - 1,
        }
    }
    Ok(0)
}
