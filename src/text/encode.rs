//! Text Encoder (spec §4.3): packs a plain CHARCODE byte buffer into a
//! 5-bit-per-character Z-string, either an exact target width (dictionary
//! keys) or a variable/minimal width.
//!
//! Grounded on `dictionary.rs::encode_word_v3`/`encode_word_v4_plus` in the
//! teacher crate for the packing shape; generalized here to an arbitrary
//! target Z-character count instead of the two hard-coded widths, per
//! SPEC_FULL.md's key-width supplement.

use crate::charset::CharacterSet;
use crate::error::{CoreError, Result};
use crate::text::alphabet::AlphabetTables;

/// `T=0` means "variable width, padded to the next multiple of 3"; a
/// positive multiple of 3 means "exactly T Z-characters" (the dictionary
/// path uses 9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetWidth {
    Variable,
    Exact(usize),
}

impl TargetWidth {
    fn validate(self) -> Result<()> {
        if let TargetWidth::Exact(t) = self {
            if t == 0 || t % 3 != 0 {
                return Err(CoreError::EncoderArgument(t));
            }
        }
        Ok(())
    }
}

/// Encode `bytes` (plain CHARCODE, lower-cased per spec §4.3 step 1) into
/// packed 16-bit Z-words.
pub fn encode(
    bytes: &[u8],
    width: TargetWidth,
    alphabets: &AlphabetTables,
    charset: &CharacterSet,
) -> Result<Vec<u16>> {
    width.validate()?;

    let mut zchars: Vec<u8> = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        let h = charset.decode(b).to_ascii_lowercase();
        if h == ' ' {
            zchars.push(0);
        } else if let Some(i) = alphabets.index_of(0, charset.encode(h)) {
            zchars.push(i as u8 + 6);
        } else if let Some(i) = alphabets.index_of(1, charset.encode(h)) {
            zchars.push(4);
            zchars.push(i as u8 + 6);
        } else if let Some(i) = alphabets.index_of(2, charset.encode(h)) {
            zchars.push(5);
            zchars.push(i as u8 + 6);
        } else {
            // Literal fall-through uses the ORIGINAL byte, not the
            // lower-cased host char (spec §4.3 step 6).
            zchars.push(5);
            zchars.push(6);
            zchars.push(b >> 5);
            zchars.push(b & 31);
        }
    }

    match width {
        TargetWidth::Variable => {
            while !zchars.len().is_multiple_of(3) {
                zchars.push(5);
            }
        }
        TargetWidth::Exact(t) => {
            zchars.truncate(t);
            while zchars.len() < t {
                zchars.push(5);
            }
        }
    }

    let mut words = Vec::with_capacity(zchars.len() / 3);
    for chunk in zchars.chunks(3) {
        let word = ((chunk[0] as u16) << 10) | ((chunk[1] as u16) << 5) | (chunk[2] as u16);
        words.push(word);
    }
    if let Some(last) = words.last_mut() {
        *last |= 0x8000;
    }
    Ok(words)
}

/// Encode into the raw big-endian byte sequence dictionary lookups compare
/// against (spec §4.5 step 1).
pub fn encode_bytes(
    bytes: &[u8],
    width: TargetWidth,
    alphabets: &AlphabetTables,
    charset: &CharacterSet,
) -> Result<Vec<u8>> {
    let words = encode(bytes, width, alphabets, charset)?;
    let mut out = Vec::with_capacity(words.len() * 2);
    for w in words {
        out.extend_from_slice(&w.to_be_bytes());
    }
    Ok(out)
}
