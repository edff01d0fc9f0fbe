//! The three 26-entry Z-character alphabets (spec §3, "Alphabet A0/A1/A2").
//!
//! Grounded on `text.rs`'s `ALPHABET_A0`/`ALPHABET_A1`/`ALPHABET_A2_V3`
//! constants and `util.rs`'s `ALPHABETMAP` lazy_static table in the teacher
//! crate — both encode the same three default tables, just keyed
//! differently. This crate keeps the `lazy_static` default-table pattern
//! from `util.rs`.

use lazy_static::lazy_static;

const DEFAULT_A0: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
const DEFAULT_A1: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
// A2[0] is never emitted directly (it's the 10-bit literal escape trigger);
// A2[1] is newline, matching spec §3's data model note.
const DEFAULT_A2: &[u8; 26] = b" \r0123456789.,!?_#'\"/\\-:()";

lazy_static! {
    static ref DEFAULT_TABLES: AlphabetTables = AlphabetTables {
        a0: *DEFAULT_A0,
        a1: *DEFAULT_A1,
        a2: *DEFAULT_A2,
    };
}

/// The three ordered 26-entry CHARCODE tables (spec §3).
#[derive(Debug, Clone, Copy)]
pub struct AlphabetTables {
    pub a0: [u8; 26],
    pub a1: [u8; 26],
    pub a2: [u8; 26],
}

impl Default for AlphabetTables {
    fn default() -> Self {
        *DEFAULT_TABLES
    }
}

impl AlphabetTables {
    pub fn table(&self, alphabet: u8) -> &[u8; 26] {
        match alphabet {
            0 => &self.a0,
            1 => &self.a1,
            2 => &self.a2,
            _ => panic!("alphabet index out of range: {alphabet}"),
        }
    }

    /// Index of `code` within alphabet `alphabet`, if present.
    pub fn index_of(&self, alphabet: u8, code: u8) -> Option<usize> {
        self.table(alphabet).iter().position(|&c| c == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_have_26_entries() {
        let t = AlphabetTables::default();
        assert_eq!(t.a0.len(), 26);
        assert_eq!(t.a1.len(), 26);
        assert_eq!(t.a2.len(), 26);
    }

    #[test]
    fn a2_slot_one_is_newline() {
        assert_eq!(AlphabetTables::default().a2[1], b'\r');
    }
}
