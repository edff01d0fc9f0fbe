//! Text Decoder (spec §4.2): the 5-bits-per-character alphabet-shift state
//! machine with abbreviation substitution.
//!
//! Grounded on `text.rs::decode_string_recursive` /
//! `interpreter/text/text.rs::decode_string_recursive` in the teacher crate
//! for the state-machine shape, and `util.rs::read_zchars_from_word` for
//! pulling the three 5-bit Z-characters plus the terminator bit out of a
//! 16-bit word with `bitreader::BitReader` instead of hand-rolled shifts.

use bitreader::BitReader;
use log::trace;

use crate::charset::CharacterSet;
use crate::error::Result;
use crate::memory::MemoryBus;
use crate::text::alphabet::AlphabetTables;

/// Abbreviations are documented (spec §3) to never themselves contain
/// abbreviation markers, so one extra level of recursion is all decoding
/// ever needs (spec §9: "maximum depth of 1"). A deeper reference is
/// treated as malformed story data and simply stops expanding rather than
/// aborting the whole decode.
const MAX_ABBREV_DEPTH: u8 = 1;

struct DecoderState {
    alphabet: u8,
    abbrev_mode: u8,
}

impl DecoderState {
    fn new() -> Self {
        DecoderState {
            alphabet: 0,
            abbrev_mode: 0,
        }
    }
}

/// Decode a Z-string from `memory` at `addr`, returning the decoded string
/// and the number of bytes consumed (spec §4.2).
pub fn decode_string(
    memory: &impl MemoryBus,
    addr: u32,
    abbrev_table_addr: u32,
    alphabets: &AlphabetTables,
    charset: &CharacterSet,
) -> Result<(String, usize)> {
    decode_string_depth(memory, addr, abbrev_table_addr, alphabets, charset, 0)
}

fn decode_string_depth(
    memory: &impl MemoryBus,
    addr: u32,
    abbrev_table_addr: u32,
    alphabets: &AlphabetTables,
    charset: &CharacterSet,
    depth: u8,
) -> Result<(String, usize)> {
    let mut result = String::new();
    let mut state = DecoderState::new();
    let mut cursor = addr;
    let mut consumed = 0usize;

    loop {
        let word = memory.get_word(cursor)?;
        cursor += 2;
        consumed += 2;

        let bytes = word.to_be_bytes();
        let mut reader = BitReader::new(&bytes);
        let is_last = reader.read_u8(1)? == 1;
        let zchars = [reader.read_u8(5)?, reader.read_u8(5)?, reader.read_u8(5)?];
        trace!("Z-word {word:#06x} = Z-chars {zchars:?}, is_end={is_last}");

        for &zc in &zchars {
            transition(
                &mut state,
                zc,
                memory,
                abbrev_table_addr,
                alphabets,
                charset,
                depth,
                &mut result,
            )?;
        }

        if is_last {
            break;
        }
    }

    Ok((result, consumed))
}

/// Applies one Z-character transition (spec §4.2, numbered rules 1-8).
/// State (`alphabet`, `abbrev_mode`) persists across calls, so the 10-bit
/// literal escape and abbreviation references work the same whether their
/// operand Z-characters land in this word or the next.
#[allow(clippy::too_many_arguments)]
fn transition(
    state: &mut DecoderState,
    zc: u8,
    memory: &impl MemoryBus,
    abbrev_table_addr: u32,
    alphabets: &AlphabetTables,
    charset: &CharacterSet,
    depth: u8,
    result: &mut String,
) -> Result<()> {
    // Rule 1: abbreviation reference.
    if (1..=3).contains(&state.abbrev_mode) {
        let abbrev_index = 32 * (state.abbrev_mode - 1) as u32 + zc as u32;
        state.abbrev_mode = 0;
        if depth < MAX_ABBREV_DEPTH {
            let entry_addr = abbrev_table_addr + abbrev_index * 2;
            let packed = memory.get_word(entry_addr)?;
            let byte_addr = packed as u32 * 2;
            let (abbrev_str, _) = decode_string_depth(
                memory,
                byte_addr,
                abbrev_table_addr,
                alphabets,
                charset,
                depth + 1,
            )?;
            result.push_str(&abbrev_str);
        }
        return Ok(());
    }

    // Rules 2-3: 10-bit literal CHARCODE escape (alphabet==2, i==0 case of
    // rule 8 sets abbrev_mode=4 to start this).
    if state.abbrev_mode == 4 {
        state.abbrev_mode = 5;
        state.alphabet = zc; // upper 5 bits of the literal CHARCODE
        return Ok(());
    }
    if state.abbrev_mode == 5 {
        let code = (state.alphabet << 5) | zc;
        result.push(charset.decode(code));
        state.abbrev_mode = 0;
        state.alphabet = 0;
        return Ok(());
    }

    match zc {
        // Rule 4: space.
        0 => result.push(' '),
        // Rule 5: begin an abbreviation reference.
        1..=3 => state.abbrev_mode = zc,
        // Rule 6: one-shot uppercase shift.
        4 => state.alphabet = 1,
        // Rule 7: one-shot punctuation shift.
        5 => state.alphabet = 2,
        // Rule 8: alphabet character, or the literal-escape trigger.
        6..=31 => {
            let i = (zc - 6) as usize;
            if state.alphabet == 2 && i == 0 {
                state.abbrev_mode = 4;
                return Ok(());
            }
            let code = alphabets.table(state.alphabet)[i];
            result.push(charset.decode(code));
            state.alphabet = 0;
        }
        _ => unreachable!("5-bit Z-character out of range: {zc}"),
    }

    Ok(())
}
