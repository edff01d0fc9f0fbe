//! Input Tokenizer (spec §4.6): splits a read buffer into tokens honoring
//! whitespace and a per-dictionary list of hard separators, then writes
//! (dictionary-address, length, offset) quads into a parse buffer.
//!
//! Grounded on `src/dictionary.rs::parse_text` in the teacher crate for the
//! parse-buffer quad layout; generalized here to honor per-dictionary hard
//! separators (the teacher's version only split on whitespace).

use log::debug;

use crate::charset::CharacterSet;
use crate::dictionary::{self, KeyWidth};
use crate::error::Result;
use crate::memory::MemoryBus;
use crate::text::alphabet::AlphabetTables;

fn is_whitespace(b: u8) -> bool {
    b == 9 || b == 32
}

/// Reads the separator set for `user_dict` (`None` = built-in, which uses
/// `header.word_separators`; `Some(addr)` uses the user dictionary's own
/// separator-count-prefixed table).
fn read_separators(memory: &impl MemoryBus, user_dict: Option<u32>) -> Result<Vec<u8>> {
    let table_addr = user_dict.unwrap_or(memory.header().word_separators);
    let count = memory.get_byte(table_addr)? as usize;
    let mut out = vec![0u8; count];
    memory.get_bytes(table_addr + 1, count, &mut out, 0)?;
    Ok(out)
}

struct Token {
    start: usize,
    length: usize,
}

fn split_tokens(text: &[u8], separators: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0usize;
    while i < text.len() {
        if is_whitespace(text[i]) {
            i += 1;
            continue;
        }
        if separators.contains(&text[i]) {
            tokens.push(Token { start: i, length: 1 });
            i += 1;
            continue;
        }
        let start = i;
        while i < text.len() && !is_whitespace(text[i]) && !separators.contains(&text[i]) {
            i += 1;
        }
        tokens.push(Token {
            start,
            length: i - start,
        });
    }
    tokens
}

/// Tokenize the read buffer at `buffer` into the parse buffer at `parse`
/// (spec §4.6). `user_dict` selects the dictionary (`None` = built-in).
#[allow(clippy::too_many_arguments)]
pub fn tokenize(
    memory: &mut impl MemoryBus,
    buffer: u32,
    parse: u32,
    user_dict: Option<u32>,
    skip_unrecognized: bool,
    key_width: KeyWidth,
    alphabets: &AlphabetTables,
    charset: &CharacterSet,
) -> Result<()> {
    let buf_len = memory.get_byte(buffer + 1)? as usize;
    let mut text = vec![0u8; buf_len];
    memory.get_bytes(buffer + 2, buf_len, &mut text, 0)?;

    let separators = read_separators(memory, user_dict)?;
    let tokens = split_tokens(&text, &separators);

    let max_tokens = memory.get_byte(parse)? as usize;
    let mut count = 0usize;

    for token in tokens {
        if count >= max_tokens {
            break;
        }
        let word = &text[token.start..token.start + token.length];
        let dict_addr = dictionary::lookup(memory, word, user_dict, key_width, alphabets, charset)?;

        if dict_addr == 0 && skip_unrecognized {
            continue;
        }

        let quad_addr = parse + 2 + 4 * count as u32;
        memory.set_word(quad_addr, dict_addr as u16)?;
        memory.set_byte(quad_addr + 2, token.length as u8)?;
        memory.set_byte(quad_addr + 3, (2 + token.start) as u8)?;
        count += 1;
    }

    debug!("tokenize: {count} token(s) written to parse buffer at {parse:#06x}");
    memory.set_byte(parse + 1, count as u8)
}
