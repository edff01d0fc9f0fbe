//! Read Pipeline (spec §4.7): ties the I/O collaborator's line/key read to
//! timed-callback re-entrancy and tokenization.
//!
//! Grounded on `src/input_v3.rs::V3Input::read_line_with_timer` and
//! `src/timed_input.rs::TimedInput::read_line_with_timer` in the teacher
//! crate for the timeout/callback/terminator shape.

use log::{debug, warn};

use crate::charset::{CharacterSet, UnicodeCapability};
use crate::dictionary::KeyWidth;
use crate::error::Result;
use crate::interpreter_host::InterpreterHost;
use crate::io::IoHost;
use crate::memory::MemoryBus;
use crate::text::alphabet::AlphabetTables;
use crate::tokenizer;

/// read_line(buffer, parse, time, routine) -> terminator CHARCODE (spec
/// §4.7). `user_dict`/`skip_unrecognized` are forwarded to the tokenizer
/// when `parse != 0`.
#[allow(clippy::too_many_arguments)]
pub fn read_line(
    memory: &mut impl MemoryBus,
    io: &mut impl IoHost,
    interpreter: &mut impl InterpreterHost,
    buffer: u32,
    parse: u32,
    time_tenths: u16,
    routine: u32,
    user_dict: Option<u32>,
    key_width: KeyWidth,
    alphabets: &AlphabetTables,
    charset: &CharacterSet,
    unicode: &impl UnicodeCapability,
) -> Result<u8> {
    let max = memory.get_byte(buffer)? as usize;
    let offset = memory.get_byte(buffer + 1)? as usize;

    interpreter.begin_external_wait();
    let mut timer_err: Option<crate::error::CoreError> = None;
    let (text, terminator) = {
        let mut timer_cb = || match interpreter.invoke_timer_routine(routine) {
            Ok(cancel) => cancel,
            Err(e) => {
                timer_err = Some(e);
                true
            }
        };
        io.read_line(time_tenths, &mut timer_cb)
    };
    interpreter.end_external_wait();
    if let Some(e) = timer_err {
        return Err(e);
    }

    debug!("read_line: got {} char(s), terminator={:?}", text.chars().count(), terminator);

    let mut encoded: Vec<u8> = Vec::with_capacity(text.chars().count());
    for ch in text.chars() {
        if !unicode.can_input(ch) {
            warn!("read_line: host reports it cannot input {ch:?}; accepting anyway");
        }
        encoded.push(charset.encode(ch));
    }
    let room = max.saturating_sub(offset);
    encoded.truncate(room);

    memory.set_byte(buffer + 1, (offset + encoded.len()) as u8)?;
    for (i, &b) in encoded.iter().enumerate() {
        memory.set_byte(buffer + 2 + offset as u32 + i as u32, b)?;
    }

    if parse != 0 {
        tokenizer::tokenize(memory, buffer, parse, user_dict, false, key_width, alphabets, charset)?;
    }

    Ok(terminator.charcode())
}

/// read_key(time, routine) -> CHARCODE (spec §4.7).
pub fn read_key(
    io: &mut impl IoHost,
    interpreter: &mut impl InterpreterHost,
    time_tenths: u16,
    routine: u32,
    charset: &CharacterSet,
    unicode: &impl UnicodeCapability,
) -> Result<u8> {
    interpreter.begin_external_wait();
    let mut timer_err: Option<crate::error::CoreError> = None;
    let key = {
        let mut timer_cb = || match interpreter.invoke_timer_routine(routine) {
            Ok(cancel) => cancel,
            Err(e) => {
                timer_err = Some(e);
                true
            }
        };
        io.read_key(time_tenths, &mut timer_cb)
    };
    interpreter.end_external_wait();
    if let Some(e) = timer_err {
        return Err(e);
    }

    Ok(match key {
        Some(ch) => {
            if !unicode.can_input(ch) {
                warn!("read_key: host reports it cannot input {ch:?}; accepting anyway");
            }
            charset.encode(ch)
        }
        None => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::AlwaysCapable;
    use crate::interpreter_host::test_support::{CancelAfter, NeverCancel};
    use crate::io::test_support::RecordingIo;
    use crate::io::Terminator;
    use crate::memory::{FlatMemory, Header};

    fn header(rom_start: u32) -> Header {
        Header {
            rom_start,
            abbrev_table: 0,
            abbrev_count: 96,
            dictionary: 0,
            alphabet_table_override: 0,
            extras_table_override: 0,
            word_separators: 0x10,
        }
    }

    fn buffer_setup(mem: &mut FlatMemory, buffer: u32, capacity: u8, offset: u8) {
        mem.set_byte(buffer, capacity).unwrap();
        mem.set_byte(buffer + 1, offset).unwrap();
    }

    #[test]
    fn read_line_writes_text_and_returns_enter_terminator() {
        let mut mem = FlatMemory::new(vec![0u8; 0x200], header(0x180));
        let sep_table = 0x10usize;
        mem.set_byte(0x10, 0).unwrap(); // no separators

        let buffer = 0x100u32;
        buffer_setup(&mut mem, buffer, 64, 0);

        let mut io = RecordingIo::default();
        io.scripted_lines.push_back(("hi".to_string(), Terminator::Enter));
        let mut interp = NeverCancel::default();

        let code = read_line(
            &mut mem,
            &mut io,
            &mut interp,
            buffer,
            0,
            0,
            0,
            None,
            KeyWidth::Long,
            &AlphabetTables::default(),
            &CharacterSet::default(),
            &AlwaysCapable,
        )
        .unwrap();

        assert_eq!(code, 13);
        assert_eq!(mem.as_slice()[buffer as usize + 1], 2);
        assert_eq!(&mem.as_slice()[buffer as usize + 2..buffer as usize + 4], b"hi");
        let _ = sep_table;
    }

    #[test]
    fn read_line_tokenizes_when_parse_buffer_given() {
        let mut mem = FlatMemory::new(vec![0u8; 0x300], header(0x280));
        mem.set_byte(0x10, 0).unwrap();

        let buffer = 0x100u32;
        buffer_setup(&mut mem, buffer, 64, 0);
        let parse = 0x200u32;
        mem.set_byte(parse, 8).unwrap();

        let mut io = RecordingIo::default();
        io.scripted_lines.push_back(("go".to_string(), Terminator::Enter));
        let mut interp = NeverCancel::default();

        read_line(
            &mut mem,
            &mut io,
            &mut interp,
            buffer,
            parse,
            0,
            0,
            None,
            KeyWidth::Long,
            &AlphabetTables::default(),
            &CharacterSet::default(),
            &AlwaysCapable,
        )
        .unwrap();

        assert_eq!(mem.as_slice()[parse as usize + 1], 1);
    }

    /// Scenario S6 from spec §8: the timer callback cancels on its first
    /// invocation; read_line returns terminator 0 with accumulated text.
    #[test]
    fn scenario_s6_timed_cancel_returns_zero_terminator() {
        let mut mem = FlatMemory::new(vec![0u8; 0x200], header(0x180));
        mem.set_byte(0x10, 0).unwrap();
        let buffer = 0x100u32;
        buffer_setup(&mut mem, buffer, 64, 0);

        let mut io = RecordingIo::default();
        // The I/O collaborator invokes the timer at least once before any
        // text is accumulated, per spec §4.7; RecordingIo checks it first.
        let mut interp = CancelAfter::new(0);

        let code = read_line(
            &mut mem,
            &mut io,
            &mut interp,
            buffer,
            0,
            10,
            0x4000,
            None,
            KeyWidth::Long,
            &AlphabetTables::default(),
            &CharacterSet::default(),
            &AlwaysCapable,
        )
        .unwrap();

        assert_eq!(code, 0);
        assert_eq!(mem.as_slice()[buffer as usize + 1], 0);
    }

    #[test]
    fn external_wait_is_bracketed_around_the_io_call() {
        let mut mem = FlatMemory::new(vec![0u8; 0x200], header(0x180));
        mem.set_byte(0x10, 0).unwrap();
        let buffer = 0x100u32;
        buffer_setup(&mut mem, buffer, 64, 0);

        let mut io = RecordingIo::default();
        io.scripted_lines.push_back((String::new(), Terminator::Enter));
        let mut interp = NeverCancel::default();

        read_line(
            &mut mem,
            &mut io,
            &mut interp,
            buffer,
            0,
            0,
            0,
            None,
            KeyWidth::Long,
            &AlphabetTables::default(),
            &CharacterSet::default(),
            &AlwaysCapable,
        )
        .unwrap();

        assert_eq!(interp.wait_depth, 0);
    }

    /// §4.1's `CheckUnicode` is advisory on the input side too: the read
    /// pipeline queries it per character but still accepts characters the
    /// host reports it cannot input.
    #[test]
    fn unicode_capability_is_queried_but_never_filters_input() {
        use crate::charset::test_support::RecordingCapability;

        let mut mem = FlatMemory::new(vec![0u8; 0x200], header(0x180));
        mem.set_byte(0x10, 0).unwrap();
        let buffer = 0x100u32;
        buffer_setup(&mut mem, buffer, 64, 0);

        let mut io = RecordingIo::default();
        io.scripted_lines.push_back(("a€".to_string(), Terminator::Enter));
        let mut interp = NeverCancel::default();
        let capability = RecordingCapability {
            unsupported: vec!['€'],
            ..Default::default()
        };

        read_line(
            &mut mem,
            &mut io,
            &mut interp,
            buffer,
            0,
            0,
            0,
            None,
            KeyWidth::Long,
            &AlphabetTables::default(),
            &CharacterSet::default(),
            &capability,
        )
        .unwrap();

        assert_eq!(capability.input_queries.borrow().as_slice(), ['a', '€']);
        assert_eq!(mem.as_slice()[buffer as usize + 1], 2);
    }
}
