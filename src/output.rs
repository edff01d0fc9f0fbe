//! Output Router (spec §4.4): fans writes across up to four logical
//! streams — screen, transcript, command-file echo, and a nestable stack
//! of in-memory capture buffers (stream 3).
//!
//! Grounded on `zmachine.rs::op_output_stream` in the teacher crate for the
//! stream-toggle shape (`output_streams: Vec<u16>`); generalized here into
//! a real LIFO stack since the teacher's version tracked only a flat set
//! and never supported nesting multiple stream-3 redirections.

use log::{debug, warn};

use crate::charset::{CharacterSet, UnicodeCapability};
use crate::error::{CoreError, Result};
use crate::io::IoHost;
use crate::memory::MemoryBus;

/// Stream 3 may be nested up to this deep (spec §3, "at most 16 frames
/// pushed").
pub const MAX_CAPTURE_DEPTH: usize = 16;

/// Minimum writable target address for a stream-3 capture (spec §3).
pub const MIN_CAPTURE_ADDR: u32 = 64;

struct CaptureFrame {
    target: u32,
    buffer: Vec<u8>,
}

/// The Output Router (spec §4.4).
pub struct OutputRouter {
    normal_output: bool,
    captures: Vec<CaptureFrame>,
}

impl Default for OutputRouter {
    fn default() -> Self {
        OutputRouter {
            normal_output: true,
            captures: Vec::new(),
        }
    }
}

impl OutputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while any stream-3 capture frame is on the stack.
    pub fn table_output(&self) -> bool {
        !self.captures.is_empty()
    }

    /// put_charcode(c) (spec §4.4).
    pub fn put_charcode(
        &mut self,
        c: u8,
        io: &mut impl IoHost,
        charset: &CharacterSet,
        unicode: &impl UnicodeCapability,
    ) -> Result<()> {
        if c == 0 {
            return Ok(());
        }
        self.put_unicode(charset.decode(c), io, charset, unicode);
        Ok(())
    }

    /// put_unicode(u) (spec §4.4). Consults `CheckUnicode` (spec §4.1) but
    /// never filters on the result — that decision belongs to the host, not
    /// the core; an unsupported character is logged and emitted anyway.
    pub fn put_unicode(
        &mut self,
        u: char,
        io: &mut impl IoHost,
        charset: &CharacterSet,
        unicode: &impl UnicodeCapability,
    ) {
        if !unicode.can_output(u) {
            warn!("put_unicode: host reports it cannot output {u:?}; emitting anyway");
        }
        if let Some(frame) = self.captures.last_mut() {
            frame.buffer.push(charset.encode(u));
            return;
        }
        self.forward(u, io);
    }

    /// put_string(s) (spec §4.4): applied per character.
    pub fn put_string(
        &mut self,
        s: &str,
        io: &mut impl IoHost,
        charset: &CharacterSet,
        unicode: &impl UnicodeCapability,
    ) {
        for ch in s.chars() {
            self.put_unicode(ch, io, charset, unicode);
        }
    }

    /// put_rectangle(lines) (spec §4.4): screen-only, never captured or
    /// transcripted.
    pub fn put_rectangle(&self, lines: &[String], io: &mut impl IoHost) {
        io.put_rectangle(lines);
    }

    fn forward(&self, ch: char, io: &mut impl IoHost) {
        if self.normal_output {
            io.put_char(ch);
        }
        if io.transcripting() {
            io.put_transcript_char(ch);
        }
    }

    /// Output-stream control (spec §4.4). `stream` is signed: negative
    /// disables. `table_target` supplies the capture address when enabling
    /// stream 3.
    pub fn set_output_stream(
        &mut self,
        stream: i16,
        table_target: Option<u32>,
        io: &mut impl IoHost,
        memory: &mut impl MemoryBus,
    ) -> Result<()> {
        debug!("set_output_stream: stream={stream}, target={table_target:?}");
        match stream {
            1 => {
                self.normal_output = true;
                Ok(())
            }
            -1 => {
                self.normal_output = false;
                Ok(())
            }
            2 => {
                io.set_transcripting(true);
                Ok(())
            }
            -2 => {
                io.set_transcripting(false);
                Ok(())
            }
            3 => self.push_capture(table_target, memory),
            -3 => self.pop_capture(memory),
            4 => {
                io.set_writing_commands_to_file(true);
                Ok(())
            }
            -4 => {
                io.set_writing_commands_to_file(false);
                Ok(())
            }
            other => {
                warn!("set_output_stream: unknown stream {other}");
                Err(CoreError::StreamControl {
                    stream: other,
                    reason: "unknown stream number",
                })
            }
        }
    }

    fn push_capture(&mut self, target: Option<u32>, memory: &impl MemoryBus) -> Result<()> {
        let target = target.ok_or(CoreError::StreamControl {
            stream: 3,
            reason: "enabling stream 3 requires a table address",
        })?;
        if self.captures.len() >= MAX_CAPTURE_DEPTH {
            return Err(CoreError::StreamControl {
                stream: 3,
                reason: "capture stack would exceed depth 16",
            });
        }
        if target < MIN_CAPTURE_ADDR {
            return Err(CoreError::StreamControl {
                stream: 3,
                reason: "target address below 64",
            });
        }
        if target + 1 >= memory.header().rom_start {
            return Err(CoreError::StreamControl {
                stream: 3,
                reason: "target address too close to ROM",
            });
        }
        self.captures.push(CaptureFrame {
            target,
            buffer: Vec::new(),
        });
        Ok(())
    }

    fn pop_capture(&mut self, memory: &mut impl MemoryBus) -> Result<()> {
        let frame = self.captures.pop().ok_or(CoreError::StreamControl {
            stream: -3,
            reason: "no active stream-3 capture to disable",
        })?;
        // The push-time check is authoritative (spec §9's open question);
        // truncate silently here rather than erroring if memory shrank
        // underneath us (it shouldn't, but the checks aren't symmetric).
        let rom_start = memory.header().rom_start;
        let available = rom_start.saturating_sub(frame.target) as usize;
        let max_data = available.saturating_sub(2);
        let data = &frame.buffer[..frame.buffer.len().min(max_data)];

        memory.set_word(frame.target, data.len() as u16)?;
        for (i, &b) in data.iter().enumerate() {
            memory.set_byte(frame.target + 2 + i as u32, b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::test_support::RecordingCapability;
    use crate::charset::AlwaysCapable;
    use crate::io::test_support::RecordingIo;
    use crate::memory::{FlatMemory, Header};

    fn header(rom_start: u32) -> Header {
        Header {
            rom_start,
            abbrev_table: 0,
            abbrev_count: 96,
            dictionary: 0,
            alphabet_table_override: 0,
            extras_table_override: 0,
            word_separators: 0,
        }
    }

    /// Scenario S4 from spec §8: enable stream 3 at 0x100, print "hi",
    /// disable; memory 0x100..0x103 contains 00 02 'h' 'i'.
    #[test]
    fn scenario_s4_capture_round_trip() {
        let mut router = OutputRouter::new();
        let mut io = RecordingIo::default();
        let mut mem = FlatMemory::new(vec![0u8; 0x200], header(0x180));
        let charset = CharacterSet::default();

        router
            .set_output_stream(3, Some(0x100), &mut io, &mut mem)
            .unwrap();
        router.put_string("hi", &mut io, &charset, &AlwaysCapable);
        router.set_output_stream(-3, None, &mut io, &mut mem).unwrap();

        assert_eq!(mem.as_slice()[0x100..0x104], [0x00, 0x02, b'h', b'i']);
        assert!(io.screen.is_empty(), "captured output must not reach screen");
    }

    #[test]
    fn nested_captures_flush_in_lifo_order() {
        let mut router = OutputRouter::new();
        let mut io = RecordingIo::default();
        let mut mem = FlatMemory::new(vec![0u8; 0x200], header(0x180));
        let charset = CharacterSet::default();

        router
            .set_output_stream(3, Some(0x100), &mut io, &mut mem)
            .unwrap();
        router.put_string("ab", &mut io, &charset, &AlwaysCapable);
        router
            .set_output_stream(3, Some(0x120), &mut io, &mut mem)
            .unwrap();
        router.put_string("cd", &mut io, &charset, &AlwaysCapable);
        router.set_output_stream(-3, None, &mut io, &mut mem).unwrap();
        router.put_string("ef", &mut io, &charset, &AlwaysCapable);
        router.set_output_stream(-3, None, &mut io, &mut mem).unwrap();

        assert_eq!(mem.as_slice()[0x120..0x124], [0x00, 0x02, b'c', b'd']);
        assert_eq!(mem.as_slice()[0x100..0x106], [0x00, 0x04, b'a', b'b', b'e', b'f']);
    }

    #[test]
    fn rejects_over_nesting() {
        let mut router = OutputRouter::new();
        let mut io = RecordingIo::default();
        let mut mem = FlatMemory::new(vec![0u8; 0x10000], header(0xff00));

        for i in 0..MAX_CAPTURE_DEPTH {
            router
                .set_output_stream(3, Some(0x100 + i as u32 * 4), &mut io, &mut mem)
                .unwrap();
        }
        let err = router
            .set_output_stream(3, Some(0x2000), &mut io, &mut mem)
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::StreamControl {
                stream: 3,
                reason: "capture stack would exceed depth 16"
            }
        );
    }

    #[test]
    fn rejects_address_below_minimum() {
        let mut router = OutputRouter::new();
        let mut io = RecordingIo::default();
        let mut mem = FlatMemory::new(vec![0u8; 0x200], header(0x180));
        assert!(router
            .set_output_stream(3, Some(32), &mut io, &mut mem)
            .is_err());
    }

    #[test]
    fn rejects_unknown_stream_number() {
        let mut router = OutputRouter::new();
        let mut io = RecordingIo::default();
        let mut mem = FlatMemory::new(vec![0u8; 0x200], header(0x180));
        assert!(router
            .set_output_stream(5, None, &mut io, &mut mem)
            .is_err());
    }

    #[test]
    fn normal_output_toggle_suppresses_screen() {
        let mut router = OutputRouter::new();
        let mut io = RecordingIo::default();
        let mut mem = FlatMemory::new(vec![0u8; 0x200], header(0x180));
        let charset = CharacterSet::default();

        router.set_output_stream(-1, None, &mut io, &mut mem).unwrap();
        router.put_string("hidden", &mut io, &charset, &AlwaysCapable);
        assert!(io.screen.is_empty());

        router.set_output_stream(1, None, &mut io, &mut mem).unwrap();
        router.put_string("shown", &mut io, &charset, &AlwaysCapable);
        assert_eq!(io.screen, "shown");
    }

    /// §4.1's `CheckUnicode` is advisory: the router queries it per
    /// character but still emits unsupported characters rather than
    /// dropping them.
    #[test]
    fn unicode_capability_is_queried_but_never_filters_output() {
        let mut router = OutputRouter::new();
        let mut io = RecordingIo::default();
        let charset = CharacterSet::default();
        let capability = RecordingCapability {
            unsupported: vec!['€'],
            ..Default::default()
        };

        router.put_string("a€b", &mut io, &charset, &capability);

        assert_eq!(capability.output_queries.borrow().as_slice(), ['a', '€', 'b']);
        assert_eq!(io.screen, "a€b");
    }
}
