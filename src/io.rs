//! I/O collaborator contract (spec §6): the host's line/key reads and
//! screen/transcript sinks. The core only ever consumes this trait — it
//! never owns a terminal, a window, or a file (those are the host
//! presentation layer, out of scope per spec.md §1).
//!
//! Grounded on `input_v3.rs::V3Input::read_line` in the teacher crate for
//! the bundled test/demo implementation's shape (a plain blocking stdin
//! read, no raw-mode terminal handling).

/// What stopped a `read_line`/`read_key` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// Normal Enter/Return (CHARCODE 13).
    Enter,
    /// The timed callback cancelled the read (CHARCODE 0).
    TimedOut,
    /// A function key (carries its CHARCODE).
    FunctionKey(u8),
}

impl Terminator {
    pub fn charcode(self) -> u8 {
        match self {
            Terminator::Enter => 13,
            Terminator::TimedOut => 0,
            Terminator::FunctionKey(c) => c,
        }
    }
}

/// The I/O collaborator contract the core consumes (spec §6).
pub trait IoHost {
    fn put_char(&mut self, ch: char);
    fn put_string(&mut self, s: &str) {
        for ch in s.chars() {
            self.put_char(ch);
        }
    }
    fn put_rectangle(&mut self, lines: &[String]);

    fn put_transcript_char(&mut self, ch: char);
    fn put_transcript_string(&mut self, s: &str) {
        for ch in s.chars() {
            self.put_transcript_char(ch);
        }
    }

    fn transcripting(&self) -> bool;
    fn set_transcripting(&mut self, on: bool);

    fn reading_commands_from_file(&self) -> bool;
    fn set_reading_commands_from_file(&mut self, on: bool);
    fn writing_commands_to_file(&self) -> bool;
    fn set_writing_commands_to_file(&mut self, on: bool);

    /// Read a line of host input, honoring a timeout (tenths of a second;
    /// 0 = no timeout) and invoking `timer_cb` at `time/10` second
    /// intervals while waiting (spec §4.7). `timer_cb` returns `true` to
    /// cancel the read. Returns the accumulated text and how the read
    /// ended.
    fn read_line(
        &mut self,
        time_tenths: u16,
        timer_cb: &mut dyn FnMut() -> bool,
    ) -> (String, Terminator);

    /// Read a single key, analogous to `read_line` (spec §4.7).
    fn read_key(&mut self, time_tenths: u16, timer_cb: &mut dyn FnMut() -> bool)
        -> Option<char>;
}

/// A minimal, deterministic `IoHost` used by tests and the bundled demo:
/// screen/transcript output are recorded in memory, and input is drawn
/// from a pre-loaded queue instead of a real terminal (keeping this crate
/// free of the host presentation layer's dependencies, per spec.md §1).
pub mod test_support {
    use super::{IoHost, Terminator};
    use std::collections::VecDeque;

    #[derive(Default)]
    pub struct RecordingIo {
        pub screen: String,
        pub transcript: String,
        transcripting: bool,
        reading_commands: bool,
        writing_commands: bool,
        pub rectangles: Vec<Vec<String>>,
        /// Queued scripted input, consumed in order by `read_line`/`read_key`.
        pub scripted_lines: VecDeque<(String, Terminator)>,
        pub scripted_keys: VecDeque<Option<char>>,
    }

    impl IoHost for RecordingIo {
        fn put_char(&mut self, ch: char) {
            self.screen.push(ch);
        }

        fn put_rectangle(&mut self, lines: &[String]) {
            self.rectangles.push(lines.to_vec());
        }

        fn put_transcript_char(&mut self, ch: char) {
            self.transcript.push(ch);
        }

        fn transcripting(&self) -> bool {
            self.transcripting
        }

        fn set_transcripting(&mut self, on: bool) {
            self.transcripting = on;
        }

        fn reading_commands_from_file(&self) -> bool {
            self.reading_commands
        }

        fn set_reading_commands_from_file(&mut self, on: bool) {
            self.reading_commands = on;
        }

        fn writing_commands_to_file(&self) -> bool {
            self.writing_commands
        }

        fn set_writing_commands_to_file(&mut self, on: bool) {
            self.writing_commands = on;
        }

        fn read_line(
            &mut self,
            _time_tenths: u16,
            timer_cb: &mut dyn FnMut() -> bool,
        ) -> (String, Terminator) {
            if timer_cb() {
                return (String::new(), Terminator::TimedOut);
            }
            self.scripted_lines
                .pop_front()
                .unwrap_or_else(|| (String::new(), Terminator::Enter))
        }

        fn read_key(
            &mut self,
            _time_tenths: u16,
            timer_cb: &mut dyn FnMut() -> bool,
        ) -> Option<char> {
            if timer_cb() {
                return None;
            }
            self.scripted_keys.pop_front().unwrap_or(None)
        }
    }
}
