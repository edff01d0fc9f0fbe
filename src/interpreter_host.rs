//! Interpreter collaborator contract (spec §6), used only by the Read
//! Pipeline's timed-callback re-entrancy. The core never decodes opcodes
//! or manages call frames itself — that's the out-of-scope dispatcher.
//!
//! Grounded on `timed_input.rs::TimedInput::read_line_with_timer`'s
//! callback shape in the teacher crate (`FnMut() -> Result<bool, String>`),
//! generalized into a trait boundary instead of a closure captured ad hoc
//! per call site.

use crate::error::Result;

/// The interpreter collaborator contract the core consumes (spec §6).
pub trait InterpreterHost {
    /// Push a call frame for `routine_addr` with no arguments and run it
    /// to completion (`jit_loop`), then pop its return value. Returns
    /// whether the timer routine requested cancellation (non-zero return,
    /// spec §4.7/§9).
    fn invoke_timer_routine(&mut self, routine_addr: u32) -> Result<bool>;

    /// Bracket a call out to the I/O collaborator (spec §6).
    fn begin_external_wait(&mut self);
    fn end_external_wait(&mut self);
}

pub mod test_support {
    use super::InterpreterHost;
    use crate::error::Result;

    /// An `InterpreterHost` whose timer routine always reports "keep
    /// waiting" (never cancels), for tests that don't exercise the timed
    /// cancel path.
    #[derive(Default)]
    pub struct NeverCancel {
        pub wait_depth: i32,
    }

    impl InterpreterHost for NeverCancel {
        fn invoke_timer_routine(&mut self, _routine_addr: u32) -> Result<bool> {
            Ok(false)
        }
        fn begin_external_wait(&mut self) {
            self.wait_depth += 1;
        }
        fn end_external_wait(&mut self) {
            self.wait_depth -= 1;
        }
    }

    /// An `InterpreterHost` whose timer routine cancels after a configured
    /// number of invocations, for scenario S6 (timed cancel).
    pub struct CancelAfter {
        pub remaining: u32,
        pub wait_depth: i32,
    }

    impl CancelAfter {
        pub fn new(invocations_before_cancel: u32) -> Self {
            CancelAfter {
                remaining: invocations_before_cancel,
                wait_depth: 0,
            }
        }
    }

    impl InterpreterHost for CancelAfter {
        fn invoke_timer_routine(&mut self, _routine_addr: u32) -> Result<bool> {
            if self.remaining == 0 {
                Ok(true)
            } else {
                self.remaining -= 1;
                Ok(false)
            }
        }
        fn begin_external_wait(&mut self) {
            self.wait_depth += 1;
        }
        fn end_external_wait(&mut self) {
            self.wait_depth -= 1;
        }
    }
}
