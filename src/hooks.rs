//! Step-by-step driving with caller-supplied hooks.
//!
//! The before-step hook sees the interpreter ahead of every step and may
//! break out of the loop; [`StepControl`] packages the two stock reasons for
//! doing so, a step budget and a cancellation flag.

use std::io::{Read, Seek, Write};
use std::ops::ControlFlow;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::BfError;
use crate::interpreter::{Interpreter, Step};

/// Why [`Interpreter::run_with_hooks`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome<B = ()> {
    /// The source was exhausted.
    Halted,
    /// The before-step hook broke out with this value.
    Stopped(B),
}

/// Reason a [`StepControl`] stopped a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    StepLimit(u64),
    Cancelled,
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Debug, Clone, Default)]
pub struct StepControl {
    pub max_steps: Option<u64>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<u64>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }

    /// Decide whether an interpreter that has executed `executed` steps may
    /// take another one.
    pub fn check(&self, executed: u64) -> ControlFlow<StopReason> {
        if self.cancel_flag.load(Ordering::Relaxed) {
            return ControlFlow::Break(StopReason::Cancelled);
        }
        match self.max_steps {
            Some(max) if executed >= max => ControlFlow::Break(StopReason::StepLimit(max)),
            _ => ControlFlow::Continue(()),
        }
    }
}

impl<R, I, O> Interpreter<R, I, O>
where
    R: Read + Seek,
    I: Read,
    O: Write,
{
    /// Run, consulting `before_step` ahead of every step.
    ///
    /// A `Break` from the hook ends the run before that step executes.
    /// `on_halt` runs only when the source is exhausted.
    pub fn run_with_hooks<B, F, H>(&mut self, mut before_step: F, on_halt: H) -> Result<RunOutcome<B>, BfError>
    where
        F: FnMut(&mut Self) -> ControlFlow<B>,
        H: FnOnce(&mut Self),
    {
        loop {
            if let ControlFlow::Break(value) = before_step(self) {
                self.flush()?;
                return Ok(RunOutcome::Stopped(value));
            }
            if self.step()? == Step::Halted {
                self.flush()?;
                on_halt(self);
                return Ok(RunOutcome::Halted);
            }
        }
    }

    /// [`run_with_hooks`](Self::run_with_hooks) without a halt hook.
    pub fn run_with_hook<B, F>(&mut self, before_step: F) -> Result<RunOutcome<B>, BfError>
    where
        F: FnMut(&mut Self) -> ControlFlow<B>,
    {
        self.run_with_hooks(before_step, |_| {})
    }

    /// Execute with cooperative cancellation and an optional step limit.
    pub fn run_with_control(&mut self, control: &StepControl) -> Result<RunOutcome<StopReason>, BfError> {
        self.run_with_hook(|bf| control.check(bf.executed()))
    }
}
