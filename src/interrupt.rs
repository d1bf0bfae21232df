// src/interrupt.rs
//! Observing interrupts (Ctrl-C) between lines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The exit status used when a run is stopped by an interrupt.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// A flag that is raised when the process is interrupted.
///
/// Conversion checks the flag before each line and marks each row it writes with
/// [`begin_write`](Self::begin_write), so an interrupt never leaves a partial row behind.
#[derive(Clone, Debug, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
    writing: Arc<AtomicBool>,
}

/// Marks a row as being written until it is dropped.
///
/// Returned by [`Interrupt::begin_write`].
#[derive(Debug)]
pub struct WriteGuard<'interrupt> {
    writing: &'interrupt AtomicBool,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.writing.store(false, Ordering::SeqCst);
    }
}

impl Interrupt {
    /// Construct a flag that is not connected to any signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a flag that is raised by `SIGINT`.
    ///
    /// Every row is flushed as soon as it's written, so if no row is being written the process
    /// exits immediately with [`INTERRUPTED_EXIT_CODE`]. This includes a run blocked on reading
    /// its input. Otherwise the flag is raised and the run stops once the current row is written.
    ///
    /// # Errors
    ///
    /// Propagates any error from installing the signal handler, which can only be done once per
    /// process.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let interrupt = Self::new();
        let raised = Arc::clone(&interrupt.raised);
        let writing = Arc::clone(&interrupt.writing);

        ctrlc::set_handler(move || {
            // `raised` must be set before `writing` is read.
            raised.store(true, Ordering::SeqCst);
            if !writing.load(Ordering::SeqCst) {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        })?;

        Ok(interrupt)
    }

    /// Raise the flag.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Whether the flag has been raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Mark a row as being written until the returned guard is dropped.
    ///
    /// An interrupt that arrives while the guard is alive waits for the row to finish.
    #[must_use]
    pub fn begin_write(&self) -> WriteGuard<'_> {
        self.writing.store(true, Ordering::SeqCst);
        WriteGuard {
            writing: &self.writing,
        }
    }

    /// Whether a row is currently being written.
    #[must_use]
    pub fn is_writing(&self) -> bool {
        self.writing.load(Ordering::SeqCst)
    }
}
