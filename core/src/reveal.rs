//! Reveal Scheduler
//!
//! Progressive, per-character disclosure of an answer that is already fully
//! known. The cursor arithmetic lives in [`Reveal`], a plain state machine;
//! [`RevealScheduler`] drives one from a tokio task, waiting a fixed interval
//! between characters.
//!
//! # Timeline
//!
//! ```text
//! t = 0        tick "h"
//! t = 15ms     tick "hi"
//! t = 30ms     done "hi"
//! ```
//!
//! An empty answer completes immediately, inside [`RevealScheduler::reveal`],
//! without ticking.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

/// Default delay between two revealed characters
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(15);

/// Result of advancing a reveal by one step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealStep<'a> {
    /// One more character is visible; carries everything revealed so far
    Tick(&'a str),
    /// Every character is visible; carries the full text
    Done(&'a str),
}

/// Cursor over an answer, one `char` at a time
///
/// The cursor counts characters, not bytes, so a partial never ends in the
/// middle of a multi-byte character.
#[derive(Clone, Debug)]
pub struct Reveal {
    /// Text being revealed
    full: String,
    /// Byte offset of the end of the revealed prefix
    byte_cursor: usize,
    /// Characters revealed so far
    cursor: usize,
    /// Total characters
    len: usize,
    /// Whether `Done` has been produced
    finished: bool,
}

impl Reveal {
    /// Start a reveal at cursor 0
    pub fn new(full: impl Into<String>) -> Self {
        let full = full.into();
        let len = full.chars().count();
        Self {
            full,
            byte_cursor: 0,
            cursor: 0,
            len,
            finished: false,
        }
    }

    /// Advance by one character, or finish
    ///
    /// Yields exactly `len()` ticks followed by one `Done`, then `None`
    /// forever.
    pub fn advance(&mut self) -> Option<RevealStep<'_>> {
        if self.finished {
            return None;
        }

        match self.full[self.byte_cursor..].chars().next() {
            Some(c) => {
                self.byte_cursor += c.len_utf8();
                self.cursor += 1;
                Some(RevealStep::Tick(&self.full[..self.byte_cursor]))
            }
            None => {
                self.finished = true;
                Some(RevealStep::Done(&self.full))
            }
        }
    }

    /// Characters revealed so far
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total characters
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the text is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Revealed prefix
    pub fn partial(&self) -> &str {
        &self.full[..self.byte_cursor]
    }

    /// Whether `Done` has been produced
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[derive(Debug, Default)]
struct RevealFlags {
    cancelled: bool,
    finished: bool,
}

/// Stops a running reveal
///
/// Dropping the handle does not cancel; the reveal runs to completion.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    flags: Arc<Mutex<RevealFlags>>,
    abort: Option<AbortHandle>,
}

impl CancelHandle {
    fn finished() -> Self {
        Self {
            flags: Arc::new(Mutex::new(RevealFlags {
                cancelled: false,
                finished: true,
            })),
            abort: None,
        }
    }

    /// Cancel the reveal
    ///
    /// Once this returns no callback is running and none will run again.
    /// Returns `false` if the reveal had already completed or been cancelled.
    /// Must not be called from inside the reveal's own callbacks.
    pub fn cancel(&self) -> bool {
        let mut flags = self.flags.lock();
        if flags.finished || flags.cancelled {
            return false;
        }
        flags.cancelled = true;
        drop(flags);

        if let Some(ref abort) = self.abort {
            abort.abort();
        }
        true
    }

    /// Whether `on_done` has been called
    pub fn is_finished(&self) -> bool {
        self.flags.lock().finished
    }

    /// Whether the reveal was cancelled before completing
    pub fn is_cancelled(&self) -> bool {
        self.flags.lock().cancelled
    }
}

/// Drives reveals on the tokio runtime
#[derive(Clone, Debug)]
pub struct RevealScheduler {
    interval: Duration,
}

impl RevealScheduler {
    /// Create a scheduler; a zero interval is clamped to 1ms
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Delay between two characters
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Reveal `full_text` one character per interval
    ///
    /// `on_tick` receives the revealed prefix after each character;
    /// `on_done` receives the full text once, after the last tick. An empty
    /// text calls `on_done("")` before returning. Otherwise the work runs on
    /// a spawned task, so this must be called within a tokio runtime.
    pub fn reveal<T, D>(&self, full_text: impl Into<String>, mut on_tick: T, on_done: D) -> CancelHandle
    where
        T: FnMut(&str) + Send + 'static,
        D: FnOnce(String) + Send + 'static,
    {
        let mut reveal = Reveal::new(full_text);

        if reveal.is_empty() {
            on_done(String::new());
            return CancelHandle::finished();
        }

        let flags = Arc::new(Mutex::new(RevealFlags::default()));
        let task_flags = flags.clone();
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut on_done = Some(on_done);

            loop {
                ticker.tick().await;

                // Callbacks run under the lock so `cancel` can wait them out
                let mut flags = task_flags.lock();
                if flags.cancelled {
                    return;
                }

                match reveal.advance() {
                    Some(RevealStep::Tick(partial)) => on_tick(partial),
                    Some(RevealStep::Done(full)) => {
                        if let Some(done) = on_done.take() {
                            done(full.to_string());
                        }
                        flags.finished = true;
                        return;
                    }
                    None => return,
                }
            }
        });

        CancelHandle {
            flags,
            abort: Some(task.abort_handle()),
        }
    }
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_INTERVAL)
    }
}
