// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! The per-frame schedule that drives the visualizer.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// Interval used while there is nothing to animate.
pub(crate) const IDLE_INTERVAL: Duration = Duration::from_millis(250);

/// A cancellable timer thread calling `tick` once per frame.
///
/// The ticker keeps running at [`IDLE_INTERVAL`] while idle rather than
/// stopping, so animation resumes as soon as audio appears. It stops when
/// [`stop`](Self::stop) is called, when it is dropped, or when `tick` returns
/// `false`.
pub(crate) struct FrameTicker {
    cancel: Arc<AtomicBool>,
    idle: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FrameTicker {
    pub(crate) fn start<F>(fps: u32, mut tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let frame = Duration::from_secs_f64(1.0 / f64::from(fps.clamp(1, 240)));
        let cancel = Arc::new(AtomicBool::new(false));
        let idle = Arc::new(AtomicBool::new(false));

        let handle = {
            let cancel = Arc::clone(&cancel);
            let idle = Arc::clone(&idle);

            thread::spawn(move || {
                let mut next = Instant::now();

                loop {
                    next += if idle.load(Ordering::Relaxed) { IDLE_INTERVAL } else { frame };

                    // Woken early by `stop`, or spuriously.
                    loop {
                        if cancel.load(Ordering::Acquire) {
                            return;
                        }
                        let now = Instant::now();
                        if now >= next {
                            break;
                        }
                        thread::park_timeout(next - now);
                    }

                    if !tick() {
                        return;
                    }

                    // Don't try to catch up after a stall.
                    let now = Instant::now();
                    if next < now {
                        next = now;
                    }
                }
            })
        };

        Self {
            cancel,
            idle,
            handle: Some(handle),
        }
    }

    /// Switches between the frame rate and the idle interval.
    pub(crate) fn set_idle(&self, idle: bool) {
        let was_idle = self.idle.swap(idle, Ordering::Relaxed);
        if was_idle && !idle {
            if let Some(handle) = &self.handle {
                handle.thread().unpark();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancels the schedule and waits for the timer thread to exit.
    pub(crate) fn stop(&mut self) {
        self.cancel.store(true, Ordering::Release);

        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                tracing::warn!("frame ticker panicked");
            }
        }
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
