//! Platform abstraction layer
//!
//! Handles browser/native differences for the 1 Hz session clock. The session
//! owns a `ClockHandle` and cancels it when the game ends or is replaced.

/// A running recurring task that can be stopped
pub trait ClockHandle {
    /// Stop the task. Must be safe to call more than once.
    fn cancel(&mut self);

    fn is_active(&self) -> bool;
}

/// Clock driven by explicit calls (native demo, tests)
#[derive(Debug, Default)]
pub struct ManualClock {
    cancelled: bool,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClockHandle for ManualClock {
    fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn is_active(&self) -> bool {
        !self.cancelled
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::IntervalClock;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    use super::ClockHandle;

    /// `setInterval` wrapper; the interval is cleared on cancel or drop
    pub struct IntervalClock {
        id: Option<i32>,
        // Kept alive for as long as the interval may fire
        _callback: Closure<dyn FnMut()>,
    }

    impl IntervalClock {
        pub fn start(period_ms: i32, callback: Closure<dyn FnMut()>) -> Option<Self> {
            let window = web_sys::window()?;
            let id = window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    period_ms,
                )
                .ok()?;
            Some(Self {
                id: Some(id),
                _callback: callback,
            })
        }
    }

    impl ClockHandle for IntervalClock {
        fn cancel(&mut self) {
            if let Some(id) = self.id.take() {
                if let Some(window) = web_sys::window() {
                    window.clear_interval_with_handle(id);
                }
                log::debug!("Clock interval {} cleared", id);
            }
        }

        fn is_active(&self) -> bool {
            self.id.is_some()
        }
    }

    impl Drop for IntervalClock {
        fn drop(&mut self) {
            self.cancel();
        }
    }
}
