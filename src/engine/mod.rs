//! Engine module for the Pomodoro Timer.
//!
//! - `timer`: the countdown state machine and its events
//! - `ticker`: cancellable one-second tick source
//! - `clock`: injected wall-clock sources

pub mod clock;
pub mod ticker;
pub mod timer;

pub use clock::{day_marker, Clock, ManualClock, SystemClock};
pub use ticker::{TickSource, TICK_PERIOD};
pub use timer::{TimerEngine, TimerEvent};
