//! Playback: the frame clock, the controller state machine and the loop that drives them.
//!
//! Everything here is single-threaded. The [`driver::Driver`] waits for
//! [`controller::PlaybackController::next_deadline`] and feeds the current monotonic time to
//! [`controller::PlaybackController::poll`]; commands are `&mut self` calls interleaved between
//! ticks.

/// Frame index scheduling.
pub mod clock;
/// Playback state machine.
pub mod controller;
/// Real-time and virtual-time tick loops.
pub mod driver;
