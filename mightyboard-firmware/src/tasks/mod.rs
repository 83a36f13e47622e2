//! Embassy tasks
//!
//! The tick and stepper tasks run on the high-priority interrupt executor
//! and preempt the slice task on the thread executor.

mod slice;
mod stepper;
mod tick;

pub use slice::slice_task;
pub use stepper::stepper_task;
pub use tick::tick_task;
