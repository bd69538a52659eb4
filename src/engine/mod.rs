pub mod calendar;
pub mod clock;
pub mod lifecycle;
pub mod recurrence;
pub mod scheduler;

pub use clock::{Clock, FixedClock, SystemClock};
pub use lifecycle::TaskManager;
pub use scheduler::{evaluate, Evaluation, Scheduler, SchedulerOptions};
