// Infrastructure module - Background timers
pub mod timer;

pub use timer::RetryTimer;
