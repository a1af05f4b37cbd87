//! Sequential frame scheduling, progress reporting and the background driver.

pub(crate) mod progress;
pub(crate) mod scheduler;
pub(crate) mod worker;
