pub mod clock;
pub mod errors;

pub use clock::{Clock, ManualClock, SystemClock, ONE_DAY_MILLISECONDS};
pub use errors::{StashError, StashResult};
