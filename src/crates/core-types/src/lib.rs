pub mod signal;
pub mod storage_type;

pub use signal::*;
pub use storage_type::*;
