//! Command implementations.

pub mod decode;
pub mod extract;
pub mod inspect;

pub use decode::run_decode;
pub use extract::run_extract;
pub use inspect::run_inspect;
