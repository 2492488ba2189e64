pub mod jsonl;
pub mod stats;
pub mod transcript;
pub mod validate;

pub use transcript::*;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
