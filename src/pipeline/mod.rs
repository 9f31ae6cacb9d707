pub mod aligner;
pub mod sweep;
pub mod types;

pub use aligner::*;
pub use sweep::*;
pub use types::*;
