pub mod correlation;
pub mod fft;
pub mod profile;
pub mod sector;

pub use correlation::*;
pub use fft::*;
pub use profile::*;
pub use sector::*;
