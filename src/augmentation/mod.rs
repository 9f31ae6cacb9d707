pub mod noise;

pub use noise::*;
