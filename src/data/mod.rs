pub mod loader;
pub mod renderer;
pub mod sampler;

pub use loader::*;
pub use renderer::*;
pub use sampler::*;
