pub mod headless;
pub mod registry;
pub mod scheduler;
pub mod surface;
pub mod synchronizer;
pub mod tree;

pub use registry::PreviewRegistry;
