// Gateway module for layers - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod registry;
mod source;

// Public re-exports - the ONLY way to access layers functionality
pub use registry::{LayerRegistry, DEFAULT_LAYER};
pub use source::TileSource;
