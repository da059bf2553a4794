// Debug layer - transparent wrappers that add validation and bookkeeping
//
// Enabled by `debug.debug_layer` in config.toml. Wrapped resources behave
// exactly like the unwrapped resource through its capability trait.

pub mod texture;

pub use texture::{decorate, DebugTexture, DebugTextureState};
