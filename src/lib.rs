//! sprite-ngin
//!
//! A lightweight, cross-platform 2D game engine scaffold focused on native
//! and WASM compatibility. This crate exposes a small surface for driving a
//! scene through a frame loop and for constructing GPU shader programs from
//! declarative descriptions. The design emphasizes a minimal runtime surface
//! suitable for embedding in native applications or the web.
//!
//! High-level modules
//! - `context`: central GPU and window context that owns device/queue/surface
//! - `game`: the game loop, application handler and `run` entry point
//! - `graphics`: shader compilation, linking, reflection and uniform staging
//! - `render`: the renderer seam and the wgpu frame renderer
//! - `resources`: helpers to load textures and create GPU resources
//! - `scene`: scene/system traits and the drawable node tree
//! - `time`: frame timing
//!

pub mod context;
pub mod game;
pub mod graphics;
pub mod render;
pub mod resources;
pub mod scene;
pub mod time;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
