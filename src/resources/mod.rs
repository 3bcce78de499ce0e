//! Resource loading helpers.

pub mod texture;

pub use texture::Texture;
