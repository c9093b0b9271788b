//! Seekable reader trait
//!
//! Raster sources keep their file handle open for the whole scan and jump
//! between strip offsets, so every reader in the crate is `Read + Seek`.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
