//! I/O utilities for file handling
//!
//! This module provides the reader trait and byte order strategies shared by
//! the TIFF parser and the raster decoders.

pub mod seekable;
pub mod byte_order;
