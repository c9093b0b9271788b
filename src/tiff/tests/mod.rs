//! Unit tests for the TIFF container layer

mod test_utils;
mod types_tests;
mod reader_tests;
