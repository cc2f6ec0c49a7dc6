//! Common utilities for the BYAML codec.
//!
//! This crate provides the low-level pieces the codec is built on:
//!
//! - [`BinaryReader`] - Bounds-checked, endian-aware reading from byte slices
//! - [`BinaryWriter`] - Growable, endian-aware output buffer with back-patching
//! - [`Endian`] - Runtime byte order selection
//! - [`codepage`] - The legacy single-byte code page used for pooled strings

mod endian;
mod error;
mod reader;
mod writer;

pub mod codepage;

pub use endian::Endian;
pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;
