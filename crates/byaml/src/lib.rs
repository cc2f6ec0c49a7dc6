//! BYAML binary tree format codec with an XML representation.
//!
//! BYAML is a compact binary tree format used by game assets. Values are
//! arrays, objects and scalars; object keys and strings live in deduplicated
//! tables, and "path" values point into a table of packed point records.
//! This crate decodes BYAML files, converts them losslessly to and from XML,
//! and writes them back to binary.
//!
//! # Example
//!
//! ```no_run
//! use byaml::Byaml;
//!
//! let data = std::fs::read("course.byaml")?;
//!
//! if Byaml::is_byaml(&data) {
//!     let byaml = Byaml::parse(&data)?;
//!     let xml = byaml.to_xml_string()?;
//!
//!     let rebuilt = Byaml::from_xml_str(&xml)?;
//!     std::fs::write("course.rebuilt.byaml", rebuilt.to_bytes()?)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod error;
mod header;
mod node;
mod parser;
mod pool;
mod value;

pub mod dom;
pub mod from_xml;
pub mod path;
pub mod to_xml;

pub use byaml_common::Endian;
pub use dom::{XmlChild, XmlElement};
pub use error::{Error, PoolKind, Result};
pub use from_xml::{infer_scalar, XmlReifier};
pub use header::ByamlHeader;
pub use node::{Node, NodeType};
pub use parser::{decode_node, decode_path_table, decode_string_table, Byaml};
pub use path::PathPoint;
pub use pool::{BlobPool, Pool, StringPool};
pub use to_xml::XmlProjector;
pub use value::Value;
