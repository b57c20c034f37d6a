//! XML tree reading and writing for feed-shaped documents.
//!
//! Element and attribute names are kept exactly as written (including any
//! `prefix:`), and attribute order survives a parse/write round trip. Lookups
//! can match on the local part of a name so callers need not care which prefix
//! a producer bound a namespace to.

pub mod parser;
pub mod tree;
pub mod writer;

pub use parser::{parse, ParseError};
pub use tree::{local_name, XmlNode};
pub use writer::{write, write_to, WriteError, WriteOptions};
