//! Wire formats for [`Document`](crate::Document)s.
//!
//! - **JSON-LD** ([`jsonld`]): the exchange format, read and written
//! - **Turtle** ([`turtle`]): for RDF tooling, written only
//! - **N-Triples** ([`ntriples`]): one triple per line, written only

pub mod jsonld;
pub mod ntriples;
pub mod turtle;

pub use jsonld::CodecError;
