//! Declarative mapping between StreamPipes entities and RDF triples.
//!
//! Entity classes declare once, in a [`Registry`], which semantic type tag
//! they carry and which predicate each field maps to. The [`Encoder`] turns
//! [`EntityInstance`]s into a triple [`Document`]; the [`Decoder`] turns a
//! document back into instances. The typed StreamPipes model in [`model`]
//! sits on top of the untyped instances, and [`serializer`] moves documents
//! to and from JSON-LD, Turtle, and N-Triples.
//!
//! # Entry Point
//!
//! ```
//! use sp_mapper::{Context, Decoder, Encoder, EntityInstance, MapperConfig, Registry};
//!
//! let mut registry = Registry::new(Context::streampipes());
//! registry
//!     .define("Temperature", "sp:Temperature")?
//!     .identity("id")?
//!     .literal("label", "rdfs:label")?;
//!
//! let config = MapperConfig::default();
//! let reading = EntityInstance::new("Temperature")
//!     .with("id", "urn:x:1")
//!     .with("label", "Temperature");
//!
//! let doc = Encoder::new(&registry, &config).encode(&reading)?;
//! assert_eq!(doc.triple_count(), 2);
//!
//! let decoded = Decoder::new(&registry, &config).decode(&doc)?;
//! assert_eq!(decoded, vec![reading]);
//! # Ok::<(), sp_mapper::MapperError>(())
//! ```
//!
//! # Built-in model
//!
//! ```
//! use sp_mapper::model::{AddNestedRule, Entity};
//! use sp_mapper::{Encoder, MapperConfig, Registry};
//!
//! let registry = Registry::global()?;
//! let rule = AddNestedRule::new("position");
//! let doc = Encoder::new(registry, &MapperConfig::default()).encode(&rule.to_instance())?;
//! # #[cfg(feature = "serializers")]
//! let json_ld = sp_mapper::serializer::jsonld::to_json_ld(&doc, registry.context());
//! # Ok::<(), sp_mapper::MapperError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod context;
pub mod decoder;
pub mod document;
pub mod encoder;
pub mod error;
pub mod instance;
pub mod model;
pub mod registry;
#[cfg(feature = "serializers")]
pub mod serializer;

pub use config::MapperConfig;
pub use context::Context;
pub use decoder::Decoder;
pub use document::{Document, Object, SubjectBlock, Triple};
pub use encoder::Encoder;
pub use error::{ConfigError, MapperError, Result};
pub use instance::{EntityInstance, FieldValue};
pub use registry::{
    ClassBuilder, ClassDescriptor, FieldDescriptor, MappingKind, Multiplicity, Range, Registry,
};
