//! Error types for registration, encoding, decoding, and configuration.
//!
//! Every [`MapperError`] is terminal for the call that produced it and carries
//! the class, subject, field, or predicate needed to present a diagnostic.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = MapperError> = std::result::Result<T, E>;

/// Errors raised by the registry, the encoder, the decoder, and the typed model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapperError {
    /// A class, or a semantic type tag, is already registered differently.
    #[error("class `{class}` is already registered with type tag `{existing}` (requested `{requested}`)")]
    DuplicateRegistration {
        /// Class being registered.
        class: String,
        /// Tag (or owning class) already on record.
        existing: String,
        /// Tag requested by the failing call.
        requested: String,
    },

    /// A second identity field was declared on a class.
    #[error("class `{class}` already has identity field `{existing}`; cannot add `{field}`")]
    MultipleIdentityFields {
        /// Class being registered.
        class: String,
        /// Identity field already on record.
        existing: String,
        /// Rejected field.
        field: String,
    },

    /// A field was re-registered with a different mapping.
    #[error("field `{field}` of class `{class}` is already registered with a different mapping")]
    DuplicateField {
        /// Owning class.
        class: String,
        /// Conflicting field.
        field: String,
    },

    /// The class was never registered.
    #[error("unknown entity class `{class}`")]
    UnknownClass {
        /// Requested class.
        class: String,
    },

    /// The instance has no usable identity value.
    #[error("instance of `{class}` has no identity value in field `{field}`")]
    MissingIdentity {
        /// Class of the instance.
        class: String,
        /// Identity field name (empty when the class declares none).
        field: String,
    },

    /// A subject block carries no type declaration.
    #[error("subject `{subject}` has no rdf:type declaration")]
    MissingSemanticType {
        /// Offending subject.
        subject: String,
    },

    /// No registered class owns the subject's semantic type tag.
    #[error("subject `{subject}` has unknown semantic type `{type_tag}`")]
    UnknownSemanticType {
        /// Offending subject.
        subject: String,
        /// First type tag found on the subject.
        type_tag: String,
    },

    /// Strict decoding met a predicate with no field mapping.
    #[error("predicate `{predicate}` on subject `{subject}` is not mapped by class `{class}`")]
    UnmappedPredicate {
        /// Subject carrying the predicate.
        subject: String,
        /// The unmapped predicate.
        predicate: String,
        /// Class the subject resolved to.
        class: String,
    },

    /// A single-valued field received more than one value.
    #[error("field `{field}` ({predicate}) on subject `{subject}` is single-valued but has {count} values")]
    CardinalityViolation {
        /// Subject owning the field.
        subject: String,
        /// Field name.
        field: String,
        /// Predicate the field maps to.
        predicate: String,
        /// Number of values found.
        count: usize,
    },

    /// Nested entities reference each other in a loop.
    #[error("cyclic reference to `{subject}` (path: {})", .path.join(" -> "))]
    CyclicReference {
        /// Subject that closed the cycle.
        subject: String,
        /// Subjects on the active path when the cycle was detected.
        path: Vec<String>,
    },

    /// Nesting went deeper than the configured bound.
    #[error("nesting depth limit {limit} exceeded at `{subject}`")]
    MaxDepthExceeded {
        /// Subject (or class, when encoding) at which the limit was hit.
        subject: String,
        /// Configured limit.
        limit: usize,
    },

    /// Decoding would build more entities than the configured budget.
    #[error("decoding `{subject}` exceeds the limit of {limit} entities")]
    NodeLimitExceeded {
        /// Subject whose decoding crossed the limit.
        subject: String,
        /// Configured limit.
        limit: usize,
    },

    /// Two different entities share one subject within a document.
    #[error("subject `{subject}` appears more than once with different content")]
    DuplicateIdentity {
        /// Repeated subject.
        subject: String,
    },

    /// A value does not match the field's declared range.
    #[error("field `{field}` on `{subject}` expects {expected}")]
    ObjectMismatch {
        /// Subject (or class, when encoding).
        subject: String,
        /// Field name.
        field: String,
        /// Human-readable description of the expected value.
        expected: &'static str,
    },

    /// Strict decoding met a reference to a subject missing from the document.
    #[error("field `{field}` on `{subject}` references `{target}`, which is not in the document")]
    UnresolvedReference {
        /// Referencing subject.
        subject: String,
        /// Field name.
        field: String,
        /// Missing target subject.
        target: String,
    },

    /// A typed model conversion found a missing or wrongly shaped field.
    #[error("cannot build `{class}`: field `{field}` {reason}")]
    FieldType {
        /// Target class.
        class: String,
        /// Field name.
        field: String,
        /// What went wrong.
        reason: &'static str,
    },
}

/// Errors raised while loading a [`MapperConfig`](crate::config::MapperConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),

    /// The configuration is not valid TOML for the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}
