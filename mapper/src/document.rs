//! The triple-based document exchanged with the wire codecs.
//!
//! A [`Document`] is an ordered list of [`SubjectBlock`]s. Block order carries
//! no meaning; within a block, the order of pairs sharing a predicate is the
//! order of the sequence they encode.

use crate::context::iris::RDF_TYPE;
use crate::context::Context;

/// The object of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Object {
    /// A literal in its lexical string form.
    Literal(String),
    /// A reference to another resource.
    Iri(String),
}

impl Object {
    /// The literal text or IRI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Object::Literal(s) | Object::Iri(s) => s,
        }
    }
}

/// A borrowed `(subject, predicate, object)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triple<'a> {
    /// Subject IRI.
    pub subject: &'a str,
    /// Predicate IRI or CURIE.
    pub predicate: &'a str,
    /// Object.
    pub object: &'a Object,
}

/// All `(predicate, object)` pairs of one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectBlock {
    /// Subject IRI.
    pub subject: String,
    /// Pairs in insertion order.
    pub pairs: Vec<(String, Object)>,
}

impl SubjectBlock {
    /// Creates a block with no pairs.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            pairs: Vec::new(),
        }
    }

    /// Appends one pair.
    pub fn push(&mut self, predicate: impl Into<String>, object: Object) {
        self.pairs.push((predicate.into(), object));
    }

    /// Appends an `rdf:type` pair.
    pub fn push_type(&mut self, type_tag: impl Into<String>) {
        self.push(RDF_TYPE, Object::Iri(type_tag.into()));
    }

    /// Iterates the type tags declared on this subject. Predicates are
    /// expanded through `context`, so `rdf:type` counts as well.
    pub fn types<'a>(&'a self, context: &'a Context) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(p, _)| context.expand(p) == RDF_TYPE)
            .map(|(_, o)| o.as_str())
    }

    /// Iterates the block as triples.
    pub fn triples(&self) -> impl Iterator<Item = Triple<'_>> {
        self.pairs.iter().map(move |(predicate, object)| Triple {
            subject: &self.subject,
            predicate,
            object,
        })
    }
}

/// A set of subject blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Blocks in insertion order.
    pub blocks: Vec<SubjectBlock>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block.
    pub fn push(&mut self, block: SubjectBlock) {
        self.blocks.push(block);
    }

    /// Returns the first block for `subject`.
    #[must_use]
    pub fn block(&self, subject: &str) -> Option<&SubjectBlock> {
        self.blocks.iter().find(|b| b.subject == subject)
    }

    /// Iterates every triple of every block.
    pub fn triples(&self) -> impl Iterator<Item = Triple<'_>> {
        self.blocks.iter().flat_map(SubjectBlock::triples)
    }

    /// Total number of triples.
    #[must_use]
    pub fn triple_count(&self) -> usize {
        self.blocks.iter().map(|b| b.pairs.len()).sum()
    }

    /// Returns `true` if the document has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
