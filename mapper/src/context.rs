//! Prefix context: expansion and compaction of CURIEs such as `sp:mapsTo`.
//!
//! Entity classes register predicates in whichever form is convenient (a CURIE
//! or an absolute IRI). All comparisons go through [`Context::expand`], so both
//! spellings of a predicate name the same field.

use std::collections::BTreeMap;

/// Standard IRI constants.
pub mod iris {
    /// RDF namespace.
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// RDFS namespace.
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// XSD namespace.
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    /// StreamPipes vocabulary.
    pub const SP: &str = "https://streampipes.org/vocabulary/v1/";
    /// StreamPipes instance namespace.
    pub const SPI: &str = "urn:streampipes.org:spi:";
    /// Dublin Core terms.
    pub const DC: &str = "http://purl.org/dc/terms/";
    /// Semantic Sensor Network ontology.
    pub const SSN: &str = "http://purl.oclc.org/NET/ssnx/ssn#";
    /// schema.org.
    pub const SO: &str = "http://schema.org/";
    /// Empire persistence namespace used by the backend.
    pub const EMPIRE: &str = "urn:clarkparsia.com:empire:";

    /// `rdf:type`.
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `xsd:string`.
    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

/// A prefix → namespace map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    prefixes: BTreeMap<String, String>,
}

impl Context {
    /// An empty context; every term is taken literally.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            prefixes: BTreeMap::new(),
        }
    }

    /// The prefixes of the StreamPipes JSON-LD context.
    #[must_use]
    pub fn streampipes() -> Self {
        let mut ctx = Self::empty();
        for (prefix, ns) in [
            ("rdf", iris::RDF),
            ("rdfs", iris::RDFS),
            ("xsd", iris::XSD),
            ("sp", iris::SP),
            ("spi", iris::SPI),
            ("dc", iris::DC),
            ("ssn", iris::SSN),
            ("so", iris::SO),
            ("empire", iris::EMPIRE),
        ] {
            ctx.insert(prefix, ns);
        }
        ctx
    }

    /// Adds or replaces one prefix.
    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Copies every prefix of `other` into `self`, overriding duplicates.
    pub fn merge(&mut self, other: &Context) {
        for (prefix, ns) in &other.prefixes {
            self.prefixes.insert(prefix.clone(), ns.clone());
        }
    }

    /// Iterates `(prefix, namespace)` pairs in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, n)| (p.as_str(), n.as_str()))
    }

    /// Returns the namespace bound to `prefix`.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Expands `prefix:local` into an absolute IRI. Terms whose prefix is not
    /// bound (including `http:` and `urn:` IRIs) are returned unchanged.
    #[must_use]
    pub fn expand(&self, term: &str) -> String {
        if let Some((prefix, local)) = term.split_once(':') {
            if !local.starts_with("//") {
                if let Some(ns) = self.prefixes.get(prefix) {
                    return format!("{ns}{local}");
                }
            }
        }
        term.to_owned()
    }

    /// Compacts an absolute IRI to `prefix:local` using the longest matching
    /// namespace. IRIs with no matching namespace are returned unchanged.
    #[must_use]
    pub fn compact(&self, iri: &str) -> String {
        let best = self
            .prefixes
            .iter()
            .filter(|(_, ns)| iri.len() > ns.len() && iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len());
        match best {
            Some((prefix, ns)) => format!("{prefix}:{}", &iri[ns.len()..]),
            None => iri.to_owned(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::streampipes()
    }
}
