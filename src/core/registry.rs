//! Schema registry: where each container type keeps its embedded content.
//!
//! Every supported container machine name maps to an ordered list of
//! [`ExtractionRule`]s. A rule's path resolves to the objects ("holders")
//! that carry a `library` string and a `params` value.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::path::{FieldPath, PathError};
use crate::domain::LibrarySignature;

/// Container type used by the node filter
pub const COLUMN: &str = "H5P.Column";

/// Standard container rules, in dispatch order
const STANDARD_RULES: &[(&str, &[&str])] = &[
    (COLUMN, &["content.*.content"]),
    (
        "H5P.CoursePresentation",
        &["presentation.slides.*.elements.*.action"],
    ),
    ("H5P.DragQuestion", &["question.task.elements.*.type"]),
    ("H5P.QuestionSet", &["questions.*"]),
    ("H5P.Accordion", &["panels.*.content"]),
    ("H5P.ImageHotspots", &["hotspots.*.content.*"]),
    ("H5P.DocumentationTool", &["pagesList.*"]),
    ("H5P.Agamotto", &["items.*.image"]),
    (
        "H5P.InteractiveVideo",
        &[
            "interactiveVideo.assets.interactions.*.action",
            "interactiveVideo.summary.task",
        ],
    ),
    ("H5P.Questionnaire", &["questionnaireElements.*.library"]),
    ("H5P.StandardPage", &["elementList.*"]),
];

/// One location of embedded `{library, params}` pairs inside a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRule {
    /// Container machine name this rule belongs to
    pub container: String,
    /// Path to the pair holders
    pub path: FieldPath,
}

/// A `{library, params}` pair found inside a container
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPair<'a> {
    pub signature: LibrarySignature,
    pub params: &'a Value,
}

impl ExtractionRule {
    pub fn new(container: impl Into<String>, path: &str) -> Result<Self, PathError> {
        Ok(Self {
            container: container.into(),
            path: FieldPath::parse(path)?,
        })
    }

    /// Pairs reachable through this rule, in document order.
    ///
    /// Holders without a non-empty `library` string or without `params` are
    /// not embedded instances and are left out.
    pub fn pairs<'a>(&self, node: &'a Value) -> Vec<ExtractedPair<'a>> {
        self.path
            .resolve(node)
            .into_iter()
            .filter_map(|holder| {
                let pair = read_pair(holder);
                if pair.is_none() {
                    tracing::trace!(container = %self.container, path = %self.path, "Skipping element without library/params");
                }
                pair
            })
            .collect()
    }
}

fn read_pair(holder: &Value) -> Option<ExtractedPair<'_>> {
    let library = holder.get("library")?.as_str()?;
    if library.is_empty() {
        return None;
    }
    let params = holder.get("params")?;

    Some(ExtractedPair {
        signature: LibrarySignature::new(library),
        params,
    })
}

/// Mapping from container machine name to its extraction rules
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    rules: BTreeMap<String, Vec<ExtractionRule>>,
    /// Machine names known to embed further content
    embedding: BTreeSet<String>,
}

impl SchemaRegistry {
    /// Create an empty registry (nothing flagged, nothing registered)
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry covering the supported H5P container types
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for (container, paths) in STANDARD_RULES {
            for path in *paths {
                // Static table, covered by tests
                if let Ok(rule) = ExtractionRule::new(*container, path) {
                    registry.add_rule(rule);
                }
            }
        }
        registry
    }

    /// Register rule paths for a container, flagging it as embedding
    pub fn register<S: AsRef<str>>(&mut self, container: &str, paths: &[S]) -> Result<(), PathError> {
        for path in paths {
            self.add_rule(ExtractionRule::new(container, path.as_ref())?);
        }
        Ok(())
    }

    /// Builder form of [`SchemaRegistry::register`]
    pub fn with_rules<S: AsRef<str>>(mut self, container: &str, paths: &[S]) -> Result<Self, PathError> {
        self.register(container, paths)?;
        Ok(self)
    }

    /// Flag a container as embedding content without registering rules
    pub fn flag(&mut self, container: impl Into<String>) {
        self.embedding.insert(container.into());
    }

    fn add_rule(&mut self, rule: ExtractionRule) {
        self.embedding.insert(rule.container.clone());
        self.rules.entry(rule.container.clone()).or_default().push(rule);
    }

    /// Rules for a machine name, `None` for leaf types
    pub fn rules_for(&self, machine_name: &str) -> Option<&[ExtractionRule]> {
        self.rules.get(machine_name).map(Vec::as_slice)
    }

    /// Whether a machine name is known to embed further content
    pub fn is_embedding(&self, machine_name: &str) -> bool {
        self.embedding.contains(machine_name)
    }

    /// Flagged container types that have no rules
    pub fn gaps(&self) -> Vec<&str> {
        self.embedding
            .iter()
            .filter(|name| !self.rules.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Registered containers and their rules, sorted by machine name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ExtractionRule])> {
        self.rules.iter().map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
