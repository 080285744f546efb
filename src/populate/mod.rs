//! Schema-driven document synthesis
//!
//! [`DomPopulator`] walks a [`SchemaModel`] and builds an [`Element`] tree
//! whose every element and attribute is declared by the schema, filled with
//! plausible generated values. Output is a pure function of the schema, the
//! seed, the mode and the overrides.
//!
//! ```
//! use efti_datatools::populate::{populate, PopulateMode};
//! use efti_datatools::schema::{ElementDefinition, SchemaDefinition, SchemaModel, TypeDefinition};
//!
//! let root = ElementDefinition::new("consignment")
//!     .child(ElementDefinition::new("grossWeight").with_type(TypeDefinition::text("decimal")));
//! let schema = SchemaModel::new(&SchemaDefinition::new(root)).unwrap();
//!
//! let doc = populate(&schema, &[], 1234, PopulateMode::MinimumOne).unwrap();
//! let root = doc.root.as_ref().unwrap();
//! assert_eq!(root.children.len(), 1);
//! ```

mod generators;
mod overrides;
mod value_path;

pub use generators::{
    find_generator, generate_value, ValueGenerator, ValueGeneratorFactory, ValueKind,
    ValueMatcher, GENERATORS,
};
pub use overrides::TextContentOverride;
pub use value_path::ValuePath;

use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::schema::{SchemaModel, SchemaNode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// How many instances of each element are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PopulateMode {
    /// Uniform in `[min, min(max, max(min, 1) + 2)]`
    #[default]
    Random,
    /// Exactly `max(1, min)`, so optional elements are always present
    MinimumOne,
    /// Exactly one
    ExactlyOne,
}

impl PopulateMode {
    /// All modes
    pub const ALL: [PopulateMode; 3] = [
        PopulateMode::Random,
        PopulateMode::MinimumOne,
        PopulateMode::ExactlyOne,
    ];

    /// Command line name
    pub fn as_str(&self) -> &'static str {
        match self {
            PopulateMode::Random => "random",
            PopulateMode::MinimumOne => "minimum-one",
            PopulateMode::ExactlyOne => "exactly-one",
        }
    }
}

impl fmt::Display for PopulateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PopulateMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        PopulateMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| {
                Error::Override(format!(
                    "Unknown repeatable mode '{}', expected random, minimum-one or exactly-one",
                    s
                ))
            })
    }
}

/// Seeded document populator
#[derive(Debug, Clone)]
pub struct DomPopulator {
    seed: u64,
    mode: PopulateMode,
    limits: Limits,
}

impl DomPopulator {
    /// Create a populator with default limits
    pub fn new(seed: u64, mode: PopulateMode) -> Self {
        Self {
            seed,
            mode,
            limits: Limits::default(),
        }
    }

    /// Set the depth and node limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Seed in use
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Mode in use
    pub fn mode(&self) -> PopulateMode {
        self.mode
    }

    /// Build a document for `schema`, applying `overrides` in order
    ///
    /// Every override path must resolve against the schema, otherwise the
    /// call fails with [`Error::NotInSchema`] before anything is generated.
    pub fn populate(
        &self,
        schema: &SchemaModel,
        overrides: &[TextContentOverride],
    ) -> Result<Document> {
        for text_override in overrides {
            text_override.resolve(schema)?;
        }

        let mut run = PopulateRun {
            schema,
            overrides,
            factory: ValueGeneratorFactory::new(self.seed),
            mode: self.mode,
            limits: &self.limits,
            node_count: 0,
            matched: vec![false; overrides.len()],
        };

        let root = schema.root();
        let cursors: Vec<Cursor> = (0..overrides.len())
            .map(|index| Cursor { index, step: 0 })
            .collect();
        let root_path = ValuePath::new().append_name(&root.name().local_name);
        let element = run.instance(root, &root_path, None, 0, &cursors, 1)?;

        for (text_override, matched) in overrides.iter().zip(&run.matched) {
            if !matched {
                warn!(path = %text_override.path, "override matched no generated node");
            }
        }
        debug!(
            seed = self.seed,
            mode = %self.mode,
            nodes = run.node_count,
            "populated document"
        );
        Ok(Document::with_root(element))
    }
}

/// Populate `schema` with a fresh [`DomPopulator`]
pub fn populate(
    schema: &SchemaModel,
    overrides: &[TextContentOverride],
    seed: u64,
    mode: PopulateMode,
) -> Result<Document> {
    DomPopulator::new(seed, mode).populate(schema, overrides)
}

/// Progress of one override along its element steps
#[derive(Debug, Clone, Copy)]
struct Cursor {
    index: usize,
    step: usize,
}

struct PopulateRun<'a> {
    schema: &'a SchemaModel,
    overrides: &'a [TextContentOverride],
    factory: ValueGeneratorFactory,
    mode: PopulateMode,
    limits: &'a Limits,
    node_count: usize,
    matched: Vec<bool>,
}

impl<'a> PopulateRun<'a> {
    fn count_node(&mut self) -> Result<()> {
        self.node_count += 1;
        self.limits.check_nodes(self.node_count)
    }

    fn cursor_completes(&self, cursor: &Cursor) -> bool {
        cursor.step + 1 == self.overrides[cursor.index].path.element_steps().len()
    }

    /// Number of instances of `node` under one parent instance
    fn instance_count(&self, node: &SchemaNode, count_path: &ValuePath) -> u32 {
        let occurs = node.occurs();
        match self.mode {
            PopulateMode::ExactlyOne => occurs.capped(1),
            PopulateMode::MinimumOne => occurs.at_least_one(),
            PopulateMode::Random => {
                let range = occurs.random_range();
                self.factory
                    .for_path(count_path)
                    .next_u32_inclusive(*range.start(), *range.end())
            }
        }
    }

    fn generate(&self, node: &SchemaNode, path: &ValuePath, repeat_index: u32) -> String {
        let kind = find_generator(node.name(), node.xml_type());
        let mut generator = self.factory.for_path(path);
        generate_value(kind, &mut generator, repeat_index, node.xml_type())
    }

    /// Build one instance of `node`; `repeat_index` is `None` for the root
    ///
    /// Single-occurrence nodes report the repeat index of their nearest
    /// repeatable ancestor, so `sequenceNumber` numbers the enclosing
    /// instances.
    fn instance(
        &mut self,
        node: &SchemaNode,
        count_path: &ValuePath,
        repeat_index: Option<u32>,
        parent_index: u32,
        cursors: &[Cursor],
        depth: usize,
    ) -> Result<Element> {
        self.limits.check_depth(depth)?;
        self.count_node()?;

        let index = repeat_index.unwrap_or(0);
        let sequence_index = if node.is_repeatable() { index } else { parent_index };
        let position = index as usize + 1;
        let instance_path = match repeat_index {
            Some(i) => count_path.append_index(i),
            None => count_path.clone(),
        };
        let local_name = node.name().local_name.as_str();
        let mut element = Element::new(node.name().clone());
        trace!(path = %instance_path, "generating element");

        // Attributes pinned by positional overrides skip the generator.
        let schema = self.schema;
        let overrides = self.overrides;
        let pinned = |attribute: &str| {
            cursors
                .iter()
                .filter(|c| self.cursor_completes(c))
                .filter_map(|c| {
                    let path = &overrides[c.index].path;
                    let step = &path.element_steps()[c.step];
                    let hit = step.is_positional()
                        && step.matches_element(local_name, position, &element.attributes)
                        && path.target_attribute() == Some(attribute);
                    hit.then_some(overrides[c.index].value.as_str())
                })
                .last()
        };
        let mut attributes = Vec::new();
        for attribute in schema.attributes(node) {
            let name = attribute.name().local_name.as_str();
            let value = match pinned(name) {
                Some(value) => value.to_string(),
                None => {
                    self.generate(attribute, &instance_path.append_attribute(name), sequence_index)
                }
            };
            attributes.push((attribute.name().clone(), value));
        }
        for (qname, value) in attributes {
            self.count_node()?;
            element.set_attribute(qname, value);
        }

        let mut text_override = None;
        let mut next = Vec::new();
        for cursor in cursors {
            let path = &overrides[cursor.index].path;
            let step = &path.element_steps()[cursor.step];
            if !step.matches_element(local_name, position, &element.attributes) {
                continue;
            }
            if !self.cursor_completes(cursor) {
                next.push(Cursor {
                    index: cursor.index,
                    step: cursor.step + 1,
                });
                continue;
            }
            self.matched[cursor.index] = true;
            let value = &overrides[cursor.index].value;
            match path.target_attribute() {
                Some(attribute) => {
                    for (qname, v) in element.attributes.iter_mut() {
                        if qname.local_name == attribute {
                            *v = value.clone();
                        }
                    }
                }
                None => text_override = Some(value.clone()),
            }
        }

        if let Some(text) = text_override {
            trace!(path = %instance_path, "content replaced by override");
            element.text = Some(text);
            return Ok(element);
        }

        for child in schema.children(node) {
            let child_path = instance_path.append_name(&child.name().local_name);
            let count = self.instance_count(child, &child_path);
            for i in 0..count {
                let instance =
                    self.instance(child, &child_path, Some(i), sequence_index, &next, depth + 1)?;
                element.add_child(instance);
            }
        }

        if node.is_text_content() {
            element.text = Some(self.generate(node, &instance_path, sequence_index));
        }
        Ok(element)
    }
}
