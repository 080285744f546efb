//! Schema model
//!
//! Subset tagging and multiplicity metadata for every element and attribute
//! of a schema, consumed read-only by the subset filter and the populator.

pub mod definition;
pub mod model;
pub mod particles;

pub use definition::{AttributeDefinition, ElementDefinition, SchemaDefinition, TypeDefinition};
pub use model::{NodeId, NodeKind, SchemaModel, SchemaNode, SchemaPath, XmlType};
pub use particles::Occurs;
