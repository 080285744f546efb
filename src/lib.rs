//! # efti-datatools
//!
//! Data tools for eFTI consignment documents: subset filtering and
//! deterministic, schema-driven population of sample documents.
//!
//! ## Features
//!
//! - Schema model with per-node multiplicity, types and subset tags
//! - Subset filtering of documents for the common and identifier categories
//! - Seeded document population with text content overrides
//! - Projection of common documents onto the identifier schema
//! - Location-path based editing of documents
//!
//! ## Example
//!
//! ```rust
//! use efti_datatools::populate::{populate, PopulateMode};
//! use efti_datatools::schema::{ElementDefinition, SchemaDefinition, SchemaModel, TypeDefinition};
//! use efti_datatools::subsets::{filter_common_subsets, parse_subset_ids};
//!
//! let root = ElementDefinition::new("consignment")
//!     .child(
//!         ElementDefinition::new("grossWeight")
//!             .with_type(TypeDefinition::text("decimal"))
//!             .common_subsets(["FI01"]),
//!     );
//! let schema = SchemaModel::new(&SchemaDefinition::new(root))?;
//!
//! let doc = populate(&schema, &[], 1234, PopulateMode::MinimumOne)?;
//! let filtered = filter_common_subsets(&doc, &schema, &parse_subset_ids(["FI02"])?)?;
//! assert!(filtered.root.unwrap().children.is_empty());
//! # Ok::<(), efti_datatools::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and documents
pub mod documents;
pub mod names;
pub mod namespaces;
pub mod xpath;

// Schema model
pub mod schema;

// Operations
pub mod conversion;
pub mod populate;
pub mod subsets;

// Re-exports for convenience
pub use documents::{Document, Element};
pub use error::{Error, Result};
pub use limits::Limits;
pub use populate::{populate, DomPopulator, PopulateMode, TextContentOverride};
pub use schema::SchemaModel;
pub use subsets::{
    filter, filter_common_subsets, filter_identifier_subsets, SubsetCategory, SubsetFilter,
    SubsetId,
};

/// Version of the efti-datatools library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Namespace of consignment common documents
pub const CONSIGNMENT_COMMON_NAMESPACE: &str = "http://efti.eu/v1/consignment/common";

/// Namespace of consignment identifier documents
pub const CONSIGNMENT_IDENTIFIER_NAMESPACE: &str = "http://efti.eu/v1/consignment/identifier";
