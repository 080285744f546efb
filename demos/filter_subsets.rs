//! Filter a populated consignment document for each subset in turn
//!
//! Usage: cargo run --example filter_subsets

use efti_datatools::populate::{populate, PopulateMode};
use efti_datatools::schema::SchemaModel;
use efti_datatools::subsets::{SubsetCategory, SubsetFilter};
use std::collections::BTreeSet;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = SchemaModel::from_file("tests/fixtures/consignment-common.json")?;
    let doc = populate(&schema, &[], 1234, PopulateMode::MinimumOne)?;
    let filter = SubsetFilter::new(&schema);

    let total = doc.root.as_ref().map_or(0, |root| root.element_count());
    println!("populated document: {} elements", total);

    for category in [SubsetCategory::Common, SubsetCategory::Identifier] {
        for subset in schema.subsets(category) {
            let requested = BTreeSet::from([subset.clone()]);
            let filtered = filter.filter_document(&doc, &requested, category)?;
            let kept = filtered.root.as_ref().map_or(0, |root| root.element_count());
            println!("{} {}: {} elements", category, subset, kept);
        }
    }
    Ok(())
}
