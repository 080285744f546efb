//! Populate the consignment fixture schema and print the document
//!
//! Usage: cargo run --example populate_sample [seed]

use efti_datatools::populate::{DomPopulator, PopulateMode, TextContentOverride};
use efti_datatools::schema::SchemaModel;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(1234);

    let schema = SchemaModel::from_file("tests/fixtures/consignment-common.json")?;
    let overrides = [TextContentOverride::parse(
        "consignment/deliveryEvent/actualOccurrenceDateTime:=202401011200+0000",
    )?];

    let doc = DomPopulator::new(seed, PopulateMode::MinimumOne).populate(&schema, &overrides)?;
    print!("{}", doc.to_xml_string(true)?);
    Ok(())
}
