//! Property-based tests for filtering and population

use efti_datatools::populate::{populate, PopulateMode, TextContentOverride};
use efti_datatools::schema::SchemaModel;
use efti_datatools::subsets::{filter_common_subsets, filter_identifier_subsets, SubsetId};
use efti_datatools::xpath::LocationPath;
use efti_datatools::{Document, Element, SubsetCategory, SubsetFilter};
use once_cell::sync::Lazy;
use proptest::prelude::*;
use std::collections::BTreeSet;

static SCHEMA: Lazy<SchemaModel> = Lazy::new(|| {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/consignment-common.json");
    SchemaModel::from_file(path).unwrap()
});

const SUBSETS: [&str; 3] = ["FI01", "FI02", "FI03"];

fn subsets(mask: u8) -> BTreeSet<SubsetId> {
    SUBSETS
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, id)| SubsetId::new(id).unwrap())
        .collect()
}

fn mode() -> impl Strategy<Value = PopulateMode> {
    prop_oneof![
        Just(PopulateMode::Random),
        Just(PopulateMode::MinimumOne),
        Just(PopulateMode::ExactlyOne),
    ]
}

fn category() -> impl Strategy<Value = SubsetCategory> {
    prop_oneof![Just(SubsetCategory::Common), Just(SubsetCategory::Identifier)]
}

/// `small` is `big` with some subtrees removed, order preserved
fn is_embedded(small: &Element, big: &Element) -> bool {
    if small.qname != big.qname
        || small.text != big.text
        || small.attributes.iter().any(|(k, v)| big.attributes.get(k) != Some(v))
    {
        return false;
    }
    let mut candidates = big.children.iter();
    small
        .children
        .iter()
        .all(|child| candidates.any(|candidate| is_embedded(child, candidate)))
}

fn filter(doc: &Document, ids: &BTreeSet<SubsetId>, category: SubsetCategory) -> Document {
    SubsetFilter::new(&SCHEMA)
        .filter_document(doc, ids, category)
        .unwrap()
}

proptest! {
    #[test]
    fn prop_pruning_is_monotonic(seed in 0u64..10_000, a in 0u8..8, b in 0u8..8, category in category()) {
        let doc = populate(&SCHEMA, &[], seed, PopulateMode::Random).unwrap();
        let narrow = filter(&doc, &subsets(a & b), category);
        let wide = filter(&doc, &subsets(b), category);
        prop_assert!(is_embedded(narrow.root.as_ref().unwrap(), wide.root.as_ref().unwrap()));
        prop_assert!(is_embedded(wide.root.as_ref().unwrap(), doc.root.as_ref().unwrap()));
    }

    #[test]
    fn prop_filter_is_idempotent(seed in 0u64..10_000, mask in 0u8..8, mode in mode()) {
        let doc = populate(&SCHEMA, &[], seed, mode).unwrap();
        let ids = subsets(mask);
        let once = filter_common_subsets(&doc, &SCHEMA, &ids).unwrap();
        let twice = filter_common_subsets(&once, &SCHEMA, &ids).unwrap();
        prop_assert_eq!(&once, &twice);

        let once = filter_identifier_subsets(&doc, &SCHEMA, &ids).unwrap();
        let twice = filter_identifier_subsets(&once, &SCHEMA, &ids).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_root_is_preserved(seed in 0u64..10_000, category in category()) {
        let doc = populate(&SCHEMA, &[], seed, PopulateMode::Random).unwrap();
        let filtered = filter(&doc, &BTreeSet::new(), category);
        let root = filtered.root.as_ref().unwrap();
        prop_assert_eq!(&root.qname, &doc.root.as_ref().unwrap().qname);
    }

    #[test]
    fn prop_populate_is_deterministic(seed in any::<u64>(), mode in mode()) {
        let a = populate(&SCHEMA, &[], seed, mode).unwrap();
        let b = populate(&SCHEMA, &[], seed, mode).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_override_fidelity(seed in any::<u64>(), mode in mode(), value in "[A-Za-z0-9]{1,12}") {
        let path = LocationPath::parse("consignment/ConsignmentCarrierId/@schemeAgencyId").unwrap();
        let overrides = [TextContentOverride::new(path, value.clone())];
        let doc = populate(&SCHEMA, &overrides, seed, mode).unwrap();
        let carrier = doc.root.as_ref().unwrap().find_children("ConsignmentCarrierId")[0];
        prop_assert_eq!(carrier.get_attribute("schemeAgencyId"), Some(value.as_str()));
    }
}
