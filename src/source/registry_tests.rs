//! Tests for `SourceRegistry`.

use super::*;

const MDX: &str = "https://sfbay.craigslist.org/search/cta?query=acura+mdx";
const RDX: &str = "https://sfbay.craigslist.org/search/cta?query=acura+rdx";

#[test]
fn add_then_list() {
    let mut registry = SourceRegistry::new();

    registry.add("MDX", MDX).unwrap();

    let table = registry.list();
    assert_eq!(table.len(), 1);
    assert_eq!(table["MDX"], MDX);
}

#[test]
fn duplicate_name_is_rejected_and_registry_unchanged() {
    let mut registry = SourceRegistry::new();
    registry.add("MDX", MDX).unwrap();

    let err = registry.add("MDX", RDX).unwrap_err();

    assert_eq!(
        err,
        RegistryError::AlreadyExists {
            name: "MDX".to_string()
        }
    );
    assert_eq!(registry.list().len(), 1);
    assert_eq!(registry.list()["MDX"], MDX);
}

#[test]
fn url_is_not_validated() {
    let mut registry = SourceRegistry::new();

    assert!(registry.add("junk", "not a url").is_ok());
}

#[test]
fn remove_returns_removed_source() {
    let mut registry = SourceRegistry::new();
    registry.add("MDX", MDX).unwrap();

    let removed = registry.remove("MDX").unwrap();

    assert_eq!(removed, Source::new("MDX", MDX));
    assert!(registry.list().is_empty());
}

#[test]
fn remove_missing_is_not_found() {
    let mut registry = SourceRegistry::new();

    let err = registry.remove("ghost").unwrap_err();

    assert_eq!(
        err,
        RegistryError::NotFound {
            name: "ghost".to_string()
        }
    );
}

#[test]
fn name_can_be_reused_after_remove() {
    let mut registry = SourceRegistry::new();
    registry.add("MDX", MDX).unwrap();
    registry.remove("MDX").unwrap();

    assert!(registry.add("MDX", RDX).is_ok());
    assert_eq!(registry.list()["MDX"], RDX);
}

#[test]
fn sources_preserve_registration_order() {
    let mut registry = SourceRegistry::new();
    registry.add("zeta", MDX).unwrap();
    registry.add("alpha", RDX).unwrap();

    let names: Vec<String> = registry.sources().into_iter().map(|s| s.name).collect();

    assert_eq!(names, vec!["zeta", "alpha"]);
}

#[test]
fn from_table_registers_every_entry() {
    let table: SourceTable = [
        ("MDX".to_string(), MDX.to_string()),
        ("RDX".to_string(), RDX.to_string()),
    ]
    .into_iter()
    .collect();

    let registry = SourceRegistry::from_table(&table);

    assert_eq!(registry.list(), table);
}

#[test]
fn error_messages_name_the_source() {
    let exists = RegistryError::AlreadyExists {
        name: "MDX".to_string(),
    };
    let missing = RegistryError::NotFound {
        name: "RDX".to_string(),
    };

    assert_eq!(exists.to_string(), "Source 'MDX' already exists");
    assert_eq!(missing.to_string(), "Source 'RDX' not found");
}
