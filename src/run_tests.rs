//! Tests for the run module.

use tempfile::TempDir;

use super::*;

const MDX: &str = "https://sfbay.craigslist.org/search/cta?query=acura+mdx";
const BIKES: &str = "https://seattle.craigslist.org/search/bia";

fn store_in(dir: &TempDir) -> FileOwnerStore {
    FileOwnerStore::new(dir.path().join("store.json"))
}

fn table(entries: &[(&str, &str)]) -> SourceTable {
    entries
        .iter()
        .map(|(name, url)| ((*name).to_string(), (*url).to_string()))
        .collect()
}

mod run_error {
    use super::*;

    #[test]
    fn registry_error_is_shown_verbatim() {
        let error = RunError::from(RegistryError::AlreadyExists {
            name: "MDX".to_string(),
        });

        assert_eq!(error.to_string(), "Source 'MDX' already exists");
    }

    #[test]
    fn invalid_url_is_shown_verbatim() {
        let error = RunError::from(ConfigError::InvalidUrl {
            url: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        });

        assert!(error.to_string().starts_with("Invalid URL 'nope'"));
    }
}

mod loading {
    use super::*;

    #[test]
    fn missing_store_loads_nothing() {
        let dir = TempDir::new().unwrap();

        let tables = load_tables(&store_in(&dir), "default", &SourceTable::new());

        assert!(tables.is_empty());
    }

    #[test]
    fn corrupted_store_loads_nothing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("store.json"), "garbage").unwrap();

        let tables = load_tables(&store_in(&dir), "default", &SourceTable::new());

        assert!(tables.is_empty());
    }

    #[test]
    fn seed_fills_an_owner_without_sources() {
        let dir = TempDir::new().unwrap();
        let seed = table(&[("MDX", MDX)]);

        let tables = load_tables(&store_in(&dir), "alice", &seed);

        assert_eq!(tables["alice"], seed);
    }

    #[tokio::test]
    async fn seed_never_replaces_saved_sources() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        add_source(&store, "alice", "bikes".to_string(), BIKES)
            .await
            .unwrap();

        let tables = load_tables(&store, "alice", &table(&[("MDX", MDX)]));

        assert_eq!(tables["alice"], table(&[("bikes", BIKES)]));
    }
}

mod subcommands {
    use super::*;

    #[tokio::test]
    async fn add_persists_the_source() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let source = add_source(&store, "alice", "MDX".to_string(), MDX)
            .await
            .unwrap();

        assert_eq!(source, Source::new("MDX", MDX));
        assert_eq!(list_sources(&store, "alice"), table(&[("MDX", MDX)]));
    }

    #[tokio::test]
    async fn add_keeps_owners_apart() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        add_source(&store, "alice", "MDX".to_string(), MDX)
            .await
            .unwrap();
        add_source(&store, "bob", "bikes".to_string(), BIKES)
            .await
            .unwrap();

        assert_eq!(list_sources(&store, "alice"), table(&[("MDX", MDX)]));
        assert_eq!(list_sources(&store, "bob"), table(&[("bikes", BIKES)]));
    }

    #[tokio::test]
    async fn add_duplicate_name_fails_and_keeps_original() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        add_source(&store, "alice", "MDX".to_string(), MDX)
            .await
            .unwrap();

        let err = add_source(&store, "alice", "MDX".to_string(), BIKES)
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Registry(RegistryError::AlreadyExists { .. })));
        assert_eq!(list_sources(&store, "alice"), table(&[("MDX", MDX)]));
    }

    #[tokio::test]
    async fn add_rejects_non_http_url_without_saving() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = add_source(&store, "alice", "local".to_string(), "file:///tmp/page.html")
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::InvalidUrl(_)));
        assert_eq!(store.load(), LoadResult::NotFound);
    }

    #[tokio::test]
    async fn remove_deletes_the_source() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        add_source(&store, "alice", "MDX".to_string(), MDX)
            .await
            .unwrap();
        add_source(&store, "alice", "bikes".to_string(), BIKES)
            .await
            .unwrap();

        let removed = remove_source(&store, "alice", "MDX").await.unwrap();

        assert_eq!(removed, Source::new("MDX", MDX));
        assert_eq!(list_sources(&store, "alice"), table(&[("bikes", BIKES)]));
    }

    #[tokio::test]
    async fn removing_the_last_source_drops_the_owner() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        add_source(&store, "alice", "MDX".to_string(), MDX)
            .await
            .unwrap();

        remove_source(&store, "alice", "MDX").await.unwrap();

        assert_eq!(store.load(), LoadResult::Loaded(OwnerTables::new()));
    }

    #[tokio::test]
    async fn remove_unknown_name_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = remove_source(&store, "alice", "ghost").await.unwrap_err();

        assert!(matches!(err, RunError::Registry(RegistryError::NotFound { .. })));
    }

    #[test]
    fn list_unknown_owner_is_empty() {
        let dir = TempDir::new().unwrap();

        assert!(list_sources(&store_in(&dir), "nobody").is_empty());
    }
}
