pub mod error;
pub mod source;
pub mod store;

pub use error::*;
pub use source::*;
pub use store::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_DIR_SEQ: AtomicU64 = AtomicU64::new(0);

    fn temp_test_dir() -> std::path::PathBuf {
        let seq = TEST_DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tessera_io_test_{pid}_{nonce}_{seq}"))
    }

    fn memory(files: &[(&str, &str)]) -> Rc<MemorySource> {
        let source = MemorySource::new();
        for (path, body) in files {
            source.insert(path, body);
        }
        Rc::new(source)
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_fetch() {
        let source = memory(&[("game.json", r#"{"scenes":{}}"#)]);
        let store = AssetStore::new(Rc::clone(&source));

        let (a, b) = tokio::join!(store.load("game.json"), store.load("game.json"));
        let a = a.expect("first load");
        let b = b.expect("second load");

        assert_eq!(source.fetch_count(), 1);
        assert_eq!(a, b);
        assert!(Rc::ptr_eq(&a, &b));
        assert!(store.is_cached("game.json"));
    }

    #[tokio::test]
    async fn cached_asset_is_not_fetched_again() {
        let source = memory(&[("model.glb", "binary")]);
        let store = AssetStore::new(Rc::clone(&source));

        let first = store.load("model.glb").await.expect("load");
        let second = store.load("/model.glb").await.expect("load again");

        assert_eq!(source.fetch_count(), 1);
        assert_eq!(first.bytes(), Some(&b"binary"[..]));
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn concurrent_failures_share_the_same_error_and_are_not_cached() {
        let source = memory(&[]);
        let store = AssetStore::new(Rc::clone(&source));

        let (a, b) = tokio::join!(store.load("missing.json"), store.load("missing.json"));
        let a = a.expect_err("missing asset");
        let b = b.expect_err("missing asset");
        assert_eq!(a, b);
        assert!(a.is_not_found());
        assert_eq!(source.fetch_count(), 1);

        // No negative caching: the caller may retry.
        let _ = store.load("missing.json").await;
        assert_eq!(source.fetch_count(), 2);
        assert_eq!(store.cached_len(), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let store = AssetStore::new(memory(&[("broken.json", "{not json")]));
        let err = store.load("broken.json").await.expect_err("parse failure");
        assert!(matches!(err, AssetError::Parse { ref path, .. } if path == "broken.json"));
    }

    #[tokio::test]
    async fn load_json_rejects_raw_assets() {
        let store = AssetStore::new(memory(&[("texture.png", "png")]));
        assert!(store.load_json("texture.png").await.is_err());
    }

    #[tokio::test]
    async fn directory_source_reads_and_confines_paths() {
        let base = temp_test_dir();
        fs::create_dir_all(base.join("scenes")).unwrap();
        fs::write(base.join("scenes/main.json"), r#"{"gameObjects":[]}"#).unwrap();

        let store = AssetStore::from_location(AssetLocation::Directory(base.clone()))
            .expect("directory store");

        let asset = store.load("scenes/main.json").await.expect("scene asset");
        assert_eq!(
            asset.json(),
            Some(&serde_json::json!({ "gameObjects": [] }))
        );
        assert!(asset.path.ends_with("main.json"));

        let missing = store.load("scenes/other.json").await.expect_err("missing");
        assert!(missing.is_not_found());

        let escaped = store.load("../outside.json").await.expect_err("escape");
        assert!(escaped.is_not_found());

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn http_source_strips_trailing_slash() {
        let source = HttpSource::new("https://cdn.example.com/game/").expect("valid url");
        assert_eq!(source.base(), "https://cdn.example.com/game");
        assert_eq!(
            source.resolve("/scenes/main.json").as_deref(),
            Some("https://cdn.example.com/game/scenes/main.json")
        );
        assert_eq!(source.resolve("../secret.json"), None);
    }

    #[test]
    fn http_source_rejects_non_http_base() {
        assert!(matches!(
            HttpSource::new("not a url"),
            Err(AssetError::InvalidConstructorArgument(_))
        ));
        assert!(matches!(
            HttpSource::new("ftp://example.com/game"),
            Err(AssetError::InvalidConstructorArgument(_))
        ));
    }

    #[test]
    fn location_requires_exactly_one_base() {
        let dir = std::path::Path::new("game");
        assert!(matches!(
            AssetLocation::from_parts(None, None),
            Err(AssetError::InvalidConstructorArgument(_))
        ));
        assert!(matches!(
            AssetLocation::from_parts(Some("https://x.dev"), Some(dir)),
            Err(AssetError::InvalidConstructorArgument(_))
        ));
        assert_eq!(
            AssetLocation::from_parts(None, Some(dir)).unwrap(),
            AssetLocation::Directory(dir.to_path_buf())
        );
    }
}
