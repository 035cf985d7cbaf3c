#[cfg(test)]
mod tests {
    use crate::pool::producer::{from_fn, StaticProducer};
    use crate::pool::registry::*;
    use crate::pool::shared::SharedPool;
    use quiver_core::{Config, PoolConfig, PoolError, PoolSettings};
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_producer() -> StaticProducer {
        StaticProducer::new(["http://1.2.3.4:8080", "http://5.6.7.8:3128"])
    }

    fn create_test_config() -> Config {
        let mut pools = HashMap::new();
        pools.insert(
            "residential".to_string(),
            PoolConfig {
                endpoints: vec![
                    "http://1.2.3.4:8080".to_string(),
                    "socks5://u:p@5.6.7.8:1080".to_string(),
                    "garbage".to_string(),
                ],
                usage_threshold_seconds: Some(5.0),
                ..Default::default()
            },
        );
        pools.insert(
            "disabled".to_string(),
            PoolConfig {
                endpoints: vec!["http://9.9.9.9:80".to_string()],
                enabled: false,
                ..Default::default()
            },
        );

        Config {
            settings: PoolSettings::default(),
            pools,
        }
    }

    #[test]
    fn test_registry_create_and_lookup() {
        let registry = PoolRegistry::new();
        assert!(registry.is_empty());

        let pool = registry
            .create("main", create_test_producer(), PoolSettings::default())
            .unwrap();
        assert_eq!(pool.size(), 2);

        assert!(registry.exists("main"));
        assert!(!registry.exists("other"));
        assert_eq!(registry.len(), 1);

        let found = registry.lookup("main").unwrap();
        found.mark_invalid("http://1.2.3.4:8080").unwrap();

        // 查找返回的是同一个池
        assert_eq!(pool.invalid_count(), 1);
        assert!(registry.lookup("other").is_none());
    }

    #[test]
    fn test_registry_duplicate_name() {
        let registry = PoolRegistry::new();
        registry
            .create("main", create_test_producer(), PoolSettings::default())
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let producer = from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        });

        let result = registry.create("main", producer, PoolSettings::default());
        assert!(matches!(result, Err(PoolError::AlreadyExists { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_registry_rejects_empty_name() {
        let registry = PoolRegistry::new();
        let result = registry.create("  ", create_test_producer(), PoolSettings::default());
        assert!(matches!(result, Err(PoolError::Config { field: "name", .. })));
    }

    #[test]
    fn test_registry_invalid_settings_not_registered() {
        let registry = PoolRegistry::new();
        let settings = PoolSettings {
            refresh_interval_seconds: -1.0,
            ..Default::default()
        };

        assert!(registry.create("main", create_test_producer(), settings).is_err());
        assert!(!registry.exists("main"));
    }

    #[test]
    fn test_registry_remove_list_clear() {
        let registry = PoolRegistry::new();
        for name in ["charlie", "alpha", "bravo"] {
            registry
                .create(name, create_test_producer(), PoolSettings::default())
                .unwrap();
        }

        assert_eq!(registry.list_names(), vec!["alpha", "bravo", "charlie"]);

        assert!(registry.remove("bravo").is_some());
        assert!(registry.remove("bravo").is_none());
        assert_eq!(registry.list_names(), vec!["alpha", "charlie"]);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.list_names().is_empty());
    }

    #[test]
    fn test_independent_registries() {
        let first = PoolRegistry::new();
        let second = PoolRegistry::new();

        first
            .create("main", create_test_producer(), PoolSettings::default())
            .unwrap();

        assert!(first.exists("main"));
        assert!(!second.exists("main"));
    }

    #[test]
    fn test_registry_from_config() {
        let registry = PoolRegistry::from_config(&create_test_config()).unwrap();

        assert_eq!(registry.list_names(), vec!["residential"]);
        let pool = registry.lookup("residential").unwrap();
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.stats().rejected_last_reload, 1);
        assert_eq!(pool.with_engine(|engine| engine.settings().usage_threshold_seconds), 5.0);
    }

    #[test]
    fn test_registry_from_config_with_file_source() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("proxies.txt");
        std::fs::write(&path, "http://1.1.1.1:80\nhttps://2.2.2.2:443\n").unwrap();

        let mut config = create_test_config();
        config.pools.insert(
            "from-file".to_string(),
            PoolConfig {
                file: Some(path.clone()),
                ..Default::default()
            },
        );

        let registry = PoolRegistry::from_config(&config).unwrap();
        assert_eq!(registry.lookup("from-file").unwrap().size(), 2);
    }

    #[test]
    fn test_registry_from_config_missing_file() {
        let mut config = create_test_config();
        config.pools.insert(
            "from-file".to_string(),
            PoolConfig {
                file: Some(PathBuf::from("/nonexistent/quiver-proxies.txt")),
                ..Default::default()
            },
        );

        let result = PoolRegistry::from_config(&config);
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("from-file"));
    }

    #[test]
    fn test_registry_from_invalid_config() {
        let mut config = create_test_config();
        config.settings.load_factor = 3.0;

        assert!(PoolRegistry::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_shared_pool_concurrent_selection() {
        let descriptors: Vec<String> = (1..=8).map(|i| format!("http://10.1.0.{}:8080", i)).collect();
        let registry = PoolRegistry::new();
        let pool = registry
            .create("shared", StaticProducer::new(descriptors), PoolSettings::default())
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool: SharedPool = pool.clone();
            handles.push(tokio::spawn(async move { pool.select_next().unwrap().unwrap() }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            let record = handle.await.unwrap();
            assert_eq!(record.usage_count, 1);
            seen.insert(record.identity);
        }

        // 锁保证每次选择看到前一次的结果
        assert_eq!(seen.len(), 8);
        assert_eq!(pool.stats().total_selections, 8);
    }

    #[tokio::test]
    async fn test_shared_pool_concurrent_invalidation() {
        let descriptors: Vec<String> = (1..=4).map(|i| format!("http://10.2.0.{}:8080", i)).collect();
        let settings = PoolSettings {
            load_factor: 1.0,
            ..Default::default()
        };
        let pool = SharedPool::new(
            crate::pool::engine::PoolEngine::new(StaticProducer::new(descriptors.clone()), settings)
                .unwrap(),
        );

        let mut handles = Vec::new();
        for identity in descriptors {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                pool.mark_invalid(identity.as_str()).unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(pool.invalid_count(), 4);
        assert!(pool.select_next().unwrap().is_none());
    }
}
