//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use firefly::{Catalog, CatalogConfig, InMemoryStorageArea, StorageArea};

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A catalog with no seed data over a fresh in-memory area.
pub fn empty_catalog() -> (Arc<dyn StorageArea>, Catalog) {
    init_tracing();
    let area: Arc<dyn StorageArea> = Arc::new(InMemoryStorageArea::new());
    let config = CatalogConfig {
        seed_defaults: false,
        ..CatalogConfig::default()
    };
    let catalog = Catalog::new(Arc::clone(&area), config).unwrap();
    (area, catalog)
}
