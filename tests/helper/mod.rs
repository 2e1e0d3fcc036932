//! Shared utilities for end-to-end tests

#![allow(dead_code)]

use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use serde_json::json;
use tempfile::TempDir;

use plugin_update_provider::provider::Providers;
use plugin_update_provider::version::registries::UpdateServerRegistry;
use plugin_update_provider::version::store::{KeyValueStore, SqliteStore};

/// Plugins directory and store backed by a temp dir, with a manual clock
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub plugins_dir: PathBuf,
    pub store: Arc<SqliteStore>,
    clock: Arc<AtomicI64>,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let plugins_dir = temp_dir.path().join("plugins");
        std::fs::create_dir_all(&plugins_dir).unwrap();

        let clock = Arc::new(AtomicI64::new(1_714_557_600_000));
        let now = clock.clone();
        let store = Arc::new(
            SqliteStore::open_with_clock(
                &temp_dir.path().join("store.db"),
                Arc::new(move || now.load(Ordering::SeqCst)),
            )
            .unwrap(),
        );

        Self {
            temp_dir,
            plugins_dir,
            store,
            clock,
        }
    }

    /// Write `{slug}/{slug}.php` with a header declaring `version`
    pub fn write_plugin(&self, slug: &str, version: &str) -> PathBuf {
        let dir = self.plugins_dir.join(slug);
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join(format!("{slug}.php"));
        std::fs::write(
            &path,
            format!("<?php\n/**\n * Plugin Name: {slug}\n * Version: {version}\n */\n"),
        )
        .unwrap();
        path
    }

    pub fn advance_secs(&self, secs: i64) {
        self.clock.fetch_add(secs * 1000, Ordering::SeqCst);
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    /// Providers talking to the update server at `base_url`, with `plugin_files` registered
    pub fn providers(&self, base_url: &str, plugin_files: &[&PathBuf]) -> Providers {
        let registry = Arc::new(UpdateServerRegistry::new(base_url).unwrap());
        let mut providers = Providers::new(&self.plugins_dir, registry, self.store());

        for plugin_file in plugin_files {
            providers.register(plugin_file).unwrap();
        }
        providers
    }
}

/// Update server response body for `slug` at `version`
pub fn plugin_body(slug: &str, version: &str) -> String {
    json!({
        "name": "Acme Tool",
        "slug": slug,
        "author": "Acme",
        "author_profile": "https://acme.example",
        "version": version,
        "tested": "6.5",
        "requires": "6.0",
        "requires_php": "7.4",
        "download_url": format!("https://downloads.acme.example/{slug}-{version}.zip"),
        "last_updated": "2024-05-01 10:00:00",
        "sections": {
            "description": "Does acme things",
            "changelog": "<h4>2.4.0</h4><ul><li>Faster</li></ul>"
        },
        "banners": {
            "low": "https://acme.example/banner-772x250.png"
        }
    })
    .to_string()
}

/// Base URL of a port nothing listens on
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
