#[cfg(test)]
use crate::core::config::{AppConfig, Config, StorageConfig, SwaggerConfig};
#[cfg(test)]
use crate::modules::storage::{FileSystemStorageService, StorageService};
#[cfg(test)]
use axum_test::TestServer;
#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use tempfile::TempDir;

/// A running application backed by a throwaway storage root
#[cfg(test)]
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<FileSystemStorageService>,
    // Keeps the storage root alive for the duration of the test
    _temp: TempDir,
}

#[cfg(test)]
pub fn test_config(location: &str) -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["*".to_string()],
            max_upload_size: 1024 * 1024,
        },
        storage: StorageConfig {
            location: location.to_string(),
        },
        swagger: SwaggerConfig {
            title: "File Upload Server API".to_string(),
            version: "test".to_string(),
            description: "test".to_string(),
        },
    }
}

/// Build the full router over a fresh storage root, running the same
/// wipe-and-init sequence as process startup.
#[cfg(test)]
pub async fn spawn_test_app() -> TestApp {
    let temp = TempDir::new().expect("tempdir");
    let location = temp.path().join("upload-dir");
    let config = test_config(&location.to_string_lossy());

    let storage = Arc::new(FileSystemStorageService::new(&config.storage));
    storage.delete_all().await.expect("wipe storage");
    storage.init().await.expect("init storage");

    let app = crate::build_app(storage.clone(), &config);
    let server = TestServer::new(app).expect("test server");

    TestApp {
        server,
        storage,
        _temp: temp,
    }
}
