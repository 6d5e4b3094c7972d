use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    handle_file_upload, list_files, list_uploaded_files, serve_file,
};
use crate::modules::storage::StorageService;
use crate::shared::constants::MULTIPART_OVERHEAD;

/// Storage handle shared by every file handler
pub type SharedStorage = Arc<dyn StorageService>;

/// Create routes for the files feature
pub fn routes(storage: SharedStorage, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            "/",
            // Allow body size up to max_upload_size + buffer for multipart overhead
            post(handle_file_upload)
                .layer(DefaultBodyLimit::max(max_upload_size + MULTIPART_OVERHEAD))
                .get(list_uploaded_files),
        )
        .route("/files/{filename}", get(serve_file))
        .route("/api/files", get(list_files))
        .with_state(storage)
}
