use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        files_handlers::list_uploaded_files,
        files_handlers::serve_file,
        files_handlers::handle_file_upload,
        files_handlers::list_files,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::StoredFileDto,
            ApiResponse<Vec<files_dtos::StoredFileDto>>,
        )
    ),
    tags(
        (name = "files", description = "File upload, listing and download"),
    ),
    info(
        title = "File Upload Server API",
        version = "0.1.0",
        description = "Upload, list and download files",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
