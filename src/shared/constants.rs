/// Multipart form field carrying the uploaded file
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Route prefix for file downloads
pub const DOWNLOAD_ROUTE_PREFIX: &str = "/files";

/// Cookie carrying the one-shot upload message
pub const FLASH_COOKIE_NAME: &str = "flash";

/// Extra body allowance for multipart boundaries and part headers
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;
