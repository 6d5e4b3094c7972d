use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::core::error::AppError;
use crate::features::files::dtos::{download_url, StoredFileDto, UploadFileDto};
use crate::features::files::routes::SharedStorage;
use crate::modules::storage::UploadedFile;
use crate::shared::constants::UPLOAD_FIELD_NAME;
use crate::shared::flash::{clear_flash_cookie, flash_cookie, read_flash};
use crate::shared::templates::{render_upload_form, FileLink};
use crate::shared::types::{ApiResponse, Meta};

/// Render the upload form with links to every stored file
#[utoipa::path(
    get,
    path = "/",
    tag = "files",
    responses(
        (status = 200, description = "Upload form listing stored files", body = String, content_type = "text/html")
    )
)]
pub async fn list_uploaded_files(
    State(storage): State<SharedStorage>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let files: Vec<FileLink> = storage
        .load_all()
        .await?
        .into_iter()
        .map(|name| FileLink {
            url: download_url(&name),
            name,
        })
        .collect();

    let message = read_flash(&headers);
    let html = render_upload_form(&files, message.as_deref())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut response = Html(html).into_response();
    if message.is_some() {
        response
            .headers_mut()
            .append(header::SET_COOKIE, clear_flash_cookie());
    }

    Ok(response)
}

/// Download a stored file as an attachment
#[utoipa::path(
    get,
    path = "/files/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Name of the stored file")
    ),
    responses(
        (status = 200, description = "File content sent as an attachment"),
        (status = 404, description = "File not found")
    )
)]
pub async fn serve_file(
    State(storage): State<SharedStorage>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let resource = storage.load_as_resource(&filename).await?;
    let file = resource.open().await?;

    let mime = mime_guess::from_path(&resource.path).first_or_octet_stream();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.essence_str())
            .map_err(|_| AppError::Internal("Invalid MIME type".to_string()))?,
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&resource.filename)?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(resource.size));

    info!(
        "Serving file: name={}, size={}",
        resource.filename, resource.size
    );

    let stream = ReaderStream::new(file);
    Ok((StatusCode::OK, headers, Body::from_stream(stream)).into_response())
}

/// Upload a file
///
/// Accepts multipart/form-data with a single `file` part and redirects back to
/// the upload form with a flash message.
#[utoipa::path(
    post,
    path = "/",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form",
    ),
    responses(
        (status = 303, description = "File stored, redirect to the upload form"),
        (status = 400, description = "Missing file part or malformed form"),
        (status = 413, description = "File too large"),
        (status = 500, description = "Empty file, unsafe filename or I/O failure")
    )
)]
pub async fn handle_file_upload(
    State(storage): State<SharedStorage>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != UPLOAD_FIELD_NAME {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        // A plain form value under the upload name is not a file part
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            debug!("Ignoring non-file field: {}", field_name);
            continue;
        };
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field.bytes().await.map_err(multipart_error)?;

        let mut file = UploadedFile::new(file_name, data);
        if let Some(content_type) = content_type {
            file = file.with_content_type(content_type);
        }
        upload = Some(file);
        break;
    }

    let file = upload.ok_or_else(|| {
        AppError::BadRequest(format!("Required part '{}' is not present", UPLOAD_FIELD_NAME))
    })?;

    let stored_as = storage.store(&file).await?;
    info!(
        "File uploaded: name={}, content_type={}, size={}",
        stored_as,
        file.content_type.as_deref().unwrap_or("-"),
        file.size()
    );

    let message = format!("You successfully uploaded {}!", file.original_filename);
    let mut response = Redirect::to("/").into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, flash_cookie(&message)?);

    Ok(response)
}

/// List stored files as JSON
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "Stored files", body = ApiResponse<Vec<StoredFileDto>>)
    )
)]
pub async fn list_files(
    State(storage): State<SharedStorage>,
) -> Result<Json<ApiResponse<Vec<StoredFileDto>>>, AppError> {
    let names = storage.load_all().await?;

    let mut files = Vec::with_capacity(names.len());
    for name in names {
        match storage.load_as_resource(&name).await {
            Ok(resource) => files.push(StoredFileDto::from(resource)),
            // Removed between listing and resolving
            Err(e) if e.is_not_found() => debug!("Skipping vanished file: {}", name),
            Err(e) => return Err(e.into()),
        }
    }

    let total = files.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    }
}

/// Build an attachment `Content-Disposition` value.
///
/// Plain ASCII names are sent quoted; anything else uses the RFC 5987
/// `filename*` form.
fn content_disposition(filename: &str) -> Result<HeaderValue, AppError> {
    let plain = filename
        .chars()
        .all(|c| (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ');

    let value = if plain {
        format!("attachment; filename=\"{}\"", filename)
    } else {
        format!(
            "attachment; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    };

    HeaderValue::from_str(&value)
        .map_err(|_| AppError::Internal("Invalid Content-Disposition header".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_plain_name() {
        let value = content_disposition("a b.txt").unwrap();
        assert_eq!(value, "attachment; filename=\"a b.txt\"");
    }

    #[test]
    fn test_content_disposition_non_ascii_name() {
        let value = content_disposition("résumé.pdf").unwrap();
        assert_eq!(value, "attachment; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf");
    }
}
