//! One-shot flash messages carried across a redirect in a cookie.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::core::error::AppError;
use crate::shared::constants::FLASH_COOKIE_NAME;

/// Flash cookies only need to survive the redirect that follows them
const FLASH_MAX_AGE_SECS: u32 = 60;

/// Build a `Set-Cookie` value carrying `message`
pub fn flash_cookie(message: &str) -> Result<HeaderValue, AppError> {
    let value = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        FLASH_COOKIE_NAME,
        urlencoding::encode(message),
        FLASH_MAX_AGE_SECS
    );

    HeaderValue::from_str(&value)
        .map_err(|e| AppError::Internal(format!("Invalid flash cookie: {}", e)))
}

/// Build a `Set-Cookie` value that expires the flash cookie
pub fn clear_flash_cookie() -> HeaderValue {
    HeaderValue::from_static("flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Read the pending flash message from the request cookies
pub fn read_flash(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE_NAME)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|message| message.into_owned())
        .filter(|message| !message.is_empty())
}
