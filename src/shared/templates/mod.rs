//! HTML page templates.
//!
//! Templates live in `templates/` at the crate root and are compiled into the
//! binary. They use Jinja2 syntax with HTML auto-escaping.

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::context;
use serde::Serialize;

const UPLOAD_FORM_TEMPLATE: &str = "upload_form.html.jinja";

/// A download link shown on the upload form
#[derive(Debug, Clone, Serialize)]
pub struct FileLink {
    pub name: String,
    pub url: String,
}

/// Render the upload form page.
///
/// # Arguments
/// * `files` - Download links for the stored files
/// * `message` - Optional flash message from a previous upload
pub fn render_upload_form(files: &[FileLink], message: Option<&str>) -> Result<String, TemplateError> {
    render_template(
        UPLOAD_FORM_TEMPLATE,
        context! {
            title => "File Upload",
            files => files,
            message => message,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_upload_form_lists_files() {
        let files = vec![FileLink {
            name: "a.txt".to_string(),
            url: "/files/a.txt".to_string(),
        }];

        let html = render_upload_form(&files, None).unwrap();

        assert!(html.contains(r#"<a href="/files/a.txt">a.txt</a>"#));
        assert!(!html.contains(r#"class="message""#));
    }

    #[test]
    fn test_render_upload_form_escapes_message() {
        let html = render_upload_form(&[], Some("<b>hi</b>")).unwrap();

        assert!(html.contains("&lt;b&gt;hi"));
        assert!(!html.contains("<b>hi"));
    }
}
