//! MIME type lookup for uploaded files

use std::path::Path;

/// Fallback for files whose extension maps to nothing
const FALLBACK_MIME: &str = "application/octet-stream";

/// Maps a file path to a MIME type string
pub trait ContentTyper: Send + Sync {
    fn guess(&self, path: &Path) -> String;
}

/// Extension-table lookup backed by `mime_guess`
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionTyper;

impl ContentTyper for ExtensionTyper {
    fn guess(&self, path: &Path) -> String {
        mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MIME)
            .to_string()
    }
}

/// Content-Type header value for an upload.
///
/// Text assets are served without an encoding hint otherwise, so `text/*`
/// types get an explicit UTF-8 charset.
pub fn header_value(mime: &str) -> String {
    if mime.starts_with("text/") {
        format!("{}; charset=UTF-8", mime)
    } else {
        mime.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_common_site_assets() {
        let typer = ExtensionTyper;
        assert_eq!(typer.guess(Path::new("index.html")), "text/html");
        assert_eq!(typer.guess(Path::new("css/site.css")), "text/css");
        assert_eq!(typer.guess(Path::new("img/logo.png")), "image/png");
    }

    #[test]
    fn unknown_extension_falls_back() {
        let typer = ExtensionTyper;
        assert_eq!(typer.guess(Path::new("LICENSE")), FALLBACK_MIME);
        assert_eq!(typer.guess(Path::new("blob.zzqx")), FALLBACK_MIME);
    }

    #[test]
    fn text_types_get_charset() {
        assert_eq!(header_value("text/html"), "text/html; charset=UTF-8");
        assert_eq!(header_value("image/png"), "image/png");
        assert_eq!(header_value("application/json"), "application/json");
    }
}
