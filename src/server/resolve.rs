//! Request path resolution for the static file server
//!
//! Maps a URL path onto a file under the served root, trying in order the
//! exact path, `path + ".html"` and `path/index.html`. The resolved file must
//! carry an allow-listed extension.

use crate::error::{ServeError, ServeResult};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions the server is willing to serve
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    ".html", ".css", ".js", ".json", ".xml", ".mp4", ".webp", ".txt", ".md", ".jpg", ".jpeg",
    ".png", ".gif", ".svg", ".ico", ".pdf", ".woff", ".woff2", ".go", ".py",
];

/// Collapse `.`, `..` and empty segments. The result never climbs above the root.
pub fn clean_segments(url_path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in url_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments
}

/// Resolve a decoded URL path to a file under `root`
pub fn resolve(root: &Path, url_path: &str) -> ServeResult<PathBuf> {
    let mut full = root.to_path_buf();
    for segment in clean_segments(url_path) {
        // Backslashes would be separators on Windows
        if segment.contains('\\') {
            return Err(ServeError::NotFound(url_path.to_string()));
        }
        full.push(segment);
    }

    let resolved = match fs::metadata(&full) {
        Ok(meta) if meta.is_dir() => {
            let index = full.join("index.html");
            if is_file(&index)? {
                index
            } else {
                return Err(ServeError::NotFound(url_path.to_string()));
            }
        }
        Ok(_) => full,
        Err(e) if is_missing(&e) => fallback(&full, url_path)?,
        Err(e) => return Err(ServeError::Io(e)),
    };

    if !is_allowed(&resolved) {
        return Err(ServeError::Forbidden(url_path.to_string()));
    }
    Ok(resolved)
}

fn fallback(full: &Path, url_path: &str) -> ServeResult<PathBuf> {
    let mut with_html = OsString::from(full.as_os_str());
    with_html.push(".html");
    let with_html = PathBuf::from(with_html);
    if is_file(&with_html)? {
        return Ok(with_html);
    }

    let index = full.join("index.html");
    if is_file(&index)? {
        return Ok(index);
    }

    Err(ServeError::NotFound(url_path.to_string()))
}

fn is_file(path: &Path) -> ServeResult<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if is_missing(&e) => Ok(false),
        Err(e) => Err(ServeError::Io(e)),
    }
}

// A path through a regular file reports NotADirectory rather than NotFound
fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Lower-cased extension with its leading dot
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Check the allow-list
pub fn is_allowed(path: &Path) -> bool {
    extension(path).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type for an allow-listed extension
pub fn content_type(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        ".html" => "text/html; charset=utf-8",
        ".css" => "text/css; charset=utf-8",
        ".js" => "text/javascript; charset=utf-8",
        ".json" => "application/json",
        ".xml" => "text/xml; charset=utf-8",
        ".mp4" => "video/mp4",
        ".webp" => "image/webp",
        ".txt" => "text/plain; charset=utf-8",
        ".md" => "text/markdown; charset=utf-8",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".svg" => "image/svg+xml",
        ".ico" => "image/vnd.microsoft.icon",
        ".pdf" => "application/pdf",
        ".woff" => "font/woff",
        ".woff2" => "font/woff2",
        ".go" => "text/x-go; charset=utf-8",
        ".py" => "text/x-python; charset=utf-8",
        _ => return None,
    };
    Some(mime)
}
