//! Static file serving module
//!
//! Resolves request paths under the base directory, loads files, and builds
//! responses with MIME type and Range support.

use crate::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::{self, mime, path, range::RangeOutcome};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// The directory every served file must live under
#[derive(Debug, Clone)]
pub struct StaticRoot {
    base: PathBuf,
    index_file: String,
}

/// A file read from disk, ready to be sent
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub content: Bytes,
    pub content_type: &'static str,
}

impl StaticRoot {
    pub fn new(base: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            index_file: index_file.into(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve a relative path to a regular file inside the base directory.
    ///
    /// Both sides are canonicalized, so symlinks pointing outside the base
    /// are caught as well as `..` components.
    async fn resolve(&self, relative: &Path, request_path: &str) -> Result<PathBuf, ServeError> {
        let base = fs::canonicalize(&self.base)
            .await
            .map_err(|_| ServeError::not_found(request_path))?;

        // File not found is common (404), no need to log at warning level
        let resolved = fs::canonicalize(base.join(relative))
            .await
            .map_err(|_| ServeError::not_found(request_path))?;

        if !resolved.starts_with(&base) {
            return Err(ServeError::Forbidden {
                path: request_path.to_string(),
                resolved,
            });
        }

        let meta = fs::metadata(&resolved)
            .await
            .map_err(|_| ServeError::not_found(request_path))?;
        if !meta.is_file() {
            return Err(ServeError::not_found(request_path));
        }

        Ok(resolved)
    }

    /// Resolve and read a file
    async fn load(&self, relative: &Path, request_path: &str) -> Result<LoadedFile, ServeError> {
        let file_path = self.resolve(relative, request_path).await?;

        let content = fs::read(&file_path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ServeError::not_found(request_path)
            } else {
                ServeError::Io {
                    path: file_path.clone(),
                    source,
                }
            }
        })?;

        Ok(LoadedFile {
            content_type: mime::content_type_for(&file_path),
            content: Bytes::from(content),
            path: file_path,
        })
    }
}

/// Serve the index document for `/`
pub async fn serve_root(root: &StaticRoot) -> Result<LoadedFile, ServeError> {
    let relative = path::to_relative_path(&root.index_file)
        .ok_or_else(|| ServeError::not_found("/"))?;
    root.load(&relative, "/").await
}

/// Serve any other path, relative to the base directory
///
/// A trailing slash never names a file, so `/index.html/` is a 404.
pub async fn serve_static(root: &StaticRoot, request_path: &str) -> Result<LoadedFile, ServeError> {
    let relative = path::to_file_path(request_path)
        .ok_or_else(|| ServeError::not_found(request_path))?;
    root.load(&relative, request_path).await
}

/// Build static file response with Range support
pub fn build_static_file_response(
    ctx: &RequestContext<'_>,
    file: &LoadedFile,
) -> Response<Full<Bytes>> {
    let total_size = file.content.len();

    match http::parse_range_header(ctx.range_header.as_deref(), total_size) {
        RangeOutcome::Partial(range) => http::response::build_partial_response(
            file.content.slice(range.start..=range.end),
            file.content_type,
            range.start,
            range.end,
            total_size,
            ctx.is_head,
        ),
        RangeOutcome::Unsatisfiable => http::build_416_response(total_size),
        RangeOutcome::Full => http::response::build_file_response(
            file.content.clone(),
            file.content_type,
            ctx.is_head,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::TempDir;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

    /// Layout: `<tmp>/src/index.html`, `<tmp>/src/assets/logo.png`, `<tmp>/secret.txt`
    fn site() -> (TempDir, StaticRoot) {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("src");
        stdfs::create_dir_all(base.join("assets")).unwrap();
        stdfs::write(base.join("index.html"), "<h1>hi</h1>").unwrap();
        stdfs::write(base.join("assets/logo.png"), PNG_BYTES).unwrap();
        stdfs::write(tmp.path().join("secret.txt"), "top secret").unwrap();
        let root = StaticRoot::new(base, "index.html");
        (tmp, root)
    }

    #[tokio::test]
    async fn test_serve_root() {
        let (_tmp, root) = site();
        let file = serve_root(&root).await.unwrap();
        assert_eq!(&file.content[..], b"<h1>hi</h1>");
        assert!(file.content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_serve_root_missing_index() {
        let (_tmp, root) = site();
        stdfs::remove_file(root.base().join("index.html")).unwrap();
        let err = serve_root(&root).await.unwrap_err();
        assert!(matches!(err, ServeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_serve_static_binary() {
        let (_tmp, root) = site();
        let file = serve_static(&root, "/assets/logo.png").await.unwrap();
        assert_eq!(&file.content[..], PNG_BYTES);
        assert_eq!(file.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_serve_static_missing() {
        let (_tmp, root) = site();
        let err = serve_static(&root, "/missing.js").await.unwrap_err();
        assert!(matches!(err, ServeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_directory_is_not_found() {
        let (_tmp, root) = site();
        let err = serve_static(&root, "/assets/").await.unwrap_err();
        assert!(matches!(err, ServeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_trailing_slash_after_file_is_not_found() {
        let (_tmp, root) = site();
        for path in ["/index.html/", "/assets/logo.png/", "/assets/logo.png/."] {
            let err = serve_static(&root, path).await.unwrap_err();
            assert!(matches!(err, ServeError::NotFound { .. }), "{path}");
        }
    }

    #[tokio::test]
    async fn test_traversal_is_not_found() {
        let (_tmp, root) = site();
        for path in ["/../secret.txt", "/assets/../../secret.txt", "/%2e%2e/secret.txt"] {
            let err = serve_static(&root, path).await.unwrap_err();
            assert_eq!(err.status(), hyper::StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_blocked() {
        let (tmp, root) = site();
        std::os::unix::fs::symlink(tmp.path().join("secret.txt"), root.base().join("leak.txt"))
            .unwrap();
        let err = serve_static(&root, "/leak.txt").await.unwrap_err();
        assert!(matches!(err, ServeError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_missing_base_dir() {
        let tmp = TempDir::new().unwrap();
        let root = StaticRoot::new(tmp.path().join("nope"), "index.html");
        assert!(matches!(
            serve_root(&root).await.unwrap_err(),
            ServeError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_repeated_reads_identical() {
        let (_tmp, root) = site();
        let first = serve_static(&root, "/assets/logo.png").await.unwrap();
        let second = serve_static(&root, "/assets/logo.png").await.unwrap();
        assert_eq!(first.content, second.content);
    }
}
