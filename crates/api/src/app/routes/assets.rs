//! Static UI: `GET /` and `GET /static/*path`, served from the configured static dir.

use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::debug;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/*path", get(static_file))
}

pub async fn index(Extension(services): Extension<Arc<AppServices>>) -> Response {
    serve_file(&services.static_dir, &services.static_dir.join("index.html")).await
}

pub async fn static_file(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): Path<String>,
) -> Response {
    match join_relative(&services.static_dir, &path) {
        Some(file) => serve_file(&services.static_dir, &file).await,
        None => file_not_found(),
    }
}

/// Join `rel` onto `root`, refusing absolute paths and `..` segments.
fn join_relative(root: &FsPath, rel: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    for component in FsPath::new(rel.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => out.push(segment),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(out)
}

async fn serve_file(root: &FsPath, file: &FsPath) -> Response {
    // Symlinks may still point outside the root.
    let (Ok(root), Ok(file)) = (
        tokio::fs::canonicalize(root).await,
        tokio::fs::canonicalize(file).await,
    ) else {
        return file_not_found();
    };
    if !file.starts_with(&root) {
        return file_not_found();
    }

    match tokio::fs::read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        Err(e) => {
            debug!(path = %file.display(), error = %e, "static file unreadable");
            file_not_found()
        }
    }
}

fn content_type(path: &FsPath) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "text/plain; charset=utf-8",
    }
}

fn file_not_found() -> Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "file not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_paths_leaving_the_root() {
        let root = FsPath::new("/srv/static");
        assert_eq!(
            join_relative(root, "css/app.css"),
            Some(PathBuf::from("/srv/static/css/app.css"))
        );
        assert_eq!(join_relative(root, "./app.js"), Some(PathBuf::from("/srv/static/app.js")));
        assert_eq!(join_relative(root, "../secret"), None);
        assert_eq!(join_relative(root, "a/../../secret"), None);
    }

    #[test]
    fn picks_content_type_by_extension() {
        assert_eq!(content_type(FsPath::new("a.js")), "application/javascript; charset=utf-8");
        assert_eq!(content_type(FsPath::new("a.css")), "text/css; charset=utf-8");
        assert_eq!(content_type(FsPath::new("README")), "text/plain; charset=utf-8");
    }
}
