//! Artifact download endpoint

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;

/// GET /api/download/:filename - Serve a generated artifact as an attachment
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse> {
    if !is_plain_file_name(&filename) {
        return Err(Error::Validation(format!("invalid file name: {}", filename)));
    }

    let path = state.config().storage.outputs_dir.join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::not_found(format!("No artifact named {}", filename)));
        }
        Err(e) => return Err(e.into()),
    };

    let content_type = if filename.to_ascii_lowercase().ends_with(".txt") {
        "text/plain; charset=utf-8"
    } else {
        "application/octet-stream"
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}

/// A bare file name: no separators, no parent references, no quotes
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\', '"'])
        && !name.contains("..")
        && !name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("Flood_cover_20240101_093000.txt"));
        assert!(!is_plain_file_name("../secret.txt"));
        assert!(!is_plain_file_name("a/b.txt"));
        assert!(!is_plain_file_name("a\\b.txt"));
        assert!(!is_plain_file_name(".hidden"));
        assert!(!is_plain_file_name(""));
    }
}
