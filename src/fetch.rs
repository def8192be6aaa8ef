use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Response, Url};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::error::TabliteError;

/// A file written by [`download`]. The path is absolute; the byte count
/// is exactly what was written. The caller owns the destination directory
/// and its cleanup.
#[derive(Debug)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Download `url` into `dest_dir` with a single HTTP GET. No retries.
///
/// `dest_dir` must already exist and be a directory. The file name is
/// resolved in order: the Content-Disposition `filename` parameter, the
/// last non-empty URL path segment, `default_name`, a random name.
/// A partially written file is removed before any error is returned.
pub async fn download(
    url: &str,
    dest_dir: &Path,
    default_name: Option<&str>,
    timeout_secs: u64,
    token: &CancellationToken,
) -> Result<Downloaded, TabliteError> {
    if !dest_dir.is_dir() {
        return Err(TabliteError::NotADirectory {
            path: dest_dir.to_path_buf(),
        });
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| transport_error(url, e))?;

    let response = tokio::select! {
        _ = token.cancelled() => return Err(TabliteError::Cancelled),
        resp = client.get(url).send() => resp.map_err(|e| transport_error(url, e))?,
    };

    let status = response.status();
    if !status.is_success() {
        return Err(TabliteError::Download {
            url: url.to_string(),
            message: format!("unexpected HTTP status {status}"),
        });
    }

    let name = disposition_filename(&response)
        .or_else(|| url_filename(response.url()))
        .or_else(|| default_name.filter(|n| !n.is_empty()).map(str::to_string));

    let path = match name {
        Some(name) => dest_dir.join(name),
        None => random_path(dest_dir)?,
    };
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };

    match write_body(response, &path, url, token).await {
        Ok(bytes) => Ok(Downloaded { path, bytes }),
        Err(err) => {
            // No partial artifacts left behind.
            let _ = tokio::fs::remove_file(&path).await;
            Err(err)
        }
    }
}

async fn write_body(
    mut response: Response,
    path: &Path,
    url: &str,
    token: &CancellationToken,
) -> Result<u64, TabliteError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut bytes: u64 = 0;
    loop {
        let chunk = tokio::select! {
            _ = token.cancelled() => return Err(TabliteError::Cancelled),
            chunk = response.chunk() => chunk.map_err(|e| transport_error(url, e))?,
        };
        let Some(chunk) = chunk else { break };
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(bytes)
}

fn transport_error(url: &str, err: reqwest::Error) -> TabliteError {
    TabliteError::Download {
        url: url.to_string(),
        message: err.to_string(),
    }
}

/// The `filename` parameter of a Content-Disposition header, if present
/// and non-empty. Any path components are stripped.
fn disposition_filename(response: &Response) -> Option<String> {
    let raw = response.headers().get(CONTENT_DISPOSITION)?.to_str().ok()?;
    for part in raw.split(';') {
        let part = part.trim();
        if part.len() < "filename=".len() {
            continue;
        }
        let (key, value) = part.split_at("filename=".len());
        if !key.eq_ignore_ascii_case("filename=") {
            continue;
        }
        let name = sanitize_filename(value.trim().trim_matches('"'));
        if name.is_some() {
            return name;
        }
    }
    None
}

/// The last path segment of the URL, if the path is not empty and not
/// the root.
fn url_filename(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .and_then(sanitize_filename)
}

/// Reduce a candidate name to its final path component, discarding
/// anything that would escape the destination directory.
fn sanitize_filename(candidate: &str) -> Option<String> {
    Path::new(candidate)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

/// Last-resort destination: a randomly named file inside `dest_dir`.
fn random_path(dest_dir: &Path) -> Result<PathBuf, TabliteError> {
    let file = tempfile::Builder::new()
        .prefix("download-")
        .suffix(".sqlite")
        .tempfile_in(dest_dir)?;
    let (_, path) = file.keep().map_err(|e| TabliteError::Io(e.error))?;
    Ok(path)
}
