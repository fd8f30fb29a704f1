//! Infrastructure implementation of the `Downloader` port over `ureq`.

use std::io::Write;

use anyhow::{Context, Result};

use crate::application::ports::Downloader;

/// Blocking HTTP download run on the blocking thread pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<tempfile::TempPath> {
        let url = url.to_string();
        tokio::task::spawn_blocking(move || fetch(&url))
            .await
            .context("download task panicked")?
    }
}

fn fetch(url: &str) -> Result<tempfile::TempPath> {
    tracing::debug!(url, "downloading");
    let response = match ureq::get(url).set("User-Agent", "setup-warp").call() {
        Ok(r) => r,
        Err(ureq::Error::Status(code, _)) => anyhow::bail!("Download of {url} failed: HTTP {code}"),
        Err(e) => return Err(e).with_context(|| format!("downloading {url}")),
    };

    let mut file = tempfile::Builder::new()
        .prefix("setup-warp-")
        .suffix(&suffix_of(url))
        .tempfile()
        .context("creating download file")?;
    std::io::copy(&mut response.into_reader(), &mut file)
        .with_context(|| format!("writing {url} to disk"))?;
    file.flush().context("flushing download file")?;
    Ok(file.into_temp_path())
}

/// Keep the file extension; `installer` and `certutil` look at it.
fn suffix_of(url: &str) -> String {
    url.rsplit('/')
        .next()
        .and_then(|name| name.rfind('.').map(|i| name[i..].to_string()))
        .unwrap_or_default()
}
