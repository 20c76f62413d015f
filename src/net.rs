//! Download-candidate selection and the blocking fetch primitive
//!
//! URL preference is architecture-aware: an entry tagged with the host
//! architecture wins, then the first untagged entry, then the first entry
//! outright. Downloads stream into a `.part` file that is renamed into
//! place only once the body is fully written.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;

use crate::error::{KegError, Result};
use crate::package::UrlEntry;

const USER_AGENT: &str = concat!("keg/", env!("CARGO_PKG_VERSION"));

/// Select the best download candidate for this host
///
/// Preference order: matching `arch` tag, untagged entry, first entry.
pub fn best_url(urls: &[UrlEntry]) -> Option<&UrlEntry> {
    if let Some(entry) = urls.iter().find(|u| u.arch().is_some_and(arch_matches)) {
        return Some(entry);
    }
    if let Some(entry) = urls.iter().find(|u| u.is_untagged()) {
        return Some(entry);
    }
    urls.first()
}

/// Whether an arch tag names the host architecture
fn arch_matches(tag: &str) -> bool {
    let host = std::env::consts::ARCH;
    if tag.eq_ignore_ascii_case(host) {
        return true;
    }
    // common manifest aliases
    matches!(
        (host, tag.to_ascii_lowercase().as_str()),
        ("x86_64", "amd64" | "x64") | ("aarch64", "arm64") | ("x86", "i686" | "386")
    )
}

/// Derive the cache filename from a URL's path tail
pub fn url_path_tail(url: &str) -> String {
    let stripped = url.split(['?', '#']).next().unwrap_or(url);
    let tail = stripped.rsplit('/').next().unwrap_or_default();
    if tail.is_empty() {
        "download".to_string()
    } else {
        tail.to_string()
    }
}

/// Fetch a URL into the destination directory
///
/// Returns the path of the downloaded file, named after the URL's path
/// tail. The caller is responsible for hash verification and retries.
pub fn fetch(url: &str, dest_dir: &Path) -> Result<PathBuf> {
    let client = build_client(url)?;
    let mut response = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(|e| KegError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let filename = url_path_tail(url);
    let target = dest_dir.join(&filename);
    let part = dest_dir.join(format!("{filename}.part"));

    let progress = download_bar(&filename, response.content_length());
    let mut file = fs::File::create(&part).map_err(|e| KegError::FileWriteFailed {
        path: part.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut buffer = [0u8; 65536];
    loop {
        let bytes_read = response.read(&mut buffer).map_err(|e| KegError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read])
            .map_err(|e| KegError::FileWriteFailed {
                path: part.display().to_string(),
                reason: e.to_string(),
            })?;
        progress.inc(bytes_read as u64);
    }
    progress.finish_and_clear();
    drop(file);

    fs::rename(&part, &target).map_err(|e| KegError::FileWriteFailed {
        path: target.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(target)
}

fn build_client(url: &str) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| KegError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

fn download_bar(filename: &str, total: Option<u64>) -> ProgressBar {
    let bar = match total {
        Some(len) => {
            let style = ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            let bar = ProgressBar::new(len);
            bar.set_style(style);
            bar
        }
        None => ProgressBar::new_spinner(),
    };
    bar.set_message(filename.to_string());
    bar
}
