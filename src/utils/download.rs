use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{IoContext, NvsError, Result};

const CHUNK_SIZE: usize = 32 * 1024;
// Archives are tens of megabytes, so the client-wide timeout is too tight here.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})";

/// Fetches a URL into a local file.
pub trait Downloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

pub fn build_client(settings: &Settings) -> Result<Client> {
    let timeout = Duration::from_secs(settings.timeout_secs.max(1));

    Client::builder()
        .user_agent(concat!("nvs/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(timeout)
        .timeout(timeout)
        .danger_accept_invalid_certs(settings.insecure)
        .build()
        .map_err(|e| NvsError::fetch(&settings.mirror, e))
}

pub struct HttpDownloader {
    client: Client,
    cancelled: Arc<AtomicBool>,
    show_progress: bool,
}

impl HttpDownloader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cancelled: Arc::new(AtomicBool::new(false)),
            show_progress: true,
        }
    }

    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Setting the returned flag stops an in-flight download after its current chunk.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        match total {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template(BAR_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                bar
            }
            None => ProgressBar::new_spinner(),
        }
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Downloading {}", url);

        let mut response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .map_err(|e| NvsError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NvsError::fetch(url, format!("HTTP {status}")));
        }

        let bar = self.progress_bar(response.content_length());
        let mut file = File::create(dest).at("create", dest)?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut written: u64 = 0;

        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                bar.abandon();
                return Err(NvsError::Cancelled(url.to_string()));
            }

            let n = response.read(&mut buf).map_err(|e| NvsError::fetch(url, e))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).at("write", dest)?;
            written += n as u64;
            bar.inc(n as u64);
        }

        file.flush().at("flush", dest)?;
        bar.finish_and_clear();
        debug!("Downloaded {} bytes to {}", written, dest.display());

        Ok(())
    }
}
