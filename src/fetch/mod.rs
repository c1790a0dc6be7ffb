// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page acquisition.
//!
//! An audit needs the HTML of a page as a browser would show it. The
//! [`PageFetcher`] trait is the seam; the implementations here cover plain
//! HTTP, a headless browser dump of the rendered DOM, and local files.

use crate::config::{Config, FetchMode};
use crate::error::FetchError;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Interval between checks on a running browser process
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Source of rendered HTML
pub trait PageFetcher {
    /// Return the page's HTML, or fail once `timeout` has elapsed
    fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

/// Parse and check an http(s) URL
pub fn parse_web_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Blocking HTTP GET. Returns the served HTML without executing scripts.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(8))
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let target = parse_web_url(url)?;
        info!("Fetching {}", target);

        let response = self
            .client
            .get(target.clone())
            .timeout(timeout)
            .send()
            .map_err(|e| timeout_or(e, url, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.text().map_err(|e| timeout_or(e, url, timeout))?;
        debug!("Fetched {} bytes from {}", body.len(), target);
        Ok(body)
    }
}

fn timeout_or(err: reqwest::Error, url: &str, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        FetchError::Http(err)
    }
}

/// Renders the page in a headless Chromium-compatible browser and returns
/// the serialized DOM after scripts have run.
#[derive(Debug, Clone)]
pub struct HeadlessFetcher {
    browser: String,
}

impl HeadlessFetcher {
    pub fn new(browser: &str) -> Self {
        Self {
            browser: browser.to_string(),
        }
    }

    fn command(&self, url: &Url, timeout: Duration) -> Command {
        let mut cmd = Command::new(&self.browser);
        cmd.arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg(format!("--timeout={}", timeout.as_millis()))
            .arg("--dump-dom")
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd
    }
}

impl PageFetcher for HeadlessFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let target = parse_web_url(url)?;
        info!("Rendering {} with {}", target, self.browser);

        let mut child = self
            .command(&target, timeout)
            .spawn()
            .map_err(|e| FetchError::Render(format!("failed to start {}: {}", self.browser, e)))?;

        // Drain stdout on a separate thread so a large DOM cannot fill the
        // pipe and stall the browser.
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| FetchError::Render("browser stdout unavailable".to_string()))?;
        let reader = std::thread::spawn(move || {
            let mut dom = String::new();
            stdout.read_to_string(&mut dom).map(|_| dom)
        });

        let start = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() >= timeout {
                warn!("Render of {} exceeded {}s, killing browser", target, timeout.as_secs());
                child.kill().ok();
                child.wait().ok();
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        let dom = reader
            .join()
            .map_err(|_| FetchError::Render("browser output reader panicked".to_string()))??;

        if !status.success() {
            return Err(FetchError::Render(format!(
                "{} exited with {}",
                self.browser, status
            )));
        }

        debug!("Rendered {} bytes from {}", dom.len(), target);
        Ok(dom)
    }
}

/// Reads HTML from disk. Accepts a plain path or a `file://` URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl PageFetcher for FileFetcher {
    fn fetch(&self, url: &str, _timeout: Duration) -> Result<String, FetchError> {
        let path = match Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "file" => {
                parsed.to_file_path().map_err(|_| FetchError::InvalidUrl {
                    url: url.to_string(),
                    reason: "not a local file path".to_string(),
                })?
            }
            _ => PathBuf::from(url),
        };
        info!("Reading {}", path.display());
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Build the fetcher selected by the configuration
pub fn fetcher_for(config: &Config) -> Result<Box<dyn PageFetcher>, FetchError> {
    Ok(match config.fetch.mode {
        FetchMode::Http => Box::new(HttpFetcher::new(&config.fetch.user_agent)?),
        FetchMode::Headless => Box::new(HeadlessFetcher::new(&config.fetch.browser)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_web_url_accepts_https() {
        let url = parse_web_url(" https://shop.example/products/shirt ").unwrap();
        assert_eq!(url.host_str(), Some("shop.example"));
    }

    #[test]
    fn test_parse_web_url_rejects_garbage() {
        assert!(matches!(
            parse_web_url("not a url"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_web_url("ftp://shop.example/file"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_http_fetcher_rejects_invalid_url_before_network() {
        let fetcher = HttpFetcher::new("crobot-test").unwrap();
        let err = fetcher.fetch("example", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_headless_missing_browser_is_render_error() {
        let fetcher = HeadlessFetcher::new("crobot-no-such-browser-binary");
        let err = fetcher
            .fetch("https://shop.example", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, FetchError::Render(_)));
    }

    /// Write an executable shell script standing in for the browser
    #[cfg(unix)]
    fn fake_browser(dir: &TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("browser.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn test_headless_render_killed_after_timeout() {
        let dir = TempDir::new().unwrap();
        let fetcher = HeadlessFetcher::new(&fake_browser(&dir, "exec sleep 10"));

        let start = Instant::now();
        let err = fetcher
            .fetch("https://shop.example", Duration::from_secs(1))
            .unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(3));
        match err {
            FetchError::Timeout { url, timeout } => {
                assert_eq!(url, "https://shop.example");
                assert_eq!(timeout, Duration::from_secs(1));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_headless_returns_dumped_dom() {
        let dir = TempDir::new().unwrap();
        let fetcher = HeadlessFetcher::new(&fake_browser(
            &dir,
            "echo '<html><body><h1>Rendered</h1></body></html>'",
        ));
        let dom = fetcher
            .fetch("https://shop.example", Duration::from_secs(5))
            .unwrap();
        assert_eq!(dom.trim(), "<html><body><h1>Rendered</h1></body></html>");
    }

    #[cfg(unix)]
    #[test]
    fn test_headless_nonzero_exit_is_render_error() {
        let dir = TempDir::new().unwrap();
        let fetcher = HeadlessFetcher::new(&fake_browser(&dir, "exit 3"));
        let err = fetcher
            .fetch("https://shop.example", Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, FetchError::Render(_)));
    }

    #[test]
    fn test_file_fetcher_reads_path_and_file_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<h1>Hi</h1>").unwrap();

        let by_path = FileFetcher.fetch(path.to_str().unwrap(), Duration::from_secs(1)).unwrap();
        assert_eq!(by_path, "<h1>Hi</h1>");

        let file_url = Url::from_file_path(&path).unwrap();
        let by_url = FileFetcher.fetch(file_url.as_str(), Duration::from_secs(1)).unwrap();
        assert_eq!(by_url, "<h1>Hi</h1>");
    }

    #[test]
    fn test_file_fetcher_missing_file() {
        let err = FileFetcher
            .fetch("/nonexistent/crobot/page.html", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }
}
