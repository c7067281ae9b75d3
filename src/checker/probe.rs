// src/checker/probe.rs
// =============================================================================
// This module checks whether a URL answers, one request at a time.
//
// Key functionality:
// - A `Probe` trait: "GET this URL, give me a status code"
// - `HttpProbe`, the real implementation on top of reqwest
// - Network failures (timeouts, DNS, TLS, refused connections) never escape
//   as errors: they become 502 Bad Gateway so callers always compare numbers
//
// Why a blocking call over an async client?
// - The pipeline is strictly sequential: every caller waits for the answer
//   before doing anything else
// - So the probe owns a small current-thread tokio runtime and blocks on
//   each request; callers just see a plain function call with a timeout
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::runtime::Runtime;
use tracing::debug;

/// Status reported when no HTTP response was received at all.
pub const NETWORK_FAILURE_STATUS: u16 = 502;

/// Issues a single HTTP GET and reports the status code.
///
/// Implementations must not panic or return errors for network problems;
/// those map to [`NETWORK_FAILURE_STATUS`].
pub trait Probe {
    fn get(&self, url: &str, timeout: Duration) -> u16;
}

/// [`Probe`] backed by a reqwest client.
pub struct HttpProbe {
    runtime: Runtime,
    client: Client,
}

impl HttpProbe {
    // Builds the client and the runtime that drives it
    //
    // Redirects are followed (up to 5) so moved pages count as reachable.
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start the HTTP runtime")?;

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("dox/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { runtime, client })
    }
}

impl Probe for HttpProbe {
    fn get(&self, url: &str, timeout: Duration) -> u16 {
        self.runtime.block_on(async {
            match self.client.get(url).timeout(timeout).send().await {
                Ok(response) => response.status().as_u16(),
                Err(e) => {
                    debug!("Probe of {} failed: {} ({})", url, describe_failure(&e), e);
                    NETWORK_FAILURE_STATUS
                }
            }
        })
    }
}

// Puts a name on the ways a request can fail without a response
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn describe_failure(error: &reqwest::Error) -> &'static str {
    let error_string = error.to_string().to_lowercase();

    if error.is_timeout() {
        "request timed out"
    } else if error.is_redirect() {
        "too many redirects"
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "could not resolve hostname"
        } else {
            "connection failed"
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error"
    } else {
        "request error"
    }
}

/// Whether a status code counts as the link being reachable.
pub fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}
