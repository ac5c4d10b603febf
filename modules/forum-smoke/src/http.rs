use std::fmt;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde::Serialize;
use tracing::{info, warn};

use forum_common::{ForumAdminError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_PROBE_EMAIL: &str = "smoke-test@example.com";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct ResendVerificationRequest<'a> {
    email: &'a str,
}

/// One endpoint to exercise.
#[derive(Debug, Clone)]
pub struct Check {
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub body: Option<serde_json::Value>,
}

impl Check {
    pub fn get(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            method: Method::GET,
            path,
            body: None,
        }
    }

    pub fn post(name: &'static str, path: &'static str, body: serde_json::Value) -> Self {
        Self {
            name,
            method: Method::POST,
            path,
            body: Some(body),
        }
    }
}

/// The endpoints every deployment should answer without a 5xx.
pub fn default_checks(probe_email: &str) -> Vec<Check> {
    let resend = serde_json::json!({ "email": probe_email });

    vec![
        Check::get("health", "/api/health"),
        Check::get("auth status", "/api/auth/status"),
        Check::get("forum posts", "/api/forum/posts"),
        Check::post("resend verification", "/api/auth/resend-verification", resend),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Any status below 500. 4xx is expected for anonymous requests.
    Responded(u16),
    ServerError(u16),
    /// Connection refused, DNS failure, timeout.
    Unreachable(String),
}

impl CheckOutcome {
    pub fn from_status(status: u16) -> Self {
        if status >= 500 {
            Self::ServerError(status)
        } else {
            Self::Responded(status)
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, Self::Responded(_))
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Responded(s) => write!(f, "PASS ({s})"),
            Self::ServerError(s) => write!(f, "FAIL ({s})"),
            Self::Unreachable(e) => write!(f, "FAIL ({e})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub outcome: CheckOutcome,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
pub struct SmokeReport {
    pub results: Vec<CheckResult>,
}

impl SmokeReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Process exit code: 0 when every check passed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for SmokeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.results {
            writeln!(
                f,
                "  {:<6} {:<36} {:<22} {}ms",
                r.method.as_str(),
                r.path,
                r.outcome.to_string(),
                r.elapsed.as_millis()
            )?;
        }
        write!(f, "\n{} passed, {} failed", self.passed(), self.failed())
    }
}

pub struct SmokeClient {
    http: reqwest::Client,
    base_url: String,
}

impl SmokeClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForumAdminError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn run_check(&self, check: &Check) -> CheckResult {
        let url = format!("{}{}", self.base_url, check.path);
        let started = Instant::now();

        let mut req = self.http.request(check.method.clone(), &url);
        if let Some(body) = &check.body {
            req = req.json(body);
        }

        let outcome = match req.send().await {
            Ok(resp) => CheckOutcome::from_status(resp.status().as_u16()),
            Err(e) => CheckOutcome::Unreachable(describe_transport_error(&e)),
        };
        let elapsed = started.elapsed();

        if outcome.passed() {
            info!(check = check.name, url = url.as_str(), %outcome, "Check passed");
        } else {
            warn!(check = check.name, url = url.as_str(), %outcome, "Check failed");
        }

        CheckResult {
            name: check.name,
            method: check.method.clone(),
            path: check.path,
            outcome,
            elapsed,
        }
    }

    /// Run checks one after another.
    pub async fn run_all(&self, checks: &[Check]) -> SmokeReport {
        let mut report = SmokeReport::default();
        for check in checks {
            report.results.push(self.run_check(check).await);
        }
        report
    }

    /// POST the resend-verification endpoint and return status and body.
    pub async fn resend_verification(&self, email: &str) -> Result<(u16, String)> {
        let url = format!("{}/api/auth/resend-verification", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&ResendVerificationRequest { email })
            .send()
            .await
            .map_err(|e| ForumAdminError::Http(describe_transport_error(&e)))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| {
            ForumAdminError::Http(format!("{status} response, body unreadable: {e}"))
        })?;
        Ok((status, body))
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "timed out".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else {
        e.to_string()
    }
}
