use std::process::Command;

use tracing::{debug, info};

use super::snapshot::{Payload, SinfoReport, SqueueReport};

/// Reasons for a failed refresh; the previous snapshot is kept in all cases
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (connection refused, DNS, etc.)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend responded with a non-2xx status code
    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    /// The backend reported a failure in the payload
    #[error("Server error: {0}")]
    Server(String),

    /// The response was not a valid payload
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to execute {exe:?}: {source}")]
    Spawn {
        exe: String,
        #[source]
        source: std::io::Error,
    },

    /// A local Slurm command exited with an error
    #[error("{exe:?} failed: {stderr}")]
    Command { exe: String, stderr: String },
}

/// Source of cluster snapshots
pub trait FetchService: std::fmt::Debug + Send + Sync {
    fn fetch(&self, host: &str) -> Result<Payload, FetchError>;
}

/// Fetches snapshots from the dashboard backend at `{base_url}/data/{host}`
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, host: &str) -> String {
        format!("{}/data/{}", self.base_url, host)
    }
}

impl FetchService for HttpFetcher {
    fn fetch(&self, host: &str) -> Result<Payload, FetchError> {
        let url = self.url(host);
        debug!(%url, "requesting snapshot");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_payload(&body)
    }
}

/// Parses a backend response, turning `status: "error"` into [`FetchError::Server`]
pub fn parse_payload(body: &str) -> Result<Payload, FetchError> {
    let payload: Payload = serde_json::from_str(body)?;
    if payload.is_error() {
        return Err(FetchError::Server(payload.message.unwrap_or_default()));
    }

    Ok(payload)
}

/// Collects snapshots by running `sinfo --json` and `squeue --json` on this machine
#[derive(Debug)]
pub struct CommandFetcher {
    sinfo: String,
    squeue: String,
}

impl CommandFetcher {
    pub fn new(sinfo: &str, squeue: &str) -> Self {
        Self {
            sinfo: sinfo.to_string(),
            squeue: squeue.to_string(),
        }
    }

    fn run(exe: &str) -> Result<Vec<u8>, FetchError> {
        let output = Command::new(exe)
            .arg("--json")
            .output()
            .map_err(|source| FetchError::Spawn {
                exe: exe.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(FetchError::Command {
                exe: exe.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

impl FetchService for CommandFetcher {
    fn fetch(&self, host: &str) -> Result<Payload, FetchError> {
        info!(host, "collecting snapshot from local Slurm commands");
        let sinfo: SinfoReport = serde_json::from_slice(&Self::run(&self.sinfo)?)?;
        let squeue: SqueueReport = serde_json::from_slice(&Self::run(&self.squeue)?)?;

        Ok(Payload {
            status: "success".to_string(),
            message: None,
            host: Some(host.to_string()),
            squeue,
            sinfo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_url() {
        assert_eq!(
            HttpFetcher::new("http://127.0.0.1:5001/").url("hpc"),
            "http://127.0.0.1:5001/data/hpc"
        );
        assert_eq!(
            HttpFetcher::new("http://localhost").url("cluster-a"),
            "http://localhost/data/cluster-a"
        );
    }

    #[test]
    fn test_parse_payload() {
        let payload = parse_payload(r#"{"status": "success", "squeue": {"jobs": []}}"#).unwrap();
        assert!(payload.squeue.jobs.is_empty());
    }

    #[test]
    fn test_parse_error_payload() {
        let result = parse_payload(r#"{"status": "error", "message": "Authentication failed."}"#);
        assert_matches!(result, Err(FetchError::Server(message)) if message == "Authentication failed.");
    }

    #[test]
    fn test_parse_invalid_payload() {
        assert_matches!(parse_payload("<html>"), Err(FetchError::Decode(_)));
        assert_matches!(
            parse_payload(r#"{"sinfo": {"sinfo": "nope"}}"#),
            Err(FetchError::Decode(_))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::Server("boom".into()).to_string(),
            "Server error: boom"
        );
        assert_eq!(
            FetchError::Status {
                status: 502,
                body: String::new()
            }
            .to_string(),
            "HTTP error! status: 502"
        );
    }

    #[test]
    fn test_missing_command() {
        let fetcher = CommandFetcher::new("/nonexistent/sinfo", "/nonexistent/squeue");
        assert_matches!(fetcher.fetch("local"), Err(FetchError::Spawn { .. }));
    }

    #[test]
    fn test_http_connection_refused() {
        // Port 9 (discard) is not expected to serve HTTP
        let fetcher = HttpFetcher::new("http://127.0.0.1:9");
        assert_matches!(fetcher.fetch("hpc"), Err(FetchError::Request(_)));
    }
}
