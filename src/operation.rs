//! Pending provider-side operations.
//!
//! Mutating calls are queued by the provider and answered with one or more
//! status links. [`Operation`] keeps those links and polls them.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::ClcClient;
use crate::error::{ClcError, Result};

/// Default delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Status of a queued provider job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    NotStarted,
    Executing,
    Resumed,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl OperationStatus {
    /// Returns true once the job can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "notStarted",
            Self::Executing => "executing",
            Self::Resumed => "resumed",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One queued job and the resource it acts on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRequest {
    /// Job ID.
    pub id: String,
    /// Absolute status link, when the provider supplied one.
    pub href: Option<String>,
    /// Resource the job acts on (usually a server name).
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueuedItem {
    #[serde(default)]
    server: Option<String>,
    #[serde(default = "default_true")]
    is_queued: bool,
    #[serde(default)]
    links: Vec<StatusLink>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusLink {
    rel: String,
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: OperationStatus,
}

fn default_true() -> bool {
    true
}

/// Handle on the asynchronous provider jobs started by a mutation.
#[derive(Debug, Clone)]
pub struct Operation {
    client: ClcClient,
    requests: Vec<OperationRequest>,
    errors: Vec<String>,
}

impl Operation {
    /// Parse the body of a mutating call.
    ///
    /// Accepts a bare status link (`{"rel":"status","id":..}`), a queued item
    /// with `links`, or an array of queued items. Items the provider refused
    /// to queue are kept as errors.
    pub fn from_response(client: &ClcClient, response: &Value) -> Self {
        let mut requests = Vec::new();
        let mut errors = Vec::new();

        let items: Vec<&Value> = match response {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        for item in items {
            if let Ok(link) = serde_json::from_value::<StatusLink>(item.clone()) {
                if link.rel == "status" {
                    if let Some(id) = link.id {
                        requests.push(OperationRequest {
                            id,
                            href: link.href,
                            context: None,
                        });
                    }
                    continue;
                }
            }

            let Ok(queued) = serde_json::from_value::<QueuedItem>(item.clone()) else {
                continue;
            };

            if !queued.is_queued {
                let context = queued.server.as_deref().unwrap_or("request");
                let message = queued.error_message.as_deref().unwrap_or("not queued");
                tracing::warn!(context, message, "provider refused to queue operation");
                errors.push(format!("{context}: {message}"));
                continue;
            }

            for link in queued.links.into_iter().filter(|l| l.rel == "status") {
                if let Some(id) = link.id {
                    requests.push(OperationRequest {
                        id,
                        href: link.href,
                        context: queued.server.clone(),
                    });
                }
            }
        }

        Self {
            client: client.clone(),
            requests,
            errors,
        }
    }

    /// Queued jobs.
    pub fn requests(&self) -> &[OperationRequest] {
        &self.requests
    }

    /// Items the provider refused to queue.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns true when nothing was queued.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Poll every queued job once.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self) -> Result<Vec<(String, OperationStatus)>> {
        let mut statuses = Vec::with_capacity(self.requests.len());
        for request in &self.requests {
            statuses.push((request.id.clone(), self.poll(request).await?));
        }
        Ok(statuses)
    }

    /// Poll until every job is terminal.
    ///
    /// Returns the number of failed jobs, counting items the provider
    /// refused to queue.
    #[tracing::instrument(skip(self))]
    pub async fn wait_until_complete(&self, poll_interval: Duration) -> Result<usize> {
        let mut pending: Vec<&OperationRequest> = self.requests.iter().collect();
        let mut failed = self.errors.len();

        while !pending.is_empty() {
            let mut still_pending = Vec::new();
            for request in pending {
                match self.poll(request).await? {
                    OperationStatus::Succeeded => {}
                    OperationStatus::Failed => {
                        tracing::warn!(id = %request.id, "operation failed");
                        failed += 1;
                    }
                    _ => still_pending.push(request),
                }
            }

            pending = still_pending;
            if !pending.is_empty() {
                tokio::time::sleep(poll_interval).await;
            }
        }

        Ok(failed)
    }

    /// Like [`Operation::wait_until_complete`], but any failed job is an error.
    ///
    /// # Errors
    ///
    /// [`ClcError::OperationFailed`] when at least one job failed or was
    /// refused, plus any polling error.
    pub async fn wait_for_success(&self, poll_interval: Duration) -> Result<()> {
        let failed = self.wait_until_complete(poll_interval).await?;
        if failed > 0 {
            return Err(ClcError::OperationFailed {
                failed,
                total: self.requests.len() + self.errors.len(),
            });
        }
        Ok(())
    }

    async fn poll(&self, request: &OperationRequest) -> Result<OperationStatus> {
        let path = match &request.href {
            Some(href) => href.clone(),
            None => format!(
                "operations/{}/status/{}",
                self.client.alias().await?,
                request.id
            ),
        };

        let response = self.client.get(&path).await?;
        let status: StatusResponse = serde_json::from_value(response)?;
        tracing::debug!(id = %request.id, status = %status.status, "polled operation");
        Ok(status.status)
    }
}
