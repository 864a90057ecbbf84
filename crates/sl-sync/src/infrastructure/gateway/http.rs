use crate::application::ports::TrackingGateway;
use crate::domain::RemoteOutcome;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sl_core::{ContactInfo, TrackingEntry, TrackingNumber};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteAck {
    #[serde(default)]
    ok: bool,
}

/// [`TrackingGateway`] over the JSON API served by `sl-api`.
#[derive(Clone)]
pub struct HttpTrackingGateway {
    client: Client,
    base: Url,
}

impl HttpTrackingGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base = Url::parse(base_url).map_err(|err| {
            AppError::Configuration(format!("invalid api base url {base_url}: {err}"))
        })?;
        if base.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "api base url {base_url} cannot carry a path"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Configuration(err.to_string()))?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> RemoteOutcome<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(operation, error = %err, "remote store unreachable");
                return RemoteOutcome::Unreachable(err.to_string());
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<T>().await {
                Ok(value) => RemoteOutcome::Data(value),
                Err(err) => {
                    tracing::warn!(operation, error = %err, "remote store returned an unreadable body");
                    RemoteOutcome::Unreachable(format!("invalid response: {err}"))
                }
            };
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.to_string());

        match status {
            StatusCode::NOT_FOUND => RemoteOutcome::NotFound,
            StatusCode::CONFLICT => {
                tracing::warn!(operation, %message, "remote store reported a conflict");
                RemoteOutcome::Conflict(message)
            }
            status if status.is_client_error() => {
                tracing::warn!(operation, %status, %message, "remote store rejected request");
                RemoteOutcome::Rejected(message)
            }
            status => {
                tracing::warn!(operation, %status, %message, "remote store failed");
                RemoteOutcome::Unreachable(format!("{status}: {message}"))
            }
        }
    }
}

#[async_trait]
impl TrackingGateway for HttpTrackingGateway {
    async fn list_all(&self) -> RemoteOutcome<Vec<TrackingEntry>> {
        let request = self.client.get(self.endpoint(&["tracking"]));
        self.send(request, "list_all").await
    }

    async fn get_one(&self, number: &TrackingNumber) -> RemoteOutcome<TrackingEntry> {
        let request = self
            .client
            .get(self.endpoint(&["tracking", number.as_str()]));
        self.send(request, "get_one").await
    }

    async fn upsert(&self, entry: &TrackingEntry) -> RemoteOutcome<TrackingEntry> {
        let request = self.client.post(self.endpoint(&["tracking"])).json(entry);
        self.send(request, "upsert").await
    }

    async fn delete(&self, number: &TrackingNumber) -> RemoteOutcome<()> {
        let request = self
            .client
            .delete(self.endpoint(&["tracking", number.as_str()]));
        match self.send::<DeleteAck>(request, "delete").await {
            RemoteOutcome::Data(DeleteAck { ok: true }) => RemoteOutcome::Data(()),
            RemoteOutcome::Data(DeleteAck { ok: false }) => {
                RemoteOutcome::Rejected("delete not acknowledged".to_string())
            }
            other => other.map(|_| ()),
        }
    }

    async fn get_contact(&self) -> RemoteOutcome<ContactInfo> {
        let request = self.client.get(self.endpoint(&["contact"]));
        self.send(request, "get_contact").await
    }

    async fn save_contact(&self, info: &ContactInfo) -> RemoteOutcome<ContactInfo> {
        let request = self.client.post(self.endpoint(&["contact"])).json(info);
        self.send(request, "save_contact").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_extend_base_path() {
        let gateway =
            HttpTrackingGateway::new("http://127.0.0.1:4000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            gateway.endpoint(&["tracking", "AB 1/2"]).as_str(),
            "http://127.0.0.1:4000/api/tracking/AB%201%2F2"
        );
        assert_eq!(
            gateway.endpoint(&["contact"]).as_str(),
            "http://127.0.0.1:4000/api/contact"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            HttpTrackingGateway::new("not a url", Duration::from_secs(1)),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            HttpTrackingGateway::new("mailto:ops@example.com", Duration::from_secs(1)),
            Err(AppError::Configuration(_))
        ));
    }
}
