//! HTTP client for the event store API used by the dashboard.

use crate::database::models::EventResponse;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventClientError {
    /// Loading the collection failed.
    #[error("Failed to fetch events: {message}")]
    Fetch { message: String },

    /// Deleting one event failed.
    #[error("Failed to delete event {id}: {message}")]
    Delete { id: String, message: String },
}

pub type EventClientResult<T> = Result<T, EventClientError>;

#[async_trait]
pub trait EventStoreClient: Send + Sync {
    /// Fetches the full event collection in store order.
    async fn list_events(&self) -> EventClientResult<Vec<EventResponse>>;

    async fn delete_event(&self, id: &str) -> EventClientResult<()>;
}

pub struct HttpEventStoreClient {
    http_client: Client,
    base_url: Url,
}

impl HttpEventStoreClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Event store URL {base_url} cannot be used as a base");
        }

        let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// `{base}/api/events` or `{base}/api/events/{id}`, with the id encoded
    /// as one path segment.
    pub fn events_url(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "events"]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }
}

#[async_trait]
impl EventStoreClient for HttpEventStoreClient {
    async fn list_events(&self) -> EventClientResult<Vec<EventResponse>> {
        let fetch_error = |message: String| EventClientError::Fetch { message };

        let response = self
            .http_client
            .get(self.events_url(None))
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| fetch_error(e.to_string()))?;

        response
            .json::<Vec<EventResponse>>()
            .await
            .map_err(|e| fetch_error(format!("invalid response body: {e}")))
    }

    async fn delete_event(&self, id: &str) -> EventClientResult<()> {
        let delete_error = |message: String| EventClientError::Delete {
            id: id.to_string(),
            message,
        };

        self.http_client
            .delete(self.events_url(Some(id)))
            .send()
            .await
            .map_err(|e| delete_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| delete_error(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_preserves_server_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "evt-2", "title": "Later", "venue": "Hall", "date": "2025-06-01", "time": "", "description": ""},
                {"id": "evt-1", "title": "Sooner", "venue": "Hall", "date": "2025-01-01", "imageData": null}
            ])))
            .mount(&server)
            .await;

        let client = HttpEventStoreClient::new(&server.uri()).unwrap();
        let events = client.list_events().await.unwrap();

        let ids: Vec<&str> = events.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, vec!["evt-2", "evt-1"]);
        assert_eq!(events[1].time, None);
    }

    #[tokio::test]
    async fn test_list_failure_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = HttpEventStoreClient::new(&server.uri()).unwrap();
        let error = client.list_events().await.unwrap_err();
        assert!(matches!(error, EventClientError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_delete_hits_event_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/events/evt-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpEventStoreClient::new(&server.uri()).unwrap();
        client.delete_event("evt-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_rejection_is_a_delete_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HttpEventStoreClient::new(&server.uri()).unwrap();
        let error = client.delete_event("evt-9").await.unwrap_err();
        assert!(matches!(error, EventClientError::Delete { ref id, .. } if id == "evt-9"));
    }

    #[test]
    fn test_events_url_encodes_id() {
        let client = HttpEventStoreClient::new("http://localhost:3000/").unwrap();
        assert_eq!(
            client.events_url(None).as_str(),
            "http://localhost:3000/api/events"
        );
        assert_eq!(
            client.events_url(Some("a b")).as_str(),
            "http://localhost:3000/api/events/a%20b"
        );
    }
}
