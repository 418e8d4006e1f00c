use crate::http::error::HttpError;
use reqwest::{Client, header};
use std::time::Duration;
use tracing::debug;

const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEndpoint {
    pub url: String,
    pub timeout: Duration,
}

/// Posts JSON documents to one scoring endpoint.
#[derive(Debug, Clone)]
pub struct HttpScoringClient {
    client: Client,
    endpoint: HttpEndpoint,
}

impl HttpScoringClient {
    pub fn new(endpoint: HttpEndpoint) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(endpoint.timeout)
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn url(&self) -> &str {
        &self.endpoint.url
    }

    /// Sends `body` and returns the parsed JSON reply of a 2xx response.
    pub async fn post_json(&self, body: Vec<u8>) -> Result<serde_json::Value, HttpError> {
        let url = &self.endpoint.url;
        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(HttpError::Status {
                status: status.as_u16(),
                body: truncate(text),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.send_error(e))?;
        debug!(
            url = %url,
            status = status.as_u16(),
            bytes = bytes.len(),
            "Scoring response received"
        );
        serde_json::from_slice(&bytes).map_err(|e| HttpError::InvalidBody(e.to_string()))
    }

    fn send_error(&self, err: reqwest::Error) -> HttpError {
        let url = self.endpoint.url.clone();
        let message = err.to_string();
        if err.is_timeout() {
            HttpError::Timeout { url, message }
        } else if err.is_connect() {
            HttpError::Connect { url, message }
        } else {
            HttpError::Transport { url, message }
        }
    }
}

fn truncate(mut text: String) -> String {
    if text.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push('…');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(url: String, timeout: Duration) -> HttpScoringClient {
        HttpScoringClient::new(HttpEndpoint { url, timeout }).unwrap()
    }

    #[tokio::test]
    async fn posts_json_and_parses_reply() {
        let app = Router::new().route(
            "/score",
            post(|Json(body): Json<Value>| async move {
                let n = body["examples"].as_array().map_or(0, |a| a.len());
                Json(json!({ "results": vec![[[0.9, 0.1], [0.1, 0.9]]; n] }))
            }),
        );
        let base = serve(app).await;
        let client = client(format!("{base}/score"), Duration::from_secs(5));

        let body = serde_json::to_vec(&json!({"examples": [{"LOAN": 1000}]})).unwrap();
        let reply = client.post_json(body).await.unwrap();

        assert_eq!(reply["results"].as_array().unwrap().len(), 1);
        assert_eq!(reply["results"][0][0][0], json!(0.9));
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let app = Router::new().route(
            "/score",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "bad example") }),
        );
        let base = serve(app).await;
        let client = client(format!("{base}/score"), Duration::from_secs(5));

        let err = client.post_json(b"{}".to_vec()).await.unwrap_err();
        match err {
            HttpError::Status { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad example");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!HttpError::Status { status: 500, body: String::new() }.is_transport());
    }

    #[tokio::test]
    async fn non_json_reply_is_invalid_body() {
        let app = Router::new().route("/score", post(|| async { "not json" }));
        let base = serve(app).await;
        let client = client(format!("{base}/score"), Duration::from_secs(5));

        let err = client.post_json(b"{}".to_vec()).await.unwrap_err();
        assert!(matches!(err, HttpError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_transport() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(format!("http://{addr}/score"), Duration::from_secs(5));
        let err = client.post_json(b"{}".to_vec()).await.unwrap_err();

        assert!(err.is_transport(), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_reply_times_out() {
        let app = Router::new().route(
            "/score",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "results": [] }))
            }),
        );
        let base = serve(app).await;
        let client = client(format!("{base}/score"), Duration::from_millis(100));

        let err = client.post_json(b"{}".to_vec()).await.unwrap_err();
        assert!(matches!(err, HttpError::Timeout { .. }), "got {err:?}");
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let text = truncate("é".repeat(400));
        assert!(text.len() <= MAX_ERROR_BODY + '…'.len_utf8());
        assert!(text.ends_with('…'));
    }
}
