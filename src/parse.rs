//! Response parsing helpers
//!
//! Small helpers for consuming a response body as text or typed JSON while
//! keeping the status and headers around for inspection.

use crate::error::Result;
use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// A parsed response body plus the response metadata it came from
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    /// The parsed body
    pub data: T,
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
}

/// Consume a response as plain text
pub async fn text(response: Response) -> Result<Parsed<String>> {
    let status = response.status();
    let headers = response.headers().clone();
    let data = response.text().await?;
    Ok(Parsed {
        data,
        status,
        headers,
    })
}

/// Consume a response as typed JSON
pub async fn json<T: DeserializeOwned>(response: Response) -> Result<Parsed<T>> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;
    let data = serde_json::from_str(&body)?;
    Ok(Parsed {
        data,
        status,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u64,
        name: String,
    }

    #[tokio::test]
    async fn test_json_typed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1, "name": "Alice"
            })))
            .mount(&mock_server)
            .await;

        let response = reqwest::get(format!("{}/user", mock_server.uri()))
            .await
            .unwrap();
        let parsed: Parsed<User> = json(response).await.unwrap();

        assert_eq!(parsed.status, StatusCode::OK);
        assert_eq!(
            parsed.data,
            User {
                id: 1,
                name: "Alice".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_json_invalid_body_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/bad"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let response = reqwest::get(format!("{}/bad", mock_server.uri()))
            .await
            .unwrap();
        let err = json::<User>(response).await.unwrap_err();

        assert!(matches!(err, crate::Error::Json(_)));
    }

    #[tokio::test]
    async fn test_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&mock_server)
            .await;

        let response = reqwest::get(format!("{}/plain", mock_server.uri()))
            .await
            .unwrap();
        let parsed = text(response).await.unwrap();

        assert_eq!(parsed.data, "hello");
        assert_eq!(parsed.status, StatusCode::OK);
    }
}
