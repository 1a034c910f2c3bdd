use crate::{prelude::*, Error};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct ErrorData {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default, alias = "error")]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    pub client: Client,
    pub base_url: String,
}

async fn parse_response(response: Response) -> Result<String> {
    let status_code = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| Error::NetworkError(e.to_string()))?;

    if status_code < 400 {
        return Ok(text);
    }
    Err(status_error(status_code, text))
}

fn status_error(status_code: u16, text: String) -> Error {
    let detail = match serde_json::from_str::<ErrorData>(&text) {
        Ok(ErrorData {
            code,
            message: Some(message),
        }) => match code {
            Some(code) => format!("{message} (code {code})"),
            None => message,
        },
        _ => text,
    };
    Error::NetworkError(format!("HTTP {status_code}: {detail}"))
}

impl HttpClient {
    pub fn new(client: Option<Client>, base_url: impl Into<String>) -> Self {
        HttpClient {
            client: client.unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn post(&self, url_path: &str, data: String) -> Result<String> {
        let full_url = format!("{}{url_path}", self.base_url);
        let request = self
            .client
            .post(full_url)
            .header("Content-Type", "application/json")
            .body(data)
            .build()
            .map_err(|e| Error::NetworkError(e.to_string()))?;
        let result = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::NetworkError(e.to_string()))?;
        parse_response(result).await
    }

    /// `Ok(None)` on 404.
    pub async fn get(&self, url_path: &str) -> Result<Option<String>> {
        let full_url = format!("{}{url_path}", self.base_url);
        let result = self
            .client
            .get(full_url)
            .send()
            .await
            .map_err(|e| Error::NetworkError(e.to_string()))?;
        if result.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_response(result).await.map(Some)
    }
}
