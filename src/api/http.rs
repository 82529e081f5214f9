use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, COOKIE},
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::RequestId;
use crate::model::{Participation, Vote};

use super::{Submission, VoteApi};

/// Structured error code the backend uses for "no such vote".
const NOT_FOUND_CODE: i64 = 404;

/// Successful responses wrap their payload in `{ "result": ... }`.
#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

/// [`VoteApi`] over the backend's REST interface.
#[derive(Debug, Clone)]
pub struct HttpVoteApi {
    client: Client,
    base_url: String,
}

impl HttpVoteApi {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = config.session_cookie() {
            let mut value = HeaderValue::from_str(cookie)?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request and return the response status and body, logging both ends.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Submission>,
    ) -> Result<(StatusCode, Vec<u8>)> {
        let url = self.url(path);
        let id = RequestId::next();
        id.log_request(&method, &url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        id.log_response(status, &url);

        let bytes = response.bytes().await?;
        Ok((status, bytes.to_vec()))
    }
}

#[async_trait]
impl VoteApi for HttpVoteApi {
    async fn vote(&self, code: &str) -> Result<Vote> {
        let (status, body) = self.send(Method::GET, &format!("votes/{code}"), None).await?;
        let mut vote: Vote = decode(status, &body)?;
        if vote.code.is_empty() {
            vote.code = code.to_string();
        }
        Ok(vote)
    }

    async fn participation(&self, code: &str) -> Result<Participation> {
        let (status, body) = self
            .send(Method::GET, &format!("participant/{code}"), None)
            .await?;
        let result: Option<Value> = decode(status, &body)?;
        Ok(Participation::from_result(result))
    }

    async fn participate(&self, submission: &Submission) -> Result<()> {
        let (status, body) = self
            .send(Method::POST, "participant", Some(submission))
            .await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(decode_failure(status, &body))
        }
    }
}

/// Decode the payload of a response, or the error it carries.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    if !status.is_success() {
        return Err(decode_failure(status, body));
    }
    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    Ok(envelope.result)
}

/// Interpret an unsuccessful response. Only the body's `code` field marks a
/// missing resource; the HTTP status alone does not.
fn decode_failure(status: StatusCode, body: &[u8]) -> Error {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let code = parsed
        .as_ref()
        .and_then(|body| body.get("code"))
        .and_then(Value::as_i64);
    let message = parsed
        .as_ref()
        .and_then(|body| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

    if code == Some(NOT_FOUND_CODE) {
        Error::NotFound(message)
    } else {
        Error::Status(status, message)
    }
}
