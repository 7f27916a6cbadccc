use log::debug;
use reqwest::{
    Client, RequestBuilder,
    header::{self, HeaderValue},
};

use crate::{
    endpoint::Endpoint,
    job::JobHandle,
    request::RequestBody,
    transport::{RawResponse, Transport, TransportFuture},
};

pub const DEFAULT_BASE_URL: &str = "https://api.bfl.ml";

#[derive(Clone)]
pub struct HttpTransport {
    api_key: String,
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn status_request(&self, handle: &JobHandle) -> RequestBuilder {
        match &handle.polling_url {
            Some(url) => self.client.get(url),
            None => self
                .client
                .get(format!("{}/v1/get_result", self.base_url))
                .query(&[("id", &handle.id)]),
        }
    }
}

async fn into_raw(resp: reqwest::Response) -> Result<RawResponse, reqwest::Error> {
    let status = resp.status().as_u16();
    let body = resp.bytes().await?;
    Ok(RawResponse { status, body })
}

impl Transport for HttpTransport {
    fn submit<'a>(&'a self, endpoint: Endpoint, body: &'a RequestBody<'a>) -> TransportFuture<'a> {
        Box::pin(async move {
            let url = format!("{}{}", self.base_url, endpoint.path());
            debug!("Submitting to {url}");
            let resp = self
                .client
                .post(url)
                .header(header::ACCEPT, HeaderValue::from_static("application/json"))
                .header("x-key", &self.api_key)
                .json(body)
                .send()
                .await?;
            Ok(into_raw(resp).await?)
        })
    }

    fn status<'a>(&'a self, handle: &'a JobHandle) -> TransportFuture<'a> {
        Box::pin(async move {
            let resp = self
                .status_request(handle)
                .header(header::ACCEPT, HeaderValue::from_static("application/json"))
                .header("x-key", &self.api_key)
                .send()
                .await?;
            Ok(into_raw(resp).await?)
        })
    }

    fn download<'a>(&'a self, locator: &'a str) -> TransportFuture<'a> {
        Box::pin(async move {
            let resp = self.client.get(locator).send().await?;
            Ok(into_raw(resp).await?)
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn handle(id: &str, polling_url: Option<&str>) -> JobHandle {
        JobHandle {
            id: id.into(),
            polling_url: polling_url.map(String::from),
        }
    }

    fn status_url(t: &HttpTransport, handle: &JobHandle) -> String {
        t.status_request(handle).build().unwrap().url().to_string()
    }

    #[test]
    fn status_url_falls_back_to_get_result() {
        let t = HttpTransport::with_base_url("key".into(), "https://api.example.test/");
        assert_eq!(
            status_url(&t, &handle("abc-123", None)),
            "https://api.example.test/v1/get_result?id=abc-123"
        );
    }

    #[test]
    fn job_id_is_escaped_in_query() {
        let t = HttpTransport::with_base_url("key".into(), "https://api.example.test");
        assert_eq!(
            status_url(&t, &handle("a b&c=d", None)),
            "https://api.example.test/v1/get_result?id=a+b%26c%3Dd"
        );
    }

    #[test]
    fn status_url_prefers_polling_url() {
        let t = HttpTransport::new("key".into());
        assert_eq!(t.base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            status_url(
                &t,
                &handle("abc-123", Some("https://eu.example.test/v1/get_result?id=abc-123"))
            ),
            "https://eu.example.test/v1/get_result?id=abc-123"
        );
    }
}
