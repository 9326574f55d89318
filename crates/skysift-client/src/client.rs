//! HTTP implementation of the gateway, fetcher and language source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use skysift_core::{PostRecord, PostReference, TransportError};
use skysift_query::CompiledRequest;

use crate::config::ClientConfig;
use crate::facets::{LanguageFacets, LanguageSource};
use crate::gateway::{FeedSkeleton, SearchGateway};
use crate::posts::{GetPostsResponse, MAX_URIS_PER_CALL, PostFetcher};
use crate::{Error, Result};

const GET_POSTS_METHOD: &str = "xrpc/app.bsky.feed.getPosts";

/// Talks to the search index and the AppView over HTTP.
#[derive(Debug, Clone)]
pub struct SkysiftClient {
    http: reqwest::Client,
    index_url: String,
    appview_url: String,
}

impl SkysiftClient {
    /// Build a client from configuration.
    ///
    /// Fails if either base URL is not an absolute URL or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            index_url: base_url(&config.index_url)?,
            appview_url: base_url(&config.appview_url)?,
        })
    }

    /// Base URL of the search index.
    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    /// Base URL of the AppView.
    pub fn appview_url(&self) -> &str {
        &self.appview_url
    }

    fn endpoint(base: &str, path: &str) -> std::result::Result<Url, TransportError> {
        Url::parse(&format!("{base}/{path}")).map_err(|e| TransportError::fetch(e.to_string()))
    }
}

fn base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| Error::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl {
            url: raw.to_string(),
            message: "not a base URL".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Map a response onto the transport error taxonomy and decode its body.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> std::result::Result<T, TransportError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::fetch(e.to_string()))?;

    if !status.is_success() {
        return Err(TransportError::http(status.as_u16(), body));
    }

    serde_json::from_str(&body).map_err(|e| TransportError::parse(e.to_string()))
}

// ============================================================================
// Trait implementations
// ============================================================================

#[async_trait]
impl SearchGateway for SkysiftClient {
    async fn search(
        &self,
        request: &CompiledRequest,
    ) -> std::result::Result<Vec<PostReference>, TransportError> {
        let url = Self::endpoint(&self.index_url, "feed")?;
        log::debug!("POST {url} q={:?}", request.query);

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::fetch(e.to_string()))?;

        let skeleton: FeedSkeleton = decode(response).await?;
        let references = skeleton.into_references();
        log::debug!("search returned {} references", references.len());
        Ok(references)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[async_trait]
impl PostFetcher for SkysiftClient {
    async fn get_posts(
        &self,
        uris: &[String],
    ) -> std::result::Result<Vec<PostRecord>, TransportError> {
        if uris.len() > MAX_URIS_PER_CALL {
            log::warn!(
                "getPosts called with {} URIs; the AppView accepts at most {MAX_URIS_PER_CALL}",
                uris.len()
            );
        }

        let mut url = Self::endpoint(&self.appview_url, GET_POSTS_METHOD)?;
        {
            let mut pairs = url.query_pairs_mut();
            for uri in uris {
                pairs.append_pair("uris", uri);
            }
        }
        log::debug!("GET getPosts ({} URIs)", uris.len());

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::fetch(e.to_string()))?;

        let body: GetPostsResponse = decode(response).await?;
        Ok(body.posts)
    }
}

#[async_trait]
impl LanguageSource for SkysiftClient {
    async fn languages(&self) -> std::result::Result<LanguageFacets, TransportError> {
        let url = Self::endpoint(&self.index_url, "langs")?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::fetch(e.to_string()))?;
        decode(response).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use skysift_core::{SearchCriteria, TransportStatus};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SkysiftClient {
        let config = ClientConfig {
            index_url: server.uri(),
            appview_url: format!("{}/", server.uri()),
            ..ClientConfig::default()
        };
        SkysiftClient::new(&config).unwrap()
    }

    fn post_json(uri: &str, text: &str) -> serde_json::Value {
        json!({
            "uri": uri,
            "cid": "bafy",
            "author": {"did": "did:plc:abc", "handle": "alice.test"},
            "record": {"text": text, "createdAt": "2024-05-01T12:00:00.000Z"},
            "indexedAt": "2024-05-01T12:00:01.000Z"
        })
    }

    #[test]
    fn test_new_rejects_relative_url() {
        let config = ClientConfig {
            index_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        let err = SkysiftClient::new(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = ClientConfig {
            index_url: "http://localhost:9000/".to_string(),
            ..ClientConfig::default()
        };
        let client = SkysiftClient::new(&config).unwrap();
        assert_eq!(client.index_url(), "http://localhost:9000");
    }

    #[tokio::test]
    async fn test_search_posts_compiled_request_and_keeps_rank_order() {
        let server = MockServer::start().await;
        let request = skysift_query::compile(&SearchCriteria::new().with_text("rust"));

        Mock::given(method("POST"))
            .and(path("/feed"))
            .and(body_json(serde_json::to_value(&request).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "feed": [{"post": "at://z"}, {"post": "at://a"}],
                "cursor": "25"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let refs = client_for(&server).search(&request).await.unwrap();
        let uris: Vec<&str> = refs.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["at://z", "at://a"]);
    }

    #[tokio::test]
    async fn test_search_http_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(500).set_body_string("index down"))
            .mount(&server)
            .await;

        let request = skysift_query::compile(&SearchCriteria::new());
        let err = client_for(&server).search(&request).await.unwrap_err();
        assert_eq!(err.status, TransportStatus::Http(500));
        assert_eq!(err.message, "index down");
        assert_eq!(err.to_string(), "500: index down");
    }

    #[tokio::test]
    async fn test_search_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let request = skysift_query::compile(&SearchCriteria::new());
        let err = client_for(&server).search(&request).await.unwrap_err();
        assert_eq!(err.status, TransportStatus::Parse);
    }

    #[tokio::test]
    async fn test_search_unreachable_index_is_fetch_error() {
        let config = ClientConfig {
            index_url: "http://127.0.0.1:1".to_string(),
            ..ClientConfig::default()
        };
        let client = SkysiftClient::new(&config).unwrap();
        let request = skysift_query::compile(&SearchCriteria::new());
        let err = client.search(&request).await.unwrap_err();
        assert_eq!(err.status, TransportStatus::Fetch);
        assert!(err.to_string().starts_with("FETCH_ERROR"));
    }

    #[tokio::test]
    async fn test_get_posts_sends_every_uri() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/xrpc/app.bsky.feed.getPosts"))
            .and(query_param("uris", "at://did:plc:abc/app.bsky.feed.post/1"))
            .and(query_param("uris", "at://did:plc:abc/app.bsky.feed.post/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "posts": [
                    post_json("at://did:plc:abc/app.bsky.feed.post/2", "second"),
                    post_json("at://did:plc:abc/app.bsky.feed.post/1", "first")
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uris = vec![
            "at://did:plc:abc/app.bsky.feed.post/1".to_string(),
            "at://did:plc:abc/app.bsky.feed.post/2".to_string(),
        ];
        let posts = client_for(&server).get_posts(&uris).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].text(), "second");
        assert_eq!(posts[1].rkey(), "1");
    }

    #[tokio::test]
    async fn test_languages_decodes_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/langs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "seen": ["en", "ja"],
                "known": ["en", "ja", "de"]
            })))
            .mount(&server)
            .await;

        let facets = client_for(&server).languages().await.unwrap();
        assert_eq!(facets.seen, vec!["en", "ja"]);
        assert_eq!(facets.known.len(), 3);
    }

    #[test]
    fn test_gateway_name() {
        let client = SkysiftClient::new(&ClientConfig::default()).unwrap();
        assert_eq!(SearchGateway::name(&client), "http");
    }
}
