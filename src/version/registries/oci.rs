//! Docker Registry HTTP API v2 implementation
//!
//! Works against Docker Hub, GHCR, Quay and any other registry that speaks
//! the distribution API. Only anonymous pull access is supported: a `401`
//! carrying a Bearer challenge is answered with an anonymous token request.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;

use reqwest::header::{AUTHORIZATION, HeaderMap, LINK, RETRY_AFTER, WWW_AUTHENTICATE};
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::image::{DEFAULT_DOMAIN, ImageName};
use crate::version::error::RegistryError;
use crate::version::registry::Registry;

/// Docker Hub serves the registry API from a different host than its name
const DOCKER_HUB_ENDPOINT: &str = "https://registry-1.docker.io";

/// Response from `GET /v2/<name>/tags/list`
#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Response from a token realm
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

/// `WWW-Authenticate: Bearer realm="...",service="..."`
#[derive(Debug, Clone, PartialEq, Eq)]
struct BearerChallenge {
    realm: String,
    service: Option<String>,
}

impl BearerChallenge {
    fn parse(header: &str) -> Option<Self> {
        let (scheme, params) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }

        let mut params = parse_auth_params(params);
        let realm = params.remove("realm")?;

        Some(Self {
            realm,
            service: params.remove("service"),
        })
    }
}

/// Registry implementation for the distribution API
pub struct OciRegistry {
    client: reqwest::Client,
    endpoints: HashMap<String, String>,
}

impl OciRegistry {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoints: HashMap::new(),
        }
    }

    /// Serve a registry domain from a custom base URL (mirrors, tests)
    pub fn with_endpoint(mut self, domain: &str, base_url: &str) -> Self {
        self.endpoints.insert(
            domain.to_string(),
            base_url.trim_end_matches('/').to_string(),
        );
        self
    }

    fn endpoint(&self, domain: &str) -> String {
        if let Some(base_url) = self.endpoints.get(domain) {
            return base_url.clone();
        }
        if domain == DEFAULT_DOMAIN {
            return DOCKER_HUB_ENDPOINT.to_string();
        }
        format!("{}://{}", default_scheme(domain), domain)
    }

    async fn get(&self, url: &str, token: Option<&str>) -> Result<Response, RegistryError> {
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        Ok(request.send().await?)
    }

    /// Sends a GET, answering the first Bearer challenge with an anonymous token.
    ///
    /// The token is kept in `token` so later pages reuse it.
    async fn send_authorized(
        &self,
        url: &str,
        image: &ImageName,
        token: &mut Option<String>,
    ) -> Result<Response, RegistryError> {
        let response = self.get(url, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED || token.is_some() {
            return Ok(response);
        }

        let Some(challenge) = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .and_then(BearerChallenge::parse)
        else {
            return Ok(response);
        };

        debug!(
            "Requesting anonymous pull token for {} from {}",
            image, challenge.realm
        );
        let fetched = self.fetch_token(&challenge, image).await?;
        let retried = self.get(url, Some(&fetched)).await?;
        *token = Some(fetched);

        Ok(retried)
    }

    async fn fetch_token(
        &self,
        challenge: &BearerChallenge,
        image: &ImageName,
    ) -> Result<String, RegistryError> {
        let scope = format!("repository:{}:pull", image.repository());
        let mut params = vec![("scope", scope.as_str())];
        if let Some(service) = &challenge.service {
            params.push(("service", service.as_str()));
        }

        let url = Url::parse_with_params(&challenge.realm, &params).map_err(|e| {
            RegistryError::InvalidResponse(format!(
                "Invalid token realm {}: {}",
                challenge.realm, e
            ))
        })?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Token endpoint returned status {} for {}", status, image);
            return Err(RegistryError::Unauthorized(image.to_string()));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse token response for {}: {}", image, e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        body.token
            .or(body.access_token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| RegistryError::InvalidResponse("Token response has no token".to_string()))
    }
}

#[async_trait::async_trait]
impl Registry for OciRegistry {
    async fn list_tags(&self, image: &ImageName) -> Result<Vec<String>, RegistryError> {
        let base = format!(
            "{}/v2/{}/tags/list",
            self.endpoint(image.domain()),
            image.repository()
        );
        let mut url = Url::parse(&base).map_err(|e| {
            RegistryError::InvalidResponse(format!("Invalid registry URL {}: {}", base, e))
        })?;

        let mut token = None;
        let mut tags = Vec::new();
        let mut visited = HashSet::new();
        loop {
            let response = self.send_authorized(url.as_str(), image, &mut token).await?;
            let response = check_status(response, image)?;
            let next = next_page(response.headers(), &url);

            let page: TagList = response.json().await.map_err(|e| {
                warn!("Failed to parse tag list for {}: {}", image, e);
                RegistryError::InvalidResponse(e.to_string())
            })?;
            tags.extend(page.tags.unwrap_or_default());
            visited.insert(url.clone());

            match next {
                Some(next) if !visited.contains(&next) => url = next,
                Some(next) => {
                    warn!("Pagination for {} loops back to {}, stopping", image, next);
                    break;
                }
                None => break,
            }
        }

        debug!("Listed {} tags for {}", tags.len(), image);
        Ok(tags)
    }
}

fn check_status(response: Response, image: &ImageName) -> Result<Response, RegistryError> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(RegistryError::NotFound(image.to_string()));
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(RegistryError::Unauthorized(image.to_string()));
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(RegistryError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    if !status.is_success() {
        warn!("Registry returned status {}: {}", status, response.url());
        return Err(RegistryError::InvalidResponse(format!(
            "Unexpected status: {}",
            status
        )));
    }

    Ok(response)
}

/// Follows `Link: <...>; rel="next"` pagination
fn next_page(headers: &HeaderMap, current: &Url) -> Option<Url> {
    let link = headers.get(LINK)?.to_str().ok()?;

    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params.split(';').any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }

        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        current.join(target).ok()
    })
}

/// Parses `key="value", key=value` auth parameters. Quoted values may hold commas.
fn parse_auth_params(input: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut rest = input.trim();

    while let Some((key, after)) = rest.split_once('=') {
        let key = key.trim().to_ascii_lowercase();
        let after = after.trim_start();

        let (value, remainder) = match after.strip_prefix('"') {
            Some(quoted) => match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            },
            None => match after.find(',') {
                Some(end) => (&after[..end], &after[end..]),
                None => (after, ""),
            },
        };

        params.insert(key, value.trim().to_string());
        rest = remainder.trim_start().trim_start_matches(',').trim_start();
    }

    params
}

/// Local and private registries are usually served without TLS
fn default_scheme(domain: &str) -> &'static str {
    let host = match domain.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next().unwrap_or(bracketed),
        None => domain.split(':').next().unwrap_or(domain),
    };

    let insecure = host == "localhost"
        || host.ends_with(".local")
        || host.parse::<IpAddr>().is_ok_and(|ip| match ip {
            IpAddr::V4(v4) => v4.is_loopback() || v4.is_private(),
            IpAddr::V6(v6) => v6.is_loopback(),
        });

    if insecure { "http" } else { "https" }
}
