//! OAuth 1.0a request signing (HMAC-SHA1, RFC 5849) on top of `oauth1-request`.

use std::collections::BTreeSet;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use oauth1_request as oauth;
use rand::distributions::Alphanumeric;
use rand::Rng;
use url::Url;

use super::http::Verb;
use crate::error::{AppError, Result};

const NONCE_LEN: usize = 32;
const REDACTED: &str = "<redacted>";

#[derive(Clone, PartialEq, Eq)]
pub struct Consumer {
    pub key: String,
    pub secret: String,
}

impl Consumer {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("key", &self.key)
            .field("secret", &REDACTED)
            .finish()
    }
}

/// A request or access token together with its secret
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub token: String,
    pub secret: String,
}

impl Token {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    /// Reads `oauth_token` and `oauth_token_secret` from a form-encoded body.
    /// Returns `None` unless both are present.
    pub fn from_form(body: &str) -> Option<Self> {
        let mut pairs = super::form::parse_form(body)?;
        let token = pairs.remove("oauth_token")?;
        let secret = pairs.remove("oauth_token_secret")?;
        Some(Self { token, secret })
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("token", &REDACTED)
            .field("secret", &REDACTED)
            .finish()
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.token
    }
}

/// Per-request nonce and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthParams {
    pub nonce: String,
    pub timestamp: u64,
}

impl OAuthParams {
    pub fn generate() -> Self {
        let nonce = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self { nonce, timestamp }
    }
}

/// Signs requests for one consumer and, once the handshake has started, one token
#[derive(Clone, Copy)]
pub struct Signer<'a> {
    consumer: &'a Consumer,
    token: Option<&'a Token>,
}

impl fmt::Debug for Signer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("consumer", self.consumer)
            .field("token", &self.token)
            .finish()
    }
}

impl<'a> Signer<'a> {
    pub fn new(consumer: &'a Consumer, token: Option<&'a Token>) -> Self {
        Self { consumer, token }
    }

    /// Builds the `Authorization` header value for a request
    ///
    /// # Arguments
    /// * `verb` - HTTP method of the request
    /// * `url` - Absolute request URL; its query parameters are signed too
    /// * `request_params` - Form parameters sent in the body or query
    /// * `oauth` - Nonce and timestamp for this request
    /// * `extra` - Handshake parameters, `oauth_callback` or `oauth_verifier`
    ///
    /// # Returns
    /// Result containing the header value, or an error for an unparseable URL
    /// or an unsupported extra parameter
    pub fn authorize(
        &self,
        verb: Verb,
        url: &str,
        request_params: &[(String, String)],
        oauth: &OAuthParams,
        extra: &[(String, String)],
    ) -> Result<String> {
        let (uri, query) = split_url(url)?;
        let params: BTreeSet<(String, String)> = query
            .into_iter()
            .chain(request_params.iter().cloned())
            .collect();

        let client = oauth::Credentials::new(self.consumer.key.as_str(), self.consumer.secret.as_str());
        let mut builder = oauth::Builder::new(client, oauth::HMAC_SHA1);
        builder
            .token(self.token.map(|t| oauth::Credentials::new(t.token.as_str(), t.secret.as_str())))
            .nonce(oauth.nonce.as_str())
            .timestamp(std::num::NonZeroU64::new(oauth.timestamp))
            .version(true);

        for (key, value) in extra {
            match key.as_str() {
                "oauth_callback" => {
                    builder.callback(value.as_str());
                }
                "oauth_verifier" => {
                    builder.verifier(value.as_str());
                }
                other => {
                    return Err(AppError::InvalidArgument(format!(
                        "unsupported OAuth parameter: {}",
                        other
                    )))
                }
            }
        }

        let params = oauth::ParameterList::new(params.into_iter().collect::<Vec<_>>());
        let header = match verb {
            Verb::Get => builder.get(&uri, &params),
            Verb::Post => builder.post(&uri, &params),
            Verb::Put => builder.put(&uri, &params),
            Verb::Delete => builder.delete(&uri, &params),
        };
        Ok(header)
    }

    /// Produces the full set of `oauth_*` parameters, signature included
    pub fn sign(
        &self,
        verb: Verb,
        url: &str,
        request_params: &[(String, String)],
        oauth: &OAuthParams,
        extra: &[(String, String)],
    ) -> Result<Vec<(String, String)>> {
        let header = self.authorize(verb, url, request_params, oauth, extra)?;
        Ok(parse_authorization(&header))
    }

    /// Checks the `oauth_signature` inside `protocol` by signing the same
    /// request again with the nonce and timestamp it carries
    pub fn verify(
        &self,
        verb: Verb,
        url: &str,
        request_params: &[(String, String)],
        protocol: &[(String, String)],
    ) -> Result<bool> {
        let find = |name: &str| {
            protocol
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        let (Some(signature), Some(nonce), Some(timestamp)) = (
            find("oauth_signature"),
            find("oauth_nonce"),
            find("oauth_timestamp"),
        ) else {
            return Ok(false);
        };
        let Ok(timestamp) = timestamp.parse() else {
            return Ok(false);
        };
        if find("oauth_token") != self.token.map(|t| t.token.as_str()) {
            return Ok(false);
        }

        let oauth = OAuthParams {
            nonce: nonce.to_string(),
            timestamp,
        };
        let extra: Vec<(String, String)> = ["oauth_callback", "oauth_verifier"]
            .into_iter()
            .filter_map(|name| find(name).map(|value| (name.to_string(), value.to_string())))
            .collect();

        let expected = self.sign(verb, url, request_params, &oauth, &extra)?;
        Ok(expected
            .iter()
            .any(|(key, value)| key == "oauth_signature" && value == signature))
    }
}

/// Splits an `Authorization: OAuth ...` value into decoded parameter pairs
pub fn parse_authorization(header: &str) -> Vec<(String, String)> {
    let params = header.trim().strip_prefix("OAuth").unwrap_or(header);

    params
        .split(',')
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            let value = value.trim().trim_matches('"');
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            Some((key.to_string(), value))
        })
        .collect()
}

/// Normalises the signing URI (lowercase scheme and host, no default port)
/// and pulls its query pairs out so they are signed as request parameters.
fn split_url(url: &str) -> Result<(String, Vec<(String, String)>)> {
    let mut url = Url::parse(url)?;
    let query = url.query_pairs().into_owned().collect();
    url.set_query(None);
    url.set_fragment(None);
    Ok((url.to_string(), query))
}

/// Percent-encodes everything outside the RFC 3986 unreserved set
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
