use std::fs;
use std::path::Path;

use super::http::{HttpRequest, HttpTransport, Transport, Verb};
use super::multipart::Multipart;
use super::oauth::{encode, Consumer, OAuthParams, Signer, Token};
use super::response::{check_response, ApiResponse};
use super::{HandshakeState, RequestBody, SoundcloudClient};
use crate::error::Result;

pub const API_BASE: &str = "http://api.soundcloud.com/";

pub const ASSET_FIELD: &str = "track[asset_data]";
pub const ARTWORK_FIELD: &str = "track[artwork_data]";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Content types whose bodies are pre-encoded and left out of the signature
fn is_raw_content_type(headers: &[(String, String)]) -> bool {
    headers.iter().any(|(name, value)| {
        let value = value.to_ascii_lowercase();
        name.eq_ignore_ascii_case("content-type")
            && (value.contains("multipart") || value.contains("xml"))
    })
}

/// `http://` or `https://` in any letter case
fn is_absolute(resource: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        resource
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name))
}

impl SoundcloudClient<HttpTransport> {
    /// Creates a new SoundCloud client instance
    ///
    /// # Arguments
    /// * `consumer` - Application key and secret issued by SoundCloud
    ///
    /// # Returns
    /// Result containing the [`SoundcloudClient`] or an error if the HTTP
    /// client could not be built
    pub fn new(consumer: Consumer) -> Result<Self> {
        Ok(Self::with_transport(consumer, HttpTransport::new()?))
    }
}

impl<T: Transport> SoundcloudClient<T> {
    pub fn with_transport(consumer: Consumer, transport: T) -> Self {
        Self {
            transport,
            consumer,
            token: None,
            state: HandshakeState::Unauthenticated,
            base_url: API_BASE.to_string(),
        }
    }

    /// Resumes a session from a previously stored access token
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self.state = HandshakeState::Authenticated;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = format!("{}/", base_url.trim_end_matches('/'));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn consumer(&self) -> &Consumer {
        &self.consumer
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    fn oauth_url(&self, leg: &str) -> String {
        format!("{}oauth/{}", self.base_url, leg)
    }

    /// Fetches a request token, the first leg of the handshake
    ///
    /// # Arguments
    /// * `callback` - URL the user is sent back to after authorizing
    ///
    /// # Returns
    /// Result containing the request [`Token`], or `None` if the response
    /// did not carry both token and secret
    pub fn get_request_token(&mut self, callback: &str) -> Result<Option<Token>> {
        let url = self.oauth_url("request_token");
        let extra = [("oauth_callback".to_string(), callback.to_string())];
        let resp = self.send(Verb::Post, &url, RequestBody::Empty, &[], &extra)?;

        let token = resp.text().and_then(Token::from_form);
        match &token {
            Some(token) => {
                tracing::info!("Obtained request token");
                self.token = Some(token.clone());
                self.state = HandshakeState::HasRequestToken;
            }
            None => tracing::warn!("Request token response did not contain a token pair"),
        }

        Ok(token)
    }

    /// Builds the page URL where the user authorizes a request token.
    /// Accepts a raw token string or a [`Token`].
    pub fn get_authorize_url(&self, token: impl AsRef<str>) -> String {
        format!(
            "{}?oauth_token={}",
            self.oauth_url("authorize"),
            encode(token.as_ref())
        )
    }

    /// Exchanges the authorized request token for an access token
    ///
    /// # Arguments
    /// * `verifier` - Verification code handed to the user after authorizing
    ///
    /// # Returns
    /// Result containing the access [`Token`], or `None` if the response
    /// did not carry both token and secret
    pub fn get_access_token(&mut self, verifier: &str) -> Result<Option<Token>> {
        let url = self.oauth_url("access_token");
        let extra = [("oauth_verifier".to_string(), verifier.to_string())];
        let resp = self.send(Verb::Post, &url, RequestBody::Empty, &[], &extra)?;

        let token = resp.text().and_then(Token::from_form);
        match &token {
            Some(token) => {
                tracing::info!("Obtained access token");
                self.token = Some(token.clone());
                self.state = HandshakeState::Authenticated;
            }
            None => tracing::warn!("Access token response did not contain a token pair"),
        }

        Ok(token)
    }

    /// Signs and sends an API call
    ///
    /// # Arguments
    /// * `resource` - Path below the API base (`"me/tracks"`) or an absolute URL
    /// * `verb` - HTTP method
    /// * `body` - Parameters to sign, or a pre-encoded body
    /// * `headers` - Extra headers; a multipart or XML `Content-Type` sends the body raw
    ///
    /// # Returns
    /// Result containing the [`ApiResponse`] or an error
    pub fn request(
        &self,
        resource: &str,
        verb: Verb,
        body: RequestBody,
        headers: &[(String, String)],
    ) -> Result<ApiResponse> {
        let url = self.resolve(resource);
        self.send(verb, &url, body, headers, &[])
    }

    /// Builds the signed request for an API call without sending it
    pub fn prepare_request(
        &self,
        resource: &str,
        verb: Verb,
        body: RequestBody,
        headers: &[(String, String)],
        oauth: &OAuthParams,
    ) -> Result<HttpRequest> {
        let url = self.resolve(resource);
        self.build(verb, &url, body, headers, &[], oauth)
    }

    /// Uploads a track as `multipart/form-data`
    ///
    /// # Arguments
    /// * `fields` - Form fields; [`ASSET_FIELD`] and [`ARTWORK_FIELD`] hold
    ///   local file paths, everything else is sent as text
    /// * `asset_mime` - Mime type declared for the audio file
    /// * `artwork_mime` - Mime type declared for the artwork
    ///
    /// # Returns
    /// Result containing the [`ApiResponse`] or an error, including IO
    /// errors for unreadable files
    pub fn upload_track(
        &self,
        fields: &[(String, String)],
        asset_mime: &str,
        artwork_mime: &str,
    ) -> Result<ApiResponse> {
        let mut form = Multipart::new();

        for (name, value) in fields {
            let mime = match name.as_str() {
                ASSET_FIELD => asset_mime,
                ARTWORK_FIELD => artwork_mime,
                _ => {
                    form = form.text(name, value);
                    continue;
                }
            };

            let path = Path::new(value);
            let data = fs::read(path)?;
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(value.as_str());

            tracing::debug!(field = %name, file = %path.display(), size = data.len(), "Attaching file");
            form = form.file(name, filename, mime, &data);
        }

        let body = form.finish();
        let headers = vec![
            ("Content-Type".to_string(), body.content_type()),
            ("Content-Length".to_string(), body.content_length().to_string()),
        ];

        tracing::info!(bytes = body.content_length(), "Uploading track");
        self.request("tracks", Verb::Post, RequestBody::Raw(body.bytes), &headers)
    }

    fn resolve(&self, resource: &str) -> String {
        if is_absolute(resource) {
            resource.to_string()
        } else {
            format!("{}{}", self.base_url, resource.trim_start_matches('/'))
        }
    }

    fn send(
        &self,
        verb: Verb,
        url: &str,
        body: RequestBody,
        headers: &[(String, String)],
        extra: &[(String, String)],
    ) -> Result<ApiResponse> {
        let request = self.build(verb, url, body, headers, extra, &OAuthParams::generate())?;
        let url = request.url.clone();

        tracing::debug!(verb = %verb, "Calling {}", url);
        let response = self.transport.execute(request)?;
        check_response(response, &url)
    }

    fn build(
        &self,
        verb: Verb,
        url: &str,
        body: RequestBody,
        headers: &[(String, String)],
        extra: &[(String, String)],
        oauth: &OAuthParams,
    ) -> Result<HttpRequest> {
        let raw = is_raw_content_type(headers);
        let mut url = url.to_string();
        let mut signed_params = Vec::new();
        let mut content_type = None;

        let payload = match body {
            RequestBody::Empty => None,
            RequestBody::Raw(bytes) => Some(bytes),
            RequestBody::Params(params) if raw => {
                Some(serde_urlencoded::to_string(&params)?.into_bytes())
            }
            RequestBody::Params(params) => match verb {
                Verb::Get | Verb::Delete => {
                    // The signer reads query parameters back out of the URL.
                    if !params.is_empty() {
                        url.push(if url.contains('?') { '&' } else { '?' });
                        url.push_str(&serde_urlencoded::to_string(&params)?);
                    }
                    None
                }
                Verb::Post | Verb::Put => {
                    let encoded = serde_urlencoded::to_string(&params)?;
                    signed_params = params;
                    content_type = Some(FORM_CONTENT_TYPE);
                    Some(encoded.into_bytes())
                }
            },
        };

        let authorization = Signer::new(&self.consumer, self.token.as_ref()).authorize(
            verb,
            &url,
            &signed_params,
            oauth,
            extra,
        )?;

        let mut request = HttpRequest::new(verb, url);
        request
            .headers
            .push(("Authorization".to_string(), authorization));
        if let Some(content_type) = content_type {
            if !has_header(headers, "content-type") {
                request
                    .headers
                    .push(("Content-Type".to_string(), content_type.to_string()));
            }
        }
        request.headers.extend(headers.iter().cloned());
        request.body = payload;

        Ok(request)
    }
}
