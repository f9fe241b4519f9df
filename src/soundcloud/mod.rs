mod basic;
mod call;
mod form;
mod http;
pub mod model;
mod multipart;
mod oauth;
mod resource;
mod response;
mod rest;

pub use basic::{BasicClient, Credentials, ScopedClient, SANDBOX_BASE};
pub use call::Call;
pub use form::parse_form;
pub use http::{HttpRequest, HttpResponse, HttpTransport, Transport, Verb};
pub use multipart::{Multipart, MultipartBody};
pub use oauth::{parse_authorization, Consumer, OAuthParams, Signer, Token};
pub use resource::Resource;
pub use response::{check_response, ApiResponse};
pub use rest::{API_BASE, ARTWORK_FIELD, ASSET_FIELD};

/// OAuth 1.0a client for the SoundCloud API.
///
/// Holds the consumer credentials and the token of the current handshake
/// leg. One client is one logical session; handshake methods take
/// `&mut self` and the client must not be shared between concurrent callers.
#[derive(Debug, Clone)]
pub struct SoundcloudClient<T = HttpTransport> {
    transport: T,
    consumer: Consumer,
    token: Option<Token>,
    state: HandshakeState,
    base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Unauthenticated,
    HasRequestToken,
    Authenticated,
}

/// Payload of a signed request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Form parameters, folded into the OAuth signature
    Params(Vec<(String, String)>),
    /// Pre-encoded bytes sent as-is, never signed
    Raw(Vec<u8>),
}

impl RequestBody {
    pub fn params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        RequestBody::Params(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
