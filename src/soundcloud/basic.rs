use super::call::Call;
use super::http::{HttpRequest, HttpTransport, Transport};
use super::resource::Resource;
use super::response::{check_response, ApiResponse};
use crate::error::Result;

pub const SANDBOX_BASE: &str = "http://api.sandbox-soundcloud.com";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client authenticating every call with HTTP Basic credentials.
///
/// Not meant to be shared between concurrent callers; one client is one
/// logical session.
#[derive(Debug, Clone)]
pub struct BasicClient<T = HttpTransport> {
    transport: T,
    credentials: Credentials,
    base_url: String,
}

impl BasicClient<HttpTransport> {
    /// Creates a client against the sandbox API
    ///
    /// # Arguments
    /// * `credentials` - Username and password sent with every request
    ///
    /// # Returns
    /// Result containing the [`BasicClient`] or an error if the HTTP client
    /// could not be built
    pub fn new(credentials: Credentials) -> Result<Self> {
        Ok(Self::with_transport(credentials, HttpTransport::new()?))
    }
}

impl<T: Transport> BasicClient<T> {
    pub fn with_transport(credentials: Credentials, transport: T) -> Self {
        Self {
            transport,
            credentials,
            base_url: SANDBOX_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Scopes the client to a single resource, e.g. `client.resource(Resource::Tracks)`
    pub fn resource(&self, resource: Resource) -> ScopedClient<'_, T> {
        ScopedClient {
            client: self,
            resource,
        }
    }

    pub fn me(&self) -> ScopedClient<'_, T> {
        self.resource(Resource::Me)
    }

    pub fn users(&self) -> ScopedClient<'_, T> {
        self.resource(Resource::Users)
    }

    pub fn tracks(&self) -> ScopedClient<'_, T> {
        self.resource(Resource::Tracks)
    }
}

/// A [`BasicClient`] addressing one resource. Cheap to create and discard.
#[derive(Debug)]
pub struct ScopedClient<'a, T> {
    client: &'a BasicClient<T>,
    resource: Resource,
}

impl<T: Transport> ScopedClient<'_, T> {
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Builds the request for a call without sending it
    ///
    /// # Arguments
    /// * `call` - Method, ids, query and verb to apply
    ///
    /// # Returns
    /// Result containing the [`HttpRequest`] or a query encoding error
    pub fn prepare(&self, call: &Call) -> Result<HttpRequest> {
        let url = call.url(&self.client.base_url, self.resource)?;
        let mut request = HttpRequest::new(call.verb(), url);

        request.basic_auth = Some((
            self.client.credentials.username.clone(),
            self.client.credentials.password.clone(),
        ));

        if let Some((body, content_type)) = call.body()? {
            request
                .headers
                .push(("Content-Type".to_string(), content_type.to_string()));
            request.body = Some(body);
        }

        Ok(request)
    }

    /// Sends a call and checks the response status
    ///
    /// # Arguments
    /// * `call` - Method, ids, query and verb to apply
    ///
    /// # Returns
    /// Result containing the [`ApiResponse`] or an [`AppError`](crate::error::AppError)
    pub fn call(&self, call: Call) -> Result<ApiResponse> {
        let request = self.prepare(&call)?;
        let url = request.url.clone();

        tracing::debug!(
            resource = %self.resource,
            method = call.method().unwrap_or("<collection>"),
            verb = %request.verb,
            "Calling {}",
            url
        );

        let response = self.client.transport.execute(request)?;
        check_response(response, &url)
    }
}
