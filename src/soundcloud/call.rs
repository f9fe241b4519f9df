use std::fmt;

use super::http::Verb;
use super::resource::Resource;
use crate::error::Result;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Everything needed to address one endpoint below a [`Resource`].
///
/// `Call::new("followers").user(42)` against [`Resource::Users`] becomes
/// `GET {base}/users/42/followers/`. Calls without a method name address
/// the bare collection, see [`Call::collection`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Call {
    method: Option<String>,
    user: Option<String>,
    ids: Vec<String>,
    query: Option<Vec<(String, String)>>,
    verb: Verb,
    fields: Option<Vec<(String, String)>>,
}

impl Call {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            ..Self::default()
        }
    }

    pub fn collection() -> Self {
        Self::default()
    }

    pub fn user(mut self, user_id: impl fmt::Display) -> Self {
        self.user = Some(user_id.to_string());
        self
    }

    /// Appends a foreign-key id as an extra path segment
    pub fn id(mut self, id: impl fmt::Display) -> Self {
        self.ids.push(id.to_string());
        self
    }

    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query = Some(collect_pairs(pairs));
        self
    }

    pub fn fields<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.fields = Some(collect_pairs(pairs));
        self
    }

    pub fn post<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.verb = Verb::Post;
        self.fields(fields)
    }

    pub fn put<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.verb = Verb::Put;
        self.fields(fields)
    }

    pub fn delete(mut self) -> Self {
        self.verb = Verb::Delete;
        self
    }

    /// Applies one loosely typed argument the way the REST paths expect it.
    ///
    /// `user_id` selects the user segment, any other `*_id` key becomes an
    /// id segment, and `post`/`put`/`delete` select the verb (last one wins).
    /// Unrecognised keys are ignored.
    pub fn arg(mut self, key: &str, value: impl fmt::Display) -> Self {
        match key {
            "user_id" => self.user(value),
            "post" => {
                self.verb = Verb::Post;
                self
            }
            "put" => {
                self.verb = Verb::Put;
                self
            }
            "delete" => self.delete(),
            _ if key.ends_with("_id") => self.id(value),
            _ => {
                tracing::debug!(key, "Ignoring unrecognised call argument");
                self
            }
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Builds the absolute URL for this call
    ///
    /// # Arguments
    /// * `base` - API root, with or without a trailing slash
    /// * `resource` - Collection the call is scoped to
    ///
    /// # Returns
    /// Result containing the URL or an encoding error from the query
    pub fn url(&self, base: &str, resource: Resource) -> Result<String> {
        let mut url = format!("{}/{}/", base.trim_end_matches('/'), resource);

        if resource.method_after_ids() {
            for id in &self.ids {
                url.push_str(id);
                url.push('/');
            }
        } else {
            if let Some(user) = &self.user {
                url.push_str(user);
                url.push('/');
            }
            if let Some(method) = &self.method {
                url.push_str(method);
                url.push('/');
            }
            for id in &self.ids {
                url.push_str(id);
                url.push('/');
            }
        }

        match &self.query {
            Some(query) => {
                // Searches address the collection itself; the method name
                // only names the operation.
                if !resource.method_after_ids() {
                    url.pop();
                }
                url.push('?');
                url.push_str(&serde_urlencoded::to_string(query)?);
            }
            None => {
                if resource.method_after_ids() {
                    if let Some(method) = &self.method {
                        url.push_str(method);
                    }
                }
            }
        }

        Ok(url)
    }

    /// Form-encoded request body and its content type, if the verb carries one
    pub fn body(&self) -> Result<Option<(Vec<u8>, &'static str)>> {
        if self.verb == Verb::Get {
            return Ok(None);
        }

        let body = match &self.fields {
            Some(fields) => serde_urlencoded::to_string(fields)?,
            None => String::new(),
        };

        Ok(Some((body.into_bytes(), FORM_CONTENT_TYPE)))
    }
}

fn collect_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Vec<(String, String)>
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
