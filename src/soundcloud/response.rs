use serde::de::DeserializeOwned;

use super::http::HttpResponse;
use crate::error::{AppError, Result};

const ACCEPTED_STATUS: [u16; 3] = [200, 201, 303];

/// Outcome of a successful API call.
///
/// The API answers many writes with an empty (or single whitespace) body;
/// those come back as [`ApiResponse::Empty`] so callers never have to
/// inspect the text to tell "no content" apart from a real payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    Empty,
    Body(String),
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        matches!(self, ApiResponse::Empty)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ApiResponse::Empty => None,
            ApiResponse::Body(body) => Some(body),
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            ApiResponse::Empty => None,
            ApiResponse::Body(body) => Some(body),
        }
    }

    /// Decodes a JSON body into `T`. An empty response is decoded as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(self.text().unwrap_or("null"))?)
    }
}

/// Maps a raw response onto the API's success contract
///
/// # Arguments
/// * `response` - Raw status and body from the transport
/// * `url` - The URL that was requested, carried into the error
///
/// # Returns
/// [`ApiResponse`] for 200/201/303, [`AppError::Api`] for anything else
pub fn check_response(response: HttpResponse, url: &str) -> Result<ApiResponse> {
    if !ACCEPTED_STATUS.contains(&response.status) {
        tracing::warn!(status = response.status, url, "API call rejected");
        return Err(AppError::Api {
            status: response.status,
            url: url.to_string(),
        });
    }

    if response.body.len() <= 1 {
        Ok(ApiResponse::Empty)
    } else {
        Ok(ApiResponse::Body(response.body))
    }
}
