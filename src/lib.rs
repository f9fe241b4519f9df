//! A minimal client for the SoundCloud REST API.
//!
//! Two independent clients are provided:
//!
//! - [`BasicClient`] authenticates with a username and password and maps a
//!   [`Resource`] plus a [`Call`] onto the REST path scheme of the sandbox API.
//! - [`SoundcloudClient`] runs the OAuth 1.0a handshake and signs arbitrary
//!   requests, including multipart track uploads.
//!
//! Both are blocking and perform one HTTP round trip per call. Response
//! bodies are returned as text; decoding them is up to the caller.
//!
//! ```no_run
//! use soundcloud_api::{BasicClient, Call, Credentials};
//!
//! # fn main() -> soundcloud_api::Result<()> {
//! let client = BasicClient::new(Credentials::new("user", "password"))?;
//! let found = client.tracks().call(Call::new("search").query([("q", "ambient")]))?;
//! println!("{:?}", found.text());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod soundcloud;
pub mod util;

pub use error::{AppError, Result};
pub use soundcloud::{
    ApiResponse, BasicClient, Call, Consumer, Credentials, HandshakeState, HttpTransport,
    RequestBody, Resource, SoundcloudClient, Token, Transport, Verb,
};
