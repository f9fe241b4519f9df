//! JSON shapes for the handful of responses the command line decodes.
//! The client itself hands bodies back untouched.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub permalink: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub track_count: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub permalink_url: String,
    #[serde(default)]
    pub sharing: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}
