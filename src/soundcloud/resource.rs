use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Top-level API collections a client can be scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Me,
    Users,
    Tracks,
    Playlists,
    Groups,
    Comments,
    Events,
    Contacts,
    Connections,
}

impl Resource {
    pub const ALL: [Resource; 9] = [
        Resource::Me,
        Resource::Users,
        Resource::Tracks,
        Resource::Playlists,
        Resource::Groups,
        Resource::Comments,
        Resource::Events,
        Resource::Contacts,
        Resource::Connections,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Me => "me",
            Resource::Users => "users",
            Resource::Tracks => "tracks",
            Resource::Playlists => "playlists",
            Resource::Groups => "groups",
            Resource::Comments => "comments",
            Resource::Events => "events",
            Resource::Contacts => "contacts",
            Resource::Connections => "connections",
        }
    }

    /// Tracks put the method name after the id segments and ignore `user_id`.
    pub(crate) fn method_after_ids(&self) -> bool {
        matches!(self, Resource::Tracks)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AppError::UnknownResource(s.to_string()))
    }
}
