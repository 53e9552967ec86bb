use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity assigned by the rendezvous relay to one connected endpoint.
///
/// Opaque and unique per connection; a reconnecting endpoint comes back
/// with a fresh `PeerId`.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct PeerId(pub String);

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
