use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::kernel::error::Error;

/// Instance lifetime policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One instance for the whole kernel tree, cached at the root.
    Singleton,
    /// One instance per forked kernel. On a root kernel this behaves like
    /// [`Scope::Transient`] unless the configuration rejects it.
    Invoke,
    /// A new instance on every resolution.
    Transient,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Singleton => "singleton",
            Scope::Invoke => "invoke",
            Scope::Transient => "transient",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "singleton" => Ok(Scope::Singleton),
            "invoke" => Ok(Scope::Invoke),
            "transient" => Ok(Scope::Transient),
            other => Err(Error::Other(format!("Unknown scope '{}'", other))),
        }
    }
}
