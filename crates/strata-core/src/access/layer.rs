use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::access::error::AccessError;
use crate::kernel::scope::Scope;

/// Structural role of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Request entry point. Nothing may depend on an action.
    Action,
    /// Business logic, private to its module.
    Service,
    /// Data access, private to its module. Memoizable.
    Repo,
    /// A module's public face for other modules.
    Facade,
    /// Shared infrastructure such as connection pools.
    Resource,
    /// Per-invocation values, visible to every layer.
    Context,
}

impl Layer {
    /// Every layer, in table order.
    pub const ALL: [Layer; 6] = [
        Layer::Action,
        Layer::Service,
        Layer::Repo,
        Layer::Facade,
        Layer::Resource,
        Layer::Context,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Action => "action",
            Layer::Service => "service",
            Layer::Repo => "repo",
            Layer::Facade => "facade",
            Layer::Resource => "resource",
            Layer::Context => "context",
        }
    }

    /// Layers allowed to depend on a component of this layer unless the
    /// component overrides them.
    pub fn default_parents(&self) -> &'static [Layer] {
        match self {
            Layer::Action => &[],
            Layer::Service => &[Layer::Service, Layer::Action],
            Layer::Repo => &[Layer::Repo, Layer::Service, Layer::Action],
            Layer::Facade => &[Layer::Repo, Layer::Service, Layer::Action, Layer::Resource],
            Layer::Resource => &[Layer::Action, Layer::Service, Layer::Repo, Layer::Resource],
            Layer::Context => &[
                Layer::Action,
                Layer::Service,
                Layer::Repo,
                Layer::Resource,
                Layer::Context,
            ],
        }
    }

    /// Layer a component of this layer is checked as when it declares
    /// dependencies. Facades front their module's services and inject with
    /// a service's rights.
    pub fn injects_as(&self) -> Layer {
        match self {
            Layer::Facade => Layer::Service,
            other => *other,
        }
    }

    pub fn default_visibility(&self) -> Visibility {
        match self {
            Layer::Action => Visibility::Private,
            Layer::Service | Layer::Repo => Visibility::Module,
            Layer::Facade | Layer::Resource | Layer::Context => Visibility::Global,
        }
    }

    pub fn default_scope(&self) -> Scope {
        match self {
            Layer::Action | Layer::Facade => Scope::Transient,
            Layer::Service | Layer::Repo | Layer::Context => Scope::Invoke,
            Layer::Resource => Scope::Singleton,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layer::ALL
            .into_iter()
            .find(|layer| layer.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AccessError::UnknownLayer { name: s.to_string() })
    }
}

/// Whether a component can be depended on from outside its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Not injectable across modules.
    Private,
    /// Injectable only inside its own module.
    Module,
    /// Injectable from any module.
    Global,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Module => "module",
            Visibility::Global => "global",
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Visibility::Global)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Ok(Visibility::Private),
            "module" => Ok(Visibility::Module),
            "global" => Ok(Visibility::Global),
            _ => Err(AccessError::UnknownVisibility { name: s.to_string() }),
        }
    }
}
