//! Core policy dispatch types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Reference to a registered policy, by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolicyRef(String);

impl PolicyRef {
    /// Create a policy reference from a name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PolicyRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PolicyRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// The two handler kinds a policy pairs together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// Narrows a scope to the permitted records
    Filter,
    /// Answers yes/no for a single resource
    Authorization,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Filter => f.write_str("filter"),
            HandlerKind::Authorization => f.write_str("authorization"),
        }
    }
}

/// What the resolver sees when it looks at a value
///
/// Names refer to types registered in the
/// [`TypeHierarchy`](crate::hierarchy::TypeHierarchy); an unregistered name is
/// still resolvable by convention, it just has no ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// No value (anonymous lookups always fail)
    Absent,

    /// A type itself rather than an instance of it
    Type(&'a str),

    /// A single record of the named type
    Instance {
        type_name: &'a str,
        /// Per-instance policy override
        policy: Option<&'a str>,
    },

    /// A query-like wrapper over records of `model`
    Relation {
        model: &'a str,
        /// Per-instance policy override
        policy: Option<&'a str>,
    },
}

impl<'a> Target<'a> {
    /// An instance of `type_name` without an override
    pub fn instance(type_name: &'a str) -> Self {
        Target::Instance {
            type_name,
            policy: None,
        }
    }

    /// A relation over `model` without an override
    pub fn relation(model: &'a str) -> Self {
        Target::Relation {
            model,
            policy: None,
        }
    }

    /// Instance-level policy override, if any
    pub fn explicit_policy(&self) -> Option<&'a str> {
        match *self {
            Target::Instance { policy, .. } | Target::Relation { policy, .. } => policy,
            Target::Absent | Target::Type(_) => None,
        }
    }

    /// The type naming inference starts from
    pub fn base_type(&self) -> Option<&'a str> {
        match *self {
            Target::Absent => None,
            Target::Type(name) => Some(name),
            Target::Instance { type_name, .. } => Some(type_name),
            Target::Relation { model, .. } => Some(model),
        }
    }
}

/// A value the resolver can locate a policy for
pub trait Authorizable {
    fn target(&self) -> Target<'_>;
}

/// A record type with a fixed type name
///
/// `Vec<T>` of a model resolves like a relation over `T`.
pub trait Model {
    const TYPE_NAME: &'static str;
}

/// Names a type itself, e.g. to authorize `create?` before a record exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef(pub &'static str);

impl Authorizable for TypeRef {
    fn target(&self) -> Target<'_> {
        Target::Type(self.0)
    }
}

impl<T: Authorizable + ?Sized> Authorizable for &T {
    fn target(&self) -> Target<'_> {
        (**self).target()
    }
}

impl<T: Authorizable + ?Sized> Authorizable for Box<T> {
    fn target(&self) -> Target<'_> {
        (**self).target()
    }
}

impl<T: Authorizable + ?Sized> Authorizable for Arc<T> {
    fn target(&self) -> Target<'_> {
        (**self).target()
    }
}

impl<T: Authorizable> Authorizable for Option<T> {
    fn target(&self) -> Target<'_> {
        match self {
            Some(value) => value.target(),
            None => Target::Absent,
        }
    }
}

impl<T: Model> Authorizable for Vec<T> {
    fn target(&self) -> Target<'_> {
        Target::relation(T::TYPE_NAME)
    }
}
