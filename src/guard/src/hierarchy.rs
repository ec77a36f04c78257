//! Type hierarchy used by naming inference
//!
//! Types are registered into an arena with an optional parent index. A parent
//! must already be registered when a child is added, so the graph is acyclic
//! and every ancestor walk terminates.
//!
//! # Example
//!
//! ```rust
//! use cretoai_guard::hierarchy::TypeHierarchy;
//!
//! let mut hierarchy = TypeHierarchy::new();
//! hierarchy.register("Record").unwrap();
//! hierarchy.register_child("Post", "Record").unwrap();
//! hierarchy.register_child("SpecialPost", "Post").unwrap();
//!
//! let chain: Vec<&str> = hierarchy.ancestors("SpecialPost").collect();
//! assert_eq!(chain, vec!["SpecialPost", "Post", "Record"]);
//! ```

use crate::error::RegistryError;
use crate::types::PolicyRef;
use std::collections::HashMap;

/// Arena node for a registered type
#[derive(Debug, Clone)]
struct TypeNode {
    name: String,
    parent: Option<usize>,
    /// Type-level policy declaration
    policy: Option<PolicyRef>,
}

/// Registered types with their parent links
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    nodes: Vec<TypeNode>,
    index: HashMap<String, usize>,
}

impl TypeHierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root type
    pub fn register(&mut self, name: impl Into<String>) -> Result<(), RegistryError> {
        self.insert(name.into(), None)
    }

    /// Register a type whose parent is `parent`
    ///
    /// # Errors
    ///
    /// Fails if `name` is already registered or `parent` is not.
    pub fn register_child(
        &mut self,
        name: impl Into<String>,
        parent: &str,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let Some(&parent_idx) = self.index.get(parent) else {
            return Err(RegistryError::UnknownParent {
                child: name,
                parent: parent.to_string(),
            });
        };
        self.insert(name, Some(parent_idx))
    }

    fn insert(&mut self, name: String, parent: Option<usize>) -> Result<(), RegistryError> {
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateType(name));
        }

        let idx = self.nodes.len();
        self.nodes.push(TypeNode {
            name: name.clone(),
            parent,
            policy: None,
        });
        self.index.insert(name, idx);
        Ok(())
    }

    /// Declare the policy governing a type, bypassing naming inference
    ///
    /// The type is registered as a root if it is not known yet.
    pub fn declare_policy(&mut self, name: &str, policy: impl Into<PolicyRef>) {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.nodes.len();
                self.nodes.push(TypeNode {
                    name: name.to_string(),
                    parent: None,
                    policy: None,
                });
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        self.nodes[idx].policy = Some(policy.into());
    }

    /// Policy declared on the type or inherited from its nearest declaring ancestor
    pub fn declared_policy(&self, name: &str) -> Option<&PolicyRef> {
        self.declaring_ancestor(name).map(|(_, policy)| policy)
    }

    /// Nearest type in the ancestor chain carrying a declaration, with that declaration
    pub fn declaring_ancestor(&self, name: &str) -> Option<(&str, &PolicyRef)> {
        let mut next = self.index.get(name).copied();
        while let Some(idx) = next {
            let node = &self.nodes[idx];
            if let Some(policy) = node.policy.as_ref() {
                return Some((node.name.as_str(), policy));
            }
            next = node.parent;
        }
        None
    }

    /// Parent of a registered type
    pub fn parent(&self, name: &str) -> Option<&str> {
        let idx = *self.index.get(name)?;
        self.nodes[idx]
            .parent
            .map(|parent| self.nodes[parent].name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The type itself, then its parent, then its parent's parent...
    ///
    /// An unregistered name yields only itself.
    pub fn ancestors<'a>(&'a self, name: &'a str) -> Ancestors<'a> {
        let state = match self.index.get(name) {
            Some(&idx) => AncestorState::Node(idx),
            None => AncestorState::Unregistered(name),
        };
        Ancestors {
            hierarchy: self,
            state,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AncestorState<'a> {
    Node(usize),
    Unregistered(&'a str),
    Done,
}

/// Iterator over a type's ancestor chain, nearest first
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    hierarchy: &'a TypeHierarchy,
    state: AncestorState<'a>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            AncestorState::Node(idx) => {
                let node = &self.hierarchy.nodes[idx];
                self.state = match node.parent {
                    Some(parent) => AncestorState::Node(parent),
                    None => AncestorState::Done,
                };
                Some(node.name.as_str())
            }
            AncestorState::Unregistered(name) => {
                self.state = AncestorState::Done;
                Some(name)
            }
            AncestorState::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TypeHierarchy {
        let mut hierarchy = TypeHierarchy::new();
        hierarchy.register("Record").unwrap();
        hierarchy.register_child("Post", "Record").unwrap();
        hierarchy.register_child("SpecialPost", "Post").unwrap();
        hierarchy.register_child("Comment", "Record").unwrap();
        hierarchy
    }

    #[test]
    fn test_ancestor_chain() {
        let hierarchy = sample();
        let chain: Vec<_> = hierarchy.ancestors("SpecialPost").collect();
        assert_eq!(chain, vec!["SpecialPost", "Post", "Record"]);

        let chain: Vec<_> = hierarchy.ancestors("Record").collect();
        assert_eq!(chain, vec!["Record"]);
    }

    #[test]
    fn test_unregistered_type_chain() {
        let hierarchy = sample();
        let chain: Vec<_> = hierarchy.ancestors("Ghost").collect();
        assert_eq!(chain, vec!["Ghost"]);
    }

    #[test]
    fn test_duplicate_type() {
        let mut hierarchy = sample();
        assert_eq!(
            hierarchy.register("Post"),
            Err(RegistryError::DuplicateType("Post".to_string()))
        );
    }

    #[test]
    fn test_unknown_parent() {
        let mut hierarchy = sample();
        let err = hierarchy.register_child("Reply", "Thread").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownParent { .. }));
        assert!(!hierarchy.contains("Reply"));
    }

    #[test]
    fn test_declared_policy_is_inherited() {
        let mut hierarchy = sample();
        hierarchy.declare_policy("Post", "PublishingPolicy");

        assert_eq!(
            hierarchy.declared_policy("Post").map(PolicyRef::as_str),
            Some("PublishingPolicy")
        );
        assert_eq!(
            hierarchy.declaring_ancestor("SpecialPost"),
            Some(("Post", &PolicyRef::new("PublishingPolicy")))
        );
        assert!(hierarchy.declared_policy("Comment").is_none());
        assert!(hierarchy.declared_policy("Ghost").is_none());
    }

    #[test]
    fn test_nearest_declaration_wins() {
        let mut hierarchy = sample();
        hierarchy.declare_policy("Record", "RecordKeepingPolicy");
        hierarchy.declare_policy("Post", "PublishingPolicy");

        assert_eq!(
            hierarchy.declared_policy("SpecialPost").map(PolicyRef::as_str),
            Some("PublishingPolicy")
        );
        assert_eq!(
            hierarchy.declared_policy("Comment").map(PolicyRef::as_str),
            Some("RecordKeepingPolicy")
        );
    }

    #[test]
    fn test_declare_policy_registers_unknown_type() {
        let mut hierarchy = TypeHierarchy::new();
        hierarchy.declare_policy("Report", "AuditPolicy");
        assert!(hierarchy.contains("Report"));
        assert_eq!(hierarchy.parent("Report"), None);
        assert_eq!(hierarchy.len(), 1);
    }

    #[test]
    fn test_parent_lookup() {
        let hierarchy = sample();
        assert_eq!(hierarchy.parent("Comment"), Some("Record"));
        assert_eq!(hierarchy.parent("Record"), None);
        assert_eq!(hierarchy.parent("Ghost"), None);
    }
}
