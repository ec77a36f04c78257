//! Policy definition: a named pair of handler kinds
//!
//! A [`Policy`] stores its filter and authorization handlers type-erased so
//! policies for unrelated resource types can live in one registry. The
//! concrete handler type is recovered at construction time by downcasting the
//! target.

use crate::handler::{action_names, find_action, Action, Authorization, Filter};
use crate::types::{HandlerKind, PolicyRef};
use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;

/// A constructed handler, ready to be asked for an action
pub(crate) trait BoundHandler {
    type Output;

    fn responds_to(&self, action: &str) -> bool;

    fn invoke(&self, action: &str) -> Option<Self::Output>;
}

pub(crate) type BoundFilterBox = Box<dyn BoundHandler<Output = Box<dyn Any>>>;
pub(crate) type BoundAuthorizationBox = Box<dyn BoundHandler<Output = bool>>;

struct BoundFilter<F: Filter> {
    handler: F,
    actions: Vec<Action<F, F::Scope>>,
}

impl<F: Filter> BoundHandler for BoundFilter<F> {
    type Output = Box<dyn Any>;

    fn responds_to(&self, action: &str) -> bool {
        find_action(&self.actions, action).is_some()
    }

    fn invoke(&self, action: &str) -> Option<Box<dyn Any>> {
        find_action(&self.actions, action)
            .map(|found| Box::new(found.invoke(&self.handler)) as Box<dyn Any>)
    }
}

struct BoundAuthorization<A: Authorization> {
    handler: A,
    actions: Vec<Action<A, bool>>,
}

impl<A: Authorization> BoundHandler for BoundAuthorization<A> {
    type Output = bool;

    fn responds_to(&self, action: &str) -> bool {
        find_action(&self.actions, action).is_some()
    }

    fn invoke(&self, action: &str) -> Option<bool> {
        find_action(&self.actions, action).map(|found| found.invoke(&self.handler))
    }
}

/// Type-erased filter handler type
pub(crate) trait FilterKind<R>: Send + Sync {
    fn scope_type(&self) -> &'static str;

    fn action_names(&self) -> Vec<&'static str>;

    /// `None` when `scope` is not the handler's scope type
    fn construct(&self, role: R, scope: &dyn Any) -> Option<BoundFilterBox>;
}

/// Type-erased authorization handler type
pub(crate) trait AuthorizationKind<R>: Send + Sync {
    fn resource_type(&self) -> &'static str;

    fn action_names(&self) -> Vec<&'static str>;

    /// `None` when `resource` is not the handler's resource type
    fn construct(&self, role: R, resource: &dyn Any) -> Option<BoundAuthorizationBox>;
}

struct ErasedFilter<F>(PhantomData<fn() -> F>);

impl<F: Filter> FilterKind<F::Role> for ErasedFilter<F> {
    fn scope_type(&self) -> &'static str {
        type_name::<F::Scope>()
    }

    fn action_names(&self) -> Vec<&'static str> {
        action_names(&F::actions())
    }

    fn construct(&self, role: F::Role, scope: &dyn Any) -> Option<BoundFilterBox> {
        let scope = scope.downcast_ref::<F::Scope>()?;
        Some(Box::new(BoundFilter {
            handler: F::new(role, scope),
            actions: F::actions(),
        }))
    }
}

struct ErasedAuthorization<A>(PhantomData<fn() -> A>);

impl<A: Authorization> AuthorizationKind<A::Role> for ErasedAuthorization<A> {
    fn resource_type(&self) -> &'static str {
        type_name::<A::Resource>()
    }

    fn action_names(&self) -> Vec<&'static str> {
        action_names(&A::actions())
    }

    fn construct(&self, role: A::Role, resource: &dyn Any) -> Option<BoundAuthorizationBox> {
        let resource = resource.downcast_ref::<A::Resource>()?;
        Some(Box::new(BoundAuthorization {
            handler: A::new(role, resource),
            actions: A::actions(),
        }))
    }
}

/// Named pair of handler kinds governing a resource type
///
/// # Example
///
/// ```rust,ignore
/// let policy = Policy::new("PostPolicy")
///     .filter::<PostFilter>()
///     .authorization::<PostAuthorization>();
/// ```
pub struct Policy<R> {
    name: PolicyRef,
    filter: Option<Box<dyn FilterKind<R>>>,
    authorization: Option<Box<dyn AuthorizationKind<R>>>,
}

impl<R: 'static> Policy<R> {
    /// Create a policy with no handlers yet
    pub fn new(name: impl Into<PolicyRef>) -> Self {
        Self {
            name: name.into(),
            filter: None,
            authorization: None,
        }
    }

    /// Use `F` as this policy's filter handler
    pub fn filter<F: Filter<Role = R>>(mut self) -> Self {
        self.filter = Some(Box::new(ErasedFilter::<F>(PhantomData)));
        self
    }

    /// Use `A` as this policy's authorization handler
    pub fn authorization<A: Authorization<Role = R>>(mut self) -> Self {
        self.authorization = Some(Box::new(ErasedAuthorization::<A>(PhantomData)));
        self
    }
}

impl<R> Policy<R> {
    pub fn name(&self) -> &PolicyRef {
        &self.name
    }

    pub fn has_handler(&self, kind: HandlerKind) -> bool {
        match kind {
            HandlerKind::Filter => self.filter.is_some(),
            HandlerKind::Authorization => self.authorization.is_some(),
        }
    }

    /// Action names of one handler kind, `None` if the kind is missing
    pub fn action_names(&self, kind: HandlerKind) -> Option<Vec<&'static str>> {
        match kind {
            HandlerKind::Filter => self.filter.as_ref().map(|k| k.action_names()),
            HandlerKind::Authorization => self.authorization.as_ref().map(|k| k.action_names()),
        }
    }

    pub(crate) fn filter_kind(&self) -> Option<&dyn FilterKind<R>> {
        self.filter.as_deref()
    }

    pub(crate) fn authorization_kind(&self) -> Option<&dyn AuthorizationKind<R>> {
        self.authorization.as_deref()
    }
}

impl<R> fmt::Debug for Policy<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("name", &self.name)
            .field("filter", &self.filter.as_ref().map(|k| k.scope_type()))
            .field(
                "authorization",
                &self.authorization.as_ref().map(|k| k.resource_type()),
            )
            .finish()
    }
}
