//! Helpers for testing handlers directly, without resolution
//!
//! ```rust,ignore
//! let permitted = permitted_actions::<PostAuthorization>(Some(admin), &post);
//! assert_eq!(permitted, ["destroy?", "show?", "update?"].into_iter().collect());
//! ```

use crate::handler::{action_names, Authorization, Filter};
use std::collections::BTreeSet;

/// Actions of `A` that allow `role` on `resource`
pub fn permitted_actions<A: Authorization>(
    role: A::Role,
    resource: &A::Resource,
) -> BTreeSet<&'static str> {
    partition_actions::<A>(role, resource).0
}

/// Actions of `A` that deny `role` on `resource`
pub fn forbidden_actions<A: Authorization>(
    role: A::Role,
    resource: &A::Resource,
) -> BTreeSet<&'static str> {
    partition_actions::<A>(role, resource).1
}

/// Split the actions of `A` into (permitted, forbidden)
pub fn partition_actions<A: Authorization>(
    role: A::Role,
    resource: &A::Resource,
) -> (BTreeSet<&'static str>, BTreeSet<&'static str>) {
    let handler = A::new(role, resource);
    let mut permitted = BTreeSet::new();
    let mut forbidden = BTreeSet::new();

    for action in A::actions() {
        if action.invoke(&handler) {
            permitted.insert(action.name());
        } else {
            forbidden.insert(action.name());
        }
    }

    (permitted, forbidden)
}

pub fn authorization_action_names<A: Authorization>() -> Vec<&'static str> {
    action_names(&A::actions())
}

pub fn filter_action_names<F: Filter>() -> Vec<&'static str> {
    action_names(&F::actions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Action;

    struct Ticket {
        owner: u32,
        closed: bool,
    }

    struct TicketAuthorization {
        user: u32,
        owner: u32,
        closed: bool,
    }

    impl TicketAuthorization {
        fn show(&self) -> bool {
            true
        }

        fn update(&self) -> bool {
            self.user == self.owner && !self.closed
        }

        fn close(&self) -> bool {
            self.user == self.owner
        }
    }

    impl Authorization for TicketAuthorization {
        type Role = u32;
        type Resource = Ticket;

        fn new(user: u32, ticket: &Ticket) -> Self {
            Self {
                user,
                owner: ticket.owner,
                closed: ticket.closed,
            }
        }

        fn actions() -> Vec<Action<Self, bool>> {
            vec![
                Action::new("show?", Self::show),
                Action::new("update?", Self::update),
                Action::new("close?", Self::close),
            ]
        }
    }

    #[test]
    fn test_owner_permissions() {
        let ticket = Ticket {
            owner: 1,
            closed: true,
        };

        let permitted = permitted_actions::<TicketAuthorization>(1, &ticket);
        assert_eq!(permitted, BTreeSet::from(["close?", "show?"]));

        let forbidden = forbidden_actions::<TicketAuthorization>(1, &ticket);
        assert_eq!(forbidden, BTreeSet::from(["update?"]));
    }

    #[test]
    fn test_stranger_permissions() {
        let ticket = Ticket {
            owner: 1,
            closed: false,
        };

        let (permitted, forbidden) = partition_actions::<TicketAuthorization>(2, &ticket);
        assert_eq!(permitted, BTreeSet::from(["show?"]));
        assert_eq!(forbidden, BTreeSet::from(["close?", "update?"]));
    }

    #[test]
    fn test_action_names() {
        assert_eq!(
            authorization_action_names::<TicketAuthorization>(),
            vec!["show?", "update?", "close?"]
        );
    }
}
