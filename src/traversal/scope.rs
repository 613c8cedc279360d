//! Role-instance scope tracking (spec.md §4.6 "Scopes").
//!
//! A relation walked more than once in the same procedure (e.g. a
//! reflexive role-player edge revisited after a different relation) needs
//! to distinguish its separate traversals so that one doesn't mistake the
//! other's tentative role-instance binding for its own. Grounded in this
//! crate's own [`crate::graph::adjacency`] `modified`-set idiom: a plain
//! `HashMap` overlay, entries removed explicitly rather than expiring, with
//! the executor responsible for calling [`ScopeTracker::clear`] at exactly
//! the right backtrack point (spec.md §4.6: "backtracking past the scope
//! origin must clear the scope").

use crate::{
    iid::VertexIID,
    obs::sink::{self, MetricsEvent},
};
use std::collections::HashMap;

/// Resolved `(relation, roleType, player, repetition)` identity (spec.md
/// §4.6), once the procedure's `relation`/`player` vertex ids have been
/// looked up against the current binding set.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ScopeKey {
    pub relation: VertexIID,
    pub role_type: VertexIID,
    pub player: VertexIID,
    pub repetition: u32,
}

/// Tentative role-instance bindings, keyed by scope identity. Entering a
/// scope that's already occupied by a *different* role instance is a
/// conflict (the same relation/role/player/repetition pair must resolve
/// to one role instance within a single branch); entering it again with
/// the *same* role instance is a no-op success, since the same branch may
/// legitimately revisit its own scope.
#[derive(Default)]
pub struct ScopeTracker {
    bound: HashMap<ScopeKey, VertexIID>,
}

impl ScopeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to bind `role_instance` under `key`. Returns `false` if the
    /// scope is already occupied by a different role instance — the
    /// executor must treat this as a failed candidate, not bind it.
    pub fn try_enter(&mut self, key: ScopeKey, role_instance: VertexIID) -> bool {
        match self.bound.get(&key) {
            Some(existing) => existing == &role_instance,
            None => {
                self.bound.insert(key, role_instance);
                true
            }
        }
    }

    /// Clear a scope on backtrack past its origin step (spec.md §4.6).
    pub fn clear(&mut self, key: &ScopeKey) {
        if self.bound.remove(key).is_some() {
            sink::record(MetricsEvent::ScopeCleared);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iid::VertexKind;

    fn vertex(id: u64) -> VertexIID {
        VertexIID::thing_vertex(VertexKind::Entity, 1, id)
    }

    #[test]
    fn revisiting_the_same_scope_with_a_different_instance_is_rejected() {
        let mut tracker = ScopeTracker::new();
        let key = ScopeKey {
            relation: vertex(1),
            role_type: VertexIID::type_vertex(VertexKind::RoleType, 9),
            player: vertex(2),
            repetition: 0,
        };
        assert!(tracker.try_enter(key.clone(), vertex(10)));
        assert!(!tracker.try_enter(key.clone(), vertex(11)));
        assert!(tracker.try_enter(key.clone(), vertex(10)));
    }

    #[test]
    fn clearing_a_scope_allows_a_new_instance_to_bind() {
        let mut tracker = ScopeTracker::new();
        let key = ScopeKey {
            relation: vertex(1),
            role_type: VertexIID::type_vertex(VertexKind::RoleType, 9),
            player: vertex(2),
            repetition: 0,
        };
        assert!(tracker.try_enter(key.clone(), vertex(10)));
        tracker.clear(&key);
        assert!(tracker.try_enter(key, vertex(11)));
    }
}
