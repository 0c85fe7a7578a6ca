//! Unit tests for the reservation substrate.

#[cfg(test)]
mod helpers {
    use mapf_core::{AgentId, Position};

    pub fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    pub const A: AgentId = AgentId(0);
    pub const B: AgentId = AgentId(1);
}

#[cfg(test)]
mod table {
    use super::helpers::{A, B, p};
    use crate::ReservationTable;

    #[test]
    fn cell_reservation_is_tick_scoped() {
        let mut table = ReservationTable::new();
        table.reserve_cell(A, p(2, 2), 5, false);
        assert!(!table.is_cell_free(p(2, 2), 5));
        assert!(table.is_cell_free(p(2, 2), 4));
        assert!(table.is_cell_free(p(2, 2), 6));
    }

    #[test]
    fn permanent_covers_later_ticks_only() {
        let mut table = ReservationTable::new();
        table.reserve_cell(A, p(1, 1), 3, true);
        assert!(table.is_cell_free(p(1, 1), 2), "earlier queries must be unaffected");
        assert!(!table.is_cell_free(p(1, 1), 3));
        assert!(!table.is_cell_free(p(1, 1), 100));
        assert!(!table.is_free_forever(p(1, 1), 0));
        assert!(!table.resting_allowed(p(1, 1), 0));
    }

    #[test]
    fn free_forever_sees_future_cell_claims() {
        let mut table = ReservationTable::new();
        table.reserve_cell(A, p(0, 0), 7, false);
        assert!(table.is_cell_free(p(0, 0), 3));
        assert!(!table.is_free_forever(p(0, 0), 3));
        assert!(!table.resting_allowed(p(0, 0), 3));
        assert!(table.resting_allowed(p(0, 0), 7));
        assert!(table.is_free_forever(p(0, 0), 8));
    }

    #[test]
    fn edge_conflict_is_symmetric() {
        let mut table = ReservationTable::new();
        table.reserve_edge(A, p(0, 0), p(1, 0), 2);
        assert!(!table.is_edge_free(p(0, 0), p(1, 0), 2));
        assert!(!table.is_edge_free(p(1, 0), p(0, 0), 2), "swap must be forbidden");
        assert!(table.is_edge_free(p(0, 0), p(1, 0), 3));
    }

    #[test]
    fn cancel_restores_all_indices() {
        let mut table = ReservationTable::new();
        table.reserve_cell(A, p(0, 0), 0, false);
        table.reserve_edge(A, p(0, 0), p(1, 0), 0);
        table.reserve_cell(A, p(1, 0), 1, true);
        table.reserve_cell(B, p(4, 4), 0, false);

        table.cancel_agent(A);
        assert!(table.is_cell_free(p(0, 0), 0));
        assert!(table.is_edge_free(p(0, 0), p(1, 0), 0));
        assert!(table.is_free_forever(p(1, 0), 0));
        // B's reservation survives.
        assert!(!table.is_cell_free(p(4, 4), 0));
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let mut table = ReservationTable::new();
        table.reserve_cell(A, p(0, 0), 0, false);
        table.reserve_edge(A, p(0, 0), p(0, 1), 0);
        table.reserve_cell(A, p(0, 1), 1, true);

        let snapshot = table.reservations_of(A);
        table.cancel_agent(A);
        assert!(table.is_free_forever(p(0, 1), 0));

        table.restore(A, snapshot);
        assert!(!table.is_cell_free(p(0, 0), 0));
        assert!(!table.is_edge_free(p(0, 1), p(0, 0), 0));
        assert!(!table.is_free_forever(p(0, 1), 1));
        assert!(!table.resting_allowed(p(0, 1), 5));
    }

    #[test]
    fn cancel_unknown_agent_is_noop() {
        let mut table = ReservationTable::new();
        table.reserve_cell(A, p(0, 0), 0, false);
        table.cancel_agent(B);
        assert!(!table.is_cell_free(p(0, 0), 0));
    }
}

#[cfg(test)]
mod claim {
    use super::helpers::{A, B, p};
    use crate::{ClaimContainer, ClaimEdge};

    #[test]
    fn edge_equality_is_commutative() {
        assert_eq!(ClaimEdge::new(p(0, 0), p(1, 0)), ClaimEdge::new(p(1, 0), p(0, 0)));
    }

    #[test]
    fn target_cell_exclusivity() {
        let mut claims = ClaimContainer::new();
        assert!(claims.try_claim(A, p(0, 0), p(1, 0)));
        assert!(!claims.try_claim(B, p(2, 0), p(1, 0)), "same target must be rejected");
        claims.remove_claims(A);
        assert!(claims.try_claim(B, p(2, 0), p(1, 0)));
    }

    #[test]
    fn swap_is_rejected_via_edge_claim() {
        let mut claims = ClaimContainer::new();
        assert!(claims.try_claim(A, p(0, 0), p(1, 0)));
        assert!(!claims.try_claim(B, p(1, 0), p(0, 0)), "head-on swap must be rejected");
    }

    #[test]
    fn failed_claim_records_nothing() {
        let mut claims = ClaimContainer::new();
        assert!(claims.try_claim(A, p(0, 0), p(1, 0)));
        assert!(!claims.try_claim(B, p(1, 0), p(0, 0)));
        // B's failed attempt must not leave a dangling edge claim.
        assert!(claims.target_of(B).is_none());
        claims.remove_claims(A);
        assert!(!claims.is_edge_claimed(p(0, 0), p(1, 0)));
    }

    #[test]
    fn wait_claims_have_no_edge() {
        let mut claims = ClaimContainer::new();
        assert!(claims.try_claim(A, p(3, 3), p(3, 3)));
        assert!(claims.is_position_claimed(p(3, 3)));
        assert!(!claims.is_edge_claimed(p(3, 3), p(3, 3)));
    }
}

#[cfg(test)]
mod constraint {
    use super::helpers::p;
    use crate::{ConstraintSet, EdgeConstraint, VertexConstraint};
    use mapf_core::TraversalId;

    const T0: TraversalId = TraversalId(0);
    const T1: TraversalId = TraversalId(1);

    #[test]
    fn constraints_bind_one_traversal() {
        let mut set = ConstraintSet::new();
        set.insert_vertex(VertexConstraint { traversal: T0, at: p(1, 1).at(4) });
        assert!(set.forbids_cell(T0, p(1, 1).at(4)));
        assert!(!set.forbids_cell(T1, p(1, 1).at(4)));
        assert!(!set.forbids_cell(T0, p(1, 1).at(5)));
    }

    #[test]
    fn edge_constraint_covers_both_directions() {
        let mut set = ConstraintSet::new();
        set.insert_edge(EdgeConstraint { traversal: T0, at: p(0, 0).to(p(1, 0)).at(2) });
        assert!(set.forbids_edge(T0, p(0, 0).to(p(1, 0)).at(2)));
        assert!(set.forbids_edge(T0, p(1, 0).to(p(0, 0)).at(2)));
        assert!(!set.forbids_edge(T0, p(0, 0).to(p(1, 0)).at(3)));
    }

    #[test]
    fn forbids_cell_after_scans_future_only() {
        let mut set = ConstraintSet::new();
        set.insert_vertex(VertexConstraint { traversal: T0, at: p(2, 2).at(9) });
        assert!(set.forbids_cell_after(T0, p(2, 2), 5));
        assert!(!set.forbids_cell_after(T0, p(2, 2), 9));
        assert!(!set.forbids_cell_after(T1, p(2, 2), 5));
    }
}
