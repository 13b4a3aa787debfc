//! Milestone engine — two-phase fixed-point evaluation.
//!
//! Phase one completes every incomplete milestone whose condition and
//! prerequisite hold, lowest tier first, applying one-shot rewards as it
//! goes. Phase two walks completed milestones and revokes the first whose
//! condition or prerequisite no longer holds, then restarts the scan —
//! revoking one milestone can invalidate others that depended on it. The
//! scan count is capped: the shipped catalogs are validated acyclic, so
//! hitting the cap means broken content, not a state the engine should
//! spin on.

use crate::catalog::{Catalogs, MilestoneDef};
use crate::events::Notification;
use crate::state::GameState;

/// Safety valve for the revocation fixed point.
pub const MAX_REVOCATION_SCANS: u32 = 1_000;

fn prerequisite_met(state: &GameState, def: &MilestoneDef) -> bool {
    match &def.prerequisite_id {
        Some(prereq) => state.completed_milestones.contains(prereq),
        None => true,
    }
}

/// Milestone defs in deterministic evaluation order: ascending tier, with
/// catalog order breaking ties.
fn evaluation_order(catalogs: &Catalogs) -> Vec<&MilestoneDef> {
    let mut defs: Vec<&MilestoneDef> = catalogs.milestones.iter().collect();
    defs.sort_by_key(|def| def.tier);
    defs
}

/// Run both phases to their fixed point. Idempotent per call: a second
/// invocation against the returned state changes nothing.
pub fn check_milestones(
    state: &mut GameState,
    catalogs: &Catalogs,
    notes: &mut Vec<Notification>,
) {
    let order = evaluation_order(catalogs);

    // Completion phase. Candidates are frozen against the incoming state,
    // then applied in tier order so reward stacking is deterministic.
    let completable: Vec<&MilestoneDef> = order
        .iter()
        .copied()
        .filter(|def| !state.completed_milestones.contains(&def.id))
        .filter(|def| prerequisite_met(state, def))
        .filter(|def| def.condition.holds(state))
        .collect();

    for def in completable {
        state.completed_milestones.insert(def.id.clone());
        if let Some(reward) = &def.reward {
            reward.apply(state);
        }
        log::info!("milestone unlocked: {}", def.id);
        notes.push(Notification::MilestoneUnlocked {
            id: def.id.clone(),
            name: def.name.clone(),
            tier: def.tier,
        });
    }

    // Revocation phase: iterate until a full scan revokes nothing.
    let mut scans = 0;
    loop {
        scans += 1;
        if scans > MAX_REVOCATION_SCANS {
            log::warn!(
                "milestone revocation did not settle after {} scans; content likely cyclic",
                MAX_REVOCATION_SCANS
            );
            break;
        }

        let revoked = order
            .iter()
            .copied()
            .filter(|def| !def.only_one_time)
            .filter(|def| state.completed_milestones.contains(&def.id))
            .find(|def| !def.condition.holds(state) || !prerequisite_met(state, def));

        match revoked {
            Some(def) => {
                state.completed_milestones.remove(&def.id);
                log::info!("milestone revoked: {}", def.id);
                notes.push(Notification::MilestoneRevoked {
                    id: def.id.clone(),
                    name: def.name.clone(),
                });
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MilestoneCondition;
    use outpost_logic::resources::ResourceKind;

    fn notes() -> Vec<Notification> {
        Vec::new()
    }

    /// A small catalog with a three-tier metals chain for fixed-point
    /// tests. `linked` adds the tier-to-tier prerequisite edges.
    fn tiered_catalogs(linked: bool) -> Catalogs {
        let mut catalogs = Catalogs::standard();
        catalogs.milestones.clear();
        // Catalog order deliberately scrambled; tier ordering must win.
        for tier in [3u32, 1, 2] {
            catalogs.milestones.push(MilestoneDef {
                id: format!("stockpile_{}", tier),
                name: format!("Stockpile {}", tier),
                description: String::new(),
                category: "test",
                tier,
                prerequisite_id: (linked && tier > 1).then(|| format!("stockpile_{}", tier - 1)),
                only_one_time: false,
                condition: MilestoneCondition::ResourceAtLeast {
                    kind: ResourceKind::Metals,
                    target: tier as f64 * 100.0,
                },
                reward: None,
            });
        }
        catalogs
    }

    fn unlocked_ids(notes: &[Notification]) -> Vec<String> {
        notes
            .iter()
            .filter_map(|note| match note {
                Notification::MilestoneUnlocked { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Run `check_milestones` until a pass produces no notifications.
    fn settle(state: &mut GameState, catalogs: &Catalogs) -> Vec<Notification> {
        let mut all = Vec::new();
        for _ in 0..10 {
            let mut n = notes();
            check_milestones(state, catalogs, &mut n);
            if n.is_empty() {
                break;
            }
            all.extend(n);
        }
        all
    }

    fn state_with_metals(amount: f64) -> GameState {
        let mut state = GameState::new(0);
        let pool = state.resources.get_mut(ResourceKind::Metals);
        pool.base_capacity = 10_000.0;
        pool.capacity = 10_000.0;
        pool.amount = amount;
        state
    }

    #[test]
    fn test_same_call_completions_sorted_by_tier() {
        // No prerequisite links: all three qualify at once, and rewards
        // must land lowest tier first despite the scrambled catalog order.
        let catalogs = tiered_catalogs(false);
        let mut state = state_with_metals(350.0);
        let mut n = notes();
        check_milestones(&mut state, &catalogs, &mut n);
        assert_eq!(
            unlocked_ids(&n),
            vec!["stockpile_1", "stockpile_2", "stockpile_3"]
        );
    }

    #[test]
    fn test_prerequisite_chain_completes_one_tier_per_check() {
        // Candidates are frozen against the incoming state, so each check
        // call advances a linked chain by exactly one tier.
        let catalogs = tiered_catalogs(true);
        let mut state = state_with_metals(350.0);
        for expected in ["stockpile_1", "stockpile_2", "stockpile_3"] {
            let mut n = notes();
            check_milestones(&mut state, &catalogs, &mut n);
            assert_eq!(unlocked_ids(&n), vec![expected]);
        }
        assert_eq!(state.completed_milestones.len(), 3);
    }

    #[test]
    fn test_check_is_idempotent_once_settled() {
        let catalogs = tiered_catalogs(true);
        let mut state = state_with_metals(350.0);
        settle(&mut state, &catalogs);
        let settled_state = state.clone();
        let mut again = notes();
        check_milestones(&mut state, &catalogs, &mut again);
        assert_eq!(state, settled_state);
        assert!(again.is_empty());
    }

    #[test]
    fn test_prerequisite_gates_completion() {
        // Condition for tier 2 holds, but tier 1 does not complete in the
        // same pass it would need to — the chain cannot be skipped.
        let catalogs = tiered_catalogs(true);
        let mut state = state_with_metals(250.0);
        let mut n = notes();
        check_milestones(&mut state, &catalogs, &mut n);
        assert!(state.completed_milestones.contains("stockpile_1"));
        assert!(!state.completed_milestones.contains("stockpile_2"));
    }

    #[test]
    fn test_revocation_cascades_through_dependents() {
        let catalogs = tiered_catalogs(true);
        let mut state = state_with_metals(350.0);
        settle(&mut state, &catalogs);
        assert_eq!(state.completed_milestones.len(), 3);

        // Drain below every target: tier 1's condition fails, and losing
        // tier 1 invalidates tiers 2 and 3 through their prerequisites.
        state.resources.get_mut(ResourceKind::Metals).amount = 0.0;
        let mut n2 = notes();
        check_milestones(&mut state, &catalogs, &mut n2);
        assert!(state.completed_milestones.is_empty());
        let revoked = n2
            .iter()
            .filter(|note| matches!(note, Notification::MilestoneRevoked { .. }))
            .count();
        assert_eq!(revoked, 3);
    }

    #[test]
    fn test_only_one_time_survives_revocation() {
        let mut catalogs = tiered_catalogs(false);
        // Entry 1 in catalog order is the tier-1 milestone.
        catalogs.milestones[1].only_one_time = true;
        let mut state = state_with_metals(150.0);
        let mut n = notes();
        check_milestones(&mut state, &catalogs, &mut n);
        assert!(state.completed_milestones.contains("stockpile_1"));

        state.resources.get_mut(ResourceKind::Metals).amount = 0.0;
        let mut n2 = notes();
        check_milestones(&mut state, &catalogs, &mut n2);
        assert!(state.completed_milestones.contains("stockpile_1"));
    }

    #[test]
    fn test_no_complete_then_revoke_in_one_call() {
        // A milestone completed by this very call must not be revoked by
        // the same call's revocation phase when its condition still holds.
        let catalogs = tiered_catalogs(true);
        let mut state = state_with_metals(100.0);
        let mut n = notes();
        check_milestones(&mut state, &catalogs, &mut n);
        assert!(state.completed_milestones.contains("stockpile_1"));
        assert!(!n
            .iter()
            .any(|note| matches!(note, Notification::MilestoneRevoked { .. })));
    }

    #[test]
    fn test_reward_capacity_bonus_lands() {
        let catalogs = Catalogs::standard();
        let mut state = state_with_metals(10_000.0);
        let mut n = notes();
        check_milestones(&mut state, &catalogs, &mut n);
        assert!(state.completed_milestones.contains("metal_magnate_1"));
        assert!(
            (state.resources.get(ResourceKind::Metals).bonus_capacity - 1_000.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_black_hole_unlock_is_one_way() {
        let catalogs = Catalogs::standard();
        let mut state = GameState::new(0);
        state.researched.insert("singularity_studies".into());
        let mut n = notes();
        check_milestones(&mut state, &catalogs, &mut n);
        assert!(state.black_hole_unlocked());

        // Forgetting the tech (hypothetically) must not re-lock the gate.
        state.researched.clear();
        let mut n2 = notes();
        check_milestones(&mut state, &catalogs, &mut n2);
        assert!(state.completed_milestones.contains("deep_science"));
        assert!(state.black_hole_unlocked());
    }
}
