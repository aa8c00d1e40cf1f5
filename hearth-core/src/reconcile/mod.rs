//! Reconciler: folds the declarative pile configuration into live state.
//!
//! Runs on a fixed interval and is idempotent - a second pass over unchanged
//! inputs makes no further mutation. Reconciliation is a total function over
//! its inputs; it never fails.
//!
//! Two passes, in order:
//! 1. Additive: every configured pile missing from state is synthesized from
//!    its config node; matched piles keep their live value.
//! 2. Subtractive: piles with no config node at the same tree position are
//!    pruned. Deletion is path-qualified and recurses into retained piles, so
//!    an orphaned child under a retained parent is removed as well.

use tracing::debug;

use crate::types::{Pile, PileConfig, SystemState};

/// Reconcile the live pile forest against the configured forest.
pub fn reconcile(config: &[PileConfig], state: &mut SystemState) {
    sync_added(config, &mut state.piles);
    prune_removed(config, &mut state.piles);
}

/// Lock-step walk over one sibling group: ensure every configured id has a
/// live pile, refresh declarative fields on matches, then descend.
fn sync_added(configs: &[PileConfig], piles: &mut Vec<Pile>) {
    for cfg in configs {
        let idx = match piles.iter().position(|p| p.id == cfg.id) {
            Some(idx) => idx,
            None => {
                piles.push(Pile {
                    id: cfg.id.clone(),
                    display_name: cfg.name.clone(),
                    value: cfg.initial_value.clamp(0, cfg.max_value),
                    max_value: cfg.max_value,
                    subpiles: Vec::new(),
                });
                debug!(
                    pile_id = %cfg.id,
                    initial_value = cfg.initial_value,
                    "config change detected: added pile missing from state"
                );
                piles.len() - 1
            }
        };
        // Live value survives config changes; a lowered max_value takes
        // effect through the clamp.
        let pile = &mut piles[idx];
        pile.display_name = cfg.name.clone();
        pile.max_value = cfg.max_value;
        pile.value = pile.value.clamp(0, cfg.max_value);
        sync_added(&cfg.subpiles, &mut pile.subpiles);
    }
}

/// Remove live piles whose id is absent from the config at this tree
/// position, recursing into the children of every retained pile.
fn prune_removed(configs: &[PileConfig], piles: &mut Vec<Pile>) {
    piles.retain(|pile| {
        let keep = configs.iter().any(|cfg| cfg.id == pile.id);
        if !keep {
            debug!(pile_id = %pile.id, "config change detected: removed pile missing from config");
        }
        keep
    });
    for pile in piles.iter_mut() {
        // Retained piles always have a config counterpart per the retain above.
        if let Some(cfg) = configs.iter().find(|cfg| cfg.id == pile.id) {
            prune_removed(&cfg.subpiles, &mut pile.subpiles);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(id: &str, initial: i64, max: i64, subpiles: Vec<PileConfig>) -> PileConfig {
        PileConfig {
            id: id.to_string(),
            name: format!("The {id} pile"),
            initial_value: initial,
            max_value: max,
            subpiles,
        }
    }

    fn config() -> Vec<PileConfig> {
        vec![
            cfg("laundry", 0, 10, vec![cfg("whites", 1, 5, vec![])]),
            cfg("dishes", 2, 4, vec![]),
        ]
    }

    #[test]
    fn test_reconcile_creates_mirrored_forest() {
        let config = config();
        let mut state = SystemState::default();
        reconcile(&config, &mut state);

        assert_eq!(state.piles.len(), 2);
        assert_eq!(state.piles[0].id, "laundry");
        assert_eq!(state.piles[0].display_name, "The laundry pile");
        assert_eq!(state.piles[0].value, 0);
        assert_eq!(state.piles[0].subpiles.len(), 1);
        assert_eq!(state.piles[0].subpiles[0].id, "whites");
        assert_eq!(state.piles[0].subpiles[0].value, 1);
        assert_eq!(state.piles[1].id, "dishes");
        assert_eq!(state.piles[1].value, 2);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let config = config();
        let mut state = SystemState::default();
        reconcile(&config, &mut state);
        let first_pass = state.clone();
        reconcile(&config, &mut state);
        assert_eq!(state, first_pass);
    }

    #[test]
    fn test_reconcile_preserves_live_values() {
        let config = config();
        let mut state = SystemState::default();
        reconcile(&config, &mut state);

        state.piles[1].value = 3;
        reconcile(&config, &mut state);
        assert_eq!(state.piles[1].value, 3);
    }

    #[test]
    fn test_reconcile_lowered_max_clamps_value() {
        let mut config = config();
        let mut state = SystemState::default();
        reconcile(&config, &mut state);

        state.piles[1].value = 4;
        config[1].max_value = 3;
        reconcile(&config, &mut state);
        assert_eq!(state.piles[1].value, 3);
        assert_eq!(state.piles[1].max_value, 3);
    }

    #[test]
    fn test_reconcile_deletion_retains_sibling_values() {
        let mut config = config();
        let mut state = SystemState::default();
        reconcile(&config, &mut state);

        state.piles[1].value = 3;
        config.remove(0); // drop laundry, keep dishes
        reconcile(&config, &mut state);

        assert_eq!(state.piles.len(), 1);
        assert_eq!(state.piles[0].id, "dishes");
        assert_eq!(state.piles[0].value, 3);
    }

    #[test]
    fn test_reconcile_prunes_orphaned_child_under_retained_parent() {
        let mut config = config();
        let mut state = SystemState::default();
        reconcile(&config, &mut state);

        config[0].subpiles.clear(); // drop whites, keep laundry
        reconcile(&config, &mut state);

        assert_eq!(state.piles[0].id, "laundry");
        assert!(state.piles[0].subpiles.is_empty());
    }

    #[test]
    fn test_reconcile_deletion_is_path_qualified() {
        // The same id at two positions: deleting one does not spare the other.
        let mut config = vec![
            cfg("kitchen", 0, 5, vec![cfg("towels", 0, 5, vec![])]),
            cfg("bathroom", 0, 5, vec![cfg("towels", 0, 5, vec![])]),
        ];
        let mut state = SystemState::default();
        reconcile(&config, &mut state);

        config[1].subpiles.clear(); // drop bathroom/towels only
        reconcile(&config, &mut state);

        assert_eq!(state.piles[0].subpiles.len(), 1);
        assert!(state.piles[1].subpiles.is_empty());
    }

    #[test]
    fn test_reconcile_initial_value_clamped() {
        let config = vec![cfg("dishes", 9, 4, vec![])];
        let mut state = SystemState::default();
        reconcile(&config, &mut state);
        assert_eq!(state.piles[0].value, 4);
    }

    #[test]
    fn test_reconcile_new_sibling_appended_in_config_order() {
        let mut config = config();
        let mut state = SystemState::default();
        reconcile(&config, &mut state);

        config.push(cfg("groceries", 0, 8, vec![]));
        reconcile(&config, &mut state);
        assert_eq!(state.piles[2].id, "groceries");
    }
}
