//! Trigger engine: watches pile values against thresholds and drives the
//! workflow state machines.
//!
//! Threshold crossings are edge-triggered: a binding fires once when its pile
//! crosses from below to at-or-above threshold and re-arms only after the
//! value drops back below. Time never advances inside the engine; the caller
//! passes `now` into every entry point, which keeps delayed transitions
//! testable without real time passing.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::history;
use crate::pile;
use crate::types::{SystemState, TaskEvent};
use crate::workflow::{AssigneeResolver, RandomResolver, WorkflowBinding, WorkflowKind};

/// Side effects produced by an engine pass, executed by the caller after the
/// state lock is released (bus publishes, notifications).
#[derive(Debug, Clone)]
pub enum EngineEffect {
    TaskAssigned {
        task_id: String,
        task_name: String,
        user: String,
        reviewer: Option<String>,
        pile_path: Vec<String>,
        workflow: WorkflowKind,
    },
    WorkflowFinished {
        pile_path: Vec<String>,
        workflow: WorkflowKind,
    },
}

enum InstancePhase {
    AwaitingCompletion { task_id: String },
    AwaitingReview { task_id: String },
    WaitingDelay { wake_at: DateTime<Utc> },
}

struct WorkflowInstance {
    binding_idx: usize,
    stage_idx: usize,
    phase: InstancePhase,
}

/// Drives workflows from pile thresholds and task-lifecycle events.
///
/// Owns per-binding runtime state (armed flags, live instances); the system
/// state itself is borrowed per call so a single lock can guard both.
pub struct TriggerEngine {
    bindings: Vec<WorkflowBinding>,
    resolver: Box<dyn AssigneeResolver>,
    /// Edge-trigger arming per binding, keyed by joined pile path.
    armed: std::collections::HashMap<String, bool>,
    instances: Vec<WorkflowInstance>,
}

impl TriggerEngine {
    pub fn new(bindings: Vec<WorkflowBinding>) -> Self {
        Self::with_resolver(bindings, Box::new(RandomResolver))
    }

    pub fn with_resolver(bindings: Vec<WorkflowBinding>, resolver: Box<dyn AssigneeResolver>) -> Self {
        Self {
            bindings,
            resolver,
            armed: std::collections::HashMap::new(),
            instances: Vec::new(),
        }
    }

    /// Number of live workflow instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// One evaluation pass: drop instances whose pile disappeared, wake due
    /// delayed stages, then scan thresholds for edge crossings.
    pub fn tick(&mut self, state: &mut SystemState, now: DateTime<Utc>) -> Vec<EngineEffect> {
        let mut effects = Vec::new();

        // Instances orphaned by reconciliation (pile removed from config).
        let bindings = &self.bindings;
        self.instances.retain(|inst| {
            let path = &bindings[inst.binding_idx].pile_path;
            let alive = pile::find_by_path(path, &state.piles).is_some();
            if !alive {
                debug!(pile_path = %path.join("/"), "dropping workflow instance for removed pile");
            }
            alive
        });

        // Delayed stages whose wake time has arrived. Reverse order so a
        // dropped instance cannot shift pending indices.
        let due: Vec<usize> = self
            .instances
            .iter()
            .enumerate()
            .filter_map(|(i, inst)| match inst.phase {
                InstancePhase::WaitingDelay { wake_at } if wake_at <= now => Some(i),
                _ => None,
            })
            .collect();
        for idx in due.into_iter().rev() {
            self.assign_current_stage(idx, state, now, &mut effects);
        }

        // Edge-triggered threshold scan.
        let mut fires: Vec<usize> = Vec::new();
        for (idx, binding) in self.bindings.iter().enumerate() {
            let key = binding.pile_path.join("/");
            let Some(p) = pile::find_by_path(&binding.pile_path, &state.piles) else {
                self.armed.remove(&key);
                continue;
            };
            let threshold = binding.threshold.unwrap_or(p.max_value);
            let armed = self.armed.entry(key).or_insert(true);
            if p.value >= threshold {
                let busy = self.instances.iter().any(|i| i.binding_idx == idx);
                if *armed && !busy {
                    *armed = false;
                    fires.push(idx);
                }
            } else {
                *armed = true;
            }
        }
        for idx in fires {
            info!(
                pile_path = %self.bindings[idx].pile_path.join("/"),
                workflow = self.bindings[idx].kind.slug(),
                "pile threshold crossed, starting workflow"
            );
            self.start_instance(idx, state, now, &mut effects);
        }

        effects
    }

    /// Complete an assigned task and advance its workflow instance, if any.
    ///
    /// The history transition is the source of truth: a missing
    /// `(task, user, assigned)` record is NotFound and nothing changes.
    pub fn complete_task(
        &mut self,
        state: &mut SystemState,
        task_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(TaskEvent, Vec<EngineEffect>)> {
        let inst_pos = self.instances.iter().position(|inst| {
            matches!(&inst.phase, InstancePhase::AwaitingCompletion { task_id: t } if t == task_id)
        });
        let expected = inst_pos.and_then(|pos| {
            let inst = &self.instances[pos];
            let stages = self.bindings[inst.binding_idx].kind.stages();
            stages.get(inst.stage_idx).and_then(|s| s.expected_duration)
        });

        let event = history::complete(&mut state.task_history, task_id, user_id, now, expected)?;

        let mut effects = Vec::new();
        if let Some(pos) = inst_pos {
            // Review gating follows the record: a stage assigned without a
            // reviewer (empty pool) proceeds unreviewed.
            if event.reviewer.is_some() {
                self.instances[pos].phase = InstancePhase::AwaitingReview {
                    task_id: task_id.to_string(),
                };
                debug!(task_id, "task completed, awaiting review");
            } else {
                self.advance(pos, state, now, &mut effects);
            }
        }
        Ok((event, effects))
    }

    /// Complete a review and release the review-gated workflow instance.
    pub fn complete_review(
        &mut self,
        state: &mut SystemState,
        task_id: &str,
        reviewer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(TaskEvent, Vec<EngineEffect>)> {
        let event = history::review(&mut state.task_history, task_id, reviewer_id, now)?;

        let mut effects = Vec::new();
        if let Some(pos) = self.instances.iter().position(|inst| {
            matches!(&inst.phase, InstancePhase::AwaitingReview { task_id: t } if t == task_id)
        }) {
            self.advance(pos, state, now, &mut effects);
        }
        Ok((event, effects))
    }

    fn start_instance(
        &mut self,
        binding_idx: usize,
        state: &mut SystemState,
        now: DateTime<Utc>,
        effects: &mut Vec<EngineEffect>,
    ) {
        self.instances.push(WorkflowInstance {
            binding_idx,
            stage_idx: 0,
            phase: InstancePhase::WaitingDelay { wake_at: now },
        });
        let idx = self.instances.len() - 1;
        self.assign_current_stage(idx, state, now, effects);
    }

    /// Create the task for the instance's current stage and move it to
    /// awaiting-completion. An empty assignee pool drops the instance.
    fn assign_current_stage(
        &mut self,
        inst_idx: usize,
        state: &mut SystemState,
        now: DateTime<Utc>,
        effects: &mut Vec<EngineEffect>,
    ) {
        let (binding_idx, stage_idx) = {
            let inst = &self.instances[inst_idx];
            (inst.binding_idx, inst.stage_idx)
        };
        let binding = &self.bindings[binding_idx];
        let stages = binding.kind.stages();
        let stage = &stages[stage_idx];

        let Some(user) = self.resolver.pick_assignee(&binding.assignees) else {
            warn!(
                workflow = binding.kind.slug(),
                pile_path = %binding.pile_path.join("/"),
                "no assignees configured, dropping workflow instance"
            );
            self.instances.remove(inst_idx);
            return;
        };
        let reviewer = if stage.requires_review {
            self.resolver.pick_reviewer(&binding.reviewers, &user)
        } else {
            None
        };

        let task_id = Uuid::new_v4().to_string();
        let task_name = format!("{}: {}", binding.kind.slug(), stage.name);
        history::assign(
            &mut state.task_history,
            task_id.clone(),
            task_name.clone(),
            user.clone(),
            reviewer.clone(),
            now,
        );
        self.instances[inst_idx].phase = InstancePhase::AwaitingCompletion {
            task_id: task_id.clone(),
        };
        info!(
            task_id = %task_id,
            stage = stage.name,
            user = %user,
            workflow = binding.kind.slug(),
            "stage assigned"
        );
        effects.push(EngineEffect::TaskAssigned {
            task_id,
            task_name,
            user,
            reviewer,
            pile_path: binding.pile_path.clone(),
            workflow: binding.kind,
        });
    }

    /// Move past the instance's current stage: schedule or assign the next
    /// stage, or finish the loop and reset the pile to baseline.
    fn advance(
        &mut self,
        inst_pos: usize,
        state: &mut SystemState,
        now: DateTime<Utc>,
        effects: &mut Vec<EngineEffect>,
    ) {
        let (binding_idx, next_stage) = {
            let inst = &self.instances[inst_pos];
            (inst.binding_idx, inst.stage_idx + 1)
        };
        let (kind, pile_path, stage_count, delay) = {
            let binding = &self.bindings[binding_idx];
            let stages = binding.kind.stages();
            let delay = stages.get(next_stage).and_then(|s| s.delay_after_previous);
            (binding.kind, binding.pile_path.clone(), stages.len(), delay)
        };

        if next_stage >= stage_count {
            if let Some(p) = pile::find_by_path_mut(&pile_path, &mut state.piles) {
                p.value = 0;
            }
            info!(
                pile_path = %pile_path.join("/"),
                workflow = kind.slug(),
                "workflow finished, pile reset to baseline"
            );
            self.instances.remove(inst_pos);
            effects.push(EngineEffect::WorkflowFinished {
                pile_path,
                workflow: kind,
            });
            return;
        }

        self.instances[inst_pos].stage_idx = next_stage;
        match delay {
            Some(delay) => {
                let wake_at = now + delay;
                debug!(
                    workflow = kind.slug(),
                    wake_at = %wake_at,
                    "next stage deferred"
                );
                self.instances[inst_pos].phase = InstancePhase::WaitingDelay { wake_at };
            }
            None => self.assign_current_stage(inst_pos, state, now, effects),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Pile, TaskStatus};

    /// Deterministic resolver: first of each pool.
    struct FirstResolver;

    impl AssigneeResolver for FirstResolver {
        fn pick_assignee(&self, pool: &[String]) -> Option<String> {
            pool.first().cloned()
        }
        fn pick_reviewer(&self, pool: &[String], excluding: &str) -> Option<String> {
            pool.iter().find(|u| u.as_str() != excluding).cloned()
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn state_with_pile(id: &str, value: i64, max: i64) -> SystemState {
        SystemState {
            piles: vec![Pile {
                id: id.to_string(),
                display_name: id.to_string(),
                value,
                max_value: max,
                subpiles: Vec::new(),
            }],
            task_history: Vec::new(),
        }
    }

    fn engine(kind: WorkflowKind, pile: &str, reviewers: Vec<&str>) -> TriggerEngine {
        TriggerEngine::with_resolver(
            vec![WorkflowBinding {
                pile_path: vec![pile.to_string()],
                kind,
                threshold: None,
                assignees: vec!["alice".to_string()],
                reviewers: reviewers.into_iter().map(String::from).collect(),
            }],
            Box::new(FirstResolver),
        )
    }

    fn assigned_task_id(effects: &[EngineEffect]) -> String {
        effects
            .iter()
            .find_map(|e| match e {
                EngineEffect::TaskAssigned { task_id, .. } => Some(task_id.clone()),
                _ => None,
            })
            .expect("expected a TaskAssigned effect")
    }

    #[test]
    fn test_threshold_fire_is_edge_triggered() {
        let mut engine = engine(WorkflowKind::Grocery, "groceries", vec![]);
        let mut state = state_with_pile("groceries", 10, 10);

        let effects = engine.tick(&mut state, ts(0));
        assert_eq!(effects.len(), 1);
        assert_eq!(state.task_history.len(), 1);

        // Held at threshold: no refire on subsequent evaluations.
        let effects = engine.tick(&mut state, ts(60));
        assert!(effects.is_empty());
        assert_eq!(state.task_history.len(), 1);
    }

    #[test]
    fn test_below_threshold_does_not_fire() {
        let mut engine = engine(WorkflowKind::Grocery, "groceries", vec![]);
        let mut state = state_with_pile("groceries", 9, 10);
        assert!(engine.tick(&mut state, ts(0)).is_empty());
    }

    #[test]
    fn test_rearm_after_dropping_below_threshold() {
        let mut engine = engine(WorkflowKind::Grocery, "groceries", vec![]);
        let mut state = state_with_pile("groceries", 10, 10);

        let effects = engine.tick(&mut state, ts(0));
        let task = assigned_task_id(&effects);
        // Single-stage workflow: completing it resets the pile to 0.
        engine
            .complete_task(&mut state, &task, "alice", ts(60))
            .unwrap();
        assert_eq!(state.piles[0].value, 0);
        assert_eq!(engine.instance_count(), 0);

        // Re-arms below threshold, then fires again on the next crossing.
        engine.tick(&mut state, ts(120));
        state.piles[0].value = 10;
        let effects = engine.tick(&mut state, ts(180));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_explicit_threshold_overrides_max_value() {
        let mut engine = TriggerEngine::with_resolver(
            vec![WorkflowBinding {
                pile_path: vec!["dishes".to_string()],
                kind: WorkflowKind::Dishes,
                threshold: Some(3),
                assignees: vec!["alice".to_string()],
                reviewers: vec![],
            }],
            Box::new(FirstResolver),
        );
        let mut state = state_with_pile("dishes", 3, 10);
        assert_eq!(engine.tick(&mut state, ts(0)).len(), 1);
    }

    #[test]
    fn test_laundry_flow_with_delays_and_review() {
        let mut engine = engine(WorkflowKind::Laundry, "laundry", vec!["carol"]);
        let mut state = state_with_pile("laundry", 10, 10);

        // wash assigned immediately on crossing
        let effects = engine.tick(&mut state, ts(0));
        let wash = assigned_task_id(&effects);

        // completing wash defers dry by 45 minutes
        let (_, effects) = engine
            .complete_task(&mut state, &wash, "alice", ts(600))
            .unwrap();
        assert!(effects.is_empty());
        assert_eq!(state.task_history.len(), 1);

        // not yet due
        assert!(engine.tick(&mut state, ts(600 + 44 * 60)).is_empty());

        // due: dry assigned
        let effects = engine.tick(&mut state, ts(600 + 45 * 60));
        let dry = assigned_task_id(&effects);
        assert_ne!(dry, wash);

        // completing dry defers unload by 15 minutes
        let t_dry = 600 + 45 * 60 + 1200;
        engine.complete_task(&mut state, &dry, "alice", ts(t_dry)).unwrap();
        let effects = engine.tick(&mut state, ts(t_dry + 15 * 60));
        let unload = assigned_task_id(&effects);

        // unload requires review: completion holds, review releases fold
        let (event, effects) = engine
            .complete_task(&mut state, &unload, "alice", ts(t_dry + 20 * 60))
            .unwrap();
        assert_eq!(event.reviewer.as_deref(), Some("carol"));
        assert!(effects.is_empty());

        let (event, effects) = engine
            .complete_review(&mut state, &unload, "carol", ts(t_dry + 25 * 60))
            .unwrap();
        assert_eq!(event.status, TaskStatus::Reviewed);
        let fold = assigned_task_id(&effects);

        // completing fold finishes the loop and resets the pile
        let (_, effects) = engine
            .complete_task(&mut state, &fold, "alice", ts(t_dry + 60 * 60))
            .unwrap();
        assert!(matches!(
            effects.as_slice(),
            [EngineEffect::WorkflowFinished { .. }]
        ));
        assert_eq!(state.piles[0].value, 0);
        assert_eq!(engine.instance_count(), 0);
    }

    #[test]
    fn test_complete_task_not_found_passes_through() {
        let mut engine = engine(WorkflowKind::Grocery, "groceries", vec![]);
        let mut state = state_with_pile("groceries", 10, 10);
        engine.tick(&mut state, ts(0));

        let err = engine
            .complete_task(&mut state, "no-such-task", "alice", ts(60))
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::TaskNotFound(_)));
        assert_eq!(engine.instance_count(), 1);
    }

    #[test]
    fn test_review_not_found_before_completion() {
        let mut engine = engine(WorkflowKind::Cleaning, "cleaning", vec!["carol"]);
        let mut state = state_with_pile("cleaning", 10, 10);
        let effects = engine.tick(&mut state, ts(0));
        let task = assigned_task_id(&effects);

        let err = engine
            .complete_review(&mut state, &task, "carol", ts(60))
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::ReviewNotFound(_)));
    }

    #[test]
    fn test_review_gated_stage_without_reviewer_pool_proceeds() {
        let mut engine = engine(WorkflowKind::Cleaning, "cleaning", vec![]);
        let mut state = state_with_pile("cleaning", 10, 10);
        let effects = engine.tick(&mut state, ts(0));
        let task = assigned_task_id(&effects);

        // No reviewer could be assigned, so completion finishes the loop.
        let (event, effects) = engine
            .complete_task(&mut state, &task, "alice", ts(60))
            .unwrap();
        assert!(event.reviewer.is_none());
        assert!(matches!(
            effects.as_slice(),
            [EngineEffect::WorkflowFinished { .. }]
        ));
    }

    #[test]
    fn test_instance_dropped_when_pile_removed() {
        let mut engine = engine(WorkflowKind::Grocery, "groceries", vec![]);
        let mut state = state_with_pile("groceries", 10, 10);
        engine.tick(&mut state, ts(0));
        assert_eq!(engine.instance_count(), 1);

        state.piles.clear();
        engine.tick(&mut state, ts(60));
        assert_eq!(engine.instance_count(), 0);
    }

    #[test]
    fn test_expected_duration_feeds_efficiency() {
        let mut engine = engine(WorkflowKind::Cooking, "meals", vec![]);
        let mut state = state_with_pile("meals", 10, 10);
        let effects = engine.tick(&mut state, ts(0));
        let task = assigned_task_id(&effects);

        // cook expects 2h; completing in 4h scores 0.5 and is late
        let (event, _) = engine
            .complete_task(&mut state, &task, "alice", ts(4 * 3600))
            .unwrap();
        assert!(!event.on_time);
        assert!((event.efficiency_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_wake_is_relative_to_completion_time() {
        let mut engine = engine(WorkflowKind::Dishes, "dishes", vec![]);
        let mut state = state_with_pile("dishes", 4, 4);
        let effects = engine.tick(&mut state, ts(0));
        let load = assigned_task_id(&effects);

        // unload is deferred 1h from the completion, not from the assignment
        engine
            .complete_task(&mut state, &load, "alice", ts(30 * 60))
            .unwrap();
        assert!(engine.tick(&mut state, ts(30 * 60 + 3599)).is_empty());
        assert_eq!(engine.tick(&mut state, ts(30 * 60 + 3600)).len(), 1);
    }
}
