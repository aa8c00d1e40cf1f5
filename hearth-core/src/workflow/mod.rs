//! Workflow definitions: the per-pile state machines driven by the trigger
//! engine, and the pluggable assignee/reviewer resolution seam.
//!
//! A workflow is a finite sequence of stages. Each stage assigns a task and
//! waits for an externally reported completion; review-gated stages also wait
//! for a reviewer sign-off, and delayed stages are scheduled relative to the
//! previous completion rather than slept on.

use chrono::TimeDelta;
use rand::Rng;
use serde::{Deserialize, Serialize};

mod engine;

pub use engine::{EngineEffect, TriggerEngine};

/// The built-in workflow state machines, one per pile role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowKind {
    Cleaning,
    Laundry,
    Dishes,
    MealPlanning,
    Grocery,
    Cooking,
}

/// One stage of a workflow.
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub name: &'static str,
    /// Completion holds at review until a reviewer signs off.
    pub requires_review: bool,
    /// Assignment is deferred this long after the previous stage completes.
    pub delay_after_previous: Option<TimeDelta>,
    /// Completions within this window are on time; used for the efficiency
    /// score. Stages without an expectation score full marks.
    pub expected_duration: Option<TimeDelta>,
}

fn stage(
    name: &'static str,
    requires_review: bool,
    delay_after_previous: Option<TimeDelta>,
    expected_duration: Option<TimeDelta>,
) -> StageSpec {
    StageSpec {
        name,
        requires_review,
        delay_after_previous,
        expected_duration,
    }
}

impl WorkflowKind {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Cleaning => "cleaning",
            Self::Laundry => "laundry",
            Self::Dishes => "dishes",
            Self::MealPlanning => "meal-planning",
            Self::Grocery => "grocery",
            Self::Cooking => "cooking",
        }
    }

    /// The stage sequence for this workflow. All workflows loop: after the
    /// last stage completes the bound pile returns to baseline and
    /// monitoring restarts.
    pub fn stages(&self) -> Vec<StageSpec> {
        match self {
            Self::Cleaning => vec![stage("clean", true, None, Some(TimeDelta::hours(2)))],
            Self::Laundry => vec![
                stage("wash", false, None, Some(TimeDelta::hours(1))),
                // Dryer loading prompt comes a while after the wash cycle.
                stage(
                    "dry",
                    false,
                    Some(TimeDelta::minutes(45)),
                    Some(TimeDelta::hours(2)),
                ),
                stage(
                    "unload",
                    true,
                    Some(TimeDelta::minutes(15)),
                    Some(TimeDelta::minutes(30)),
                ),
                stage("fold", false, None, Some(TimeDelta::hours(1))),
            ],
            Self::Dishes => vec![
                stage("load", false, None, Some(TimeDelta::minutes(30))),
                stage(
                    "unload",
                    false,
                    Some(TimeDelta::hours(1)),
                    Some(TimeDelta::minutes(15)),
                ),
            ],
            Self::MealPlanning => vec![stage("plan", true, None, Some(TimeDelta::days(1)))],
            Self::Grocery => vec![stage("shop", false, None, Some(TimeDelta::days(1)))],
            Self::Cooking => vec![stage("cook", false, None, Some(TimeDelta::hours(2)))],
        }
    }
}

/// Binds a pile (by full path) to a workflow, with the user pools the
/// resolver draws from. Part of the declarative configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowBinding {
    pub pile_path: Vec<String>,
    pub kind: WorkflowKind,
    /// Firing threshold; defaults to the pile's max_value.
    #[serde(default)]
    pub threshold: Option<i64>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub reviewers: Vec<String>,
}

/// Assignee selection policy. Pluggable so tests can pick deterministically.
pub trait AssigneeResolver: Send + Sync {
    fn pick_assignee(&self, pool: &[String]) -> Option<String>;
    fn pick_reviewer(&self, pool: &[String], excluding: &str) -> Option<String>;
}

/// Uniform random selection from the pool; reviewers never review their own
/// work, so an exhausted reviewer pool yields no reviewer.
pub struct RandomResolver;

impl AssigneeResolver for RandomResolver {
    fn pick_assignee(&self, pool: &[String]) -> Option<String> {
        if pool.is_empty() {
            return None;
        }
        let mut rng = rand::thread_rng();
        pool.get(rng.gen_range(0..pool.len())).cloned()
    }

    fn pick_reviewer(&self, pool: &[String], excluding: &str) -> Option<String> {
        let candidates: Vec<&String> = pool.iter().filter(|u| u.as_str() != excluding).collect();
        if candidates.is_empty() {
            return None;
        }
        let mut rng = rand::thread_rng();
        Some(candidates[rng.gen_range(0..candidates.len())].clone())
    }
}
