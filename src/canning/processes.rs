use bevy::prelude::*;
use std::fmt;

use super::formulas::effective_processing_time;
use crate::shared::*;

// ──────────────────────────────────────────────────────────────────────────────
// PROCESS INSTANCE
// ──────────────────────────────────────────────────────────────────────────────

impl ProcessInstance {
    pub fn new(recipe_id: impl Into<String>, total_time: u32, automated: bool) -> Self {
        let total_time = total_time.max(1);
        Self {
            recipe_id: recipe_id.into(),
            remaining_time: total_time,
            total_time,
            completed: false,
            automated,
        }
    }

    /// Counts down `seconds`. Never goes below zero, never counts back up.
    pub fn advance(&mut self, seconds: u32) {
        self.remaining_time = self.remaining_time.saturating_sub(seconds);
        self.refresh_completed();
    }

    pub fn refresh_completed(&mut self) {
        self.completed = self.remaining_time == 0;
    }

    /// 0.0 when just started, 1.0 when done.
    pub fn progress(&self) -> f32 {
        if self.total_time == 0 {
            return 1.0;
        }
        let elapsed = self.total_time.saturating_sub(self.remaining_time);
        elapsed as f32 / self.total_time as f32
    }
}

/// Advance every active process. Returns how many finished during this call.
pub fn advance_processes(state: &mut CanningState, seconds: u32) -> usize {
    let mut finished = 0;
    for process in &mut state.active_processes {
        let was_completed = process.completed;
        process.advance(seconds);
        if process.completed && !was_completed {
            finished += 1;
        }
    }
    finished
}

// ──────────────────────────────────────────────────────────────────────────────
// STARTING A PROCESS
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum StartProcessError {
    UnknownRecipe(String),
    RecipeLocked(String),
    NoFreeSlot { max: u32 },
}

impl fmt::Display for StartProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartProcessError::UnknownRecipe(id) => write!(f, "unknown recipe '{id}'"),
            StartProcessError::RecipeLocked(id) => write!(f, "recipe '{id}' is still locked"),
            StartProcessError::NoFreeSlot { max } => {
                write!(f, "all {max} canning slots are busy")
            }
        }
    }
}

impl std::error::Error for StartProcessError {}

/// Queue a new process for an unlocked recipe, timed with the current speed
/// upgrade. Ingredient bookkeeping belongs to the caller.
pub fn start_process(
    state: &mut CanningState,
    recipe_id: &str,
    automated: bool,
) -> Result<(), StartProcessError> {
    let recipe = state
        .recipe(recipe_id)
        .ok_or_else(|| StartProcessError::UnknownRecipe(recipe_id.to_string()))?;
    if !recipe.unlocked {
        return Err(StartProcessError::RecipeLocked(recipe_id.to_string()));
    }
    if !state.has_free_slot() {
        return Err(StartProcessError::NoFreeSlot {
            max: state.max_simultaneous_processes,
        });
    }

    let total_time = effective_processing_time(recipe.processing_time, &state.upgrades);
    state
        .active_processes
        .push(ProcessInstance::new(recipe_id, total_time, automated));
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// EVENTS / RESOURCES
// ──────────────────────────────────────────────────────────────────────────────

/// Sent by the UI (or the auto-canner) to start a canning process.
#[derive(Event, Debug, Clone)]
pub struct StartCanningEvent {
    pub recipe_id: String,
    pub automated: bool,
}

/// One-second cadence for process countdowns.
#[derive(Resource, Debug, Clone)]
pub struct CanningTickTimer(pub Timer);

impl Default for CanningTickTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(1.0, TimerMode::Repeating))
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// SYSTEMS
// ──────────────────────────────────────────────────────────────────────────────

pub fn tick_canning_processes(
    time: Res<Time>,
    mut timer: ResMut<CanningTickTimer>,
    mut progress: ResMut<GameProgress>,
) {
    timer.0.tick(time.delta());
    let seconds = timer.0.times_finished_this_tick();
    if seconds == 0 || progress.canning.active_processes.is_empty() {
        return;
    }

    let finished = advance_processes(&mut progress.canning, seconds);
    if finished > 0 {
        info!("[Canning] {} process(es) finished", finished);
    }
}

pub fn handle_start_canning(
    mut events: EventReader<StartCanningEvent>,
    mut progress: ResMut<GameProgress>,
) {
    for ev in events.read() {
        match start_process(&mut progress.canning, &ev.recipe_id, ev.automated) {
            Ok(()) => info!("[Canning] Started '{}'", ev.recipe_id),
            Err(e) => warn!("[Canning] Could not start '{}': {}", ev.recipe_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::lean::expand;

    fn fresh_state() -> CanningState {
        let registry = SchemaRegistry::current();
        let mut lean = LeanCanningProgress::default();
        lean.canning_experience = 1_000.0;
        expand(&lean, &[], 10_000.0, &registry)
    }

    #[test]
    fn test_process_completion_tracks_remaining_time() {
        let mut process = ProcessInstance::new("pickled_beets", 3, false);
        assert!(!process.completed);
        process.advance(2);
        assert_eq!(process.remaining_time, 1);
        assert!(!process.completed);
        process.advance(5);
        assert_eq!(process.remaining_time, 0);
        assert!(process.completed);
        assert_eq!(process.progress(), 1.0);
    }

    #[test]
    fn test_new_process_has_positive_total_time() {
        let process = ProcessInstance::new("pickled_beets", 0, true);
        assert_eq!(process.total_time, 1);
        assert_eq!(process.remaining_time, 1);
    }

    #[test]
    fn test_advance_processes_counts_only_new_completions() {
        let mut state = fresh_state();
        state.active_processes = vec![
            ProcessInstance::new("pickled_beets", 1, false),
            ProcessInstance::new("carrot_relish", 10, false),
        ];
        assert_eq!(advance_processes(&mut state, 1), 1);
        assert_eq!(advance_processes(&mut state, 1), 0);
        assert!(state.active_processes[0].completed);
        assert_eq!(state.active_processes[1].remaining_time, 8);
    }

    #[test]
    fn test_start_process_respects_lock_and_capacity() {
        let mut state = fresh_state();
        assert_eq!(state.max_simultaneous_processes, 1);

        assert!(matches!(
            start_process(&mut state, "harvest_medley", false),
            Err(StartProcessError::RecipeLocked(_))
        ));
        assert!(matches!(
            start_process(&mut state, "no_such_recipe", false),
            Err(StartProcessError::UnknownRecipe(_))
        ));

        start_process(&mut state, "pickled_beets", false).unwrap();
        assert_eq!(state.active_processes[0].total_time, 30);
        assert!(matches!(
            start_process(&mut state, "carrot_relish", false),
            Err(StartProcessError::NoFreeSlot { max: 1 })
        ));
    }
}
