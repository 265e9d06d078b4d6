use crate::search::PathResult;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How a planning run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanOutcome {
    Found { length: usize },
    NotFound,
    Cancelled,
}

impl From<&PathResult> for PlanOutcome {
    fn from(result: &PathResult) -> Self {
        match result {
            PathResult::Found(path) => PlanOutcome::Found { length: path.len() },
            PathResult::NotFound => PlanOutcome::NotFound,
            PathResult::Cancelled => PlanOutcome::Cancelled,
        }
    }
}

/// Session events that touch the grid or the planner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    SetBarrier { row: i32, col: i32 },
    ClearBarrier { row: i32, col: i32 },
    SetGoal { row: i32, col: i32 },
    /// Barrier dropped by the random injector
    InjectObstacle { row: i32, col: i32 },
    /// Grid replaced wholesale
    Reset { size: i32 },
    /// `automatic` is set when the re-plan policy triggered the run
    Plan { outcome: PlanOutcome, elapsed_ms: u64, automatic: bool },
}

/// Logged action with timestamp
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggedAction {
    /// Milliseconds since start
    pub timestamp_ms: u64,
    pub action: Action,
}

/// Action logger
pub struct ActionLog {
    start_time: Instant,
    actions: Vec<LoggedAction>,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionLog {
    pub fn new() -> Self {
        ActionLog {
            start_time: Instant::now(),
            actions: Vec::new(),
        }
    }

    /// Log an action with current timestamp
    pub fn log(&mut self, action: Action) {
        let timestamp_ms = self.start_time.elapsed().as_millis() as u64;
        self.actions.push(LoggedAction {
            timestamp_ms,
            action,
        });
    }

    pub fn actions(&self) -> &[LoggedAction] {
        &self.actions
    }

    /// Save log to JSON file
    pub fn save_to_file(&self, path: &str) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(&self.actions)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Print log to console
    pub fn print(&self) {
        println!("\n=== Action Log ({} events) ===", self.actions.len());
        for (i, logged) in self.actions.iter().enumerate() {
            println!("[{:6}ms] #{:3} {:?}", logged.timestamp_ms, i + 1, logged.action);
        }
        println!("=== End of Log ===\n");
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let mut barriers_set = 0;
        let mut barriers_cleared = 0;
        let mut injected = 0;
        let mut resets = 0;
        let mut plans = 0;
        let mut automatic_plans = 0;
        let mut found = 0;

        for logged in &self.actions {
            match &logged.action {
                Action::SetBarrier { .. } => barriers_set += 1,
                Action::ClearBarrier { .. } => barriers_cleared += 1,
                Action::InjectObstacle { .. } => injected += 1,
                Action::Reset { .. } => resets += 1,
                Action::Plan { outcome, automatic, .. } => {
                    plans += 1;
                    if *automatic {
                        automatic_plans += 1;
                    }
                    if matches!(outcome, PlanOutcome::Found { .. }) {
                        found += 1;
                    }
                }
                Action::SetGoal { .. } => {}
            }
        }

        let duration = self.actions.last().map_or(0, |last| last.timestamp_ms);

        format!(
            "Session Duration: {}ms\n\
             Total Events: {}\n\
             Grid Modifications: {} barriers set, {} cleared, {} injected, {} resets\n\
             Planning: {} runs ({} automatic), {} found a path",
            duration,
            self.actions.len(),
            barriers_set,
            barriers_cleared,
            injected,
            resets,
            plans,
            automatic_plans,
            found
        )
    }
}
