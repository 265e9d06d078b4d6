//! Planning session: an agent plus the obstacle injector and the re-plan policy

use crate::action_log::{Action, ActionLog, PlanOutcome};
use crate::agent::Agent;
use crate::cell::Position;
use crate::config::Config;
use crate::environment::{generate_environment, ObstacleInjector};
use crate::error::Result;
use crate::grid::Grid;
use crate::search::{PathResult, StepHook};
use serde::Deserialize;
use std::time::Instant;
use tracing::info;

/// When a session re-runs planning after the grid changes underneath a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplanPolicy {
    /// Never re-plan automatically; the caller triggers every plan
    #[default]
    Manual,
    /// Re-plan when an injected obstacle lands on the last found path
    OnPathBlocked,
}

/// Result of one session tick
#[derive(Debug, Default, PartialEq)]
pub struct TickOutcome {
    pub obstacle: Option<Position>,
    pub replanned: Option<PathResult>,
}

pub struct Session {
    agent: Agent,
    injector: ObstacleInjector,
    policy: ReplanPolicy,
    log: ActionLog,
}

impl Session {
    pub fn new(agent: Agent, injector: ObstacleInjector, policy: ReplanPolicy) -> Self {
        Session {
            agent,
            injector,
            policy,
            log: ActionLog::new(),
        }
    }

    /// Generate a random environment and wire up the injector from config
    pub fn from_config(config: &Config) -> Result<Self> {
        let env = &config.environment;
        let mut injector = ObstacleInjector::new(env.spawn_probability, env.seed);
        let (grid, start, goal) =
            generate_environment(config.grid.size, env.obstacle_density, injector.rng_mut())?;
        let agent = Agent::new(grid, start, goal)?.with_visibility(env.visibility);
        Ok(Self::new(agent, injector, env.replan_policy))
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn policy(&self) -> ReplanPolicy {
        self.policy
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.log
    }

    pub fn set_barrier(&mut self, row: i32, col: i32) -> Result<bool> {
        let changed = self.agent.grid_mut().set_barrier(row, col)?;
        if changed {
            self.log.log(Action::SetBarrier { row, col });
        }
        Ok(changed)
    }

    pub fn clear_barrier(&mut self, row: i32, col: i32) -> Result<bool> {
        let changed = self.agent.grid_mut().clear_barrier(row, col)?;
        if changed {
            self.log.log(Action::ClearBarrier { row, col });
        }
        Ok(changed)
    }

    pub fn set_goal(&mut self, goal: Position) -> Result<()> {
        self.agent.set_goal(goal)?;
        self.log.log(Action::SetGoal {
            row: goal.row,
            col: goal.col,
        });
        Ok(())
    }

    /// Replace the grid, keeping the agent's start and goal
    pub fn reset(&mut self, grid: Grid) -> Result<()> {
        let size = grid.size();
        self.agent.update_environment(grid)?;
        self.log.log(Action::Reset { size });
        Ok(())
    }

    /// Sample visible cells using the session RNG
    pub fn perceive(&mut self) -> Vec<Position> {
        self.agent.perceive(self.injector.rng_mut())
    }

    /// Run planning on request of the caller
    pub fn plan<H: StepHook + ?Sized>(&mut self, hook: &mut H) -> Result<PathResult> {
        self.run_plan(hook, false)
    }

    fn run_plan<H: StepHook + ?Sized>(&mut self, hook: &mut H, automatic: bool) -> Result<PathResult> {
        let started = Instant::now();
        let result = self.agent.act(hook)?;
        self.log.log(Action::Plan {
            outcome: PlanOutcome::from(&result),
            elapsed_ms: started.elapsed().as_millis() as u64,
            automatic,
        });
        Ok(result)
    }

    /// Advance the environment by one tick and apply the re-plan policy
    pub fn tick<H: StepHook + ?Sized>(&mut self, hook: &mut H) -> Result<TickOutcome> {
        let mut outcome = TickOutcome::default();

        let Some(pos) = self.injector.tick(self.agent.grid_mut()) else {
            return Ok(outcome);
        };
        outcome.obstacle = Some(pos);
        self.log.log(Action::InjectObstacle {
            row: pos.row,
            col: pos.col,
        });

        if self.policy == ReplanPolicy::OnPathBlocked && self.agent.path_invalidated() {
            info!(%pos, "obstacle blocked the current path, re-planning");
            outcome.replanned = Some(self.run_plan(hook, true)?);
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_session(policy: ReplanPolicy) -> Session {
        let agent = Agent::new(Grid::build(6), Position::new(0, 0), Position::new(5, 5)).unwrap();
        Session::new(agent, ObstacleInjector::new(0.0, Some(1)), policy)
    }

    #[test]
    fn test_from_config_is_reproducible_with_seed() {
        let mut config = Config::default();
        config.grid.size = 12;
        config.environment.seed = Some(99);

        let a = Session::from_config(&config).unwrap();
        let b = Session::from_config(&config).unwrap();
        let barriers = |s: &Session| {
            s.agent()
                .grid()
                .cells()
                .filter(|c| c.is_barrier())
                .map(|c| c.position())
                .collect::<Vec<_>>()
        };
        assert_eq!(barriers(&a), barriers(&b));
        assert_eq!(a.agent().start(), Position::new(0, 0));
        assert_eq!(a.agent().goal(), Position::new(11, 11));
    }

    #[test]
    fn test_mutations_are_logged() {
        let mut session = open_session(ReplanPolicy::Manual);
        assert!(session.set_barrier(2, 2).unwrap());
        assert!(!session.set_barrier(2, 2).unwrap());
        assert!(session.clear_barrier(2, 2).unwrap());
        session.plan(&mut |_: &Grid| {}).unwrap();

        let actions: Vec<&Action> = session.action_log().actions().iter().map(|a| &a.action).collect();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0], &Action::SetBarrier { row: 2, col: 2 });
        assert!(matches!(
            actions[2],
            Action::Plan { outcome: PlanOutcome::Found { length: 11 }, automatic: false, .. }
        ));
    }

    #[test]
    fn test_quiet_tick_does_nothing() {
        let mut session = open_session(ReplanPolicy::OnPathBlocked);
        let outcome = session.tick(&mut |_: &Grid| {}).unwrap();
        assert_eq!(outcome, TickOutcome::default());
    }

    #[test]
    fn test_reset_keeps_endpoints() {
        let mut session = open_session(ReplanPolicy::Manual);
        session.set_barrier(3, 3).unwrap();
        session.reset(Grid::build(6)).unwrap();
        assert!(!session.agent().grid().is_barrier(Position::new(3, 3)));
        assert_eq!(session.agent().grid().goal(), Some(Position::new(5, 5)));
    }
}
