pub mod action_log;
pub mod agent;
pub mod cell;
pub mod config;
pub mod environment;
pub mod error;
pub mod grid;
pub mod heuristic;
pub mod layout;
pub mod search;
pub mod session;

pub use agent::Agent;
pub use cell::{Annotation, Cell, Position};
pub use error::{GridError, Result};
pub use grid::Grid;
pub use search::{PathResult, StepHook};
pub use session::{ReplanPolicy, Session};
