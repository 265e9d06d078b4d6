use arboard::Clipboard;
use macroquad::prelude::*;
use maze_solver::agent::Agent;
use maze_solver::config::Config;
use maze_solver::environment::ObstacleInjector;
use maze_solver::search::{StepBudget, StepRecorder};
use maze_solver::{layout, Annotation, Grid, PathResult, Position, Session};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const PANEL_HEIGHT: f32 = 100.0;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn describe(result: &PathResult) -> String {
    match result {
        PathResult::Found(path) => format!("Agent successfully found the path ({} cells).", path.len()),
        PathResult::NotFound => "Agent failed to find a path.".to_string(),
        PathResult::Cancelled => "Search cancelled.".to_string(),
    }
}

fn step_hook(config: &Config) -> StepBudget<StepRecorder> {
    StepBudget::new(StepRecorder::new(), config.search.max_steps.unwrap_or(usize::MAX))
}

/// Print the action log summary and export it when enabled
fn retire_session(session: &Session, config: &Config) {
    info!("{}", session.action_log().summary());
    if config.logging.enable_action_log {
        match session.action_log().save_to_file(&config.logging.action_log_path) {
            Ok(()) => info!(path = %config.logging.action_log_path, "action log saved"),
            Err(e) => warn!("Failed to save action log: {}", e),
        }
    }
}

/// Generate a random environment, plan once, then let obstacles fall
fn run_simulation(config: &Config, ticks: usize) -> maze_solver::Result<()> {
    let mut session = Session::from_config(config)?;
    // Each search, automatic re-plans included, gets its own step budget
    let budget = || StepBudget::new(|_: &Grid| {}, config.search.max_steps.unwrap_or(usize::MAX));

    let result = session.plan(&mut budget())?;
    println!("{}", describe(&result));
    print!("{}", layout::render(session.agent().grid()));

    for _ in 0..ticks {
        let outcome = session.tick(&mut budget())?;
        if let Some(result) = outcome.replanned {
            println!("Re-planned: {}", describe(&result));
        }
    }
    if session.agent().path_invalidated() {
        println!("Warning: the last path is blocked by a new obstacle.");
    }

    retire_session(&session, config);
    Ok(())
}

/// Recorded search steps replayed a few per frame
struct Playback {
    frames: Vec<Vec<Annotation>>,
    index: usize,
}

enum Board {
    /// Placing start and goal
    Editing(Grid),
    Ready(Session),
}

/// Visualization state
struct VisState {
    config: Config,
    board: Board,
    playback: Option<Playback>,
    status: String,
}

impl VisState {
    fn new(config: Config) -> Self {
        let grid = Grid::build(config.grid.size);
        VisState {
            config,
            board: Board::Editing(grid),
            playback: None,
            status: "Click to place start, then goal".to_string(),
        }
    }

    fn grid(&self) -> &Grid {
        match &self.board {
            Board::Editing(grid) => grid,
            Board::Ready(session) => session.agent().grid(),
        }
    }

    fn cell_at(&self, mouse_x: f32, mouse_y: f32) -> Option<Position> {
        let size = self.config.visual.cell_size;
        if mouse_x < 0.0 || mouse_y < 0.0 {
            return None;
        }
        let pos = Position::new((mouse_y / size) as i32, (mouse_x / size) as i32);
        self.grid().in_bounds(pos).then_some(pos)
    }

    /// First click sets start, second sets goal, the rest draw barriers
    fn handle_paint(&mut self, pos: Position) {
        match &mut self.board {
            Board::Editing(grid) => {
                if grid.start().is_none() {
                    let _ = grid.set_start(pos.row, pos.col);
                } else if grid.set_goal(pos.row, pos.col).is_ok() {
                    self.start_session();
                }
            }
            Board::Ready(session) => {
                // Start and goal cells are rejected by the grid
                let _ = session.set_barrier(pos.row, pos.col);
            }
        }
    }

    fn handle_erase(&mut self, pos: Position) {
        match &mut self.board {
            Board::Editing(grid) => {
                let _ = grid.clear_barrier(pos.row, pos.col);
            }
            Board::Ready(session) => {
                let _ = session.clear_barrier(pos.row, pos.col);
            }
        }
    }

    fn start_session(&mut self) {
        let Board::Editing(grid) = &self.board else {
            return;
        };
        let (Some(start), Some(goal)) = (grid.start(), grid.goal()) else {
            return;
        };

        let env = &self.config.environment;
        match Agent::new(grid.clone(), start, goal) {
            Ok(agent) => {
                let injector = ObstacleInjector::new(env.spawn_probability, env.seed);
                let agent = agent.with_visibility(env.visibility);
                self.board = Board::Ready(Session::new(agent, injector, env.replan_policy));
                self.status = "Space: plan".to_string();
            }
            Err(e) => warn!("Could not start session: {}", e),
        }
    }

    fn plan(&mut self) {
        let Board::Ready(session) = &mut self.board else {
            self.status = "Place start and goal first".to_string();
            return;
        };

        let mut hook = step_hook(&self.config);
        match session.plan(&mut hook) {
            Ok(result) => {
                self.status = describe(&result);
                self.playback = Some(Playback {
                    frames: hook.hook.frames,
                    index: 0,
                });
            }
            Err(e) => self.status = format!("Planning failed: {}", e),
        }
    }

    fn tick(&mut self) {
        let Board::Ready(session) = &mut self.board else {
            return;
        };

        let mut hook = step_hook(&self.config);
        match session.tick(&mut hook) {
            Ok(outcome) => {
                if let Some(result) = outcome.replanned {
                    self.status = format!("Re-planned: {}", describe(&result));
                    self.playback = Some(Playback {
                        frames: hook.hook.frames,
                        index: 0,
                    });
                }
            }
            Err(e) => warn!("Tick failed: {}", e),
        }
    }

    fn reset(&mut self) {
        if let Board::Ready(session) = &self.board {
            retire_session(session, &self.config);
        }
        self.board = Board::Editing(Grid::build(self.config.grid.size));
        self.playback = None;
        self.status = "Click to place start, then goal".to_string();
    }

    fn generate(&mut self) {
        if let Board::Ready(session) = &self.board {
            retire_session(session, &self.config);
        }
        match Session::from_config(&self.config) {
            Ok(session) => {
                self.board = Board::Ready(session);
                self.playback = None;
                self.status = "Generated environment. Space: plan".to_string();
            }
            Err(e) => warn!("Failed to generate environment: {}", e),
        }
    }

    fn advance_playback(&mut self) {
        if let Some(playback) = &mut self.playback {
            playback.index += self.config.visual.steps_per_frame;
            if playback.index >= playback.frames.len() {
                self.playback = None;
            }
        }
    }

    fn copy_to_clipboard(&self) {
        let grid_string = layout::render(self.grid());
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(&grid_string) {
                    warn!("Failed to copy to clipboard: {}", e);
                } else {
                    info!("Grid layout copied to clipboard");
                    // Keep clipboard alive for a moment to ensure clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => warn!("Failed to access clipboard: {}", e),
        }
    }

    fn cell_color(annotation: Annotation, barrier: bool) -> Color {
        if barrier {
            return BLACK;
        }
        match annotation {
            Annotation::Unvisited => WHITE,
            Annotation::Start => ORANGE,
            Annotation::Goal => PURPLE,
            Annotation::OnPath => Color::from_rgba(255, 255, 0, 255),
            Annotation::Frontier => Color::from_rgba(174, 198, 255, 255),
            Annotation::Visited => Color::from_rgba(255, 179, 179, 255),
        }
    }

    fn draw(&self) {
        clear_background(WHITE);

        let grid = self.grid();
        let size = self.config.visual.cell_size;
        let frame = self
            .playback
            .as_ref()
            .and_then(|playback| playback.frames.get(playback.index));

        for cell in grid.cells() {
            let pos = cell.position();
            let annotation = match frame {
                Some(frame) => frame[grid.get_id(pos)],
                None => cell.annotation(),
            };
            let color = Self::cell_color(annotation, cell.is_barrier());
            draw_rectangle(pos.col as f32 * size, pos.row as f32 * size, size, size, color);
        }

        let side = size * grid.size() as f32;
        for i in 0..=grid.size() {
            let offset = i as f32 * size;
            draw_line(0.0, offset, side, offset, 1.0, GRAY);
            draw_line(offset, 0.0, offset, side, 1.0, GRAY);
        }

        let info = "Left: start/goal/barrier  Right: clear  Space: plan  G: generate  R: reset  C: copy  Esc: quit";
        draw_text(info, 10.0, side + 30.0, 18.0, BLACK);
        draw_text(&self.status, 10.0, side + 60.0, 24.0, BLACK);
    }
}

fn window_conf() -> Conf {
    // Fallbacks are reported once tracing is up in main
    let (config, _) = Config::load();
    let side = config.visual.cell_size * config.grid.size as f32;
    Conf {
        window_title: config.visual.window_title.clone(),
        window_width: side as i32,
        window_height: (side + PANEL_HEIGHT) as i32,
        ..Default::default()
    }
}

async fn run_gui(config: Config) {
    let mut state = VisState::new(config);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            if state.playback.is_some() {
                state.playback = None;
            } else {
                break;
            }
        }

        // Input and obstacles are frozen while a search replays
        if state.playback.is_none() {
            let (mouse_x, mouse_y) = mouse_position();
            if let Some(pos) = state.cell_at(mouse_x, mouse_y) {
                if is_mouse_button_down(MouseButton::Left) {
                    state.handle_paint(pos);
                } else if is_mouse_button_down(MouseButton::Right) {
                    state.handle_erase(pos);
                }
            }

            if is_key_pressed(KeyCode::Space) {
                state.plan();
            }
            if is_key_pressed(KeyCode::R) {
                state.reset();
            }
            if is_key_pressed(KeyCode::G) {
                state.generate();
            }
            if is_key_pressed(KeyCode::C) {
                state.copy_to_clipboard();
            }

            state.tick();
        }

        state.draw();
        state.advance_playback();

        next_frame().await
    }

    if let Board::Ready(session) = &state.board {
        retire_session(session, &state.config);
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let (config, load_error) = Config::load();
    init_tracing(&config.logging.level);
    config.log_load_outcome(load_error.as_ref());

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--simulate" {
        let ticks = args
            .get(2)
            .and_then(|arg| arg.parse().ok())
            .unwrap_or(100);
        if let Err(e) = run_simulation(&config, ticks) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    run_gui(config).await;
}
