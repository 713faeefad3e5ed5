//! Game flow: menus, rounds and best-of-N series
//!
//! `Game` owns the settings and high-score context, the menus, the running
//! series and the round in play. Frontends feed it input events and wall
//! time through [`Game::frame`] and draw whatever [`Game::snapshot`] says.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::ai::Roster;
use crate::consts::{MAX_SUBSTEPS, SIM_DT, SUMMARY_TIMEOUT_TICKS};
use crate::highscores::{HighScores, TournamentResult};
use crate::menu::{
    MainAction, Menu, PauseAction, SettingsAction, main_menu, pause_menu, settings_menu,
};
use crate::settings::{DisplayOption, GameMode, Settings, VOLUME_STEP, VolumeChannel};
use crate::sim::{
    Command, GameEvent, MatchConfig, MatchSnapshot, MatchState, PilotKind, Replay, RoundOutcome,
    RoundSummary, TickInput, VehicleId, tick,
};
use crate::ticks_to_secs;

/// Largest frame delta accepted by `frame`, in seconds
const MAX_FRAME_DT: f32 = 0.25;

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    MainMenu,
    Settings,
    HighScores,
    Playing,
    Paused,
    RoundOver,
    TournamentOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Up,
    Down,
    Select,
    Back,
}

/// Input from a frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Steering or firing for the human driving input slot `slot`
    Vehicle { slot: u8, command: Command },
    Menu(MenuCommand),
    /// Toggle pause during play
    Pause,
}

/// A running single round or best-of-N series
#[derive(Debug, Clone)]
struct Series {
    mode: GameMode,
    pilots: Vec<PilotKind>,
    /// Round wins per slot
    wins: Vec<u32>,
    target: u32,
    rounds_played: u32,
    ticks_played: u64,
}

impl Series {
    fn new(mode: GameMode, settings: &Settings) -> Self {
        let ai = PilotKind::Ai(settings.difficulty);
        let pilots = match mode {
            GameMode::SinglePlayer => std::iter::once(PilotKind::Human { slot: 0 })
                .chain(std::iter::repeat_n(ai, settings.ai_opponents as usize))
                .collect(),
            GameMode::Versus | GameMode::Tournament => vec![
                PilotKind::Human { slot: 0 },
                PilotKind::Human { slot: 1 },
            ],
            GameMode::Demo => vec![ai, ai],
        };
        let target = if mode.is_series() {
            settings.rounds_to_win()
        } else {
            1
        };
        Self {
            mode,
            wins: vec![0; pilots.len()],
            pilots,
            target,
            rounds_played: 0,
            ticks_played: 0,
        }
    }

    /// Overall winner once the series is decided
    fn champion(&self) -> Option<VehicleId> {
        self.wins
            .iter()
            .position(|&w| w >= self.target)
            .map(|i| VehicleId(i as u8))
    }

    fn label(&self, id: VehicleId) -> String {
        match self.pilots.get(id.0 as usize) {
            Some(PilotKind::Human { slot }) => format!("Player {}", slot + 1),
            Some(PilotKind::Ai(difficulty)) => format!("{} AI ({})", id, difficulty.as_str()),
            None => id.to_string(),
        }
    }
}

/// Menu as shown on screen
#[derive(Debug, Clone, Serialize)]
pub struct MenuView {
    pub title: &'static str,
    pub items: Vec<&'static str>,
    pub selected: usize,
}

impl<A: Copy> From<&Menu<A>> for MenuView {
    fn from(menu: &Menu<A>) -> Self {
        Self {
            title: menu.title,
            items: menu.labels(),
            selected: menu.selected,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub mode: Option<GameMode>,
    /// Round wins per slot in the running series
    pub scores: Vec<u32>,
    pub rounds_to_win: u32,
    pub rounds_played: u32,
    pub menu: Option<MenuView>,
    pub round: Option<MatchSnapshot>,
    pub summary: Option<RoundSummary>,
    pub result: Option<TournamentResult>,
    pub high_score_rank: Option<usize>,
}

/// Game coordinator
pub struct Game {
    settings: Settings,
    high_scores: HighScores,
    phase: GamePhase,
    main_menu: Menu<MainAction>,
    pause_menu: Menu<PauseAction>,
    settings_menu: Menu<SettingsAction>,
    series: Option<Series>,
    round: Option<MatchState>,
    roster: Roster,
    replay: Replay,
    /// Human commands queued since the last tick
    pending: TickInput,
    accumulator: f32,
    /// Ticks spent on the current summary screen
    summary_ticks: u32,
    summary: Option<RoundSummary>,
    result: Option<TournamentResult>,
    high_score_rank: Option<usize>,
    /// Screen the settings menu returns to
    settings_return: GamePhase,
    /// Seeds each round
    rng: Pcg32,
    quit: bool,
}

impl Game {
    pub fn new(mut settings: Settings, high_scores: HighScores, seed: u64) -> Self {
        settings.sanitize();
        Self {
            settings,
            high_scores,
            phase: GamePhase::MainMenu,
            main_menu: main_menu(),
            pause_menu: pause_menu(),
            settings_menu: settings_menu(),
            series: None,
            round: None,
            roster: Roster::empty(),
            replay: Replay::new(),
            pending: TickInput::default(),
            accumulator: 0.0,
            summary_ticks: 0,
            summary: None,
            result: None,
            high_score_rank: None,
            settings_return: GamePhase::MainMenu,
            rng: Pcg32::seed_from_u64(seed),
            quit: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn replay(&self) -> &Replay {
        &self.replay
    }

    pub fn current_match(&self) -> Option<&MatchState> {
        self.round.as_ref()
    }

    /// Direct access to the round in play, for scripted setups
    pub fn current_match_mut(&mut self) -> Option<&mut MatchState> {
        self.round.as_mut()
    }

    pub fn last_summary(&self) -> Option<&RoundSummary> {
        self.summary.as_ref()
    }

    /// Round wins per slot in the running series
    pub fn scores(&self) -> &[u32] {
        self.series.as_ref().map_or(&[], |s| &s.wins)
    }

    /// Result of the last finished session, handed over once
    pub fn take_result(&mut self) -> Option<TournamentResult> {
        self.result.take()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Begin a new session in `mode`. Scores start from zero.
    pub fn start(&mut self, mode: GameMode) {
        self.settings.mode = mode;
        let series = Series::new(mode, &self.settings);
        log::info!(
            "Starting {} ({} vehicles, first to {})",
            mode.as_str(),
            series.pilots.len(),
            series.target
        );
        self.series = Some(series);
        self.replay.clear();
        self.result = None;
        self.high_score_rank = None;
        self.start_round();
    }

    fn start_round(&mut self) {
        let Some(series) = &self.series else {
            return;
        };
        let mut config = MatchConfig::new(series.pilots.clone(), self.rng.random());
        config.scores = series.wins.clone();
        log::info!(
            "Round {} (seed {})",
            series.rounds_played + 1,
            config.seed
        );

        let state = MatchState::new(&config);
        self.roster = Roster::for_match(&state);
        self.round = Some(state);
        self.pending = TickInput::default();
        self.accumulator = 0.0;
        self.summary = None;
        self.summary_ticks = 0;
        self.phase = GamePhase::Playing;
    }

    /// Drop the session and go back to the main menu
    fn return_to_menu(&mut self) {
        self.series = None;
        self.round = None;
        self.roster = Roster::empty();
        self.pending = TickInput::default();
        self.summary = None;
        self.main_menu.reset();
        self.phase = GamePhase::MainMenu;
    }

    /// Apply one input event. Returns feedback events (menu sounds).
    pub fn handle_input(&mut self, event: InputEvent) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match (self.phase, event) {
            (GamePhase::Playing, InputEvent::Vehicle { slot, command }) => {
                self.queue_human(slot, command);
            }
            (GamePhase::Playing, InputEvent::Pause | InputEvent::Menu(MenuCommand::Back)) => {
                self.pause_menu.reset();
                self.phase = GamePhase::Paused;
                log::info!("Paused");
            }
            (GamePhase::Paused, InputEvent::Pause | InputEvent::Menu(MenuCommand::Back)) => {
                self.resume();
            }
            (GamePhase::Paused, InputEvent::Menu(cmd)) => {
                if let Some(action) = navigate(&mut self.pause_menu, cmd, &mut events) {
                    match action {
                        PauseAction::Resume => self.resume(),
                        PauseAction::RestartRound => self.start_round(),
                        PauseAction::Settings => self.open_settings(GamePhase::Paused),
                        PauseAction::QuitToMenu => self.return_to_menu(),
                    }
                }
            }
            (GamePhase::MainMenu, InputEvent::Menu(MenuCommand::Back)) => {
                self.quit = true;
            }
            (GamePhase::MainMenu, InputEvent::Menu(cmd)) => {
                if let Some(action) = navigate(&mut self.main_menu, cmd, &mut events) {
                    self.main_action(action);
                }
            }
            (GamePhase::Settings, InputEvent::Menu(MenuCommand::Back)) => {
                self.phase = self.settings_return;
            }
            (GamePhase::Settings, InputEvent::Menu(cmd)) => {
                if let Some(action) = navigate(&mut self.settings_menu, cmd, &mut events) {
                    self.settings_action(action);
                }
            }
            (GamePhase::HighScores, InputEvent::Menu(MenuCommand::Select | MenuCommand::Back)) => {
                self.phase = GamePhase::MainMenu;
            }
            (GamePhase::RoundOver, InputEvent::Menu(MenuCommand::Select)) => {
                self.start_round();
            }
            (GamePhase::RoundOver, InputEvent::Menu(MenuCommand::Back))
            | (GamePhase::TournamentOver, InputEvent::Menu(MenuCommand::Select | MenuCommand::Back)) => {
                self.return_to_menu();
            }
            _ => {}
        }
        events
    }

    fn resume(&mut self) {
        self.accumulator = 0.0;
        self.phase = GamePhase::Playing;
        log::info!("Resumed");
    }

    fn queue_human(&mut self, slot: u8, command: Command) {
        let Some(state) = &self.round else {
            return;
        };
        let vehicle = state
            .vehicles
            .iter()
            .find(|v| v.pilot == PilotKind::Human { slot });
        match vehicle {
            Some(v) if v.alive => self.pending.push(v.id, command),
            Some(_) => {}
            None => log::debug!("Ignoring input for unknown slot {}", slot),
        }
    }

    fn main_action(&mut self, action: MainAction) {
        match action {
            MainAction::SinglePlayer => self.start(GameMode::SinglePlayer),
            MainAction::Versus => self.start(GameMode::Versus),
            MainAction::Tournament => self.start(GameMode::Tournament),
            MainAction::Demo => self.start(GameMode::Demo),
            MainAction::Settings => self.open_settings(GamePhase::MainMenu),
            MainAction::HighScores => self.phase = GamePhase::HighScores,
            MainAction::Exit => self.quit = true,
        }
    }

    fn open_settings(&mut self, from: GamePhase) {
        self.settings_menu.reset();
        self.settings_return = from;
        self.phase = GamePhase::Settings;
    }

    fn settings_action(&mut self, action: SettingsAction) {
        let s = &mut self.settings;
        match action {
            SettingsAction::Difficulty => {
                s.cycle_difficulty();
            }
            SettingsAction::BestOf => {
                s.cycle_best_of();
            }
            SettingsAction::AiOpponents => {
                s.cycle_ai_opponents();
            }
            SettingsAction::MasterVolume => nudge_volume(s, VolumeChannel::Master),
            SettingsAction::MusicVolume => nudge_volume(s, VolumeChannel::Music),
            SettingsAction::SfxVolume => nudge_volume(s, VolumeChannel::Sfx),
            SettingsAction::Grid => {
                s.toggle(DisplayOption::Grid);
            }
            SettingsAction::ScreenShake => {
                s.toggle(DisplayOption::ScreenShake);
            }
            SettingsAction::TrailFade => {
                s.toggle(DisplayOption::TrailFade);
            }
            SettingsAction::Back => self.phase = self.settings_return,
        }
    }

    /// Advance one fixed tick. Plays the round, or runs the summary timer
    /// on the result screens.
    pub fn update(&mut self) -> Vec<GameEvent> {
        match self.phase {
            GamePhase::Playing => self.play_tick(),
            GamePhase::RoundOver | GamePhase::TournamentOver => {
                self.summary_ticks += 1;
                if self.summary_ticks >= SUMMARY_TIMEOUT_TICKS {
                    if self.phase == GamePhase::RoundOver {
                        self.start_round();
                    } else {
                        self.return_to_menu();
                    }
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn play_tick(&mut self) -> Vec<GameEvent> {
        let Some(state) = self.round.as_mut() else {
            return Vec::new();
        };
        let mut input = std::mem::take(&mut self.pending);
        self.roster.queue_commands(state, &mut input);

        let mut events = tick(state, &input, SIM_DT);
        self.replay.record(state);

        if let Some(outcome) = state.outcome {
            self.finish_round(outcome, &mut events);
        }
        events
    }

    fn finish_round(&mut self, outcome: RoundOutcome, events: &mut Vec<GameEvent>) {
        let (Some(state), Some(series)) = (&self.round, &mut self.series) else {
            return;
        };
        for v in &state.vehicles {
            if let Some(wins) = series.wins.get_mut(v.id.0 as usize) {
                *wins = v.score;
            }
        }
        series.rounds_played += 1;
        series.ticks_played += state.time_ticks;
        self.summary = state.summary();
        self.summary_ticks = 0;

        let decided = !series.mode.is_series() || series.champion().is_some();
        if !decided {
            log::info!("Score after round {}: {:?}", series.rounds_played, series.wins);
            self.phase = GamePhase::RoundOver;
            return;
        }

        let winner = if series.mode.is_series() {
            series.champion()
        } else {
            outcome.winner()
        };
        let result = TournamentResult {
            winner,
            label: winner.map_or_else(|| "Draw".to_string(), |id| series.label(id)),
            mode: series.mode,
            scores: series.wins.clone(),
            rounds: series.rounds_played,
            duration_ticks: series.ticks_played,
            duration_secs: ticks_to_secs(series.ticks_played),
        };
        log::info!(
            "{} over after {} rounds: {}",
            series.mode.as_str(),
            result.rounds,
            result.label
        );

        self.high_score_rank = self.high_scores.add_result(result.clone());
        self.result = Some(result);
        self.phase = GamePhase::TournamentOver;
        events.push(GameEvent::TournamentOver { winner });
    }

    /// Feed one frame of input and wall time. Runs as many fixed ticks as
    /// the accumulated time allows, at most `MAX_SUBSTEPS`.
    pub fn frame(&mut self, dt: f32, inputs: &[InputEvent]) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for input in inputs {
            events.extend(self.handle_input(*input));
        }

        let ticking = matches!(
            self.phase,
            GamePhase::Playing | GamePhase::RoundOver | GamePhase::TournamentOver
        );
        if !ticking {
            self.accumulator = 0.0;
            return events;
        }

        // Non-finite deltas count as no time passing
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(self.update());
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        events
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let menu = match self.phase {
            GamePhase::MainMenu => Some(MenuView::from(&self.main_menu)),
            GamePhase::Paused => Some(MenuView::from(&self.pause_menu)),
            GamePhase::Settings => Some(MenuView::from(&self.settings_menu)),
            _ => None,
        };
        GameSnapshot {
            phase: self.phase,
            mode: self.series.as_ref().map(|s| s.mode),
            scores: self.scores().to_vec(),
            rounds_to_win: self.series.as_ref().map_or(0, |s| s.target),
            rounds_played: self.series.as_ref().map_or(0, |s| s.rounds_played),
            menu,
            round: self.round.as_ref().map(MatchState::snapshot),
            summary: self.summary.clone(),
            result: self.result.clone(),
            high_score_rank: self.high_score_rank,
        }
    }
}

/// Move the cursor or pick the current row
fn navigate<A: Copy>(menu: &mut Menu<A>, cmd: MenuCommand, events: &mut Vec<GameEvent>) -> Option<A> {
    match cmd {
        MenuCommand::Up => menu.move_by(-1),
        MenuCommand::Down => menu.move_by(1),
        MenuCommand::Select => {
            events.push(GameEvent::MenuNavigate);
            return menu.current();
        }
        MenuCommand::Back => return None,
    }
    events.push(GameEvent::MenuNavigate);
    None
}

/// Raise a volume one notch, wrapping to silent past full
fn nudge_volume(settings: &mut Settings, channel: VolumeChannel) {
    let now = settings.adjust_volume(channel, 0.0);
    if now >= 1.0 {
        settings.adjust_volume(channel, -1.0);
    } else {
        settings.adjust_volume(channel, VOLUME_STEP);
    }
}
