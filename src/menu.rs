//! Keyboard-driven menus
//!
//! Menus only track a selection and hand back the chosen action. Layout and
//! drawing belong to the renderer.

/// Single selectable row
#[derive(Debug, Clone)]
pub struct MenuItem<A> {
    pub label: &'static str,
    pub action: A,
}

/// Vertical menu with a wrapping cursor
#[derive(Debug, Clone)]
pub struct Menu<A> {
    pub title: &'static str,
    pub items: Vec<MenuItem<A>>,
    pub selected: usize,
}

impl<A: Copy> Menu<A> {
    pub fn new(title: &'static str, items: Vec<(&'static str, A)>) -> Self {
        Self {
            title,
            items: items
                .into_iter()
                .map(|(label, action)| MenuItem { label, action })
                .collect(),
            selected: 0,
        }
    }

    /// Move the cursor by `delta` rows, wrapping at both ends
    pub fn move_by(&mut self, delta: i32) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len() as i32;
        self.selected = (self.selected as i32 + delta).rem_euclid(len) as usize;
    }

    pub fn current(&self) -> Option<A> {
        self.items.get(self.selected).map(|item| item.action)
    }

    pub fn reset(&mut self) {
        self.selected = 0;
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.items.iter().map(|item| item.label).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainAction {
    SinglePlayer,
    Versus,
    Tournament,
    Demo,
    Settings,
    HighScores,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseAction {
    Resume,
    RestartRound,
    Settings,
    QuitToMenu,
}

/// Settings rows. Select cycles or toggles the row's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    Difficulty,
    BestOf,
    AiOpponents,
    MasterVolume,
    MusicVolume,
    SfxVolume,
    Grid,
    ScreenShake,
    TrailFade,
    Back,
}

pub fn main_menu() -> Menu<MainAction> {
    Menu::new(
        "LIGHTGRID",
        vec![
            ("Single Player", MainAction::SinglePlayer),
            ("2-Player Versus", MainAction::Versus),
            ("Tournament Mode", MainAction::Tournament),
            ("Demo", MainAction::Demo),
            ("Settings", MainAction::Settings),
            ("High Scores", MainAction::HighScores),
            ("Exit", MainAction::Exit),
        ],
    )
}

pub fn pause_menu() -> Menu<PauseAction> {
    Menu::new(
        "PAUSED",
        vec![
            ("Resume", PauseAction::Resume),
            ("Restart Round", PauseAction::RestartRound),
            ("Settings", PauseAction::Settings),
            ("Quit to Menu", PauseAction::QuitToMenu),
        ],
    )
}

pub fn settings_menu() -> Menu<SettingsAction> {
    Menu::new(
        "SETTINGS",
        vec![
            ("Difficulty", SettingsAction::Difficulty),
            ("Best Of", SettingsAction::BestOf),
            ("AI Opponents", SettingsAction::AiOpponents),
            ("Master Volume", SettingsAction::MasterVolume),
            ("Music Volume", SettingsAction::MusicVolume),
            ("SFX Volume", SettingsAction::SfxVolume),
            ("Grid", SettingsAction::Grid),
            ("Screen Shake", SettingsAction::ScreenShake),
            ("Trail Fade", SettingsAction::TrailFade),
            ("Back", SettingsAction::Back),
        ],
    )
}
