//! Game settings and preferences
//!
//! Plain data handed into `Game::new`. Reading and writing the JSON is the
//! storage collaborator's job; this module only (de)serializes and clamps.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// AI difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

// Unknown names fall back to the default instead of failing the whole file
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Difficulty::from_str(&name).unwrap_or_else(|| {
            log::warn!("Unknown difficulty {:?}, using default", name);
            Difficulty::default()
        }))
    }
}

/// Top-level game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// One human against `ai_opponents` computer pilots, one round
    #[default]
    SinglePlayer,
    /// Two humans, one round
    Versus,
    /// Two humans, best-of-N
    Tournament,
    /// Computer pilots only, best-of-N
    Demo,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::SinglePlayer => "Single Player",
            GameMode::Versus => "Versus",
            GameMode::Tournament => "Tournament",
            GameMode::Demo => "Demo",
        }
    }

    /// Whether the session runs a best-of-N series
    pub fn is_series(&self) -> bool {
        matches!(self, GameMode::Tournament | GameMode::Demo)
    }
}

/// Volume channels adjustable from the settings menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeChannel {
    Master,
    Music,
    Sfx,
}

/// On/off display options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOption {
    Grid,
    ScreenShake,
    TrailFade,
    Fullscreen,
}

pub const MIN_BEST_OF: u32 = 1;
pub const MAX_BEST_OF: u32 = 9;
pub const MAX_AI_OPPONENTS: u32 = 3;
/// Volume change per settings-menu nudge
pub const VOLUME_STEP: f32 = 0.1;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Mode preselected on the main menu
    pub mode: GameMode,
    /// Series length; always odd
    pub best_of: u32,
    /// Computer opponents in single player (1..=3)
    pub ai_opponents: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Display ===
    pub show_grid: bool,
    /// Screen shake on crashes
    pub screen_shake: bool,
    /// Older trail segments fade out
    pub trail_fade: bool,
    pub fullscreen: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            mode: GameMode::SinglePlayer,
            best_of: 5,
            ai_opponents: 1,

            // Audio
            master_volume: 0.8,
            music_volume: 0.6,
            sfx_volume: 0.8,

            // Display
            show_grid: true,
            screen_shake: true,
            trail_fade: true,
            fullscreen: false,
        }
    }
}

impl Settings {
    /// Round wins needed to take a series
    pub fn rounds_to_win(&self) -> u32 {
        (self.best_of / 2 + 1).max(1)
    }

    /// Clamp every field into range. Returns one error per corrected field.
    pub fn sanitize(&mut self) -> Vec<Error> {
        let defaults = Settings::default();
        let mut fixed = Vec::new();

        if !(MIN_BEST_OF..=MAX_BEST_OF).contains(&self.best_of) || self.best_of % 2 == 0 {
            fixed.push(out_of_range("best_of", self.best_of));
            let odd = if self.best_of % 2 == 0 {
                self.best_of + 1
            } else {
                self.best_of
            };
            self.best_of = odd.clamp(MIN_BEST_OF, MAX_BEST_OF);
        }

        if !(1..=MAX_AI_OPPONENTS).contains(&self.ai_opponents) {
            fixed.push(out_of_range("ai_opponents", self.ai_opponents));
            self.ai_opponents = self.ai_opponents.clamp(1, MAX_AI_OPPONENTS);
        }

        for (field, value, default) in [
            ("master_volume", &mut self.master_volume, defaults.master_volume),
            ("music_volume", &mut self.music_volume, defaults.music_volume),
            ("sfx_volume", &mut self.sfx_volume, defaults.sfx_volume),
        ] {
            if value.is_nan() {
                fixed.push(out_of_range(field, *value));
                *value = default;
            } else if !(0.0..=1.0).contains(&*value) {
                fixed.push(out_of_range(field, *value));
                *value = (*value).clamp(0.0, 1.0);
            }
        }

        for e in &fixed {
            log::warn!("{}", e);
        }
        fixed
    }

    /// Easy -> Medium -> Hard -> Easy
    pub fn cycle_difficulty(&mut self) -> Difficulty {
        self.difficulty = self.difficulty.next();
        self.difficulty
    }

    /// 1 -> 3 -> 5 -> 7 -> 9 -> 1
    pub fn cycle_best_of(&mut self) -> u32 {
        self.best_of = if self.best_of + 2 > MAX_BEST_OF {
            MIN_BEST_OF
        } else {
            self.best_of + 2
        };
        self.best_of
    }

    pub fn cycle_ai_opponents(&mut self) -> u32 {
        self.ai_opponents = self.ai_opponents % MAX_AI_OPPONENTS + 1;
        self.ai_opponents
    }

    /// Nudge a volume, clamped to 0.0 - 1.0
    pub fn adjust_volume(&mut self, channel: VolumeChannel, delta: f32) -> f32 {
        let value = match channel {
            VolumeChannel::Master => &mut self.master_volume,
            VolumeChannel::Music => &mut self.music_volume,
            VolumeChannel::Sfx => &mut self.sfx_volume,
        };
        *value = (*value + delta).clamp(0.0, 1.0);
        *value
    }

    /// Flip a display option; returns the new value
    pub fn toggle(&mut self, option: DisplayOption) -> bool {
        let flag = match option {
            DisplayOption::Grid => &mut self.show_grid,
            DisplayOption::ScreenShake => &mut self.screen_shake,
            DisplayOption::TrailFade => &mut self.trail_fade,
            DisplayOption::Fullscreen => &mut self.fullscreen,
        };
        *flag = !*flag;
        *flag
    }

    pub fn music_gain(&self) -> f32 {
        self.master_volume * self.music_volume
    }

    pub fn sfx_gain(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse stored settings, falling back to defaults on malformed input
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Using default settings: {}", e);
                Self::default()
            }
        }
    }
}

fn out_of_range(field: &'static str, value: impl ToString) -> Error {
    Error::ConfigOutOfRange {
        field,
        value: value.to_string(),
    }
}
