//! Gameplay events to sound cues
//!
//! The core never touches an audio device. It maps events to cues, works
//! out the gain from the settings volumes and hands both to an
//! [`AudioSink`]. Each cue carries a procedural tone description so a sink
//! can synthesize it without sample files.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Crash, elimination or shield hit
    Collision,
    /// Pickup collected
    PowerUp,
    /// Menu cursor moved or item chosen
    Menu,
    /// Pulse shot fired
    Shoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator sweep with an exponential fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub wave: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub duration_secs: f32,
    /// Peak level before the mixer gain
    pub level: f32,
}

impl SoundCue {
    pub fn tone(&self) -> Tone {
        match self {
            // Deep thump
            SoundCue::Collision => Tone {
                wave: Waveform::Sawtooth,
                start_hz: 150.0,
                end_hz: 40.0,
                duration_secs: 0.35,
                level: 0.6,
            },
            // Rising chime
            SoundCue::PowerUp => Tone {
                wave: Waveform::Sine,
                start_hz: 600.0,
                end_hz: 1200.0,
                duration_secs: 0.15,
                level: 0.4,
            },
            SoundCue::Menu => Tone {
                wave: Waveform::Triangle,
                start_hz: 300.0,
                end_hz: 300.0,
                duration_secs: 0.05,
                level: 0.25,
            },
            SoundCue::Shoot => Tone {
                wave: Waveform::Square,
                start_hz: 900.0,
                end_hz: 200.0,
                duration_secs: 0.1,
                level: 0.3,
            },
        }
    }
}

/// Cue for an event, if it makes a sound
pub fn cue_for(event: &GameEvent) -> Option<SoundCue> {
    match event {
        GameEvent::Shot { .. } => Some(SoundCue::Shoot),
        GameEvent::PowerUpCollected { .. } => Some(SoundCue::PowerUp),
        GameEvent::VehicleEliminated { .. } | GameEvent::ShieldAbsorbed { .. } => {
            Some(SoundCue::Collision)
        }
        GameEvent::MenuNavigate => Some(SoundCue::Menu),
        GameEvent::PowerUpSpawned { .. }
        | GameEvent::TrailErased { .. }
        | GameEvent::RoundEnded(_)
        | GameEvent::TournamentOver { .. } => None,
    }
}

/// Playback backend
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue, tone: Tone, gain: f32);

    fn set_music_gain(&mut self, _gain: f32) {}
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, cue: SoundCue, _tone: Tone, gain: f32) {
        log::trace!("Sound {:?} at gain {:.2}", cue, gain);
    }
}

/// Gain stage between events and a sink
#[derive(Debug, Clone)]
pub struct AudioMixer {
    master_volume: f32,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl AudioMixer {
    pub fn from_settings(settings: &Settings) -> Self {
        let mut mixer = Self {
            master_volume: 0.0,
            music_volume: 0.0,
            sfx_volume: 0.0,
            muted: false,
        };
        mixer.apply_settings(settings);
        mixer
    }

    /// Pick up new volumes after the settings menu changed them
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.master_volume = settings.master_volume.clamp(0.0, 1.0);
        self.music_volume = settings.music_volume.clamp(0.0, 1.0);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn sfx_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn music_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    /// Send the cue of every sounding event to `sink`. Returns how many
    /// cues were played.
    pub fn dispatch(&self, events: &[GameEvent], sink: &mut dyn AudioSink) -> usize {
        let gain = self.sfx_gain();
        if gain <= 0.0 {
            return 0;
        }
        let mut played = 0;
        for cue in events.iter().filter_map(cue_for) {
            let tone = cue.tone();
            sink.play(cue, tone, gain * tone.level);
            played += 1;
        }
        played
    }

    pub fn sync_music(&self, sink: &mut dyn AudioSink) {
        sink.set_music_gain(self.music_gain());
    }
}
