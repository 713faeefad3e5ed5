//! Lightgrid headless entry point
//!
//! Plays an AI-only demo series at the fixed cadence and prints the result.
//! Usage: `lightgrid [seed]`

use lightgrid::audio::{AudioMixer, LogSink};
use lightgrid::consts::SIM_DT;
use lightgrid::sim::GameEvent;
use lightgrid::{Game, GameMode, GamePhase, HighScores, Settings};

/// Upper bound on frames for one demo run
const MAX_FRAMES: u32 = 200_000;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x11_9417);
    log::info!("Lightgrid (headless) starting with seed {}", seed);

    let settings = Settings::default();
    let mixer = AudioMixer::from_settings(&settings);
    let mut sink = LogSink;
    mixer.sync_music(&mut sink);

    let mut game = Game::new(settings, HighScores::new(), seed);
    game.start(GameMode::Demo);

    let mut frames = 0;
    let mut sounds = 0;
    while game.phase() != GamePhase::TournamentOver && frames < MAX_FRAMES {
        let events = game.frame(SIM_DT, &[]);
        sounds += mixer.dispatch(&events, &mut sink);
        for event in &events {
            if let GameEvent::RoundEnded(outcome) = event {
                log::info!("Round ended: {:?} (score {:?})", outcome, game.scores());
            }
        }
        frames += 1;
    }

    match game.take_result() {
        Some(result) => {
            match serde_json::to_string_pretty(&result) {
                Ok(json) => println!("{}", json),
                Err(e) => log::error!("Could not encode result: {}", e),
            }
            println!(
                "{} replay frames, {} sound cues",
                game.replay().len(),
                sounds
            );
        }
        None => log::warn!("Demo did not finish within {} frames", MAX_FRAMES),
    }
}
