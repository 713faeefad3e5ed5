//! Medium pilot: short lookahead, flood-fill space scoring, drifts toward
//! nearby pickups and takes the odd shot

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{
    AiView, Decision, Strategy, aligned_ahead, choose, flood_space, nearest_powerup, safe_options,
};
use crate::manhattan;

const LOOKAHEAD: i32 = 3;
const SPACE_CAP: usize = 160;
const PICKUP_RANGE: i32 = 12;
/// Score bonus per cell gained toward a pickup
const PICKUP_PULL: f32 = 6.0;
const FIRE_CHANCE: f64 = 0.4;

pub struct Medium {
    rng: Pcg32,
}

impl Medium {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Strategy for Medium {
    fn decide(&mut self, view: &AiView) -> Decision {
        let options = safe_options(view, LOOKAHEAD);
        if options.is_empty() {
            return Decision::STRAIGHT;
        }

        let target = nearest_powerup(view, PICKUP_RANGE, |_| true);
        let scores: Vec<f32> = options
            .iter()
            .map(|&(_, heading)| {
                let lead = heading.advance(view.pos, 1);
                let mut score = flood_space(view, lead, SPACE_CAP, None) as f32;
                if let Some(target) = target {
                    let gained = manhattan(view.pos, target) - manhattan(lead, target);
                    score += gained as f32 * PICKUP_PULL;
                }
                score
            })
            .collect();

        let steer = choose(&options, &scores, &mut self.rng);
        let heading = steer.apply(view.heading);
        let fire = view.ammo > 0
            && aligned_ahead(view, heading)
            && self.rng.random_bool(FIRE_CHANCE);
        Decision { steer, fire }
    }
}
