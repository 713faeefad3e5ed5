//! Hard pilot: deeper lookahead and space search, hunts the nearest
//! opponent, tries to cut off its room and always shoots on a clear line

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{
    AiView, Decision, Strategy, aligned_ahead, choose, flood_space, nearest_powerup,
    safe_options,
};
use crate::manhattan;
use crate::sim::PowerUpKind;

const LOOKAHEAD: i32 = 4;
const SPACE_CAP: usize = 240;
/// Score per cell of distance to the nearest opponent (negative: closer is better)
const AGGRESSION: f32 = -0.35;
/// Score per cell of room left to the nearest opponent
const CUTOFF: f32 = -0.25;
const PICKUP_RANGE: i32 = 20;
const PICKUP_PULL: f32 = 10.0;

pub struct Hard {
    rng: Pcg32,
}

impl Hard {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Strategy for Hard {
    fn decide(&mut self, view: &AiView) -> Decision {
        let options = safe_options(view, LOOKAHEAD);
        if options.is_empty() {
            return Decision::STRAIGHT;
        }

        let rival = view.nearest_opponent().copied();
        let target = nearest_powerup(view, PICKUP_RANGE, |kind| {
            matches!(kind, PowerUpKind::Shield | PowerUpKind::PulseWeapon)
        });

        let scores: Vec<f32> = options
            .iter()
            .map(|&(_, heading)| {
                let lead = heading.advance(view.pos, 1);
                let mut score = flood_space(view, lead, SPACE_CAP, None) as f32;

                if let Some(rival) = rival {
                    score += AGGRESSION * manhattan(lead, rival.pos) as f32;
                    let rival_lead = rival.heading.advance(rival.pos, 1);
                    let rival_space = flood_space(view, rival_lead, SPACE_CAP, Some(lead));
                    score += CUTOFF * rival_space as f32;
                }

                if let Some(target) = target {
                    let gained = manhattan(view.pos, target) - manhattan(lead, target);
                    score += gained as f32 * PICKUP_PULL;
                }
                score
            })
            .collect();

        let steer = choose(&options, &scores, &mut self.rng);
        let fire = view.ammo > 0 && aligned_ahead(view, steer.apply(view.heading));
        Decision { steer, fire }
    }
}
