//! Easy pilot: one cell of lookahead, keeps straight while it can

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{AiView, Decision, Steer, Strategy, safe_options};

const LOOKAHEAD: i32 = 1;

pub struct Easy {
    rng: Pcg32,
}

impl Easy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Strategy for Easy {
    fn decide(&mut self, view: &AiView) -> Decision {
        let safe = safe_options(view, LOOKAHEAD);
        if safe.is_empty() || safe.iter().any(|(s, _)| *s == Steer::Straight) {
            return Decision::STRAIGHT;
        }
        let (steer, _) = safe[self.rng.random_range(0..safe.len())];
        Decision { steer, fire: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::{blockers, view};
    use crate::sim::{Heading, TrailStore};

    #[test]
    fn test_turns_away_from_blocked_cell() {
        let trails = blockers(&[(11, 10)]);
        let v = view(&trails, (10, 10), Heading::East, (20, 10));
        for seed in 0..20 {
            let decision = Easy::new(seed).decide(&v);
            assert_ne!(decision.steer, Steer::Straight);
            assert!(!decision.fire);
        }
    }

    #[test]
    fn test_keeps_straight_when_clear() {
        let trails = TrailStore::new();
        let mut v = view(&trails, (10, 10), Heading::East, (20, 10));
        v.ammo = 3;
        assert_eq!(Easy::new(1).decide(&v), Decision::STRAIGHT);
    }

    #[test]
    fn test_boxed_in_goes_straight() {
        let trails = blockers(&[(11, 10), (10, 9), (10, 11)]);
        let v = view(&trails, (10, 10), Heading::East, (20, 10));
        assert_eq!(Easy::new(4).decide(&v), Decision::STRAIGHT);
    }
}
