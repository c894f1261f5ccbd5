//! Derived companion growth: bloom stage from XP, evolution tier from
//! evolution count. Neither is stored; both are recomputed on every read.

use serde::Serialize;

/// A growth stage unlocked at an XP threshold
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct BloomStage {
    pub name: &'static str,
    pub min_xp: u32,
}

/// Stages in ascending XP order
pub const BLOOM_STAGES: [BloomStage; 5] = [
    BloomStage { name: "Seedling", min_xp: 0 },
    BloomStage { name: "Sprout", min_xp: 50 },
    BloomStage { name: "Budding", min_xp: 150 },
    BloomStage { name: "Blooming", min_xp: 350 },
    BloomStage { name: "Radiant", min_xp: 700 },
];

/// Highest stage whose threshold `total_xp` has reached
pub fn bloom_stage(total_xp: u32) -> &'static BloomStage {
    BLOOM_STAGES
        .iter()
        .rev()
        .find(|stage| total_xp >= stage.min_xp)
        .unwrap_or(&BLOOM_STAGES[0])
}

/// The next stage to reach, or None at the top
pub fn next_stage(total_xp: u32) -> Option<&'static BloomStage> {
    BLOOM_STAGES.iter().find(|stage| stage.min_xp > total_xp)
}

/// Fraction of the way from the current stage to the next, 1.0 at the top
pub fn stage_progress(total_xp: u32) -> f64 {
    let current = bloom_stage(total_xp);
    match next_stage(total_xp) {
        Some(next) => {
            f64::from(total_xp - current.min_xp) / f64::from(next.min_xp - current.min_xp)
        }
        None => 1.0,
    }
}

const TIER_NAMES: [(&str, &str); 5] = [
    ("Shimmer", "Subtle sparkle on petals"),
    ("Aura", "Soft glow ring"),
    ("Crown", "Petal crown"),
    ("Luminous", "Translucent petals"),
    ("Celestial", "Orbiting stars"),
];

/// Permanent evolution milestone
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct EvolutionTier {
    pub name: &'static str,
    pub description: String,
}

/// Tier for an evolution count; None before the first evolution
///
/// Counts past the table land in the open-ended Astral tier, whose
/// description grows with the number of evolutions beyond it.
pub fn evolution_tier(evolution_count: u32) -> Option<EvolutionTier> {
    if evolution_count == 0 {
        return None;
    }

    let index = (evolution_count - 1) as usize;
    let tier = match TIER_NAMES.get(index) {
        Some(&(name, description)) => EvolutionTier {
            name,
            description: description.to_string(),
        },
        None => {
            let extra = evolution_count - (TIER_NAMES.len() as u32 - 1);
            EvolutionTier {
                name: "Astral",
                description: format!("{} orbital particles", extra),
            }
        }
    };
    Some(tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_thresholds() {
        assert_eq!(bloom_stage(0).name, "Seedling");
        assert_eq!(bloom_stage(49).name, "Seedling");
        assert_eq!(bloom_stage(50).name, "Sprout");
        assert_eq!(bloom_stage(349).name, "Budding");
        assert_eq!(bloom_stage(350).name, "Blooming");
        assert_eq!(bloom_stage(10_000).name, "Radiant");
    }

    #[test]
    fn test_next_stage() {
        assert_eq!(next_stage(0).map(|s| s.name), Some("Sprout"));
        assert_eq!(next_stage(699).map(|s| s.name), Some("Radiant"));
        assert!(next_stage(700).is_none());
    }

    #[test]
    fn test_stage_progress() {
        assert_eq!(stage_progress(0), 0.0);
        assert_eq!(stage_progress(100), 0.5);
        assert_eq!(stage_progress(900), 1.0);
    }

    #[test]
    fn test_evolution_tiers() {
        assert!(evolution_tier(0).is_none());
        assert_eq!(evolution_tier(1).unwrap().name, "Shimmer");
        assert_eq!(evolution_tier(5).unwrap().name, "Celestial");
    }

    #[test]
    fn test_astral_scales_past_table() {
        let first = evolution_tier(6).unwrap();
        assert_eq!(first.name, "Astral");
        assert_eq!(first.description, "2 orbital particles");

        let later = evolution_tier(9).unwrap();
        assert_eq!(later.description, "5 orbital particles");
    }
}
