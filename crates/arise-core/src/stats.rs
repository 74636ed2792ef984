use contracts::{StatPatch, UserStats, LEVEL_UP_ABILITY_POINTS, QUEST_COMPLETION_EXP};

fn next_threshold(threshold: i64) -> i64 {
    // floor(threshold * 1.5) in integer form.
    threshold.saturating_mul(3) / 2
}

fn merge(stats: &UserStats, patch: &StatPatch) -> UserStats {
    UserStats {
        hp: patch.hp.unwrap_or(stats.hp),
        mp: patch.mp.unwrap_or(stats.mp),
        fatigue: patch.fatigue.unwrap_or(stats.fatigue),
        strength: patch.strength.unwrap_or(stats.strength),
        vitality: patch.vitality.unwrap_or(stats.vitality),
        agility: patch.agility.unwrap_or(stats.agility),
        intelligence: patch.intelligence.unwrap_or(stats.intelligence),
        perception: patch.perception.unwrap_or(stats.perception),
        level: patch.level.unwrap_or(stats.level),
        exp: patch.exp.unwrap_or(stats.exp),
        exp_to_next_level: patch.exp_to_next_level.unwrap_or(stats.exp_to_next_level),
        ability_points: patch.ability_points.unwrap_or(stats.ability_points),
    }
}

/// Merge `patch` over `stats`, award the flat completion exp, then apply
/// the level-up rule until `exp` sits below the next-level threshold.
/// Callers invoke this exactly once per quest completion.
pub fn apply_stat_update(stats: &UserStats, patch: &StatPatch) -> UserStats {
    let mut updated = merge(stats, patch);

    updated.exp = updated.exp.max(0) + QUEST_COMPLETION_EXP;
    // A threshold below 1 would never let the catch-up loop terminate.
    updated.exp_to_next_level = updated.exp_to_next_level.max(1);

    while updated.exp >= updated.exp_to_next_level {
        updated.level += 1;
        updated.exp -= updated.exp_to_next_level;
        updated.exp_to_next_level = next_threshold(updated.exp_to_next_level).max(1);
        updated.ability_points += LEVEL_UP_ABILITY_POINTS;
    }

    updated
}
