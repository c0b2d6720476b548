//! Titles: threshold achievements read from player fields.
//!
//! A title rule names a dotted path into the player record and a comparison.
//! Once unlocked a title is never removed. Held titles grant small bonuses
//! to rolls and rewards, capped at [`TITLE_BONUS_CAP`].

use crate::core::constants::TITLE_BONUS_CAP;
use crate::rules::{BonusKind, TitleRule};
use crate::world::Player;

/// Sum of `kind` bonuses over the player's titles, capped.
pub fn title_bonus(titles: &[TitleRule], player: &Player, kind: BonusKind) -> u32 {
    let total: u32 = titles
        .iter()
        .filter(|t| player.has_title(&t.id))
        .map(|t| t.bonus.get(kind))
        .sum();
    total.min(TITLE_BONUS_CAP)
}

/// Signed fortune bonus for roll arithmetic.
pub fn fortune_bonus(titles: &[TitleRule], player: &Player) -> i32 {
    title_bonus(titles, player, BonusKind::Fortune) as i32
}

/// Unlocks every title whose requirement the player now meets.
/// Returns the names of the newly unlocked titles.
pub fn grant_titles(titles: &[TitleRule], player: &mut Player) -> Vec<String> {
    let snapshot = match serde_json::to_value(&*player) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(player = %player.id, error = %e, "cannot inspect player for titles");
            return Vec::new();
        }
    };

    let mut unlocked = Vec::new();
    for title in titles {
        if player.has_title(&title.id) {
            continue;
        }
        let Some(actual) = snapshot
            .pointer(&title.field_pointer())
            .and_then(serde_json::Value::as_f64)
        else {
            continue;
        };
        if title.requirement.op.holds(actual, title.requirement.value) {
            player.titles.push(title.id.clone());
            player.push_message(format!("[TITLE UNLOCKED: {}]", title.name));
            tracing::info!(player = %player.id, title = %title.id, "title unlocked");
            unlocked.push(title.name.clone());
        }
    }
    unlocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleBook;
    use crate::world::PlayerClass;

    fn titles() -> Vec<TitleRule> {
        serde_json::from_str(
            r#"[
                {"id": "slayer", "name": "Slayer",
                 "requirement": {"field": "stats.monster_killed", "op": ">=", "value": 2},
                 "bonus": {"xp": 2, "fortune": 1}},
                {"id": "hero", "name": "Hero",
                 "requirement": {"field": "level", "op": ">", "value": 1},
                 "bonus": {"xp": 2}}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_grant_titles_unlocks_once() {
        let titles = titles();
        let mut player = Player::new("p1", "c", PlayerClass::Warrior);
        player.stats.monster_killed = 2;

        let first = grant_titles(&titles, &mut player);
        assert_eq!(first, vec!["Slayer".to_string()]);
        assert_eq!(player.titles, vec!["slayer".to_string()]);
        assert!(player.messages.contains(&"[TITLE UNLOCKED: Slayer]".to_string()));

        let second = grant_titles(&titles, &mut player);
        assert!(second.is_empty());
        assert_eq!(player.titles.len(), 1);
    }

    #[test]
    fn test_titles_are_not_revoked() {
        let titles = titles();
        let mut player = Player::new("p1", "c", PlayerClass::Warrior);
        player.stats.monster_killed = 5;
        grant_titles(&titles, &mut player);
        player.stats.monster_killed = 0;
        grant_titles(&titles, &mut player);
        assert!(player.has_title("slayer"));
    }

    #[test]
    fn test_title_bonus_is_capped() {
        let titles = titles();
        let mut player = Player::new("p1", "c", PlayerClass::Warrior);
        assert_eq!(title_bonus(&titles, &player, BonusKind::Xp), 0);
        player.titles = vec!["slayer".to_string(), "hero".to_string()];
        assert_eq!(title_bonus(&titles, &player, BonusKind::Xp), 3);
        assert_eq!(fortune_bonus(&titles, &player), 1);
    }

    #[test]
    fn test_builtin_titles_resolve() {
        let rules = RuleBook::builtin().unwrap();
        let mut player = Player::new("p1", "c", PlayerClass::Monk);
        player.level = 5;
        let unlocked = grant_titles(&rules.titles, &mut player);
        assert_eq!(unlocked, vec!["Veteran".to_string()]);
    }
}
