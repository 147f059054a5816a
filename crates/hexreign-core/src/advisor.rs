//! Player advisors and their mood.
//!
//! Mood is a pure function of the player's recent event window and action
//! point balance. The stored mood is only kept to detect changes.

use serde::{Deserialize, Serialize};

use crate::actions::Event;
use crate::player::PlayerId;

/// Size of the event window mood is derived from
pub const MOOD_WINDOW: usize = 5;
/// Below this many action points the advisor starts to worry
pub const LOW_BUDGET_THRESHOLD: u32 = 3;

pub const INITIAL_LOYALTY: u8 = 50;
pub const MAX_LOYALTY: u8 = 100;
/// Loyalty moved per increment/decrement signal
pub const LOYALTY_STEP: u8 = 5;

/// Advisor mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Confident,
    Worried,
    Desperate,
    Triumphant,
    Suspicious,
    Mourning,
}

/// Broad personality of an advisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Strategist,
    Warmonger,
    Merchant,
    Scholar,
    Mystic,
    Diplomat,
}

/// Fixed personality of an advisor, chosen at onboarding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorProfile {
    pub name: String,
    pub title: String,
    pub archetype: Archetype,
    /// Traits on a 0-10 scale
    pub aggression: u8,
    pub caution: u8,
    pub mysticism: u8,
    pub verbosity: u8,
    pub bluntness: u8,
    pub speech_style: String,
    pub catchphrase: String,
    pub favored_strategy: String,
    pub backstory: String,
}

/// A player's advisor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisor {
    pub player: PlayerId,
    pub profile: AdvisorProfile,
    pub mood: Mood,
    pub loyalty: u8,
}

impl Advisor {
    pub fn new(player: PlayerId, profile: AdvisorProfile) -> Self {
        Self {
            player,
            profile,
            mood: Mood::Confident,
            loyalty: INITIAL_LOYALTY,
        }
    }

    /// Store a freshly derived mood. Returns true if it changed.
    pub fn set_mood(&mut self, mood: Mood) -> bool {
        if self.mood == mood {
            return false;
        }
        self.mood = mood;
        true
    }

    pub fn increment_loyalty(&mut self) {
        self.loyalty = self.loyalty.saturating_add(LOYALTY_STEP).min(MAX_LOYALTY);
    }

    pub fn decrement_loyalty(&mut self) {
        self.loyalty = self.loyalty.saturating_sub(LOYALTY_STEP);
    }
}

/// Derive a mood from the player's most recent events (newest first) and
/// current action-point balance.
///
/// A kill outranks a lost unit, which outranks a thin budget; otherwise the
/// advisor is confident. Only the first `MOOD_WINDOW` events are considered.
pub fn derive_mood<'a, I>(player: PlayerId, recent: I, action_points: u32) -> Mood
where
    I: IntoIterator<Item = &'a Event>,
{
    let window: Vec<&Event> = recent.into_iter().take(MOOD_WINDOW).collect();

    if window.iter().any(|e| e.is_victory_for(player)) {
        Mood::Triumphant
    } else if window.iter().any(|e| e.is_loss_for(player)) {
        Mood::Mourning
    } else if action_points < LOW_BUDGET_THRESHOLD {
        Mood::Worried
    } else {
        Mood::Confident
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{EventId, EventKind, Outcome};
    use crate::hex::HexCoord;

    const ME: PlayerId = PlayerId::from_u128(1);
    const THEM: PlayerId = PlayerId::from_u128(2);

    fn event(id: u64, kind: EventKind, actor: PlayerId, target: Option<PlayerId>, outcome: Outcome) -> Event {
        Event {
            id: EventId(id),
            tick: 1,
            kind,
            actor,
            target,
            at: HexCoord::ORIGIN,
            outcome,
            timestamp: 0,
        }
    }

    fn moved(id: u64) -> Event {
        event(id, EventKind::Move, ME, None, Outcome::Success)
    }

    fn profile() -> AdvisorProfile {
        AdvisorProfile {
            name: "Enheduanna".to_string(),
            title: "High Priestess".to_string(),
            archetype: Archetype::Mystic,
            aggression: 2,
            caution: 7,
            mysticism: 9,
            verbosity: 5,
            bluntness: 3,
            speech_style: "measured".to_string(),
            catchphrase: "The stars remember.".to_string(),
            favored_strategy: "scout first".to_string(),
            backstory: "Raised in the temple of Ur.".to_string(),
        }
    }

    #[test]
    fn test_default_is_confident() {
        assert_eq!(derive_mood(ME, &[moved(1)], 10), Mood::Confident);
        assert_eq!(derive_mood(ME, std::iter::empty(), 10), Mood::Confident);
    }

    #[test]
    fn test_low_budget_worries() {
        assert_eq!(derive_mood(ME, std::iter::empty(), 2), Mood::Worried);
        assert_eq!(derive_mood(ME, std::iter::empty(), LOW_BUDGET_THRESHOLD), Mood::Confident);
    }

    #[test]
    fn test_victory_is_triumphant() {
        let events = [event(1, EventKind::Attack, ME, Some(THEM), Outcome::DefenderKilled)];
        assert_eq!(derive_mood(ME, &events, 0), Mood::Triumphant);
    }

    #[test]
    fn test_loss_is_mourning() {
        let events = [event(1, EventKind::Attack, THEM, Some(ME), Outcome::DefenderKilled)];
        assert_eq!(derive_mood(ME, &events, 0), Mood::Mourning);
    }

    #[test]
    fn test_victory_outranks_loss() {
        let events = [
            event(2, EventKind::Attack, THEM, Some(ME), Outcome::DefenderKilled),
            event(1, EventKind::Attack, ME, Some(THEM), Outcome::DefenderKilled),
        ];
        assert_eq!(derive_mood(ME, &events, 10), Mood::Triumphant);
    }

    #[test]
    fn test_window_is_five_events() {
        let mut events: Vec<Event> = (0..MOOD_WINDOW as u64).map(|i| moved(10 - i)).collect();
        events.push(event(1, EventKind::Attack, ME, Some(THEM), Outcome::DefenderKilled));
        // The kill is sixth newest and falls out of the window
        assert_eq!(derive_mood(ME, &events, 10), Mood::Confident);
    }

    #[test]
    fn test_set_mood_reports_change() {
        let mut advisor = Advisor::new(ME, profile());
        assert!(!advisor.set_mood(Mood::Confident));
        assert!(advisor.set_mood(Mood::Worried));
        assert_eq!(advisor.mood, Mood::Worried);
    }

    #[test]
    fn test_loyalty_clamps() {
        let mut advisor = Advisor::new(ME, profile());
        assert_eq!(advisor.loyalty, INITIAL_LOYALTY);

        for _ in 0..30 {
            advisor.increment_loyalty();
        }
        assert_eq!(advisor.loyalty, MAX_LOYALTY);

        for _ in 0..30 {
            advisor.decrement_loyalty();
        }
        assert_eq!(advisor.loyalty, 0);
    }
}
