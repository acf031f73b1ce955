use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

pub const DEFAULT_ATHLETE_A: &str = "Athlete A";
pub const DEFAULT_ATHLETE_B: &str = "Athlete B";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Athlete {
    A,
    B,
}

impl Athlete {
    pub const ALL: [Athlete; 2] = [Athlete::A, Athlete::B];

    pub fn index(self) -> usize {
        match self {
            Athlete::A => 0,
            Athlete::B => 1,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Athlete::A => "A",
            Athlete::B => "B",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Athlete::A => DEFAULT_ATHLETE_A,
            Athlete::B => DEFAULT_ATHLETE_B,
        }
    }
}

/// Physical region of the piste. The set is closed; only its display order changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Zone {
    #[default]
    Home,
    Square,
    House,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Home, Zone::Square, Zone::House];

    pub fn index(self) -> usize {
        match self {
            Zone::Home => 0,
            Zone::Square => 1,
            Zone::House => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Zone::Home => "Home",
            Zone::Square => "Square",
            Zone::House => "House",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Zone {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::ALL
            .into_iter()
            .find(|zone| zone.label() == s)
            .ok_or_else(|| MatchError::InvalidZone {
                label: s.to_string(),
            })
    }
}

impl TryFrom<String> for Zone {
    type Error = MatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Zone> for String {
    fn from(zone: Zone) -> Self {
        zone.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TacticalAction {
    Offensive,
    Attack,
    Defense,
    Retreat,
    CounterAttack,
}

impl TacticalAction {
    pub const ALL: [TacticalAction; 5] = [
        TacticalAction::Offensive,
        TacticalAction::Attack,
        TacticalAction::Defense,
        TacticalAction::Retreat,
        TacticalAction::CounterAttack,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TacticalAction::Offensive => "Offensive",
            TacticalAction::Attack => "Attack",
            TacticalAction::Defense => "Defense",
            TacticalAction::Retreat => "Retreat",
            TacticalAction::CounterAttack => "Counter-Attack",
        }
    }
}

/// Number of fixed analysis categories: the five tactical actions plus one point label per athlete.
pub const CATEGORY_COUNT: usize = TacticalAction::ALL.len() + Athlete::ALL.len();

/// What a log entry records. Labels read back from storage that match none of the known
/// categories are kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Tactical(TacticalAction),
    PointFor(Athlete),
    Other(String),
}

impl Action {
    /// The fixed categories, in dashboard order.
    pub fn categories() -> [Action; CATEGORY_COUNT] {
        [
            Action::Tactical(TacticalAction::Offensive),
            Action::Tactical(TacticalAction::Attack),
            Action::Tactical(TacticalAction::Defense),
            Action::Tactical(TacticalAction::Retreat),
            Action::Tactical(TacticalAction::CounterAttack),
            Action::PointFor(Athlete::A),
            Action::PointFor(Athlete::B),
        ]
    }

    /// Position in [`Action::categories`], or `None` for free-form labels.
    pub fn category_index(&self) -> Option<usize> {
        match self {
            Action::Tactical(action) => TacticalAction::ALL.iter().position(|a| a == action),
            Action::PointFor(athlete) => Some(TacticalAction::ALL.len() + athlete.index()),
            Action::Other(_) => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Action::Tactical(action) => action.label().to_string(),
            Action::PointFor(athlete) => format!("Point for {}", athlete.letter()),
            Action::Other(label) => label.clone(),
        }
    }

    pub fn point_for(&self) -> Option<Athlete> {
        match self {
            Action::PointFor(athlete) => Some(*athlete),
            _ => None,
        }
    }
}

impl From<TacticalAction> for Action {
    fn from(action: TacticalAction) -> Self {
        Action::Tactical(action)
    }
}

impl From<String> for Action {
    fn from(label: String) -> Self {
        if let Some(action) = TacticalAction::ALL.into_iter().find(|a| a.label() == label) {
            return Action::Tactical(action);
        }
        if let Some(athlete) = Athlete::ALL
            .into_iter()
            .find(|athlete| label == format!("Point for {}", athlete.letter()))
        {
            return Action::PointFor(athlete);
        }
        Action::Other(label)
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Other(label) => label,
            other => other.label(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_back_to_variants() {
        for category in Action::categories() {
            assert_eq!(Action::from(category.label()), category);
        }
        assert_eq!(
            Action::from("Counter-Attack".to_string()),
            Action::Tactical(TacticalAction::CounterAttack)
        );
    }

    #[test]
    fn near_miss_point_label_stays_free_form() {
        let action = Action::from("Point for Alice".to_string());
        assert_eq!(action, Action::Other("Point for Alice".to_string()));
        assert_eq!(action.category_index(), None);
        assert_eq!(action.point_for(), None);
    }

    #[test]
    fn category_indices_are_dense() {
        let indices: Vec<_> = Action::categories()
            .iter()
            .map(|a| a.category_index())
            .collect();
        assert_eq!(indices, (0..CATEGORY_COUNT).map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn unknown_zone_is_rejected() {
        assert_eq!(
            "Lobby".parse::<Zone>(),
            Err(MatchError::InvalidZone {
                label: "Lobby".to_string()
            })
        );
        assert_eq!("Square".parse::<Zone>(), Ok(Zone::Square));
    }
}
