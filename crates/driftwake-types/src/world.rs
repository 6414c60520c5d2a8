//! World state snapshot supplied by the host game.
//!
//! The scheduler never mutates a [`WorldState`]; the host replaces it
//! wholesale whenever the game moves on. The JSON shape is camelCase and
//! every field is optional on the wire so partial snapshots deserialize
//! to neutral values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{MissionTier, Radiation, Zone};

/// Everything the scheduler reads about the game at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldState {
    /// Danger/noise accumulator in `[0.0, 1.0]`.
    pub wake: f64,
    /// Where the player currently is.
    pub location: Location,
    /// Hours spent in the current star system.
    pub time_in_system: f64,
    /// Events the player has already seen, most recent last.
    pub event_history: Vec<EventRecord>,
    /// Missions currently accepted.
    pub active_missions: Vec<Mission>,
    /// Standing with each faction, keyed by faction ID.
    pub faction_standing: BTreeMap<String, i64>,
    /// The player's current action, for action-gated events.
    pub action: Option<String>,
}

impl WorldState {
    /// Whether an event with the given ID appears anywhere in the history.
    pub fn has_seen(&self, event_id: &str) -> bool {
        self.event_history.iter().any(|record| record.id == event_id)
    }

    /// Standing with a faction, if the host tracks one.
    pub fn standing(&self, faction: &str) -> Option<i64> {
        self.faction_standing.get(faction).copied()
    }
}

/// The player's location as seen by the event system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    /// Zone classification.
    pub zone: Zone,
    /// Radiation band.
    pub radiation: Radiation,
    /// A hostile contact is on the scopes.
    pub near_hostile: bool,
    /// A derelict is within boarding range.
    pub near_derelict: bool,
    /// Kind of point of interest at this location, if any.
    pub poi_type: Option<String>,
}

/// One entry in an event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Catalog ID of the event.
    pub id: String,
    /// Event type (first metadata tag of the definition).
    #[serde(rename = "type")]
    pub event_type: String,
    /// When the event fired, in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl EventRecord {
    /// Create a history record.
    pub fn new(id: impl Into<String>, event_type: impl Into<String>, timestamp: u64) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            timestamp,
        }
    }
}

/// An accepted mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    /// Danger tier of the mission.
    pub tier: MissionTier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_snapshot_uses_defaults() {
        let world: WorldState =
            serde_json::from_str(r#"{"wake":0.5,"location":{"zone":"normal"}}"#)
                .unwrap_or_default();
        assert!((world.wake - 0.5).abs() < f64::EPSILON);
        assert_eq!(world.location.zone, Zone::Normal);
        assert_eq!(world.location.radiation, Radiation::Low);
        assert!(world.event_history.is_empty());
        assert!(world.action.is_none());
    }

    #[test]
    fn full_snapshot_round_trips_field_names() {
        let json = r#"{
            "wake": 0.8,
            "location": {
                "zone": "dark",
                "radiation": "high",
                "nearHostile": true,
                "nearDerelict": false,
                "poiType": "station"
            },
            "timeInSystem": 12.5,
            "eventHistory": [{"id": "ambush_01", "type": "combat", "timestamp": 1000}],
            "activeMissions": [{"tier": "deadly"}],
            "factionStanding": {"syndicate": -40},
            "action": "scanning"
        }"#;
        let world: Result<WorldState, _> = serde_json::from_str(json);
        assert!(world.is_ok(), "failed to parse: {world:?}");
        let world = world.unwrap_or_default();

        assert_eq!(world.location.zone, Zone::Dark);
        assert_eq!(world.location.radiation, Radiation::High);
        assert!(world.location.near_hostile);
        assert_eq!(world.location.poi_type.as_deref(), Some("station"));
        assert_eq!(world.event_history.len(), 1);
        assert!(world.has_seen("ambush_01"));
        assert!(!world.has_seen("ambush_02"));
        assert_eq!(world.active_missions.first().map(|m| m.tier), Some(MissionTier::Deadly));
        assert_eq!(world.standing("syndicate"), Some(-40));
        assert_eq!(world.standing("guild"), None);
        assert_eq!(world.action.as_deref(), Some("scanning"));
    }
}
