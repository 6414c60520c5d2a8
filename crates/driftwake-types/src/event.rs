//! Event catalog entries and their declarative trigger conditions.
//!
//! The catalog arrives as camelCase JSON where `trigger.conditions` is an
//! object of optional clauses. On deserialization the object is lowered into
//! a list of [`ConditionClause`] variants in a fixed evaluation order, so the
//! interpreter in `driftwake-core` only ever sees the clauses that were
//! actually declared.
//!
//! Anything else an event carries (title, scenario text, branches) is kept
//! verbatim in [`EventDefinition::content`] and handed through to whoever
//! renders the event.

use serde::{Deserialize, Deserializer, Serialize};

use crate::enums::{Radiation, Zone};

/// Event type reported for definitions that carry no metadata tags.
pub const UNKNOWN_EVENT_TYPE: &str = "unknown";

/// Weight assumed when a trigger does not declare one.
pub const DEFAULT_TRIGGER_WEIGHT: f64 = 1.0;

/// One entry of the event catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Unique catalog ID.
    pub id: String,
    /// When and how strongly this event may be picked.
    #[serde(default)]
    pub trigger: Trigger,
    /// Tags and the enabled switch.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: EventMetadata,
    /// Narrative payload, passed through untouched.
    #[serde(flatten)]
    pub content: serde_json::Map<String, serde_json::Value>,
}

impl EventDefinition {
    /// Create a definition with no conditions and no content.
    pub fn new(id: impl Into<String>, trigger_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            trigger: Trigger {
                trigger_type: trigger_type.into(),
                weight: None,
                conditions: Conditions::default(),
            },
            metadata: EventMetadata::default(),
            content: serde_json::Map::new(),
        }
    }

    /// Set the trigger weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.trigger.weight = Some(weight);
        self
    }

    /// Replace the trigger conditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.trigger.conditions = conditions;
        self
    }

    /// Append a metadata tag. The first tag is the event type.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.metadata.tags.push(tag.into());
        self
    }

    /// Set the metadata enabled switch.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.metadata.enabled = Some(enabled);
        self
    }

    /// The event type used for cooldowns and history: the first metadata
    /// tag, or [`UNKNOWN_EVENT_TYPE`].
    pub fn event_type(&self) -> &str {
        self.metadata
            .tags
            .first()
            .map_or(UNKNOWN_EVENT_TYPE, String::as_str)
    }

    /// Selection weight, defaulting to [`DEFAULT_TRIGGER_WEIGHT`].
    pub fn weight(&self) -> f64 {
        self.trigger.weight.unwrap_or(DEFAULT_TRIGGER_WEIGHT)
    }

    /// Only an explicit `enabled: false` disables an event.
    pub fn is_enabled(&self) -> bool {
        self.metadata.enabled != Some(false)
    }
}

/// Trigger block of an event definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Trigger channel, e.g. `"dynamic"` for scheduler-driven events.
    #[serde(rename = "type", default)]
    pub trigger_type: String,
    /// Relative selection weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Declarative conditions on the world state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditions: Conditions,
}

/// Metadata block of an event definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Free-form tags; the first one is the event type.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// `Some(false)` disables the event; anything else leaves it enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// The declared conditions of a trigger.
///
/// `clauses` holds only the clauses present on the wire, in evaluation
/// order. `cooldown_seconds` is kept apart because it is a switch for the
/// per-type cooldown check rather than a test on the world state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConditions", into = "RawConditions")]
pub struct Conditions {
    /// Clauses that must all hold.
    pub clauses: Vec<ConditionClause>,
    /// When declared, the event is gated by the per-type cooldown.
    pub cooldown_seconds: Option<f64>,
}

impl Conditions {
    /// Conditions with no clauses; always satisfied.
    pub const fn new() -> Self {
        Self {
            clauses: Vec::new(),
            cooldown_seconds: None,
        }
    }

    /// Append a clause.
    #[must_use]
    pub fn with(mut self, clause: ConditionClause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Declare a cooldown gate.
    #[must_use]
    pub const fn with_cooldown(mut self, seconds: f64) -> Self {
        self.cooldown_seconds = Some(seconds);
        self
    }

    /// True when nothing is declared at all.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.cooldown_seconds.is_none()
    }
}

/// A single declared condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionClause {
    /// Inclusive range on `world.wake`.
    WakeRange(NumericRange),
    /// The current zone must be one of these.
    ZoneSet(Vec<Zone>),
    /// Inclusive ordinal range on the radiation band.
    RadiationRange(RadiationRange),
    /// Inclusive range on hours in system.
    TimeRange(NumericRange),
    /// Inclusive range on the standing with one faction.
    FactionRange(FactionRange),
    /// The point-of-interest type must be one of these.
    PoiTypeSet(Vec<String>),
    /// The player's current action must equal this.
    ActionEquals(String),
    /// None of these event IDs may appear in the history.
    NotRecent(Vec<String>),
}

/// Optional inclusive bounds on a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumericRange {
    /// Range with both bounds optional.
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the declared bounds. A NaN value fails
    /// any declared bound.
    pub fn contains(&self, value: f64) -> bool {
        let above_min = self.min.is_none_or(|min| value >= min);
        let below_max = self.max.is_none_or(|max| value <= max);
        above_min && below_max
    }
}

/// Optional inclusive bounds on the radiation band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadiationRange {
    /// Lowest admitted band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Radiation>,
    /// Highest admitted band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Radiation>,
}

impl RadiationRange {
    /// Whether `value` lies within the declared bands.
    pub fn contains(&self, value: Radiation) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Standing requirement with a single faction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactionRange {
    /// Faction ID to look up in `world.factionStanding`.
    pub faction: String,
    /// Lowest admitted standing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Highest admitted standing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl FactionRange {
    /// Bounds of this requirement as a plain numeric range.
    pub const fn range(&self) -> NumericRange {
        NumericRange::new(self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

/// A list that may also be written as a single bare value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Conditions object exactly as it appears in the catalog JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    wake: Option<NumericRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone: Option<OneOrMany<Zone>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    radiation: Option<RadiationRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_in_system: Option<NumericRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    faction_standing: Option<FactionRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    poi_type: Option<OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    not_recent: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cooldown_seconds: Option<f64>,
}

impl From<RawConditions> for Conditions {
    fn from(raw: RawConditions) -> Self {
        let clauses = [
            raw.wake.map(ConditionClause::WakeRange),
            raw.zone
                .map(|zones| ConditionClause::ZoneSet(zones.into_vec())),
            raw.radiation.map(ConditionClause::RadiationRange),
            raw.time_in_system.map(ConditionClause::TimeRange),
            raw.faction_standing.map(ConditionClause::FactionRange),
            raw.poi_type
                .map(|types| ConditionClause::PoiTypeSet(types.into_vec())),
            raw.action.map(ConditionClause::ActionEquals),
            raw.not_recent.map(ConditionClause::NotRecent),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self {
            clauses,
            cooldown_seconds: raw.cooldown_seconds,
        }
    }
}

impl From<Conditions> for RawConditions {
    fn from(conditions: Conditions) -> Self {
        let mut raw = Self {
            cooldown_seconds: conditions.cooldown_seconds,
            ..Self::default()
        };
        for clause in conditions.clauses {
            match clause {
                ConditionClause::WakeRange(range) => raw.wake = Some(range),
                ConditionClause::ZoneSet(zones) => raw.zone = Some(OneOrMany::Many(zones)),
                ConditionClause::RadiationRange(range) => raw.radiation = Some(range),
                ConditionClause::TimeRange(range) => raw.time_in_system = Some(range),
                ConditionClause::FactionRange(range) => raw.faction_standing = Some(range),
                ConditionClause::PoiTypeSet(types) => raw.poi_type = Some(OneOrMany::Many(types)),
                ConditionClause::ActionEquals(action) => raw.action = Some(action),
                ConditionClause::NotRecent(ids) => raw.not_recent = Some(ids),
            }
        }
        raw
    }
}

/// Deserialize `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_entry_with_all_clauses() {
        let json = r#"{
            "id": "derelict_signal",
            "title": "A Signal in the Dark",
            "trigger": {
                "type": "dynamic",
                "weight": 2.5,
                "conditions": {
                    "wake": {"min": 0.3},
                    "zone": ["dark", "void"],
                    "radiation": {"max": "high"},
                    "timeInSystem": {"min": 1, "max": 48},
                    "factionStanding": {"faction": "syndicate", "max": -10},
                    "poiType": ["derelict"],
                    "action": "scanning",
                    "notRecent": ["derelict_signal"],
                    "cooldownSeconds": 120
                }
            },
            "metadata": {"tags": ["salvage", "mystery"], "enabled": true}
        }"#;
        let event: EventDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "derelict_signal");
        assert_eq!(event.trigger.trigger_type, "dynamic");
        assert!((event.weight() - 2.5).abs() < f64::EPSILON);
        assert_eq!(event.event_type(), "salvage");
        assert!(event.is_enabled());
        assert_eq!(event.trigger.conditions.clauses.len(), 8);
        assert_eq!(event.trigger.conditions.cooldown_seconds, Some(120.0));
        assert_eq!(
            event.trigger.conditions.clauses.first(),
            Some(&ConditionClause::WakeRange(NumericRange::new(Some(0.3), None)))
        );
        assert_eq!(
            event.trigger.conditions.clauses.get(1),
            Some(&ConditionClause::ZoneSet(vec![Zone::Dark, Zone::Void]))
        );
        assert_eq!(
            event.content.get("title").and_then(serde_json::Value::as_str),
            Some("A Signal in the Dark")
        );
    }

    #[test]
    fn single_zone_value_is_accepted() {
        let json = r#"{"id": "e", "trigger": {"type": "dynamic", "conditions": {"zone": "static"}}}"#;
        let event: EventDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(
            event.trigger.conditions.clauses,
            vec![ConditionClause::ZoneSet(vec![Zone::Static])]
        );
    }

    #[test]
    fn missing_and_null_blocks_use_defaults() {
        let json = r#"{"id": "bare", "trigger": {"type": "dynamic", "conditions": null}, "metadata": null}"#;
        let event: EventDefinition = serde_json::from_str(json).unwrap();
        assert!(event.trigger.conditions.is_empty());
        assert_eq!(event.event_type(), UNKNOWN_EVENT_TYPE);
        assert!((event.weight() - DEFAULT_TRIGGER_WEIGHT).abs() < f64::EPSILON);
        assert!(event.is_enabled());
    }

    #[test]
    fn only_explicit_false_disables() {
        let event = EventDefinition::new("e", "dynamic");
        assert!(event.is_enabled());
        assert!(event.clone().with_enabled(true).is_enabled());
        assert!(!event.with_enabled(false).is_enabled());
    }

    #[test]
    fn conditions_serialize_back_to_object_form() {
        let conditions = Conditions::new()
            .with(ConditionClause::ActionEquals("docking".to_owned()))
            .with_cooldown(30.0);
        let value = serde_json::to_value(&conditions).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"action": "docking", "cooldownSeconds": 30.0})
        );
    }

    #[test]
    fn numeric_range_bounds_are_inclusive() {
        let range = NumericRange::new(Some(0.2), Some(0.6));
        assert!(range.contains(0.2));
        assert!(range.contains(0.6));
        assert!(!range.contains(0.19));
        assert!(!range.contains(0.61));
        assert!(!range.contains(f64::NAN));
        assert!(NumericRange::default().contains(123.0));
    }

    #[test]
    fn radiation_range_is_ordinal() {
        let range = RadiationRange {
            min: Some(Radiation::Moderate),
            max: Some(Radiation::High),
        };
        assert!(!range.contains(Radiation::Low));
        assert!(range.contains(Radiation::Moderate));
        assert!(range.contains(Radiation::High));
        assert!(!range.contains(Radiation::Extreme));
    }
}
