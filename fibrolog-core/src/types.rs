//! Core domain types for fibrolog
//!
//! An [`Entry`] is one self-reported observation: which body regions hurt,
//! the four symptom-severity subscales, suspected triggers, functional impact
//! and whatever interventions were used that day.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **WPI** | Widespread Pain Index: number of painful body regions (0-18) |
//! | **SSS** | Symptom Severity Score: sum of four 0-3 subscales (0-12) |
//! | **Trigger** | Something the person suspects set off symptoms (weather, food, stress) |
//! | **Intervention** | Something done to relieve symptoms (medication, heat therapy) |
//!
//! ## Lenient input
//!
//! Entries come from a store that never migrated its schema, so every field is
//! optional and unknown fields are ignored. `null` reads as the field default.
//! Trigger and intervention maps are loosely typed on disk; they are read
//! through raw forms that keep only the values the analytics understand.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Deserialize `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keep only the boolean values of a loosely typed flag map.
fn bool_flags<'de, D>(deserializer: D) -> Result<BTreeMap<String, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(collect_bool_flags).unwrap_or_default())
}

fn collect_bool_flags(raw: BTreeMap<String, Value>) -> BTreeMap<String, bool> {
    raw.into_iter()
        .filter_map(|(key, value)| value.as_bool().map(|flag| (key, flag)))
        .collect()
}

/// Keep only the string elements of a value that should be an array.
fn string_elements(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================
// Body regions (WPI)
// ============================================

/// One of the 18 body regions on the widespread pain checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyRegion {
    LeftJaw,
    RightJaw,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHip,
    RightHip,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    Neck,
    UpperBack,
    LowerBack,
    Chest,
}

impl BodyRegion {
    /// All regions in canonical checklist order.
    pub const ALL: [BodyRegion; 18] = [
        BodyRegion::LeftJaw,
        BodyRegion::RightJaw,
        BodyRegion::LeftShoulder,
        BodyRegion::RightShoulder,
        BodyRegion::LeftUpperArm,
        BodyRegion::RightUpperArm,
        BodyRegion::LeftLowerArm,
        BodyRegion::RightLowerArm,
        BodyRegion::LeftHip,
        BodyRegion::RightHip,
        BodyRegion::LeftUpperLeg,
        BodyRegion::RightUpperLeg,
        BodyRegion::LeftLowerLeg,
        BodyRegion::RightLowerLeg,
        BodyRegion::Neck,
        BodyRegion::UpperBack,
        BodyRegion::LowerBack,
        BodyRegion::Chest,
    ];

    /// The key used for this region in stored entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyRegion::LeftJaw => "leftJaw",
            BodyRegion::RightJaw => "rightJaw",
            BodyRegion::LeftShoulder => "leftShoulder",
            BodyRegion::RightShoulder => "rightShoulder",
            BodyRegion::LeftUpperArm => "leftUpperArm",
            BodyRegion::RightUpperArm => "rightUpperArm",
            BodyRegion::LeftLowerArm => "leftLowerArm",
            BodyRegion::RightLowerArm => "rightLowerArm",
            BodyRegion::LeftHip => "leftHip",
            BodyRegion::RightHip => "rightHip",
            BodyRegion::LeftUpperLeg => "leftUpperLeg",
            BodyRegion::RightUpperLeg => "rightUpperLeg",
            BodyRegion::LeftLowerLeg => "leftLowerLeg",
            BodyRegion::RightLowerLeg => "rightLowerLeg",
            BodyRegion::Neck => "neck",
            BodyRegion::UpperBack => "upperBack",
            BodyRegion::LowerBack => "lowerBack",
            BodyRegion::Chest => "chest",
        }
    }
}

impl std::fmt::Display for BodyRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BodyRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyRegion::ALL
            .into_iter()
            .find(|region| region.as_str() == s)
            .ok_or_else(|| format!("unknown body region: {}", s))
    }
}

/// Widespread pain checklist: `true` means the region hurt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wpi {
    #[serde(deserialize_with = "null_as_default")]
    pub left_jaw: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub right_jaw: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub left_shoulder: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub right_shoulder: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub left_upper_arm: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub right_upper_arm: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub left_lower_arm: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub right_lower_arm: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub left_hip: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub right_hip: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub left_upper_leg: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub right_upper_leg: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub left_lower_leg: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub right_lower_leg: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub neck: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub upper_back: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub lower_back: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub chest: bool,
}

impl Wpi {
    /// Whether a region is marked painful.
    pub fn get(&self, region: BodyRegion) -> bool {
        match region {
            BodyRegion::LeftJaw => self.left_jaw,
            BodyRegion::RightJaw => self.right_jaw,
            BodyRegion::LeftShoulder => self.left_shoulder,
            BodyRegion::RightShoulder => self.right_shoulder,
            BodyRegion::LeftUpperArm => self.left_upper_arm,
            BodyRegion::RightUpperArm => self.right_upper_arm,
            BodyRegion::LeftLowerArm => self.left_lower_arm,
            BodyRegion::RightLowerArm => self.right_lower_arm,
            BodyRegion::LeftHip => self.left_hip,
            BodyRegion::RightHip => self.right_hip,
            BodyRegion::LeftUpperLeg => self.left_upper_leg,
            BodyRegion::RightUpperLeg => self.right_upper_leg,
            BodyRegion::LeftLowerLeg => self.left_lower_leg,
            BodyRegion::RightLowerLeg => self.right_lower_leg,
            BodyRegion::Neck => self.neck,
            BodyRegion::UpperBack => self.upper_back,
            BodyRegion::LowerBack => self.lower_back,
            BodyRegion::Chest => self.chest,
        }
    }

    /// Mark a region painful or not.
    pub fn set(&mut self, region: BodyRegion, painful: bool) {
        let slot = match region {
            BodyRegion::LeftJaw => &mut self.left_jaw,
            BodyRegion::RightJaw => &mut self.right_jaw,
            BodyRegion::LeftShoulder => &mut self.left_shoulder,
            BodyRegion::RightShoulder => &mut self.right_shoulder,
            BodyRegion::LeftUpperArm => &mut self.left_upper_arm,
            BodyRegion::RightUpperArm => &mut self.right_upper_arm,
            BodyRegion::LeftLowerArm => &mut self.left_lower_arm,
            BodyRegion::RightLowerArm => &mut self.right_lower_arm,
            BodyRegion::LeftHip => &mut self.left_hip,
            BodyRegion::RightHip => &mut self.right_hip,
            BodyRegion::LeftUpperLeg => &mut self.left_upper_leg,
            BodyRegion::RightUpperLeg => &mut self.right_upper_leg,
            BodyRegion::LeftLowerLeg => &mut self.left_lower_leg,
            BodyRegion::RightLowerLeg => &mut self.right_lower_leg,
            BodyRegion::Neck => &mut self.neck,
            BodyRegion::UpperBack => &mut self.upper_back,
            BodyRegion::LowerBack => &mut self.lower_back,
            BodyRegion::Chest => &mut self.chest,
        };
        *slot = painful;
    }

    /// Build a checklist with the given regions marked painful.
    pub fn from_regions(regions: &[BodyRegion]) -> Self {
        let mut wpi = Wpi::default();
        for region in regions {
            wpi.set(*region, true);
        }
        wpi
    }

    /// Every region with its flag, in canonical order.
    pub fn regions(&self) -> impl Iterator<Item = (BodyRegion, bool)> + '_ {
        BodyRegion::ALL
            .into_iter()
            .map(move |region| (region, self.get(region)))
    }

    /// Number of painful regions (0-18).
    pub fn count(&self) -> u32 {
        self.regions().filter(|(_, painful)| *painful).count() as u32
    }
}

// ============================================
// Symptom severity (SSS)
// ============================================

/// The four symptom-severity subscales, each rated 0-3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sss {
    #[serde(deserialize_with = "null_as_default")]
    pub fatigue: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub waking_unrefreshed: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub cognitive_symptoms: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub somatic_symptoms: u8,
}

impl Sss {
    pub fn new(fatigue: u8, waking_unrefreshed: u8, cognitive_symptoms: u8, somatic_symptoms: u8) -> Self {
        Self {
            fatigue,
            waking_unrefreshed,
            cognitive_symptoms,
            somatic_symptoms,
        }
    }

    /// Sum of the four subscales (0-12 for in-range ratings).
    pub fn total(&self) -> u32 {
        u32::from(self.fatigue)
            + u32::from(self.waking_unrefreshed)
            + u32::from(self.cognitive_symptoms)
            + u32::from(self.somatic_symptoms)
    }
}

// ============================================
// Triggers
// ============================================

/// Suspected triggers recorded with an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTriggers", rename_all = "camelCase")]
pub struct Triggers {
    /// Weather condition, e.g. "cold" or "humid"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    /// Foods suspected of causing a reaction
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub food_sensitivity: Vec<String>,
    /// Any other trigger flag, e.g. `stress` or `poorSleep`
    #[serde(flatten)]
    pub flags: BTreeMap<String, bool>,
}

/// On-disk shape of [`Triggers`] before loose values are filtered.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTriggers {
    #[serde(default)]
    weather: Option<Value>,
    #[serde(default)]
    food_sensitivity: Option<Value>,
    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

impl From<RawTriggers> for Triggers {
    fn from(raw: RawTriggers) -> Self {
        let weather = match raw.weather {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        Self {
            weather,
            food_sensitivity: string_elements(raw.food_sensitivity),
            flags: collect_bool_flags(raw.rest),
        }
    }
}

impl Triggers {
    pub fn with_weather(mut self, weather: &str) -> Self {
        self.weather = Some(weather.to_string());
        self
    }

    pub fn with_foods(mut self, foods: &[&str]) -> Self {
        self.food_sensitivity = foods.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_flag(mut self, name: &str, value: bool) -> Self {
        self.flags.insert(name.to_string(), value);
        self
    }
}

// ============================================
// Impact
// ============================================

/// Daily impact ratings, each 0-5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Impact {
    #[serde(deserialize_with = "null_as_default")]
    pub sleep_quality: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub mood_rating: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub anxiety_level: u8,
    /// 0 = no impairment, 5 = bedridden
    #[serde(deserialize_with = "null_as_default")]
    pub functional_ability: u8,
}

// ============================================
// Activity
// ============================================

/// Self-reported activity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Bedbound,
    Minimal,
    Light,
    Moderate,
    Active,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Activity details. Recorded for reports; the analytics do not read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    #[serde(deserialize_with = "null_as_default")]
    pub level: ActivityLevel,
    /// Free-form counters such as steps or rest breaks
    #[serde(flatten)]
    pub counters: BTreeMap<String, Value>,
}

// ============================================
// Interventions
// ============================================

/// Interventions used on the day of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawInterventions")]
pub struct Interventions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub medication: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supplements: Vec<String>,
    /// Boolean interventions, e.g. `heatTherapy`
    #[serde(flatten)]
    pub flags: BTreeMap<String, bool>,
}

#[derive(Deserialize)]
struct RawInterventions {
    #[serde(default)]
    medication: Option<Value>,
    #[serde(default)]
    supplements: Option<Value>,
    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

impl From<RawInterventions> for Interventions {
    fn from(raw: RawInterventions) -> Self {
        Self {
            medication: string_elements(raw.medication),
            supplements: string_elements(raw.supplements),
            flags: collect_bool_flags(raw.rest),
        }
    }
}

impl Interventions {
    pub fn with_flag(mut self, name: &str, value: bool) -> Self {
        self.flags.insert(name.to_string(), value);
        self
    }

    pub fn with_medication(mut self, names: &[&str]) -> Self {
        self.medication = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_supplements(mut self, names: &[&str]) -> Self {
        self.supplements = names.iter().map(|n| n.to_string()).collect();
        self
    }
}

// ============================================
// Entry
// ============================================

/// One logged observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entry {
    /// Opaque identifier
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// ISO-8601 timestamp; may be empty or malformed
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_as_default")]
    pub wpi: Wpi,
    #[serde(deserialize_with = "null_as_default")]
    pub sss: Sss,
    /// Ancillary symptom flags (headache, IBS, ...)
    #[serde(deserialize_with = "bool_flags")]
    pub symptoms: BTreeMap<String, bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub triggers: Triggers,
    #[serde(deserialize_with = "null_as_default")]
    pub impact: Impact,
    #[serde(deserialize_with = "null_as_default")]
    pub activity: Activity,
    #[serde(deserialize_with = "null_as_default")]
    pub interventions: Interventions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Entry {
    /// Create an empty entry with an id and timestamp.
    pub fn new(id: &str, timestamp: &str) -> Self {
        Self {
            id: id.to_string(),
            timestamp: timestamp.to_string(),
            ..Default::default()
        }
    }

    pub fn with_wpi(mut self, regions: &[BodyRegion]) -> Self {
        self.wpi = Wpi::from_regions(regions);
        self
    }

    pub fn with_sss(mut self, sss: Sss) -> Self {
        self.sss = sss;
        self
    }

    pub fn with_functional_ability(mut self, value: u8) -> Self {
        self.impact.functional_ability = value;
        self
    }

    pub fn with_triggers(mut self, triggers: Triggers) -> Self {
        self.triggers = triggers;
        self
    }

    pub fn with_interventions(mut self, interventions: Interventions) -> Self {
        self.interventions = interventions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_region_keys_round_trip() {
        for region in BodyRegion::ALL {
            assert_eq!(region.as_str().parse::<BodyRegion>(), Ok(region));
        }
        assert!("leftElbow".parse::<BodyRegion>().is_err());
    }

    #[test]
    fn test_wpi_count() {
        let wpi = Wpi::from_regions(&[BodyRegion::Neck, BodyRegion::LeftHip, BodyRegion::Chest]);
        assert_eq!(wpi.count(), 3);
        assert!(wpi.get(BodyRegion::Neck));
        assert!(!wpi.get(BodyRegion::RightHip));
        assert_eq!(Wpi::default().count(), 0);
    }

    #[test]
    fn test_sss_total() {
        assert_eq!(Sss::new(3, 2, 1, 0).total(), 6);
        assert_eq!(Sss::default().total(), 0);
    }

    #[test]
    fn test_parse_full_entry() {
        let json = serde_json::json!({
            "id": "e1",
            "timestamp": "2024-03-01T08:30:00Z",
            "wpi": { "leftShoulder": true, "neck": true, "chest": false },
            "sss": { "fatigue": 2, "waking_unrefreshed": 3, "cognitive_symptoms": 1, "somatic_symptoms": 0 },
            "symptoms": { "headache": true, "ibs": false },
            "triggers": { "weather": "cold", "foodSensitivity": ["gluten"], "stress": true, "poorSleep": false },
            "impact": { "sleepQuality": 2, "moodRating": 3, "anxietyLevel": 1, "functionalAbility": 4 },
            "activity": { "level": "light", "steps": 3200 },
            "interventions": { "heatTherapy": true, "medication": ["pregabalin"], "supplements": [] },
            "notes": "rough morning",
            "userId": "u1"
        });

        let entry: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.id, "e1");
        assert_eq!(entry.wpi.count(), 2);
        assert_eq!(entry.sss.total(), 6);
        assert_eq!(entry.symptoms.get("headache"), Some(&true));
        assert_eq!(entry.triggers.weather.as_deref(), Some("cold"));
        assert_eq!(entry.triggers.food_sensitivity, vec!["gluten"]);
        assert_eq!(entry.triggers.flags.get("stress"), Some(&true));
        assert_eq!(entry.triggers.flags.get("poorSleep"), Some(&false));
        assert_eq!(entry.impact.functional_ability, 4);
        assert_eq!(entry.activity.level, ActivityLevel::Light);
        assert_eq!(entry.interventions.flags.get("heatTherapy"), Some(&true));
        assert_eq!(entry.interventions.medication, vec!["pregabalin"]);
        assert_eq!(entry.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_parse_sparse_entry_defaults_everything() {
        let entry: Entry = serde_json::from_str(r#"{"timestamp": "2024-03-01"}"#).unwrap();
        assert_eq!(entry.id, "");
        assert_eq!(entry.wpi.count(), 0);
        assert_eq!(entry.sss.total(), 0);
        assert!(entry.triggers.flags.is_empty());
        assert!(entry.interventions.medication.is_empty());
        assert_eq!(entry.activity.level, ActivityLevel::Unknown);
    }

    #[test]
    fn test_nulls_read_as_defaults() {
        let json = serde_json::json!({
            "id": null,
            "timestamp": null,
            "wpi": { "neck": null, "chest": true },
            "sss": null,
            "triggers": null,
            "impact": { "functionalAbility": null },
            "interventions": null
        });
        let entry: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.timestamp, "");
        assert_eq!(entry.wpi.count(), 1);
        assert_eq!(entry.sss, Sss::default());
        assert_eq!(entry.triggers, Triggers::default());
        assert_eq!(entry.impact.functional_ability, 0);
    }

    #[test]
    fn test_loose_trigger_values_are_filtered() {
        let json = serde_json::json!({
            "weather": 12,
            "foodSensitivity": ["dairy", 7, null, "  ", { "x": 1 }],
            "stress": true,
            "hormonal": "yes",
            "overexertion": null
        });
        let triggers: Triggers = serde_json::from_value(json).unwrap();
        assert_eq!(triggers.weather, None);
        assert_eq!(triggers.food_sensitivity, vec!["dairy", "  "]);
        assert_eq!(triggers.flags.len(), 1);
        assert_eq!(triggers.flags.get("stress"), Some(&true));
    }

    #[test]
    fn test_loose_intervention_values_are_filtered() {
        let json = serde_json::json!({
            "medication": "ibuprofen",
            "supplements": ["magnesium", false],
            "stretching": true,
            "massage": 1
        });
        let interventions: Interventions = serde_json::from_value(json).unwrap();
        assert!(interventions.medication.is_empty());
        assert_eq!(interventions.supplements, vec!["magnesium"]);
        assert_eq!(interventions.flags.len(), 1);
        assert_eq!(interventions.flags.get("stretching"), Some(&true));
    }

    #[test]
    fn test_unknown_activity_level() {
        let activity: Activity = serde_json::from_str(r#"{"level": "hiking"}"#).unwrap();
        assert_eq!(activity.level, ActivityLevel::Unknown);
    }

    #[test]
    fn test_entry_serializes_with_stored_keys() {
        let entry = Entry::new("e1", "2024-03-01T08:00:00Z")
            .with_wpi(&[BodyRegion::UpperBack])
            .with_functional_ability(2)
            .with_triggers(Triggers::default().with_weather("humid").with_flag("stress", true));

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["wpi"]["upperBack"], true);
        assert_eq!(value["impact"]["functionalAbility"], 2);
        assert_eq!(value["triggers"]["weather"], "humid");
        assert_eq!(value["triggers"]["stress"], true);

        let back: Entry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
