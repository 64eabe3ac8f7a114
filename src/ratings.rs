use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineConstants;
use crate::numeric::coerce_value;
use crate::player::Role;

// Item lists are position-indexed: persisted ratings refer to items by index,
// so entries are only ever appended.
pub const BAT_ITEMS: [&str; 10] = [
    "Stance & Setup",
    "Trigger Movement & Balance",
    "Front-Foot Drive",
    "Back-Foot Play",
    "Power Hitting",
    "Sweep & Reverse Sweep",
    "Playing Spin",
    "Playing Pace",
    "Strike Rotation",
    "Death-Over Hitting",
];
pub const PACE_ITEMS: [&str; 10] = [
    "Run-Up Rhythm",
    "Action Alignment",
    "Front-Leg Brace",
    "Wrist & Seam",
    "Stock Ball Control",
    "Yorker Execution",
    "Slower Ball Variation",
    "Bouncer Effectiveness",
    "Wide-Line Strategy",
    "Bowling to Plans",
];
pub const SPIN_ITEMS: [&str; 10] = [
    "Stock Ball Accuracy",
    "Revolutions & Spin Rate",
    "Wrong'un Execution",
    "Flight & Dip Control",
    "Use of Crease",
    "Match-Up Bowling",
    "Middle-Over Control",
    "Powerplay Tactics",
    "Death-Over Spin",
    "Reading the Batter",
];
pub const KEEP_ITEMS: [&str; 8] = [
    "Stance & Ready Position",
    "Footwork to Pace",
    "Standing Up to Spin",
    "Glove Work",
    "Stumping Speed",
    "Diving & Athleticism",
    "Communication",
    "Throwing Accuracy",
];
const BATTER_SECONDARY: [&str; 4] = [
    "Ground Fielding",
    "Catching",
    "Part-Time Bowling",
    "Running Between",
];
const ALLROUNDER_SECONDARY: [&str; 5] = [
    "Stock Ball Control",
    "Variation Execution",
    "Bowling to Plans",
    "Death Execution",
    "Match-Up Awareness",
];
pub const IQ_ITEMS: [&str; 6] = [
    "Powerplay Awareness",
    "Middle-Over Management",
    "Death-Over Decisions",
    "Match Reading",
    "Field Awareness",
    "Adaptability",
];
pub const MN_ITEMS: [&str; 7] = [
    "Courage Under Pressure",
    "Curiosity & Learning",
    "Emotional Regulation",
    "Competitive Drive",
    "Communication & Leadership",
    "Coachability",
    "Resilience",
];
const PH_PACE: [&str; 5] = [
    "Explosive Power",
    "Core Stability",
    "Eccentric Quad Strength",
    "Shoulder Mobility",
    "Aerobic Recovery",
];
const PH_SPIN: [&str; 5] = [
    "Shoulder Flexibility",
    "Core & Rotational Power",
    "Aerobic Endurance",
    "Balance & Landing",
    "General Movement",
];
const PH_KEEPER: [&str; 5] = [
    "Lateral Movement",
    "Squat Endurance",
    "Hand-Eye Coordination",
    "Core Stability",
    "Aerobic Fitness",
];
const PH_BATTER: [&str; 5] = [
    "Explosive Power",
    "Agility & Running",
    "Core Balance",
    "Upper Body Power",
    "Aerobic Fitness",
];
const PH_ALLROUNDER: [&str; 5] = [
    "Explosive Power",
    "Bowling Athleticism",
    "Core Balance",
    "Aerobic Fitness",
    "General Movement",
];
pub const FLD_ITEMS: [&str; 6] = [
    "Ground Fielding",
    "Catching",
    "Throwing Accuracy",
    "Run-Out Execution",
    "Boundary Riding",
    "Close-In Reflexes",
];
pub const PWR_ITEMS: [&str; 5] = [
    "Range Hitting",
    "Bat Speed",
    "Boundary Clearing",
    "Six-Hitting vs Pace",
    "Six-Hitting vs Spin",
];
pub const PHASE_ITEMS: [&str; 6] = [
    "Powerplay Batting",
    "Powerplay Bowling",
    "Middle-Overs Batting",
    "Middle-Overs Bowling",
    "Death-Overs Batting",
    "Death-Overs Bowling",
];
const PHASE_KEYS: [&str; 6] = ["pb_pp", "pw_pp", "pb_mid", "pw_mid", "pb_death", "pw_death"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillGroup {
    TechnicalPrimary,
    TechnicalSecondary,
    Tactical,
    Mental,
    Physical,
    Fielding,
    Power,
    Phase,
}

impl SkillGroup {
    pub const ALL: [SkillGroup; 8] = [
        SkillGroup::TechnicalPrimary,
        SkillGroup::TechnicalSecondary,
        SkillGroup::Tactical,
        SkillGroup::Mental,
        SkillGroup::Physical,
        SkillGroup::Fielding,
        SkillGroup::Power,
        SkillGroup::Phase,
    ];

    /// Groups that count towards the coach/self comparison. Phase effectiveness is
    /// match-context rather than skill, so it is left out.
    pub const SKILL: [SkillGroup; 7] = [
        SkillGroup::TechnicalPrimary,
        SkillGroup::TechnicalSecondary,
        SkillGroup::Tactical,
        SkillGroup::Mental,
        SkillGroup::Physical,
        SkillGroup::Fielding,
        SkillGroup::Power,
    ];

    fn prefix(self) -> &'static str {
        match self {
            SkillGroup::TechnicalPrimary => "t1",
            SkillGroup::TechnicalSecondary => "t2",
            SkillGroup::Tactical => "iq",
            SkillGroup::Mental => "mn",
            SkillGroup::Physical => "ph",
            SkillGroup::Fielding => "fld",
            SkillGroup::Power => "pwr",
            SkillGroup::Phase => "pb",
        }
    }

    fn from_prefix(prefix: &str) -> Option<SkillGroup> {
        Some(match prefix {
            "t1" => SkillGroup::TechnicalPrimary,
            "t2" => SkillGroup::TechnicalSecondary,
            "iq" => SkillGroup::Tactical,
            "mn" => SkillGroup::Mental,
            "ph" => SkillGroup::Physical,
            "fld" => SkillGroup::Fielding,
            "pwr" => SkillGroup::Power,
            _ => return None,
        })
    }

    pub fn items(self, role: Role) -> &'static [&'static str] {
        match self {
            SkillGroup::TechnicalPrimary => match role {
                Role::Batter => &BAT_ITEMS,
                Role::Pace => &PACE_ITEMS,
                Role::Spin => &SPIN_ITEMS,
                Role::Keeper => &KEEP_ITEMS,
                Role::Allrounder => &BAT_ITEMS[..7],
            },
            SkillGroup::TechnicalSecondary => match role {
                Role::Batter => &BATTER_SECONDARY,
                Role::Pace | Role::Spin => &BAT_ITEMS[..6],
                Role::Keeper => &BAT_ITEMS,
                Role::Allrounder => &ALLROUNDER_SECONDARY,
            },
            SkillGroup::Tactical => &IQ_ITEMS,
            SkillGroup::Mental => &MN_ITEMS,
            SkillGroup::Physical => match role {
                Role::Batter => &PH_BATTER,
                Role::Pace => &PH_PACE,
                Role::Spin => &PH_SPIN,
                Role::Keeper => &PH_KEEPER,
                Role::Allrounder => &PH_ALLROUNDER,
            },
            SkillGroup::Fielding => &FLD_ITEMS,
            SkillGroup::Power => &PWR_ITEMS,
            SkillGroup::Phase => &PHASE_ITEMS,
        }
    }

    pub fn item_count(self, role: Role) -> usize {
        self.items(role).len()
    }
}

/// One rateable item: a skill group plus the item's position in that group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub group: SkillGroup,
    pub index: u8,
}

impl ItemKey {
    pub const fn new(group: SkillGroup, index: u8) -> Self {
        Self { group, index }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group == SkillGroup::Phase {
            if let Some(key) = PHASE_KEYS.get(self.index as usize) {
                return f.write_str(key);
            }
        }
        write!(f, "{}_{}", self.group.prefix(), self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKeyError(pub String);

impl fmt::Display for ItemKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rating key `{}`", self.0)
    }
}

impl std::error::Error for ItemKeyError {}

impl FromStr for ItemKey {
    type Err = ItemKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if let Some(pos) = PHASE_KEYS.iter().position(|k| *k == key) {
            return Ok(ItemKey::new(SkillGroup::Phase, pos as u8));
        }
        let err = || ItemKeyError(key.to_string());
        let (prefix, index) = key.rsplit_once('_').ok_or_else(err)?;
        let group = SkillGroup::from_prefix(prefix).ok_or_else(err)?;
        let index = index.parse::<u8>().map_err(|_| err())?;
        Ok(ItemKey::new(group, index))
    }
}

/// A 1-5 rating. Zero means "unrated" and is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Self(value))
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let rounded = value.round();
        if !(1.0..=5.0).contains(&rounded) {
            return None;
        }
        Self::new(rounded as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Sparse ratings for one rater (a coach or the player), keyed by item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, u8>")]
pub struct RatingSet {
    items: BTreeMap<ItemKey, Rating>,
}

impl RatingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear an item. Values outside 1..=5 clear it.
    pub fn rate(&mut self, key: ItemKey, value: u8) {
        match Rating::new(value) {
            Some(r) => {
                self.items.insert(key, r);
            }
            None => {
                self.items.remove(&key);
            }
        }
    }

    pub fn with(mut self, group: SkillGroup, values: &[u8]) -> Self {
        for (idx, v) in values.iter().enumerate() {
            self.rate(ItemKey::new(group, idx as u8), *v);
        }
        self
    }

    pub fn get(&self, key: ItemKey) -> Option<Rating> {
        self.items.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn rated_in(&self, group: SkillGroup) -> usize {
        self.items.keys().filter(|k| k.group == group).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKey, Rating)> + '_ {
        self.items.iter().map(|(k, v)| (*k, *v))
    }
}

impl From<BTreeMap<String, Value>> for RatingSet {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let mut set = RatingSet::new();
        for (key, value) in raw {
            let Ok(item) = key.parse::<ItemKey>() else {
                tracing::trace!(key = %key, "skipping non-rating key");
                continue;
            };
            if let Some(r) = coerce_value(&value).and_then(Rating::from_f64) {
                set.items.insert(item, r);
            }
        }
        set
    }
}

impl From<RatingSet> for BTreeMap<String, u8> {
    fn from(set: RatingSet) -> Self {
        set.items
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.value()))
            .collect()
    }
}

/// Mean over the rated items of a group (unrated items are skipped, not counted as zero).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupMean {
    pub mean: f64,
    pub rated: usize,
    pub total: usize,
}

impl GroupMean {
    pub fn of_keys(set: &RatingSet, keys: &[ItemKey]) -> Self {
        let mut sum = 0.0;
        let mut rated = 0usize;
        for key in keys {
            if let Some(r) = set.get(*key) {
                sum += f64::from(r.value());
                rated += 1;
            }
        }
        let mean = if rated > 0 { sum / rated as f64 } else { 0.0 };
        Self {
            mean,
            rated,
            total: keys.len(),
        }
    }

    /// Rated-count-weighted mean across several groups.
    pub fn pooled(parts: &[GroupMean]) -> Self {
        let rated: usize = parts.iter().map(|p| p.rated).sum();
        let total: usize = parts.iter().map(|p| p.total).sum();
        let sum: f64 = parts.iter().map(|p| p.mean * p.rated as f64).sum();
        let mean = if rated > 0 { sum / rated as f64 } else { 0.0 };
        Self { mean, rated, total }
    }
}

pub fn group_mean(set: &RatingSet, group: SkillGroup, role: Role) -> GroupMean {
    let keys: Vec<ItemKey> = (0..group.item_count(role))
        .map(|i| ItemKey::new(group, i as u8))
        .collect();
    GroupMean::of_keys(set, &keys)
}

/// Context-Scaled Score: blend coach and self means, then scale by CCM.
///
/// With no competition context (CCM 0) the raw coach value is used, or the self
/// value if the coach hasn't rated anything.
pub fn context_scaled(coach: f64, player: f64, ccm: f64, constants: &EngineConstants) -> f64 {
    if ccm <= 0.0 {
        return if coach > 0.0 { coach } else { player.max(0.0) };
    }
    if coach > 0.0 && player > 0.0 {
        (coach * constants.coach_weight + player * constants.player_weight) * ccm
    } else if coach > 0.0 {
        coach * ccm
    } else if player > 0.0 {
        player * ccm
    } else {
        0.0
    }
}
