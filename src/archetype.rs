use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConstants;
use crate::numeric::round_to;
use crate::player::Onboarding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatArchetype {
    Firestarter,
    Controller,
    Closer,
    Dual,
    #[serde(alias = "360")]
    Threesixty,
    Spindom,
}

impl BatArchetype {
    pub const ALL: [BatArchetype; 6] = [
        BatArchetype::Firestarter,
        BatArchetype::Controller,
        BatArchetype::Closer,
        BatArchetype::Dual,
        BatArchetype::Threesixty,
        BatArchetype::Spindom,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BatArchetype::Firestarter => "firestarter",
            BatArchetype::Controller => "controller",
            BatArchetype::Closer => "closer",
            BatArchetype::Dual => "dual",
            BatArchetype::Threesixty => "threesixty",
            BatArchetype::Spindom => "spindom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BatArchetype::Firestarter => "Firestarter",
            BatArchetype::Controller => "Controller",
            BatArchetype::Closer => "Closer",
            BatArchetype::Dual => "Dual Threat",
            BatArchetype::Threesixty => "360 Player",
            BatArchetype::Spindom => "Spin Dominator",
        }
    }

    pub fn from_id(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.id() == raw)
            .or_else(|| (raw == "360").then_some(BatArchetype::Threesixty))
    }
}

impl fmt::Display for BatArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BowlArchetype {
    Hunter,
    Weapon,
    Squeeze,
    Developer,
    Death,
    Express,
    Containing,
}

impl BowlArchetype {
    pub const ALL: [BowlArchetype; 7] = [
        BowlArchetype::Hunter,
        BowlArchetype::Weapon,
        BowlArchetype::Squeeze,
        BowlArchetype::Developer,
        BowlArchetype::Death,
        BowlArchetype::Express,
        BowlArchetype::Containing,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BowlArchetype::Hunter => "hunter",
            BowlArchetype::Weapon => "weapon",
            BowlArchetype::Squeeze => "squeeze",
            BowlArchetype::Developer => "developer",
            BowlArchetype::Death => "death",
            BowlArchetype::Express => "express",
            BowlArchetype::Containing => "containing",
        }
    }

    pub fn from_id(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|a| a.id() == raw)
    }
}

type Affinities = BTreeMap<BatArchetype, f64>;

/// Onboarding answer -> batting archetype affinities. Answer keys match case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalMap {
    pub shots: BTreeMap<String, Affinities>,
    pub phases: BTreeMap<String, Affinities>,
    pub positions: BTreeMap<String, Affinities>,
    #[serde(alias = "comfortSpin")]
    pub comfort_spin: Affinities,
    #[serde(alias = "comfortPace")]
    pub comfort_pace: Affinities,
}

fn affinities(pairs: &[(BatArchetype, f64)]) -> Affinities {
    pairs.iter().copied().collect()
}

fn table(rows: &[(&str, &[(BatArchetype, f64)])]) -> BTreeMap<String, Affinities> {
    rows.iter()
        .map(|(key, pairs)| (key.to_string(), affinities(pairs)))
        .collect()
}

impl Default for SignalMap {
    fn default() -> Self {
        use BatArchetype::*;
        Self {
            shots: table(&[
                ("Drive", &[(Controller, 1.0), (Threesixty, 0.5)]),
                ("Pull", &[(Firestarter, 1.0), (Closer, 0.5)]),
                ("Cut", &[(Controller, 0.5), (Threesixty, 0.5)]),
                ("Sweep", &[(Spindom, 1.0), (Threesixty, 0.5)]),
                ("Reverse Sweep", &[(Spindom, 1.0), (Threesixty, 1.0)]),
                ("Ramp/Scoop", &[(Threesixty, 1.0), (Closer, 0.5)]),
                ("Switch Hit", &[(Threesixty, 1.5)]),
                ("Flick", &[(Controller, 0.5), (Threesixty, 0.5)]),
                ("Lap/Paddle", &[(Spindom, 1.0), (Threesixty, 0.5)]),
                ("Lofted Hit", &[(Firestarter, 1.0), (Closer, 1.0)]),
                ("Late Cut", &[(Controller, 1.0)]),
                ("Upper Cut", &[(Firestarter, 1.0)]),
            ]),
            phases: table(&[
                ("pp", &[(Firestarter, 1.5)]),
                ("mid", &[(Controller, 1.0), (Spindom, 1.0)]),
                ("death", &[(Closer, 1.5)]),
            ]),
            positions: table(&[
                ("top", &[(Firestarter, 1.0), (Controller, 0.5)]),
                ("middle", &[(Controller, 1.0), (Spindom, 0.5)]),
                ("lower", &[(Closer, 1.0), (Dual, 0.5)]),
                ("tail", &[(Dual, 1.0)]),
            ]),
            comfort_spin: affinities(&[(Spindom, 1.0)]),
            comfort_pace: affinities(&[(Firestarter, 0.5), (Closer, 0.5)]),
        }
    }
}

fn lookup<'a>(table: &'a BTreeMap<String, Affinities>, answer: &str) -> Option<&'a Affinities> {
    let answer = answer.trim();
    table
        .get(answer)
        .or_else(|| {
            table
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(answer))
                .map(|(_, v)| v)
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDna {
    pub bat: BTreeMap<BatArchetype, u32>,
    pub bowl: BTreeMap<BowlArchetype, u32>,
    pub primary_bat: Option<BatArchetype>,
    pub primary_bowl: Option<BowlArchetype>,
    /// Onboarding answers that matched a signal.
    pub signal_count: usize,
    pub confident: bool,
}

/// Whole-number shares summing to 100, with the rounding remainder given to the
/// first top-scoring entry. All zeros when nothing scored.
fn to_percentages<K: Copy + Ord>(order: &[K], scores: &BTreeMap<K, f64>) -> BTreeMap<K, u32> {
    let total: f64 = scores.values().sum();
    let mut pct: Vec<(K, i64)> = order
        .iter()
        .map(|k| {
            let s = scores.get(k).copied().unwrap_or(0.0);
            let p = if total > 0.0 { round_to(s / total * 100.0, 0) as i64 } else { 0 };
            (*k, p)
        })
        .collect();
    let sum: i64 = pct.iter().map(|(_, p)| p).sum();
    if sum > 0 && sum != 100 {
        if let Some(top) = first_max(&pct) {
            pct[top].1 += 100 - sum;
        }
    }
    pct.into_iter().map(|(k, p)| (k, p.max(0) as u32)).collect()
}

fn first_max<K>(entries: &[(K, i64)]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, (_, v)) in entries.iter().enumerate() {
        if best.is_none_or(|b| *v > entries[b].1) {
            best = Some(idx);
        }
    }
    best
}

fn primary<K: Copy + Ord>(order: &[K], pct: &BTreeMap<K, u32>) -> Option<K> {
    let mut best: Option<(K, u32)> = None;
    for k in order {
        let v = pct.get(k).copied().unwrap_or(0);
        if v > best.map(|(_, b)| b).unwrap_or(0) {
            best = Some((*k, v));
        }
    }
    best.map(|(k, _)| k)
}

/// Signal-weighted batting/bowling style profile.
///
/// The coach-assigned archetype gets a heavy base weight; onboarding answers add
/// smaller affinities. Bowling has no onboarding signals, so its profile is driven by
/// the coach alone.
pub fn archetype_dna(
    onboarding: &Onboarding,
    coach_bat: Option<&str>,
    coach_bowl: Option<&str>,
    signals: &SignalMap,
    constants: &EngineConstants,
) -> ArchetypeDna {
    let mut bat: BTreeMap<BatArchetype, f64> =
        BatArchetype::ALL.iter().map(|a| (*a, 0.0)).collect();
    let mut bowl: BTreeMap<BowlArchetype, f64> =
        BowlArchetype::ALL.iter().map(|a| (*a, 0.0)).collect();

    if let Some(a) = coach_bat.and_then(BatArchetype::from_id) {
        *bat.entry(a).or_default() += constants.coach_archetype_weight;
    }
    if let Some(a) = coach_bowl.and_then(BowlArchetype::from_id) {
        *bowl.entry(a).or_default() += constants.coach_archetype_weight;
    }

    let mut signal_count = 0usize;
    let mut apply = |aff: &Affinities| {
        signal_count += 1;
        for (arch, w) in aff {
            *bat.entry(*arch).or_default() += w;
        }
    };

    for shot in &onboarding.go_to_shots {
        if let Some(aff) = lookup(&signals.shots, shot) {
            apply(aff);
        }
    }
    for phase in &onboarding.bat_phases {
        if let Some(aff) = lookup(&signals.phases, phase) {
            apply(aff);
        }
    }
    if let Some(aff) = onboarding
        .bat_position
        .as_deref()
        .and_then(|p| lookup(&signals.positions, p))
    {
        apply(aff);
    }
    let threshold = constants.comfort_signal_threshold;
    if onboarding.comfort_spin.is_some_and(|v| v >= threshold) {
        apply(&signals.comfort_spin);
    }
    if onboarding.comfort_pace.is_some_and(|v| v >= threshold) {
        apply(&signals.comfort_pace);
    }

    let bat_pct = to_percentages(&BatArchetype::ALL, &bat);
    let bowl_pct = to_percentages(&BowlArchetype::ALL, &bowl);
    ArchetypeDna {
        primary_bat: primary(&BatArchetype::ALL, &bat_pct),
        primary_bowl: primary(&BowlArchetype::ALL, &bowl_pct),
        bat: bat_pct,
        bowl: bowl_pct,
        signal_count,
        confident: signal_count >= constants.archetype_min_signal_count,
    }
}
