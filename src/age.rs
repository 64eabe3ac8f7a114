use std::fmt;

use serde::{Deserialize, Serialize};

/// Age in whole years from a `dd/mm/yyyy` string, measured against `reference_year`.
///
/// Only the year is used; day and month are ignored. Anything that isn't three
/// `/`-separated parts with a numeric year, or that yields an age of zero or less,
/// resolves to `None`.
pub fn resolve_age(dob: &str, reference_year: i32) -> Option<u32> {
    let parts: Vec<&str> = dob.trim().split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let year = parts[2].trim().parse::<i32>().ok()?;
    let age = reference_year - year;
    if age <= 0 { None } else { Some(age as u32) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "U11-U13")]
    U11ToU13,
    #[serde(rename = "U14-U16")]
    U14ToU16,
    #[serde(rename = "U17-U19")]
    U17ToU19,
    #[serde(rename = "U20+")]
    U20Plus,
    #[serde(rename = "?")]
    Unknown,
}

impl AgeBracket {
    pub fn from_age(age: Option<u32>) -> Self {
        match age {
            None => AgeBracket::Unknown,
            Some(a) if a <= 13 => AgeBracket::U11ToU13,
            Some(a) if a <= 16 => AgeBracket::U14ToU16,
            Some(a) if a <= 19 => AgeBracket::U17ToU19,
            Some(_) => AgeBracket::U20Plus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBracket::U11ToU13 => "U11-U13",
            AgeBracket::U14ToU16 => "U14-U16",
            AgeBracket::U17ToU19 => "U17-U19",
            AgeBracket::U20Plus => "U20+",
            AgeBracket::Unknown => "?",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn resolve_bracket(dob: &str, reference_year: i32) -> AgeBracket {
    AgeBracket::from_age(resolve_age(dob, reference_year))
}

/// Age tier used to pick pillar weights. Unknown ages are treated as `Young`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeTier {
    Young,
    Mid,
    Senior,
}

impl AgeTier {
    pub const ALL: [AgeTier; 3] = [AgeTier::Young, AgeTier::Mid, AgeTier::Senior];

    pub fn from_age(age: Option<u32>) -> Self {
        match age {
            None => AgeTier::Young,
            Some(a) if a <= 14 => AgeTier::Young,
            Some(a) if a <= 16 => AgeTier::Mid,
            Some(_) => AgeTier::Senior,
        }
    }
}
