use serde::{Deserialize, Serialize};

use crate::benchmarks::{BenchmarkTable, Direction, score_against};
use crate::competition::{Band, CompetitionGrade, CompetitionTier};
use crate::config::EngineConstants;
use crate::numeric::{ratio, round2};
use crate::peak::{PeakResult, score_peaks};
use crate::player::{PeakBatting, PeakBowling};
use crate::weights::{SubWeights, present_weighted_mean};

const SEASON_SHARE: f64 = 0.70;
const PEAK_SHARE: f64 = 0.30;
/// Peaks alone are a smaller sample than a season.
const PEAK_ONLY_DISCOUNT: f64 = 0.80;
/// Field actions per match worth one point above the 1.0 base.
const FIELD_ACTIONS_PER_POINT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Blend {
    SeasonAndPeak,
    SeasonOnly,
    PeakOnly,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBreakdown {
    pub bat_mean: f64,
    pub bowl_mean: f64,
    pub field_score: f64,
    pub season_score: f64,
    pub peak_score: f64,
    pub blend: Blend,
    pub sub_weights: SubWeights,
    pub band: Band,
    pub primary_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatDomain {
    /// Raw score scaled by ARM.
    pub css: f64,
    pub score: f64,
    pub eligible: bool,
    pub breakdown: Option<StatBreakdown>,
    pub peak: Option<PeakResult>,
}

/// Everything the statistical domain reads for one player.
#[derive(Debug, Clone, Copy)]
pub struct StatInputs<'a> {
    pub grades: &'a [CompetitionGrade],
    pub top_bat: &'a [PeakBatting],
    pub top_bowl: &'a [PeakBowling],
    pub cti: f64,
    pub arm: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct SeasonScores {
    bat_mean: f64,
    bowl_mean: f64,
    field_score: f64,
    season_score: f64,
}

/// Grade with the most matches; the first one listed wins a tie.
pub fn primary_grade(grades: &[CompetitionGrade]) -> Option<&CompetitionGrade> {
    let mut best = grades.first()?;
    for g in &grades[1..] {
        if g.matches > best.matches {
            best = g;
        }
    }
    Some(best)
}

fn mean_of_present(scores: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = scores.iter().flatten().copied().filter(|s| *s > 0.0).collect();
    if present.is_empty() {
        0.0
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    }
}

fn season_scores(
    primary: &CompetitionGrade,
    band: Band,
    bench: &BenchmarkTable,
    sub: SubWeights,
    constants: &EngineConstants,
) -> SeasonScores {
    let matches = primary.matches;
    if matches < constants.min_matches {
        tracing::debug!(matches, min = constants.min_matches, "too few matches to trust season stats");
        return SeasonScores::default();
    }
    let curves = bench.season.band(band);

    let mut bat_mean = 0.0;
    if primary.bat_innings >= constants.min_bat_innings {
        let rpi = ratio(primary.runs, primary.bat_innings);
        let strike_rate = ratio(primary.runs, primary.balls_faced) * 100.0;
        bat_mean = mean_of_present(&[
            score_against(rpi, &curves.rpi, Direction::HigherBetter),
            score_against(strike_rate, &curves.bat_sr, Direction::HigherBetter),
        ]);
    }

    let mut bowl_mean = 0.0;
    if primary.overs >= constants.min_overs {
        let econ = primary.econ;
        let bowl_avg = if primary.bowl_avg > 0.0 {
            primary.bowl_avg
        } else {
            ratio(econ * primary.overs, primary.wickets)
        };
        bowl_mean = mean_of_present(&[
            score_against(econ, &curves.bowl_econ, Direction::LowerBetter),
            score_against(bowl_avg, &curves.bowl_avg, Direction::LowerBetter),
        ]);
    }

    let per_match = ratio(primary.field_actions(), matches);
    let field_score = if per_match > 0.0 {
        (1.0 + per_match / FIELD_ACTIONS_PER_POINT).clamp(1.0, 5.0)
    } else {
        0.0
    };

    SeasonScores {
        bat_mean,
        bowl_mean,
        field_score,
        season_score: present_weighted_mean([
            (bat_mean, sub.bat),
            (bowl_mean, sub.bowl),
            (field_score, sub.field),
        ]),
    }
}

/// Statistical Performance Domain: season aggregates blended with peak performances.
///
/// The band comes from the player's CTI. Peaks are scored even without a season, and a
/// player with neither is ineligible (all zeros, no breakdown).
pub fn compute_stat_domain(
    inputs: StatInputs<'_>,
    tiers: &[CompetitionTier],
    bench: &BenchmarkTable,
    sub: SubWeights,
    constants: &EngineConstants,
) -> StatDomain {
    let has_season = !inputs.grades.is_empty() && inputs.cti > 0.0;
    let peak = score_peaks(inputs.top_bat, inputs.top_bowl, tiers, inputs.cti, bench, sub);
    if !has_season && !peak.has_peaks {
        return StatDomain::default();
    }

    let band = Band::from_cti(inputs.cti);
    let primary = if has_season { primary_grade(inputs.grades) } else { None };
    let season = primary
        .map(|g| season_scores(g, band, bench, sub, constants))
        .unwrap_or_default();

    let has_season_score = season.season_score > 0.0;
    let (raw, blend) = match (has_season_score, peak.has_peaks) {
        (true, true) => (
            season.season_score * SEASON_SHARE + peak.score * PEAK_SHARE,
            Blend::SeasonAndPeak,
        ),
        (true, false) => (season.season_score, Blend::SeasonOnly),
        (false, true) => (peak.score * PEAK_ONLY_DISCOUNT, Blend::PeakOnly),
        (false, false) => (0.0, Blend::None),
    };
    let arm = if inputs.arm > 0.0 { inputs.arm } else { 1.0 };

    StatDomain {
        css: round2(raw * arm),
        score: round2(raw),
        eligible: raw > 0.0,
        breakdown: Some(StatBreakdown {
            bat_mean: round2(season.bat_mean),
            bowl_mean: round2(season.bowl_mean),
            field_score: round2(season.field_score),
            season_score: round2(season.season_score),
            peak_score: peak.score,
            blend,
            sub_weights: sub,
            band,
            primary_level: primary.map(|g| g.level.clone()),
        }),
        peak: Some(peak),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Role;

    fn grade(matches: f64) -> CompetitionGrade {
        CompetitionGrade {
            level: "DIST_TURF".into(),
            matches,
            bat_innings: 10.0,
            runs: 220.0,
            balls_faced: 275.0,
            catches: 3.0,
            ..CompetitionGrade::default()
        }
    }

    fn inputs<'a>(grades: &'a [CompetitionGrade], bat: &'a [PeakBatting], cti: f64) -> StatInputs<'a> {
        StatInputs {
            grades,
            top_bat: bat,
            top_bowl: &[],
            cti,
            arm: 1.2,
        }
    }

    #[test]
    fn season_only_batter() {
        // Mid band: rpi 22 -> 3.0, SR 80 -> 3 + 5/15, field 0.3/match -> 2.0.
        let grades = [grade(10.0)];
        let c = EngineConstants::default();
        let sub = SubWeights::builtin(Role::Batter);
        let r = compute_stat_domain(inputs(&grades, &[], 0.7), &[], &BenchmarkTable::default(), sub, &c);
        let bat = (3.0 + (3.0 + 5.0 / 15.0)) / 2.0;
        let season = (bat * 0.6 + 2.0 * 0.3) / 0.9;
        assert_eq!(r.score, round2(season));
        assert_eq!(r.css, round2(season * 1.2));
        let b = r.breakdown.unwrap();
        assert_eq!(b.blend, Blend::SeasonOnly);
        assert_eq!(b.bowl_mean, 0.0);
        assert_eq!(b.field_score, 2.0);
        assert!(r.eligible);
    }

    #[test]
    fn below_min_matches_falls_back_to_peaks() {
        let grades = [grade(3.0)];
        let bat = [PeakBatting {
            runs: 35.0,
            ..PeakBatting::default()
        }];
        let c = EngineConstants::default();
        let sub = SubWeights::builtin(Role::Batter);
        let r = compute_stat_domain(inputs(&grades, &bat, 0.7), &[], &BenchmarkTable::default(), sub, &c);
        assert_eq!(r.breakdown.as_ref().unwrap().blend, Blend::PeakOnly);
        assert_eq!(r.score, round2(3.0 * 0.8));
    }

    #[test]
    fn season_and_peak_blend() {
        let grades = [grade(10.0)];
        let bat = [PeakBatting {
            runs: 35.0,
            ..PeakBatting::default()
        }];
        let c = EngineConstants::default();
        let sub = SubWeights::builtin(Role::Batter);
        let r = compute_stat_domain(inputs(&grades, &bat, 0.7), &[], &BenchmarkTable::default(), sub, &c);
        let b = r.breakdown.unwrap();
        assert_eq!(b.blend, Blend::SeasonAndPeak);
        let expected = b.season_score * 0.7 + 3.0 * 0.3;
        assert!((r.score - expected).abs() < 0.011);
    }

    #[test]
    fn nothing_is_ineligible() {
        let c = EngineConstants::default();
        let sub = SubWeights::builtin(Role::Batter);
        let r = compute_stat_domain(inputs(&[], &[], 0.0), &[], &BenchmarkTable::default(), sub, &c);
        assert_eq!(r, StatDomain::default());
        assert!(r.breakdown.is_none());
    }

    #[test]
    fn grades_without_cti_are_not_a_season() {
        let grades = [grade(10.0)];
        let c = EngineConstants::default();
        let sub = SubWeights::builtin(Role::Batter);
        let r = compute_stat_domain(inputs(&grades, &[], 0.0), &[], &BenchmarkTable::default(), sub, &c);
        assert!(!r.eligible);
    }

    #[test]
    fn bowling_average_derived_from_economy() {
        let g = CompetitionGrade {
            matches: 8.0,
            overs: 30.0,
            wickets: 10.0,
            econ: 5.0,
            ..CompetitionGrade::default()
        };
        let c = EngineConstants::default();
        let s = season_scores(&g, Band::Mid, &BenchmarkTable::default(), SubWeights::builtin(Role::Pace), &c);
        // econ 5.0 -> 3.0; avg 15.0 -> 4 + 1/6.
        let expected = (3.0 + 4.0 + 1.0 / 6.0) / 2.0;
        assert!((s.bowl_mean - expected).abs() < 1e-9);
        assert_eq!(s.field_score, 0.0);
    }

    #[test]
    fn short_batting_sample_leaves_bowling_and_fielding() {
        let g = CompetitionGrade {
            level: "DIST_TURF".into(),
            matches: 10.0,
            bat_innings: 3.0,
            runs: 90.0,
            balls_faced: 80.0,
            overs: 30.0,
            wickets: 10.0,
            econ: 5.0,
            catches: 3.0,
            ..CompetitionGrade::default()
        };
        let grades = [g];
        let c = EngineConstants::default();
        let sub = SubWeights::builtin(Role::Pace);
        let r = compute_stat_domain(inputs(&grades, &[], 0.7), &[], &BenchmarkTable::default(), sub, &c);
        let b = r.breakdown.unwrap();
        assert_eq!(b.bat_mean, 0.0);
        // Mid band: econ 5.0 -> 3.0, avg 15.0 -> 4 + 1/6; field 0.3/match -> 2.0.
        let bowl = (3.0 + 4.0 + 1.0 / 6.0) / 2.0;
        assert_eq!(b.bowl_mean, round2(bowl));
        assert_eq!(b.field_score, 2.0);
        let season = (bowl * sub.bowl + 2.0 * sub.field) / (sub.bowl + sub.field);
        assert_eq!(r.score, round2(season));
        assert!(r.eligible);
    }

    #[test]
    fn short_bowling_sample_leaves_batting_and_fielding() {
        let mut g = grade(10.0);
        g.overs = 12.0;
        g.wickets = 6.0;
        g.econ = 4.0;
        let grades = [g];
        let c = EngineConstants::default();
        let sub = SubWeights::builtin(Role::Allrounder);
        let r = compute_stat_domain(inputs(&grades, &[], 0.7), &[], &BenchmarkTable::default(), sub, &c);
        let b = r.breakdown.unwrap();
        assert_eq!(b.bowl_mean, 0.0);
        let bat = (3.0 + (3.0 + 5.0 / 15.0)) / 2.0;
        assert_eq!(b.bat_mean, round2(bat));
        let season = (bat * sub.bat + 2.0 * sub.field) / (sub.bat + sub.field);
        assert_eq!(r.score, round2(season));
    }

    #[test]
    fn zero_thresholds_trust_any_sample() {
        let mut g = grade(10.0);
        g.bat_innings = 1.0;
        g.runs = 22.0;
        g.balls_faced = 27.5;
        let grades = [g];
        let mut c = EngineConstants::default();
        c.min_bat_innings = 0.0;
        let sub = SubWeights::builtin(Role::Batter);
        let r = compute_stat_domain(inputs(&grades, &[], 0.7), &[], &BenchmarkTable::default(), sub, &c);
        assert!(r.breakdown.unwrap().bat_mean > 0.0);
    }

    #[test]
    fn primary_grade_prefers_first_on_tie() {
        let mut a = grade(10.0);
        a.level = "A".into();
        let mut b = grade(10.0);
        b.level = "B".into();
        let grades = [a, b];
        assert_eq!(primary_grade(&grades).unwrap().level, "A");
    }
}
