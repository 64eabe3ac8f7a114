use serde::{Deserialize, Serialize};

use crate::competition::Band;

/// Five thresholds mapping a stat onto the 1..=5 scale.
pub type Curve = [f64; 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

/// Linear interpolation of `value` against a 5-point curve.
///
/// `None` when the value is zero or not finite: a missing stat is absent, not a 1.
pub fn score_against(value: f64, curve: &Curve, direction: Direction) -> Option<f64> {
    if value == 0.0 || !value.is_finite() {
        return None;
    }
    let b = curve;
    match direction {
        Direction::HigherBetter => {
            if value <= b[0] {
                return Some(1.0);
            }
            if value >= b[4] {
                return Some(5.0);
            }
            for i in 0..4 {
                if value >= b[i] && value < b[i + 1] {
                    let pct = (value - b[i]) / (b[i + 1] - b[i]);
                    return Some((i + 1) as f64 + pct);
                }
            }
        }
        Direction::LowerBetter => {
            if value >= b[0] {
                return Some(1.0);
            }
            if value <= b[4] {
                return Some(5.0);
            }
            for i in 0..4 {
                if value <= b[i] && value > b[i + 1] {
                    let pct = (b[i] - value) / (b[i] - b[i + 1]);
                    return Some((i + 1) as f64 + pct);
                }
            }
        }
    }
    Some(3.0)
}

fn is_ordered(curve: &Curve, direction: Direction) -> bool {
    curve.iter().all(|v| v.is_finite())
        && curve.windows(2).all(|w| match direction {
            Direction::HigherBetter => w[0] < w[1],
            Direction::LowerBetter => w[0] > w[1],
        })
}

fn sanitize_curve(curve: &mut Curve, fallback: &Curve, direction: Direction, name: &str) {
    if !is_ordered(curve, direction) {
        tracing::warn!(metric = name, ?curve, "benchmark curve is not monotonic, using built-in curve");
        *curve = *fallback;
    }
}

/// Season benchmark curves for one difficulty band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonCurves {
    pub rpi: Curve,
    #[serde(alias = "batSR")]
    pub bat_sr: Curve,
    #[serde(alias = "bowlEcon")]
    pub bowl_econ: Curve,
    #[serde(alias = "bowlAvg")]
    pub bowl_avg: Curve,
}

impl SeasonCurves {
    fn sanitize(&mut self, fallback: &SeasonCurves) {
        sanitize_curve(&mut self.rpi, &fallback.rpi, Direction::HigherBetter, "rpi");
        sanitize_curve(&mut self.bat_sr, &fallback.bat_sr, Direction::HigherBetter, "bat_sr");
        sanitize_curve(&mut self.bowl_econ, &fallback.bowl_econ, Direction::LowerBetter, "bowl_econ");
        sanitize_curve(&mut self.bowl_avg, &fallback.bowl_avg, Direction::LowerBetter, "bowl_avg");
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonBands {
    pub low: SeasonCurves,
    pub mid: SeasonCurves,
    pub high: SeasonCurves,
    pub elite: SeasonCurves,
    pub top: SeasonCurves,
}

impl Default for SeasonBands {
    fn default() -> Self {
        Self {
            low: SeasonCurves {
                rpi: [6.0, 10.0, 16.0, 24.0, 35.0],
                bat_sr: [40.0, 55.0, 70.0, 85.0, 100.0],
                bowl_econ: [7.5, 6.5, 5.5, 4.5, 3.5],
                bowl_avg: [40.0, 32.0, 25.0, 18.0, 12.0],
            },
            mid: SeasonCurves {
                rpi: [8.0, 14.0, 22.0, 32.0, 45.0],
                bat_sr: [45.0, 60.0, 75.0, 90.0, 110.0],
                bowl_econ: [7.0, 6.0, 5.0, 4.0, 3.0],
                bowl_avg: [35.0, 28.0, 22.0, 16.0, 10.0],
            },
            high: SeasonCurves {
                rpi: [10.0, 18.0, 28.0, 40.0, 55.0],
                bat_sr: [50.0, 65.0, 80.0, 95.0, 115.0],
                bowl_econ: [6.5, 5.5, 4.5, 3.5, 2.8],
                bowl_avg: [32.0, 25.0, 19.0, 14.0, 9.0],
            },
            elite: SeasonCurves {
                rpi: [14.0, 24.0, 36.0, 50.0, 65.0],
                bat_sr: [55.0, 70.0, 85.0, 100.0, 120.0],
                bowl_econ: [6.0, 5.0, 4.0, 3.2, 2.5],
                bowl_avg: [28.0, 22.0, 17.0, 12.0, 8.0],
            },
            top: SeasonCurves {
                rpi: [18.0, 30.0, 44.0, 58.0, 75.0],
                bat_sr: [60.0, 75.0, 90.0, 105.0, 125.0],
                bowl_econ: [5.5, 4.5, 3.5, 2.8, 2.2],
                bowl_avg: [25.0, 20.0, 15.0, 10.0, 7.0],
            },
        }
    }
}

impl SeasonBands {
    pub fn band(&self, band: Band) -> &SeasonCurves {
        match band {
            Band::Low => &self.low,
            Band::Mid => &self.mid,
            Band::High => &self.high,
            Band::Elite => &self.elite,
            Band::Top => &self.top,
        }
    }

    fn band_mut(&mut self, band: Band) -> &mut SeasonCurves {
        match band {
            Band::Low => &mut self.low,
            Band::Mid => &mut self.mid,
            Band::High => &mut self.high,
            Band::Elite => &mut self.elite,
            Band::Top => &mut self.top,
        }
    }
}

/// Peak-innings run curves per band. Harder competitions need fewer runs for the same score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakRunBands {
    pub low: Curve,
    pub mid: Curve,
    pub high: Curve,
    pub elite: Curve,
    pub top: Curve,
}

impl Default for PeakRunBands {
    fn default() -> Self {
        Self {
            low: [15.0, 25.0, 40.0, 60.0, 85.0],
            mid: [12.0, 22.0, 35.0, 55.0, 80.0],
            high: [10.0, 18.0, 30.0, 50.0, 75.0],
            elite: [8.0, 15.0, 25.0, 45.0, 70.0],
            top: [6.0, 12.0, 22.0, 40.0, 65.0],
        }
    }
}

impl PeakRunBands {
    pub fn band(&self, band: Band) -> &Curve {
        match band {
            Band::Low => &self.low,
            Band::Mid => &self.mid,
            Band::High => &self.high,
            Band::Elite => &self.elite,
            Band::Top => &self.top,
        }
    }

    fn band_mut(&mut self, band: Band) -> &mut Curve {
        match band {
            Band::Low => &mut self.low,
            Band::Mid => &mut self.mid,
            Band::High => &mut self.high,
            Band::Elite => &mut self.elite,
            Band::Top => &mut self.top,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkTable {
    #[serde(alias = "statBenchmarks")]
    pub season: SeasonBands,
    #[serde(alias = "batRuns")]
    pub peak_runs: PeakRunBands,
    #[serde(alias = "bowlWkts")]
    pub peak_wickets: Curve,
}

impl Default for BenchmarkTable {
    fn default() -> Self {
        Self {
            season: SeasonBands::default(),
            peak_runs: PeakRunBands::default(),
            peak_wickets: [0.0, 1.0, 2.0, 3.0, 4.0],
        }
    }
}

impl BenchmarkTable {
    /// Replace any curve that isn't strictly ordered in its scoring direction with the built-in one.
    pub fn sanitize(&mut self) {
        let fallback = BenchmarkTable::default();
        for band in Band::ALL {
            self.season
                .band_mut(band)
                .sanitize(fallback.season.band(band));
            sanitize_curve(
                self.peak_runs.band_mut(band),
                fallback.peak_runs.band(band),
                Direction::HigherBetter,
                "peak_runs",
            );
        }
        // The wicket curve starts at zero, which still orders strictly.
        sanitize_curve(
            &mut self.peak_wickets,
            &fallback.peak_wickets,
            Direction::HigherBetter,
            "peak_wickets",
        );
    }
}
