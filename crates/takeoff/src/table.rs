//! Takeoff chart data: one TOP column followed by seven distance criteria.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::TakeoffError;

const COLUMNS: usize = 8;
/// Distances are tabulated in thousands of feet.
const DISTANCE_SCALE_FT: f64 = 1_000.0;

/// Takeoff-distance criterion, in file column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TakeoffCriterion {
    PropGroundRoll,
    Prop50Ft,
    JetGroundRoll,
    Jet50Ft,
    JetBfl2Engine,
    JetBfl3Engine,
    JetBfl4Engine,
}

impl TakeoffCriterion {
    pub const ALL: [TakeoffCriterion; 7] = [
        TakeoffCriterion::PropGroundRoll,
        TakeoffCriterion::Prop50Ft,
        TakeoffCriterion::JetGroundRoll,
        TakeoffCriterion::Jet50Ft,
        TakeoffCriterion::JetBfl2Engine,
        TakeoffCriterion::JetBfl3Engine,
        TakeoffCriterion::JetBfl4Engine,
    ];

    /// Index among the distance columns (0-based, TOP excluded).
    pub fn index(self) -> usize {
        match self {
            TakeoffCriterion::PropGroundRoll => 0,
            TakeoffCriterion::Prop50Ft => 1,
            TakeoffCriterion::JetGroundRoll => 2,
            TakeoffCriterion::Jet50Ft => 3,
            TakeoffCriterion::JetBfl2Engine => 4,
            TakeoffCriterion::JetBfl3Engine => 5,
            TakeoffCriterion::JetBfl4Engine => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TakeoffCriterion::PropGroundRoll => "prop_ground_roll",
            TakeoffCriterion::Prop50Ft => "prop_50ft",
            TakeoffCriterion::JetGroundRoll => "jet_ground_roll",
            TakeoffCriterion::Jet50Ft => "jet_50ft",
            TakeoffCriterion::JetBfl2Engine => "jet_bfl_2_engine",
            TakeoffCriterion::JetBfl3Engine => "jet_bfl_3_engine",
            TakeoffCriterion::JetBfl4Engine => "jet_bfl_4_engine",
        }
    }

    /// Column label used in the chart spreadsheet.
    pub fn label(self) -> &'static str {
        match self {
            TakeoffCriterion::PropGroundRoll => "TO_Dist_Prop_GroundRoll",
            TakeoffCriterion::Prop50Ft => "TO_Dist_Prop_50ft",
            TakeoffCriterion::JetGroundRoll => "TO_Dist_Jet_GroundRoll",
            TakeoffCriterion::Jet50Ft => "TO_Dist_Jet_50ft",
            TakeoffCriterion::JetBfl2Engine => "TO_Dist_Jet_2eng_BFL",
            TakeoffCriterion::JetBfl3Engine => "TO_Dist_Jet_3eng_BFL",
            TakeoffCriterion::JetBfl4Engine => "TO_Dist_Jet_4eng_BFL",
        }
    }
}

impl fmt::Display for TakeoffCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TakeoffCriterion {
    type Err = TakeoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TakeoffCriterion::ALL
            .into_iter()
            .find(|c| {
                c.name().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| TakeoffError::UnknownCriterion(s.to_string()))
    }
}

/// One chart row. Any cell may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct TakeoffSample {
    pub top: Option<f64>,
    /// Distances in feet, indexed by [`TakeoffCriterion::index`].
    pub distances_ft: [Option<f64>; 7],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TakeoffDataTable {
    pub samples: Vec<TakeoffSample>,
}

impl TakeoffDataTable {
    pub fn new(samples: Vec<TakeoffSample>) -> Self {
        Self { samples }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TakeoffError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TakeoffError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, TakeoffError> {
        let mut samples = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            if record.len() != COLUMNS {
                warn!(
                    line,
                    fields = record.len(),
                    "skipping takeoff row with wrong column count"
                );
                continue;
            }
            let mut cells = [None; COLUMNS];
            for (column, field) in record.iter().enumerate() {
                cells[column] = parse_cell(field, line, column)?;
            }
            let mut distances_ft = [None; 7];
            for (slot, cell) in distances_ft.iter_mut().zip(&cells[1..]) {
                *slot = cell.map(|d| d * DISTANCE_SCALE_FT);
            }
            samples.push(TakeoffSample {
                top: cells[0],
                distances_ft,
            });
        }
        Ok(Self { samples })
    }

    /// `(distance_ft, top)` pairs where both cells are present.
    pub fn pairs(&self, criterion: TakeoffCriterion) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .filter_map(|s| Some((s.distances_ft[criterion.index()]?, s.top?)))
            .collect()
    }
}

fn parse_cell(field: &str, line: u64, column: usize) -> Result<Option<f64>, TakeoffError> {
    if field.is_empty() || field.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let value: f64 = field.parse().map_err(|_| TakeoffError::Parse {
        line,
        column,
        value: field.to_string(),
    })?;
    Ok(value.is_finite().then_some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
TOP,PGR,P50,JGR,J50,B2,B3,B4
50,0.3,0.5,,,,,
100,0.6,1.0,1.8,2.6,,,
150,0.95,nan,2.7,3.9,5.6,5.3,5.1
this row,is,short
200,1.3,2.1,3.6,5.2,7.5,7.1,6.8
";

    #[test]
    fn criteria_parse_from_labels_and_names() {
        assert_eq!(
            "TO_Dist_Jet_2eng_BFL".parse::<TakeoffCriterion>().unwrap(),
            TakeoffCriterion::JetBfl2Engine
        );
        assert_eq!(
            "prop_50FT".parse::<TakeoffCriterion>().unwrap(),
            TakeoffCriterion::Prop50Ft
        );
        assert!("glider_tow".parse::<TakeoffCriterion>().is_err());
    }

    #[test]
    fn missing_cells_and_short_rows_are_dropped() {
        let table = TakeoffDataTable::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.samples.len(), 4);

        let prop_50 = table.pairs(TakeoffCriterion::Prop50Ft);
        let expected = [(500.0, 50.0), (1_000.0, 100.0), (2_100.0, 200.0)];
        assert_eq!(prop_50.len(), expected.len());
        for ((d, top), (d_exp, top_exp)) in prop_50.iter().zip(expected) {
            assert!((d - d_exp).abs() < 1e-9);
            assert_eq!(*top, top_exp);
        }

        let bfl = table.pairs(TakeoffCriterion::JetBfl4Engine);
        assert_eq!(bfl.len(), 2);
        assert!((bfl[0].0 - 5_100.0).abs() < 1e-9);
    }

    #[test]
    fn garbage_cell_is_reported_with_position() {
        let csv = "TOP,a,b,c,d,e,f,g\n10,1,2,3,x4,5,6,7\n";
        let err = TakeoffDataTable::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            TakeoffError::Parse { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, 4);
                assert_eq!(value, "x4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
