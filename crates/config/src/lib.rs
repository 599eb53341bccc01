//! Configuration models and loaders for the aircraft sizing workspace.
//!
//! Two kinds of files live here: the *sizing catalog* (empirical lookup tables
//! keyed by a human-chosen label) and *design cases* (one aircraft's mission
//! and performance requirements in pilot-friendly units).

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Cruise and loiter specific fuel consumption for one engine family.
///
/// Jet entries are in 1/hr; propeller entries are in lb/(hr·bhp).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SfcEntry {
    pub cruise: f64,
    pub loiter: f64,
}

/// Empty-weight regression coefficients, `We/W0 = A · W0^C`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct EmptyWeightEntry {
    #[serde(alias = "A")]
    pub a: f64,
    #[serde(alias = "C")]
    pub c: f64,
}

/// Empirical lookup tables used by the weight estimate.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SizingCatalog {
    #[serde(default)]
    pub jet_sfc: BTreeMap<String, SfcEntry>,
    #[serde(default)]
    pub prop_sfc: BTreeMap<String, SfcEntry>,
    #[serde(default)]
    pub k_ld: BTreeMap<String, f64>,
    #[serde(default)]
    pub empty_weight: BTreeMap<String, EmptyWeightEntry>,
}

impl SizingCatalog {
    pub fn jet_sfc(&self, key: &str) -> Result<SfcEntry, ConfigError> {
        lookup("jet_sfc", &self.jet_sfc, key).copied()
    }

    pub fn prop_sfc(&self, key: &str) -> Result<SfcEntry, ConfigError> {
        lookup("prop_sfc", &self.prop_sfc, key).copied()
    }

    pub fn k_ld(&self, key: &str) -> Result<f64, ConfigError> {
        lookup("k_ld", &self.k_ld, key).copied()
    }

    pub fn empty_weight(&self, key: &str) -> Result<EmptyWeightEntry, ConfigError> {
        lookup("empty_weight", &self.empty_weight, key).copied()
    }

    /// Table names paired with their keys, in a stable order.
    pub fn tables(&self) -> Vec<(&'static str, Vec<&str>)> {
        vec![
            ("jet_sfc", self.jet_sfc.keys().map(String::as_str).collect()),
            ("prop_sfc", self.prop_sfc.keys().map(String::as_str).collect()),
            ("k_ld", self.k_ld.keys().map(String::as_str).collect()),
            (
                "empty_weight",
                self.empty_weight.keys().map(String::as_str).collect(),
            ),
        ]
    }
}

/// Case-insensitive key lookup; the error lists what would have matched.
fn lookup<'a, T>(
    table: &'static str,
    entries: &'a BTreeMap<String, T>,
    key: &str,
) -> Result<&'a T, ConfigError> {
    let upper = key.trim().to_uppercase();
    entries
        .iter()
        .find(|(name, _)| name.to_uppercase() == upper)
        .map(|(_, value)| value)
        .ok_or_else(|| ConfigError::UnknownKey {
            table,
            key: key.to_string(),
            available: key_list(entries),
        })
}

fn key_list<T>(entries: &BTreeMap<String, T>) -> String {
    let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
    keys.join(", ")
}

/// Engine family of the design case.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineConfig {
    Jet,
    #[serde(alias = "propeller")]
    Prop,
}

/// One mission leg as written in a case file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentConfig {
    Takeoff,
    Climb,
    Cruise { range_nmi: f64 },
    Loiter { duration_hr: f64 },
    #[serde(alias = "land")]
    Landing,
}

/// Inputs for the fuel-fraction weight estimate.
#[derive(Debug, Deserialize, Clone)]
pub struct MissionConfig {
    pub engine: EngineConfig,
    /// Key into `jet_sfc` or `prop_sfc`, depending on `engine`.
    pub engine_key: String,
    pub cruise_speed_kt: f64,
    pub loiter_speed_kt: f64,
    pub aspect_ratio: f64,
    /// Key into `k_ld`.
    pub configuration: String,
    pub wetted_area_ratio: f64,
    /// Key into `empty_weight`.
    pub aircraft_type: String,
    #[serde(default)]
    pub variable_sweep: bool,
    pub crew_weight_lb: f64,
    pub payload_weight_lb: f64,
    pub initial_takeoff_weight_lb: f64,
    pub segments: Vec<SegmentConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StallConfig {
    pub speed_kt: f64,
    #[serde(default)]
    pub altitude_ft: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TakeoffConfig {
    /// Takeoff-distance criterion name (e.g. `prop_50ft`, `TO_Dist_Jet_2eng_BFL`).
    pub criterion: String,
    pub distance_ft: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LandingConfig {
    pub distance_ft: f64,
    /// Approach category used to pick the obstacle-clearance allowance.
    #[serde(default)]
    pub approach: Option<String>,
    /// Explicit obstacle-clearance allowance; overrides `approach`.
    #[serde(default)]
    pub obstacle_allowance_ft: Option<f64>,
}

/// Speed at altitude, shared by cruise, loiter and ceiling requirements.
#[derive(Debug, Deserialize, Clone)]
pub struct SpeedAtAltitudeConfig {
    pub altitude_ft: f64,
    pub speed_kt: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClimbConfig {
    /// Climb gradient (vertical / horizontal speed).
    pub gradient: f64,
    pub speed_kt: f64,
    #[serde(default)]
    pub altitude_ft: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InstantTurnConfig {
    pub altitude_ft: f64,
    pub speed_kt: f64,
    pub turn_rate_deg_s: f64,
    pub cl_max_combat: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SustainedTurnConfig {
    pub altitude_ft: f64,
    pub speed_kt: f64,
    pub load_factor: f64,
}

/// Performance requirements for the matching chart.
#[derive(Debug, Deserialize, Clone)]
pub struct ConstraintsConfig {
    #[serde(default)]
    pub delta_t_k: f64,
    #[serde(default)]
    pub runway_altitude_ft: f64,
    /// Airfoil maximum lift coefficient; takes precedence over `flap`.
    #[serde(default)]
    pub airfoil_cl_max: Option<f64>,
    /// Flap type used to pick a typical airfoil Clmax.
    #[serde(default)]
    pub flap: Option<String>,
    #[serde(default)]
    pub sweep_deg: f64,
    pub aspect_ratio: f64,
    pub oswald_efficiency: f64,
    pub cd0: f64,
    #[serde(default)]
    pub stall: Option<StallConfig>,
    #[serde(default)]
    pub takeoff: Option<TakeoffConfig>,
    #[serde(default)]
    pub landing: Option<LandingConfig>,
    #[serde(default)]
    pub cruise: Option<SpeedAtAltitudeConfig>,
    #[serde(default)]
    pub loiter: Option<SpeedAtAltitudeConfig>,
    #[serde(default)]
    pub climb: Option<ClimbConfig>,
    #[serde(default)]
    pub ceiling: Option<SpeedAtAltitudeConfig>,
    #[serde(default)]
    pub instant_turn: Option<InstantTurnConfig>,
    #[serde(default)]
    pub sustained_turn: Option<SustainedTurnConfig>,
}

/// Matching-chart search box and constraint selection.
#[derive(Debug, Deserialize, Clone)]
pub struct OptimizerConfig {
    #[serde(default = "default_bounds")]
    pub wing_loading_bounds: [f64; 2],
    #[serde(default = "default_bounds")]
    pub power_loading_bounds: [f64; 2],
    /// Constraint names left on the chart but not enforced by the optimizer.
    #[serde(default)]
    pub inactive: Vec<String>,
    #[serde(default)]
    pub max_iterations: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            wing_loading_bounds: default_bounds(),
            power_loading_bounds: default_bounds(),
            inactive: Vec::new(),
            max_iterations: None,
        }
    }
}

fn default_bounds() -> [f64; 2] {
    [1.0, 50.0]
}

/// One aircraft sizing study.
#[derive(Debug, Deserialize, Clone)]
pub struct DesignCase {
    pub name: String,
    #[serde(default)]
    pub mission: Option<MissionConfig>,
    #[serde(default)]
    pub constraints: Option<ConstraintsConfig>,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("'{key}' not found in {table} (available: {available})")]
    UnknownKey {
        table: &'static str,
        key: String,
        available: String,
    },
}

/// Load a sizing catalog from a TOML or YAML file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<SizingCatalog, ConfigError> {
    load_record(path)
}

/// Load a single design case from a TOML or YAML file.
pub fn load_case<P: AsRef<Path>>(path: P) -> Result<DesignCase, ConfigError> {
    load_record(path)
}

/// Load every `*.toml` design case in a directory, or the single file given.
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<DesignCase>, ConfigError> {
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else {
        Ok(vec![load_record(path)?])
    }
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"
[jet_sfc."High-bypass turbofan"]
cruise = 0.5
loiter = 0.4

[prop_sfc."Turboprop"]
cruise = 0.5
loiter = 0.6

[k_ld]
"Civil jet" = 15.5

[empty_weight."Jet transport"]
A = 1.02
C = -0.06
"#;

    #[test]
    fn catalog_lookup_is_case_insensitive() {
        let catalog: SizingCatalog = toml::from_str(CATALOG).unwrap();
        assert_eq!(catalog.k_ld("civil JET").unwrap(), 15.5);
        let ew = catalog.empty_weight("jet transport").unwrap();
        assert_eq!(ew.a, 1.02);
        assert_eq!(ew.c, -0.06);
    }

    #[test]
    fn unknown_key_lists_alternatives() {
        let catalog: SizingCatalog = toml::from_str(CATALOG).unwrap();
        let err = catalog.prop_sfc("Piston").unwrap_err();
        match err {
            ConfigError::UnknownKey {
                table, available, ..
            } => {
                assert_eq!(table, "prop_sfc");
                assert_eq!(available, "Turboprop");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mission_segments_parse_from_tagged_tables() {
        let yaml = "\
- kind: takeoff
- kind: cruise
  range_nmi: 1500
- kind: loiter
  duration_hr: 0.5
- kind: land
";
        let segments: Vec<SegmentConfig> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[1], SegmentConfig::Cruise { range_nmi: 1500.0 });
        assert_eq!(segments[3], SegmentConfig::Landing);
    }

    #[test]
    fn case_directory_loads_sorted_toml_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b", "a"] {
            let mut file = File::create(dir.path().join(format!("{name}.toml"))).unwrap();
            writeln!(file, "name = \"case {name}\"").unwrap();
        }
        let cases = load_cases(dir.path()).unwrap();
        let names: Vec<_> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["case a", "case b"]);
        assert_eq!(cases[0].optimizer.wing_loading_bounds, [1.0, 50.0]);
    }
}
