//! Run configuration – reads `rover.toml`.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use rover_runtime::ControlLoopConfig;
use rover_types::{LaneMode, ModalitySet};

/// Persisted run configuration.
///
/// Every field has a default, so an empty file (or no file at all) yields
/// the stock tuning: a 1000-cell grid, 5-cycle heading settling, 35-cycle
/// position acquisition, and a 0.875 forward-extent ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Which modalities this run enables.
    #[serde(default)]
    pub modalities: ModalitySet,

    /// Side length of the square occupancy grid, in cells.
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,

    /// Heading settling window K₁, in cycles.
    #[serde(default = "default_heading_warmup")]
    pub heading_warmup_cycles: u32,

    /// Position acquisition window K₂, in cycles.
    #[serde(default = "default_position_warmup")]
    pub position_warmup_cycles: u32,

    /// Pause per heading-settling cycle, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub heading_settle_ms: u64,

    /// Usable forward extent of the grid, as a fraction of its size.
    #[serde(default = "default_forward_extent_ratio")]
    pub forward_extent_ratio: f64,

    /// Lane extraction mode.
    #[serde(default)]
    pub lane_mode: LaneMode,

    /// Lane projection scale (grid cells per image unit).
    #[serde(default = "default_lane_scale")]
    pub lane_scale: u32,

    /// Optional bound on total cycles for bench runs.
    #[serde(default)]
    pub max_cycles: Option<u64>,
}

fn default_grid_size() -> usize {
    1000
}
fn default_heading_warmup() -> u32 {
    5
}
fn default_position_warmup() -> u32 {
    35
}
fn default_settle_ms() -> u64 {
    200
}
fn default_forward_extent_ratio() -> f64 {
    0.875
}
fn default_lane_scale() -> u32 {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            modalities: ModalitySet::default(),
            grid_size: default_grid_size(),
            heading_warmup_cycles: default_heading_warmup(),
            position_warmup_cycles: default_position_warmup(),
            heading_settle_ms: default_settle_ms(),
            forward_extent_ratio: default_forward_extent_ratio(),
            lane_mode: LaneMode::default(),
            lane_scale: default_lane_scale(),
            max_cycles: None,
        }
    }
}

impl RunConfig {
    /// Translate into the runtime's loop configuration.
    pub fn to_loop_config(&self) -> ControlLoopConfig {
        ControlLoopConfig {
            modalities: self.modalities,
            grid_size: self.grid_size,
            heading_warmup_cycles: self.heading_warmup_cycles,
            position_warmup_cycles: self.position_warmup_cycles,
            heading_settle_delay: Duration::from_millis(self.heading_settle_ms),
            forward_extent_ratio: self.forward_extent_ratio,
            extent_reset_on_clear: true,
            lane_mode: self.lane_mode,
            lane_scale: self.lane_scale,
            max_cycles: self.max_cycles,
        }
    }
}

/// Return the config path: `ROVER_CONFIG` if set, else `./rover.toml`.
pub fn config_path() -> PathBuf {
    std::env::var("ROVER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("rover.toml"))
}

/// Load the config from disk. Returns `None` if the file does not exist.
pub fn load() -> Result<Option<RunConfig>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<RunConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: RunConfig =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `ROVER_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `ROVER_GRID_SIZE` | `grid_size` |
/// | `ROVER_MAX_CYCLES` | `max_cycles` |
/// | `ROVER_LANE_SCALE` | `lane_scale` |
pub fn apply_env_overrides(cfg: &mut RunConfig) {
    if let Ok(v) = std::env::var("ROVER_GRID_SIZE")
        && let Ok(size) = v.parse::<usize>()
    {
        cfg.grid_size = size;
    }
    if let Ok(v) = std::env::var("ROVER_MAX_CYCLES")
        && let Ok(cycles) = v.parse::<u64>()
    {
        cfg.max_cycles = Some(cycles);
    }
    if let Ok(v) = std::env::var("ROVER_LANE_SCALE")
        && let Ok(scale) = v.parse::<u32>()
    {
        cfg.lane_scale = scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_behavior() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.grid_size, 1000);
        assert_eq!(cfg.heading_warmup_cycles, 5);
        assert_eq!(cfg.position_warmup_cycles, 35);
        assert_eq!(cfg.heading_settle_ms, 200);
        assert!((cfg.forward_extent_ratio - 0.875).abs() < 1e-9);
        assert_eq!(cfg.lane_mode, LaneMode::Color);
        assert_eq!(cfg.max_cycles, None);
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let cfg: RunConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, RunConfig::default());
    }

    #[test]
    fn partial_toml_overrides_named_fields_only() {
        let cfg: RunConfig = toml::from_str(
            r#"
            grid_size = 500
            lane_mode = "both"

            [modalities]
            inertial_heading = true
            range_scan = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.grid_size, 500);
        assert_eq!(cfg.lane_mode, LaneMode::Both);
        assert!(cfg.modalities.inertial_heading);
        assert!(cfg.modalities.range_scan);
        assert!(!cfg.modalities.visual_lane);
        // Untouched fields keep their defaults.
        assert_eq!(cfg.heading_warmup_cycles, 5);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("rover.toml");
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("rover.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "max_cycles = 40").expect("write");

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.max_cycles, Some(40));
    }

    #[test]
    fn to_loop_config_carries_every_field() {
        let cfg = RunConfig {
            grid_size: 250,
            heading_settle_ms: 0,
            max_cycles: Some(10),
            ..Default::default()
        };
        let loop_cfg = cfg.to_loop_config();
        assert_eq!(loop_cfg.grid_size, 250);
        assert_eq!(loop_cfg.heading_settle_delay, Duration::ZERO);
        assert_eq!(loop_cfg.max_cycles, Some(10));
    }

    #[test]
    fn apply_env_overrides_changes_grid_size() {
        // SAFETY: single-threaded test; no other thread reads this env-var.
        unsafe { std::env::set_var("ROVER_GRID_SIZE", "256") };
        let mut cfg = RunConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.grid_size, 256);
        unsafe { std::env::remove_var("ROVER_GRID_SIZE") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_value() {
        // SAFETY: single-threaded test; no other thread reads this env-var.
        unsafe { std::env::set_var("ROVER_MAX_CYCLES", "not-a-number") };
        let mut cfg = RunConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.max_cycles, None);
        unsafe { std::env::remove_var("ROVER_MAX_CYCLES") };
    }
}
