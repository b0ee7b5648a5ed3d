//! Configuration surface for the view-splitting pipeline.
//!
//! Every tunable the pipeline consults lives here: the dedup thresholds,
//! the proximity-clustering radius, the zone band positions, the
//! per-zone filter bound table, and the expansion ratios. All of it is
//! serde-backed so a drawing style can override any value from a TOML or
//! JSON file without touching code.

use crate::core::validation::{
    validate_finite, validate_non_negative, validate_positive, validate_range, validate_unit_ratio,
};
use crate::core::{SplitError, SplitResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometric bounds applied by the engineering filter in one zone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZoneBounds {
    /// Minimum region area as a fraction of the image area.
    pub min_area_ratio: f32,
    /// Maximum region area as a fraction of the image area.
    pub max_area_ratio: f32,
    /// Maximum aspect ratio (long side over short side).
    pub max_aspect_ratio: f32,
    /// Minimum compactness (4*pi*area / perimeter^2).
    pub min_compactness: f32,
}

impl ZoneBounds {
    fn validate(&self, zone_name: &str) -> SplitResult<()> {
        validate_unit_ratio(self.min_area_ratio, &format!("{zone_name}.min_area_ratio"))?;
        validate_unit_ratio(self.max_area_ratio, &format!("{zone_name}.max_area_ratio"))?;
        if self.min_area_ratio >= self.max_area_ratio {
            return Err(SplitError::config_error(format!(
                "{zone_name}: min_area_ratio ({}) must be below max_area_ratio ({})",
                self.min_area_ratio, self.max_area_ratio
            )));
        }
        validate_finite(self.max_aspect_ratio, &format!("{zone_name}.max_aspect_ratio"))?;
        validate_range(
            self.max_aspect_ratio,
            1.0,
            f32::MAX,
            &format!("{zone_name}.max_aspect_ratio"),
        )?;
        validate_unit_ratio(self.min_compactness, &format!("{zone_name}.min_compactness"))
    }
}

/// The per-zone bound table consulted by the engineering filter.
///
/// The bottom protected band uses the strictest row to prevent fragment
/// explosion in the title-block area; other informational zones tolerate
/// extreme aspect ratios (text lines); the main body sits in between.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilterBoundsTable {
    /// Bounds for the strict bottom protected band.
    #[serde(default = "FilterBoundsTable::default_bottom_protected")]
    pub bottom_protected: ZoneBounds,
    /// Bounds for non-protected bottom/right informational zones.
    #[serde(default = "FilterBoundsTable::default_info")]
    pub info: ZoneBounds,
    /// Bounds for the main drawing body.
    #[serde(default = "FilterBoundsTable::default_main")]
    pub main: ZoneBounds,
}

impl FilterBoundsTable {
    fn default_bottom_protected() -> ZoneBounds {
        ZoneBounds {
            min_area_ratio: 0.008,
            max_area_ratio: 0.5,
            max_aspect_ratio: 8.0,
            min_compactness: 0.1,
        }
    }

    fn default_info() -> ZoneBounds {
        ZoneBounds {
            min_area_ratio: 0.002,
            max_area_ratio: 0.3,
            max_aspect_ratio: 25.0,
            min_compactness: 0.02,
        }
    }

    fn default_main() -> ZoneBounds {
        ZoneBounds {
            min_area_ratio: 0.003,
            max_area_ratio: 0.7,
            max_aspect_ratio: 15.0,
            min_compactness: 0.05,
        }
    }

    fn validate(&self) -> SplitResult<()> {
        self.bottom_protected.validate("bounds.bottom_protected")?;
        self.info.validate("bounds.info")?;
        self.main.validate("bounds.main")
    }
}

impl Default for FilterBoundsTable {
    fn default() -> Self {
        Self {
            bottom_protected: Self::default_bottom_protected(),
            info: Self::default_info(),
            main: Self::default_main(),
        }
    }
}

/// Zone band positions, as fractions of image height/width.
///
/// The merge-phase band (0.75) and the filter-phase band (0.70) are
/// intentionally different values; downstream tests pin both. Unifying
/// them changes which fragments the info-region detector sees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZoneThresholds {
    /// Bottom/right band used during dedup/merge classification.
    #[serde(default = "ZoneThresholds::default_merge_band")]
    pub merge_band: f32,
    /// Looser bottom/right band used during filtering and text refinement.
    #[serde(default = "ZoneThresholds::default_filter_band")]
    pub filter_band: f32,
    /// Strict band marking the protected title-block area.
    #[serde(default = "ZoneThresholds::default_protected_band")]
    pub protected_band: f32,
    /// Lower bound of the info-region area window (fraction of image area).
    #[serde(default = "ZoneThresholds::default_info_area_min")]
    pub info_area_min: f32,
    /// Upper bound of the info-region area window (fraction of image area).
    #[serde(default = "ZoneThresholds::default_info_area_max")]
    pub info_area_max: f32,
}

impl ZoneThresholds {
    fn default_merge_band() -> f32 {
        0.75
    }

    fn default_filter_band() -> f32 {
        0.70
    }

    fn default_protected_band() -> f32 {
        0.80
    }

    fn default_info_area_min() -> f32 {
        0.002
    }

    fn default_info_area_max() -> f32 {
        0.3
    }

    fn validate(&self) -> SplitResult<()> {
        validate_unit_ratio(self.merge_band, "zones.merge_band")?;
        validate_unit_ratio(self.filter_band, "zones.filter_band")?;
        validate_unit_ratio(self.protected_band, "zones.protected_band")?;
        validate_unit_ratio(self.info_area_min, "zones.info_area_min")?;
        validate_unit_ratio(self.info_area_max, "zones.info_area_max")?;
        if self.info_area_min >= self.info_area_max {
            return Err(SplitError::config_error(format!(
                "zones: info_area_min ({}) must be below info_area_max ({})",
                self.info_area_min, self.info_area_max
            )));
        }
        Ok(())
    }
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            merge_band: Self::default_merge_band(),
            filter_band: Self::default_filter_band(),
            protected_band: Self::default_protected_band(),
            info_area_min: Self::default_info_area_min(),
            info_area_max: Self::default_info_area_max(),
        }
    }
}

/// Expansion margins applied by the region expander to info regions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExpansionRatios {
    /// Minimum horizontal expansion for merged bottom envelopes, in pixels.
    #[serde(default = "ExpansionRatios::default_merged_w_min_px")]
    pub merged_w_min_px: u32,
    /// Horizontal expansion for merged bottom envelopes, fraction of width.
    #[serde(default = "ExpansionRatios::default_merged_w_pct")]
    pub merged_w_pct: f32,
    /// Minimum top expansion for merged bottom envelopes, in pixels.
    #[serde(default = "ExpansionRatios::default_merged_h_min_px")]
    pub merged_h_min_px: u32,
    /// Top expansion for merged bottom envelopes, fraction of height.
    #[serde(default = "ExpansionRatios::default_merged_h_pct")]
    pub merged_h_pct: f32,
    /// Horizontal expansion for non-merged bottom info regions.
    #[serde(default = "ExpansionRatios::default_bottom_w_pct")]
    pub bottom_w_pct: f32,
    /// Vertical expansion for non-merged bottom info regions.
    #[serde(default = "ExpansionRatios::default_bottom_h_pct")]
    pub bottom_h_pct: f32,
    /// Expansion for other info regions, both axes.
    #[serde(default = "ExpansionRatios::default_generic_pct")]
    pub generic_pct: f32,
}

impl ExpansionRatios {
    fn default_merged_w_min_px() -> u32 {
        10
    }

    fn default_merged_w_pct() -> f32 {
        0.05
    }

    fn default_merged_h_min_px() -> u32 {
        5
    }

    fn default_merged_h_pct() -> f32 {
        0.02
    }

    fn default_bottom_w_pct() -> f32 {
        0.25
    }

    fn default_bottom_h_pct() -> f32 {
        0.20
    }

    fn default_generic_pct() -> f32 {
        0.15
    }

    fn validate(&self) -> SplitResult<()> {
        for (value, name) in [
            (self.merged_w_pct, "expansion.merged_w_pct"),
            (self.merged_h_pct, "expansion.merged_h_pct"),
            (self.bottom_w_pct, "expansion.bottom_w_pct"),
            (self.bottom_h_pct, "expansion.bottom_h_pct"),
            (self.generic_pct, "expansion.generic_pct"),
        ] {
            validate_finite(value, name)?;
            validate_non_negative(value, name)?;
        }
        Ok(())
    }
}

impl Default for ExpansionRatios {
    fn default() -> Self {
        Self {
            merged_w_min_px: Self::default_merged_w_min_px(),
            merged_w_pct: Self::default_merged_w_pct(),
            merged_h_min_px: Self::default_merged_h_min_px(),
            merged_h_pct: Self::default_merged_h_pct(),
            bottom_w_pct: Self::default_bottom_w_pct(),
            bottom_h_pct: Self::default_bottom_h_pct(),
            generic_pct: Self::default_generic_pct(),
        }
    }
}

/// Priority boosts the engineering filter attaches to survivors of the
/// protected and informational zones, consumed by the importance ranker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilterBoosts {
    /// Boost for survivors of the bottom protected band.
    #[serde(default = "FilterBoosts::default_bottom_protected")]
    pub bottom_protected: f32,
    /// Boost for survivors of other informational zones.
    #[serde(default = "FilterBoosts::default_protected_text")]
    pub protected_text: f32,
}

impl FilterBoosts {
    fn default_bottom_protected() -> f32 {
        1.5
    }

    fn default_protected_text() -> f32 {
        1.3
    }

    fn validate(&self) -> SplitResult<()> {
        for (value, name) in [
            (self.bottom_protected, "boosts.bottom_protected"),
            (self.protected_text, "boosts.protected_text"),
        ] {
            validate_finite(value, name)?;
            validate_positive(value, name)?;
        }
        Ok(())
    }
}

impl Default for FilterBoosts {
    fn default() -> Self {
        Self {
            bottom_protected: Self::default_bottom_protected(),
            protected_text: Self::default_protected_text(),
        }
    }
}

/// Zone multipliers applied by the importance ranker. Exactly one of the
/// first three applies per region; the two sub-multipliers compound on
/// the informational path only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImportanceWeights {
    /// Multiplier for the synthetic protected region.
    #[serde(default = "ImportanceWeights::default_protected")]
    pub protected: f32,
    /// Multiplier for merged bottom envelopes.
    #[serde(default = "ImportanceWeights::default_merged")]
    pub merged: f32,
    /// Multiplier for ordinary informational regions.
    #[serde(default = "ImportanceWeights::default_info")]
    pub info: f32,
    /// Sub-multiplier for bottom-band informational regions.
    #[serde(default = "ImportanceWeights::default_bottom_info")]
    pub bottom_info: f32,
    /// Sub-multiplier for bottom-protected informational regions.
    #[serde(default = "ImportanceWeights::default_bottom_protected")]
    pub bottom_protected: f32,
}

impl ImportanceWeights {
    fn default_protected() -> f32 {
        3.0
    }

    fn default_merged() -> f32 {
        2.5
    }

    fn default_info() -> f32 {
        1.8
    }

    fn default_bottom_info() -> f32 {
        1.4
    }

    fn default_bottom_protected() -> f32 {
        1.6
    }

    fn validate(&self) -> SplitResult<()> {
        for (value, name) in [
            (self.protected, "importance.protected"),
            (self.merged, "importance.merged"),
            (self.info, "importance.info"),
            (self.bottom_info, "importance.bottom_info"),
            (self.bottom_protected, "importance.bottom_protected"),
        ] {
            validate_finite(value, name)?;
            validate_positive(value, name)?;
        }
        Ok(())
    }
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self {
            protected: Self::default_protected(),
            merged: Self::default_merged(),
            info: Self::default_info(),
            bottom_info: Self::default_bottom_info(),
            bottom_protected: Self::default_bottom_protected(),
        }
    }
}

/// Directional expansion ratios used by the text-region refiner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextRefineRatios {
    /// Aspect ratio above which a wide box is treated as a text line.
    #[serde(default = "TextRefineRatios::default_line_aspect")]
    pub line_aspect: f32,
    /// Horizontal expansion for horizontal text lines.
    #[serde(default = "TextRefineRatios::default_line_w_pct")]
    pub line_w_pct: f32,
    /// Vertical expansion for horizontal text lines.
    #[serde(default = "TextRefineRatios::default_line_h_pct")]
    pub line_h_pct: f32,
    /// Uniform expansion for text blocks.
    #[serde(default = "TextRefineRatios::default_block_pct")]
    pub block_pct: f32,
    /// Vertical expansion for vertical text.
    #[serde(default = "TextRefineRatios::default_vertical_h_pct")]
    pub vertical_h_pct: f32,
    /// Horizontal expansion for vertical text.
    #[serde(default = "TextRefineRatios::default_vertical_w_pct")]
    pub vertical_w_pct: f32,
}

impl TextRefineRatios {
    fn default_line_aspect() -> f32 {
        3.0
    }

    fn default_line_w_pct() -> f32 {
        0.2
    }

    fn default_line_h_pct() -> f32 {
        0.3
    }

    fn default_block_pct() -> f32 {
        0.25
    }

    fn default_vertical_h_pct() -> f32 {
        0.2
    }

    fn default_vertical_w_pct() -> f32 {
        0.3
    }

    fn validate(&self) -> SplitResult<()> {
        validate_finite(self.line_aspect, "text.line_aspect")?;
        validate_range(self.line_aspect, 1.0, f32::MAX, "text.line_aspect")?;
        for (value, name) in [
            (self.line_w_pct, "text.line_w_pct"),
            (self.line_h_pct, "text.line_h_pct"),
            (self.block_pct, "text.block_pct"),
            (self.vertical_h_pct, "text.vertical_h_pct"),
            (self.vertical_w_pct, "text.vertical_w_pct"),
        ] {
            validate_finite(value, name)?;
            validate_non_negative(value, name)?;
        }
        Ok(())
    }
}

impl Default for TextRefineRatios {
    fn default() -> Self {
        Self {
            line_aspect: Self::default_line_aspect(),
            line_w_pct: Self::default_line_w_pct(),
            line_h_pct: Self::default_line_h_pct(),
            block_pct: Self::default_block_pct(),
            vertical_h_pct: Self::default_vertical_h_pct(),
            vertical_w_pct: Self::default_vertical_w_pct(),
        }
    }
}

/// Top-level configuration for the view-splitting pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// IoU threshold for the first deduplication pass.
    #[serde(default = "PipelineConfig::default_overlap_threshold")]
    pub overlap_threshold: f32,

    /// IoU threshold for the post-expansion deduplication pass.
    #[serde(default = "PipelineConfig::default_final_overlap_threshold")]
    pub final_overlap_threshold: f32,

    /// Containment ratio above which one box counts as inside another.
    #[serde(default = "PipelineConfig::default_containment_threshold")]
    pub containment_threshold: f32,

    /// Neighborhood radius for proximity clustering, in pixels.
    #[serde(default = "PipelineConfig::default_proximity_distance")]
    pub proximity_distance: f32,

    /// Hard cap on the number of output regions.
    #[serde(default = "PipelineConfig::default_max_output_regions")]
    pub max_output_regions: usize,

    /// Wall-clock deadline for a single oracle pass, in seconds.
    #[serde(default = "PipelineConfig::default_pass_deadline_secs")]
    pub pass_deadline_secs: u64,

    /// Uniform context expansion applied to finalized regions, both axes.
    #[serde(default = "PipelineConfig::default_context_expansion")]
    pub context_expansion: f32,

    /// Margin in pixels inside which edge artifacts are suspected.
    #[serde(default = "PipelineConfig::default_edge_margin_px")]
    pub edge_margin_px: u32,

    /// Area fraction above which an edge-touching region is kept anyway.
    #[serde(default = "PipelineConfig::default_edge_area_escape")]
    pub edge_area_escape: f32,

    /// Proposal count above which rescaling runs in parallel.
    #[serde(default = "PipelineConfig::default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Zone band positions.
    #[serde(default)]
    pub zones: ZoneThresholds,

    /// Per-zone filter bound table.
    #[serde(default)]
    pub bounds: FilterBoundsTable,

    /// Priority boosts attached by the engineering filter.
    #[serde(default)]
    pub boosts: FilterBoosts,

    /// Zone multipliers applied by the importance ranker.
    #[serde(default)]
    pub importance: ImportanceWeights,

    /// Info-region expansion margins.
    #[serde(default)]
    pub expansion: ExpansionRatios,

    /// Text-refinement expansion ratios.
    #[serde(default)]
    pub text: TextRefineRatios,
}

impl PipelineConfig {
    fn default_overlap_threshold() -> f32 {
        0.3
    }

    fn default_final_overlap_threshold() -> f32 {
        0.4
    }

    fn default_containment_threshold() -> f32 {
        0.8
    }

    fn default_proximity_distance() -> f32 {
        100.0
    }

    fn default_max_output_regions() -> usize {
        20
    }

    fn default_pass_deadline_secs() -> u64 {
        300
    }

    fn default_context_expansion() -> f32 {
        0.15
    }

    fn default_edge_margin_px() -> u32 {
        10
    }

    fn default_edge_area_escape() -> f32 {
        0.05
    }

    fn default_parallel_threshold() -> usize {
        64
    }

    /// Checks every configured value, failing fast before any processing.
    pub fn validate(&self) -> SplitResult<()> {
        validate_unit_ratio(self.overlap_threshold, "overlap_threshold")?;
        validate_unit_ratio(self.final_overlap_threshold, "final_overlap_threshold")?;
        validate_unit_ratio(self.containment_threshold, "containment_threshold")?;
        validate_finite(self.proximity_distance, "proximity_distance")?;
        validate_positive(self.proximity_distance, "proximity_distance")?;
        if self.max_output_regions == 0 {
            return Err(SplitError::config_error(
                "max_output_regions must be positive",
            ));
        }
        if self.pass_deadline_secs == 0 {
            return Err(SplitError::config_error("pass_deadline_secs must be positive"));
        }
        validate_finite(self.context_expansion, "context_expansion")?;
        validate_non_negative(self.context_expansion, "context_expansion")?;
        validate_unit_ratio(self.edge_area_escape, "edge_area_escape")?;
        self.zones.validate()?;
        self.bounds.validate()?;
        self.boosts.validate()?;
        self.importance.validate()?;
        self.expansion.validate()?;
        self.text.validate()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: Self::default_overlap_threshold(),
            final_overlap_threshold: Self::default_final_overlap_threshold(),
            containment_threshold: Self::default_containment_threshold(),
            proximity_distance: Self::default_proximity_distance(),
            max_output_regions: Self::default_max_output_regions(),
            pass_deadline_secs: Self::default_pass_deadline_secs(),
            context_expansion: Self::default_context_expansion(),
            edge_margin_px: Self::default_edge_margin_px(),
            edge_area_escape: Self::default_edge_area_escape(),
            parallel_threshold: Self::default_parallel_threshold(),
            zones: ZoneThresholds::default(),
            bounds: FilterBoundsTable::default(),
            boosts: FilterBoosts::default(),
            importance: ImportanceWeights::default(),
            expansion: ExpansionRatios::default(),
            text: TextRefineRatios::default(),
        }
    }
}

/// Configuration file format.
#[derive(Debug, Clone, Copy)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration loader for the pipeline.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file, auto-detecting the format from the
    /// extension. The loaded configuration is validated before it is
    /// returned.
    pub fn load_from_file(path: &Path) -> SplitResult<PipelineConfig> {
        let format = ConfigFormat::from_extension(path).ok_or_else(|| SplitError::ConfigError {
            message: format!("unsupported config file extension: {:?}", path.extension()),
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| SplitError::ConfigError {
            message: format!("failed to read config file {}: {}", path.display(), e),
        })?;

        Self::load_from_string(&content, format)
    }

    /// Load configuration from a string with the specified format.
    pub fn load_from_string(content: &str, format: ConfigFormat) -> SplitResult<PipelineConfig> {
        let config: PipelineConfig = match format {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| SplitError::ConfigError {
                message: format!("failed to parse TOML config: {e}"),
            })?,
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| SplitError::ConfigError {
                    message: format!("failed to parse JSON config: {e}"),
                })?
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a string with the specified format.
    pub fn save_to_string(config: &PipelineConfig, format: ConfigFormat) -> SplitResult<String> {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| SplitError::ConfigError {
                    message: format!("failed to serialize TOML config: {e}"),
                })
            }
            ConfigFormat::Json => {
                serde_json::to_string_pretty(config).map_err(|e| SplitError::ConfigError {
                    message: format!("failed to serialize JSON config: {e}"),
                })
            }
        }
    }
}
