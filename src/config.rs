//! Configuration for detection, erasure, font resolution and auto-fit.
//!
//! Every threshold here is an empirically tuned default, not an invariant.
//! Configurations deserialize from partial JSON: missing fields keep their
//! defaults.
//!
//! ```
//! use placeholder_oxide::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str(r#"{ "erase": { "protected_min_font_size": 24.0 } }"#)
//!     .unwrap();
//! assert_eq!(config.erase.protected_min_font_size, 24.0);
//! assert_eq!(config.fit.max_iterations, 18);
//! ```

use crate::error::{Error, Result};
use crate::layout::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Placeholder detection settings
    pub detection: DetectionConfig,
    /// Erasure settings
    pub erase: EraseConfig,
    /// Font resolution settings
    pub fonts: FontConfig,
    /// Auto-fit settings
    pub fit: FitConfig,
}

impl PipelineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the detection settings.
    pub fn with_detection(mut self, detection: DetectionConfig) -> Self {
        self.detection = detection;
        self
    }

    /// Replace the erase settings.
    pub fn with_erase(mut self, erase: EraseConfig) -> Self {
        self.erase = erase;
        self
    }

    /// Replace the font settings.
    pub fn with_fonts(mut self, fonts: FontConfig) -> Self {
        self.fonts = fonts;
        self
    }

    /// Replace the auto-fit settings.
    pub fn with_fit(mut self, fit: FitConfig) -> Self {
        self.fit = fit;
        self
    }

    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject inconsistent settings.
    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.erase.validate()?;
        self.fonts.validate()?;
        self.fit.validate()
    }
}

/// Placeholder detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Recognize `{key}` (filtered for false positives)
    pub allow_single_brace: bool,
    /// Recognize `[key]` (filtered for false positives)
    pub allow_single_bracket: bool,
    /// Horizontal pad added to each side of a reconstructed rectangle
    pub horizontal_pad: f32,
    /// Minimum width of a per-run partial rectangle
    pub min_partial_width: f32,
    /// Vertical tolerance when accepting literal-search fallback results
    pub search_band_tolerance: f32,
    /// Scan FreeText annotation contents
    pub scan_annotations: bool,
    /// Scan text form-field values
    pub scan_form_fields: bool,
    /// Short words never accepted as keys by the permissive patterns
    pub stoplist: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            allow_single_brace: false,
            allow_single_bracket: false,
            horizontal_pad: 0.5,
            min_partial_width: 0.5,
            search_band_tolerance: 2.0,
            scan_annotations: true,
            scan_form_fields: true,
            stoplist: ["NEW", "OLD", "YES", "NO", "TOP", "END", "ALL", "ANY", "HOW", "WHO", "WHAT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DetectionConfig {
    /// Create detection settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the single-brace family.
    pub fn with_single_brace(mut self, enable: bool) -> Self {
        self.allow_single_brace = enable;
        self
    }

    /// Enable or disable the single-bracket family.
    pub fn with_single_bracket(mut self, enable: bool) -> Self {
        self.allow_single_bracket = enable;
        self
    }

    /// Set the horizontal pad.
    pub fn with_horizontal_pad(mut self, pad: f32) -> Self {
        self.horizontal_pad = pad;
        self
    }

    /// Set the literal-search band tolerance.
    pub fn with_search_band_tolerance(mut self, tolerance: f32) -> Self {
        self.search_band_tolerance = tolerance;
        self
    }

    /// Enable or disable annotation scanning.
    pub fn with_annotations(mut self, enable: bool) -> Self {
        self.scan_annotations = enable;
        self
    }

    /// Enable or disable form-field scanning.
    pub fn with_form_fields(mut self, enable: bool) -> Self {
        self.scan_form_fields = enable;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.horizontal_pad < 0.0 || self.min_partial_width < 0.0 {
            return Err(Error::InvalidConfig(
                "detection pads must not be negative".to_string(),
            ));
        }
        if self.search_band_tolerance < 0.0 {
            return Err(Error::InvalidConfig(
                "search_band_tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Erasure settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EraseConfig {
    /// Longest run (trimmed, in characters) that can be protected
    pub protected_max_chars: usize,
    /// Font size a run must exceed to be protected
    pub protected_min_font_size: f32,
    /// Background used when sampling fails
    pub default_background: Color,
}

impl Default for EraseConfig {
    fn default() -> Self {
        Self {
            protected_max_chars: 5,
            protected_min_font_size: 30.0,
            default_background: Color::white(),
        }
    }
}

impl EraseConfig {
    /// Create erase settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the protected-region font size threshold.
    pub fn with_protected_min_font_size(mut self, size: f32) -> Self {
        self.protected_min_font_size = size;
        self
    }

    /// Set the protected-region character limit.
    pub fn with_protected_max_chars(mut self, chars: usize) -> Self {
        self.protected_max_chars = chars;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.protected_min_font_size < 0.0 {
            return Err(Error::InvalidConfig(
                "protected_min_font_size must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Font resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Embedded payloads smaller than this are treated as subsets
    pub subset_min_bytes: u64,
    /// Sibling style variants smaller than this are ignored
    pub variant_min_bytes: u64,
    /// Fallback file names in priority order
    pub fallback_priority: Vec<String>,
    /// Directories scanned for fallback fonts
    pub fallback_dirs: Vec<PathBuf>,
    /// Built-in family used when everything else fails
    pub builtin_family: String,
    /// Font cache capacity (entries)
    pub cache_capacity: usize,
    /// Font cache entry lifetime in seconds (`None` keeps entries until evicted)
    pub cache_ttl_secs: Option<u64>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            subset_min_bytes: 20_000,
            variant_min_bytes: 10_000,
            fallback_priority: [
                "DejaVuSans.ttf",
                "NotoSans-Regular.ttf",
                "FreeSans.ttf",
                "OpenSans-Regular.ttf",
                "Roboto-Regular.ttf",
                "LiberationSans-Regular.ttf",
                "Arial.ttf",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            fallback_dirs: vec![PathBuf::from("fonts")],
            builtin_family: "Helvetica".to_string(),
            cache_capacity: 64,
            cache_ttl_secs: None,
        }
    }
}

impl FontConfig {
    /// Create font settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subset byte cutoff.
    pub fn with_subset_min_bytes(mut self, bytes: u64) -> Self {
        self.subset_min_bytes = bytes;
        self
    }

    /// Set the directories scanned for fallback fonts.
    pub fn with_fallback_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.fallback_dirs = dirs;
        self
    }

    /// Set the font cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(Error::InvalidConfig(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.builtin_family.trim().is_empty() {
            return Err(Error::InvalidConfig("builtin_family is empty".to_string()));
        }
        Ok(())
    }
}

/// Auto-fit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Starting size as a fraction of the rectangle height
    pub start_ratio: f32,
    /// Smallest automatic size
    pub min_size: f32,
    /// Largest automatic size
    pub max_size: f32,
    /// Lower clamp for caller-supplied sizes
    pub explicit_min_size: f32,
    /// Upper clamp for caller-supplied sizes
    pub explicit_max_size: f32,
    /// Pad between the target rectangle and the text area
    pub inner_pad: f32,
    /// Single-line shrink iterations
    pub max_iterations: usize,
    /// Allowed width excess after fitting
    pub width_tolerance: f32,
    /// Baseline offset as a fraction of the font size
    pub ascent_ratio: f32,
    /// Cap height as a fraction of the font size, for vertical centering
    pub cap_height_ratio: f32,
    /// Apply the vertical centering correction
    pub vertical_centering: bool,
    /// Bound on the vertical centering correction
    pub max_vertical_shift: f32,
    /// Box-fit binary search iterations
    pub box_iterations: usize,
    /// Smallest box-fit size
    pub box_min_size: f32,
    /// Overflow expansion of the rectangle width
    pub overflow_width_scale: f32,
    /// Overflow expansion of the rectangle height
    pub overflow_height_scale: f32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            start_ratio: 0.62,
            min_size: 6.0,
            max_size: 28.0,
            explicit_min_size: 6.0,
            explicit_max_size: 72.0,
            inner_pad: 0.5,
            max_iterations: 18,
            width_tolerance: 0.01,
            ascent_ratio: 0.8,
            cap_height_ratio: 0.85,
            vertical_centering: true,
            max_vertical_shift: 12.0,
            box_iterations: 12,
            box_min_size: 4.0,
            overflow_width_scale: 1.5,
            overflow_height_scale: 1.3,
        }
    }
}

impl FitConfig {
    /// Create fit settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the automatic size range.
    pub fn with_size_range(mut self, min: f32, max: f32) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    /// Set the inner pad.
    pub fn with_inner_pad(mut self, pad: f32) -> Self {
        self.inner_pad = pad;
        self
    }

    /// Enable or disable vertical centering.
    pub fn with_vertical_centering(mut self, enable: bool) -> Self {
        self.vertical_centering = enable;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.min_size <= 0.0 || self.min_size > self.max_size {
            return Err(Error::InvalidConfig(format!(
                "invalid automatic size range [{}, {}]",
                self.min_size, self.max_size
            )));
        }
        if self.explicit_min_size <= 0.0 || self.explicit_min_size > self.explicit_max_size {
            return Err(Error::InvalidConfig(format!(
                "invalid explicit size range [{}, {}]",
                self.explicit_min_size, self.explicit_max_size
            )));
        }
        if self.max_iterations == 0 || self.box_iterations == 0 {
            return Err(Error::InvalidConfig(
                "iteration bounds must be at least 1".to_string(),
            ));
        }
        if self.box_min_size <= 0.0 {
            return Err(Error::InvalidConfig("box_min_size must be positive".to_string()));
        }
        if self.inner_pad < 0.0 || self.width_tolerance < 0.0 {
            return Err(Error::InvalidConfig(
                "inner_pad and width_tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
