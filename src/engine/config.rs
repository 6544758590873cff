//! Engine configuration.
//!
//! Everything that tunes the engine travels in a [`PatchConfig`] value
//! passed to each call. The JSON shape matches the bulk replacement
//! config files:
//!
//! ```json
//! { "replacements": [ { "old": "4704.32", "new": "2723.00" } ],
//!   "pad": 1.2, "slack": 3.0, "fs_min": 8.0, "fs_max": 18.0 }
//! ```

use crate::error::{PatchError, PatchResult};
use crate::page::{Color, ImageMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One `{old, new}` substitution. An empty `new` deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub old: String,
    #[serde(default)]
    pub new: String,
}

impl Replacement {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    pub fn is_deletion(&self) -> bool {
        self.new.is_empty()
    }

    /// Parses the CLI form `OLD=NEW`; `OLD=` deletes.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfpatch::engine::Replacement;
    ///
    /// let r = Replacement::parse_pair("4704.32=2723.00").unwrap();
    /// assert_eq!(r, Replacement::new("4704.32", "2723.00"));
    /// assert!(Replacement::parse_pair("073=").unwrap().is_deletion());
    /// ```
    pub fn parse_pair(pair: &str) -> PatchResult<Self> {
        match pair.split_once('=') {
            Some((old, new)) if !old.is_empty() => Ok(Self::new(old, new)),
            _ => Err(PatchError::InvalidInput {
                parameter: "replace".to_string(),
                reason: format!("expected OLD=NEW, got '{}'", pair),
            }),
        }
    }
}

/// Clamp and fallback values for inferred font sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontBounds {
    pub min: f32,
    pub max: f32,
    /// Used when a matched run carries no usable size.
    pub default: f32,
}

impl FontBounds {
    pub fn clamp(&self, size: f32) -> f32 {
        self.min.max(self.max.min(size))
    }
}

impl Default for FontBounds {
    fn default() -> Self {
        Self {
            min: 8.0,
            max: 18.0,
            default: 11.0,
        }
    }
}

/// Tunables for locating an amount next to a label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Minimum vertical overlap with the label, as a share of the smaller height.
    pub overlap_ratio: f32,
    /// Largest horizontal gap across which fragments are merged.
    pub merge_gap: f32,
    /// Vertical overlap a merge neighbour needs with the growing box.
    pub merge_overlap_ratio: f32,
    /// Padding added around the returned box.
    pub padding: f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            overlap_ratio: 0.45,
            merge_gap: 12.0,
            merge_overlap_ratio: 0.6,
            padding: 2.0,
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    pub replacements: Vec<Replacement>,
    /// Erase margin on every side of an occurrence.
    pub pad: f32,
    /// Extra room reserved to the left of the replacement text.
    pub slack: f32,
    #[serde(rename = "fs_min")]
    pub font_min: f32,
    #[serde(rename = "fs_max")]
    pub font_max: f32,
    #[serde(rename = "fs_default")]
    pub font_default: f32,
    /// Font used both to measure and to write replacement text.
    pub font_name: String,
    pub fill: Color,
    pub text_color: Color,
    pub images: ImageMode,
    pub proximity: ProximityConfig,
}

impl Default for PatchConfig {
    fn default() -> Self {
        let bounds = FontBounds::default();
        Self {
            replacements: Vec::new(),
            pad: 1.2,
            slack: 3.0,
            font_min: bounds.min,
            font_max: bounds.max,
            font_default: bounds.default,
            font_name: "helv".to_string(),
            fill: Color::WHITE,
            text_color: Color::BLACK,
            images: ImageMode::None,
            proximity: ProximityConfig::default(),
        }
    }
}

impl PatchConfig {
    pub fn with_replacements(replacements: Vec<Replacement>) -> Self {
        Self {
            replacements,
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> PatchResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> PatchResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PatchError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&text).map_err(|e| match e {
            PatchError::Config { reason, .. } => PatchError::Config {
                path: Some(path.to_path_buf()),
                reason,
            },
            other => other,
        })
    }

    pub fn font_bounds(&self) -> FontBounds {
        FontBounds {
            min: self.font_min,
            max: self.font_max,
            default: self.font_default,
        }
    }

    pub fn validate(&self) -> PatchResult<()> {
        let invalid = |parameter: &str, reason: String| PatchError::InvalidInput {
            parameter: parameter.to_string(),
            reason,
        };

        for (name, value) in [("pad", self.pad), ("slack", self.slack)] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(name, format!("must be a non-negative number, got {}", value)));
            }
        }
        if !(self.font_min > 0.0 && self.font_min <= self.font_max) {
            return Err(invalid(
                "fs_min",
                format!(
                    "font bounds must satisfy 0 < fs_min <= fs_max, got {}..{}",
                    self.font_min, self.font_max
                ),
            ));
        }
        if let Some(i) = self.replacements.iter().position(|r| r.old.is_empty()) {
            return Err(invalid("replacements", format!("entry {} has an empty 'old'", i)));
        }
        let p = &self.proximity;
        if !(p.overlap_ratio >= 0.0 && p.merge_gap >= 0.0 && p.padding >= 0.0) {
            return Err(invalid("proximity", "values must be non-negative".to_string()));
        }
        Ok(())
    }
}
