//! Tracker configuration and the host parameter surface.
//!
//! [`TrackerParams`] mirrors the raw values a host parameter page hands over.
//! They are clamped into a [`TrackingConfig`] once per invocation with
//! [`TrackerParams::into_config`]; the tracker itself only ever sees clamped
//! values.

use featrack_imgproc::{
    features::{CornerResponse, GoodFeaturesParams},
    optical_flow::LkParams,
};
use serde::{Deserialize, Serialize};

/// Quality level used when the configured one is not positive.
pub const DEFAULT_QUALITY_LEVEL: f32 = 0.01;

/// The harris free parameter used when harris scoring is selected.
pub const HARRIS_K: f32 = 0.04;

/// Whether an invocation detects new features or tracks the previous ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    /// Detect fresh corners on the current frame.
    #[default]
    Detect,
    /// Track the previous features from the previous frame into the current one.
    Track,
}

/// Validated settings of one tracker invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    /// Maximum number of detected features.
    pub max_features: usize,
    /// Minimum accepted corner strength relative to the strongest corner.
    pub quality_level: f32,
    /// Minimum distance in pixels between detected features.
    pub min_distance: f32,
    /// Score corners with the harris response instead of the minimum eigenvalue.
    pub use_harris: bool,
    /// Detect or track.
    pub mode: TrackingMode,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackerParams::default().into_config()
    }
}

impl TrackingConfig {
    /// Corner detector parameters for this configuration.
    pub fn good_features_params(&self) -> GoodFeaturesParams {
        let response = if self.use_harris {
            CornerResponse::Harris { k: HARRIS_K }
        } else {
            CornerResponse::MinEigenValue
        };

        GoodFeaturesParams {
            max_corners: self.max_features,
            quality_level: self.quality_level,
            min_distance: self.min_distance,
            response,
            ..Default::default()
        }
    }

    /// Optical flow parameters used in track mode.
    pub fn lk_params(&self) -> LkParams {
        LkParams::default()
    }
}

/// Raw tracker parameters as exposed to a host.
///
/// Every field is optional when deserializing and falls back to the host default.
///
/// ```
/// use featrack::config::{TrackerParams, TrackingMode};
///
/// let params: TrackerParams = serde_json::from_str(r#"{"quality": -1.0, "find_features": false}"#).unwrap();
/// let config = params.into_config();
/// assert_eq!(config.quality_level, 0.01);
/// assert_eq!(config.max_features, 25);
/// assert_eq!(config.mode, TrackingMode::Track);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Number of features to detect.
    pub features: i64,
    /// Minimum quality level.
    pub quality: f64,
    /// Minimum distance between features, in pixels.
    pub distance: f64,
    /// Use harris corner detection.
    pub use_harris: bool,
    /// Detect new features when set, otherwise track the previous ones.
    pub find_features: bool,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            features: 25,
            quality: 0.01,
            distance: 10.0,
            use_harris: false,
            find_features: true,
        }
    }
}

impl TrackerParams {
    /// Clamp the raw values into a tracking configuration.
    ///
    /// A quality level that is not positive becomes [`DEFAULT_QUALITY_LEVEL`],
    /// negative distances and counts become zero. Values above the host UI range
    /// are kept as they are.
    pub fn into_config(self) -> TrackingConfig {
        let quality_level = if self.quality > 0.0 {
            self.quality as f32
        } else {
            DEFAULT_QUALITY_LEVEL
        };

        TrackingConfig {
            max_features: self.features.max(0) as usize,
            quality_level,
            // NaN distances count as zero as well
            min_distance: self.distance.max(0.0) as f32,
            use_harris: self.use_harris,
            mode: if self.find_features {
                TrackingMode::Detect
            } else {
                TrackingMode::Track
            },
        }
    }
}

/// Kind and default value of a host parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum ParamKind {
    /// Reference to an image operator.
    Top {
        /// default operator name
        default: &'static str,
    },
    /// Integer with a slider range.
    Int {
        /// default value
        default: i64,
        /// slider minimum
        norm_min: i64,
        /// slider maximum
        norm_max: i64,
    },
    /// Float with a slider range.
    Float {
        /// default value
        default: f64,
        /// slider minimum
        norm_min: f64,
        /// slider maximum
        norm_max: f64,
    },
    /// On/off toggle.
    Toggle {
        /// default state
        default: bool,
    },
}

/// Description of one host parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    /// Parameter name as seen by the host.
    pub name: &'static str,
    /// Label shown on the parameter page.
    pub label: &'static str,
    /// Kind and default value.
    #[serde(flatten)]
    pub kind: ParamKind,
}

/// Name of the host parameter page.
pub const PARAMETER_PAGE: &str = "Good Features";

/// The host parameters, in page order.
pub static PARAMETERS: [ParamSpec; 7] = [
    ParamSpec {
        name: "Top",
        label: "TOP (monochrome)",
        kind: ParamKind::Top { default: "img" },
    },
    ParamSpec {
        name: "Topprevious",
        label: "TOP Previous (monochrome)",
        kind: ParamKind::Top { default: "cache" },
    },
    ParamSpec {
        name: "Features",
        label: "Number of Features",
        kind: ParamKind::Int {
            default: 25,
            norm_min: 1,
            norm_max: 250,
        },
    },
    ParamSpec {
        name: "Quality",
        label: "Minimum Quality Level",
        kind: ParamKind::Float {
            default: 0.01,
            norm_min: 0.001,
            norm_max: 1.0,
        },
    },
    ParamSpec {
        name: "Distance",
        label: "Minimum Distance",
        kind: ParamKind::Int {
            default: 10,
            norm_min: 1,
            norm_max: 1200,
        },
    },
    ParamSpec {
        name: "Useharris",
        label: "Use Harris Corner Detection",
        kind: ParamKind::Toggle { default: false },
    },
    ParamSpec {
        name: "Findfeatures",
        label: "Find Features",
        kind: ParamKind::Toggle { default: true },
    },
];

/// Look up a host parameter by name.
pub fn find_parameter(name: &str) -> Option<&'static ParamSpec> {
    PARAMETERS.iter().find(|p| p.name == name)
}
