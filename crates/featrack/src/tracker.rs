use featrack_image::{normalize_frame, Image, RawFrame};
use featrack_imgproc::{features::good_features_to_track, optical_flow::calc_optical_flow_pyr_lk};

use crate::{
    config::{TrackingConfig, TrackingMode},
    error::TrackerError,
    feature_set::{ChannelOutput, FeatureSet},
};

/// Inputs of one [`FeatureTracker::process`] call.
///
/// The tracker keeps no state between calls; the caller hands back the previous
/// frame and the previous output when tracking.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackInput<'a> {
    /// The current frame. `None` when nothing is connected.
    pub frame: Option<&'a RawFrame>,
    /// The frame the previous features were found on.
    pub previous_frame: Option<&'a RawFrame>,
    /// The features produced by the previous call.
    pub previous_features: Option<&'a FeatureSet>,
}

/// Detects good features to track and follows them across frames.
///
/// # Example
///
/// ```
/// use featrack::{FeatureTracker, TrackingConfig};
/// use featrack_image::Image;
///
/// let frame = Image::<u8, 1>::from_size_val([64, 48].into(), 0).unwrap();
/// let tracker = FeatureTracker::new(TrackingConfig::default());
/// let features = tracker.detect(&frame).unwrap();
/// assert!(features.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeatureTracker {
    config: TrackingConfig,
}

impl FeatureTracker {
    /// Create a tracker from a clamped configuration.
    pub fn new(config: TrackingConfig) -> Self {
        Self { config }
    }

    /// The configuration of the tracker.
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Detect the strongest corners of a gray8 frame.
    ///
    /// The features are ordered by decreasing corner strength, hold at most
    /// `max_features` points and are at least `min_distance` pixels apart.
    pub fn detect(&self, frame: &Image<u8, 1>) -> Result<FeatureSet, TrackerError> {
        let corners = good_features_to_track(frame, &self.config.good_features_params())?;
        log::debug!("detected {} features", corners.len());
        Ok(corners.into())
    }

    /// Track features from the previous gray8 frame into the current one.
    ///
    /// # Returns
    ///
    /// The surviving features in their input order, and a validity mask with
    /// one entry per input feature.
    ///
    /// # Errors
    ///
    /// Returns an error if the two frames differ in size.
    pub fn track(
        &self,
        previous: &Image<u8, 1>,
        current: &Image<u8, 1>,
        previous_features: &FeatureSet,
    ) -> Result<(FeatureSet, Vec<bool>), TrackerError> {
        if previous_features.is_empty() {
            return Ok((FeatureSet::new(), Vec::new()));
        }

        if previous.size() != current.size() {
            return Err(TrackerError::FrameSizeMismatch {
                previous: previous.size(),
                current: current.size(),
            });
        }

        let flow = calc_optical_flow_pyr_lk(
            previous,
            current,
            previous_features.points(),
            &self.config.lk_params(),
        )?;

        let tracked = flow
            .next_pts
            .iter()
            .zip(&flow.status)
            .filter_map(|(&pt, &valid)| valid.then_some(pt))
            .collect::<Vec<_>>();

        log::debug!(
            "tracked {}/{} features",
            tracked.len(),
            previous_features.len()
        );

        Ok((FeatureSet::from_points(tracked), flow.status))
    }

    /// Run the configured mode on raw frames and shape the result as channels.
    ///
    /// A missing current frame gives an empty output, as does track mode without
    /// a previous frame or previous features. Both frames go through
    /// [`normalize_frame`] first.
    ///
    /// # Errors
    ///
    /// Returns an error if a frame cannot be normalized or the frames differ in size.
    pub fn process(&self, input: &TrackInput<'_>) -> Result<ChannelOutput, TrackerError> {
        let Some(frame) = input.frame else {
            log::debug!("no input frame");
            return Ok(ChannelOutput::default());
        };
        let current = normalize_frame(frame)?;

        let features = match self.config.mode {
            TrackingMode::Detect => self.detect(&current)?,
            TrackingMode::Track => {
                let (Some(previous_frame), Some(previous_features)) =
                    (input.previous_frame, input.previous_features)
                else {
                    log::debug!("track mode without a previous frame or previous features");
                    return Ok(ChannelOutput::default());
                };
                if previous_features.is_empty() {
                    return Ok(ChannelOutput::default());
                }

                let previous = normalize_frame(previous_frame)?;
                self.track(&previous, &current, previous_features)?.0
            }
        };

        Ok(ChannelOutput::from(&features))
    }
}
