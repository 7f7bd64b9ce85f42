//! Cook cycle of a host node that owns the `tx`/`ty` output channels.
//!
//! The node is the only place where state survives between frames: its output
//! channels from the last cook are read back as the previous features before
//! they are cleared and rewritten.

use featrack_image::RawFrame;

use crate::{
    config::{TrackerParams, TrackingMode},
    error::TrackerError,
    feature_set::ChannelOutput,
    tracker::{FeatureTracker, TrackInput},
};

/// Output channels and parameters of a tracking node.
#[derive(Debug, Clone, Default)]
pub struct ScriptChannels {
    params: TrackerParams,
    output: ChannelOutput,
}

impl ScriptChannels {
    /// Create a node with the given parameters and empty channels.
    pub fn new(params: TrackerParams) -> Self {
        Self {
            params,
            output: ChannelOutput::default(),
        }
    }

    /// The node parameters.
    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    /// Mutable access to the node parameters, applied on the next cook.
    pub fn params_mut(&mut self) -> &mut TrackerParams {
        &mut self.params
    }

    /// The channels written by the last cook.
    pub fn output(&self) -> &ChannelOutput {
        &self.output
    }

    /// The `tx` channel.
    pub fn tx(&self) -> &[f32] {
        self.output.tx()
    }

    /// The `ty` channel.
    pub fn ty(&self) -> &[f32] {
        self.output.ty()
    }

    /// The number of samples of both channels.
    pub fn num_samples(&self) -> usize {
        self.output.num_samples()
    }

    /// Replace the channels, e.g. to seed the features to track.
    pub fn set_channels(&mut self, tx: Vec<f32>, ty: Vec<f32>) -> Result<(), TrackerError> {
        self.output = ChannelOutput::from_channels(tx, ty)?;
        Ok(())
    }

    /// Run one cook cycle.
    ///
    /// In track mode the current channels are taken as the previous features
    /// before the channels are cleared. On error the channels stay empty.
    ///
    /// # Arguments
    ///
    /// * `top` - The current frame, if an input is connected.
    /// * `top_previous` - The previous frame, if an input is connected.
    ///
    /// # Returns
    ///
    /// The number of samples written.
    pub fn cook(
        &mut self,
        top: Option<&RawFrame>,
        top_previous: Option<&RawFrame>,
    ) -> Result<usize, TrackerError> {
        let config = self.params.clone().into_config();

        let previous_features = match config.mode {
            TrackingMode::Track => Some(self.output.to_feature_set()),
            TrackingMode::Detect => None,
        };
        self.output.clear();

        let tracker = FeatureTracker::new(config);
        let input = TrackInput {
            frame: top,
            previous_frame: top_previous,
            previous_features: previous_features.as_ref(),
        };

        match tracker.process(&input) {
            Ok(output) => {
                self.output = output;
                Ok(self.output.num_samples())
            }
            Err(err) => {
                log::warn!("cook failed, output cleared: {err}");
                Err(err)
            }
        }
    }
}
