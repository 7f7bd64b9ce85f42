use featrack_imgproc::features::Corner;

use crate::error::TrackerError;

/// An ordered set of 2d points in frame pixel coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    points: Vec<[f32; 2]>,
}

impl FeatureSet {
    /// Create an empty feature set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a feature set from `[x, y]` points.
    pub fn from_points(points: Vec<[f32; 2]>) -> Self {
        Self { points }
    }

    /// The `[x, y]` points.
    pub fn points(&self) -> &[[f32; 2]] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, [f32; 2]> {
        self.points.iter()
    }

    /// Split the points into x and y channels.
    pub fn to_channels(&self) -> ChannelOutput {
        let (tx, ty) = self.points.iter().map(|&[x, y]| (x, y)).unzip();
        ChannelOutput { tx, ty }
    }
}

impl From<Vec<Corner>> for FeatureSet {
    fn from(corners: Vec<Corner>) -> Self {
        Self {
            points: corners.into_iter().map(|c| [c.x, c.y]).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = &'a [f32; 2];
    type IntoIter = std::slice::Iter<'a, [f32; 2]>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Feature coordinates shaped as two sample channels.
///
/// `tx` and `ty` always hold the same number of samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelOutput {
    tx: Vec<f32>,
    ty: Vec<f32>,
}

impl ChannelOutput {
    /// Create the output from x and y channels of equal length.
    pub fn from_channels(tx: Vec<f32>, ty: Vec<f32>) -> Result<Self, TrackerError> {
        if tx.len() != ty.len() {
            return Err(TrackerError::ChannelLengthMismatch {
                tx: tx.len(),
                ty: ty.len(),
            });
        }
        Ok(Self { tx, ty })
    }

    /// The x coordinates.
    pub fn tx(&self) -> &[f32] {
        &self.tx
    }

    /// The y coordinates.
    pub fn ty(&self) -> &[f32] {
        &self.ty
    }

    /// Number of samples in each channel.
    pub fn num_samples(&self) -> usize {
        self.tx.len()
    }

    /// Whether the channels are empty.
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.tx.clear();
        self.ty.clear();
    }

    /// Zip the channels back into points.
    pub fn to_feature_set(&self) -> FeatureSet {
        FeatureSet::from_points(self.tx.iter().zip(&self.ty).map(|(&x, &y)| [x, y]).collect())
    }
}

impl From<&FeatureSet> for ChannelOutput {
    fn from(features: &FeatureSet) -> Self {
        features.to_channels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_round_trip() -> Result<(), TrackerError> {
        let features = FeatureSet::from_points(vec![[1.0, 2.0], [3.5, 4.5]]);
        let channels = features.to_channels();
        assert_eq!(channels.tx(), &[1.0, 3.5]);
        assert_eq!(channels.ty(), &[2.0, 4.5]);
        assert_eq!(channels.num_samples(), 2);
        assert_eq!(channels.to_feature_set(), features);

        let rebuilt = ChannelOutput::from_channels(vec![1.0, 3.5], vec![2.0, 4.5])?;
        assert_eq!(rebuilt, channels);
        assert_eq!(ChannelOutput::from(&features), channels);
        Ok(())
    }

    #[test]
    fn iterate_by_reference() {
        let features = FeatureSet::from_points(vec![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let mut xs = Vec::new();
        for [x, _] in &features {
            xs.push(*x);
        }
        assert_eq!(xs, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn empty_channels() {
        let channels = FeatureSet::new().to_channels();
        assert!(channels.is_empty());
        assert_eq!(channels.num_samples(), 0);
        assert_eq!(channels.tx().len(), channels.ty().len());
    }

    #[test]
    fn mismatched_channels() {
        assert_eq!(
            ChannelOutput::from_channels(vec![1.0], vec![]),
            Err(TrackerError::ChannelLengthMismatch { tx: 1, ty: 0 })
        );
    }

    #[test]
    fn from_corners_keeps_order() {
        let corners = vec![
            Corner {
                x: 5.0,
                y: 6.0,
                response: 0.9,
            },
            Corner {
                x: 1.0,
                y: 2.0,
                response: 0.1,
            },
        ];
        let features = FeatureSet::from(corners);
        assert_eq!(features.points(), &[[5.0, 6.0], [1.0, 2.0]]);
    }
}
