use featrack_image::{Image, ImageError};
use rayon::prelude::*;

use crate::{filter::spatial_gradient, interpolation::bilinear_interpolation, pyramid::build_pyramid};

// square of the factor between unit range and 0..255 intensities
const GRAY_SCALE_SQ: f32 = 255.0 * 255.0;

/// Termination criteria of the iterative refinement at each pyramid level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermCriteria {
    /// Maximum number of iterations.
    pub max_count: usize,
    /// The refinement stops once the update is shorter than this, in pixels.
    pub epsilon: f32,
}

impl Default for TermCriteria {
    fn default() -> Self {
        Self {
            max_count: 10,
            epsilon: 0.03,
        }
    }
}

/// Parameters of [`calc_optical_flow_pyr_lk`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LkParams {
    /// Side of the square search window at each level.
    pub win_size: usize,
    /// Highest pyramid level, 0 tracks on the full resolution image only.
    pub max_level: usize,
    /// Termination criteria of the per level refinement.
    pub criteria: TermCriteria,
    /// Points whose averaged gradient matrix has a smaller minimum eigenvalue are dropped.
    ///
    /// The eigenvalue is measured on 0..255 intensities, so `1e-4` only rejects
    /// windows with almost no texture.
    pub min_eig_threshold: f32,
}

impl Default for LkParams {
    fn default() -> Self {
        Self {
            win_size: 15,
            max_level: 2,
            criteria: TermCriteria::default(),
            min_eig_threshold: 1e-4,
        }
    }
}

/// Output of [`calc_optical_flow_pyr_lk`], one entry per input point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PyrLkResult {
    /// Estimated positions in the next image. Lost points keep their input position.
    pub next_pts: Vec<[f32; 2]>,
    /// Whether the flow for the point was found.
    pub status: Vec<bool>,
    /// Mean absolute intensity difference over the window, in 0..255 units.
    pub error: Vec<f32>,
}

impl PyrLkResult {
    /// Number of points successfully tracked.
    pub fn num_tracked(&self) -> usize {
        self.status.iter().filter(|&&s| s).count()
    }
}

// one level of the previous image with its derivatives
struct GradientLevel {
    image: Image<f32, 1>,
    grad_x: Image<f32, 1>,
    grad_y: Image<f32, 1>,
}

impl GradientLevel {
    fn new(image: Image<f32, 1>) -> Result<Self, ImageError> {
        let mut grad_x = Image::from_size_val(image.size(), 0.0)?;
        let mut grad_y = Image::from_size_val(image.size(), 0.0)?;
        spatial_gradient(&image, &mut grad_x, &mut grad_y)?;
        Ok(Self {
            image,
            grad_x,
            grad_y,
        })
    }
}

enum LevelOutcome {
    Tracked([f32; 2]),
    Skipped,
    Lost,
}

/// Track sparse points between two images with the pyramidal Lucas-Kanade method.
///
/// Both images are converted to `[0, 1]` floats and downsampled into pyramids with
/// at most `max_level + 1` levels. Each point is refined from the coarsest level
/// to the finest, the estimate at one level seeding the next one.
///
/// A point is reported lost when its gradient matrix is too weak at the finest
/// level, when it leaves the image during the refinement or when the estimate
/// stops being finite.
///
/// # Arguments
///
/// * `prev` - The first gray8 image.
/// * `next` - The second gray8 image, with the same size as `prev`.
/// * `prev_pts` - The `[x, y]` points to track, in `prev` pixel coordinates.
/// * `params` - The tracker parameters.
///
/// # Returns
///
/// The tracked positions, status and error for every input point, in input order.
pub fn calc_optical_flow_pyr_lk(
    prev: &Image<u8, 1>,
    next: &Image<u8, 1>,
    prev_pts: &[[f32; 2]],
    params: &LkParams,
) -> Result<PyrLkResult, ImageError> {
    if prev.size() != next.size() {
        return Err(ImageError::InvalidImageSize(
            prev.cols(),
            prev.rows(),
            next.cols(),
            next.rows(),
        ));
    }

    if prev_pts.is_empty() {
        return Ok(PyrLkResult::default());
    }

    let min_size = params.win_size.max(1);
    let prev_pyramid = build_pyramid(&prev.cast_and_scale::<f32>(1.0 / 255.0)?, params.max_level, min_size)?
        .into_iter()
        .map(GradientLevel::new)
        .collect::<Result<Vec<_>, _>>()?;
    let next_pyramid = build_pyramid(&next.cast_and_scale::<f32>(1.0 / 255.0)?, params.max_level, min_size)?;

    let tracked = prev_pts
        .par_iter()
        .map(|&pt| track_point(&prev_pyramid, &next_pyramid, pt, params))
        .collect::<Vec<_>>();

    let mut result = PyrLkResult {
        next_pts: Vec::with_capacity(prev_pts.len()),
        status: Vec::with_capacity(prev_pts.len()),
        error: Vec::with_capacity(prev_pts.len()),
    };
    for (&pt, outcome) in prev_pts.iter().zip(tracked) {
        match outcome {
            Some((next_pt, err)) => {
                result.next_pts.push(next_pt);
                result.status.push(true);
                result.error.push(err);
            }
            None => {
                result.next_pts.push(pt);
                result.status.push(false);
                result.error.push(0.0);
            }
        }
    }

    log::debug!(
        "calc_optical_flow_pyr_lk: tracked {}/{} points over {} levels",
        result.num_tracked(),
        prev_pts.len(),
        prev_pyramid.len()
    );

    Ok(result)
}

fn track_point(
    prev_pyramid: &[GradientLevel],
    next_pyramid: &[Image<f32, 1>],
    pt: [f32; 2],
    params: &LkParams,
) -> Option<([f32; 2], f32)> {
    if !pt[0].is_finite() || !pt[1].is_finite() {
        return None;
    }

    let mut guess: Option<[f32; 2]> = None;
    for (level, (prev, next)) in prev_pyramid.iter().zip(next_pyramid).enumerate().rev() {
        let scale = (1u32 << level) as f32;
        let prev_pt = [pt[0] / scale, pt[1] / scale];
        let next_pt = guess.map_or(prev_pt, |g| [g[0] * 2.0, g[1] * 2.0]);

        match track_level(prev, next, prev_pt, next_pt, params) {
            LevelOutcome::Tracked(p) => guess = Some(p),
            LevelOutcome::Skipped if level > 0 => guess = Some(next_pt),
            LevelOutcome::Skipped | LevelOutcome::Lost => return None,
        }
    }

    let next_pt = guess?;
    let prev = prev_pyramid.first()?;
    let next = next_pyramid.first()?;
    Some((next_pt, window_error(prev, next, pt, next_pt, params.win_size)))
}

fn track_level(
    prev: &GradientLevel,
    next: &Image<f32, 1>,
    prev_pt: [f32; 2],
    mut next_pt: [f32; 2],
    params: &LkParams,
) -> LevelOutcome {
    if !inside(&prev.image, prev_pt) {
        return LevelOutcome::Skipped;
    }

    let half = (params.win_size / 2) as isize;
    let offsets = (-half..=half)
        .flat_map(|dy| (-half..=half).map(move |dx| (dx as f32, dy as f32)))
        .collect::<Vec<_>>();

    // template intensities and gradients, fixed for every iteration
    let (mut gxx, mut gxy, mut gyy) = (0.0f32, 0.0f32, 0.0f32);
    let template = offsets
        .iter()
        .map(|&(dx, dy)| {
            let (u, v) = (prev_pt[0] + dx, prev_pt[1] + dy);
            let ix = bilinear_interpolation(&prev.grad_x, u, v);
            let iy = bilinear_interpolation(&prev.grad_y, u, v);
            gxx += ix * ix;
            gxy += ix * iy;
            gyy += iy * iy;
            (bilinear_interpolation(&prev.image, u, v), ix, iy)
        })
        .collect::<Vec<_>>();

    let det = gxx * gyy - gxy * gxy;
    let min_eig = (gxx + gyy - ((gxx - gyy) * (gxx - gyy) + 4.0 * gxy * gxy).sqrt())
        / (2.0 * offsets.len() as f32);
    // the gate works on gradients of 0..255 intensities
    let min_eig_255 = min_eig * GRAY_SCALE_SQ;
    let det_255 = det * GRAY_SCALE_SQ * GRAY_SCALE_SQ;
    if min_eig_255 < params.min_eig_threshold || det_255 < f32::EPSILON {
        return LevelOutcome::Skipped;
    }
    let inv_det = 1.0 / det;

    let epsilon_sq = params.criteria.epsilon * params.criteria.epsilon;
    let mut prev_delta = [0.0f32; 2];
    for iteration in 0..params.criteria.max_count {
        if !next_pt[0].is_finite() || !next_pt[1].is_finite() || !inside(next, next_pt) {
            return LevelOutcome::Lost;
        }

        let (mut bx, mut by) = (0.0f32, 0.0f32);
        for (&(dx, dy), &(ival, ix, iy)) in offsets.iter().zip(&template) {
            let jval = bilinear_interpolation(next, next_pt[0] + dx, next_pt[1] + dy);
            let diff = jval - ival;
            bx += diff * ix;
            by += diff * iy;
        }

        let delta = [
            (gxy * by - gyy * bx) * inv_det,
            (gxy * bx - gxx * by) * inv_det,
        ];
        next_pt[0] += delta[0];
        next_pt[1] += delta[1];

        if delta[0] * delta[0] + delta[1] * delta[1] <= epsilon_sq {
            break;
        }

        // the update bounces between two positions, settle in the middle
        if iteration > 0
            && (delta[0] + prev_delta[0]).abs() < 0.01
            && (delta[1] + prev_delta[1]).abs() < 0.01
        {
            next_pt[0] -= delta[0] * 0.5;
            next_pt[1] -= delta[1] * 0.5;
            break;
        }
        prev_delta = delta;
    }

    if !next_pt[0].is_finite() || !next_pt[1].is_finite() || !inside(next, next_pt) {
        return LevelOutcome::Lost;
    }

    LevelOutcome::Tracked(next_pt)
}

fn window_error(
    prev: &GradientLevel,
    next: &Image<f32, 1>,
    prev_pt: [f32; 2],
    next_pt: [f32; 2],
    win_size: usize,
) -> f32 {
    let half = (win_size / 2) as isize;
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for dy in -half..=half {
        for dx in -half..=half {
            let (dx, dy) = (dx as f32, dy as f32);
            let ival = bilinear_interpolation(&prev.image, prev_pt[0] + dx, prev_pt[1] + dy);
            let jval = bilinear_interpolation(next, next_pt[0] + dx, next_pt[1] + dy);
            sum += (jval - ival).abs();
            count += 1;
        }
    }
    255.0 * sum / count.max(1) as f32
}

fn inside(image: &Image<f32, 1>, pt: [f32; 2]) -> bool {
    pt[0] >= 0.0
        && pt[1] >= 0.0
        && pt[0] <= (image.cols() - 1) as f32
        && pt[1] <= (image.rows() - 1) as f32
}
