use featrack_image::{Image, ImageError};

use super::{corner_response, CornerResponse};

/// A detected corner with its position and response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// The x-coordinate of the corner in the image.
    pub x: f32,
    /// The y-coordinate of the corner in the image.
    pub y: f32,
    /// The corner strength at that position.
    pub response: f32,
}

/// Parameters of [`good_features_to_track`].
#[derive(Debug, Clone, PartialEq)]
pub struct GoodFeaturesParams {
    /// Maximum number of corners to return. Zero returns no corners.
    pub max_corners: usize,
    /// Fraction of the strongest response a corner must exceed.
    pub quality_level: f32,
    /// Minimum euclidean distance between returned corners.
    pub min_distance: f32,
    /// Side of the window used to average the structure tensor.
    pub block_size: usize,
    /// The corner strength measure.
    pub response: CornerResponse,
}

impl Default for GoodFeaturesParams {
    fn default() -> Self {
        Self {
            max_corners: 25,
            quality_level: 0.01,
            min_distance: 10.0,
            block_size: 3,
            response: CornerResponse::MinEigenValue,
        }
    }
}

/// Find the strongest corners of an image.
///
/// The corner response is computed at every pixel and values not above
/// `quality_level` times the strongest response are discarded. The remaining
/// local maxima of their 3x3 neighbourhood (image border excluded) are sorted by
/// decreasing response, keeping raster order among equal responses. Corners are
/// then accepted greedily, skipping any candidate closer than `min_distance` to
/// an already accepted one, until `max_corners` are found.
///
/// # Arguments
///
/// * `src` - The source gray8 image.
/// * `params` - The detector parameters.
///
/// # Returns
///
/// The accepted corners, strongest first.
pub fn good_features_to_track(
    src: &Image<u8, 1>,
    params: &GoodFeaturesParams,
) -> Result<Vec<Corner>, ImageError> {
    if params.max_corners == 0 || src.cols() < 3 || src.rows() < 3 {
        return Ok(Vec::new());
    }

    let src_f32 = src.cast_and_scale::<f32>(1.0 / 255.0)?;
    let mut response = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    corner_response(&src_f32, &mut response, params.block_size, params.response)?;

    let candidates = find_candidates(&response, params.quality_level);
    log::debug!(
        "good_features_to_track: {} candidates on a {}x{} image",
        candidates.len(),
        src.cols(),
        src.rows()
    );

    Ok(select_corners(
        candidates,
        src.cols(),
        src.rows(),
        params.max_corners,
        params.min_distance,
    ))
}

// local maxima above the quality threshold, sorted by decreasing response
fn find_candidates(response: &Image<f32, 1>, quality_level: f32) -> Vec<Corner> {
    let (rows, cols) = (response.rows(), response.cols());
    let data = response.as_slice();

    let max_val = data.iter().copied().fold(f32::MIN, f32::max);
    let threshold = max_val * quality_level;

    let mut candidates = Vec::new();
    for y in 1..rows - 1 {
        for x in 1..cols - 1 {
            let val = data[y * cols + x];
            if val <= threshold || val <= 0.0 {
                continue;
            }

            let is_max = (y - 1..=y + 1)
                .flat_map(|ny| (x - 1..=x + 1).map(move |nx| data[ny * cols + nx]))
                .all(|n| n <= val);

            if is_max {
                candidates.push(Corner {
                    x: x as f32,
                    y: y as f32,
                    response: val,
                });
            }
        }
    }

    // stable: equal responses keep their raster order
    candidates.sort_by(|a, b| b.response.total_cmp(&a.response));
    candidates
}

fn select_corners(
    candidates: Vec<Corner>,
    cols: usize,
    rows: usize,
    max_corners: usize,
    min_distance: f32,
) -> Vec<Corner> {
    if min_distance < 1.0 {
        // distinct pixels are always at least one pixel apart
        return candidates.into_iter().take(max_corners).collect();
    }

    let cell_size = min_distance.ceil() as usize;
    let grid_cols = cols.div_ceil(cell_size);
    let grid_rows = rows.div_ceil(cell_size);
    let mut grid: Vec<Vec<Corner>> = vec![Vec::new(); grid_cols * grid_rows];
    let min_distance_sq = min_distance * min_distance;

    let mut corners = Vec::with_capacity(max_corners.min(candidates.len()));
    for candidate in candidates {
        let cx = candidate.x as usize / cell_size;
        let cy = candidate.y as usize / cell_size;

        let too_close = (cy.saturating_sub(1)..=(cy + 1).min(grid_rows - 1))
            .flat_map(|gy| {
                (cx.saturating_sub(1)..=(cx + 1).min(grid_cols - 1)).map(move |gx| gy * grid_cols + gx)
            })
            .flat_map(|cell| grid[cell].iter())
            .any(|c| {
                let dx = c.x - candidate.x;
                let dy = c.y - candidate.y;
                dx * dx + dy * dy < min_distance_sq
            });

        if too_close {
            continue;
        }

        grid[cy * grid_cols + cx].push(candidate);
        corners.push(candidate);
        if corners.len() == max_corners {
            break;
        }
    }

    corners
}
