// spike (leaf) fields laid along one branch segment

use bevy::math::Vec2;

use super::SpikeTriangle;
use super::colour::{Rgb, darken_opt, jitter_many};
use super::rng::RandomStream;
use crate::config::MAX_SPIKES_PER_FIELD;
use crate::error::{GenError, GenResult, check_positive, check_range, invalid};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpikeDirection {
    /// Tips point away from the pivot, along the branch.
    Forward,
    /// Tips point back towards the trunk.
    Backward,
}

impl SpikeDirection {
    pub fn sign(self) -> f32 {
        match self {
            SpikeDirection::Forward => 1.0,
            SpikeDirection::Backward => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpikeLayout {
    /// `nx × ny` grid over the field rectangle.
    Regular { density_x: f32, density_y: f32 },
    /// Uniform random positions, count scaled by `density`.
    Random { density: f32 },
}

/// Look of one spike field. Widths and lengths are proportions of the parent branch width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpikeFieldParams {
    pub direction: SpikeDirection,
    pub colour: Rgb,
    pub edge_colour: Rgb,
    pub edge_width: f32,
    pub colour_jitter: f32,
    pub spike_width: f32,
    pub spike_length: f32,
    pub spike_jitter: f32,
    pub layout: SpikeLayout,
    /// Tip deflection in degrees at the field edges.
    pub max_angle: f32,
}

impl SpikeFieldParams {
    /// Live green leaves at branch tips.
    pub const fn green_forward() -> Self {
        Self {
            direction: SpikeDirection::Forward,
            colour: Rgb::GREEN,
            edge_colour: Rgb::BLACK,
            edge_width: 0.5,
            colour_jitter: 0.1,
            spike_width: 0.3,
            spike_length: 2.0,
            spike_jitter: 0.5,
            layout: SpikeLayout::Regular { density_x: 3.0, density_y: 3.0 },
            max_angle: 40.0,
        }
    }

    /// Dying green-yellow leaves just below the tips.
    pub const fn yellow_mid() -> Self {
        Self {
            direction: SpikeDirection::Backward,
            colour: Rgb::GREEN_YELLOW,
            layout: SpikeLayout::Regular { density_x: 3.0, density_y: 6.0 },
            max_angle: 70.0,
            ..Self::green_forward()
        }
    }

    /// Dead brown spikes covering the branches.
    pub const fn brown_back() -> Self {
        Self {
            direction: SpikeDirection::Backward,
            colour: Rgb::BROWN,
            layout: SpikeLayout::Regular { density_x: 3.0, density_y: 6.0 },
            max_angle: 15.0,
            ..Self::green_forward()
        }
    }

    pub fn with_layout(mut self, layout: SpikeLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn validate(&self) -> GenResult<()> {
        self.colour.validate("colour")?;
        self.edge_colour.validate("edge_colour")?;
        check_positive("spike_width", self.spike_width)?;
        check_positive("spike_length", self.spike_length)?;
        check_range("colour_jitter", self.colour_jitter, 0.0, 1.0)?;
        check_range("spike_jitter", self.spike_jitter, 0.0, f32::MAX)?;
        check_range("edge_width", self.edge_width, 0.0, f32::MAX)?;
        check_range("max_angle", self.max_angle, -360.0, 360.0)?;
        match self.layout {
            SpikeLayout::Regular { density_x, density_y } => {
                check_positive("density_x", density_x)?;
                check_positive("density_y", density_y)?;
            }
            SpikeLayout::Random { density } => check_range("density", density, 0.0, f32::MAX)?,
        }
        Ok(())
    }

    /// Number of spikes this field produces over a `width × length` rectangle.
    pub fn count(&self, width: f32, length: f32) -> GenResult<usize> {
        check_geometry(width, length)?;
        let n = match self.layout {
            SpikeLayout::Regular { density_x, density_y } => {
                let (nx, ny) = self.grid_size(width, length, density_x, density_y);
                nx * ny
            }
            SpikeLayout::Random { density } => {
                let (w, l) = (width as f64, length as f64);
                let per_spike = 0.5 * self.spike_width as f64 * w * self.spike_length as f64 * w;
                (w * l / per_spike * density as f64).round()
            }
        };
        if !n.is_finite() || n > MAX_SPIKES_PER_FIELD as f64 {
            return Err(invalid("spike_count", n as f32, "above per-field ceiling"));
        }
        Ok(n as usize)
    }

    fn grid_size(&self, width: f32, length: f32, density_x: f32, density_y: f32) -> (f64, f64) {
        let sw = self.spike_width as f64;
        let sl = self.spike_length as f64;
        let nx = ceil_count(density_x as f64 / sw);
        let ny = ceil_count(density_y as f64 / (sl * width as f64 / length as f64));
        (nx, ny)
    }
}

// f32 inputs like 0.3 are not exact, snap near-integers before taking the ceiling
fn ceil_count(x: f64) -> f64 {
    let nearest = x.round();
    if (x - nearest).abs() < 1e-6 * nearest.max(1.0) { nearest } else { x.ceil() }
}

fn check_geometry(width: f32, length: f32) -> GenResult<()> {
    if !(width.is_finite() && length.is_finite()) || width <= 0.0 || length <= 0.0 {
        return Err(GenError::InvalidGeometry { width, length });
    }
    Ok(())
}

/// Where a field sits on its branch.
///
/// The local frame has its origin at `pivot` with +y along the branch axis. The field
/// covers `x ∈ [-w/2, w/2]`, `y ∈ [offset, offset + length]` and is mapped to the
/// canvas by rotating `rotation` radians counter-clockwise about the pivot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldFrame {
    pub pivot: Vec2,
    pub rotation: f32,
    pub offset: f32,
}

impl FieldFrame {
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.pivot + Vec2::from_angle(self.rotation).rotate(local)
    }
}

fn linspace(start: f32, end: f32, n: usize) -> impl Iterator<Item = f32> {
    let step = if n > 1 { (end - start) / (n - 1) as f32 } else { 0.0 };
    (0..n).map(move |i| start + step * i as f32)
}

/// Builds one spike field.
///
/// Random draws happen in a fixed order: positions (random layout, x then y per
/// spike), left base jitter for every spike, right base jitter, tip x jitter,
/// tip y jitter, then three colour channels per spike.
///
/// # Returns
/// Triangles in paint order, every one carrying `draw_order`.
pub fn synthesize_spikes(
    frame: &FieldFrame,
    width: f32,
    length: f32,
    params: &SpikeFieldParams,
    darken: Option<f32>,
    draw_order: u32,
    rng: &mut RandomStream,
) -> GenResult<Vec<SpikeTriangle>> {
    params.validate()?;
    if let Some(amount) = darken {
        check_range("darken", amount, -1.0, 1.0)?;
    }
    let n = params.count(width, length)?;

    let half = width / 2.0;
    let (y0, y1) = (frame.offset, frame.offset + length);

    let bases: Vec<Vec2> = match params.layout {
        SpikeLayout::Regular { density_x, density_y } => {
            let (nx, ny) = params.grid_size(width, length, density_x, density_y);
            let (nx, ny) = (nx as usize, ny as usize);
            let mut grid = Vec::with_capacity(n);
            for y in linspace(y0, y1, ny) {
                for x in linspace(-half, half, nx) {
                    grid.push(Vec2::new(x, y));
                }
            }
            grid
        }
        SpikeLayout::Random { .. } => (0..n)
            .map(|_| {
                let x = -half + rng.uniform() * width;
                let y = y0 + rng.uniform() * length;
                Vec2::new(x, y)
            })
            .collect(),
    };

    let jitter = params.spike_jitter;
    let base_half = params.spike_width * width / 2.0;
    let left = rng.uniform_vec(n);
    let right = rng.uniform_vec(n);
    let tip_x = rng.uniform_vec(n);
    let tip_y = rng.uniform_vec(n);

    let dir = params.direction.sign();
    let reach = params.spike_length * width;
    let tip_wobble = jitter * params.spike_width * width;

    let mut local: Vec<[Vec2; 3]> = Vec::with_capacity(n);
    for (i, p) in bases.iter().enumerate() {
        let v1 = *p - Vec2::new((1.0 + (left[i] - 0.5) * jitter) * base_half, 0.0);
        let v2 = *p + Vec2::new((1.0 + (right[i] - 0.5) * jitter) * base_half, 0.0);

        // deflection grows linearly with signed distance from the axis
        let edge = (v1.x + v2.x) / 2.0 / half;
        let angle = (dir * params.max_angle * edge).to_radians();
        let mut tip = *p + dir * reach * Vec2::new(angle.sin(), angle.cos());
        tip.x += (tip_x[i] - 0.5) * tip_wobble;
        tip.y += (tip_y[i] - 0.5) * tip_wobble * 2.0;

        local.push([v1, v2, tip]);
    }

    // base row order, trunk side first
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| local[a][0].y.total_cmp(&local[b][0].y));
    if params.direction == SpikeDirection::Forward {
        order.reverse();
    }

    let fills = jitter_many(darken_opt(params.colour, darken), params.colour_jitter, n, rng)?;

    Ok(order
        .into_iter()
        .zip(fills)
        .map(|(i, fill)| SpikeTriangle {
            vertices: local[i].map(|v| frame.to_world(v)),
            fill,
            edge: params.edge_colour,
            edge_width: params.edge_width,
            draw_order,
        })
        .collect())
}
