use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use crate::config::{MAX_OUTLINE_GROWTH, SUN_RINGS, SUN_SEGMENTS};
use crate::generation::palette::SkyGradient;
use crate::generation::scene::{Star, SunGlow};
use crate::generation::{DrawCommand, Rgb, SpikeTriangle, TreeDrawing};

// linear rgba for the vertex colour attribute
fn linear(colour: Rgb, alpha: f32) -> [f32; 4] {
    let l = Color::srgba(colour.r, colour.g, colour.b, alpha).to_linear();
    [l.red, l.green, l.blue, l.alpha]
}

/// Flat 2D triangle soup with per-vertex colours.
/// Triangles are kept in push order, which is the order they are painted in.
#[derive(Default)]
pub struct MeshBuffers {
    positions: Vec<[f32; 3]>,
    colours: Vec<[f32; 4]>,
    indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn vertex(&mut self, p: Vec2, colour: [f32; 4]) -> u32 {
        let idx = self.positions.len() as u32;
        self.positions.push([p.x, p.y, 0.0]);
        self.colours.push(colour);
        idx
    }

    pub fn push_triangle(&mut self, vertices: [Vec2; 3], colour: [f32; 4]) {
        for v in vertices {
            let idx = self.vertex(v, colour);
            self.indices.push(idx);
        }
    }

    /// Quad with its own colour per corner, corners in order around the edge.
    pub fn push_quad(&mut self, corners: [Vec2; 4], colours: [[f32; 4]; 4]) {
        let base = self.positions.len() as u32;
        for (c, colour) in corners.into_iter().zip(colours) {
            self.vertex(c, colour);
        }
        self.indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn into_mesh(self) -> Mesh {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, self.colours);
        mesh.insert_indices(Indices::U32(self.indices));
        mesh
    }
}

// sky gradient as one horizontal band per pair of colour stops
pub fn sky_mesh(gradient: &SkyGradient, width: f32, height: f32) -> Mesh {
    let mut buffers = MeshBuffers::default();
    let stops = gradient.stops();

    for pair in stops.windows(2) {
        let (t0, top) = pair[0];
        let (t1, bottom) = pair[1];
        // stop 0 is the top edge of the canvas
        let y_top = height * (1.0 - t0);
        let y_bottom = height * (1.0 - t1);
        let (top, bottom) = (linear(top, 1.0), linear(bottom, 1.0));
        buffers.push_quad(
            [
                Vec2::new(0.0, y_bottom),
                Vec2::new(width, y_bottom),
                Vec2::new(width, y_top),
                Vec2::new(0.0, y_top),
            ],
            [bottom, bottom, top, top],
        );
    }

    buffers.into_mesh()
}

// stars as small white diamonds, size is an area
pub fn stars_mesh(stars: &[Star]) -> Mesh {
    let mut buffers = MeshBuffers::default();
    let white = linear(Rgb::WHITE, 1.0);
    for star in stars {
        let r = star.size.sqrt().max(0.3);
        let p = star.position;
        buffers.push_quad(
            [
                p + Vec2::new(0.0, -r),
                p + Vec2::new(r, 0.0),
                p + Vec2::new(0.0, r),
                p + Vec2::new(-r, 0.0),
            ],
            [white; 4],
        );
    }
    buffers.into_mesh()
}

/// Sun glow as concentric rings, alpha sampled from the gaussian at each ring.
pub fn sun_mesh(sun: &SunGlow) -> Mesh {
    let mut buffers = MeshBuffers::default();
    // past 1.5 fwhm the glow is below 0.2% opacity
    let reach = sun.fwhm * 1.5;
    let ring_radius = |k: usize| reach * k as f32 / SUN_RINGS as f32;
    let alpha_at = |r: f32| sun.intensity_at(sun.center + Vec2::new(r, 0.0));

    for k in 0..SUN_RINGS {
        let (r0, r1) = (ring_radius(k), ring_radius(k + 1));
        let (inner, outer) = (linear(sun.colour, alpha_at(r0)), linear(sun.colour, alpha_at(r1)));
        for s in 0..SUN_SEGMENTS {
            let a0 = std::f32::consts::TAU * s as f32 / SUN_SEGMENTS as f32;
            let a1 = std::f32::consts::TAU * (s + 1) as f32 / SUN_SEGMENTS as f32;
            let (d0, d1) = (Vec2::from_angle(a0), Vec2::from_angle(a1));
            buffers.push_quad(
                [
                    sun.center + d0 * r0,
                    sun.center + d0 * r1,
                    sun.center + d1 * r1,
                    sun.center + d1 * r0,
                ],
                [inner, outer, outer, inner],
            );
        }
    }
    buffers.into_mesh()
}

// filled silhouette from the terrain line down to the canvas bottom
pub fn terrain_mesh(points: &[Vec2], colour: Rgb) -> Mesh {
    let mut buffers = MeshBuffers::default();
    let fill = linear(colour, 1.0);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        buffers.push_quad([Vec2::new(a.x, 0.0), Vec2::new(b.x, 0.0), b, a], [fill; 4]);
    }
    buffers.into_mesh()
}

/// Black rim for a spike, the triangle pushed out from its incenter by `edge_width`.
///
/// # Returns
/// `None` for degenerate (zero area) triangles.
pub fn outline_triangle(tri: &SpikeTriangle) -> Option<[Vec2; 3]> {
    let [a, b, c] = tri.vertices;
    let (la, lb, lc) = (b.distance(c), c.distance(a), a.distance(b));
    let perimeter = la + lb + lc;
    let area = (b - a).perp_dot(c - a).abs() / 2.0;
    if perimeter <= f32::EPSILON || area <= f32::EPSILON {
        return None;
    }

    let incenter = (a * la + b * lb + c * lc) / perimeter;
    let inradius = 2.0 * area / perimeter;
    let growth = (tri.edge_width / inradius).min(MAX_OUTLINE_GROWTH);
    Some(tri.vertices.map(|v| incenter + (v - incenter) * (1.0 + growth)))
}

pub fn tree_buffers(drawing: &TreeDrawing) -> MeshBuffers {
    let mut buffers = MeshBuffers::default();
    for command in drawing.paint_order() {
        match command {
            DrawCommand::Rectangle(rect) => {
                let fill = linear(rect.fill, 1.0);
                buffers.push_quad(rect.corners(), [fill; 4]);
            }
            DrawCommand::Polygon(tri) => {
                if tri.edge_width > 0.0 {
                    if let Some(rim) = outline_triangle(tri) {
                        buffers.push_triangle(rim, linear(tri.edge, 1.0));
                    }
                }
                buffers.push_triangle(tri.vertices, linear(tri.fill, 1.0));
            }
        }
    }
    buffers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::palette::sky_gradient;
    use crate::generation::{BranchRect, TreeDrawing};

    fn spike(edge_width: f32) -> SpikeTriangle {
        SpikeTriangle {
            vertices: [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 3.0)],
            fill: Rgb::GREEN,
            edge: Rgb::BLACK,
            edge_width,
            draw_order: 5,
        }
    }

    #[test]
    fn outline_encloses_the_spike() {
        // 3-4-5 triangle, inradius 1, incenter (1, 1)
        let rim = outline_triangle(&spike(0.5)).unwrap();
        assert!((rim[0] - Vec2::new(-0.5, -0.5)).length() < 1e-5);
        assert!((rim[1] - Vec2::new(5.5, -0.5)).length() < 1e-5);

        // growth is capped for thin spikes
        let rim = outline_triangle(&spike(10.0)).unwrap();
        assert!((rim[0] - Vec2::new(1.0 - 1.6, 1.0 - 1.6)).length() < 1e-5);
    }

    #[test]
    fn degenerate_spike_has_no_outline() {
        let mut tri = spike(0.5);
        tri.vertices[2] = Vec2::new(2.0, 0.0);
        assert!(outline_triangle(&tri).is_none());
    }

    #[test]
    fn tree_buffers_follow_paint_order() {
        let rect = BranchRect {
            center: Vec2::new(0.0, 5.0),
            width: 1.0,
            height: 10.0,
            rotation: 0.0,
            fill: Rgb::BROWN,
            draw_order: 6,
        };
        let drawing = TreeDrawing {
            commands: vec![DrawCommand::Rectangle(rect), DrawCommand::Polygon(spike(0.5))],
            segments: Vec::new(),
        };
        let buffers = tree_buffers(&drawing);
        // rim + spike first (order 5), then the two rectangle halves
        assert_eq!(buffers.triangle_count(), 4);
        assert_eq!(buffers.colours[0], linear(Rgb::BLACK, 1.0));
        assert_eq!(buffers.colours[3], linear(Rgb::GREEN, 1.0));
        assert_eq!(buffers.colours[6], linear(Rgb::BROWN, 1.0));
    }

    #[test]
    fn sky_has_one_band_per_stop_pair() {
        let alto = sky_gradient("alto").unwrap();
        let mesh = sky_mesh(alto, 100.0, 50.0);
        assert_eq!(mesh.count_vertices(), 8);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(12));
    }

    #[test]
    fn terrain_strip_reaches_the_bottom() {
        let pts = [Vec2::new(0.0, 10.0), Vec2::new(5.0, 20.0), Vec2::new(10.0, 15.0)];
        let mesh = terrain_mesh(&pts, Rgb::BLACK);
        assert_eq!(mesh.count_vertices(), 8);
    }
}
