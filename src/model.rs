//! The studio logo as a mesh: a record with a center label.

use std::f64::consts::TAU;

use crate::config::Theme;
use crate::graphics::Rgb;

const SEGMENTS: usize = 24;
const HOLE_RADIUS: f64 = 0.25;
const LABEL_RADIUS: f64 = 0.7;
pub const OUTER_RADIUS: f64 = 1.6;
const HALF_THICKNESS: f64 = 0.12;

/// Colors a theme paints the logo with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub label: Rgb,
    pub groove: Rgb,
    pub groove_alt: Rgb,
    pub rim: Rgb,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                label: Rgb::new(230, 180, 60),
                groove: Rgb::new(90, 90, 105),
                groove_alt: Rgb::new(130, 130, 150),
                rim: Rgb::new(70, 70, 80),
            },
            Theme::Light => Palette {
                label: Rgb::new(210, 50, 70),
                groove: Rgb::new(225, 225, 232),
                groove_alt: Rgb::new(190, 190, 205),
                rim: Rgb::new(170, 170, 185),
            },
        }
    }
}

/// Quad face: four vertex indices in order around the face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub indices: [usize; 4],
    pub color: Rgb,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<Face>,
    /// Distance from the origin to the farthest vertex in the xy plane
    pub radius: f64,
}

impl Mesh {
    /// Builds the record, lying in the xy plane and facing -z
    pub fn logo(theme: Theme) -> Self {
        let palette = Palette::for_theme(theme);
        let radii = [HOLE_RADIUS, LABEL_RADIUS, OUTER_RADIUS];
        let sides = [-HALF_THICKNESS, HALF_THICKNESS];

        let mut vertices = Vec::with_capacity(radii.len() * sides.len() * SEGMENTS);
        for radius in radii {
            for z in sides {
                for i in 0..SEGMENTS {
                    let (sin, cos) = (TAU * i as f64 / SEGMENTS as f64).sin_cos();
                    vertices.push([radius * cos, radius * sin, z]);
                }
            }
        }

        let index = |ring: usize, side: usize, i: usize| (ring * 2 + side) * SEGMENTS + i % SEGMENTS;

        let mut faces = Vec::with_capacity(SEGMENTS * 6);
        for i in 0..SEGMENTS {
            let j = i + 1;
            let groove = if i % 2 == 0 {
                palette.groove
            } else {
                palette.groove_alt
            };
            for side in 0..2 {
                faces.push(Face {
                    indices: [index(0, side, i), index(1, side, i), index(1, side, j), index(0, side, j)],
                    color: palette.label,
                });
                faces.push(Face {
                    indices: [index(1, side, i), index(2, side, i), index(2, side, j), index(1, side, j)],
                    color: groove,
                });
            }
            for ring in [0, 2] {
                faces.push(Face {
                    indices: [index(ring, 0, i), index(ring, 1, i), index(ring, 1, j), index(ring, 0, j)],
                    color: palette.rim,
                });
            }
        }

        Mesh {
            vertices,
            faces,
            radius: OUTER_RADIUS,
        }
    }

    /// Unique undirected edges of all faces
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .faces
            .iter()
            .flat_map(|face| {
                let [a, b, c, d] = face.indices;
                [(a, b), (b, c), (c, d), (d, a)]
            })
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }
}
