use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

use crate::config::Theme;
use crate::graphics::{draw_line, draw_triangle, Canvas, Rgb};
use crate::math::{calculate_normal, euler_rotation, multiply_matrix_vector};
use crate::model::Mesh;
use crate::physics::Vec2;
use crate::pose::ObjectTransform;
use crate::vertex::Vertex;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 0.5;

/// Light source position in world space, up and to the left of the viewer
const LIGHT_POSITION: [f64; 3] = [-4.0, 6.0, -12.0];

/// Draws the logo mesh into a character canvas
pub struct Renderer {
    mesh: Mesh,
    edges: Vec<(usize, usize)>,
    canvas: Canvas,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        let mesh = Mesh::logo(theme);
        let edges = mesh.edges();
        Renderer {
            mesh,
            edges,
            canvas: Canvas::new(0, 0),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Clears the canvas to `width` x `height` cells and draws the logo
    pub fn draw(
        &mut self,
        transform: &ObjectTransform,
        bounds: Vec2,
        width: usize,
        height: usize,
        wireframe: bool,
    ) {
        self.canvas.clear(width, height);
        if width == 0 || height == 0 {
            return;
        }
        let vertices = self.project(transform, bounds, width, height);

        if wireframe {
            for &(start, end) in &self.edges {
                let v0 = &vertices[start];
                let v1 = &vertices[end];
                draw_line(
                    v0.screen_position[0],
                    v0.screen_position[1],
                    v1.screen_position[0],
                    v1.screen_position[1],
                    &mut self.canvas,
                    Rgb::WHITE,
                );
            }
            return;
        }

        for face in &self.mesh.faces {
            let [a, b, c, d] = face.indices;
            let mut normal = calculate_normal(
                &vertices[a].position,
                &vertices[b].position,
                &vertices[c].position,
            );
            // faces are two-sided: light whichever side points at the viewer
            if normal[2] > 0.0 {
                normal = [-normal[0], -normal[1], -normal[2]];
            }
            let corner = |i: usize| Vertex {
                normal,
                ..vertices[i]
            };
            let (va, vb, vc, vd) = (corner(a), corner(b), corner(c), corner(d));
            // Triangle 1: a, b, c
            draw_triangle(&va, &vb, &vc, &mut self.canvas, &LIGHT_POSITION, face.color);
            // Triangle 2: a, c, d
            draw_triangle(&va, &vc, &vd, &mut self.canvas, &LIGHT_POSITION, face.color);
        }
    }

    /// Transforms the mesh into world space and projects it onto the canvas.
    /// The canvas spans the roaming bounds plus the logo's radius.
    fn project(
        &self,
        transform: &ObjectTransform,
        bounds: Vec2,
        width: usize,
        height: usize,
    ) -> Vec<Vertex> {
        let scale = screen_scale(bounds, self.mesh.radius, width, height);
        let center = [width as f64 / 2.0, height as f64 / 2.0];
        let rotation = euler_rotation(&transform.rotation);

        self.mesh
            .vertices
            .iter()
            .map(|v| {
                let scaled = [
                    v[0] * transform.scale,
                    v[1] * transform.scale,
                    v[2] * transform.scale,
                ];
                let rotated = multiply_matrix_vector(&rotation, &scaled);
                let position = [
                    rotated[0] + transform.translation[0],
                    rotated[1] + transform.translation[1],
                    rotated[2] + transform.translation[2],
                ];
                Vertex {
                    position,
                    screen_position: [
                        center[0] + position[0] * scale,
                        center[1] - position[1] * scale * CELL_ASPECT,
                    ],
                    normal: [0.0, 0.0, -1.0],
                }
            })
            .collect()
    }
}

/// Columns per scene unit such that the whole roaming area fits
pub fn screen_scale(bounds: Vec2, radius: f64, width: usize, height: usize) -> f64 {
    let horizontal = width as f64 / (2.0 * (bounds.x + radius));
    let vertical = height as f64 / (2.0 * (bounds.y + radius) * CELL_ASPECT);
    horizontal.min(vertical)
}

/// Writes the canvas to the terminal, top left aligned
pub fn present<W: Write>(out: &mut W, canvas: &Canvas) -> io::Result<()> {
    let mut current: Option<Rgb> = None;
    for (y, row) in canvas.rows().enumerate().take(canvas.height()) {
        queue!(out, MoveTo(0, y as u16))?;
        for cell in row {
            if cell.glyph != ' ' && current != Some(cell.color) {
                let Rgb { r, g, b } = cell.color;
                queue!(out, SetForegroundColor(Color::Rgb { r, g, b }))?;
                current = Some(cell.color);
            }
            queue!(out, Print(cell.glyph))?;
        }
    }
    queue!(out, ResetColor)?;
    out.flush()
}
