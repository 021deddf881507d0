use crate::math::{calculate_light_intensity, edge_function};
use crate::vertex::Vertex;

/// Glyphs from darkest to brightest
const SHADE_RAMP: &[u8] = b".,-~:;=!*#$@";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// One terminal cell of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: Rgb,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        glyph: ' ',
        color: Rgb::WHITE,
    };
}

/// Character framebuffer with a depth buffer. Smaller depth is closer.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    z_buffer: Vec<f64>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
            z_buffer: vec![f64::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Clears to blank cells, resizing if the terminal changed
    pub fn clear(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width * height, Cell::BLANK);
        self.z_buffer.clear();
        self.z_buffer.resize(width * height, f64::INFINITY);
    }

    /// Writes text left to right from `(x, y)`, clipped to the canvas
    pub fn put_str(&mut self, x: usize, y: usize, text: &str, color: Rgb) {
        if y >= self.height {
            return;
        }
        for (i, glyph) in text.chars().enumerate() {
            let column = x + i;
            if column >= self.width {
                break;
            }
            self.cells[y * self.width + column] = Cell { glyph, color };
        }
    }

    fn plot(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[y * self.width + x] = cell;
    }
}

/// Picks the glyph for a light intensity in `[0, 1]`
pub fn shade_glyph(intensity: f64) -> char {
    let last = SHADE_RAMP.len() - 1;
    let index = (intensity.clamp(0.0, 1.0) * last as f64).round() as usize;
    SHADE_RAMP[index.min(last)] as char
}

/// Applies lighting to a color
pub fn apply_lighting(color: Rgb, intensity: f64) -> Rgb {
    let r = (color.r as f64 * intensity).min(255.0) as u8;
    let g = (color.g as f64 * intensity).min(255.0) as u8;
    let b = (color.b as f64 * intensity).min(255.0) as u8;
    Rgb::new(r, g, b)
}

/// Draws a triangle with per-pixel lighting. Either winding is filled.
pub fn draw_triangle(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    canvas: &mut Canvas,
    light_pos_world: &[f64; 3],
    base_color: Rgb,
) {
    let width = canvas.width;
    let height = canvas.height;
    if width == 0 || height == 0 {
        return;
    }

    // Compute bounding box of the triangle
    let min_x = v0
        .screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0);
    let max_x = v0
        .screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(width as f64 - 1.0);
    let min_y = v0
        .screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0);
    let max_y = v0
        .screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(height as f64 - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }

    // Precompute area of the triangle
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area == 0.0 {
        return;
    }

    // For each pixel in the bounding box
    for y in min_y as usize..=max_y as usize {
        for x in min_x as usize..=max_x as usize {
            let p = [x as f64 + 0.5, y as f64 + 0.5];

            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;

            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            // Interpolate position
            let px3d = v0.position[0] * w0 + v1.position[0] * w1 + v2.position[0] * w2;
            let py3d = v0.position[1] * w0 + v1.position[1] * w1 + v2.position[1] * w2;
            let pz3d = v0.position[2] * w0 + v1.position[2] * w1 + v2.position[2] * w2;

            // Depth test
            let offset = y * width + x;
            if pz3d >= canvas.z_buffer[offset] {
                continue;
            }
            canvas.z_buffer[offset] = pz3d;

            // Interpolate normal
            let nx = v0.normal[0] * w0 + v1.normal[0] * w1 + v2.normal[0] * w2;
            let ny = v0.normal[1] * w0 + v1.normal[1] * w1 + v2.normal[1] * w2;
            let nz = v0.normal[2] * w0 + v1.normal[2] * w1 + v2.normal[2] * w2;
            let length = (nx * nx + ny * ny + nz * nz).sqrt().max(f64::EPSILON);
            let interpolated_normal = [nx / length, ny / length, nz / length];

            let light_intensity = calculate_light_intensity(
                &interpolated_normal,
                &[px3d, py3d, pz3d],
                light_pos_world,
            );

            canvas.plot(
                x,
                y,
                Cell {
                    glyph: shade_glyph(light_intensity),
                    color: apply_lighting(base_color, light_intensity),
                },
            );
        }
    }
}

/// Draws a line between two points on the canvas using Bresenham's algorithm
pub fn draw_line(x0: f64, y0: f64, x1: f64, y1: f64, canvas: &mut Canvas, color: Rgb) {
    let (mut x0, mut y0, x1, y1) = (
        x0.round() as isize,
        y0.round() as isize,
        x1.round() as isize,
        y1.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy
    let glyph = if dx >= -dy * 2 {
        '-'
    } else if -dy >= dx * 2 {
        '|'
    } else {
        '+'
    };

    loop {
        if x0 >= 0 && x0 < canvas.width as isize && y0 >= 0 && y0 < canvas.height as isize {
            canvas.plot(x0 as usize, y0 as usize, Cell { glyph, color });
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
