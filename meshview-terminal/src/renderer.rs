/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use meshview_core::pick::polygon_contains;
use meshview_core::{Mesh, Projector, Selection, ViewState};
use nalgebra::Point2;
use std::io::Write;

/// Screen units covered by one terminal column
pub const CELL_WIDTH: f64 = 1.0;
/// Screen units covered by one terminal row; cells are about twice as tall as wide
pub const CELL_HEIGHT: f64 = 2.0;

const FACE_FILL: char = '.';
const SELECTED_FACE_FILL: char = ':';
const VERTEX_MARK: char = 'o';
const SELECTED_VERTEX_MARK: char = '@';

/// Centre of a terminal cell in screen units relative to the viewport centre
pub fn cell_to_screen(col: u16, row: u16, width: usize, height: usize) -> Point2<f64> {
    Point2::new(
        (f64::from(col) + 0.5 - width as f64 / 2.0) * CELL_WIDTH,
        (f64::from(row) + 0.5 - height as f64 / 2.0) * CELL_HEIGHT,
    )
}

/// Terminal cell containing a screen point, if it is on screen
pub fn screen_to_cell(point: Point2<f64>, width: usize, height: usize) -> Option<(usize, usize)> {
    let col = (point.x / CELL_WIDTH + width as f64 / 2.0).floor();
    let row = (point.y / CELL_HEIGHT + height as f64 / 2.0).floor();
    if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
        return None;
    }
    let (col, row) = (col as usize, row as usize);
    (col < width && row < height).then_some((col, row))
}

/// Line glyph for an edge direction given in cell steps
fn edge_glyph(dx: f64, dy: f64) -> char {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ay * 2.0 < ax {
        '-'
    } else if ax * 2.0 < ay {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// ASCII renderer that draws a mesh as filled faces, outlines, and vertex marks
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<char> {
        (col < self.width && row < self.height).then(|| self.char_buffer[row * self.width + col])
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    fn put(&mut self, col: usize, row: usize, c: char, color: Color) {
        let idx = row * self.width + col;
        self.char_buffer[idx] = c;
        self.color_buffer[idx] = color;
    }

    pub fn render_mesh(&mut self, mesh: &Mesh, view: &ViewState, selection: &Selection) {
        let projector = Projector::new(view.rotation);

        // Faces with fewer than three corners or missing vertices are never drawn
        for (i, face) in mesh.faces().iter().enumerate() {
            if !face.is_polygon() {
                continue;
            }
            let Some(outline) = projector.face_outline(mesh, face, view.scale()) else {
                continue;
            };
            if outline.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                continue;
            }
            let selected = selection.faces().contains(&i);
            self.fill_polygon(&outline, selected);
            self.draw_outline(&outline, selected);
        }

        for (i, vertex) in mesh.vertices().iter().enumerate() {
            let point = projector.to_screen(vertex, view.scale());
            if let Some((col, row)) = screen_to_cell(point, self.width, self.height) {
                if selection.vertices().contains(&i) {
                    self.put(col, row, SELECTED_VERTEX_MARK, Color::Red);
                } else {
                    self.put(col, row, VERTEX_MARK, Color::White);
                }
            }
        }
    }

    fn fill_polygon(&mut self, outline: &[Point2<f64>], selected: bool) {
        let (fill, color) = if selected {
            (SELECTED_FACE_FILL, Color::Red)
        } else {
            (FACE_FILL, Color::DarkGrey)
        };

        // Bounding box in cells, clipped to the screen
        let (mut min, mut max) = (outline[0], outline[0]);
        for p in outline {
            min = Point2::new(min.x.min(p.x), min.y.min(p.y));
            max = Point2::new(max.x.max(p.x), max.y.max(p.y));
        }
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        let min_col = (min.x / CELL_WIDTH + half_w).floor().max(0.0) as usize;
        let max_col = (max.x / CELL_WIDTH + half_w).ceil().min(self.width as f64 - 1.0);
        let min_row = (min.y / CELL_HEIGHT + half_h).floor().max(0.0) as usize;
        let max_row = (max.y / CELL_HEIGHT + half_h).ceil().min(self.height as f64 - 1.0);
        if max_col < 0.0 || max_row < 0.0 {
            return;
        }

        for row in min_row..=max_row as usize {
            for col in min_col..=max_col as usize {
                let centre = cell_to_screen(col as u16, row as u16, self.width, self.height);
                if polygon_contains(outline, centre) {
                    self.put(col, row, fill, color);
                }
            }
        }
    }

    fn draw_outline(&mut self, outline: &[Point2<f64>], selected: bool) {
        let color = if selected { Color::Red } else { Color::Blue };
        for (i, &a) in outline.iter().enumerate() {
            let b = outline[(i + 1) % outline.len()];
            self.draw_line(a, b, color);
        }
    }

    fn draw_line(&mut self, a: Point2<f64>, b: Point2<f64>, color: Color) {
        let dx = (b.x - a.x) / CELL_WIDTH;
        let dy = (b.y - a.y) / CELL_HEIGHT;
        let glyph = edge_glyph(dx, dy);
        let steps = dx.abs().max(dy.abs()).ceil().clamp(1.0, 4096.0) as usize;

        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let p = a + (b - a) * t;
            if let Some((col, row)) = screen_to_cell(p, self.width, self.height) {
                self.put(col, row, glyph, color);
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}
