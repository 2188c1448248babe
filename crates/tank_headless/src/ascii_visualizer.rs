//! ASCII visualization of a running match.
//!
//! [`AsciiCanvas`] implements [`RenderSurface`] on a character grid, so
//! the arena paints itself through the same [`Render`] impls a graphical
//! front end uses. The caller picks the glyph for each entity with
//! [`AsciiCanvas::set_pen`] before rendering it.

use std::fmt::Write as _;

use glam::Vec2;
use tank_core::assets::ImageHandle;
use tank_core::geometry::RotatedRect;
use tank_core::render::{Color, Frame, Render, RenderSurface};
use tank_core::simulation::Simulation;
use tank_core::tank::{Tank, Team};

/// ASCII visualization configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Width of the ASCII viewport.
    pub width: usize,
    /// Height of the ASCII viewport.
    pub height: usize,
    /// Show health bars.
    pub show_health: bool,
    /// Show tank legend.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            show_health: true,
            show_legend: true,
            use_color: true,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const BLUE: &str = "\x1b[34m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
    pub const WHITE: &str = "\x1b[37m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Nearest terminal color for an RGB color.
fn ansi(color: Color) -> &'static str {
    let (r, g, b) = (u16::from(color.r), u16::from(color.g), u16::from(color.b));
    if r < 60 && g < 60 && b < 60 {
        colors::GRAY
    } else if r > 200 && g > 200 && b > 200 {
        colors::WHITE
    } else if r > 150 && g > 100 && b < 100 {
        colors::YELLOW
    } else if r >= g && r >= b {
        colors::RED
    } else if g >= b {
        colors::GREEN
    } else {
        colors::BLUE
    }
}

fn health_color(health_percent: f32) -> &'static str {
    if health_percent > 0.66 {
        colors::GREEN
    } else if health_percent > 0.33 {
        colors::YELLOW
    } else {
        colors::RED
    }
}

/// Glyph for a tank: `@` for the player, otherwise the team letter.
#[must_use]
pub fn tank_glyph(tank: &Tank) -> char {
    if tank.is_player() {
        '@'
    } else {
        match tank.team() {
            Team::Allies => 'A',
            Team::Enemies => 'E',
        }
    }
}

/// Alpha below which a primitive leaves no mark.
const MIN_ALPHA: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: Option<&'static str>,
}

const EMPTY: Cell = Cell {
    glyph: '.',
    color: None,
};

/// A character grid covering the whole arena.
#[derive(Debug, Clone)]
pub struct AsciiCanvas {
    width: usize,
    height: usize,
    /// Cells per arena unit on each axis.
    scale: Vec2,
    cells: Vec<Cell>,
    pen: char,
    use_color: bool,
}

impl AsciiCanvas {
    /// A blank `width`×`height` grid mapped onto an arena of `arena` size.
    #[must_use]
    pub fn new(width: usize, height: usize, arena: Vec2, use_color: bool) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            scale: Vec2::new(width as f32, height as f32) / arena.max(Vec2::ONE),
            cells: vec![EMPTY; width * height],
            pen: '#',
            use_color,
        }
    }

    /// Glyph used by subsequent fills and images.
    pub fn set_pen(&mut self, glyph: char) {
        self.pen = glyph;
    }

    /// Glyph at column `x`, row `y`.
    #[must_use]
    pub fn glyph_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x].glyph)
    }

    /// Number of cells showing `glyph`.
    #[must_use]
    pub fn count(&self, glyph: char) -> usize {
        self.cells.iter().filter(|c| c.glyph == glyph).count()
    }

    /// The grid as text, one line per row.
    #[must_use]
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| {
                let mut line = String::with_capacity(row.len());
                for cell in row {
                    match cell.color.filter(|_| self.use_color) {
                        Some(code) => {
                            let _ = write!(line, "{code}{}{}", cell.glyph, colors::RESET);
                        }
                        None => line.push(cell.glyph),
                    }
                }
                line
            })
            .collect()
    }

    fn cell_of(&self, point: Vec2) -> Option<(usize, usize)> {
        let scaled = point * self.scale;
        if scaled.x < 0.0 || scaled.y < 0.0 {
            return None;
        }
        let (x, y) = (scaled.x as usize, scaled.y as usize);
        (x < self.width && y < self.height).then_some((x, y))
    }

    fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        (Vec2::new(x as f32, y as f32) + 0.5) / self.scale
    }

    fn put(&mut self, x: usize, y: usize, glyph: char, color: Color) {
        self.cells[y * self.width + x] = Cell {
            glyph,
            color: Some(ansi(color)),
        };
    }

    /// Stamp every cell whose center satisfies `inside` within the box
    /// `min..=max`, plus the cell under `anchor` so small shapes still show.
    fn stamp(&mut self, min: Vec2, max: Vec2, anchor: Vec2, color: Color, inside: impl Fn(Vec2) -> bool) {
        let glyph = self.pen;
        let lo = (min * self.scale).max(Vec2::ZERO);
        let hi = (max * self.scale).min(Vec2::new(self.width as f32, self.height as f32) - 1.0);
        if lo.x <= hi.x && lo.y <= hi.y {
            for y in lo.y as usize..=hi.y as usize {
                for x in lo.x as usize..=hi.x as usize {
                    if inside(self.cell_center(x, y)) {
                        self.put(x, y, glyph, color);
                    }
                }
            }
        }
        if let Some((x, y)) = self.cell_of(anchor) {
            self.put(x, y, glyph, color);
        }
    }
}

impl RenderSurface for AsciiCanvas {
    fn draw_image(&mut self, _image: &ImageHandle, center: Vec2, size: Vec2, rotation: f32, alpha: f32) {
        let rect = RotatedRect::new(center, size.x, size.y, rotation);
        self.fill_rect(&rect, Color::WHITE, alpha);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color, alpha: f32) {
        if alpha < MIN_ALPHA {
            return;
        }
        let reach = Vec2::splat(radius);
        let r2 = radius * radius;
        self.stamp(center - reach, center + reach, center, color, |p| {
            p.distance_squared(center) <= r2
        });
    }

    fn stroke_circle(&mut self, _center: Vec2, _radius: f32, _color: Color) {}

    fn fill_rect(&mut self, rect: &RotatedRect, color: Color, alpha: f32) {
        if alpha < MIN_ALPHA {
            return;
        }
        let corners = rect.corners();
        let min = corners.iter().fold(Vec2::splat(f32::MAX), |acc, c| acc.min(*c));
        let max = corners.iter().fold(Vec2::splat(f32::MIN), |acc, c| acc.max(*c));
        self.stamp(min, max, rect.center, color, |p| rect.contains_point(p));
    }

    fn stroke_rect(&mut self, _rect: &RotatedRect, _color: Color) {}

    fn draw_text(&mut self, text: &str, position: Vec2, _size: f32, color: Color, alpha: f32) {
        if alpha < MIN_ALPHA {
            return;
        }
        let Some((x, y)) = self.cell_of(position) else {
            return;
        };
        let start = x.saturating_sub(text.chars().count() / 2);
        for (offset, glyph) in text.chars().enumerate() {
            if start + offset < self.width {
                self.put(start + offset, y, glyph, color);
            }
        }
    }
}

/// Paint the whole arena: walls, impacts, projectiles, then tanks with
/// their damage numbers.
#[must_use]
pub fn paint(sim: &Simulation, config: &AsciiConfig) -> AsciiCanvas {
    let mut canvas = AsciiCanvas::new(config.width, config.height, sim.map().size, config.use_color);
    let frame = Frame {
        now: sim.now(),
        debug: false,
    };

    canvas.set_pen('#');
    sim.map().render(&mut canvas, &frame);

    canvas.set_pen('x');
    for impact in sim.effects().impacts() {
        impact.render(&mut canvas, &frame);
    }

    canvas.set_pen('*');
    for projectile in sim.projectiles() {
        projectile.render(&mut canvas, &frame);
    }

    for tank in sim.tanks() {
        canvas.set_pen(tank_glyph(tank));
        tank.render(&mut canvas, &frame);
    }

    canvas
}

/// Render the arena as ASCII art with a status line and optional legend.
#[must_use]
pub fn render_ascii(sim: &Simulation, config: &AsciiConfig) -> String {
    let canvas = paint(sim, config);
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{} | tick {} | {:.0} ms | {} projectiles",
        sim.map().name,
        sim.get_tick(),
        sim.now().as_millis_f64(),
        sim.projectiles().len()
    );

    let border = format!("+{}+", "-".repeat(canvas.width));
    let _ = writeln!(output, "{border}");
    for row in canvas.rows() {
        let _ = writeln!(output, "|{row}|");
    }
    let _ = writeln!(output, "{border}");

    if config.show_legend {
        for tank in sim.tanks() {
            let _ = write!(output, "[{}] {:<10}", tank_glyph(tank), tank.name());
            if config.show_health {
                output.push_str(&health_bar(tank, config.use_color));
            }
            if tank.is_dead() {
                output.push_str(" DEAD");
            }
            output.push('\n');
        }
    }

    output
}

fn health_bar(tank: &Tank, use_color: bool) -> String {
    const BAR: usize = 20;
    let percent = (tank.hp() as f32 / tank.max_hp() as f32).clamp(0.0, 1.0);
    let filled = (percent * BAR as f32).round() as usize;
    let bar = format!("{}{}", "=".repeat(filled), " ".repeat(BAR - filled));
    let text = format!(" [{bar}] {}/{}", tank.hp(), tank.max_hp());
    if use_color {
        format!("{}{}{text}{}", colors::BOLD, health_color(percent), colors::RESET)
    } else {
        text
    }
}
