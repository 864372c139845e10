//! Smooth path construction through sample points.
//!
//! Curves use a uniform cubic B-spline: the path starts and ends on the first and last
//! points and is pulled towards the interior points without passing through them.
//! Points with a non-finite y are gaps and split the curve.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CubicTo {
        c1: (f64, f64),
        c2: (f64, f64),
        to: (f64, f64),
    },
    Close,
}

/// Vector path made of straight and cubic segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    #[cfg(test)]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn push(&mut self, command: PathCommand) {
        self.commands.push(command);
    }

    /// SVG path data, e.g. `M0,0L10,5C...Z`.
    pub fn to_svg_d(&self) -> String {
        let mut d = String::new();
        for command in &self.commands {
            // writing into a String cannot fail
            let _ = match *command {
                PathCommand::MoveTo(x, y) => write!(d, "M{},{}", coord(x), coord(y)),
                PathCommand::LineTo(x, y) => write!(d, "L{},{}", coord(x), coord(y)),
                PathCommand::CubicTo { c1, c2, to } => write!(
                    d,
                    "C{},{},{},{},{},{}",
                    coord(c1.0),
                    coord(c1.1),
                    coord(c2.0),
                    coord(c2.1),
                    coord(to.0),
                    coord(to.1)
                ),
                PathCommand::Close => write!(d, "Z"),
            };
        }
        d
    }

    /// Approximates the path with polylines, one per subpath.
    ///
    /// Each cubic segment is replaced by `steps` straight pieces.
    pub fn flatten(&self, steps: usize) -> Vec<Vec<(f64, f64)>> {
        let steps = steps.max(1);
        let mut polylines: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(x, y) => {
                    if current.len() > 1 {
                        polylines.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push((x, y));
                }
                PathCommand::LineTo(x, y) => current.push((x, y)),
                PathCommand::CubicTo { c1, c2, to } => {
                    let Some(&from) = current.last() else {
                        current.push(to);
                        continue;
                    };
                    for step in 1..=steps {
                        let t = step as f64 / steps as f64;
                        current.push(cubic_point(from, c1, c2, to, t));
                    }
                }
                PathCommand::Close => {
                    if let Some(&first) = current.first() {
                        current.push(first);
                    }
                }
            }
        }
        if current.len() > 1 {
            polylines.push(current);
        }
        polylines
    }
}

fn cubic_point(
    p0: (f64, f64),
    p1: (f64, f64),
    p2: (f64, f64),
    p3: (f64, f64),
    t: f64,
) -> (f64, f64) {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    (
        a * p0.0 + b * p1.0 + c * p2.0 + d * p3.0,
        a * p0.1 + b * p1.1 + c * p2.1 + d * p3.1,
    )
}

/// Formats a coordinate with at most three decimals and no trailing zeros.
fn coord(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}")
}

/// B-spline state machine shared by lines and areas.
///
/// `join` controls whether the next segment connects to the previous one (areas draw the
/// baseline as a continuation of the top edge) or starts a new subpath.
struct Basis<'a> {
    path: &'a mut Path,
    join: bool,
    close_single: bool,
    seen: u8,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl<'a> Basis<'a> {
    fn new(path: &'a mut Path) -> Self {
        Self {
            path,
            join: false,
            close_single: true,
            seen: 0,
            x0: f64::NAN,
            y0: f64::NAN,
            x1: f64::NAN,
            y1: f64::NAN,
        }
    }

    fn line_start(&mut self) {
        self.seen = 0;
        self.x0 = f64::NAN;
        self.y0 = f64::NAN;
        self.x1 = f64::NAN;
        self.y1 = f64::NAN;
    }

    fn point(&mut self, x: f64, y: f64) {
        match self.seen {
            0 => {
                self.seen = 1;
                if self.join {
                    self.path.push(PathCommand::LineTo(x, y));
                } else {
                    self.path.push(PathCommand::MoveTo(x, y));
                }
            }
            1 => self.seen = 2,
            2 => {
                self.seen = 3;
                self.path.push(PathCommand::LineTo(
                    (5.0 * self.x0 + self.x1) / 6.0,
                    (5.0 * self.y0 + self.y1) / 6.0,
                ));
                self.bezier(x, y);
            }
            _ => self.bezier(x, y),
        }
        self.x0 = self.x1;
        self.x1 = x;
        self.y0 = self.y1;
        self.y1 = y;
    }

    fn bezier(&mut self, x: f64, y: f64) {
        let (x0, y0, x1, y1) = (self.x0, self.y0, self.x1, self.y1);
        self.path.push(PathCommand::CubicTo {
            c1: ((2.0 * x0 + x1) / 3.0, (2.0 * y0 + y1) / 3.0),
            c2: ((x0 + 2.0 * x1) / 3.0, (y0 + 2.0 * y1) / 3.0),
            to: ((x0 + 4.0 * x1 + x) / 6.0, (y0 + 4.0 * y1 + y) / 6.0),
        });
    }

    fn line_end(&mut self) {
        let (x1, y1) = (self.x1, self.y1);
        match self.seen {
            3 => {
                self.bezier(x1, y1);
                self.path.push(PathCommand::LineTo(x1, y1));
            }
            2 => self.path.push(PathCommand::LineTo(x1, y1)),
            _ => {}
        }
        if self.seen == 1 && self.close_single {
            self.path.push(PathCommand::Close);
        }
    }
}

/// Splits `points` into runs of consecutive finite points.
fn defined_runs(points: &[(f64, f64)]) -> impl Iterator<Item = &[(f64, f64)]> {
    points
        .split(|&(x, y)| !(x.is_finite() && y.is_finite()))
        .filter(|run| !run.is_empty())
}

/// Smooth open curve through `points`.
pub fn basis_line(points: &[(f64, f64)]) -> Path {
    let mut path = Path::default();
    let mut basis = Basis::new(&mut path);
    for run in defined_runs(points) {
        basis.line_start();
        for &(x, y) in run {
            basis.point(x, y);
        }
        basis.line_end();
    }
    path
}

/// Closed region between a smooth curve through `points` and the horizontal `baseline`.
pub fn basis_area(points: &[(f64, f64)], baseline: f64) -> Path {
    let mut path = Path::default();
    let mut basis = Basis::new(&mut path);
    basis.close_single = false;
    for run in defined_runs(points) {
        basis.join = false;
        basis.line_start();
        for &(x, y) in run {
            basis.point(x, y);
        }
        basis.line_end();

        basis.join = true;
        basis.line_start();
        for &(x, _) in run.iter().rev() {
            basis.point(x, baseline);
        }
        basis.line_end();
        basis.path.push(PathCommand::Close);
    }
    path
}
