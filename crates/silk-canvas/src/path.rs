//! Path Synthesis
//!
//! Builds SVG path command sequences from the 2D-context curve primitives.
//! Commands hold device-space coordinates, frozen through the transform
//! that was current when each verb was called; the cursor is kept in user
//! space and only feeds follow-on geometry (it is never emitted).

use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;

use crate::{CanvasError, CanvasResult, Matrix};

/// One emitted path command, in device space
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    Move {
        x: f64,
        y: f64,
    },
    Line {
        x: f64,
        y: f64,
    },
    Cubic {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    Quad {
        x1: f64,
        y1: f64,
        x: f64,
        y: f64,
    },
    /// Elliptical arc segment; `rotation` is in degrees as serialized
    Arc {
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    },
    Close,
}

/// A path being built (the current default path, or an explicit path object).
///
/// Cloning yields an independent value copy; mutating either side never
/// affects the other.
#[derive(Debug, Clone, Default)]
pub struct Path2D {
    commands: Vec<PathCommand>,
    /// User-space cursor; `None` until the first verb
    cursor: Option<(f64, f64)>,
    /// Whether a `Move` command has been emitted yet
    has_move: bool,
}

impl Path2D {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path from previously recorded command data
    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        let has_move = commands
            .iter()
            .any(|c| matches!(c, PathCommand::Move { .. }));
        Self {
            commands,
            cursor: None,
            has_move,
        }
    }

    /// The recorded command sequence
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Check whether any command has been recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The user-space cursor, if any verb has run
    pub fn current_position(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    fn push(&mut self, cmd: PathCommand) {
        if matches!(cmd, PathCommand::Move { .. }) {
            self.has_move = true;
        }
        self.commands.push(cmd);
    }

    /// Close the current subpath
    pub fn close_path(&mut self) {
        self.push(PathCommand::Close);
    }

    /// Start a new subpath at the given point
    pub fn move_to(&mut self, ctm: &Matrix, x: f64, y: f64) {
        self.cursor = Some((x, y));
        let (dx, dy) = ctm.apply(x, y);
        self.push(PathCommand::Move { x: dx, y: dy });
    }

    /// Straight segment to the given point. Without a prior `move` in the
    /// path this degrades to a `move`, matching the emulated contract.
    pub fn line_to(&mut self, ctm: &Matrix, x: f64, y: f64) {
        self.cursor = Some((x, y));
        let (dx, dy) = ctm.apply(x, y);
        if self.has_move {
            self.push(PathCommand::Line { x: dx, y: dy });
        } else {
            self.push(PathCommand::Move { x: dx, y: dy });
        }
    }

    /// Axis-aligned rectangle: a move plus four lines tracing back to the
    /// start point (not explicitly closed)
    pub fn rect(&mut self, ctm: &Matrix, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(ctm, x, y);
        self.line_to(ctm, x + width, y);
        self.line_to(ctm, x + width, y + height);
        self.line_to(ctm, x, y + height);
        self.line_to(ctm, x, y);
    }

    /// Cubic Bezier segment; every control/end point is transformed
    /// independently
    pub fn bezier_curve_to(
        &mut self,
        ctm: &Matrix,
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    ) {
        self.cursor = Some((x, y));
        let (x1, y1) = ctm.apply(cp1x, cp1y);
        let (x2, y2) = ctm.apply(cp2x, cp2y);
        let (dx, dy) = ctm.apply(x, y);
        self.push(PathCommand::Cubic {
            x1,
            y1,
            x2,
            y2,
            x: dx,
            y: dy,
        });
    }

    /// Quadratic Bezier segment
    pub fn quadratic_curve_to(&mut self, ctm: &Matrix, cpx: f64, cpy: f64, x: f64, y: f64) {
        self.cursor = Some((x, y));
        let (x1, y1) = ctm.apply(cpx, cpy);
        let (dx, dy) = ctm.apply(x, y);
        self.push(PathCommand::Quad {
            x1,
            y1,
            x: dx,
            y: dy,
        });
    }

    /// Circular arc around `(cx, cy)`.
    ///
    /// Angles equal after reduction modulo 2π (exact equality included)
    /// mean a full circle, which a single SVG arc segment cannot express;
    /// the end angle is nudged by 0.001 rad (sign by direction) to leave an
    /// angularly tiny gap. Radii are scaled by the transform's decomposed
    /// scale rather than rotating the arc's frame, so the x-axis-rotation
    /// of the emitted command is always 0.
    pub fn arc(
        &mut self,
        ctm: &Matrix,
        cx: f64,
        cy: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
    ) {
        let start_angle = start_angle % TAU;
        let mut end_angle = end_angle % TAU;
        if start_angle == end_angle {
            // circle time: leave an epsilon gap so the arc stays expressible
            end_angle =
                (end_angle + TAU - 0.001 * if counterclockwise { -1.0 } else { 1.0 }) % TAU;
        }

        let end_x = cx + radius * end_angle.cos();
        let end_y = cy + radius * end_angle.sin();
        let start_x = cx + radius * start_angle.cos();
        let start_y = cy + radius * start_angle.sin();
        let sweep = !counterclockwise;

        let mut diff = end_angle - start_angle;
        if diff < 0.0 {
            diff += TAU;
        }
        let large_arc = if counterclockwise {
            diff <= PI
        } else {
            diff > PI
        };

        let (scale_x, scale_y) = ctm.scale_components();

        self.line_to(ctm, start_x, start_y);
        let (dx, dy) = ctm.apply(end_x, end_y);
        self.push(PathCommand::Arc {
            rx: radius * scale_x,
            ry: radius * scale_y,
            rotation: 0.0,
            large_arc,
            sweep,
            x: dx,
            y: dy,
        });
        self.cursor = Some((end_x, end_y));
    }

    /// Rounded corner: the circle of radius `radius` tangent to the segment
    /// from the cursor to `(x1, y1)` and the segment from `(x1, y1)` to
    /// `(x2, y2)`.
    ///
    /// Degenerate policy: no cursor is a no-op; a negative radius is an
    /// invalid-argument failure that leaves the path untouched; coincident
    /// points, zero radius, or collinear points degrade to a straight line
    /// to `(x1, y1)`.
    pub fn arc_to(
        &mut self,
        ctm: &Matrix,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        radius: f64,
    ) -> CanvasResult<()> {
        let Some((x0, y0)) = self.cursor else {
            return Ok(());
        };

        if radius < 0.0 {
            return Err(CanvasError::IndexSize(radius));
        }

        if (x0 == x1 && y0 == y1) || (x1 == x2 && y1 == y2) || radius == 0.0 {
            self.line_to(ctm, x1, y1);
            return Ok(());
        }

        // unit vectors from the corner vertex toward each neighbor
        let v10 = normalize(x0 - x1, y0 - y1);
        let v12 = normalize(x2 - x1, y2 - y1);

        // collinear arms (parallel or antiparallel) have no tangent circle
        if v10.0 * v12.1 == v10.1 * v12.0 {
            self.line_to(ctm, x1, y1);
            return Ok(());
        }

        let half_angle = (v10.0 * v12.0 + v10.1 * v12.1).clamp(-1.0, 1.0).acos() / 2.0;
        let tangent_len = radius / half_angle.tan();

        // tangent points along each incoming segment
        let t10 = (x1 + tangent_len * v10.0, y1 + tangent_len * v10.1);
        let t12 = (x1 + tangent_len * v12.0, y1 + tangent_len * v12.1);

        // center: offset the first tangent point along the perpendicular of
        // its arm, picking the side that faces the other arm
        let mut perp = (-v10.1, v10.0);
        if perp.0 * v12.0 + perp.1 * v12.1 < 0.0 {
            perp = (-perp.0, -perp.1);
        }
        let cx = t10.0 + radius * perp.0;
        let cy = t10.1 + radius * perp.1;

        let start_angle = (t10.1 - cy).atan2(t10.0 - cx);
        let end_angle = (t12.1 - cy).atan2(t12.0 - cx);

        // a tangent-corner arc always spans less than pi; pick the rotation
        // direction whose angular travel stays under that threshold
        let clockwise_gap = (end_angle - start_angle).rem_euclid(TAU);
        let anticlockwise = clockwise_gap > PI;

        self.line_to(ctm, t10.0, t10.1);
        self.arc(ctm, cx, cy, radius, start_angle, end_angle, anticlockwise);
        Ok(())
    }

    /// Elliptical arc around `(cx, cy)`.
    ///
    /// A zero angular span is a full ellipse, with the same epsilon nudge
    /// as `arc`. The center is transformed first; radii and rotation then absorb the
    /// transform's decomposed scale and rotation, so the start/end points
    /// come straight from the rotated-ellipse parametric formula in device
    /// terms. The connecting line runs under an identity matrix because its
    /// target is already device space.
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
        &mut self,
        ctm: &Matrix,
        cx: f64,
        cy: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
    ) {
        let (cx, cy) = ctm.apply(cx, cy);
        let (scale_x, scale_y) = ctm.scale_components();
        let radius_x = radius_x * scale_x;
        let radius_y = radius_y * scale_y;
        let rotation = rotation + ctm.rotation_component();

        let start_angle = start_angle % TAU;
        let mut end_angle = end_angle % TAU;
        if start_angle == end_angle {
            end_angle =
                (end_angle + TAU - 0.001 * if counterclockwise { -1.0 } else { 1.0 }) % TAU;
        }

        let end_x = cx
            + (-rotation).cos() * radius_x * end_angle.cos()
            + (-rotation).sin() * radius_y * end_angle.sin();
        let end_y = cy - (-rotation).sin() * radius_x * end_angle.cos()
            + (-rotation).cos() * radius_y * end_angle.sin();
        let start_x = cx
            + (-rotation).cos() * radius_x * start_angle.cos()
            + (-rotation).sin() * radius_y * start_angle.sin();
        let start_y = cy - (-rotation).sin() * radius_x * start_angle.cos()
            + (-rotation).cos() * radius_y * start_angle.sin();

        let sweep = !counterclockwise;
        let mut diff = end_angle - start_angle;
        if diff < 0.0 {
            diff += TAU;
        }
        let large_arc = if counterclockwise {
            diff <= PI
        } else {
            diff > PI
        };

        // the start point is already device space; connect without
        // transforming it a second time
        self.line_to(&Matrix::IDENTITY, start_x, start_y);

        self.push(PathCommand::Arc {
            rx: radius_x,
            ry: radius_y,
            rotation: rotation * (180.0 / PI),
            large_arc,
            sweep,
            x: end_x,
            y: end_y,
        });
        self.cursor = Some((end_x, end_y));
    }

    /// Structural concatenation of another path's command sequence.
    ///
    /// The emulated API allows an extra transform argument for re-mapping
    /// the appended segments; that feature is not supported here and a
    /// supplied transform is ignored with a diagnostic.
    pub fn add_path(&mut self, other: &Path2D, transform: Option<&Matrix>) {
        if transform.is_some() {
            tracing::error!("transform argument to add_path is not supported");
        }
        self.has_move |= other.has_move;
        self.commands.extend(other.commands.iter().cloned());
    }

    /// Render the command sequence as an SVG `d` attribute value
    pub fn svg_path_data(&self) -> String {
        let mut d = String::new();
        for cmd in &self.commands {
            if !d.is_empty() {
                d.push(' ');
            }
            match cmd {
                PathCommand::Move { x, y } => {
                    let _ = write!(d, "M {x} {y}");
                }
                PathCommand::Line { x, y } => {
                    let _ = write!(d, "L {x} {y}");
                }
                PathCommand::Cubic {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => {
                    let _ = write!(d, "C {x1} {y1} {x2} {y2} {x} {y}");
                }
                PathCommand::Quad { x1, y1, x, y } => {
                    let _ = write!(d, "Q {x1} {y1} {x} {y}");
                }
                PathCommand::Arc {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    x,
                    y,
                } => {
                    let _ = write!(
                        d,
                        "A {rx} {ry} {rotation} {} {} {x} {y}",
                        u8::from(*large_arc),
                        u8::from(*sweep)
                    );
                }
                PathCommand::Close => d.push('Z'),
            }
        }
        d
    }
}

fn normalize(x: f64, y: f64) -> (f64, f64) {
    let len = (x * x + y * y).sqrt();
    (x / len, y / len)
}
