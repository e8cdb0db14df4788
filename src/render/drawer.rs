use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::SignplayResult;
use crate::model::landmark::{FrameData, Landmark};
use crate::model::topology::{HAND_CONNECTIONS, POSE_CONNECTIONS, drawable_connections};
use crate::render::cpu::CpuSurface;
use vello_cpu::kurbo::Shape as _;

/// Colors and sizes used when drawing a frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DrawStyle {
    /// Surface clear color.
    pub background: Rgba8,
    /// Pose points and bones.
    pub pose: Rgba8,
    /// Left hand points and bones.
    pub left_hand: Rgba8,
    /// Right hand points and bones.
    pub right_hand: Rgba8,
    /// Landmark dot radius in pixels.
    pub point_radius: f64,
    /// Bone stroke width in pixels.
    pub line_width: f64,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::rgb(255, 255, 255),
            pose: Rgba8::rgb(0, 180, 0),
            left_hand: Rgba8::rgb(220, 40, 40),
            right_hand: Rgba8::rgb(40, 90, 220),
            point_radius: 4.0,
            line_width: 2.0,
        }
    }
}

/// What a single [`LandmarkDrawer::render`] call put on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Landmark dots drawn.
    pub points: usize,
    /// Skeleton connections drawn.
    pub connections: usize,
}

/// Stateless renderer of one [`FrameData`] onto a [`CpuSurface`].
#[derive(Clone, Debug, Default)]
pub struct LandmarkDrawer {
    style: DrawStyle,
}

impl LandmarkDrawer {
    /// Create a drawer with `style`.
    pub fn new(style: DrawStyle) -> Self {
        Self { style }
    }

    /// Active style.
    pub fn style(&self) -> &DrawStyle {
        &self.style
    }

    /// Clear `surface` and draw pose, then left hand, then right hand.
    ///
    /// A connection is drawn only when both of its endpoints exist in the frame's set; missing
    /// joints are skipped silently.
    pub fn render(&self, surface: &mut CpuSurface, frame: &FrameData) -> SignplayResult<DrawStats> {
        let canvas = surface.canvas();
        let style = self.style;
        surface.paint(|ctx| {
            ctx.set_paint(to_color(style.background));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(canvas.width),
                f64::from(canvas.height),
            ));

            let mut stats = DrawStats::default();
            let groups: [(&[Landmark], &[(usize, usize)], Rgba8); 3] = [
                (frame.pose.as_slice(), &POSE_CONNECTIONS[..], style.pose),
                (frame.left_hand.as_slice(), &HAND_CONNECTIONS[..], style.left_hand),
                (frame.right_hand.as_slice(), &HAND_CONNECTIONS[..], style.right_hand),
            ];
            for (set, table, color) in groups {
                draw_group(ctx, canvas, &style, set, table, color, &mut stats);
            }
            stats
        })
    }
}

fn draw_group(
    ctx: &mut vello_cpu::RenderContext,
    canvas: Canvas,
    style: &DrawStyle,
    set: &[Landmark],
    table: &[(usize, usize)],
    color: Rgba8,
    stats: &mut DrawStats,
) {
    if set.is_empty() {
        return;
    }
    ctx.set_paint(to_color(color));

    for lm in set {
        let p = lm.project(canvas);
        let dot = vello_cpu::kurbo::Circle::new((p.x, p.y), style.point_radius).to_path(0.1);
        ctx.fill_path(&dot);
        stats.points += 1;
    }

    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(style.line_width));
    for (a, b) in drawable_connections(table, set.len()) {
        let pa = set[a].project(canvas);
        let pb = set[b].project(canvas);
        let mut bone = vello_cpu::kurbo::BezPath::new();
        bone.move_to((pa.x, pa.y));
        bone.line_to((pb.x, pb.y));
        ctx.stroke_path(&bone);
        stats.connections += 1;
    }
}

fn to_color(c: Rgba8) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.0;
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

#[cfg(test)]
#[path = "../../tests/unit/render/drawer.rs"]
mod tests;
