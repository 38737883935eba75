use crate::foundation::core::{BezPath, Rect, Rgba8Premul};
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::plan::{DrawOp, FramePlan};

/// Options for the CPU backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackendOpts {
    pub(crate) clear_rgba: Option<[u8; 4]>,
}

impl CpuBackendOpts {
    /// Return options with a background colour (straight RGBA) painted under every frame.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }
}

/// CPU raster backend powered by `vello_cpu`.
///
/// Keeps its render context between frames and recreates it only when the surface size
/// changes.
pub struct CpuBackend {
    opts: CpuBackendOpts,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuBackend {
    /// Create a backend.
    pub fn new(opts: CpuBackendOpts) -> Self {
        Self { opts, ctx: None }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> TrellisResult<R>,
    ) -> TrellisResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }
}

impl RenderBackend for CpuBackend {
    fn render(&mut self, plan: &FramePlan) -> TrellisResult<FrameRGBA> {
        let (width, height) = plan.size.device_pixels();
        if width == 0 || height == 0 {
            return Err(TrellisError::render("surface has zero area"));
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| TrellisError::render("surface width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| TrellisError::render("surface height exceeds u16"))?;
        if !plan.clips_balanced() {
            return Err(TrellisError::render("unbalanced clip ops in frame plan"));
        }

        let scale = plan.size.scale;
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        let clear = self.opts.clear_rgba;

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.with_ctx_mut(w, h, |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            if let Some(rgba) = clear {
                ctx.set_paint(straight_color(Rgba8Premul::from_straight(rgba)));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(w),
                    f64::from(h),
                ));
            }

            ctx.set_transform(vello_cpu::kurbo::Affine::scale(scale));
            for op in &plan.ops {
                draw_op(ctx, op);
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;

        Ok(FrameRGBA {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn draw_op(ctx: &mut vello_cpu::RenderContext, op: &DrawOp) {
    match op {
        DrawOp::StrokePath {
            path,
            color,
            width,
            opacity,
            ..
        } => {
            if *opacity <= 0.0 {
                return;
            }
            ctx.set_stroke(
                vello_cpu::kurbo::Stroke::new(*width)
                    .with_join(vello_cpu::kurbo::Join::Miter)
                    .with_caps(vello_cpu::kurbo::Cap::Butt),
            );
            ctx.set_paint(straight_color(*color));
            with_opacity(ctx, *opacity, |ctx| ctx.stroke_path(&bezpath_to_cpu(path)));
        }
        DrawOp::FillPath {
            path,
            color,
            opacity,
            ..
        } => {
            if *opacity <= 0.0 {
                return;
            }
            ctx.set_paint(straight_color(*color));
            with_opacity(ctx, *opacity, |ctx| ctx.fill_path(&bezpath_to_cpu(path)));
        }
        DrawOp::PushClip { rect } => ctx.push_clip_layer(&rect_to_cpu_path(*rect)),
        DrawOp::PopClip => ctx.pop_layer(),
    }
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f32,
    f: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
        f(ctx);
        ctx.pop_layer();
    } else {
        f(ctx);
    }
}

/// `peniko` colours take straight alpha; draw ops carry premultiplied colour.
fn straight_color(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    if c.a == 0 {
        return vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 0);
    }
    let a = u16::from(c.a);
    let unpremul = |v: u8| -> u8 { ((u16::from(v) * 255 + a / 2) / a).min(255) as u8 };
    vello_cpu::peniko::Color::from_rgba8(unpremul(c.r), unpremul(c.g), unpremul(c.b), c.a)
}

fn rect_to_cpu_path(r: Rect) -> vello_cpu::kurbo::BezPath {
    let mut p = vello_cpu::kurbo::BezPath::new();
    p.move_to(vello_cpu::kurbo::Point::new(r.x0, r.y0));
    p.line_to(vello_cpu::kurbo::Point::new(r.x1, r.y0));
    p.line_to(vello_cpu::kurbo::Point::new(r.x1, r.y1));
    p.line_to(vello_cpu::kurbo::Point::new(r.x0, r.y1));
    p.close_path();
    p
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
