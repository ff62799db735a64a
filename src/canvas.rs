use bgnet_core::render::{Composite, LinearGradient, Paint, RadialGradient, Surface};
use bgnet_core::{Rgba, Viewport};
use glam::Vec2;
use std::f64::consts::TAU;
use web_sys as web;

/// [`Surface`] over a `CanvasRenderingContext2d` whose transform maps drawing
/// units to CSS pixels.
pub struct CanvasSurface {
    ctx: web::CanvasRenderingContext2d,
    // The dot gradient only changes with the region or palette.
    linear: Option<(LinearGradient, web::CanvasGradient)>,
}

impl CanvasSurface {
    pub fn new(ctx: web::CanvasRenderingContext2d) -> Self {
        Self { ctx, linear: None }
    }

    pub fn context(&self) -> &web::CanvasRenderingContext2d {
        &self.ctx
    }

    fn linear_gradient(&mut self, g: &LinearGradient) -> web::CanvasGradient {
        if let Some((key, grad)) = &self.linear {
            if key == g {
                return grad.clone();
            }
        }
        let grad = self
            .ctx
            .create_linear_gradient(g.x0 as f64, 0.0, g.x1 as f64, 0.0);
        _ = grad.add_color_stop(0.0, &g.from.to_string());
        _ = grad.add_color_stop(1.0, &g.to.to_string());
        self.linear = Some((*g, grad.clone()));
        grad
    }

    fn radial_gradient(&self, g: &RadialGradient) -> Option<web::CanvasGradient> {
        let (x, y) = (g.center.x as f64, g.center.y as f64);
        let grad = self
            .ctx
            .create_radial_gradient(x, y, 0.0, x, y, g.radius.max(0.0) as f64)
            .ok()?;
        _ = grad.add_color_stop(0.0, &g.inner.to_string());
        _ = grad.add_color_stop(1.0, &g.outer.to_string());
        Some(grad)
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, viewport: Viewport) {
        self.ctx
            .clear_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);
    }

    fn set_composite(&mut self, op: Composite) {
        let name = match op {
            Composite::SourceOver => "source-over",
            Composite::Lighter => "lighter",
        };
        _ = self.ctx.set_global_composite_operation(name);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn set_shadow(&mut self, blur: f32, color: Rgba) {
        self.ctx.set_shadow_blur(blur.max(0.0) as f64);
        self.ctx.set_shadow_color(&color.to_string());
    }

    fn set_blur(&mut self, px: Option<f32>) {
        match px {
            Some(px) => self.ctx.set_filter(&format!("blur({px:.2}px)")),
            None => self.ctx.set_filter("none"),
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        match paint {
            Paint::Solid(c) => self.ctx.set_fill_style_str(&c.to_string()),
            Paint::Linear(g) => {
                let grad = self.linear_gradient(g);
                self.ctx.set_fill_style_canvas_gradient(&grad);
            }
            Paint::Radial(g) => match self.radial_gradient(g) {
                Some(grad) => self.ctx.set_fill_style_canvas_gradient(&grad),
                None => return,
            },
        }
        self.ctx.begin_path();
        _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius.max(0.0) as f64,
            0.0,
            TAU,
        );
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.ctx.set_line_width(width as f64);
        self.ctx.set_stroke_style_str(&color.to_string());
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn fill_triangle(&mut self, points: [Vec2; 3], color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx.begin_path();
        self.ctx.move_to(points[0].x as f64, points[0].y as f64);
        self.ctx.line_to(points[1].x as f64, points[1].y as f64);
        self.ctx.line_to(points[2].x as f64, points[2].y as f64);
        self.ctx.close_path();
        self.ctx.fill();
    }
}
