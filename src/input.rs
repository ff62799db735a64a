use glam::Vec2;

/// Bounding box of the surface in client pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

// ---------------- Pointer helpers ----------------
/// Pointer position relative to the surface box; `(0, 0)` is top-left and
/// `(1, 1)` bottom-right. Positions outside the box map outside `[0, 1]`.
#[inline]
pub fn pointer_uv(client_x: f32, client_y: f32, rect: ClientRect) -> Option<Vec2> {
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return None;
    }
    let uv = Vec2::new(
        (client_x - rect.left) / rect.width,
        (client_y - rect.top) / rect.height,
    );
    uv.is_finite().then_some(uv)
}

// ---------------- Canvas sizing ----------------
/// Backing-store pixels for a CSS extent at `scale`, at least 1.
#[inline]
pub fn backing_px(css: f32, scale: f32) -> u32 {
    let px = (css.max(0.0) * scale.max(0.0)).floor();
    if px.is_finite() {
        (px as u32).max(1)
    } else {
        1
    }
}
