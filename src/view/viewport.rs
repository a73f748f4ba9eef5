//! Viewport Math
//!
//! Host layout rectangles use a y-down pixel space; engine viewports are
//! normalized [0, 1] fractions of the shared window with y up. These
//! helpers convert between the two and derive the physical surface size a
//! window should be given for a container rectangle.

use crate::host::HostRect;

/// Surfaces are never sized below this, to keep degenerate layouts from
/// producing zero-area windows.
pub const MIN_SURFACE_PX: u32 = 10;

/// Normalized window region, y up, each bound in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Viewport {
    /// Full window.
    pub const FULL: Self = Self { x_min: 0.0, y_min: 0.0, x_max: 1.0, y_max: 1.0 };

    #[must_use]
    pub fn as_array(&self) -> [f64; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Computes the normalized viewport a child container occupies within the
/// root container, flipping from the host's y-down space to the engine's
/// y-up space. Child rectangles partially outside the root are clamped.
#[must_use]
pub fn normalized_viewport(root: HostRect, child: HostRect) -> Viewport {
    if root.width <= 0.0 || root.height <= 0.0 {
        return Viewport::FULL;
    }
    Viewport {
        x_min: clamp01((child.x - root.x) / root.width),
        y_min: clamp01(1.0 - (child.bottom() - root.y) / root.height),
        x_max: clamp01((child.right() - root.x) / root.width),
        y_max: clamp01(1.0 - (child.y - root.y) / root.height),
    }
}

/// Inverse of [`normalized_viewport`]: the host-space pixel rectangle a
/// normalized viewport covers within the root container.
#[must_use]
pub fn pixel_rect(root: HostRect, viewport: Viewport) -> HostRect {
    HostRect {
        x: root.x + viewport.x_min * root.width,
        y: root.y + (1.0 - viewport.y_max) * root.height,
        width: (viewport.x_max - viewport.x_min) * root.width,
        height: (viewport.y_max - viewport.y_min) * root.height,
    }
}

/// Physical surface size for a container rectangle at the given device
/// pixel ratio, floored and clamped to [`MIN_SURFACE_PX`].
#[must_use]
pub fn scaled_surface_size(rect: HostRect, device_pixel_ratio: f64) -> (u32, u32) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scale = |extent: f64| -> u32 {
        let px = (extent * device_pixel_ratio).floor().max(0.0) as u32;
        px.max(MIN_SURFACE_PX)
    };
    (scale(rect.width), scale(rect.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_in_top_left_quadrant() {
        let root = HostRect { x: 0.0, y: 0.0, width: 800.0, height: 600.0 };
        let child = HostRect { x: 0.0, y: 0.0, width: 400.0, height: 300.0 };
        let vp = normalized_viewport(root, child);
        // Top of the host space maps to the top of the y-up window.
        assert_eq!(vp.as_array(), [0.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn offset_root_is_subtracted() {
        let root = HostRect { x: 100.0, y: 50.0, width: 200.0, height: 200.0 };
        let child = HostRect { x: 200.0, y: 150.0, width: 100.0, height: 100.0 };
        let vp = normalized_viewport(root, child);
        assert_eq!(vp.as_array(), [0.5, 0.0, 1.0, 0.5]);
    }

    #[test]
    fn pixel_rect_round_trips() {
        let root = HostRect { x: 10.0, y: 20.0, width: 640.0, height: 480.0 };
        let child = HostRect { x: 170.0, y: 140.0, width: 320.0, height: 240.0 };
        let rect = pixel_rect(root, normalized_viewport(root, child));
        assert!((rect.x - child.x).abs() < 1e-9);
        assert!((rect.y - child.y).abs() < 1e-9);
        assert!((rect.width - child.width).abs() < 1e-9);
        assert!((rect.height - child.height).abs() < 1e-9);
    }

    #[test]
    fn out_of_root_child_is_clamped() {
        let root = HostRect { x: 0.0, y: 0.0, width: 100.0, height: 100.0 };
        let child = HostRect { x: -50.0, y: 50.0, width: 100.0, height: 100.0 };
        let vp = normalized_viewport(root, child);
        assert_eq!(vp.as_array(), [0.0, 0.0, 0.5, 0.5]);
    }

    #[test]
    fn surface_size_scales_and_floors() {
        let rect = HostRect { x: 0.0, y: 0.0, width: 300.5, height: 200.0 };
        assert_eq!(scaled_surface_size(rect, 2.0), (601, 400));
    }

    #[test]
    fn surface_size_clamps_to_minimum() {
        let rect = HostRect { x: 0.0, y: 0.0, width: 3.0, height: 0.0 };
        assert_eq!(scaled_surface_size(rect, 1.0), (MIN_SURFACE_PX, MIN_SURFACE_PX));
    }
}
