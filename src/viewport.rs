//! Logical viewport size and the pixel ratio used for the drawing buffer.

/// Upper bound on the pixel ratio; denser screens render at 2x.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Physical size of the drawing buffer in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64) -> Self {
        let mut viewport = Self {
            width: 1,
            height: 1,
            pixel_ratio: 1.0,
        };
        viewport.resize(width, height, device_pixel_ratio);
        viewport
    }

    /// Builds a viewport from a physical window size, as winit reports it.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let mut viewport = Self::new(1, 1, 1.0);
        viewport.resize_physical(width, height, scale_factor);
        viewport
    }

    /// Takes a new logical size and returns the drawing buffer size.
    ///
    /// Zero sizes (minimized windows) keep the previous dimensions.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f64) -> SurfaceSize {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
        }
        self.pixel_ratio = clamp_pixel_ratio(device_pixel_ratio);
        self.surface_size()
    }

    pub fn resize_physical(&mut self, width: u32, height: u32, scale_factor: f64) -> SurfaceSize {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        let logical = |v: u32| (v as f64 / scale).round() as u32;
        self.resize(logical(width), logical(height), scale)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn surface_size(&self) -> SurfaceSize {
        let scaled = |v: u32| ((v as f64 * self.pixel_ratio).round() as u32).max(1);
        SurfaceSize {
            width: scaled(self.width),
            height: scaled(self.height),
        }
    }
}

fn clamp_pixel_ratio(device_pixel_ratio: f64) -> f64 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}
