//! Page geometry.

/// Page size in PDF points (1/72 inch), after rotation is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    /// US Letter, used when a page carries no usable MediaBox.
    pub const LETTER: PageSize = PageSize {
        width_pt: 612.0,
        height_pt: 792.0,
    };

    /// Size with width and height swapped (quarter-turn rotation).
    pub fn rotated(self) -> Self {
        Self {
            width_pt: self.height_pt,
            height_pt: self.width_pt,
        }
    }
}

/// Pixel dimensions for rendering one page at a given scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in CSS pixels (may be fractional).
    pub width: f32,
    /// Height in CSS pixels (may be fractional).
    pub height: f32,
    /// Scale factor applied to the page size.
    pub scale: f32,
}

impl Viewport {
    /// Viewport for a page of the given size at `scale`.
    pub fn for_page(size: PageSize, scale: f32) -> Self {
        Self {
            width: size.width_pt * scale,
            height: size.height_pt * scale,
            scale,
        }
    }

    /// Surface width in whole pixels.
    ///
    /// Fractional sizes are truncated the way assigning to a canvas
    /// dimension truncates them; a page never collapses below one pixel.
    pub fn pixel_width(&self) -> u32 {
        to_pixels(self.width)
    }

    /// Surface height in whole pixels.
    pub fn pixel_height(&self) -> u32 {
        to_pixels(self.height)
    }

    /// `(width, height)` in whole pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixel_width(), self.pixel_height())
    }

    /// [`pixel_size`](Self::pixel_size), or `None` when the surface would
    /// exceed [`MAX_SURFACE_SIDE`] or [`MAX_SURFACE_PIXELS`].
    pub fn checked_pixel_size(&self) -> Option<(u32, u32)> {
        let (width, height) = self.pixel_size();
        let fits = width <= MAX_SURFACE_SIDE
            && height <= MAX_SURFACE_SIDE
            && u64::from(width) * u64::from(height) <= MAX_SURFACE_PIXELS;
        fits.then_some((width, height))
    }
}

/// Largest surface side in pixels, the common canvas limit.
pub const MAX_SURFACE_SIDE: u32 = 32_767;

/// Largest surface area in pixels (16384 x 16384).
pub const MAX_SURFACE_PIXELS: u64 = 1 << 28;

fn to_pixels(value: f32) -> u32 {
    if value.is_finite() && value >= 1.0 {
        value.trunc() as u32
    } else {
        1
    }
}
