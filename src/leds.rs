//! The canvas an effect draws on: one row's logical grid.
//!
//! Every write goes through the row's mapping table to zero or more
//! physical pixels of the fixture buffer. Logical pixels that no physical
//! pixel shows are silently skipped, so effects never need to know the
//! projection or the fixture.
#![expect(clippy::arithmetic_side_effects, reason = "indices are range-checked before the neighbour steps")]

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, RgbColor, Size};

use crate::color::{self, RGB8, colors};
use crate::fixture::row::{MapEntry, physical_run};
use crate::projection::{NOT_SHOWN, PixelTransform, flatten};
use crate::Coord3D;

/// A row's logical grid, borrowed for one frame.
pub struct Leds<'a> {
    buffer: &'a mut [RGB8],
    entries: &'a [MapEntry],
    size: Coord3D,
    transform: PixelTransform,
}

impl<'a> Leds<'a> {
    /// Canvas over `buffer` through `entries` (sorted by logical index).
    #[must_use]
    pub fn new(
        buffer: &'a mut [RGB8],
        entries: &'a [MapEntry],
        size: Coord3D,
        transform: PixelTransform,
    ) -> Self {
        Self {
            buffer,
            entries,
            size: size.maximum(Coord3D::ONE),
            transform,
        }
    }

    /// Logical grid size.
    #[must_use]
    pub const fn size(&self) -> Coord3D {
        self.size
    }

    /// Number of logical pixels.
    #[must_use]
    pub fn len(&self) -> u16 {
        u16::try_from(self.size.volume()).unwrap_or(NOT_SHOWN)
    }

    /// True if the grid has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical index of `pixel` after this frame's transform, or [`NOT_SHOWN`].
    #[must_use]
    pub fn xyz(&self, pixel: Coord3D) -> u16 {
        flatten(self.transform.apply(pixel), self.size)
    }

    /// Shorthand for [`xyz`](Self::xyz) on the z = 0 plane.
    #[must_use]
    pub fn xy(&self, x: i32, y: i32) -> u16 {
        self.xyz(Coord3D::new(x, y, 0))
    }

    /// Color of a logical pixel (black if not shown).
    #[must_use]
    pub fn get_pixel_color(&self, index: u16) -> RGB8 {
        physical_run(self.entries, index)
            .first()
            .and_then(|entry| self.buffer.get(usize::from(entry.physical)))
            .copied()
            .unwrap_or(colors::BLACK)
    }

    /// Set every physical pixel driven by `index`.
    pub fn set_pixel_color(&mut self, index: u16, color: RGB8) {
        self.update(index, |_| color);
    }

    /// Mix `color` into a logical pixel by `amount`.
    pub fn set_pixel_color_blend(&mut self, index: u16, color: RGB8, amount: u8) {
        self.update(index, |existing| color::blend(existing, color, amount));
    }

    /// Add `color` to a logical pixel, saturating.
    pub fn add_pixel_color(&mut self, index: u16, color: RGB8) {
        self.update(index, |existing| color::saturating_add(existing, color));
    }

    /// [`set_pixel_color`](Self::set_pixel_color) by coordinate.
    pub fn set_xyz(&mut self, pixel: Coord3D, color: RGB8) {
        let index = self.xyz(pixel);
        self.set_pixel_color(index, color);
    }

    /// [`add_pixel_color`](Self::add_pixel_color) by coordinate.
    pub fn add_xyz(&mut self, pixel: Coord3D, color: RGB8) {
        let index = self.xyz(pixel);
        self.add_pixel_color(index, color);
    }

    /// Paint every pixel of the row.
    pub fn fill_solid(&mut self, color: RGB8) {
        for entry in self.entries {
            if let Some(slot) = self.buffer.get_mut(usize::from(entry.physical)) {
                *slot = color;
            }
        }
    }

    /// Hue wheel along the logical index, starting at `initial_hue`.
    pub fn fill_rainbow(&mut self, initial_hue: u8, delta_hue: u8) {
        for entry in self.entries {
            let hue = initial_hue.wrapping_add((entry.logical as u8).wrapping_mul(delta_hue));
            if let Some(slot) = self.buffer.get_mut(usize::from(entry.physical)) {
                *slot = color::hue(hue);
            }
        }
    }

    /// Darken every pixel of the row by `amount / 256`.
    pub fn fade_to_black_by(&mut self, amount: u8) {
        for entry in self.entries {
            if let Some(slot) = self.buffer.get_mut(usize::from(entry.physical)) {
                *slot = color::fade_to_black(*slot, amount);
            }
        }
    }

    /// Spread each pixel into its neighbours along the logical index.
    pub fn blur1d(&mut self, amount: u8) {
        let keep = 255 - amount;
        let seep = amount >> 1;
        let mut carry = colors::BLACK;
        for index in 0..self.len() {
            let current = self.get_pixel_color(index);
            let part = color::scale_color(current, seep);
            let kept = color::saturating_add(color::scale_color(current, keep), carry);
            if index > 0 {
                self.add_pixel_color(index - 1, part);
            }
            self.set_pixel_color(index, kept);
            carry = part;
        }
    }

    /// Blur rows, then columns, of the z = 0 plane.
    pub fn blur2d(&mut self, amount: u8) {
        let keep = 255 - amount;
        let seep = amount >> 1;
        let Coord3D { x: width, y: height, .. } = self.size;
        for y_index in 0..height {
            let mut carry = colors::BLACK;
            for x_index in 0..width {
                carry = self.blur_step(x_index, y_index, (-1, 0), keep, seep, carry);
            }
        }
        for x_index in 0..width {
            let mut carry = colors::BLACK;
            for y_index in 0..height {
                carry = self.blur_step(x_index, y_index, (0, -1), keep, seep, carry);
            }
        }
    }

    fn blur_step(
        &mut self,
        x_index: i32,
        y_index: i32,
        back: (i32, i32),
        keep: u8,
        seep: u8,
        carry: RGB8,
    ) -> RGB8 {
        let index = flatten(Coord3D::new(x_index, y_index, 0), self.size);
        let current = self.get_pixel_color(index);
        let part = color::scale_color(current, seep);
        let kept = color::saturating_add(color::scale_color(current, keep), carry);
        let previous = flatten(
            Coord3D::new(x_index + back.0, y_index + back.1, 0),
            self.size,
        );
        self.add_pixel_color(previous, part);
        self.set_pixel_color(index, kept);
        part
    }

    fn update(&mut self, index: u16, op: impl Fn(RGB8) -> RGB8) {
        if index == NOT_SHOWN {
            return;
        }
        for entry in physical_run(self.entries, index) {
            if let Some(slot) = self.buffer.get_mut(usize::from(entry.physical)) {
                *slot = op(*slot);
            }
        }
    }
}

impl OriginDimensions for Leds<'_> {
    fn size(&self) -> Size {
        Size::new(self.size.x as u32, self.size.y as u32)
    }
}

/// Draw on the z = 0 plane with `embedded-graphics`.
impl DrawTarget for Leds<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let index = self.xy(coord.x, coord.y);
            self.set_pixel_color(index, RGB8::new(color.r(), color.g(), color.b()));
        }
        Ok(())
    }
}
