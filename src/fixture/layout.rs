//! Physical pixel positions and output pins, in wiring order.
//!
//! See [`Layout`] for the builders: straight strips, serpentine panels,
//! rings, cubes, and concatenation of any of these.
#![expect(clippy::arithmetic_side_effects, reason = "layout sizes are checked against N before use")]

use heapless::Vec;

use crate::{Coord3D, Error, Result};

/// One physical LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pixel {
    /// Position in fixture space. Never negative.
    pub position: Coord3D,
    /// Output line this LED is wired to.
    pub pin: u8,
}

/// Runtime description of a fixture's wiring: pixel `i` is the `i`-th LED
/// on the wire, at `pixels()[i].position`.
///
/// Coordinates follow a screen-style convention: `(0, 0, 0)` is the
/// top-left-front corner, `x` grows right, `y` grows down, `z` grows back.
///
/// ```
/// use led_projector::fixture::Layout;
/// use led_projector::Coord3D;
///
/// // 3×2 serpentine panel:
/// //   LED0  LED1  LED2
/// //   LED5  LED4  LED3
/// let panel = Layout::<6>::serpentine_row_major(3, 2, 0)?;
/// assert_eq!(panel.pixels()[3].position, Coord3D::new(2, 1, 0));
/// assert_eq!(panel.size(), Coord3D::new(3, 2, 1));
/// # Ok::<(), led_projector::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout<const N: usize> {
    pixels: Vec<Pixel, N>,
}

impl<const N: usize> Layout<N> {
    /// An empty layout.
    #[must_use]
    pub const fn new() -> Self {
        Self { pixels: Vec::new() }
    }

    /// Append one LED.
    ///
    /// # Errors
    ///
    /// [`Error::NegativePosition`] or [`Error::LayoutCapacity`].
    pub fn push(&mut self, position: Coord3D, pin: u8) -> Result<()> {
        if position.x < 0 || position.y < 0 || position.z < 0 {
            return Err(Error::NegativePosition);
        }
        self.pixels
            .push(Pixel { position, pin })
            .map_err(|_| Error::LayoutCapacity)
    }

    /// LEDs from a list of positions, all on `pin`.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn from_positions(positions: &[Coord3D], pin: u8) -> Result<Self> {
        let mut layout = Self::new();
        for position in positions {
            layout.push(*position, pin)?;
        }
        Ok(layout)
    }

    /// A straight strip along x.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn linear_x(len: usize, pin: u8) -> Result<Self> {
        let mut layout = Self::new();
        for x_index in 0..len {
            layout.push(Coord3D::new(x_index as i32, 0, 0), pin)?;
        }
        Ok(layout)
    }

    /// A straight strip along z (depth).
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn linear_z(len: usize, pin: u8) -> Result<Self> {
        let mut layout = Self::new();
        for z_index in 0..len {
            layout.push(Coord3D::new(0, 0, z_index as i32), pin)?;
        }
        Ok(layout)
    }

    /// A panel wired row by row; odd rows run right to left.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn serpentine_row_major(width: usize, height: usize, pin: u8) -> Result<Self> {
        let mut layout = Self::new();
        layout.extend_serpentine_rows(width, height, 0, pin)?;
        Ok(layout)
    }

    /// A panel wired column by column; odd columns run bottom to top.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn serpentine_column_major(width: usize, height: usize, pin: u8) -> Result<Self> {
        let mut layout = Self::new();
        for x_index in 0..width {
            for step in 0..height {
                let y_index = if x_index % 2 == 0 {
                    // Even column: top-to-bottom
                    step
                } else {
                    // Odd column: bottom-to-top
                    height - 1 - step
                };
                layout.push(Coord3D::new(x_index as i32, y_index as i32, 0), pin)?;
            }
        }
        Ok(layout)
    }

    /// A panel wired row by row, every row left to right.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn row_major(width: usize, height: usize, pin: u8) -> Result<Self> {
        let mut layout = Self::new();
        for y_index in 0..height {
            for x_index in 0..width {
                layout.push(Coord3D::new(x_index as i32, y_index as i32, 0), pin)?;
            }
        }
        Ok(layout)
    }

    /// `count` LEDs around a circle of `diameter` cells, starting at the top
    /// and running clockwise.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn ring(count: usize, diameter: usize, pin: u8) -> Result<Self> {
        let mut layout = Self::new();
        let radius = (diameter.max(1) - 1) as f32 / 2.0;
        for led_index in 0..count {
            let angle = led_index as f32 * core::f32::consts::TAU / count.max(1) as f32;
            let x_pos = libm::roundf(radius + radius * libm::sinf(angle)) as i32;
            let y_pos = libm::roundf(radius - radius * libm::cosf(angle)) as i32;
            layout.push(Coord3D::new(x_pos, y_pos, 0), pin)?;
        }
        Ok(layout)
    }

    /// A cube of serpentine panels, one per z layer.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn cube(width: usize, height: usize, depth: usize, pin: u8) -> Result<Self> {
        let mut layout = Self::new();
        for z_index in 0..depth {
            layout.extend_serpentine_rows(width, height, z_index as i32, pin)?;
        }
        Ok(layout)
    }

    /// Append every LED of `other`, shifted by `offset`.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn concat<const N2: usize>(mut self, other: &Layout<N2>, offset: Coord3D) -> Result<Self> {
        for pixel in other.pixels() {
            self.push(pixel.position + offset, pixel.pin)?;
        }
        Ok(self)
    }

    /// Mirror left to right.
    #[must_use]
    pub fn flip_h(mut self) -> Self {
        let width = self.size().x;
        for pixel in &mut self.pixels {
            pixel.position.x = width - 1 - pixel.position.x;
        }
        self
    }

    /// Rotate a panel a quarter turn clockwise in the xy plane.
    #[must_use]
    pub fn rotate_cw(mut self) -> Self {
        let height = self.size().y;
        for pixel in &mut self.pixels {
            let Coord3D { x, y, z } = pixel.position;
            pixel.position = Coord3D::new(height - 1 - y, x, z);
        }
        self
    }

    /// The LEDs in wiring order.
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Number of LEDs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// True if the layout holds no LEDs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Bounding size: largest position plus one on every axis.
    #[must_use]
    pub fn size(&self) -> Coord3D {
        self.pixels
            .iter()
            .fold(Coord3D::ZERO, |size, pixel| size.maximum(pixel.position))
            + Coord3D::ONE
    }

    fn extend_serpentine_rows(&mut self, width: usize, height: usize, z_pos: i32, pin: u8) -> Result<()> {
        for y_index in 0..height {
            for step in 0..width {
                let x_index = if y_index % 2 == 0 { step } else { width - 1 - step };
                self.push(Coord3D::new(x_index as i32, y_index as i32, z_pos), pin)?;
            }
        }
        Ok(())
    }
}
