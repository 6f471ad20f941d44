use crate::{
    configuration::WindowSettings,
    error::ConfigurationError,
    machine::{Machine, SCREEN_HEIGHT, SCREEN_WIDTH},
};

/// Largest pixel scale accepted. At this scale the surface is 4096x2048.
pub const MAX_SCALE: u32 = 64;

/// An RGB colour triple, the same layout the settings file uses.
pub type Rgb = [u8; 3];

/// A pixel target the renderer can paint on: an SDL canvas, an HTML canvas, a texture buffer.
pub trait Surface {
    /// Fills the whole surface with one colour.
    fn fill(&mut self, color: Rgb) -> Result<(), String>;

    /// Fills a `size` x `size` square whose top-left corner is at (`x`, `y`).
    fn fill_square(&mut self, x: u32, y: u32, size: u32, color: Rgb) -> Result<(), String>;

    /// Makes the finished frame visible. Surfaces without double buffering do nothing.
    fn present(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// Repaints a surface from the machine's frame buffer. Holds only its colours and scale; the
/// picture itself is rebuilt from scratch on every call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRenderer {
    scale: u32,
    background_color: Rgb,
    foreground_color: Rgb,
}

impl FrameRenderer {
    pub fn new(
        scale: u32,
        background_color: Rgb,
        foreground_color: Rgb,
    ) -> Result<Self, ConfigurationError> {
        if scale == 0 {
            return Err(ConfigurationError::ZeroScale);
        }
        if scale > MAX_SCALE {
            return Err(ConfigurationError::ScaleTooLarge {
                scale,
                max: MAX_SCALE,
            });
        }

        Ok(Self {
            scale,
            background_color,
            foreground_color,
        })
    }

    pub fn from_settings(settings: &WindowSettings) -> Result<Self, ConfigurationError> {
        Self::new(
            settings.scale,
            settings.background_color,
            settings.foreground_color,
        )
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Surface size in pixels needed to show the whole frame buffer at this scale. Cannot
    /// overflow since the scale is capped at [`MAX_SCALE`].
    pub fn surface_size(&self) -> (u32, u32) {
        (
            SCREEN_WIDTH as u32 * self.scale,
            SCREEN_HEIGHT as u32 * self.scale,
        )
    }

    /// Blanks the surface to the background colour without reading any machine state.
    pub fn clear<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), String> {
        surface.fill(self.background_color)?;
        surface.present()
    }

    /// Clears the surface to the background colour, then paints every lit pixel of the frame
    /// buffer as a scaled square of the foreground colour.
    pub fn render<M, S>(&self, machine: &M, surface: &mut S) -> Result<(), String>
    where
        M: Machine + ?Sized,
        S: Surface + ?Sized,
    {
        surface.fill(self.background_color)?;

        for (i, _) in machine
            .display()
            .iter()
            .enumerate()
            .filter(|(_, pixel_on)| **pixel_on)
        {
            // Translate the 1D frame buffer index into 2D coordinates
            let x = (i % SCREEN_WIDTH) as u32;
            let y = (i / SCREEN_WIDTH) as u32;
            surface.fill_square(
                x * self.scale,
                y * self.scale,
                self.scale,
                self.foreground_color,
            )?;
        }

        surface.present()
    }
}

/// An in-memory RGB surface, three bytes per pixel, row-major. Useful for hosts that upload a
/// texture themselves and for checking frames without a window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// A black buffer of `width` x `height` pixels. Fails if the byte count doesn't fit in
    /// memory addressing.
    pub fn new(width: u32, height: u32) -> Result<Self, String> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or_else(|| format!("a {width}x{height} surface is too large"))?;

        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
        })
    }

    /// A buffer exactly the size `renderer` draws.
    pub fn for_renderer(renderer: &FrameRenderer) -> Result<Self, String> {
        let (width, height) = renderer.surface_size();
        Self::new(width, height)
    }

    /// Byte offset of pixel (`x`, `y`). Only called with coordinates inside the buffer.
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        Some([
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

impl Surface for PixelBuffer {
    fn fill(&mut self, color: Rgb) -> Result<(), String> {
        for pixel in self.pixels.chunks_exact_mut(3) {
            pixel.copy_from_slice(&color);
        }
        Ok(())
    }

    fn fill_square(&mut self, x: u32, y: u32, size: u32, color: Rgb) -> Result<(), String> {
        let fits = |start: u32, limit: u32| start.checked_add(size).is_some_and(|end| end <= limit);
        if !fits(x, self.width) || !fits(y, self.height) {
            return Err(format!(
                "square at ({x}, {y}) of size {size} does not fit a {}x{} surface",
                self.width, self.height
            ));
        }

        for row in y..y + size {
            let start = self.offset(x, row);
            let end = start + size as usize * 3;
            for pixel in self.pixels[start..end].chunks_exact_mut(3) {
                pixel.copy_from_slice(&color);
            }
        }
        Ok(())
    }
}
