use crate::{
    configuration::WindowSettings,
    renderer::{FrameRenderer, Rgb, Surface},
    session::SessionStatus,
};
use sdl2::{
    Sdl,
    pixels::Color,
    rect::Rect,
    render::Canvas,
    video::{FullscreenType::*, Window},
};

/// The SDL window the frame renderer paints on. The window title doubles as the status line.
pub struct Screen {
    canvas: Canvas<Window>,
    title: String,
}

impl Screen {
    pub fn initialize(
        sdl_context: &Sdl,
        title: &str,
        settings: &WindowSettings,
    ) -> anyhow::Result<Self> {
        let (width, height) = FrameRenderer::from_settings(settings)?.surface_size();

        let video_subsystem = sdl_context.video().map_err(anyhow::Error::msg)?;
        let mut window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()?;

        if settings.fullscreen {
            window.set_fullscreen(Desktop).map_err(anyhow::Error::msg)?;
        }

        let mut canvas = if settings.vsync {
            window.into_canvas().present_vsync().build()?
        } else {
            window.into_canvas().build()?
        };

        // Letterbox instead of stretching when the window is fullscreen
        canvas.set_logical_size(width, height)?;

        Ok(Self {
            canvas,
            title: title.to_string(),
        })
    }

    /// Puts the session status in the title bar, so load failures and crashes are visible
    /// without a terminal.
    pub fn show_status(&mut self, status: &SessionStatus) -> anyhow::Result<()> {
        let title = format!("{} - {status}", self.title);
        self.canvas.window_mut().set_title(&title)?;
        Ok(())
    }
}

fn to_color(color: Rgb) -> Color {
    Color::RGB(color[0], color[1], color[2])
}

impl Surface for Screen {
    fn fill(&mut self, color: Rgb) -> Result<(), String> {
        self.canvas.set_draw_color(to_color(color));
        self.canvas.clear();
        Ok(())
    }

    fn fill_square(&mut self, x: u32, y: u32, size: u32, color: Rgb) -> Result<(), String> {
        self.canvas.set_draw_color(to_color(color));
        self.canvas
            .fill_rect(Rect::new(x as i32, y as i32, size, size))
    }

    fn present(&mut self) -> Result<(), String> {
        // Present the new render to the application window so the player actually sees it
        self.canvas.present();
        Ok(())
    }
}
