/// Terminal host for the cuboid demos
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use cuboids_core::{render, update, DemoConfig, DemoKind, FrameContext, Mesh};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Rows taken by the status line above the viewport
const HUD_ROWS: u16 = 1;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    demo: DemoKind,
    renderer: AsciiRenderer,
    frame_time: Duration,
    running: bool,
    last_fps_sample: Instant,
    frames_since_sample: u32,
    fps: f32,
}

impl TerminalApp {
    /// Size the viewport to the current terminal and build the frame
    /// context with a matching aspect ratio.
    pub fn new(config: DemoConfig) -> anyhow::Result<(Self, FrameContext)> {
        let (width, height) = terminal::size()?;
        let renderer = AsciiRenderer::new(
            width as usize,
            height.saturating_sub(HUD_ROWS) as usize,
            Mesh::cube(1.0),
            config.presentation,
        );
        let config = config.with_aspect(renderer.aspect());
        let context = FrameContext::new(&config)?;
        tracing::info!(
            demo = %config.demo,
            width = renderer.width(),
            height = renderer.height(),
            "terminal viewport ready"
        );

        let app = Self {
            demo: config.demo,
            renderer,
            frame_time: Duration::from_millis(config.clock.frame_millis() as u64),
            running: true,
            last_fps_sample: Instant::now(),
            frames_since_sample: 0,
            fps: 0.0,
        };
        Ok((app, context))
    }

    /// Run until the quit key is pressed; returns the final frame context.
    pub fn run(&mut self, context: FrameContext) -> io::Result<FrameContext> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop(context);

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self, mut context: FrameContext) -> io::Result<FrameContext> {
        execute!(stdout(), terminal::Clear(ClearType::All))?;

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            context = update(context);
            self.render(&mut context)?;

            // One frame per tick; a slow frame is not made up for
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            self.frames_since_sample += 1;
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps =
                    self.frames_since_sample as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frames_since_sample = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(context)
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            if matches!(code, KeyCode::Char('q') | KeyCode::Esc) {
                self.running = false;
            }
        }
        Ok(())
    }

    fn render(&mut self, context: &mut FrameContext) -> io::Result<()> {
        let index_count = self.renderer.index_count();
        let stats = render(context, &mut self.renderer, index_count)?;

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, HUD_ROWS))?;
        self.renderer.draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Cuboids | {} | frame {} | draws {} | FPS: {:.1} | Q=Quit",
                self.demo, stats.frame, stats.draws, self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
