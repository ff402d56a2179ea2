/// Example: render a few frames off-screen and print the last one
///
/// Usage: cargo run --example snapshot -- [arm|cuboids] [frames]
use cuboids_core::{render, update, DemoConfig, DemoKind, FrameContext, Mesh};
use cuboids_terminal::AsciiRenderer;
use std::env;
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let demo: DemoKind = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(DemoKind::Arm);
    let frames: u64 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(30);

    let config = DemoConfig::preset(demo);
    let mut renderer = AsciiRenderer::new(100, 40, Mesh::cube(1.0), config.presentation);
    let mut context = FrameContext::new(&config.with_aspect(renderer.aspect()))?;

    let index_count = renderer.index_count();
    for _ in 0..frames {
        context = update(context);
        render(&mut context, &mut renderer, index_count)?;
    }

    let mut stdout = io::stdout();
    renderer.draw(&mut stdout)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
