use anyhow::{Result, bail};
use ink_config::InkConfig;
use ink_core::{Canvas, LineStyle, Point, SolidFill, Stroke, TessellatorContext, WindingRule};

mod logging_renderer;
use logging_renderer::LoggingRenderer;

/// Badge: a rounded, outlined shape with a hole.
fn record_badge(canvas: &mut Canvas) {
    canvas.winding_style(WindingRule::EvenOdd);
    canvas.line_style(LineStyle { stroke: Stroke::with_thickness(2.0), fill: SolidFill::new(0x202020, 1.0) });
    canvas.begin_fill(SolidFill::new(0x3A7BD5, 1.0));
    canvas.move_to(Point::new(10.0, 0.0), false);
    canvas.line_to(Point::new(90.0, 0.0), false);
    canvas.quadratic_curve_to(Point::new(100.0, 0.0), Point::new(100.0, 10.0), false, false);
    canvas.line_to(Point::new(100.0, 50.0), false);
    canvas.quadratic_curve_to(Point::new(100.0, 60.0), Point::new(90.0, 60.0), false, false);
    canvas.line_to(Point::new(10.0, 60.0), false);
    canvas.quadratic_curve_to(Point::new(0.0, 60.0), Point::new(0.0, 50.0), false, false);
    canvas.line_to(Point::new(0.0, 10.0), false);
    canvas.quadratic_curve_to(Point::ZERO, Point::new(10.0, 0.0), false, false);

    canvas.move_to(Point::new(40.0, 20.0), false);
    canvas.line_to(Point::new(20.0, 0.0), true);
    canvas.line_to(Point::new(0.0, 20.0), true);
    canvas.line_to(Point::new(-20.0, 0.0), true);
    canvas.line_to(Point::new(0.0, -20.0), true);
    canvas.end_fill();
}

/// Wave: a stroked cubic run, useful with a length budget.
fn record_wave(canvas: &mut Canvas) {
    canvas.line_style(LineStyle { stroke: Stroke::with_thickness(3.0), fill: SolidFill::new(0xD53A7B, 1.0) });
    canvas.move_to(Point::new(0.0, 30.0), false);
    canvas.cubic_curve_to(Point::new(20.0, 0.0), Point::new(40.0, 60.0), Point::new(60.0, 30.0), false, false);
    canvas.cubic_curve_to(Point::ZERO, Point::new(100.0, 0.0), Point::new(120.0, 30.0), false, true);
}

fn main() -> Result<()> {
    env_logger::init();

    let config = InkConfig::load();
    let mut canvas = Canvas::from_config(&config.canvas);
    let mut tess = TessellatorContext::from_config(&config.tessellation);

    let scene = std::env::var("DEMO_SCENE").ok();
    let wants = |name: &str| {
        scene.as_deref() == Some(name) || std::env::args().any(|a| a == format!("--scene={name}"))
    };
    if wants("wave") {
        record_wave(&mut canvas);
        if let Some(length) = std::env::args().find_map(|a| a.strip_prefix("--max-length=").map(str::to_owned)) {
            canvas.set_max_length(length.parse()?);
        }
    } else if scene.is_none() || wants("badge") {
        record_badge(&mut canvas);
    } else {
        bail!("unknown scene {scene:?}; expected badge or wave");
    }

    canvas.build(&mut tess);
    log::info!(
        "{} render groups, bounds {:?}, with stroke {:?}",
        canvas.render_groups().len(),
        canvas.bounds(),
        canvas.bounds_with_stroke(),
    );

    let probe = Point::new(50.0, 30.0);
    match canvas.contains_point(probe, false, true) {
        Some(group) => log::info!("{probe:?} hits a {:?} group", group.draw_mode),
        None => log::info!("{probe:?} misses"),
    }

    let mut renderer = LoggingRenderer::new();
    let vertices = canvas.draw(&mut renderer);
    log::info!("submitted {vertices} vertices in {} calls", renderer.calls);
    Ok(())
}
