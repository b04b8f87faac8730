mod svg;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::{debug, info};
use warehouse_map::camera::Point;
use warehouse_map::config::{ConfigError, MapConfig};
use warehouse_map::engine::{Action, EngineCore};
use warehouse_map::input::{Button, Modifiers};
use warehouse_map::schedule::{ManualScheduler, Scheduler};
use warehouse_map::slot::{Slot, SlotId};
use warehouse_map::surface::SurfaceError;

use crate::svg::SvgSurface;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("render failed: {0}")]
    Render(#[from] SurfaceError),
    #[error("viewport must be positive, got {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
    #[error("no slot with id `{0}`")]
    UnknownSlot(String),
}

#[derive(Parser, Debug)]
#[command(name = "warehouse-map", about = "Headless warehouse slot map renderer and hit tester")]
struct Cli {
    /// Map configuration JSON. Defaults apply when omitted.
    #[arg(long, env = "WAREHOUSE_MAP_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, default_value = "-", help = "Slot list JSON file, or - for stdin")]
    slots: String,

    /// Viewport width in CSS pixels.
    #[arg(long, default_value_t = 1000.0)]
    width: f64,

    /// Viewport height in CSS pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Log engine transitions to stderr.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the map to SVG.
    Render {
        #[arg(long, default_value = "-", help = "Output file path, or - for stdout")]
        out: String,
        /// Slot id to draw hovered.
        #[arg(long)]
        hover: Option<String>,
        /// Slot ids to draw multi-selected.
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
    },
    /// Print the topmost slot under a screen point.
    Hit { x: f64, y: f64 },
    /// Drag a selection marquee between two screen points and print the intents.
    Select {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        /// Keep the slots given here selected and add the marquee result.
        #[arg(long, value_delimiter = ',')]
        extend: Vec<String>,
    },
    /// Press a screen point and print the resulting intents.
    Click {
        x: f64,
        y: f64,
        /// Press twice inside the double-click window.
        #[arg(long, default_value_t = false)]
        double: bool,
    },
    /// Print fit, alignment, and culling figures.
    Stats,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_writer(io::stderr).with_max_level(level).init();

    if cli.width.is_nan() || cli.height.is_nan() || cli.width <= 0.0 || cli.height <= 0.0 {
        return Err(CliError::InvalidViewport { width: cli.width, height: cli.height });
    }

    let config = match &cli.config {
        Some(path) => MapConfig::from_json(&fs::read_to_string(path)?)?,
        None => MapConfig::default(),
    };
    let slots: Vec<Slot> = serde_json::from_str(&read_input(&cli.slots)?)?;
    info!(slots = slots.len(), width = cli.width, height = cli.height, "loaded map");

    let mut core = EngineCore::new(config, ManualScheduler::new());
    core.set_viewport(cli.width, cli.height, 1.0);
    core.set_slots(slots);

    match cli.command {
        Command::Render { out, hover, select } => run_render(&mut core, &out, hover.as_deref(), &select),
        Command::Hit { x, y } => run_hit(&core, Point::new(x, y)),
        Command::Select { x0, y0, x1, y1, extend } => {
            run_select(&mut core, Point::new(x0, y0), Point::new(x1, y1), &extend)
        }
        Command::Click { x, y, double } => run_click(&mut core, Point::new(x, y), double),
        Command::Stats => run_stats(&mut core),
    }
}

fn run_render(core: &mut EngineCore, out: &str, hover: Option<&str>, select: &[String]) -> Result<(), CliError> {
    if let Some(id) = hover {
        core.ui.hover_id = Some(resolve_id(core, id)?);
    }
    for id in select {
        let id = resolve_id(core, id)?;
        core.add_to_selection(&id);
    }

    let mut surface = SvgSurface::new(core.viewport_width, core.viewport_height, &core.config.background_color);
    core.render_to(&mut surface)?;
    debug!(elements = surface.element_count(), "rendered");

    let document = surface.finish();
    if out == "-" {
        print!("{document}");
    } else {
        fs::write(out, document)?;
        info!(path = out, "wrote svg");
    }
    Ok(())
}

fn run_hit(core: &EngineCore, screen_pt: Point) -> Result<(), CliError> {
    let hit = core.hit(screen_pt).map(serde_json::to_value).transpose()?;
    print_json(&hit.unwrap_or(Value::Null))
}

fn run_select(core: &mut EngineCore, from: Point, to: Point, extend: &[String]) -> Result<(), CliError> {
    for id in extend {
        let id = resolve_id(core, id)?;
        core.add_to_selection(&id);
    }
    let modifiers = Modifiers { ctrl: true, shift: !extend.is_empty(), ..Modifiers::default() };

    let mut actions = core.on_pointer_down(from, Button::Primary, modifiers);
    actions.extend(core.on_pointer_move(to, modifiers));
    actions.extend(core.on_pointer_up(to, Button::Primary, modifiers));
    print_actions(&actions)
}

fn run_click(core: &mut EngineCore, screen_pt: Point, double: bool) -> Result<(), CliError> {
    let mut actions = press(core, screen_pt);
    if double {
        actions.extend(advance(core, 100.0));
        actions.extend(press(core, screen_pt));
    }
    actions.extend(advance(core, 1000.0));
    print_actions(&actions)
}

fn run_stats(core: &mut EngineCore) -> Result<(), CliError> {
    let bounds = core.bounds();
    let offset = core.offset();
    let visible = {
        let mut probe = SvgSurface::new(core.viewport_width, core.viewport_height, &core.config.background_color);
        core.render_to(&mut probe)?;
        core.stats
    };
    print_json(&json!({
        "scale": core.scale(),
        "offset": { "x": offset.x, "y": offset.y },
        "bounds": {
            "minX": bounds.min_x,
            "minY": bounds.min_y,
            "maxX": bounds.max_x,
            "maxY": bounds.max_y,
        },
        "visibleSlots": visible.visible_slots,
        "totalSlots": visible.total_slots,
    }))
}

fn press(core: &mut EngineCore, screen_pt: Point) -> Vec<Action> {
    let mut actions = core.on_pointer_down(screen_pt, Button::Primary, Modifiers::default());
    actions.extend(core.on_pointer_up(screen_pt, Button::Primary, Modifiers::default()));
    actions
}

fn advance(core: &mut EngineCore, ms: f64) -> Vec<Action> {
    let due = core.scheduler.advance(ms);
    debug!(now = core.scheduler.now_ms(), due = due.len(), "advanced clock");
    due.into_iter().flat_map(|id| core.on_timer(id)).collect()
}

/// Match a command-line id against the loaded slots by its display form.
fn resolve_id(core: &EngineCore, raw: &str) -> Result<SlotId, CliError> {
    core.slots
        .as_slice()
        .iter()
        .find(|s| s.id.to_string() == raw)
        .map(|s| s.id.clone())
        .ok_or_else(|| CliError::UnknownSlot(raw.to_owned()))
}

fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn print_actions(actions: &[Action]) -> Result<(), CliError> {
    let intents: Vec<&Action> = actions.iter().filter(|a| **a != Action::RenderNeeded).collect();
    print_json(&serde_json::to_value(intents)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
