use std::cell::RefCell;
use std::fs;
use std::io::{self, Read};
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use kurbo::Point;
use manipulate::bbox::OrientedBox;
use manipulate::handles::HandleShape;
use manipulate::input::Modifiers;
use manipulate::{
    ConfigError, Cursor, LayerId, PointerEvent, SelectionError, Shape, ShapeId, Surface, TransformConfig,
    TransformCore, TransformEvent, TransformOptions,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("selection rejected: {0}")]
    Selection(#[from] SelectionError),
    #[error("resolution must be a positive number, got {0}")]
    InvalidResolution(f64),
}

#[derive(Parser, Debug)]
#[command(name = "manipulate", about = "Replay pointer gestures through the shape transform engine")]
struct Cli {
    /// JSON config file overriding the script's own `config` block.
    #[arg(long, env = "MANIPULATE_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a gesture script and print events and final shapes.
    Replay(ReplayArgs),
    /// Print the oriented box and handles of the script's initial selection.
    Handles(InputArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    #[arg(default_value = "-", help = "Script file path, or - for stdin")]
    input: String,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Only print the final shapes.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

/// A scene plus the pointer steps to run against it.
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default = "default_resolution")]
    resolution: f64,
    #[serde(default)]
    config: Option<TransformConfig>,
    shapes: Vec<Shape>,
    #[serde(default)]
    select: Vec<ShapeId>,
    #[serde(default)]
    steps: Vec<Step>,
}

fn default_resolution() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Step {
    Down(StepPointer),
    Drag(StepPointer),
    Up(StepPointer),
    Move(StepPointer),
}

#[derive(Debug, Deserialize)]
struct StepPointer {
    x: f64,
    y: f64,
    #[serde(default)]
    modifiers: Modifiers,
}

impl StepPointer {
    fn event(&self) -> PointerEvent {
        PointerEvent::at(self.x, self.y).with_modifiers(self.modifiers)
    }
}

#[derive(Debug, Serialize)]
struct StepResult {
    step: usize,
    /// Whether a press started, or a release ended, a gesture.
    #[serde(skip_serializing_if = "Option::is_none")]
    handled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'static str>,
}

#[derive(Serialize)]
struct ReplayReport<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<TransformEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    steps: Vec<StepResult>,
    selection: &'a [ShapeId],
    shapes: Vec<&'a Shape>,
}

#[derive(Serialize)]
struct HandlesReport<'a> {
    selection: &'a [ShapeId],
    boxes: Vec<BoxReport>,
    handles: &'a [HandleShape],
}

#[derive(Serialize)]
struct BoxReport {
    shape: ShapeId,
    corners: [Point; 4],
    angle: f64,
}

/// Surface with a fixed view resolution and no drawing.
struct StaticSurface {
    resolution: f64,
}

impl Surface for StaticSurface {
    fn resolution(&self) -> f64 {
        self.resolution
    }

    fn add_layer(&mut self, layer: LayerId) {
        debug!(%layer, "overlay layer added");
    }

    fn remove_layer(&mut self, layer: LayerId) {
        debug!(%layer, "overlay layer removed");
    }
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let cli = Cli::parse();
    let override_config = cli.config.as_deref().map(load_config).transpose()?;

    match cli.command {
        Command::Replay(args) => run_replay(&args, override_config),
        Command::Handles(args) => run_handles(&args, override_config),
    }
}

fn load_config(path: &str) -> Result<TransformConfig, CliError> {
    let raw = read_input(path)?;
    Ok(TransformConfig::from_json(&raw)?)
}

fn read_input(path: &str) -> Result<String, CliError> {
    let read = if path == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw).map(|_| raw)
    } else {
        fs::read_to_string(path)
    };
    read.map_err(|source| CliError::Read { path: path.to_owned(), source })
}

/// Parse the script and build an attached engine holding its shapes and
/// selection. Returns the engine and the steps still to run.
fn prepare(input: &InputArgs, override_config: Option<TransformConfig>) -> Result<(TransformCore, Vec<Step>), CliError> {
    let raw = read_input(&input.input)?;
    let script: Script = serde_json::from_str(&raw)?;
    if !(script.resolution.is_finite() && script.resolution > 0.0) {
        return Err(CliError::InvalidResolution(script.resolution));
    }
    let config = override_config.or(script.config).unwrap_or_default();
    config.validate()?;

    let mut core = TransformCore::new(TransformOptions::new(config));
    core.attach(Box::new(StaticSurface { resolution: script.resolution }));
    info!(shapes = script.shapes.len(), steps = script.steps.len(), "scene loaded");
    core.doc.load(script.shapes);
    if !script.select.is_empty() {
        core.set_selection(&script.select)?;
    }
    Ok((core, script.steps))
}

fn run_replay(args: &ReplayArgs, override_config: Option<TransformConfig>) -> Result<(), CliError> {
    let (mut core, steps) = prepare(&args.input, override_config)?;

    let log: Rc<RefCell<Vec<TransformEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    core.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let mut results = Vec::with_capacity(steps.len());
    for (step, action) in steps.iter().enumerate() {
        let result = match action {
            Step::Down(p) => StepResult { step, handled: Some(core.on_pointer_down(&p.event())), cursor: None },
            Step::Drag(p) => {
                core.on_pointer_drag(&p.event());
                StepResult { step, handled: None, cursor: None }
            }
            Step::Up(p) => StepResult { step, handled: Some(core.on_pointer_up(&p.event())), cursor: None },
            Step::Move(p) => {
                let cursor: Cursor = core.on_pointer_move(&p.event());
                StepResult { step, handled: None, cursor: Some(cursor.as_css()) }
            }
        };
        results.push(result);
    }

    let events = log.borrow().clone();
    info!(events = events.len(), "replay finished");
    let shapes = core.doc.sorted_shapes();
    let report = if args.quiet {
        ReplayReport { events: Vec::new(), steps: Vec::new(), selection: core.selection(), shapes }
    } else {
        ReplayReport { events, steps: results, selection: core.selection(), shapes }
    };
    print_json(&report)
}

fn run_handles(args: &InputArgs, override_config: Option<TransformConfig>) -> Result<(), CliError> {
    let (core, _) = prepare(args, override_config)?;
    let boxes = core
        .selection()
        .iter()
        .filter_map(|id| core.doc.get(id))
        .filter_map(|shape| {
            OrientedBox::of_shape(shape).map(|b| BoxReport { shape: shape.id, corners: b.corners, angle: b.angle })
        })
        .collect();
    let report = HandlesReport { selection: core.selection(), boxes, handles: core.overlay().handles() };
    print_json(&report)
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
