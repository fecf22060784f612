use serde::Serialize;
use tracing_subscriber::EnvFilter;

use greenread_core::ShotParams;
use greenread_engine::{Engine, EngineConfig, SweepAxis, SweepOptions};

const USAGE: &str = "usage: greenread <simulate|solve-speed|solve-angle|sweep-angle|sweep-slope|sweep-overrun> \
[--distance=M] [--slope=DEG] [--stimp=FT] [--angle=DEG] [--overrun=M] \
[--step=X] [--no-minus] [--no-plus] [--config=PATH]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Simulate,
    SolveSpeed,
    SolveAngle,
    Sweep(SweepAxis),
}

impl Command {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "simulate" => Some(Self::Simulate),
            "solve-speed" => Some(Self::SolveSpeed),
            "solve-angle" => Some(Self::SolveAngle),
            "sweep-angle" => Some(Self::Sweep(SweepAxis::LaunchAngle)),
            "sweep-slope" => Some(Self::Sweep(SweepAxis::Slope)),
            "sweep-overrun" => Some(Self::Sweep(SweepAxis::Overrun)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Invocation {
    command: Command,
    params: ShotParams,
    sweep: SweepOptions,
    config_path: Option<String>,
}

fn parse_number(flag: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {flag}: {value} ({e})"))
}

fn parse_args<I>(args: I) -> Result<Invocation, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let name = args.next().ok_or_else(|| USAGE.to_string())?;
    let command = Command::parse(&name).ok_or_else(|| format!("unknown command: {name}"))?;

    let mut params = ShotParams::default();
    let mut sweep = SweepOptions::default();
    let mut config_path = None;

    for arg in args {
        if arg == "--no-minus" {
            sweep.include_minus = false;
            continue;
        }
        if arg == "--no-plus" {
            sweep.include_plus = false;
            continue;
        }
        let (flag, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected --flag=value, got {arg}"))?;
        match flag {
            "--distance" => params.distance_to_target = parse_number(flag, value)?,
            "--slope" => params.slope_deg = parse_number(flag, value)?,
            "--stimp" => params.stimp_feet = parse_number(flag, value)?,
            "--angle" => params.launch_angle_deg = parse_number(flag, value)?,
            "--overrun" => params.overrun = parse_number(flag, value)?,
            "--step" => sweep.step = Some(parse_number(flag, value)?),
            "--config" => config_path = Some(value.to_string()),
            _ => return Err(format!("unknown flag: {flag}")),
        }
    }

    Ok(Invocation {
        command,
        params: params.clamped(),
        sweep,
        config_path,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn run(invocation: &Invocation) -> Result<(), String> {
    let config = match &invocation.config_path {
        Some(path) => EngineConfig::from_path(path).map_err(|e| format!("{path}: {e}"))?,
        None => EngineConfig::load(),
    };
    let engine = Engine::new(config).map_err(|e| e.to_string())?;
    let params = &invocation.params;
    tracing::debug!(
        command = ?invocation.command,
        ?params,
        resistance = ?engine.config().integrator.resistance,
        slope = ?engine.config().integrator.slope,
        "running"
    );

    match invocation.command {
        Command::Simulate => print_json(&engine.simulate(params).map_err(|e| e.to_string())?),
        Command::SolveSpeed => {
            let solution = engine.solve_launch_speed(params).map_err(|e| e.to_string())?;
            if !solution.is_converged() {
                tracing::warn!(status = ?solution.status, "speed solution is a best effort");
            }
            print_json(&solution)
        },
        Command::SolveAngle => {
            print_json(&engine.solve_launch_angle(params).map_err(|e| e.to_string())?)
        },
        Command::Sweep(axis) => print_json(
            &engine
                .sweep(params, axis, &invocation.sweep)
                .map_err(|e| e.to_string())?,
        ),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let result = parse_args(std::env::args().skip(1)).and_then(|invocation| run(&invocation));
    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("greenread: {e}");
        std::process::exit(1);
    }
}
