//! variate-runner: headless driver for the variate engine.
//!
//! Usage:
//!   variate-runner --seed 42 --family triangular --a 0 --b 0.5 --c 1 --count 10
//!   variate-runner --preset data/presets/modulation.json --min 0.3 --max 0.6
//!   variate-runner --family gaussian --a 0.2 --b 0.5 --block 64 --rate audio
//!   variate-runner --type 2 --min 0.2 --max 0.8 --block 1 --rate button --count 4
//!   variate-runner --seed 42 --ipc-mode

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::{self, BufRead, Write};
use variate_core::{
    config::{EngineConfig, FamilySettings},
    Family, Seed, VariateEngine, VariateError, VariateResult,
};

/// Attempt budget plugin hosts use for bounded draws.
const HOST_ATTEMPTS: u32 = 128;

/// Largest block or batch a single command may ask for.
const MAX_BLOCK: usize = 8192;

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Reseed { seed: Seed },
    Configure { settings: FamilySettings },
    Activate { family: Family },
    /// Host "Type" list index, see [`Family::from_host_selector`].
    SelectType { index: i32 },
    SetShapes { a: f64, b: f64 },
    SetWindow { min: f64, max: f64 },
    SetRate { rate: RateMode },
    Draw {
        #[serde(default = "one")]
        count: usize,
    },
    DrawBounded {
        min: f64,
        max: f64,
        #[serde(default = "host_attempts")]
        attempts: u32,
    },
    Trigger,
    Process { block: usize },
    Quit,
}

fn one() -> usize { 1 }
fn host_attempts() -> u32 { HOST_ATTEMPTS }

#[derive(Serialize)]
struct EngineState {
    seed:            Seed,
    active_family:   Family,
    rejection_limit: u32,
    rate:            RateMode,
    window:          Option<HostWindow>,
}

/// When a host output is refreshed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RateMode {
    /// Only on an explicit trigger; processing blocks stay empty.
    Button,
    /// One value per block.
    #[default]
    Control,
    /// One value per sample.
    Audio,
}

impl std::str::FromStr for RateMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "button"  => Ok(Self::Button),
            "control" => Ok(Self::Control),
            "audio"   => Ok(Self::Audio),
            other     => bail!("Unknown rate '{other}', expected button|control|audio"),
        }
    }
}

/// The interval host draws are confined to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct HostWindow {
    min:      f64,
    max:      f64,
    attempts: u32,
}

impl HostWindow {
    fn new(min: f64, max: f64) -> Self {
        Self { min, max, attempts: HOST_ATTEMPTS }
    }
}

/// Engine plus the host-side controls that sit in front of it.
struct HostSession {
    engine: VariateEngine,
    window: Option<HostWindow>,
    rate:   RateMode,
}

impl HostSession {
    fn new(engine: VariateEngine) -> Self {
        Self { engine, window: None, rate: RateMode::default() }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let mut engine = match flag_value(&args, "--preset") {
        Some(path) => EngineConfig::load(path)?.build_engine()?,
        None => VariateEngine::new(),
    };
    if let Some(seed) = flag_value(&args, "--seed").and_then(|s| s.parse::<Seed>().ok()) {
        engine.reseed(seed);
    }

    let window = window_from_flags(&args)?;
    let block = flag_value(&args, "--block").map(str::parse::<usize>).transpose()?;

    // Block mode stands in for the host, where moving the window
    // re-derives the window-shaped families.
    if block.is_some() || ipc_mode {
        if let Some(w) = window {
            apply_window(&mut engine, w.min, w.max)?;
        }
    }
    if let Some(index) = flag_value(&args, "--type") {
        engine.activate(Family::from_host_selector(index.parse()?));
    }
    if let Some(name) = flag_value(&args, "--family") {
        let family: Family = name.parse()?;
        configure_from_flags(&mut engine, family, &args)?;
    }

    let rate: RateMode = flag_value(&args, "--rate").unwrap_or("control").parse()?;

    if ipc_mode {
        let mut session = HostSession { engine, window, rate };
        return run_ipc_loop(&mut session);
    }

    let count = parse_arg(&args, "--count", 10usize);
    match block {
        Some(block) => run_blocks(&mut engine, window, count, block, rate),
        None => run_batch(&mut engine, window, count),
    }
}

/// Build a family's settings from --a/--b/--c, falling back to the
/// engine's construction defaults for any flag left out.
fn settings_from_flags(family: Family, args: &[String]) -> Option<FamilySettings> {
    let a = |d| parse_arg(args, "--a", d);
    let b = |d| parse_arg(args, "--b", d);
    let c = |d| parse_arg(args, "--c", d);
    Some(match family {
        Family::Uniform     => FamilySettings::Uniform { low: a(0.0), high: b(1.0) },
        Family::Linear      => FamilySettings::Linear,
        Family::Triangular  => FamilySettings::Triangular {
            lower_limit: a(0.0),
            peak:        b(0.5),
            upper_limit: c(1.0),
        },
        Family::Exponential => FamilySettings::Exponential { lambda: a(1.0) },
        Family::Bilateral   => FamilySettings::Bilateral { lambda: a(1.0) },
        Family::Gaussian    => FamilySettings::Gaussian { deviation: a(1.0), mean: b(0.0) },
        Family::Cauchy      => FamilySettings::Cauchy { spread: a(1.0), mean: b(0.0) },
        Family::Beta        => FamilySettings::Beta { shape_a: a(0.5), shape_b: b(0.5) },
        Family::Weibull     => FamilySettings::Weibull { shape: a(1.0), scale: b(1.0) },
        Family::Poisson     => return None,
    })
}

fn configure_from_flags(engine: &mut VariateEngine, family: Family, args: &[String]) -> Result<()> {
    match settings_from_flags(family, args) {
        Some(settings) => {
            engine.configure(settings.validate()?);
        }
        None => select_family(engine, family),
    }
    Ok(())
}

fn select_family(engine: &mut VariateEngine, family: Family) {
    if !family.is_implemented() {
        log::warn!("{family} has no sampler; draws will fail until another family is selected");
    }
    engine.activate(family);
}

fn window_from_flags(args: &[String]) -> Result<Option<HostWindow>> {
    let Some((lo, hi)) = flag_value(args, "--min").zip(flag_value(args, "--max")) else {
        return Ok(None);
    };
    let mut window = HostWindow::new(lo.parse()?, hi.parse()?);
    window.attempts = parse_arg(args, "--attempts", HOST_ATTEMPTS);
    Ok(Some(window))
}

/// Push one shape pair into every family that takes free shape
/// parameters, then restore the family that was active before.
/// All five records are validated before any is stored.
fn apply_shapes(engine: &mut VariateEngine, a: f64, b: f64) -> VariateResult<()> {
    let fan_out = [
        FamilySettings::Bilateral { lambda: a },
        FamilySettings::Exponential { lambda: a * 5.0 },
        FamilySettings::Cauchy { spread: a, mean: b },
        FamilySettings::Gaussian { deviation: a, mean: b },
        FamilySettings::Weibull { shape: a * 0.99 + 0.01, scale: b },
    ];
    install_keeping_active(engine, &fan_out)
}

/// Re-derive Uniform(min, max) and the symmetric Triangular over the
/// window. An empty or inverted window changes nothing; returns whether
/// the records were replaced.
fn apply_window(engine: &mut VariateEngine, min: f64, max: f64) -> VariateResult<bool> {
    if !(max > min) {
        log::warn!("window [{min}, {max}] is empty, keeping current records");
        return Ok(false);
    }
    let derived = [
        FamilySettings::Triangular {
            lower_limit: min,
            peak:        min + (max - min) * 0.5,
            upper_limit: max,
        },
        FamilySettings::Uniform { low: min, high: max },
    ];
    install_keeping_active(engine, &derived)?;
    Ok(true)
}

fn install_keeping_active(engine: &mut VariateEngine, settings: &[FamilySettings]) -> VariateResult<()> {
    let validated = settings
        .iter()
        .map(FamilySettings::validate)
        .collect::<VariateResult<Vec<_>>>()?;

    let active = engine.active_family();
    for params in validated {
        engine.configure(params);
    }
    engine.activate(active);
    Ok(())
}

/// A bounded draw the way the plugin host consumed it: an exhausted
/// window yields `min`.
fn host_draw(engine: &mut VariateEngine, min: f64, max: f64, attempts: u32) -> Result<(f64, bool)> {
    match engine.draw_bounded_strict(min, max, attempts) {
        Ok(v) => Ok((v, false)),
        Err(VariateError::BoundedExhausted { .. }) => {
            log::warn!("no draw in [{min}, {max}], substituting min");
            Ok((min, true))
        }
        Err(e) => Err(e.into()),
    }
}

/// One output value. An empty or inverted window outputs 0.0 without
/// drawing; no window means an unbounded draw.
fn next_value(engine: &mut VariateEngine, window: Option<HostWindow>) -> Result<(f64, bool)> {
    match window {
        Some(w) if !(w.min < w.max) => Ok((0.0, false)),
        Some(w) => host_draw(engine, w.min, w.max, w.attempts),
        None => Ok((engine.draw()?, false)),
    }
}

/// Values produced for one processing block of `block` samples.
fn fill_block(
    engine: &mut VariateEngine,
    window: Option<HostWindow>,
    rate: RateMode,
    block: usize,
) -> Result<Vec<f64>> {
    if block > MAX_BLOCK {
        bail!("block of {block} exceeds the maximum of {MAX_BLOCK}");
    }
    let slots = match rate {
        RateMode::Button  => 0,
        RateMode::Control => 1,
        RateMode::Audio   => block,
    };
    (0..slots)
        .map(|_| Ok::<_, anyhow::Error>(next_value(engine, window)?.0))
        .collect()
}

/// A trigger press. Only button rate responds to it.
fn trigger(engine: &mut VariateEngine, window: Option<HostWindow>, rate: RateMode) -> Result<Option<f64>> {
    match rate {
        RateMode::Button => Ok(Some(next_value(engine, window)?.0)),
        RateMode::Control | RateMode::Audio => Ok(None),
    }
}

fn run_batch(engine: &mut VariateEngine, window: Option<HostWindow>, count: usize) -> Result<()> {
    println!("variate-runner");
    println!("  seed:      {}", engine.seed());
    println!("  family:    {}", engine.active_family());
    println!("  count:     {count}");
    println!();

    let mut values = Vec::with_capacity(count.min(MAX_BLOCK));
    let mut fallbacks = 0usize;
    for _ in 0..count {
        let (v, fell_back) = next_value(engine, window)?;
        if fell_back {
            fallbacks += 1;
        }
        println!("{v}");
        values.push(v);
    }
    print_summary(&values, fallbacks);
    Ok(())
}

/// Emulate `count` host cycles. Button rate fires one trigger per cycle.
fn run_blocks(
    engine: &mut VariateEngine,
    window: Option<HostWindow>,
    count: usize,
    block: usize,
    rate: RateMode,
) -> Result<()> {
    for _ in 0..count {
        let buffer = match trigger(engine, window, rate)? {
            Some(v) => vec![v],
            None => fill_block(engine, window, rate, block)?,
        };
        let line: Vec<String> = buffer.iter().map(|v| format!("{v:.6}")).collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}

fn run_ipc_loop(session: &mut HostSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let reply = serde_json::json!({ "error": e.to_string(), "state_unchanged": true });
                writeln!(stdout, "{reply}")?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }
        let reply = match handle_command(session, cmd) {
            Ok(reply) => reply,
            Err(e) => error_reply(&e),
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

/// Validation failures are guaranteed to leave the engine untouched;
/// clients can skip a `get_state` round trip for those.
fn error_reply(e: &anyhow::Error) -> serde_json::Value {
    let state_unchanged = e
        .downcast_ref::<VariateError>()
        .is_some_and(VariateError::is_validation);
    serde_json::json!({ "error": e.to_string(), "state_unchanged": state_unchanged })
}

fn handle_command(session: &mut HostSession, cmd: IpcCommand) -> Result<serde_json::Value> {
    let engine = &mut session.engine;
    match cmd {
        IpcCommand::GetState | IpcCommand::Quit => {}
        IpcCommand::Reseed { seed } => engine.reseed(seed),
        IpcCommand::Configure { settings } => {
            engine.configure(settings.validate()?);
        }
        IpcCommand::Activate { family } => select_family(engine, family),
        IpcCommand::SelectType { index } => {
            engine.activate(Family::from_host_selector(index));
        }
        IpcCommand::SetShapes { a, b } => apply_shapes(engine, a, b)?,
        IpcCommand::SetWindow { min, max } => {
            apply_window(engine, min, max)?;
            let attempts = session.window.map_or(HOST_ATTEMPTS, |w| w.attempts);
            session.window = Some(HostWindow { min, max, attempts });
        }
        IpcCommand::SetRate { rate } => session.rate = rate,
        IpcCommand::Draw { count } => {
            if count > MAX_BLOCK {
                bail!("draw count {count} exceeds the maximum of {MAX_BLOCK}");
            }
            let values = (0..count)
                .map(|_| engine.draw())
                .collect::<VariateResult<Vec<_>>>()?;
            return Ok(serde_json::json!({ "values": values }));
        }
        IpcCommand::DrawBounded { min, max, attempts } => {
            let value = engine.draw_bounded(min, max, attempts)?;
            return Ok(serde_json::json!({ "value": value }));
        }
        IpcCommand::Trigger => {
            let value = trigger(engine, session.window, session.rate)?;
            return Ok(serde_json::json!({ "value": value }));
        }
        IpcCommand::Process { block } => {
            let values = fill_block(engine, session.window, session.rate, block)?;
            return Ok(serde_json::json!({ "values": values }));
        }
    }
    Ok(serde_json::to_value(build_state(session))?)
}

fn build_state(session: &HostSession) -> EngineState {
    EngineState {
        seed:            session.engine.seed(),
        active_family:   session.engine.active_family(),
        rejection_limit: session.engine.rejection_limit(),
        rate:            session.rate,
        window:          session.window,
    }
}

fn print_summary(values: &[f64], fallbacks: usize) {
    if values.is_empty() {
        return;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    println!();
    println!("=== SUMMARY ===");
    println!("  draws:      {}", values.len());
    println!("  mean:       {mean:.6}");
    println!("  min:        {min:.6}");
    println!("  max:        {max:.6}");
    println!("  fallbacks:  {fallbacks}");
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
