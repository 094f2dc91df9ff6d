//! `ay38500` command-line driver
//!
//! Runs the console core against synthetic sync and key-scan stimulus and
//! writes what comes out: a per-tick CSV trace, a WAV file, or live audio.

use anyhow::{bail, Context, Result};
use ay38500::config::CoreConfig;
use ay38500::export::{export_session_to_wav, ExportConfig};
use ay38500::keyboard::{key_name, Game};
use ay38500::session::Session;
use ay38500::stimulus::{KeyPress, PressSchedule};
use ay38500::trace::TraceRecorder;
use log::{info, LevelFilter};
use std::env;
use std::fmt;
use std::io;
use std::str::FromStr;

/// Default trace length in master ticks
const DEFAULT_TRACE_TICKS: u64 = 10_000;
/// Default render length in seconds
const DEFAULT_RENDER_SECONDS: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Trace,
    Render,
    Play,
    Info,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Ok(Command::Trace),
            "render" => Ok(Command::Render),
            "play" => Ok(Command::Play),
            "info" => Ok(Command::Info),
            _ => Err(format!("Unknown command: {value}")),
        }
    }
}

impl Command {
    fn as_str(&self) -> &'static str {
        match self {
            Command::Trace => "trace",
            Command::Render => "render",
            Command::Play => "play",
            Command::Info => "info",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed command-line arguments
#[derive(Debug, Default)]
struct CliArgs {
    command: Option<Command>,
    config_path: Option<String>,
    ticks: Option<u64>,
    seconds: Option<f64>,
    out: Option<String>,
    presses: Vec<KeyPress>,
    fade: f32,
    json: bool,
    verbose: bool,
    show_help: bool,
    errors: Vec<String>,
}

impl CliArgs {
    fn parse() -> Self {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut args = Self::default();
        let mut iter = iter.into_iter();

        while let Some(arg) = iter.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
                _ => (arg.clone(), None),
            };
            let mut value = |name: &str, args: &mut CliArgs| -> Option<String> {
                let v = inline.clone().or_else(|| iter.next());
                if v.is_none() {
                    args.errors.push(format!("{name} requires an argument"));
                }
                v
            };

            match flag.as_str() {
                "--help" | "-h" => args.show_help = true,
                "--verbose" | "-v" => args.verbose = true,
                "--json" => args.json = true,
                "--config" | "-c" => args.config_path = value("--config", &mut args),
                "--out" | "-o" => args.out = value("--out", &mut args),
                "--ticks" => {
                    if let Some(v) = value("--ticks", &mut args) {
                        match v.replace('_', "").parse::<u64>() {
                            Ok(n) => args.ticks = Some(n),
                            Err(_) => args.errors.push(format!("Invalid tick count: {v}")),
                        }
                    }
                }
                "--seconds" => {
                    if let Some(v) = value("--seconds", &mut args) {
                        match v.parse::<f64>() {
                            Ok(s) if s > 0.0 => args.seconds = Some(s),
                            _ => args.errors.push(format!("Invalid duration: {v}")),
                        }
                    }
                }
                "--fade" => {
                    if let Some(v) = value("--fade", &mut args) {
                        match v.parse::<f32>() {
                            Ok(s) if s >= 0.0 => args.fade = s,
                            _ => args.errors.push(format!("Invalid fade: {v}")),
                        }
                    }
                }
                "--press" | "-p" => {
                    if let Some(v) = value("--press", &mut args) {
                        match KeyPress::parse(&v) {
                            Ok(p) => args.presses.push(p),
                            Err(e) => args.errors.push(e.to_string()),
                        }
                    }
                }
                _ if flag.starts_with('-') => {
                    args.errors.push(format!("Unknown flag: {flag}"));
                }
                _ => match (args.command, flag.parse::<Command>()) {
                    (None, Ok(cmd)) => args.command = Some(cmd),
                    (None, Err(err)) => args.errors.push(err),
                    (Some(_), _) => args.errors.push(format!("Unexpected argument: {flag}")),
                },
            }
        }

        if !args.errors.is_empty() {
            args.show_help = true;
        }
        args
    }

    /// Master ticks to run, from `--ticks`, `--seconds` or the command default
    fn tick_count(&self, config: &CoreConfig) -> u64 {
        let seconds_to_ticks = |s: f64| (s * f64::from(config.tick_rate_hz)).round() as u64;
        match (self.ticks, self.seconds) {
            (Some(n), _) => n,
            (None, Some(s)) => seconds_to_ticks(s),
            (None, None) => match self.command {
                Some(Command::Trace) | None => DEFAULT_TRACE_TICKS,
                Some(_) => seconds_to_ticks(DEFAULT_RENDER_SECONDS),
            },
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage:
  ay38500 <command> [flags]

Commands:
  trace                Write one CSV row per master tick
  render               Write the audio output to a WAV file
  play                 Play the audio output live{}
  info                 Show the effective configuration

Flags:
  -c, --config <file>  JSON configuration (defaults otherwise)
  --ticks <n>          Master ticks to run
  --seconds <s>        Run time in seconds of master clock
  -o, --out <path>     Output file (trace defaults to stdout)
  -p, --press <k@t>    Hold key k from tick t (k@t1..t2 for a range)
  --fade <s>           Fade-out length for render
  --json               info: print the configuration as JSON
  -v, --verbose        Debug logging
  -h, --help           Show this help

Examples:
  ay38500 trace --ticks 2000 --press P@100 -o trace.csv
  ay38500 render --seconds 1 --press space@0..500000 -o tone.wav
  ay38500 info --json > core.json",
        if cfg!(feature = "streaming") {
            ""
        } else {
            " (needs the streaming feature)"
        }
    );
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Info);
    }
    builder.init();
}

fn print_info(config: &CoreConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }
    let keys = &config.keys;
    println!("Master tick:   {} Hz", config.tick_rate_hz);
    println!(
        "Divider:       {} ({:?}), derived {:.0} Hz",
        config.divider.divisor,
        config.divider.duty,
        config.derived_tick_rate_hz()
    );
    println!(
        "Tone:          freq {} -> {:.1} Hz, volume L {:#06x} R {:#06x}",
        config.audio.freq,
        config.tone_hz(),
        config.audio.vol_left,
        config.audio.vol_right
    );
    println!(
        "Sync:          {} ticks x {} lines, hsync {} vsync {}{}",
        config.video.h_period,
        config.video.lines,
        config.video.h_sync_width,
        config.video.v_sync_lines,
        if config.video.reaches_thresholds() {
            ""
        } else {
            " (blanking never toggles)"
        }
    );
    println!(
        "Keys:          manual serve {}, paddle {}, speed {}, angle {}, serve {}, deselect {}",
        key_name(keys.manual_serve),
        key_name(keys.paddle_size),
        key_name(keys.ball_speed),
        key_name(keys.ball_angle),
        key_name(keys.serve),
        key_name(keys.deselect)
    );
    let games: Vec<String> = Game::ALL
        .iter()
        .map(|&g| format!("{}={g}", key_name(keys.game_key(g))))
        .collect();
    println!("Games:         {}", games.join(" "));
    Ok(())
}

fn run_trace<W: io::Write>(session: &mut Session, ticks: u64, mut rec: TraceRecorder<W>) -> Result<()> {
    session.run(ticks, |tick, out| rec.record(tick, out))?;
    rec.finish()?;
    Ok(())
}

#[cfg(feature = "streaming")]
fn play(session: &mut Session, config: &CoreConfig, ticks: u64) -> Result<()> {
    use ay38500::export::Decimator;
    use ay38500::streaming::{frame_to_f32, write_blocking};
    use ay38500::{AudioDevice, RingBuffer, StreamConfig};
    use parking_lot::Mutex;
    use std::sync::Arc;

    const CHUNK: usize = 1024;

    let stream = StreamConfig::stable(config.audio.sample_rate);
    let ring = Arc::new(Mutex::new(RingBuffer::new(stream.ring_buffer_size)?));
    let device = AudioDevice::new(&stream, Arc::clone(&ring))?;

    info!(
        "playing {:.1}s ({:.0} ms buffer)",
        ticks as f64 / f64::from(config.tick_rate_hz),
        stream.latency_ms()
    );
    let mut decimator = Decimator::new(config.tick_rate_hz, config.audio.sample_rate);
    let mut chunk = Vec::with_capacity(CHUNK);
    session.run(ticks, |_, out| {
        if let Some(frame) = decimator.push(out.sample) {
            chunk.extend_from_slice(&frame_to_f32(frame));
            if chunk.len() >= CHUNK {
                write_blocking(&ring, &chunk);
                chunk.clear();
            }
        }
        Ok(())
    })?;
    write_blocking(&ring, &chunk);

    device.finish();
    device.wait_for_finish();
    Ok(())
}

#[cfg(not(feature = "streaming"))]
fn play(_session: &mut Session, _config: &CoreConfig, _ticks: u64) -> Result<()> {
    bail!("play requires the \"streaming\" feature. Rebuild with `--features streaming`.")
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    for err in &args.errors {
        eprintln!("{err}");
    }
    let Some(command) = args.command.filter(|_| !args.show_help) else {
        print_usage();
        if !args.errors.is_empty() {
            std::process::exit(2);
        }
        return Ok(());
    };

    let config = match &args.config_path {
        Some(path) => {
            CoreConfig::load(path).with_context(|| format!("Failed to load config {path}"))?
        }
        None => CoreConfig::default(),
    };
    config.validate()?;

    let ticks = args.tick_count(&config);
    let schedule = PressSchedule::new(args.presses.clone());
    for press in schedule.presses() {
        info!("press {press}");
    }
    let mut session = Session::new(&config, schedule)?;

    match command {
        Command::Trace => match &args.out {
            Some(path) => {
                let rec = TraceRecorder::create(path)
                    .with_context(|| format!("Failed to create trace {path}"))?;
                run_trace(&mut session, ticks, rec)?;
            }
            None => run_trace(&mut session, ticks, TraceRecorder::from_writer(io::stdout().lock()))?,
        },
        Command::Render => {
            let Some(path) = &args.out else {
                bail!("render needs --out <file.wav>");
            };
            let export = ExportConfig::with_sample_rate(config.audio.sample_rate).fade_out(args.fade);
            export_session_to_wav(&mut session, config.tick_rate_hz, ticks, path, &export)?;
        }
        Command::Play => play(&mut session, &config, ticks)?,
        Command::Info => print_info(&config, args.json)?,
    }
    Ok(())
}
