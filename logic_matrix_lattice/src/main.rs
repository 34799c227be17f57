// Logic matrix renderer: CLI entry point.
//
// Runs the engine offline. Channel 0 is patched to a square-wave clock and
// channels 1-4 are left unpatched, so they cascade off channel 0. Every output
// change is printed with the note name of its lattice position, followed by
// the final lattice grid.
//
// Usage:
//   cargo run -p logic_matrix_lattice --bin render -- [panel.json] [--ticks N]
//     [--sample-rate HZ] [--clock-hz HZ]
//
// Without a panel file a built-in demo patch is used (fifth/major-third
// lattice, co-mute on the cascaded channels).

use std::path::Path;

use logic_matrix_engine::NUM_ACCUMULATORS;
use logic_matrix_engine::accumulator::Interval;
use logic_matrix_engine::channel::ChannelInput;
use logic_matrix_engine::config::PanelConfig;
use logic_matrix_engine::engine::{LogicMatrixEngine, TickInput};
use logic_matrix_engine::operation::{MatrixSwitch, Operator, TargetSwitch};
use logic_matrix_lattice::display::{GRID_SIZE, LatticeDisplay};
use logic_matrix_lattice::note::spell;
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(1).filter(|s| !s.starts_with("--"));
    let sample_rate: f32 = parse_flag(&args, "--sample-rate").unwrap_or(48_000.0);
    let clock_hz: f32 = parse_flag(&args, "--clock-hz").unwrap_or(4.0);
    let ticks: u64 = parse_flag(&args, "--ticks").unwrap_or((sample_rate * 4.0) as u64);

    if !(sample_rate > 0.0 && clock_hz > 0.0) {
        return Err(format!(
            "sample rate and clock rate must be positive (got {sample_rate} Hz, {clock_hz} Hz)"
        )
        .into());
    }

    let panel = match config_path {
        Some(path) => PanelConfig::load(Path::new(path))?,
        None => demo_panel(),
    };

    println!("=== Logic Matrix Renderer ===");
    println!("Panel: {}", config_path.map(|s| s.as_str()).unwrap_or("(demo)"));
    println!("Sample rate: {} Hz", sample_rate);
    println!("Clock: {} Hz", clock_hz);
    println!("Ticks: {}", ticks);
    println!("Intervals: {:?}", panel.intervals);
    println!();

    let dt = 1.0 / sample_rate;
    let mut engine = LogicMatrixEngine::new();
    let mut display = LatticeDisplay::new();
    let mut input = TickInput::default();
    let mut changes = 0u64;

    for tick in 0..ticks {
        let phase = (tick as f64 * f64::from(clock_hz) / f64::from(sample_rate)).fract();
        let clock = if phase < 0.5 { 5.0 } else { 0.0 };
        input.channels[0] = ChannelInput::patched(clock);

        let out = engine.process(&panel, &input, dt);
        display.update(&out.message);

        for acc in 0..NUM_ACCUMULATORS {
            if !out.output_changed[acc] {
                continue;
            }
            changes += 1;
            let note = spell(&out.message.position[acc], &out.message.interval_semitones);
            println!(
                "{:>9.4}s  out{}  {:+.4} V  {:<8} bits {:?}",
                tick as f64 / f64::from(sample_rate),
                acc,
                out.outputs[acc].value,
                note.to_string(),
                out.message.winning_bits[acc],
            );
        }
    }

    println!();
    print_grid(&display);
    info!(ticks, changes, "render finished");
    Ok(())
}

/// Demo patch: accumulator 0 stacks fifths, 1 major thirds, 2 is an Or gate.
/// Each accumulator co-mutes the cascaded channels it listens to.
fn demo_panel() -> PanelConfig {
    let mut panel = PanelConfig::default();
    let rows = [
        ([0, 1], Operator::Or, TargetSwitch::Up),
        ([1, 2], Operator::Xor, TargetSwitch::Up),
        ([2, 3], Operator::And, TargetSwitch::Middle),
        ([1, 3], Operator::Or, TargetSwitch::Middle),
        ([3, 4], Operator::AtLeastTwo, TargetSwitch::Down),
        ([0, 4], Operator::Majority, TargetSwitch::Down),
    ];
    for (row, (channels, operator, target)) in rows.into_iter().enumerate() {
        for channel in channels {
            panel.matrix[row][channel] = MatrixSwitch::Normal;
        }
        panel.operators[row] = operator;
        panel.targets[row] = target;
    }
    panel.intervals = [Interval::PerfectFifth, Interval::MajorThird, Interval::Or];
    panel.percentiles = [0.5, 0.75, 0.0];
    panel.co_mute[0] = [false, true, true, false, false];
    panel.co_mute[1] = [false, false, true, true, false];
    panel
}

fn print_grid(display: &LatticeDisplay) {
    println!("Lattice (x = axis 0, y = axis 1; digits mark lit accumulators):");
    for y in (0..GRID_SIZE).rev() {
        let mut line = String::new();
        for x in 0..GRID_SIZE {
            let lit: String = (0..NUM_ACCUMULATORS)
                .filter(|&acc| display.light(x, y, acc))
                .map(|acc| char::from(b'0' + acc as u8))
                .collect();
            line.push_str(&format!("{:>8}{:<4}", display.name(x, y).to_string(), lit));
        }
        println!("{line}");
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
