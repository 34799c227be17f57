// Per-tick cost of the engine.
//
// The worst case is every accumulator in a pitch mode with every channel
// co-muted: three rankings of 32 variants each, every tick.
//
// Run with: cargo bench --bench tick

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use logic_matrix_engine::accumulator::Interval;
use logic_matrix_engine::channel::ChannelInput;
use logic_matrix_engine::config::PanelConfig;
use logic_matrix_engine::engine::{LogicMatrixEngine, TickInput};
use logic_matrix_engine::operation::{MatrixSwitch, Operator, TargetSwitch};
use logic_matrix_engine::{NUM_ACCUMULATORS, NUM_CHANNELS, NUM_OPERATIONS};

const DT: f32 = 1.0 / 48_000.0;

fn busy_panel(co_muted_channels: usize) -> PanelConfig {
    let mut panel = PanelConfig::default();
    let operators = [
        Operator::Or,
        Operator::And,
        Operator::Xor,
        Operator::AtLeastTwo,
        Operator::Majority,
        Operator::Xor,
    ];
    let targets = [TargetSwitch::Up, TargetSwitch::Middle, TargetSwitch::Down];
    for row in 0..NUM_OPERATIONS {
        for channel in 0..NUM_CHANNELS {
            panel.matrix[row][channel] = match (row + channel) % 3 {
                0 => MatrixSwitch::Inverted,
                1 => MatrixSwitch::Normal,
                _ => MatrixSwitch::Muted,
            };
        }
        panel.operators[row] = operators[row];
        panel.targets[row] = targets[row % targets.len()];
    }
    panel.intervals = [Interval::PerfectFifth, Interval::MajorThird, Interval::MinorSeventh];
    panel.percentiles = [0.25, 0.5, 0.75];
    for acc in 0..NUM_ACCUMULATORS {
        for channel in 0..co_muted_channels {
            panel.co_mute[acc][channel] = true;
        }
    }
    panel
}

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");

    for co_muted in [0, 3, NUM_CHANNELS] {
        let panel = busy_panel(co_muted);
        let mut input = TickInput::default();
        input.channels[0] = ChannelInput::patched(0.0);

        group.bench_with_input(BenchmarkId::new("co_muted", co_muted), &panel, |b, panel| {
            let mut engine = LogicMatrixEngine::new();
            let mut tick = 0u32;
            b.iter(|| {
                // Square clock on channel 0 so the cascade keeps moving.
                tick = tick.wrapping_add(1);
                input.channels[0].voltage = if tick & 16 == 0 { 0.0 } else { 5.0 };
                black_box(engine.process(black_box(panel), &input, DT))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_process);
criterion_main!(benches);
