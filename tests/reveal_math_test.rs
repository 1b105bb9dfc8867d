use instant::Duration;
use reveal_ngin::reveal::{
    BAYER_4X4, CELL_SIZE, ProgressClock, REVEAL_RATE, bayer_threshold, discards, lambert,
};

/// The discard predicate must equal the raw matrix lookup for every fragment
/// and every progress below 1.0.
#[test]
fn should_discard_exactly_below_bayer_threshold() {
    let cell = CELL_SIZE;
    // Two full matrix repetitions in both directions
    for y in 0..48u32 {
        for x in 0..48u32 {
            let px = (x as f32 / cell).floor() as usize % 4;
            let py = (y as f32 / cell).floor() as usize % 4;
            let threshold = BAYER_4X4[py * 4 + px] as f32 / 16.0;
            for step in 0..16 {
                let progress = step as f32 / 16.0;
                assert_eq!(
                    discards(x, y, cell, progress),
                    progress < threshold,
                    "mismatch at ({}, {}) with progress {}",
                    x,
                    y,
                    progress
                );
            }
        }
    }
}

#[test]
fn should_never_discard_once_complete() {
    for y in 0..24u32 {
        for x in 0..24u32 {
            assert!(!discards(x, y, CELL_SIZE, 1.0));
            assert!(!discards(x, y, CELL_SIZE, 1.5));
        }
    }
}

/// Concrete fragments from neighbouring cells at progress 3/16.
#[test]
fn should_resolve_concrete_cells_at_three_sixteenths() {
    let progress = 0.1875;
    // Cells (px 2, py 0) and (px 3, py 0) carry Bayer values 2 and 10
    assert_eq!(bayer_threshold(12, 0, 6.0), 2.0 / 16.0);
    assert_eq!(bayer_threshold(18, 0, 6.0), 10.0 / 16.0);
    // 0.1875 >= 0.125 -> drawn; 0.1875 < 0.625 -> discarded
    assert!(!discards(12, 0, 6.0, progress));
    assert!(discards(18, 0, 6.0, progress));
}

#[test]
fn should_start_progress_at_zero() {
    assert_eq!(ProgressClock::new().value(), 0.0);
}

#[test]
fn should_advance_monotonically() {
    let mut clock = ProgressClock::new();
    let deltas = [0.0, 0.016, 0.004, 0.12, 0.0, 0.33, 0.016, 0.7];
    let mut previous = clock.value();
    for dt in deltas {
        let next = clock.advance(Duration::from_secs_f32(dt));
        assert!(next >= previous, "{} decreased to {}", previous, next);
        previous = next;
    }
}

/// Any non-negative dt sequence summing to >= 1/1.6 seconds must land on
/// exactly 1.0, never beyond it.
#[test]
fn should_clamp_to_exactly_one() {
    let mut clock = ProgressClock::new();
    let full_reveal = 1.0 / REVEAL_RATE;
    let step = full_reveal / 7.0;
    for _ in 0..7 {
        clock.advance(Duration::from_secs_f32(step));
        assert!(clock.value() <= 1.0);
    }
    // Overshoot generously; the clamp keeps the value at exactly 1.0
    clock.advance(Duration::from_secs_f32(3.0));
    assert_eq!(clock.value(), 1.0);
    assert!(clock.is_complete());
    clock.advance(Duration::from_secs_f32(0.016));
    assert_eq!(clock.value(), 1.0);
}

#[test]
fn should_reveal_in_five_eighths_of_a_second() {
    let mut clock = ProgressClock::new();
    clock.advance(Duration::from_secs_f32(0.625));
    assert!(clock.is_complete());

    let mut clock = ProgressClock::new();
    clock.advance(Duration::from_secs_f32(0.6));
    assert!(!clock.is_complete());
}

#[test]
fn should_shade_within_lambert_bounds() {
    let samples = [
        cgmath::Vector3::new(1.0, 2.0, 1.5),
        cgmath::Vector3::new(0.0, 1.0, 0.0),
        cgmath::Vector3::new(-1.0, -2.0, -1.5),
        cgmath::Vector3::new(0.3, -0.9, 0.1),
    ];
    for normal in samples {
        let intensity = lambert(normal);
        assert!((0.4..=1.0).contains(&intensity), "{} out of range", intensity);
    }
    // Facing the light exactly yields full intensity
    assert!((lambert(cgmath::Vector3::new(1.0, 2.0, 1.5)) - 1.0).abs() < 1e-6);
    // Facing away clamps to the ambient floor
    assert!((lambert(cgmath::Vector3::new(-1.0, -2.0, -1.5)) - 0.4).abs() < 1e-6);
}
