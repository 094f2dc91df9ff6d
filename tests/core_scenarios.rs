use ay38500::config::CoreConfig;
use ay38500::keyboard::{key_index, Game, SCAN_POSITIONS};
use ay38500::session::Session;
use ay38500::stimulus::{KeyPress, PressSchedule};
use ay38500::trace::{first_divergence, read_trace, TraceRecorder};
use ay38500::{CoreInputs, CoreOutputs, DutyMode, PongCore};

fn key(name: &str) -> u8 {
    key_index(name).unwrap()
}

fn run_session(config: &CoreConfig, presses: &[&str], ticks: u64) -> Vec<CoreOutputs> {
    let schedule = PressSchedule::new(presses.iter().map(|p| KeyPress::parse(p).unwrap()).collect());
    let mut session = Session::new(config, schedule).unwrap();
    let mut outs = Vec::with_capacity(ticks as usize);
    session
        .run(ticks, |_, out| {
            outs.push(*out);
            Ok(())
        })
        .unwrap();
    outs
}

#[test]
fn divider_pulses_from_reset() {
    let mut core = PongCore::new();
    core.tick(&CoreInputs {
        reset: true,
        ..CoreInputs::default()
    });
    let inputs = CoreInputs {
        divisor: 8,
        duty: DutyMode::Short,
        ..CoreInputs::default()
    };
    let levels: Vec<bool> = (0..20).map(|_| core.tick(&inputs).derived_tick).collect();
    let pulses: Vec<usize> = levels
        .iter()
        .enumerate()
        .filter(|(_, &l)| l)
        .map(|(i, _)| i + 1)
        .collect();
    assert_eq!(pulses, vec![9, 18]);
}

#[test]
fn half_duty_low_phase_matches_divisor() {
    for divisor in 1..=31u16 {
        let mut core = PongCore::new();
        let inputs = CoreInputs {
            divisor,
            duty: DutyMode::Half,
            ..CoreInputs::default()
        };
        let period = usize::from(divisor) + 1;
        // Skip one period to settle, then look at two
        let levels: Vec<bool> = (0..period * 3)
            .map(|_| core.tick(&inputs).derived_tick)
            .skip(period)
            .collect();
        let lows = levels.iter().filter(|&&l| !l).count();
        assert_eq!(lows, 2 * usize::from(divisor / 2), "divisor {divisor}");
    }
}

#[test]
fn toggles_flip_once_per_held_press() {
    let config = CoreConfig::default();
    // Hold P for ten full scans, release, then press again
    let outs = run_session(&config, &["P@0..800", "P@2000..2400"], 4_000);
    let flips = outs
        .windows(2)
        .filter(|w| w[0].controls.paddle_small != w[1].controls.paddle_small)
        .count();
    assert_eq!(flips, 2);
    assert!(outs[1_000].controls.paddle_small);
    assert!(!outs[3_999].controls.paddle_small);
}

#[test]
fn serve_follows_space_in_manual_mode_only() {
    let config = CoreConfig::default();
    let outs = run_session(&config, &["space@0..400", "M@1000", "space@2000..2400"], 3_000);
    assert!(outs[300].controls.serve);
    assert!(!outs[600].controls.serve);
    assert!(!outs[1_500].controls.manual_serve);
    assert!(outs[2_000..].iter().all(|o| !o.controls.serve));
}

#[test]
fn game_keys_select_one_game_at_a_time() {
    let config = CoreConfig::default();
    let presses = ["2@0", "5@1000", "0@2000", "3@3000..3500", "6@3200..3600"];
    let outs = run_session(&config, &presses, 5_000);
    for out in &outs {
        assert!(out.controls.game_select.is_well_formed());
    }
    assert_eq!(outs[0].controls.game_select.selected(), Some(Game::Tennis));
    assert_eq!(outs[900].controls.game_select.selected(), Some(Game::Soccer));
    assert_eq!(outs[1_900].controls.game_select.selected(), Some(Game::Rifle1));
    assert!(outs[2_900].controls.game_select.is_none());
    assert_eq!(outs[4_999].controls.game_select.selected(), Some(Game::Rifle2));
}

#[test]
fn reset_mid_run_restores_defaults() {
    let mut core = PongCore::new();
    let mut inputs = CoreInputs {
        divisor: 2,
        freq: 5_000,
        vol_left: 0x1000,
        vol_right: 0x1000,
        ..CoreInputs::default()
    };
    for t in 0..1_000usize {
        inputs.scan_index = t % SCAN_POSITIONS;
        inputs.pressed_low = inputs.scan_index != usize::from(key("B"));
        core.tick(&inputs);
    }
    assert!(core.outputs().controls.ball_fast);

    let out = core.tick(&CoreInputs {
        reset: true,
        ..inputs
    });
    assert_eq!(out, CoreOutputs::default());
    assert!(!core.outputs().controls.ball_fast);
    assert_eq!(core.ticks(), 0);
}

#[test]
fn identical_runs_produce_identical_traces() {
    let config = CoreConfig::default().with_freq(9_000);
    let record = || {
        let schedule = PressSchedule::new(vec![KeyPress::parse("A@50").unwrap()]);
        let mut session = Session::new(&config, schedule).unwrap();
        let mut rec = TraceRecorder::from_writer(Vec::new());
        session.run(5_000, |t, out| rec.record(t, out)).unwrap();
        read_trace(rec.finish().unwrap().as_slice()).unwrap()
    };
    let a = record();
    let b = record();
    assert_eq!(a.len(), 5_000);
    assert_eq!(first_divergence(&a, &b), None);
    assert!(a.iter().any(|r| r.angle_steep == 1));
}

#[test]
fn blanking_frames_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("core.json");
    std::fs::write(
        &path,
        r#"{ "divider": { "divisor": 3 }, "video": { "h_period": 120, "lines": 250 } }"#,
    )
    .unwrap();
    let config = CoreConfig::load(&path).unwrap();
    assert_eq!(config.divider.divisor, 3);

    let frame_ticks = u64::from(config.video.ticks_per_frame()) * 4;
    let outs = run_session(&config, &[], frame_ticks * 3);
    let v_rises = outs
        .windows(2)
        .filter(|w| w[1].v_blank && !w[0].v_blank)
        .count();
    assert_eq!(v_rises, 3);
    assert!(outs.iter().any(|o| o.h_blank));
}

#[test]
fn half_duty_detector_rate_matches_derived_rate() {
    let config = CoreConfig::default().with_divider(24, DutyMode::Half);
    let mut core = PongCore::from_config(&config).unwrap();
    let inputs = CoreInputs::from_config(&config);
    let ticks = 250u64;
    let mut counted = 0u64;
    // The last period's pulse reaches the detector one tick later
    for _ in 0..=ticks {
        let before = core.blanking().counters().h_count;
        core.tick(&inputs);
        counted += u64::from(core.blanking().counters().h_count != before);
    }
    let expected = ticks as f64 * config.derived_tick_rate_hz() / f64::from(config.tick_rate_hz);
    assert_eq!(counted, expected.round() as u64);
}
