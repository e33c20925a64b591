use linksim_rs::channel::NoiseReference;
use linksim_rs::config::{
    ChannelConfig, CodingConfig, ModulationConfig, ShapingConfig, SimulationConfig, SnrSweep,
    SubcarrierConfig,
};
use linksim_rs::link::{BerEvaluator, TheoryCurve};
use linksim_rs::SimError;

fn energy_per_bit() -> ChannelConfig {
    ChannelConfig {
        reference: NoiseReference::EnergyPerBit { eb: 1.0 },
    }
}

#[test]
fn uncoded_binary_pam_at_10db() {
    let config = SimulationConfig {
        modulation: ModulationConfig::Pam {
            order: 2,
            amplitude: 1.0,
        },
        channel: energy_per_bit(),
        bits_per_trial: 10_000,
        seed: 2024,
        ..Default::default()
    };
    let evaluator = BerEvaluator::new(&config).unwrap();
    let point = evaluator.run(&[10.0]).unwrap().remove(0);

    // Q(√20) ≈ 3.9e-6: essentially no errors in 10k bits
    assert_eq!(point.bits.total, 10_000);
    assert!(point.ber < 5e-4, "BER {}", point.ber);
    let theory = point.theoretical_ber.unwrap();
    assert!((theory - 3.87e-6).abs() < 0.3e-6, "theory {}", theory);

    let again = BerEvaluator::new(&config).unwrap().run(&[10.0]).unwrap();
    assert_eq!(again[0], point);
}

#[test]
fn hamming_code_beats_uncoded_bpsk_at_0db() {
    let config = SimulationConfig {
        modulation: ModulationConfig::Pam {
            order: 2,
            amplitude: 1.0,
        },
        coding: Some(CodingConfig::hamming74()),
        channel: energy_per_bit(),
        bits_per_trial: 40_000,
        ..Default::default()
    };
    let evaluator = BerEvaluator::new(&config).unwrap();
    let point = evaluator.run(&[0.0]).unwrap().remove(0);

    let uncoded = TheoryCurve::Bpsk.evaluate(0.0);
    assert_eq!(point.theoretical_ber, Some(uncoded));
    assert!(point.ber < uncoded, "coded BER {} vs uncoded {}", point.ber, uncoded);

    // Raw coded-bit error rate sits near the uncoded curve
    assert!((point.ser - uncoded).abs() < 0.01, "channel bit error rate {}", point.ser);

    let stats = point.decode.unwrap();
    assert_eq!(stats.blocks, 10_000);
    assert!(stats.corrected > stats.uncorrectable);
    assert!(stats.clean > stats.corrected);
}

#[test]
fn ofdm_qpsk_at_10db() {
    let config = SimulationConfig {
        modulation: ModulationConfig::Ofdm {
            subcarriers: 64,
            cp_length: 16,
            subcarrier: SubcarrierConfig::Psk { order: 4 },
        },
        channel: ChannelConfig {
            reference: NoiseReference::MeasuredSignalPower,
        },
        bits_per_trial: 64 * 2 * 400,
        ..Default::default()
    };
    let evaluator = BerEvaluator::new(&config).unwrap();
    let point = evaluator.run(&[10.0]).unwrap().remove(0);

    assert_eq!(point.bits.total, 64 * 2 * 400);
    assert_eq!(point.symbols.total, 64 * 400);

    let theory = point.theoretical_ber.unwrap();
    assert!(
        point.ber > theory / 3.0 && point.ber < theory * 3.0,
        "BER {} vs theory {}",
        point.ber,
        theory
    );

    let snapshot = evaluator
        .snapshot(&mut evaluator.point_rng(0), 10.0, 64 * 4)
        .unwrap();
    assert_eq!(snapshot.received.len(), snapshot.transmitted.len());
}

#[test]
fn ofdm_qpsk_at_10db_with_fixed_energy_reference() {
    let config = SimulationConfig {
        modulation: ModulationConfig::Ofdm {
            subcarriers: 64,
            cp_length: 16,
            subcarrier: SubcarrierConfig::Psk { order: 4 },
        },
        channel: energy_per_bit(),
        bits_per_trial: 64 * 2 * 400,
        ..Default::default()
    };
    let evaluator = BerEvaluator::new(&config).unwrap();
    let point = evaluator.run(&[10.0]).unwrap().remove(0);

    let theory = point.theoretical_ber.unwrap();
    assert!(
        point.ber > theory / 3.0 && point.ber < theory * 3.0,
        "BER {} vs theory {}",
        point.ber,
        theory
    );

    // Unit-energy subcarriers: after deframing each bin carries N0 = 0.1
    let snapshot = evaluator
        .snapshot(&mut evaluator.point_rng(1), 10.0, 64 * 200)
        .unwrap();
    let noise = snapshot
        .received
        .iter()
        .zip(&snapshot.transmitted)
        .map(|(rx, tx)| (rx - tx).norm_sqr())
        .sum::<f64>()
        / snapshot.received.len() as f64;
    assert!((noise - 0.1).abs() < 0.005, "noise per subcarrier {}", noise);
}

#[test]
fn ber_does_not_increase_with_snr() {
    let config = SimulationConfig {
        channel: energy_per_bit(),
        bits_per_trial: 20_000,
        sweep: SnrSweep::range(0.0, 10.0, 2.0),
        ..Default::default()
    };
    let evaluator = BerEvaluator::new(&config).unwrap();
    let points = evaluator.run(&config.sweep.values().unwrap()).unwrap();

    assert_eq!(points.len(), 6);
    for pair in points.windows(2) {
        assert!(
            pair[1].bits.errors <= pair[0].bits.errors,
            "{} dB: {} errors, {} dB: {} errors",
            pair[0].snr_db,
            pair[0].bits.errors,
            pair[1].snr_db,
            pair[1].bits.errors
        );
    }
    assert!(points[0].bits.errors > 0);
}

#[test]
fn shaped_pam_follows_the_unshaped_curve() {
    let config = SimulationConfig {
        shaping: Some(ShapingConfig::default()),
        channel: energy_per_bit(),
        bits_per_trial: 20_000,
        ..Default::default()
    };
    let evaluator = BerEvaluator::new(&config).unwrap();
    let point = evaluator.run(&[6.0]).unwrap().remove(0);
    let theory = TheoryCurve::Bpsk.evaluate(6.0);
    assert!(
        point.ber > theory * 0.5 && point.ber < theory * 2.0,
        "BER {} vs theory {}",
        point.ber,
        theory
    );
}

#[test]
fn parallel_sweep_matches_serial() {
    let config = SimulationConfig {
        modulation: ModulationConfig::Qam { order: 16 },
        bits_per_trial: 4_000,
        trials: 2,
        ..Default::default()
    };
    let snr_db = SnrSweep::range(0.0, 12.0, 2.0).values().unwrap();
    let evaluator = BerEvaluator::new(&config).unwrap();

    let serial = evaluator.run(&snr_db).unwrap();
    let mut seen = 0;
    let parallel = evaluator
        .run_parallel_with(&snr_db, 3, |_| seen += 1)
        .unwrap();
    assert_eq!(seen, snr_db.len());
    assert_eq!(parallel, serial);
    assert_eq!(evaluator.run_parallel(&snr_db, 64).unwrap(), serial);
}

#[test]
fn parallel_sweep_reports_errors() {
    let evaluator = BerEvaluator::new(&SimulationConfig::default()).unwrap();
    let result = evaluator.run_parallel(&[0.0, f64::NAN, 4.0], 2);
    assert!(matches!(result, Err(SimError::InvalidChannel(_))));
}

#[test]
fn config_file_drives_a_sweep() {
    let path = std::env::temp_dir().join(format!("linksim-config-{}.json", std::process::id()));
    let text = r#"{
        "modulation": { "kind": "pam", "order": 4, "amplitude": 1.0 },
        "channel": { "reference": { "kind": "measured_signal_power" } },
        "sweep": [4.0, 16.0],
        "bits_per_trial": 2000,
        "seed": 7
    }"#;
    std::fs::write(&path, text).unwrap();
    let config = SimulationConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.sweep, SnrSweep::List(vec![4.0, 16.0]));
    let evaluator = BerEvaluator::new(&config).unwrap();
    let points = evaluator.run(&config.sweep.values().unwrap()).unwrap();
    assert_eq!(points.len(), 2);
    assert!(points[0].ber > points[1].ber);
    assert_eq!(
        points[0].theoretical_ber,
        Some(TheoryCurve::Pam { order: 4 }.evaluate(4.0))
    );

    assert!(matches!(
        SimulationConfig::from_json_file("/nonexistent/linksim.json"),
        Err(SimError::Io(_))
    ));
}

#[test]
fn invalid_code_is_rejected_before_simulating() {
    let config = SimulationConfig {
        coding: Some(CodingConfig {
            generator: vec![vec![1, 0, 1], vec![0, 1, 1]],
            parity_check: vec![vec![1, 0, 1]],
        }),
        ..Default::default()
    };
    assert!(matches!(
        BerEvaluator::new(&config),
        Err(SimError::InvalidCode(_))
    ));
}
