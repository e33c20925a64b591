pub mod progress;

use linksim_rs::coding::LinearBlockCode;
use linksim_rs::link::SweepPoint;

pub fn print_banner() {
    eprintln!("linksim-rs {}", env!("CARGO_PKG_VERSION"));
}

/// Text table of a finished sweep
pub fn print_sweep_table(points: &[SweepPoint]) {
    println!(
        "{:>8}  {:>12}  {:>12}  {:>12}  {:>14}",
        "SNR(dB)", "BER", "SER", "theory", "bit errors"
    );
    for point in points {
        let theory = point
            .theoretical_ber
            .map(|t| format!("{:.3e}", t))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>8.2}  {:>12.3e}  {:>12.3e}  {:>12}  {:>14}",
            point.snr_db,
            point.ber,
            point.ser,
            theory,
            format!("{}/{}", point.bits.errors, point.bits.total)
        );
        if let Some(stats) = point.decode {
            println!(
                "{:>8}  codewords: {} clean, {} corrected, {} uncorrectable",
                "", stats.clean, stats.corrected, stats.uncorrectable
            );
        }
    }
}

pub fn print_syndrome_table(code: &LinearBlockCode) {
    println!("({}, {}) code, rate {:.3}", code.n(), code.k(), code.rate());
    println!("syndrome -> flipped bit");
    for (syndrome, position) in code.syndrome_table() {
        let bits: String = syndrome.iter().map(|b| char::from(b'0' + b)).collect();
        println!("  {} -> {}", bits, position);
    }
}
