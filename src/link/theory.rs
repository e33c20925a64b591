//! Closed-form error-rate curves for AWGN
//!
//! Curves take SNR as Es/N0 in dB (Eb/N0 for binary signalling), which is
//! what `EnergyPerBit` and the signal-power references on complex links
//! produce, OFDM included since its framing keeps the symbol energy. A real
//! link under a signal-power reference puts the whole noise power on one
//! dimension and measures 3 dB to the right of its curve.

use serde::{Deserialize, Serialize};

use crate::utils::math::{db_to_linear, q_function};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TheoryCurve {
    /// Binary antipodal: Q(√(2·SNR))
    Bpsk,
    /// M-ary PAM, nearest-neighbour approximation
    Pam { order: usize },
    /// M-ary PSK, nearest-neighbour approximation per bit
    Psk { order: usize },
    /// Square M-QAM, nearest-neighbour approximation per bit
    Qam { order: usize },
}

impl TheoryCurve {
    pub fn evaluate(&self, snr_db: f64) -> f64 {
        let snr = db_to_linear(snr_db);
        match *self {
            TheoryCurve::Bpsk => q_function((2.0 * snr).sqrt()),
            TheoryCurve::Pam { order } => {
                let m = order as f64;
                (2.0 * (m - 1.0) / m) * q_function((6.0 * snr / (m * m - 1.0)).sqrt())
            }
            TheoryCurve::Psk { order } => {
                if order == 2 {
                    return q_function((2.0 * snr).sqrt());
                }
                let m = order as f64;
                let bits = m.log2();
                (2.0 / bits) * q_function((2.0 * snr).sqrt() * (std::f64::consts::PI / m).sin())
            }
            TheoryCurve::Qam { order } => {
                let m = order as f64;
                let bits = m.log2();
                (4.0 / bits)
                    * (1.0 - 1.0 / m.sqrt())
                    * q_function((3.0 * snr / (m - 1.0)).sqrt())
            }
        }
    }

    pub fn sweep(&self, snr_db: &[f64]) -> Vec<f64> {
        snr_db.iter().map(|&s| self.evaluate(s)).collect()
    }
}
