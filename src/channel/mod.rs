pub mod awgn;

pub use awgn::{AwgnChannel, NoiseReference};
