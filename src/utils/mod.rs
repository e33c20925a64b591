pub mod bits;
pub mod consts;
pub mod logging;
pub mod math;
