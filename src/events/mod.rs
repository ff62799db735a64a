mod pointer;
mod signals;

pub use pointer::{wire_pointermove, wire_resize};
pub use signals::{apply_save_data, wire_low_power, wire_reduced_motion, wire_visibility};
