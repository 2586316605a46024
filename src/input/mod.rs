/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Settings and input data for QHA runs
//!
//! [`Settings`] is read from JSON. The physical input is either a JSON
//! document matching [`QhaInput`], a plain-text phonon file read by
//! [`PhononInputReader`], or a degeneracy table with one phonon file per
//! configuration read by [`read_multi_configuration`].

mod errors;
mod model;
mod reader;
mod settings;

pub use errors::{InputError, Result};
pub use model::{ConfigurationInput, QhaInput};
pub use reader::{parse_degeneracy_table, read_input, read_multi_configuration, PhononInputReader};
pub use settings::{PropertyId, Settings};
