// src/input/mod.rs
//
// Input adapters.
//
// Each adapter turns one kind of raw input into `InputEvent`s of the same
// shape, so the voice manager has a single consumption path. Adapters
// only guard against their own duplicate traffic; the voice manager
// enforces one voice per note across all of them.

mod computer_keys;
mod midi;
mod pointer;

pub use computer_keys::*;
pub use midi::*;
pub use pointer::*;
