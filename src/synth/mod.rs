// src/synth/mod.rs
//
// Built-in synthesis backend. Renders voices in Rust so the browser only
// has to copy blocks out in an AudioWorklet.

mod bank;
mod oscillators;

pub use bank::*;
pub use oscillators::*;
