//! `flashreveal` - timer-driven reveal widget core
//!
//! A label flashes between two options for a randomly drawn number of
//! ticks, then settles on a fixed outcome and spawns a field of balloon
//! particles. This library provides the state machine, its session timers,
//! the particle generator and a terminal renderer.

pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
pub mod particles;
pub mod random;
pub mod render;
pub mod reveal;
