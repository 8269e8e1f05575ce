//! A deterministic chip8 interpreter core.
//!
//! The [`ChipSet`](chip8::ChipSet) holds the whole machine state, the
//! [`opcode`] module decodes raw words into [`Instruction`](opcode::Instruction)s
//! and the [`Runner`] drives the core from wall-clock time.
pub mod chip8;
pub mod config;
pub mod definitions;
pub mod devices;
pub mod opcode;
pub mod resources;
pub mod timer;
mod error;
mod runner;

// reexporting for convinience
pub use error::*;
pub use runner::*;
