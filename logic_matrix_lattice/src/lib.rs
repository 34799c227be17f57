// Lattice display for the logic matrix engine.
//
// Consumes the `LatticeMessage` the engine fills each tick and turns it into
// note names on a just-intonation lattice. Nothing here runs on the engine's
// audio path; the display reads the message after the tick.
//
// Module overview:
// - `note.rs`:    NoteName spelling from lattice positions and axis intervals.
// - `display.rs`: LatticeDisplay, a 6x6 grid of names and per-accumulator
//                 lights, updated incrementally from messages.
//
// The `render` binary (`main.rs`) drives the engine offline and prints output
// changes with their note names.

pub mod display;
pub mod note;
