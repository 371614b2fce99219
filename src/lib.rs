//! Electric Vehicle Trip Simulation Library
//!
//! Simulates personal EV and delivery-robot trips on a simulated clock,
//! scores finished trips, and tracks gamification progress.

pub mod simulation;
