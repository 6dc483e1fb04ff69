//! Civitas - agent-based society simulation
//!
//! Agents with needs, skills, personalities and ideologies live in a town of
//! buildings, earn through careers, trade on a shared market and influence
//! one another. A [`simulation::World`] owns the whole state and advances it
//! one tick at a time.

pub mod career;
pub mod city;
pub mod core;
pub mod economy;
pub mod entity;
pub mod simulation;
pub mod society;
pub mod spatial;
