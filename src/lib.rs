//! Greedy timetabling for a dance studio.
//!
//! Classes are ranked hardest-first, then placed one at a time: phase 1
//! picks a day, start and room, phase 2 picks a qualified teacher for that
//! slot. Room time is held provisionally between the two phases and given
//! back when no teacher is free, so every class either lands whole or
//! leaves no trace.
//!
//! [`solve`] is the entry point; [`verify::check`] audits any schedule
//! against the same hard constraints.

pub mod config;
pub mod data;
pub mod error;
pub mod ledger;
pub mod ranges;
pub mod ranker;
pub mod room_placer;
pub mod scheduler;
pub mod server;
pub mod studio;
pub mod teacher_placer;
pub mod timegrid;
pub mod validation;
pub mod verify;

pub use error::{Result, ScheduleError};
pub use scheduler::{Scheduler, solve};
