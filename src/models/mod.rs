//! Typed aggregates produced by the scouting engine.
//!
//! Every section of a scouting profile is a concrete struct rather than a
//! loose map, so downstream consumers (API handlers, report generation,
//! weakness detection) get compile-time field checking.

mod composition;
mod head_to_head;
mod overview;
mod pistol;
mod player;
mod profile;
mod rounds;
mod weakness;
mod weapons;

pub use composition::*;
pub use head_to_head::*;
pub use overview::*;
pub use pistol::*;
pub use player::*;
pub use profile::*;
pub use rounds::*;
pub use weakness::*;
pub use weapons::*;
