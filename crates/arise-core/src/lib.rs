//! Pure progression engines: quest/task updates and stat advancement.
//! No I/O here; callers own reading and persisting the user document.

pub mod quest;
pub mod stats;
