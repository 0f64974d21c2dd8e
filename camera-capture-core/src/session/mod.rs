pub mod controller;
pub mod queue;
pub mod quirks;
pub mod shooter;
