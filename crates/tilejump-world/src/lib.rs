pub mod actor;
pub mod broad_phase;
pub mod config;
pub mod enemies;
pub mod geometry;
pub mod items;
pub mod layout;
pub mod level;
pub mod player;
pub mod resolver;
pub mod slope;
pub mod traps;
