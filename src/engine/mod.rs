pub mod ai;
pub mod battle;
pub mod catalog;
pub mod config;
pub mod hangar;
pub mod moves;
pub mod progression;
pub mod resolver;
pub mod robot;
pub mod stats;
