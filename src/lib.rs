pub mod clock;
pub mod constants;
pub mod controller;
pub mod engine;
pub mod ghost;
pub mod maze;
pub mod player;
pub mod rng;
pub mod targeting;
pub mod types;
