/// error type shared by the whole crate
pub mod heat_errors;
/// uniform grid and the hot band initial state
pub mod grid;
/// averaging and diffusion operators of the compact scheme
pub mod compact_operators;
/// LHS/RHS of the Crank-Nicolson step
pub mod crank_nicolson;
pub mod stability;
/// defaults, task file and validation
pub mod heat_config;
/// stepping loop, history and result sinks
pub mod heat_solver;
/// parallel runs for several diffusivities
pub mod compare;
mod Heat1D_tests;
