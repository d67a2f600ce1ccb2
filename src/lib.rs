// Library surface for headless hosts and integration tests.
// The terminal front end lives in main.rs and only talks to the engine through `game`.
pub mod app_dirs;
pub mod difficulty;
pub mod game;
pub mod ports;
pub mod runtime;
pub mod scheduler;
pub mod scorer;
pub mod session;
pub mod settings;
pub mod stimulus;
pub mod timer;
