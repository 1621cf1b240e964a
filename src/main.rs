//! Oubliette - A First-Person Maze Pursuit Game
//!
//! This is the main entry point for the oubliette. The game drops the player
//! into a procedurally chosen maze guarded by stalkers; collecting every seal
//! opens the exit door, and each run escalates across maps until escape.
//!
//! # Features
//! - **Software Raycasting**: A CPU raycaster with wrap portals, presented via WGPU
//! - **Procedural Mazes**: Generated and hand-authored layouts with wrap portals
//! - **Pursuit AI**: Breadth-first-flood pathing stalkers that hunt the player
//! - **Synthesized Audio**: Music and effects are generated, no asset files
//! - **Persistence**: Settings and mid-run saves stored as JSON
//!
//! # Architecture
//! The application follows a modular architecture:
//! - `app/`: Application state management and event handling
//! - `game/`: Core game logic, player, stalker, and run systems
//! - `maze/`: Maze grid, generation, and the layout pool
//! - `renderer/`: The software raycaster and the WGPU presentation layer
//!
//! # Usage
//! Run the application with `cargo run`. Settings and saves live next to the
//! executable.

#![warn(missing_docs)]
pub mod app;
pub mod config;
pub mod game;
pub mod maze;

pub mod renderer;

use winit::event_loop::{ControlFlow, EventLoop};

/// Main entry point for the oubliette.
///
/// This function initializes the application, sets up the event loop, and
/// starts the game.
///
/// # Panics
/// - If the application fails to run
fn main() {
    pollster::block_on(run());
}

/// Asynchronously runs the main game loop.
///
/// This function creates the event loop, initializes the application state,
/// and starts the game. It handles the complete lifecycle of the application
/// from startup to shutdown.
///
/// # Errors
/// - Returns early if event loop creation fails
/// - Exits the process if the application fails to run
async fn run() {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            eprintln!("Error creating event loop: {}", err);
            return;
        }
    };

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new();

    event_loop.run_app(&mut app).expect("Failed to run app");
}
