//! Event handler module for the oubliette.
//!
//! Contains the App struct and its event handling logic.

use crate::app::app_state::AppState;
use crate::config::Options;
use crate::game::CurrentScreen;
use crate::game::keys::{GameKey, winit_key_to_game_key};
use std::{sync::Arc, time::Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{Fullscreen, Icon, Window, WindowId},
};

/// Main application struct that manages the game lifecycle and event handling.
///
/// This struct implements the [`ApplicationHandler`] trait to handle all
/// window and device events. It manages the WGPU instance, application state,
/// and window lifecycle.
///
/// # Lifecycle
/// 1. Created with `App::new()` - initializes the WGPU instance
/// 2. Window is set via `set_window()` - creates surface and application state
/// 3. Events are handled via `ApplicationHandler` trait methods
/// 4. Application runs until the window is closed or the player quits
#[derive(Default)]
pub struct App {
    /// The WGPU instance for graphics operations.
    pub instance: wgpu::Instance,
    /// The current application state, None until initialized.
    pub state: Option<AppState>,
    /// The application window, None until set.
    pub window: Option<Arc<Window>>,
}

impl App {
    /// Creates a new [`App`] instance with default WGPU configuration.
    ///
    /// The application state and window stay None until `set_window()` runs.
    pub fn new() -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        Self {
            instance,
            state: None,
            window: None,
        }
    }

    /// Asynchronously sets up the application window and initializes all
    /// game systems.
    ///
    /// Creates the WGPU surface from the window and builds the [`AppState`]
    /// with the renderer, audio, and game state.
    ///
    /// # Panics
    /// - If surface creation fails
    pub async fn set_window(&mut self, window: Window) {
        let window = Arc::new(window);
        let size = window.inner_size();

        let surface = self
            .instance
            .create_surface(window.clone())
            .expect("Failed to create surface!");

        let state = AppState::new(
            &self.instance,
            surface,
            size.width.max(1),
            size.height.max(1),
        )
        .await;

        self.window.get_or_insert(window);
        self.state.get_or_insert(state);
    }

    /// Handles window resize events and updates the surface configuration.
    ///
    /// Only processes the resize if both dimensions are greater than 0; a
    /// minimized window reports a zero size that must not reach the surface.
    pub fn handle_resized(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            let state = match &mut self.state {
                Some(state) => state,
                None => {
                    eprintln!("Cannot resize surface without state initialized!");
                    return;
                }
            };
            state.resize_surface(width, height);
        }
    }
}

impl ApplicationHandler for App {
    /// Handles application resume events by creating the game window.
    ///
    /// The window is created from the saved display options: borderless
    /// fullscreen when requested, otherwise a window at the configured size.
    ///
    /// # Panics
    /// - If window creation fails
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let options = Options::load();
        let (width, height) = options.window_size;

        let mut attributes = Window::default_attributes()
            .with_title("oubliette")
            .with_inner_size(PhysicalSize::new(width, height))
            .with_window_icon(load_window_icon());
        if options.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(err) => {
                panic!("Failed to create window: {}", err);
            }
        };
        pollster::block_on(self.set_window(window));
    }

    /// Handles device events, primarily mouse movement for camera control.
    ///
    /// Relative mouse motion only reaches the game while a run is on screen
    /// and the cursor is captured; menu navigation never consumes it.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if let Some(state) = self.state.as_mut() {
                if state.game_state.current_screen == CurrentScreen::Play
                    && state.game_state.capture_mouse
                {
                    state.game_state.add_mouse_motion(delta.0);
                }
            }
        }
    }

    /// Handles window events including input, resize, and close requests.
    ///
    /// # Event Types Handled
    /// - **CloseRequested**: Initiates application shutdown
    /// - **Resized**: Calls `handle_resized()` to update the surface
    /// - **Focused(false)**: Clears held keys so nothing sticks across alt-tab
    /// - **KeyboardInput**: Feeds the key state and per-screen key handling
    /// - **MouseInput**: Lets a click confirm the victory and game-over cards
    /// - **RedrawRequested**: Advances the simulation and renders a frame
    ///
    /// # Panics
    /// - If application state is not initialized
    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        let state = match self.state.as_mut() {
            Some(state) => state,
            None => {
                panic!("State not initialized");
            }
        };

        match event {
            WindowEvent::CloseRequested => {
                println!("The close button was pressed; stopping");
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                self.handle_resized(new_size.width, new_size.height);
            }

            WindowEvent::Focused(false) => {
                state.key_state.clear();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: key,
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(game_key) = winit_key_to_game_key(&key) {
                    match key_state {
                        ElementState::Pressed => {
                            state.key_state.press_key(game_key);
                            state.game_state.key_pressed(game_key);
                        }
                        ElementState::Released => {
                            state.key_state.release_key(game_key);
                        }
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => match button_state {
                ElementState::Pressed => {
                    state.key_state.press_key(GameKey::MouseButtonLeft);
                    // The end cards accept a click as well as Enter.
                    if matches!(
                        state.game_state.current_screen,
                        CurrentScreen::Victory | CurrentScreen::GameOver
                    ) {
                        state.game_state.key_pressed(GameKey::Confirm);
                    }
                }
                ElementState::Released => {
                    state.key_state.release_key(GameKey::MouseButtonLeft);
                }
            },

            WindowEvent::RedrawRequested => {
                let dt = self.handle_frame_timing(Instant::now());
                self.handle_redraw(dt);

                if self
                    .state
                    .as_ref()
                    .is_some_and(|state| state.game_state.quit_requested)
                {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    /// Keeps frames coming; the event loop polls and every pass requests
    /// the next redraw.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

/// Decodes the window icon that the build script paints into `OUT_DIR`.
///
/// Returns `None` when decoding fails; the window then keeps the platform
/// default icon.
fn load_window_icon() -> Option<Icon> {
    let bytes = include_bytes!(concat!(env!("OUT_DIR"), "/oubliette-icon.png"));
    let img = match image::load_from_memory(bytes) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            eprintln!("Failed to decode embedded window icon: {}", e);
            return None;
        }
    };
    let (width, height) = img.dimensions();
    match Icon::from_rgba(img.into_raw(), width, height) {
        Ok(icon) => Some(icon),
        Err(e) => {
            eprintln!("Failed to build window icon: {}", e);
            None
        }
    }
}
