//! Game state management module.
//!
//! This module defines the [`GameState`] struct, which tracks all mutable
//! state for the frame loop: the active run, the player, the stalkers, the
//! screen machine, and the audio manager. The window layer feeds it key
//! edges, held keys, and relative mouse motion; it answers through a handful
//! of flags (`quit_requested`, `video_dirty`, `capture_mouse`) that the
//! window layer applies after each update.

pub mod audio;
pub mod director;
pub mod keys;
pub mod pathfind;
pub mod player;
pub mod save;
pub mod stalker;

use rand::Rng;
use std::error::Error;

use self::audio::GameAudioManager;
use self::director::Run;
use self::keys::{GameKey, KeyState};
use self::player::Player;
use self::save::SaveState;
use self::stalker::{Stalker, UNREACHED_DIST};
use crate::config::{Options, Tuning};
use crate::maze::MapSpec;

/// Main menu entries, in draw order.
pub const MENU_ITEMS: [&str; 3] = ["Start", "Settings", "Quit"];
/// Pause menu entries, in draw order.
pub const PAUSE_ITEMS: [&str; 4] = ["Resume", "Save", "Load", "Exit to menu"];
/// Rows on the settings screen: five options plus Back.
pub const SETTINGS_ROWS: usize = 6;

/// Seconds the door line on the HUD stays highlighted after it opens.
const DOOR_FLASH_SECONDS: f32 = 1.5;
/// Drone level while every stalker is still in its grace window.
const DRONE_DORMANT: f32 = 0.25;
/// Drone floor once the hunt is on; also the level when no stalker can
/// reach the player at all.
const DRONE_FLOOR: f32 = 0.12;

/// Which screen the frame loop is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentScreen {
    /// Main menu.
    Menu,
    /// Options editor.
    Settings,
    /// First-person play.
    Play,
    /// Pause menu over a live run.
    Pause,
    /// Capture cutaway between losing a life and respawning.
    Screamer,
    /// The run was cleared.
    Victory,
    /// The last life was spent.
    GameOver,
}

/// Represents the entire mutable state of the game.
///
/// This struct is updated every frame and contains:
/// - The player pose and the stalkers hunting it.
/// - The active run (grid, objectives, lives), if one has been started.
/// - Screen and menu selection state.
/// - The audio manager and the persisted options.
pub struct GameState {
    /// Gameplay constants, fixed at startup.
    pub tuning: Tuning,
    /// Player-changeable options, persisted to `settings.json`.
    pub options: Options,
    /// Sound device and the synthesized sound bank.
    pub audio: GameAudioManager,
    /// Layout pool that runs draw from.
    pub layouts: Vec<MapSpec>,
    /// The active run, if one has been started.
    pub run: Option<Run>,
    /// The player camera and body.
    pub player: Player,
    /// Stalkers hunting the player this life.
    pub stalkers: Vec<Stalker>,
    /// Run clock in seconds. It advances only during play and the screamer,
    /// so pausing freezes every timer derived from it.
    pub clock: f32,
    /// The screen currently shown.
    pub current_screen: CurrentScreen,
    /// Selected row on the main menu.
    pub menu_sel: usize,
    /// Selected row on the settings screen.
    pub settings_sel: usize,
    /// Selected row on the pause menu.
    pub pause_sel: usize,
    /// Feedback line under the pause items ("Saved", "No save").
    pub pause_notice: &'static str,
    /// Clock time at which the screamer ends and the next life begins.
    pub screamer_until: f32,
    /// Clock time until which the HUD door line stays highlighted.
    pub door_flash_until: f32,
    /// Minimap overlay toggle.
    pub show_minimap: bool,
    /// Whether the window layer should grab and hide the cursor.
    pub capture_mouse: bool,
    /// Set when the player asks to quit; the window layer ends the loop.
    pub quit_requested: bool,
    /// Set when fullscreen or resolution changed; the window layer applies
    /// the new mode and clears the flag.
    pub video_dirty: bool,
    /// Horizontal mouse motion accumulated since the last frame.
    mouse_dx: f32,
    /// Low-passed mouse motion carried across frames.
    mouse_smooth: f32,
}

impl Default for GameState {
    /// Returns a new [`GameState`] on the main menu.
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Creates a new [`GameState`]: options loaded from disk, sound bank
    /// synthesized, layout pool built, menu music running.
    pub fn new() -> Self {
        let tuning = Tuning::default();
        let options = Options::load();
        let mut audio = GameAudioManager::new(options.music_volume, options.sfx_volume);
        report_audio(audio.play_menu_music());
        let layouts = crate::maze::build_pool(&mut rand::thread_rng());

        Self {
            player: Player::new(tuning.fov_plane),
            tuning,
            options,
            audio,
            layouts,
            run: None,
            stalkers: Vec::new(),
            clock: 0.0,
            current_screen: CurrentScreen::Menu,
            menu_sel: 0,
            settings_sel: 0,
            pause_sel: 0,
            pause_notice: "",
            screamer_until: 0.0,
            door_flash_until: 0.0,
            show_minimap: false,
            capture_mouse: false,
            quit_requested: false,
            video_dirty: false,
            mouse_dx: 0.0,
            mouse_smooth: 0.0,
        }
    }

    /// Accumulates relative mouse motion; drained once per frame.
    pub fn add_mouse_motion(&mut self, dx: f64) {
        self.mouse_dx += dx as f32;
    }

    /// Advances the active screen by one clamped frame step.
    pub fn update(&mut self, dt: f32, keys: &KeyState) {
        match self.current_screen {
            CurrentScreen::Play => {
                self.clock += dt;
                self.update_play(dt, keys);
            }
            CurrentScreen::Screamer => {
                self.clock += dt;
                if self.clock >= self.screamer_until {
                    self.respawn();
                    self.enter_screen(CurrentScreen::Play);
                }
            }
            _ => {}
        }
    }

    /// Feeds one key-down edge into whichever screen is active.
    pub fn key_pressed(&mut self, key: GameKey) {
        match self.current_screen {
            CurrentScreen::Menu => self.menu_key(key),
            CurrentScreen::Settings => self.settings_key(key),
            CurrentScreen::Play => self.play_key(key),
            CurrentScreen::Pause => self.pause_key(key),
            CurrentScreen::Screamer => {}
            CurrentScreen::Victory | CurrentScreen::GameOver => {
                if key == GameKey::Confirm {
                    self.enter_screen(CurrentScreen::Menu);
                }
            }
        }
    }

    /// Switches screens, running exit and enter side effects: drone and
    /// music handoff, cursor capture, selection resets.
    fn enter_screen(&mut self, screen: CurrentScreen) {
        self.capture_mouse = false;
        self.audio.stop_drone();

        match screen {
            CurrentScreen::Menu => {
                self.menu_sel = 0;
                report_audio(self.audio.play_menu_music());
            }
            CurrentScreen::Settings => {
                self.settings_sel = 0;
                report_audio(self.audio.play_menu_music());
            }
            CurrentScreen::Play => {
                if self.run.is_none() {
                    self.start_new_run();
                    if self.run.is_none() {
                        // No playable layout came out of the pool; go back
                        // to the menu instead of presenting an empty world.
                        self.enter_screen(CurrentScreen::Menu);
                        return;
                    }
                }
                self.audio.stop_menu_music();
                report_audio(self.audio.start_drone());
                self.capture_mouse = true;
                self.mouse_dx = 0.0;
                self.mouse_smooth = 0.0;
            }
            CurrentScreen::Pause => {
                self.audio.stop_menu_music();
                self.pause_sel = 0;
                self.pause_notice = "";
            }
            CurrentScreen::Screamer => {
                self.audio.stop_menu_music();
                self.screamer_until = self.clock + rand::thread_rng().gen_range(0.8..1.2);
                report_audio(self.audio.play_scream());
            }
            CurrentScreen::Victory => {
                self.audio.stop_menu_music();
                report_audio(self.audio.play_victory());
            }
            CurrentScreen::GameOver => {
                self.audio.stop_menu_music();
                report_audio(self.audio.play_death());
            }
        }
        self.current_screen = screen;
    }

    /// Builds a fresh run and drops the player into it. On failure the run
    /// stays empty and the caller decides where to go.
    pub fn start_new_run(&mut self) {
        let mut rng = rand::thread_rng();
        match director::start_run(&self.layouts, &self.tuning, &mut rng) {
            Ok(run) => {
                self.stalkers =
                    director::respawn(&run, &mut self.player, &self.tuning, self.clock, &mut rng);
                self.run = Some(run);
                self.mouse_dx = 0.0;
                self.mouse_smooth = 0.0;
                self.door_flash_until = 0.0;
            }
            Err(e) => {
                eprintln!("could not start a run: {e}");
                self.run = None;
            }
        }
    }

    /// Puts the player back at the spawn and re-seeds the stalkers. Seals
    /// already collected stay collected.
    fn respawn(&mut self) {
        if let Some(run) = &self.run {
            self.stalkers = director::respawn(
                run,
                &mut self.player,
                &self.tuning,
                self.clock,
                &mut rand::thread_rng(),
            );
        }
    }

    /// Burns one life; running out ends the run.
    fn lose_life(&mut self) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        run.lives -= 1;
        if run.lives <= 0 {
            self.enter_screen(CurrentScreen::GameOver);
        } else {
            self.enter_screen(CurrentScreen::Screamer);
        }
    }

    /// One frame of play: look, move, pickups, door, pursuit, drone.
    fn update_play(&mut self, dt: f32, keys: &KeyState) {
        // Mouse look: clamp one frame's worth of motion, then low-pass it
        // so a single large delta cannot whip the camera around.
        let raw = self.mouse_dx.clamp(-120.0, 120.0);
        self.mouse_dx = 0.0;
        self.mouse_smooth = 0.6 * self.mouse_smooth + 0.4 * raw;

        let rot_dir = if self.options.invert_mouse_x { -1.0 } else { 1.0 };
        let ang_mouse = rot_dir * self.mouse_smooth * self.tuning.mouse_sens;
        if ang_mouse.abs() > 1e-9 {
            self.player.rotate(ang_mouse);
        }

        if keys.is_pressed(GameKey::TurnLeft) || keys.is_pressed(GameKey::TurnRight) {
            let ang = self.tuning.rot_speed_keys * dt * rot_dir;
            let ang = if keys.is_pressed(GameKey::TurnLeft) { ang } else { -ang };
            self.player.rotate(ang);
        }

        // A failed restart can leave the play screen without a run.
        let Some(run) = self.run.as_mut() else {
            return;
        };

        let speed = self.tuning.move_speed
            * if keys.is_pressed(GameKey::Sprint) {
                self.tuning.run_mult
            } else {
                1.0
            };

        let mut dx = 0.0;
        let mut dy = 0.0;
        if keys.is_pressed(GameKey::MoveForward) {
            dx += self.player.dirx * speed * dt;
            dy += self.player.diry * speed * dt;
        }
        if keys.is_pressed(GameKey::MoveBackward) {
            dx -= self.player.dirx * speed * dt;
            dy -= self.player.diry * speed * dt;
        }
        if keys.is_pressed(GameKey::StrafeLeft) {
            dx -= self.player.planex * speed * dt;
            dy -= self.player.planey * speed * dt;
        }
        if keys.is_pressed(GameKey::StrafeRight) {
            dx += self.player.planex * speed * dt;
            dy += self.player.planey * speed * dt;
        }
        self.player.try_move(&run.grid, dx, dy, self.tuning.player_radius);

        // Seals, then the door they open.
        for i in 0..run.seals.len() {
            if !run.collected[i]
                && self.player.distance_to(run.seals[i].0, run.seals[i].1)
                    < self.tuning.pickup_dist
            {
                run.collected[i] = true;
                report_audio(self.audio.play_pickup());
            }
        }
        let all_collected = run.collected.iter().all(|&c| c);
        if all_collected && !run.door_open {
            run.door_open = true;
            self.door_flash_until = self.clock + DOOR_FLASH_SECONDS;
            report_audio(self.audio.play_door_open());
        } else if !all_collected {
            run.door_open = false;
        }

        if run.door_open
            && self.player.distance_to(run.door.trigger.0, run.door.trigger.1)
                < self.tuning.door_trigger_dist
        {
            self.enter_screen(CurrentScreen::Victory);
            return;
        }

        // All stalkers still in the grace window: hold the drone at its
        // dormant level and skip the pursuit entirely.
        let first_active = self
            .stalkers
            .iter()
            .map(|s| s.active_time)
            .fold(f32::INFINITY, f32::min);
        if self.clock < first_active {
            self.audio.set_drone_dynamic(DRONE_DORMANT);
            return;
        }

        let (pcx, pcy) = self.player.cell();
        let field = pathfind::compute_distance_field(&run.grid, pcx, pcy, |x, y| {
            run.grid.is_blocking(x, y)
        });

        let mut min_dist = UNREACHED_DIST;
        let mut caught = false;
        for s in &mut self.stalkers {
            if s.is_dormant(self.clock) {
                continue;
            }
            if self.clock >= s.next_replan {
                s.replan(
                    self.clock,
                    self.tuning.replan_interval,
                    &field,
                    (self.player.x, self.player.y),
                );
            }
            min_dist = min_dist.min(s.tunnel_dist_cells);

            s.advance(
                &run.grid,
                dt,
                self.tuning.move_speed,
                (self.player.x, self.player.y),
            );

            if s.distance_to(self.player.x, self.player.y) < self.tuning.kill_dist {
                caught = true;
                break;
            }
        }

        if caught {
            self.lose_life();
            return;
        }

        self.audio
            .set_drone_dynamic(drone_level(min_dist, &self.tuning));
    }

    fn menu_key(&mut self, key: GameKey) {
        match key {
            GameKey::MenuUp | GameKey::MoveForward => {
                let idx = (self.menu_sel + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
                Self::move_selection(&mut self.audio, &mut self.menu_sel, idx);
            }
            GameKey::MenuDown | GameKey::MoveBackward => {
                let idx = (self.menu_sel + 1) % MENU_ITEMS.len();
                Self::move_selection(&mut self.audio, &mut self.menu_sel, idx);
            }
            GameKey::Confirm => {
                report_audio(self.audio.play_ui_select());
                match self.menu_sel {
                    0 => {
                        self.run = None;
                        self.enter_screen(CurrentScreen::Play);
                    }
                    1 => self.enter_screen(CurrentScreen::Settings),
                    _ => self.quit_requested = true,
                }
            }
            GameKey::Escape => self.quit_requested = true,
            _ => {}
        }
    }

    fn settings_key(&mut self, key: GameKey) {
        match key {
            GameKey::MenuUp | GameKey::MoveForward => {
                let idx = (self.settings_sel + SETTINGS_ROWS - 1) % SETTINGS_ROWS;
                Self::move_selection(&mut self.audio, &mut self.settings_sel, idx);
            }
            GameKey::MenuDown | GameKey::MoveBackward => {
                let idx = (self.settings_sel + 1) % SETTINGS_ROWS;
                Self::move_selection(&mut self.audio, &mut self.settings_sel, idx);
            }
            GameKey::TurnLeft | GameKey::StrafeLeft => self.change_setting(-1),
            GameKey::TurnRight | GameKey::StrafeRight => self.change_setting(1),
            GameKey::Confirm => self.toggle_setting(),
            GameKey::Escape => self.enter_screen(CurrentScreen::Menu),
            _ => {}
        }
    }

    fn play_key(&mut self, key: GameKey) {
        match key {
            GameKey::Escape => self.enter_screen(CurrentScreen::Pause),
            GameKey::Restart => self.start_new_run(),
            GameKey::ToggleMinimap => self.show_minimap = !self.show_minimap,
            _ => {}
        }
    }

    fn pause_key(&mut self, key: GameKey) {
        match key {
            GameKey::MenuUp | GameKey::MoveForward => {
                let idx = (self.pause_sel + PAUSE_ITEMS.len() - 1) % PAUSE_ITEMS.len();
                Self::move_selection(&mut self.audio, &mut self.pause_sel, idx);
            }
            GameKey::MenuDown | GameKey::MoveBackward => {
                let idx = (self.pause_sel + 1) % PAUSE_ITEMS.len();
                Self::move_selection(&mut self.audio, &mut self.pause_sel, idx);
            }
            GameKey::Confirm => self.activate_pause_item(),
            GameKey::Escape => self.enter_screen(CurrentScreen::Play),
            _ => {}
        }
    }

    fn activate_pause_item(&mut self) {
        report_audio(self.audio.play_ui_select());
        match self.pause_sel {
            0 => self.enter_screen(CurrentScreen::Play),
            1 => {
                let Some(run) = &self.run else {
                    return;
                };
                let record = SaveState::capture(run, &self.player, &self.stalkers, self.clock);
                match save::write_save(&record) {
                    Ok(()) => self.pause_notice = "Saved",
                    Err(e) => eprintln!("failed to write save: {e}"),
                }
            }
            2 => {
                let loaded = save::read_save().and_then(|r| r.restore(&self.layouts, &self.tuning));
                match loaded {
                    Ok((run, player, stalkers, clock)) => {
                        self.run = Some(run);
                        self.player = player;
                        self.stalkers = stalkers;
                        self.clock = clock;
                        self.enter_screen(CurrentScreen::Play);
                    }
                    Err(e) => {
                        eprintln!("no save to load: {e}");
                        self.pause_notice = "No save";
                    }
                }
            }
            _ => self.enter_screen(CurrentScreen::Menu),
        }
    }

    /// Left/right on a settings row. The toggle rows flip regardless of
    /// direction, the same way they react to Enter.
    fn change_setting(&mut self, direction: isize) {
        let opts = &mut self.options;
        let step = 0.05;
        let mut changed = false;

        match self.settings_sel {
            0 => {
                opts.invert_mouse_x = !opts.invert_mouse_x;
                changed = true;
            }
            1 => {
                opts.fullscreen = !opts.fullscreen;
                self.video_dirty = true;
                changed = true;
            }
            2 => {
                // Resolution presets only apply to the windowed mode.
                if !opts.fullscreen {
                    let before = opts.window_size;
                    opts.set_res_index(opts.res_index() as isize + direction);
                    changed = opts.window_size != before;
                    if changed {
                        self.video_dirty = true;
                    }
                }
            }
            3 => {
                let v = (opts.music_volume + direction as f32 * step).clamp(0.0, 1.0);
                changed = v != opts.music_volume;
                opts.music_volume = v;
            }
            4 => {
                let v = (opts.sfx_volume + direction as f32 * step).clamp(0.0, 1.0);
                changed = v != opts.sfx_volume;
                opts.sfx_volume = v;
            }
            _ => {}
        }

        if changed {
            self.commit_options();
        }
    }

    /// Enter on a settings row: flips the toggle rows, leaves the stepped
    /// rows alone, and Back returns to the menu.
    fn toggle_setting(&mut self) {
        match self.settings_sel {
            0 | 1 => self.change_setting(1),
            5 => {
                report_audio(self.audio.play_ui_select());
                self.enter_screen(CurrentScreen::Menu);
            }
            _ => {}
        }
    }

    /// Applies and persists a confirmed options change.
    fn commit_options(&mut self) {
        report_audio(self.audio.play_ui_select());
        self.audio
            .apply_volumes(self.options.music_volume, self.options.sfx_volume);
        self.options.save();
    }

    fn move_selection(audio: &mut GameAudioManager, sel: &mut usize, idx: usize) {
        if idx != *sel {
            *sel = idx;
            report_audio(audio.play_ui_move());
        }
    }
}

/// Maps the nearest active stalker's corridor distance to a drone level in
/// `DRONE_FLOOR..=1.0`. An unreachable stalker pins the floor.
fn drone_level(min_dist: i32, tuning: &Tuning) -> f32 {
    if min_dist >= UNREACHED_DIST {
        return DRONE_FLOOR;
    }
    let v = (1.0 - min_dist as f32 / tuning.audible_cells as f32).clamp(0.0, 1.0);
    DRONE_FLOOR + (1.0 - DRONE_FLOOR) * v.powf(tuning.sound_curve)
}

fn report_audio(result: Result<(), Box<dyn Error>>) {
    if let Err(e) = result {
        eprintln!("audio playback failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Grid;

    fn in_play() -> GameState {
        let mut gs = GameState::new();
        gs.menu_sel = 0;
        gs.key_pressed(GameKey::Confirm);
        assert_eq!(gs.current_screen, CurrentScreen::Play);
        assert!(gs.run.is_some());
        gs
    }

    /// The drone curve hits both documented endpoints: a stalker in the
    /// player's cell plays at full level, anything at or past the audible
    /// range sits on the floor.
    #[test]
    fn drone_curve_endpoints() {
        let tuning = Tuning::default();
        assert!((drone_level(0, &tuning) - 1.0).abs() < 1e-6);
        assert!((drone_level(tuning.audible_cells, &tuning) - DRONE_FLOOR).abs() < 1e-6);
        assert!((drone_level(tuning.audible_cells + 5, &tuning) - DRONE_FLOOR).abs() < 1e-6);
        assert!((drone_level(UNREACHED_DIST, &tuning) - DRONE_FLOOR).abs() < 1e-6);
    }

    /// Between the endpoints the drone gets strictly louder as the stalker
    /// closes in.
    #[test]
    fn drone_curve_is_monotonic() {
        let tuning = Tuning::default();
        let mut last = f32::INFINITY;
        for d in 0..=tuning.audible_cells {
            let v = drone_level(d, &tuning);
            assert!(v <= last, "level rose between {} and {} cells", d - 1, d);
            assert!((DRONE_FLOOR..=1.0).contains(&v));
            last = v;
        }
    }

    /// Menu selection wraps both ways and Start enters play with a live
    /// run, full lives, and the cursor captured.
    #[test]
    fn menu_start_enters_play() {
        let mut gs = GameState::new();
        assert_eq!(gs.current_screen, CurrentScreen::Menu);

        gs.key_pressed(GameKey::MenuUp);
        assert_eq!(gs.menu_sel, MENU_ITEMS.len() - 1);
        gs.key_pressed(GameKey::MenuDown);
        assert_eq!(gs.menu_sel, 0);

        gs.key_pressed(GameKey::Confirm);
        assert_eq!(gs.current_screen, CurrentScreen::Play);
        assert!(gs.capture_mouse);

        let run = gs.run.as_ref().unwrap();
        assert_eq!(run.lives, gs.tuning.lives);
        assert_eq!(run.seals_remaining(), 3);
        assert_eq!(gs.stalkers.len(), run.stalker_count);
        assert_eq!((gs.player.x, gs.player.y), run.spawn_point);
    }

    /// Escape on the menu quits; Quit does too.
    #[test]
    fn menu_quits() {
        let mut gs = GameState::new();
        gs.key_pressed(GameKey::Escape);
        assert!(gs.quit_requested);

        let mut gs = GameState::new();
        gs.menu_sel = 2;
        gs.key_pressed(GameKey::Confirm);
        assert!(gs.quit_requested);
    }

    /// Walking over a seal collects it; collecting the last one opens the
    /// door and arms the HUD flash exactly once.
    #[test]
    fn pickups_open_the_door() {
        let mut gs = in_play();
        let keys = KeyState::new();

        let seal = gs.run.as_ref().unwrap().seals[0];
        gs.player.x = seal.0;
        gs.player.y = seal.1;
        gs.update(0.016, &keys);
        assert!(gs.run.as_ref().unwrap().collected[0]);
        assert!(!gs.run.as_ref().unwrap().door_open);

        let spawn = gs.run.as_ref().unwrap().spawn_point;
        {
            let run = gs.run.as_mut().unwrap();
            for c in run.collected.iter_mut() {
                *c = true;
            }
        }
        // Keep the player away from door and seals for this frame.
        gs.player.x = spawn.0;
        gs.player.y = spawn.1;
        gs.update(0.016, &keys);
        let run = gs.run.as_ref().unwrap();
        assert!(run.door_open);
        assert!(gs.door_flash_until > gs.clock);
    }

    /// Standing in the trigger cell with the door open wins the run.
    #[test]
    fn open_door_trigger_wins() {
        let mut gs = in_play();
        let keys = KeyState::new();

        let trigger = gs.run.as_ref().unwrap().door.trigger;
        {
            let run = gs.run.as_mut().unwrap();
            for c in run.collected.iter_mut() {
                *c = true;
            }
            run.door_open = true;
        }
        gs.player.x = trigger.0;
        gs.player.y = trigger.1;
        gs.update(0.016, &keys);
        assert_eq!(gs.current_screen, CurrentScreen::Victory);

        gs.key_pressed(GameKey::Confirm);
        assert_eq!(gs.current_screen, CurrentScreen::Menu);
    }

    /// A stalker in kill range burns a life and cuts to the screamer; when
    /// it ends the player is back at the spawn with collected seals kept.
    #[test]
    fn catch_burns_a_life_then_respawns() {
        let mut gs = in_play();
        let keys = KeyState::new();
        let lives_before = gs.run.as_ref().unwrap().lives;
        gs.run.as_mut().unwrap().collected[0] = true;

        for s in gs.stalkers.iter_mut() {
            s.active_time = -10.0;
        }
        gs.stalkers[0].x = gs.player.x + 0.1;
        gs.stalkers[0].y = gs.player.y;

        gs.update(0.016, &keys);
        assert_eq!(gs.current_screen, CurrentScreen::Screamer);
        assert_eq!(gs.run.as_ref().unwrap().lives, lives_before - 1);
        assert!(gs.screamer_until > gs.clock);
        assert!(gs.screamer_until <= gs.clock + 1.2);

        // Ride the screamer out; two simulated seconds are always enough.
        for _ in 0..40 {
            gs.update(0.05, &keys);
        }
        assert_eq!(gs.current_screen, CurrentScreen::Play);
        let run = gs.run.as_ref().unwrap();
        assert_eq!((gs.player.x, gs.player.y), run.spawn_point);
        assert!(run.collected[0], "death must not reset collected seals");
        for s in &gs.stalkers {
            // Re-seeded after the screamer, so the grace window starts at or
            // after the moment it ended.
            assert!(s.active_time >= gs.screamer_until);
        }
    }

    /// The last life ends the run instead of respawning.
    #[test]
    fn last_life_is_game_over() {
        let mut gs = in_play();
        let keys = KeyState::new();
        gs.run.as_mut().unwrap().lives = 1;

        for s in gs.stalkers.iter_mut() {
            s.active_time = -10.0;
        }
        gs.stalkers[0].x = gs.player.x + 0.1;
        gs.stalkers[0].y = gs.player.y;

        gs.update(0.016, &keys);
        assert_eq!(gs.current_screen, CurrentScreen::GameOver);

        gs.key_pressed(GameKey::Confirm);
        assert_eq!(gs.current_screen, CurrentScreen::Menu);
    }

    /// Pausing freezes the run clock and resuming unfreezes it.
    #[test]
    fn pause_freezes_the_clock() {
        let mut gs = in_play();
        let keys = KeyState::new();
        gs.update(0.05, &keys);
        let frozen = gs.clock;

        gs.key_pressed(GameKey::Escape);
        assert_eq!(gs.current_screen, CurrentScreen::Pause);
        assert!(!gs.capture_mouse);
        for _ in 0..10 {
            gs.update(0.05, &keys);
        }
        assert_eq!(gs.clock, frozen);

        gs.key_pressed(GameKey::Escape);
        assert_eq!(gs.current_screen, CurrentScreen::Play);
        gs.update(0.05, &keys);
        assert!(gs.clock > frozen);
    }

    /// Save and load through the pause menu: a missing file reports "No
    /// save", a save reports "Saved" and can then be loaded back into play.
    #[test]
    fn pause_save_and_load_notices() {
        let _ = std::fs::remove_file(crate::config::config_path(save::SAVE_FILE));

        let mut gs = in_play();
        gs.key_pressed(GameKey::Escape);

        gs.pause_sel = 2;
        gs.key_pressed(GameKey::Confirm);
        assert_eq!(gs.pause_notice, "No save");
        assert_eq!(gs.current_screen, CurrentScreen::Pause);

        gs.pause_sel = 1;
        gs.key_pressed(GameKey::Confirm);
        assert_eq!(gs.pause_notice, "Saved");

        gs.pause_sel = 2;
        gs.key_pressed(GameKey::Confirm);
        assert_eq!(gs.current_screen, CurrentScreen::Play);

        let _ = std::fs::remove_file(crate::config::config_path(save::SAVE_FILE));
    }

    /// Exit to menu from pause keeps the run around but stops driving it.
    #[test]
    fn pause_exit_returns_to_menu() {
        let mut gs = in_play();
        gs.key_pressed(GameKey::Escape);
        gs.pause_sel = 3;
        gs.key_pressed(GameKey::Confirm);
        assert_eq!(gs.current_screen, CurrentScreen::Menu);
        assert_eq!(gs.menu_sel, 0);
    }

    /// Restart mid-run rebuilds everything: fresh lives, no seals
    /// collected, closed door.
    #[test]
    fn restart_rebuilds_the_run() {
        let mut gs = in_play();
        {
            let run = gs.run.as_mut().unwrap();
            run.lives = 1;
            run.collected[0] = true;
        }
        gs.key_pressed(GameKey::Restart);
        let run = gs.run.as_ref().unwrap();
        assert_eq!(run.lives, gs.tuning.lives);
        assert_eq!(run.collected, vec![false; 3]);
        assert!(!run.door_open);
        assert_eq!((gs.player.x, gs.player.y), run.spawn_point);
    }

    /// Mouse motion is clamped, smoothed, and drained each frame; the
    /// invert option flips the turn direction.
    #[test]
    fn mouse_look_smooths_and_inverts() {
        let mut gs = in_play();
        let keys = KeyState::new();
        gs.options.invert_mouse_x = false;

        gs.add_mouse_motion(1000.0);
        gs.update(0.016, &keys);
        // One frame of huge motion: clamp to 120, low-pass to 48 counts.
        let expected = 48.0 * gs.tuning.mouse_sens;
        assert!((gs.player.dirx - expected.cos()).abs() < 1e-5);
        assert!((gs.player.diry - expected.sin()).abs() < 1e-5);
        assert_eq!(gs.mouse_dx, 0.0);

        gs.player.place(gs.player.x, gs.player.y, gs.tuning.fov_plane);
        gs.mouse_smooth = 0.0;
        gs.options.invert_mouse_x = true;
        gs.add_mouse_motion(1000.0);
        gs.update(0.016, &keys);
        assert!((gs.player.diry + expected.sin()).abs() < 1e-5);
    }

    /// Volume rows step by five points and clamp at the ends; the
    /// resolution row is inert while fullscreen.
    #[test]
    fn settings_rows_step_and_clamp() {
        let mut gs = GameState::new();
        gs.menu_sel = 1;
        gs.key_pressed(GameKey::Confirm);
        assert_eq!(gs.current_screen, CurrentScreen::Settings);

        gs.settings_sel = 3;
        gs.options.music_volume = 0.10;
        gs.key_pressed(GameKey::TurnRight);
        assert!((gs.options.music_volume - 0.15).abs() < 1e-6);
        for _ in 0..10 {
            gs.key_pressed(GameKey::TurnLeft);
        }
        assert_eq!(gs.options.music_volume, 0.0);

        gs.settings_sel = 2;
        gs.options.fullscreen = true;
        gs.video_dirty = false;
        let before = gs.options.window_size;
        gs.key_pressed(GameKey::TurnRight);
        assert_eq!(gs.options.window_size, before);
        assert!(!gs.video_dirty);

        gs.options.fullscreen = false;
        gs.key_pressed(GameKey::TurnRight);
        assert_ne!(gs.options.window_size, before);
        assert!(gs.video_dirty);

        gs.key_pressed(GameKey::Escape);
        assert_eq!(gs.current_screen, CurrentScreen::Menu);
    }

    /// With the player parked, a free-running stalker only ever gets
    /// closer: the corridor distance sampled at each replan never rises.
    #[test]
    fn pursuit_closes_monotonically_on_static_player() {
        let rows = vec![
            "111111111111".to_string(),
            "100000000001".to_string(),
            "111111111111".to_string(),
        ];
        let grid = Grid::from_spec(&MapSpec::new(rows, vec![]));
        let tuning = Tuning::default();
        let player = (1.5, 1.5);
        let field = pathfind::compute_distance_field(&grid, 1, 1, |x, y| grid.is_blocking(x, y));

        let mut s = Stalker::new(10.5, 1.5, 0.0);
        let mut now = 0.0;
        let mut last = UNREACHED_DIST;
        for _ in 0..400 {
            now += 0.016;
            if now >= s.next_replan {
                s.replan(now, tuning.replan_interval, &field, player);
                assert!(
                    s.tunnel_dist_cells <= last,
                    "distance rose from {last} to {}",
                    s.tunnel_dist_cells
                );
                last = s.tunnel_dist_cells;
            }
            s.advance(&grid, 0.016, tuning.move_speed, player);
        }
        assert!(last <= 1, "stalker should end next to the player");
    }
}
