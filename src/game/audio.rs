//! Synthesized audio: sound bank generation and playback.
//!
//! Every sound is rendered into memory at startup; there are no audio assets
//! on disk. If no output device can be opened, playback calls become no-ops.

use kira::AudioManager;
use kira::AudioManagerSettings;
use kira::Decibels;
use kira::DefaultBackend;
use kira::Easing;
use kira::Frame;
use kira::StartTime;
use kira::Tween;
use kira::sound::static_sound::StaticSoundData;
use kira::sound::static_sound::StaticSoundHandle;
use kira::sound::static_sound::StaticSoundSettings;
use rand::Rng;
use std::error::Error;
use std::f32::consts::TAU;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;
const DRONE_SECONDS: f32 = 3.5;
const MENU_PAD_SECONDS: f32 = 8.0;

/// Owns the kira output and the synthesized sound bank.
///
/// Long-lived handles (drone, menu pad, scream) are tracked so they can be
/// stopped or re-volumed later; one-shots are fire-and-forget.
pub struct GameAudioManager {
    // None when no output device could be opened; everything no-ops then.
    manager: Option<AudioManager<DefaultBackend>>,
    drone_data: StaticSoundData,
    menu_data: StaticSoundData,
    scream_data: StaticSoundData,
    pickup_data: StaticSoundData,
    door_open_data: StaticSoundData,
    victory_data: StaticSoundData,
    death_data: StaticSoundData,
    ui_move_data: StaticSoundData,
    ui_select_data: StaticSoundData,
    drone: Option<StaticSoundHandle>,
    menu: Option<StaticSoundHandle>,
    scream: Option<StaticSoundHandle>,
    drone_dynamic: f32,
    music_volume: f32,
    sfx_volume: f32,
}

impl GameAudioManager {
    /// Renders the sound bank and opens the default output device.
    ///
    /// A failed device open disables audio instead of failing the game.
    pub fn new(music_volume: f32, sfx_volume: f32) -> Self {
        let manager = match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(m) => Some(m),
            Err(e) => {
                eprintln!("audio disabled: {e}");
                None
            }
        };

        GameAudioManager {
            manager,
            drone_data: make_drone(),
            menu_data: make_menu_pad(),
            scream_data: make_screamer(),
            pickup_data: make_pickup(),
            door_open_data: make_door_open(),
            victory_data: make_victory(),
            death_data: make_death(),
            ui_move_data: make_ui_move(),
            ui_select_data: make_ui_select(),
            drone: None,
            menu: None,
            scream: None,
            drone_dynamic: 0.10,
            music_volume: music_volume.clamp(0.0, 1.0),
            sfx_volume: sfx_volume.clamp(0.0, 1.0),
        }
    }

    /// Applies new channel volumes to everything currently playing.
    pub fn apply_volumes(&mut self, music_volume: f32, sfx_volume: f32) {
        self.music_volume = music_volume.clamp(0.0, 1.0);
        self.sfx_volume = sfx_volume.clamp(0.0, 1.0);

        let tween = short_tween();
        if let Some(handle) = &mut self.menu {
            handle.set_volume(to_db(self.music_volume), tween);
        }
        if let Some(handle) = &mut self.scream {
            handle.set_volume(to_db(self.sfx_volume), tween);
        }
        self.set_drone_dynamic(self.drone_dynamic);
    }

    /// Starts the looping pursuit drone if it is not already running.
    pub fn start_drone(&mut self) -> Result<(), Box<dyn Error>> {
        let Some(manager) = &mut self.manager else {
            return Ok(());
        };
        if self.drone.is_none() {
            let data = self
                .drone_data
                .clone()
                .loop_region(0.0..DRONE_SECONDS as f64)
                .volume(to_db(self.drone_dynamic * self.sfx_volume));
            self.drone = Some(manager.play(data)?);
        }
        self.set_drone_dynamic(self.drone_dynamic);
        Ok(())
    }

    /// Stops the pursuit drone.
    pub fn stop_drone(&mut self) {
        if let Some(mut handle) = self.drone.take() {
            handle.stop(Tween::default());
        }
    }

    /// Sets the proximity level, `0..=1`, that scales the drone under the
    /// effect volume.
    pub fn set_drone_dynamic(&mut self, vol01: f32) {
        self.drone_dynamic = vol01.clamp(0.0, 1.0);
        if let Some(handle) = &mut self.drone {
            handle.set_volume(to_db(self.drone_dynamic * self.sfx_volume), short_tween());
        }
    }

    /// Starts the looping menu pad if it is not already running.
    pub fn play_menu_music(&mut self) -> Result<(), Box<dyn Error>> {
        let Some(manager) = &mut self.manager else {
            return Ok(());
        };
        if self.menu.is_some() {
            return Ok(());
        }
        let data = self
            .menu_data
            .clone()
            .loop_region(0.0..MENU_PAD_SECONDS as f64)
            .volume(to_db(self.music_volume));
        self.menu = Some(manager.play(data)?);
        Ok(())
    }

    /// Stops the menu pad.
    pub fn stop_menu_music(&mut self) {
        if let Some(mut handle) = self.menu.take() {
            handle.stop(Tween::default());
        }
    }

    /// Plays the capture scream, cutting the drone and any earlier scream.
    pub fn play_scream(&mut self) -> Result<(), Box<dyn Error>> {
        self.stop_drone();
        self.stop_scream();
        let Some(manager) = &mut self.manager else {
            return Ok(());
        };
        let data = self.scream_data.clone().volume(to_db(self.sfx_volume));
        self.scream = Some(manager.play(data)?);
        Ok(())
    }

    /// Stops the capture scream.
    pub fn stop_scream(&mut self) {
        if let Some(mut handle) = self.scream.take() {
            handle.stop(Tween::default());
        }
    }

    /// One-shot for collecting an objective.
    pub fn play_pickup(&mut self) -> Result<(), Box<dyn Error>> {
        self.play_sfx(self.pickup_data.clone())
    }

    /// One-shot for the exit door unlocking.
    pub fn play_door_open(&mut self) -> Result<(), Box<dyn Error>> {
        self.play_sfx(self.door_open_data.clone())
    }

    /// One-shot for clearing a level.
    pub fn play_victory(&mut self) -> Result<(), Box<dyn Error>> {
        self.play_sfx(self.victory_data.clone())
    }

    /// One-shot for losing a life.
    pub fn play_death(&mut self) -> Result<(), Box<dyn Error>> {
        self.play_sfx(self.death_data.clone())
    }

    /// One-shot for moving a menu selection.
    pub fn play_ui_move(&mut self) -> Result<(), Box<dyn Error>> {
        self.play_sfx(self.ui_move_data.clone())
    }

    /// One-shot for confirming a menu selection.
    pub fn play_ui_select(&mut self) -> Result<(), Box<dyn Error>> {
        self.play_sfx(self.ui_select_data.clone())
    }

    fn play_sfx(&mut self, data: StaticSoundData) -> Result<(), Box<dyn Error>> {
        let Some(manager) = &mut self.manager else {
            return Ok(());
        };
        // One-shots keep playing after the handle drops.
        manager.play(data.volume(to_db(self.sfx_volume)))?;
        Ok(())
    }
}

fn short_tween() -> Tween {
    Tween {
        start_time: StartTime::Immediate,
        duration: Duration::from_millis(100),
        easing: Easing::Linear,
    }
}

fn to_db(volume: f32) -> Decibels {
    if volume <= 0.001 {
        Decibels::SILENCE
    } else {
        Decibels(20.0 * volume.log10())
    }
}

fn sound_from_samples(samples: Vec<f32>) -> StaticSoundData {
    StaticSoundData {
        sample_rate: SAMPLE_RATE,
        frames: samples.into_iter().map(Frame::from_mono).collect(),
        settings: StaticSoundSettings::default(),
        slice: None,
    }
}

fn synth(seconds: f32, mut wave: impl FnMut(f32) -> f32) -> Vec<f32> {
    let n = (seconds * SAMPLE_RATE as f32) as usize;
    (0..n)
        .map(|i| wave(i as f32 / SAMPLE_RATE as f32).clamp(-1.0, 1.0))
        .collect()
}

// Low beating drone: two detuned partials, the second slowly FM'd, over a
// noise bed. Loops without a seam because the noise hides the joint.
fn make_drone() -> StaticSoundData {
    let mut rng = rand::thread_rng();
    sound_from_samples(synth(DRONE_SECONDS, move |t| {
        let a = 0.35 * (TAU * 48.0 * t).sin();
        let b = 0.20 * (TAU * (55.0 + 2.2 * (TAU * 0.35 * t).sin()) * t).sin();
        let noise = 0.08 * (rng.r#gen::<f32>() * 2.0 - 1.0);
        (a + b + noise) * 0.9
    }))
}

// Menu pad: a slow-swelling stack of harmonics. Every frequency completes
// whole cycles over the loop length, so the loop point is inaudible.
fn make_menu_pad() -> StaticSoundData {
    sound_from_samples(synth(MENU_PAD_SECONDS, |t| {
        let swell = 0.55 + 0.45 * (TAU * 0.125 * t).sin();
        let chord = 0.20 * (TAU * 55.0 * t).sin()
            + 0.16 * (TAU * 110.0 * t).sin()
            + 0.09 * (TAU * 165.0 * t).sin();
        swell * chord
    }))
}

fn make_screamer() -> StaticSoundData {
    let mut rng = rand::thread_rng();
    sound_from_samples(synth(1.2, move |t| {
        let env = (-2.5 * t).exp();
        let dive = (TAU * (950.0 - 500.0 * t) * t).sin();
        let noise = rng.r#gen::<f32>() * 2.0 - 1.0;
        (0.75 * noise + 0.55 * dive) * env
    }))
}

fn make_pickup() -> StaticSoundData {
    sound_from_samples(synth(0.18, |t| {
        let env = 1.0 - t / 0.18;
        0.5 * (TAU * (600.0 + 3300.0 * t) * t).sin() * env
    }))
}

fn make_door_open() -> StaticSoundData {
    let mut rng = rand::thread_rng();
    sound_from_samples(synth(0.5, move |t| {
        let thud = 0.8 * (TAU * 70.0 * t).sin() * (-6.0 * t).exp();
        let latch = 0.3 * (rng.r#gen::<f32>() * 2.0 - 1.0) * (-60.0 * t).exp();
        thud + latch
    }))
}

fn make_victory() -> StaticSoundData {
    sound_from_samples(synth(1.4, |t| {
        let attack = (t / 0.02).min(1.0);
        let chord = 0.28 * (TAU * 330.0 * t).sin()
            + 0.22 * (TAU * 415.3 * t).sin()
            + 0.18 * (TAU * 494.0 * t).sin()
            + 0.12 * (TAU * 660.0 * t).sin();
        chord * attack * (-1.6 * t).exp()
    }))
}

fn make_death() -> StaticSoundData {
    sound_from_samples(synth(1.0, |t| {
        let fall = 0.6 * (TAU * (220.0 - 110.0 * t) * t).sin();
        let under = 0.25 * (TAU * 55.0 * t).sin();
        (fall + under) * (-2.8 * t).exp()
    }))
}

fn make_ui_move() -> StaticSoundData {
    sound_from_samples(synth(0.06, |t| {
        0.35 * (TAU * 440.0 * t).sin() * (1.0 - t / 0.06)
    }))
}

fn make_ui_select() -> StaticSoundData {
    sound_from_samples(synth(0.10, |t| {
        0.35 * (TAU * 660.0 * t).sin() * (1.0 - t / 0.10)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Synth output stays inside the sample range and has the expected
    /// length.
    #[test]
    fn buffers_are_bounded_and_sized() {
        for (data, seconds) in [
            (make_drone(), DRONE_SECONDS),
            (make_menu_pad(), MENU_PAD_SECONDS),
            (make_screamer(), 1.2),
            (make_pickup(), 0.18),
            (make_door_open(), 0.5),
            (make_victory(), 1.4),
            (make_death(), 1.0),
            (make_ui_move(), 0.06),
            (make_ui_select(), 0.10),
        ] {
            let expected = (seconds * SAMPLE_RATE as f32) as usize;
            assert_eq!(data.frames.len(), expected);
            assert_eq!(data.sample_rate, SAMPLE_RATE);
            assert!(
                data.frames
                    .iter()
                    .all(|f| f.left.abs() <= 1.0 && f.right.abs() <= 1.0)
            );
        }
    }

    /// The loops carry actual signal, not silence.
    #[test]
    fn loops_are_not_silent() {
        for data in [make_drone(), make_menu_pad()] {
            let peak = data
                .frames
                .iter()
                .map(|f| f.left.abs())
                .fold(0.0_f32, f32::max);
            assert!(peak > 0.2);
        }
    }

    /// The menu pad starts and ends near zero so the loop seam is clean.
    #[test]
    fn menu_pad_loop_seam_is_quiet() {
        let data = make_menu_pad();
        let first = data.frames.first().map(|f| f.left).unwrap_or(1.0);
        let last = data.frames.last().map(|f| f.left).unwrap_or(1.0);
        assert!(first.abs() < 0.05);
        assert!(last.abs() < 0.05);
    }

    /// Linear volume maps to decibels with silence guarded.
    #[test]
    fn volume_conversion_endpoints() {
        assert_eq!(to_db(1.0).0, 0.0);
        assert!(to_db(0.5).0 < 0.0);
        assert_eq!(to_db(0.0), Decibels::SILENCE);
    }
}
