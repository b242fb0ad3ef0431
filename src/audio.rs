//! Sound effects
//!
//! The session never waits on audio: events are mapped to a `SoundEffect` and
//! handed to an `AudioSink` fire-and-forget. In the browser the sink is a
//! Web Audio manager that synthesizes every cue with oscillators, plus a
//! quiet sustained pad that plays while a game is running.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Two tiles exchanged
    Swap,
    /// Initial match of a swap cleared
    Match,
    /// Cascade match after a refill
    Cascade,
    /// Objective reached
    ObjectiveComplete,
    /// Out of moves or time
    GameOver,
}

/// Something that can play a sound effect
pub trait AudioSink {
    fn play(&self, effect: SoundEffect);
}

/// Sink that only logs; used natively and when audio is unavailable
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&self, effect: SoundEffect) {
        log::debug!("sound: {:?}", effect);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};
    use crate::settings::Settings;

    /// Pad chord (A2, E3, A3)
    const PAD_FREQS: [f32; 3] = [110.0, 164.81, 220.0];
    /// Pad level relative to the music volume
    const PAD_LEVEL: f32 = 0.05;

    /// Running background pad
    struct MusicPad {
        oscs: Vec<OscillatorNode>,
        gain: GainNode,
    }

    impl MusicPad {
        fn stop(self) {
            for osc in &self.oscs {
                osc.stop().ok();
            }
            self.gain.disconnect().ok();
        }
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
        music_volume: f32,
        music: Option<MusicPad>,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_sfx_volume(),
                music_volume: settings.effective_music_volume(),
                music: None,
            }
        }

        /// Pick up changed volume/mute preferences
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_sfx_volume();
            self.music_volume = settings.effective_music_volume();
            if self.music_volume <= 0.0 {
                self.set_music(false);
            } else if let Some(pad) = &self.music {
                pad.gain.gain().set_value(self.music_volume * PAD_LEVEL);
            }
        }

        pub fn music_playing(&self) -> bool {
            self.music.is_some()
        }

        /// Start or stop the background pad. Idempotent.
        pub fn set_music(&mut self, playing: bool) {
            if !playing {
                if let Some(pad) = self.music.take() {
                    pad.stop();
                    log::debug!("Background music stopped");
                }
                return;
            }
            if self.music.is_some() || self.music_volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            self.music = Self::start_pad(ctx, self.music_volume * PAD_LEVEL);
            if self.music.is_some() {
                log::debug!("Background music started");
            }
        }

        /// Detuned sine chord through one gain node, faded in
        fn start_pad(ctx: &AudioContext, level: f32) -> Option<MusicPad> {
            let gain = ctx.create_gain().ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            let t = ctx.current_time();
            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain().linear_ramp_to_value_at_time(level, t + 2.0).ok();

            let mut oscs = Vec::with_capacity(PAD_FREQS.len());
            for (i, freq) in PAD_FREQS.iter().enumerate() {
                let osc = ctx.create_oscillator().ok()?;
                osc.set_type(OscillatorType::Sine);
                osc.frequency().set_value(*freq);
                osc.detune().set_value(i as f32 * 4.0 - 4.0);
                osc.connect_with_audio_node(&gain).ok()?;
                osc.start().ok()?;
                oscs.push(osc);
            }
            Some(MusicPad { oscs, gain })
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Short notes played one after another
        fn arpeggio(
            &self,
            ctx: &AudioContext,
            freqs: &[f32],
            spacing: f64,
            length: f64,
            osc_type: OscillatorType,
            level: f32,
        ) {
            for (i, freq) in freqs.iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, osc_type) else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * spacing;
                gain.gain().set_value_at_time(level, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + length)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + length + 0.05).ok();
            }
        }

        /// Swap - quick upward blip
        fn play_swap(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(440.0, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }
    }

    impl AudioSink for AudioManager {
        fn play(&self, effect: SoundEffect) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let vol = self.volume;
            match effect {
                SoundEffect::Swap => self.play_swap(ctx, vol),
                SoundEffect::Match => self.arpeggio(
                    ctx,
                    &[600.0, 800.0, 1000.0],
                    0.06,
                    0.15,
                    OscillatorType::Sine,
                    vol * 0.25,
                ),
                SoundEffect::Cascade => self.arpeggio(
                    ctx,
                    &[800.0, 1000.0, 1200.0],
                    0.05,
                    0.12,
                    OscillatorType::Sine,
                    vol * 0.25,
                ),
                SoundEffect::ObjectiveComplete => self.arpeggio(
                    ctx,
                    &[500.0, 600.0, 700.0, 800.0, 1000.0],
                    0.08,
                    0.25,
                    OscillatorType::Triangle,
                    vol * 0.25,
                ),
                SoundEffect::GameOver => self.arpeggio(
                    ctx,
                    &[400.0, 350.0, 300.0, 200.0],
                    0.2,
                    0.3,
                    OscillatorType::Sine,
                    vol * 0.3,
                ),
            }
        }
    }
}
