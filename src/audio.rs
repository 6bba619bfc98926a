//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! One-shots come from `GameEvent::Sound`; the engine and side thrusters run
//! as looping oscillators between their start/stop events.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::{EffectKind, GameEvent, SoundEffect};

/// A running loop voice
struct Voice {
    effect: EffectKind,
    osc: OscillatorNode,
    gain: GainNode,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    /// Final one-shot gain from player settings
    sfx_gain: f32,
    /// Final loop gain from player settings
    engine_gain: f32,
    muted: bool,
    voices: Vec<Voice>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        let defaults = crate::Settings::default();
        Self {
            ctx,
            sfx_gain: defaults.sfx_gain(),
            engine_gain: defaults.engine_gain(),
            muted: false,
            voices: Vec::new(),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Pull volumes from player settings
    pub fn apply_settings(&mut self, settings: &crate::Settings) {
        self.sfx_gain = settings.sfx_gain();
        self.engine_gain = settings.engine_gain();
        self.refresh_voices();
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.refresh_voices();
    }

    fn one_shot_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.sfx_gain
        }
    }

    fn loop_gain(&self, effect: EffectKind) -> f32 {
        if self.muted {
            return 0.0;
        }
        let level = match effect {
            EffectKind::MainExhaust => 0.35,
            _ => 0.12,
        };
        self.engine_gain * level
    }

    /// React to one simulation event
    pub fn handle(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::Sound(sound) => self.play(sound),
            GameEvent::EffectStarted(effect) if effect.is_looping() => self.start_loop(effect),
            GameEvent::EffectStopped(effect) => self.stop_loop(effect),
            GameEvent::FeedbackSilenced => self.stop_all(),
            _ => {}
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.one_shot_gain();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Crash => self.play_crash(ctx, vol),
            SoundEffect::Success => self.play_success(ctx, vol),
            SoundEffect::Bump => self.play_bump(ctx, vol),
            SoundEffect::Pickup => self.play_pickup(ctx, vol),
        }
    }

    /// Fanfare for a new best landing time
    pub fn play_record(&self) {
        let vol = self.one_shot_gain();
        let Some(ctx) = &self.ctx else { return };
        if vol <= 0.0 {
            return;
        }
        for (i, freq) in [500.0, 600.0, 700.0, 800.0, 1000.0].iter().enumerate() {
            let delay = 0.6 + i as f64 * 0.08;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }

    // === Loops ===

    fn start_loop(&mut self, effect: EffectKind) {
        if self.voices.iter().any(|v| v.effect == effect) {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        let (freq, osc_type) = match effect {
            EffectKind::MainExhaust => (55.0, OscillatorType::Sawtooth),
            EffectKind::LeftThruster => (180.0, OscillatorType::Square),
            _ => (190.0, OscillatorType::Square),
        };
        let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
            return;
        };

        // Short fade-in to avoid clicks
        let t = ctx.current_time();
        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(self.loop_gain(effect), t + 0.05)
            .ok();
        osc.start().ok();

        self.voices.push(Voice { effect, osc, gain });
    }

    fn stop_loop(&mut self, effect: EffectKind) {
        let Some(ctx) = &self.ctx else { return };
        let t = ctx.current_time();
        self.voices.retain(|voice| {
            if voice.effect != effect {
                return true;
            }
            Self::release_voice(voice, t);
            false
        });
    }

    /// Stop every loop immediately
    pub fn stop_all(&mut self) {
        let Some(ctx) = &self.ctx else {
            self.voices.clear();
            return;
        };
        let t = ctx.current_time();
        for voice in self.voices.drain(..) {
            Self::release_voice(&voice, t);
        }
    }

    fn release_voice(voice: &Voice, t: f64) {
        voice.gain.gain().cancel_scheduled_values(t).ok();
        voice.gain.gain().set_value_at_time(voice.gain.gain().value(), t).ok();
        voice
            .gain
            .gain()
            .linear_ramp_to_value_at_time(0.0, t + 0.05)
            .ok();
        voice.osc.stop_with_when(t + 0.06).ok();
    }

    fn refresh_voices(&self) {
        let Some(ctx) = &self.ctx else { return };
        let t = ctx.current_time();
        for voice in &self.voices {
            voice
                .gain
                .gain()
                .set_value_at_time(self.loop_gain(voice.effect), t)
                .ok();
        }
    }

    // === Sound generators ===

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

    /// Crash - boom with a metallic crack
    fn play_crash(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(25.0, t + 0.6)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.7).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.frequency().set_value_at_time(1500.0, t).ok();
            osc.frequency().set_value_at_time(400.0, t + 0.03).ok();
            osc.frequency().set_value_at_time(900.0, t + 0.06).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }
    }

    /// Success - triumphant fanfare
    fn play_success(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [400.0, 500.0, 600.0, 800.0].iter().enumerate() {
            let delay = i as f64 * 0.1;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.5).ok();
            }
        }
    }

    /// Bump - solid thump
    fn play_bump(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 150.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.6, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.frequency().set_value_at_time(150.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(60.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Pickup - happy ding
    fn play_pickup(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
            let delay = i as f64 * 0.08;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }
}
