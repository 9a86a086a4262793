//! Audio system using Web Audio API
//!
//! Procedurally generated blips, no sample files. Delayed notes are scheduled
//! on the audio clock rather than with timers.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::SimEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundEffect {
    /// Object released
    Drop,
    /// Object hit the plank; heavier is lower and louder
    Land { weight: f64 },
    /// Seesaw cleared
    Reset,
}

impl SoundEffect {
    /// Sound for a simulation event, if it has one
    pub fn for_event(event: &SimEvent) -> Option<Self> {
        match event {
            SimEvent::Dropped { .. } => Some(Self::Drop),
            SimEvent::Landed { weight, .. } => Some(Self::Land { weight: *weight }),
            SimEvent::Reset => Some(Self::Reset),
            SimEvent::WidthChanged { .. } => None,
        }
    }
}

/// Landing pitch in Hz
fn land_frequency(weight: f64) -> f32 {
    (200.0 - weight * 10.0).max(80.0) as f32
}

/// Landing volume
fn land_volume(weight: f64) -> f32 {
    (0.2 + weight * 0.03).min(0.5) as f32
}

/// One scheduled note
struct Tone {
    freq: f32,
    duration: f64,
    osc_type: OscillatorType,
    volume: f32,
    delay: f64,
}

pub struct AudioManager {
    ctx: Option<AudioContext>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Play the sound for a simulation event, if any
    pub fn play_event(&self, event: &SimEvent) {
        if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let Some(ctx) = &self.ctx else { return };

        // Browsers start the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let tones = match effect {
            SoundEffect::Drop => vec![
                Tone {
                    freq: 600.0,
                    duration: 0.15,
                    osc_type: OscillatorType::Sine,
                    volume: 0.2,
                    delay: 0.0,
                },
                Tone {
                    freq: 400.0,
                    duration: 0.1,
                    osc_type: OscillatorType::Sine,
                    volume: 0.15,
                    delay: 0.1,
                },
            ],
            SoundEffect::Land { weight } => vec![Tone {
                freq: land_frequency(weight),
                duration: 0.2,
                osc_type: OscillatorType::Triangle,
                volume: land_volume(weight),
                delay: 0.0,
            }],
            SoundEffect::Reset => vec![
                Tone {
                    freq: 300.0,
                    duration: 0.1,
                    osc_type: OscillatorType::Square,
                    volume: 0.15,
                    delay: 0.0,
                },
                Tone {
                    freq: 500.0,
                    duration: 0.1,
                    osc_type: OscillatorType::Square,
                    volume: 0.15,
                    delay: 0.08,
                },
                Tone {
                    freq: 700.0,
                    duration: 0.15,
                    osc_type: OscillatorType::Square,
                    volume: 0.1,
                    delay: 0.16,
                },
            ],
        };

        for tone in &tones {
            self.play_tone(ctx, tone);
        }
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

    /// Single note with an exponential decay
    fn play_tone(&self, ctx: &AudioContext, tone: &Tone) {
        let Some((osc, gain)) = self.create_osc(ctx, tone.freq, tone.osc_type) else {
            return;
        };
        let t = ctx.current_time() + tone.delay;

        gain.gain().set_value_at_time(tone.volume, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + tone.duration)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + tone.duration).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Side;

    #[test]
    fn test_land_pitch_and_volume() {
        assert_eq!(land_frequency(1.0), 190.0);
        assert_eq!(land_frequency(10.0), 100.0);
        assert_eq!(land_frequency(15.0), 80.0);
        assert!((land_volume(1.0) - 0.23).abs() < 1e-6);
        assert_eq!(land_volume(20.0), 0.5);
    }

    #[test]
    fn test_event_mapping() {
        let landed = SimEvent::Landed {
            id: 0,
            weight: 4.0,
            side: Side::Left,
            distance: 30.0,
        };
        assert_eq!(
            SoundEffect::for_event(&landed),
            Some(SoundEffect::Land { weight: 4.0 })
        );
        assert_eq!(SoundEffect::for_event(&SimEvent::Reset), Some(SoundEffect::Reset));
        assert_eq!(SoundEffect::for_event(&SimEvent::WidthChanged { width: 500.0 }), None);
    }
}
