//! Signals from the session to whatever is presenting it.

use std::f32::consts::TAU;
use std::time::Duration;

use super::state::CapturePhase;
use crate::camera::Resolution;
use crate::gallery::CapturedPhoto;

/// Oscillator shape for synthesized tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

/// A short synthesized beep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub waveform: Waveform,
    pub gain: f32,
    pub duration: Duration,
}

impl Tone {
    /// Played on every countdown tick.
    pub const COUNTDOWN: Tone = Tone {
        frequency_hz: 800.0,
        waveform: Waveform::Sine,
        gain: 0.1,
        duration: Duration::from_millis(100),
    };

    /// Played when the shutter fires.
    pub const SHUTTER: Tone = Tone {
        frequency_hz: 1000.0,
        waveform: Waveform::Square,
        gain: 0.1,
        duration: Duration::from_millis(50),
    };

    /// Render the tone as mono PCM samples in `[-gain, gain]`.
    pub fn samples(&self, sample_rate: u32) -> Vec<f32> {
        let count = (self.duration.as_secs_f64() * f64::from(sample_rate)).round() as usize;
        let step = self.frequency_hz / sample_rate as f32;
        (0..count)
            .map(|i| {
                let phase = (i as f32 * step).fract();
                let v = match self.waveform {
                    Waveform::Sine => (phase * TAU).sin(),
                    Waveform::Square => {
                        if phase < 0.5 {
                            1.0
                        } else {
                            -1.0
                        }
                    }
                };
                v * self.gain
            })
            .collect()
    }
}

/// Receives session signals. Every method defaults to doing nothing.
///
/// Implementations are called synchronously from session methods and must
/// not call back into the session.
pub trait BoothEvents: Send + Sync {
    fn on_camera(&self, _active: bool, _resolution: Option<Resolution>) {}

    fn on_phase(&self, _phase: CapturePhase) {}

    fn on_tone(&self, _tone: &Tone) {}

    fn on_flash(&self, _on: bool) {}

    fn on_captured(&self, _photo: &CapturedPhoto) {}

    fn on_gallery_changed(&self, _count: usize) {}

    /// A message the user must see (camera failures and the like).
    fn on_notice(&self, _message: &str) {}
}

/// Discards every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl BoothEvents for NoEvents {}
