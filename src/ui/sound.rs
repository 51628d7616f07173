/// Procedural sound effects, played from the frame's `GameEvent`s.
///
/// `SoundContext` is built empty and only touches the audio device in
/// `load`; `release` drops the device and the buffers. A failed `load`
/// is a `SimError::Resource`: the caller logs it and plays on silently.
///
/// Built without the "sound" feature, `load` succeeds and nothing plays.

use girder_run::sim::event::GameEvent;
use girder_run::Result;

#[cfg(feature = "sound")]
mod bank {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use girder_run::domain::entity::CollectibleKind;
    use girder_run::sim::event::GameEvent;
    use girder_run::{Result, SimError};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    #[derive(Clone, Copy)]
    pub enum Sfx {
        Jump,
        Smash,
        Hop,
        Pickup,
        Power,
        Rivet,
        Hit,
        Clear,
        Over,
    }

    const SFX_COUNT: usize = 9;

    pub struct Bank {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: Vec<Arc<Vec<u8>>>,
    }

    impl Bank {
        pub fn open() -> Result<Self> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| SimError::Resource(format!("audio output: {e}")))?;

            let sources: [Vec<f32>; SFX_COUNT] = [
                sweep(220.0, 660.0, 0.09, 0.22),
                noise_burst(0.14, 180.0, 0.35),
                notes(&[(880.0, 0.05), (1175.0, 0.06)], 0.2),
                notes(&[(1047.0, 0.045), (1319.0, 0.045), (1568.0, 0.06)], 0.25),
                notes(&[(523.0, 0.06), (784.0, 0.06), (1047.0, 0.06), (1568.0, 0.12)], 0.25),
                noise_burst(0.08, 90.0, 0.3),
                fade_tail(notes(&[(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.2)], 0.3)),
                notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.3)], 0.3),
                fade_tail(notes(&[(392.0, 0.2), (330.0, 0.2), (262.0, 0.2), (196.0, 0.4)], 0.3)),
            ];
            let buffers = sources.iter().map(|s| Arc::new(make_wav(s))).collect();

            Ok(Bank { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(buf) = self.buffers.get(sfx as usize) else { return };
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }
    }

    /// Which effect an event makes, if any.
    pub fn sfx_for(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::Jumped => Some(Sfx::Jump),
            GameEvent::HazardSmashed { .. } => Some(Sfx::Smash),
            GameEvent::JumpedOver { .. } => Some(Sfx::Hop),
            GameEvent::Collected { kind: CollectibleKind::Bonus, .. } => Some(Sfx::Pickup),
            GameEvent::PowerUpStarted { .. } => Some(Sfx::Power),
            GameEvent::RivetBroken { .. } => Some(Sfx::Rivet),
            GameEvent::LifeLost { .. } => Some(Sfx::Hit),
            GameEvent::LevelCleared { .. } => Some(Sfx::Clear),
            GameEvent::GameOver { .. } => Some(Sfx::Over),
            _ => None,
        }
    }

    // ── Waveforms (mono f32) ──

    fn sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (from + (to - from) * t) * TAU / SAMPLE_RATE as f32;
                phase.sin().signum() * (1.0 - t) * volume
            })
            .collect()
    }

    /// Sine plus a quiet octave, one note after another.
    fn notes(seq: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in seq {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.4;
                let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 2.0 * TAU).sin() * 0.25;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    fn noise_burst(duration: f32, pitch: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 0x2545_f491;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let tone = (i as f32 / SAMPLE_RATE as f32 * pitch * (1.0 - 0.5 * t) * TAU).sin();
                rng = rng.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let noise = (rng >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                (tone * 0.3 + noise * 0.7) * (1.0 - t).powf(1.5) * volume
            })
            .collect()
    }

    fn fade_tail(mut samples: Vec<f32>) -> Vec<f32> {
        let total = samples.len();
        let fade = total / 4;
        for (k, s) in samples[total - fade..].iter_mut().enumerate() {
            *s *= 1.0 - k as f32 / fade.max(1) as f32;
        }
        samples
    }

    /// 16-bit mono PCM in a RIFF container.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_size = samples.len() as u32 * 2;
        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }
}

#[derive(Default)]
pub struct SoundContext {
    #[cfg(feature = "sound")]
    bank: Option<bank::Bank>,
    loaded: bool,
}

impl SoundContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the output device and render every effect. Idempotent.
    pub fn load(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        #[cfg(feature = "sound")]
        {
            self.bank = Some(bank::Bank::open()?);
            log::info!("sound effects loaded");
        }
        self.loaded = true;
        Ok(())
    }

    pub fn release(&mut self) {
        #[cfg(feature = "sound")]
        {
            self.bank = None;
        }
        self.loaded = false;
    }

    /// Silent until `load` has succeeded.
    pub fn play_events(&self, events: &[GameEvent]) {
        #[cfg(feature = "sound")]
        if let Some(bank) = &self.bank {
            for sfx in events.iter().filter_map(bank::sfx_for) {
                bank.play(sfx);
            }
        }
        #[cfg(not(feature = "sound"))]
        let _ = events;
    }
}
