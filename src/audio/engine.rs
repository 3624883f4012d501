use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};
use crossbeam_channel::{Receiver, Sender};

use crate::constants::SAMPLE_RATE;
use crate::error::{DeckError, Result};
use crate::messages::{AudioCmd, AudioMsg};

pub(crate) struct LevelMeter {
    sum_sq: f32,
    count: usize,
    peak: f32,
}

impl LevelMeter {
    pub(crate) fn new() -> Self {
        Self {
            sum_sq: 0.0,
            count: 0,
            peak: 0.0,
        }
    }

    pub(crate) fn push(&mut self, sample: f32) {
        self.sum_sq += sample * sample;
        self.count += 1;
        let abs = sample.abs();
        if abs > self.peak {
            self.peak = abs;
        }
    }

    pub(crate) fn take_rms(&mut self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        let rms = (self.sum_sq / self.count as f32).sqrt();
        self.sum_sq = 0.0;
        self.count = 0;
        rms
    }

    pub(crate) fn take_peak(&mut self) -> f32 {
        let p = self.peak;
        self.peak *= 0.995;
        p
    }
}

pub struct PlaybackEngine;

impl PlaybackEngine {
    /// Opens the output stream. Track audio arrives whole through
    /// `AudioCmd::Play`; all playback state lives inside the callback, so
    /// nothing here ever locks.
    pub fn start(cmd_rx: Receiver<AudioCmd>, msg_tx: Sender<AudioMsg>) -> Result<cpal::Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DeckError::NoOutputDevice)?;

        let config = StreamConfig {
            channels: 2,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        // --- All playback state lives inside the output callback closure ---
        let mut current: Option<Vec<f32>> = None;
        let mut frame_pos: usize = 0;
        let mut meter_l = LevelMeter::new();
        let mut meter_r = LevelMeter::new();
        let mut report_counter: usize = 0;
        let report_interval = SAMPLE_RATE as usize / 30;

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                while let Ok(cmd) = cmd_rx.try_recv() {
                    match cmd {
                        AudioCmd::Play(samples) => {
                            current = Some(samples);
                            frame_pos = 0;
                        }
                        AudioCmd::Stop => {
                            current = None;
                            frame_pos = 0;
                        }
                    }
                }

                for frame in data.chunks_mut(2) {
                    let mut left = 0.0f32;
                    let mut right = 0.0f32;
                    let mut ran_out = false;

                    if let Some(samples) = &current {
                        let idx = frame_pos * 2;
                        if idx + 1 < samples.len() {
                            left = samples[idx];
                            right = samples[idx + 1];
                            frame_pos += 1;
                        } else {
                            ran_out = true;
                        }
                    }
                    if ran_out {
                        // Track ran out; report once, then sit silent
                        // through the gap until the next Play arrives.
                        current = None;
                        frame_pos = 0;
                        let _ = msg_tx.try_send(AudioMsg::Finished);
                    }

                    frame[0] = left.clamp(-1.0, 1.0);
                    frame[1] = right.clamp(-1.0, 1.0);
                    meter_l.push(left);
                    meter_r.push(right);

                    report_counter += 1;
                    if report_counter >= report_interval {
                        report_counter = 0;
                        if current.is_some() {
                            let _ = msg_tx.try_send(AudioMsg::Position(
                                frame_pos as f64 / SAMPLE_RATE as f64,
                            ));
                        }
                        let _ = msg_tx
                            .try_send(AudioMsg::Levels(meter_l.take_rms(), meter_r.take_rms()));
                        let _ = msg_tx
                            .try_send(AudioMsg::Peaks(meter_l.take_peak(), meter_r.take_peak()));
                    }
                }
            },
            |err| {
                tracing::error!(error = %err, "audio output error");
            },
            None,
        )?;

        stream.play()?;
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_a_square_wave_is_its_amplitude() {
        let mut meter = LevelMeter::new();
        for i in 0..1000 {
            meter.push(if i % 2 == 0 { 0.5 } else { -0.5 });
        }
        assert!((meter.take_rms() - 0.5).abs() < 1e-6);
        // Draining resets the accumulator.
        assert_eq!(meter.take_rms(), 0.0);
    }

    #[test]
    fn peak_holds_then_decays() {
        let mut meter = LevelMeter::new();
        meter.push(0.8);
        meter.push(-0.2);
        assert_eq!(meter.take_peak(), 0.8);
        let decayed = meter.take_peak();
        assert!(decayed < 0.8 && decayed > 0.7);
    }

    #[test]
    fn silence_reads_zero() {
        let mut meter = LevelMeter::new();
        assert_eq!(meter.take_rms(), 0.0);
        assert_eq!(meter.take_peak(), 0.0);
    }
}
