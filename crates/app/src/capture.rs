//! Synthetic stand-in for an audio capture device: generates test tones and
//! encodes each block into the 8-bit waveform and FFT layouts the core
//! consumes.

use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use spectrum_visualiser_core::{CapturedFrame, Result, VisualiserError};

/// Sum of equal-amplitude sine tones.
#[derive(Debug, Clone)]
pub struct ToneCapture {
    tones: Vec<f32>,
    sample_rate: u32,
    position: u64,
}

impl ToneCapture {
    pub fn new(tones: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            tones,
            sample_rate,
            position: 0,
        }
    }

    /// Produces the next `len` samples in `[-1, 1]`.
    pub fn next_block(&mut self, len: usize) -> Vec<f32> {
        let sample_rate = self.sample_rate.max(1) as f64;
        let gain = if self.tones.is_empty() {
            0.0
        } else {
            1.0 / self.tones.len() as f32
        };

        let block = (0..len as u64)
            .map(|offset| {
                let t = (self.position + offset) as f64 / sample_rate;
                self.tones
                    .iter()
                    .map(|hz| ((2.0 * std::f64::consts::PI * f64::from(*hz) * t).sin()) as f32)
                    .sum::<f32>()
                    * gain
            })
            .collect();
        self.position += len as u64;
        block
    }
}

/// Turns blocks of `capture_size` samples into [`CapturedFrame`]s.
///
/// The FFT bytes follow the usual 8-bit capture layout: byte 0 holds the real
/// part of the DC bin, byte 1 the real part of the Nyquist bin, and bytes
/// `2k`/`2k + 1` the real/imaginary parts of bin `k`.
pub struct FftEncoder {
    size: usize,
    gain: f32,
    plan: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,
    sequence: u64,
}

impl FftEncoder {
    pub fn new(capture_size: usize, gain: f32) -> Result<Self> {
        if capture_size < 2 || capture_size % 2 != 0 {
            return Err(VisualiserError::InvalidInput(
                "capture size must be an even number of at least two samples",
            ));
        }

        let plan = RealFftPlanner::<f32>::new().plan_fft_forward(capture_size);
        Ok(Self {
            size: capture_size,
            gain,
            input: plan.make_input_vec(),
            spectrum: plan.make_output_vec(),
            scratch: plan.make_scratch_vec(),
            plan,
            sequence: 0,
        })
    }

    pub fn capture_size(&self) -> usize {
        self.size
    }

    /// Encodes one block. Shorter blocks are zero padded, longer ones cut.
    pub fn encode(&mut self, samples: &[f32]) -> Result<CapturedFrame> {
        let len = self.size;
        for (index, slot) in self.input.iter_mut().enumerate() {
            let sample = samples.get(index).copied().unwrap_or(0.0);
            *slot = sample * hann_value(index, len);
        }

        self.plan
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
            .map_err(|err| VisualiserError::msg(format!("fft failed: {err}")))?;

        let scale = self.gain * 2.0 / len as f32 * 128.0;
        let mut fft = vec![0_i8; len];
        fft[0] = quantise(self.spectrum[0].re * scale);
        fft[1] = quantise(self.spectrum[len / 2].re * scale);
        for bin in 1..len / 2 {
            fft[2 * bin] = quantise(self.spectrum[bin].re * scale);
            fft[2 * bin + 1] = quantise(self.spectrum[bin].im * scale);
        }

        let waveform = (0..len)
            .map(|index| {
                let sample = samples.get(index).copied().unwrap_or(0.0).clamp(-1.0, 1.0);
                (sample * 127.0 + 128.0).round() as u8
            })
            .collect();

        let frame = CapturedFrame {
            sequence: self.sequence,
            waveform: Some(waveform),
            fft: Some(fft),
        };
        self.sequence += 1;
        Ok(frame)
    }
}

impl fmt::Debug for FftEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftEncoder")
            .field("size", &self.size)
            .field("gain", &self.gain)
            .field("sequence", &self.sequence)
            .finish()
    }
}

fn quantise(value: f32) -> i8 {
    value.round().clamp(-128.0, 127.0) as i8
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}
