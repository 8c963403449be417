use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::TtsError;

/// Mono sample buffer plus its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub const fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Write a waveform into a complete WAV container
///
/// Samples are stored as mono 32-bit IEEE float, so decoding returns them
/// bit for bit.
pub fn encode(waveform: &Waveform) -> crate::Result<Vec<u8>> {
    if waveform.sample_rate == 0 {
        return Err(TtsError::Audio("sample rate must be non-zero".to_string()));
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    // 44-byte header plus 4 bytes per sample
    let mut cursor = Cursor::new(Vec::with_capacity(44 + waveform.samples.len() * 4));

    let mut writer = WavWriter::new(&mut cursor, spec).map_err(|e| TtsError::Audio(format!("wav header: {e}")))?;

    for &sample in &waveform.samples {
        writer
            .write_sample(sample)
            .map_err(|e| TtsError::Audio(format!("wav sample: {e}")))?;
    }

    writer
        .finalize()
        .map_err(|e| TtsError::Audio(format!("wav finalize: {e}")))?;

    Ok(cursor.into_inner())
}

/// Read a WAV container into a mono waveform
///
/// Integer PCM is scaled to [-1.0, 1.0]; multi-channel audio is downmixed
/// by averaging each frame.
pub fn decode(bytes: &[u8]) -> crate::Result<Waveform> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| TtsError::Audio(format!("wav header: {e}")))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| TtsError::Audio(format!("wav samples: {e}")))?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| int_to_float(v, scale)))
                .collect::<Result<_, _>>()
                .map_err(|e| TtsError::Audio(format!("wav samples: {e}")))?
        }
    };

    let samples = match spec.channels {
        0 => return Err(TtsError::Audio("wav has zero channels".to_string())),
        1 => interleaved,
        n => {
            let n = usize::from(n);
            #[allow(clippy::cast_precision_loss)]
            let divisor = n as f32;
            interleaved
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / divisor)
                .collect()
        }
    };

    Ok(Waveform::new(samples, spec.sample_rate))
}

fn int_scale(bits_per_sample: u16) -> f32 {
    let bits = i32::from(bits_per_sample.clamp(1, 32)) - 1;
    2f32.powi(bits)
}

#[allow(clippy::cast_precision_loss)]
fn int_to_float(value: i32, scale: f32) -> f32 {
    (value as f32 / scale).clamp(-1.0, 1.0)
}
