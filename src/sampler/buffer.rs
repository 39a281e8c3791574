use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::loader::LoadError;

/// A single recorded note loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Mono samples in -1.0..=1.0
    pub data: Vec<f32>,
    /// Native sample rate of the recording
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(data: Vec<f32>, sample_rate: u32) -> Self {
        Self { data, sample_rate }
    }

    /// Create from interleaved 16-bit PCM, folding channels to mono.
    pub fn from_i16_interleaved(pcm: &[i16], channels: usize, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let data = pcm
            .chunks(channels)
            .map(|frame| frame.iter().map(|&s| s as f32 / 32768.0).sum::<f32>() / frame.len() as f32)
            .collect();
        Self { data, sample_rate }
    }

    /// Fold interleaved float frames to mono.
    pub fn from_f32_interleaved(samples: &[f32], channels: usize, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let data = samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();
        Self { data, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn duration_secs(&self) -> f32 {
        self.data.len() as f32 / self.sample_rate.max(1) as f32
    }

    /// Read a sample with linear interpolation at a fractional position.
    pub fn read_interpolated(&self, position: f64) -> f32 {
        if self.data.is_empty() || position < 0.0 {
            return 0.0;
        }

        let idx = position as usize;
        if idx + 1 >= self.data.len() {
            return self.data.get(idx).copied().unwrap_or(0.0);
        }

        let frac = (position - idx as f64) as f32;
        self.data[idx] * (1.0 - frac) + self.data[idx + 1] * frac
    }

    /// Decode a file by extension: `.wav` through hound, `.mp3` through minimp3.
    pub fn decode_file(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("wav") => Self::decode_wav(BufReader::new(File::open(path)?)),
            Some("mp3") => Self::decode_mp3(BufReader::new(File::open(path)?)),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn decode_wav<R: Read>(reader: R) -> Result<Self, LoadError> {
        let reader = hound::WavReader::new(reader).map_err(|e| LoadError::Decode(e.to_string()))?;
        let spec = reader.spec();
        let channels = spec.channels as usize;

        match spec.sample_format {
            hound::SampleFormat::Int => {
                let max_val = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                let samples = reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / max_val))
                    .collect::<Result<Vec<f32>, _>>()
                    .map_err(|e| LoadError::Decode(e.to_string()))?;
                Ok(Self::from_f32_interleaved(&samples, channels, spec.sample_rate))
            }
            hound::SampleFormat::Float => {
                let samples = reader
                    .into_samples::<f32>()
                    .collect::<Result<Vec<f32>, _>>()
                    .map_err(|e| LoadError::Decode(e.to_string()))?;
                Ok(Self::from_f32_interleaved(&samples, channels, spec.sample_rate))
            }
        }
    }

    pub fn decode_mp3<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut decoder = minimp3::Decoder::new(reader);
        let mut data = Vec::new();
        let mut sample_rate = 0u32;

        loop {
            match decoder.next_frame() {
                Ok(frame) => {
                    sample_rate = frame.sample_rate.max(0) as u32;
                    let mono = Self::from_i16_interleaved(&frame.data, frame.channels, sample_rate);
                    data.extend(mono.data);
                }
                Err(minimp3::Error::Eof) => break,
                Err(minimp3::Error::SkippedData) => continue,
                Err(e) => return Err(LoadError::Decode(format!("{e:?}"))),
            }
        }

        if data.is_empty() {
            return Err(LoadError::Decode("mp3 stream contained no audio frames".into()));
        }
        Ok(Self { data, sample_rate })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn interpolates_between_samples() {
        let buffer = SampleBuffer::new(vec![0.0, 1.0, 0.0], 48_000);
        assert_eq!(buffer.read_interpolated(0.5), 0.5);
        assert_eq!(buffer.read_interpolated(1.0), 1.0);
        assert_eq!(buffer.read_interpolated(2.0), 0.0);
        assert_eq!(buffer.read_interpolated(10.0), 0.0);
        assert_eq!(buffer.read_interpolated(-1.0), 0.0);
    }

    #[test]
    fn stereo_folds_to_mono() {
        let buffer = SampleBuffer::from_i16_interleaved(&[16384, -16384, 16384, 16384], 2, 44_100);
        assert_eq!(buffer.data, vec![0.0, 0.5]);
    }

    #[test]
    fn decodes_wav_from_memory() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut bytes = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut bytes, spec).unwrap();
            for s in [0i16, 16384, -16384, 0] {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        bytes.set_position(0);

        let buffer = SampleBuffer::decode_wav(bytes).unwrap();
        assert_eq!(buffer.sample_rate, 8_000);
        assert_eq!(buffer.data, vec![0.0, 0.5, -0.5, 0.0]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let result = SampleBuffer::decode_wav(Cursor::new(b"not a wav".to_vec()));
        assert!(matches!(result, Err(LoadError::Decode(_))));
    }
}
