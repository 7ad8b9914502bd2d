//! WAV packaging for the submission payload.
//!
//! The backend's `/submit_response` endpoint expects a single file part
//! named `audio.wav` with MIME type `audio/wav`.  [`encode_wav`] turns the
//! drained capture buffer (`f32` PCM) into 16-bit PCM WAV bytes via `hound`.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Encode mono `f32` PCM samples as an in-memory 16-bit WAV file.
///
/// Samples are clamped to `[-1.0, 1.0]` before scaling, so an occasional
/// overdriven capture chunk cannot wrap around.
///
/// # Example
///
/// ```rust
/// use voice_interview::audio::encode_wav;
///
/// let silence = vec![0.0_f32; 16_000]; // 1 s @ 16 kHz
/// let bytes = encode_wav(&silence, 16_000).unwrap();
/// assert_eq!(&bytes[..4], b"RIFF");
/// ```
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
