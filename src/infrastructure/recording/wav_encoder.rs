//! WAV encoding for captured PCM samples

use std::io::Cursor;

/// Sample rate uploaded to the transcription API
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Encode mono i16 PCM samples into an in-memory WAV container
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, String> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| e.to_string())?;
        for &sample in samples {
            writer.write_sample(sample).map_err(|e| e.to_string())?;
        }
        writer.finalize().map_err(|e| e.to_string())?;
    }

    Ok(cursor.into_inner())
}
