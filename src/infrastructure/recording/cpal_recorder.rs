//! Cross-platform microphone recorder using cpal
//!
//! Captures speech-optimized audio for upload:
//! - 16kHz sample rate (resampled from the device rate when needed)
//! - Mono channel
//! - WAV container via hound

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use tokio::time::Duration as TokioDuration;

use super::wav_encoder::{encode_wav, TARGET_SAMPLE_RATE};
use crate::application::ports::{CaptureError, Permission, VoiceRecorder};
use crate::domain::transcription::{AudioData, AudioMimeType};

/// Microphone recorder using cpal.
///
/// The stream is managed on its own thread because cpal::Stream is not
/// thread-safe; the struct only shares atomics and the sample buffer
/// with it.
pub struct CpalRecorder {
    /// Recorded audio samples (mono, i16, at device sample rate)
    audio_buffer: Arc<StdMutex<Vec<i16>>>,
    /// Device sample rate (may differ from target 16kHz)
    device_sample_rate: Arc<AtomicU32>,
    /// Recording state
    is_recording: Arc<AtomicBool>,
    /// Recording start time (millis since epoch for atomic access)
    start_time_ms: Arc<AtomicU64>,
    /// Elapsed time in milliseconds
    elapsed_ms: Arc<AtomicU64>,
}

impl CpalRecorder {
    /// Create a new cpal-based recorder
    pub fn new() -> Self {
        Self {
            audio_buffer: Arc::new(StdMutex::new(Vec::new())),
            device_sample_rate: Arc::new(AtomicU32::new(0)),
            is_recording: Arc::new(AtomicBool::new(false)),
            start_time_ms: Arc::new(AtomicU64::new(0)),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or_else(|| CaptureError::DeviceError("No audio input device available".into()))
    }

    /// Get a suitable input configuration
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| CaptureError::DeviceError(format!("Failed to get configs: {}", e)))?;

        // Prefer mono and configs that include the 16kHz target
        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > TARGET_SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config
            .ok_or_else(|| CaptureError::DeviceError("No suitable input config found".into()))?;

        let sample_rate = if config_range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && config_range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            config_range.min_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Resample audio from device rate to 16kHz if needed
    fn resample_to_16k(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, CaptureError> {
        if source_rate == TARGET_SAMPLE_RATE {
            return Ok(samples.to_vec());
        }

        let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

        let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
        let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

        let mut resampler = FftFixedIn::<f32>::new(
            source_rate as usize,
            TARGET_SAMPLE_RATE as usize,
            1024, // Chunk size
            2,    // Sub-chunks
            1,    // Mono
        )
        .map_err(|e| CaptureError::DeviceError(format!("Resampler init failed: {}", e)))?;

        let mut output = Vec::with_capacity(output_len);
        let mut input_pos = 0;

        while input_pos < samples_f32.len() {
            let frames_needed = resampler.input_frames_next();
            let end_pos = (input_pos + frames_needed).min(samples_f32.len());
            let chunk: Vec<Vec<f32>> = vec![samples_f32[input_pos..end_pos].to_vec()];

            // Pad the tail chunk to the resampler's frame size
            let chunk = if chunk[0].len() < frames_needed {
                let mut padded = chunk[0].clone();
                padded.resize(frames_needed, 0.0);
                vec![padded]
            } else {
                chunk
            };

            let resampled = resampler
                .process(&chunk, None)
                .map_err(|e| CaptureError::DeviceError(format!("Resampling failed: {}", e)))?;

            output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
            input_pos = end_pos;
        }

        output.truncate(output_len);

        Ok(output)
    }

    /// Mix stereo to mono
    fn stereo_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels == 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    /// Resample and encode PCM samples into the upload artifact
    fn encode_audio(samples: &[i16], sample_rate: u32) -> Result<AudioData, CaptureError> {
        let resampled = Self::resample_to_16k(samples, sample_rate)?;

        let wav_data = encode_wav(&resampled, TARGET_SAMPLE_RATE)
            .map_err(|e| CaptureError::DeviceError(format!("Encoding failed: {}", e)))?;

        Ok(AudioData::new(wav_data, AudioMimeType::Wav))
    }

    fn now_ms() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

impl Default for CpalRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceRecorder for CpalRecorder {
    async fn request_permission(&self) -> Permission {
        // Desktop analog of the mobile permission prompt: an input
        // device the host exposes to us
        match cpal::default_host().default_input_device() {
            Some(_) => Permission::Granted,
            None => Permission::Denied,
        }
    }

    async fn start(&self) -> Result<(), CaptureError> {
        if self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::DeviceError(
                "Recording already in progress".to_string(),
            ));
        }

        {
            let mut buffer = self.audio_buffer.lock().unwrap();
            buffer.clear();
        }

        self.is_recording.store(true, Ordering::SeqCst);
        self.start_time_ms.store(Self::now_ms(), Ordering::SeqCst);
        self.elapsed_ms.store(0, Ordering::SeqCst);

        let audio_buffer = Arc::clone(&self.audio_buffer);
        let device_sample_rate = Arc::clone(&self.device_sample_rate);
        let is_recording = Arc::clone(&self.is_recording);
        let elapsed_ms = Arc::clone(&self.elapsed_ms);
        let start_time_ms = Arc::clone(&self.start_time_ms);

        // The stream lives on its own thread until stop clears the flag
        std::thread::spawn(move || {
            let device = match CpalRecorder::get_input_device() {
                Ok(d) => d,
                Err(_) => {
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let (config, sample_format) = match CpalRecorder::get_input_config(&device) {
                Ok(c) => c,
                Err(_) => {
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let sample_rate = config.sample_rate.0;
            let channels = config.channels;
            device_sample_rate.store(sample_rate, Ordering::SeqCst);

            let audio_buffer_clone = Arc::clone(&audio_buffer);
            let is_recording_clone = Arc::clone(&is_recording);

            let stream_result = match sample_format {
                SampleFormat::I16 => device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if is_recording_clone.load(Ordering::SeqCst) {
                            let mono = CpalRecorder::stereo_to_mono(data, channels);
                            if let Ok(mut buffer) = audio_buffer_clone.lock() {
                                buffer.extend_from_slice(&mono);
                            }
                        }
                    },
                    |err| log::error!("Audio stream error: {}", err),
                    None,
                ),

                SampleFormat::F32 => {
                    let audio_buffer_clone = Arc::clone(&audio_buffer);
                    let is_recording_clone = Arc::clone(&is_recording);

                    device.build_input_stream(
                        &config,
                        move |data: &[f32], _: &cpal::InputCallbackInfo| {
                            if is_recording_clone.load(Ordering::SeqCst) {
                                let i16_data: Vec<i16> =
                                    data.iter().map(|&s| (s * 32767.0) as i16).collect();
                                let mono = CpalRecorder::stereo_to_mono(&i16_data, channels);
                                if let Ok(mut buffer) = audio_buffer_clone.lock() {
                                    buffer.extend_from_slice(&mono);
                                }
                            }
                        },
                        |err| log::error!("Audio stream error: {}", err),
                        None,
                    )
                }

                _ => {
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let stream = match stream_result {
                Ok(s) => s,
                Err(_) => {
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            if stream.play().is_err() {
                is_recording.store(false, Ordering::SeqCst);
                return;
            }

            while is_recording.load(Ordering::SeqCst) {
                let start = start_time_ms.load(Ordering::SeqCst);
                elapsed_ms.store(CpalRecorder::now_ms().saturating_sub(start), Ordering::SeqCst);

                std::thread::sleep(std::time::Duration::from_millis(100));
            }

            drop(stream);
        });

        // Give the thread a moment to start
        tokio::time::sleep(TokioDuration::from_millis(50)).await;

        if !self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::DeviceError(
                "Failed to open audio input".into(),
            ));
        }

        Ok(())
    }

    async fn stop(&self) -> Result<AudioData, CaptureError> {
        if !self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::DeviceError(
                "No recording in progress".to_string(),
            ));
        }

        self.is_recording.store(false, Ordering::SeqCst);

        // Give the thread a moment to clean up
        tokio::time::sleep(TokioDuration::from_millis(100)).await;

        let sample_rate = self.device_sample_rate.load(Ordering::SeqCst);
        if sample_rate == 0 {
            return Err(CaptureError::DeviceError("Sample rate not set".into()));
        }

        let samples = {
            let mut buffer = self.audio_buffer.lock().unwrap();
            std::mem::take(&mut *buffer)
        };

        if samples.is_empty() {
            return Err(CaptureError::DeviceError(
                "No audio data captured".to_string(),
            ));
        }

        // Resample and encode off the async runtime
        let encoded =
            tokio::task::spawn_blocking(move || Self::encode_audio(&samples, sample_rate))
                .await
                .map_err(|e| CaptureError::DeviceError(format!("Encode task error: {}", e)))??;

        Ok(encoded)
    }

    fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms.load(Ordering::SeqCst)
    }
}
