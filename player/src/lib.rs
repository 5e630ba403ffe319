use cpal::{
    BufferSize, Device, InputCallbackInfo, OutputCallbackInfo, Stream,
    StreamConfig, SupportedBufferSize,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};
use xyscope_core::{Controls, InputTap, SourceSelector, XyBuffers};

/// Number of captured frames that can be queued between the capture and playback callbacks.
pub const INPUT_RING_CAPACITY: NonZeroUsize = NonZeroUsize::new(16384).unwrap();

#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// default: 1024 frames at 48kHz
    pub target_latency_s: f32,
    /// Open the default input device so the external source has a signal.
    /// default: true
    pub capture: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_latency_s: 1024.0 / 48_000.0,
            capture: true,
        }
    }
}

fn log_device_name(kind: &str, device: &Device) {
    if let Ok(name) = device.name() {
        log::info!("cpal {} device: {}", kind, name);
    } else {
        log::info!("cpal {} device: (no name)", kind);
    }
}

pub struct Player {
    output_device: Device,
    input_device: Option<Device>,
}

impl Player {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        log::info!("cpal host: {}", host.id().name());
        let output_device = host
            .default_output_device()
            .ok_or(anyhow::anyhow!("no output device"))?;
        log_device_name("output", &output_device);
        let input_device = if config.capture {
            let input_device = host.default_input_device();
            match &input_device {
                Some(device) => log_device_name("input", device),
                None => log::warn!(
                    "no input device; the external source will be silent"
                ),
            }
            input_device
        } else {
            None
        };
        Ok(Self {
            output_device,
            input_device,
        })
    }

    fn choose_config(&self, config: Config) -> anyhow::Result<StreamConfig> {
        let default_config = self.output_device.default_output_config()?;
        let sample_rate = default_config.sample_rate();
        let channels = default_config.channels().max(2) as u32;
        let ideal_buffer_size =
            (sample_rate.0 as f32 * config.target_latency_s) as u32 * channels;
        // Round down to a multiple of 4. It's not clear why this is necessary but alsa complains
        // if the buffer size is not evenly divisible by 4.
        let ideal_buffer_size = ideal_buffer_size & (!3);
        let buffer_size = match default_config.buffer_size() {
            SupportedBufferSize::Range { min, max } => {
                BufferSize::Fixed(ideal_buffer_size.clamp(*min, *max))
            }
            SupportedBufferSize::Unknown => BufferSize::Default,
        };
        Ok(StreamConfig {
            channels: channels as u16,
            sample_rate,
            buffer_size,
        })
    }

    /// Start capturing from the input device into a ring which the returned tap reads from.
    fn start_capture(
        &self,
        output_sample_rate_hz: u32,
    ) -> anyhow::Result<Option<(Stream, InputTap)>> {
        let Some(device) = self.input_device.as_ref() else {
            return Ok(None);
        };
        let config = device.default_input_config()?;
        log::info!("input sample format: {}", config.sample_format());
        log::info!("input sample rate: {}", config.sample_rate().0);
        log::info!("input num channels: {}", config.channels());
        if config.sample_rate().0 != output_sample_rate_hz {
            log::warn!(
                "input sample rate of {}Hz does not match output sample rate of {}Hz",
                config.sample_rate().0,
                output_sample_rate_hz
            );
        }
        let config = StreamConfig::from(config);
        let channels = config.channels as usize;
        let ring = Arc::new(XyBuffers::new(INPUT_RING_CAPACITY));
        let tap = InputTap::new(Arc::clone(&ring));
        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &InputCallbackInfo| {
                for frame in data.chunks(channels) {
                    let left = frame[0];
                    let right = frame.get(1).copied().unwrap_or(left);
                    ring.push_pair(left, right);
                }
            },
            |err| log::error!("input stream error: {}", err),
            None,
        )?;
        stream.play()?;
        Ok(Some((stream, tap)))
    }

    /// Start audio. The output callback is the write context of the scope: once per block it
    /// snapshots `controls`, then for every frame selects a sample pair, writes it to the device
    /// and pushes it into `buffers`. Audio stops when the returned `Playback` is dropped.
    pub fn play(
        &self,
        buffers: Arc<XyBuffers>,
        controls: Arc<Controls>,
        config: Config,
    ) -> anyhow::Result<Playback> {
        let stream_config = self.choose_config(config)?;
        log::info!("sample rate: {}", stream_config.sample_rate.0);
        log::info!("num channels: {}", stream_config.channels);
        log::info!("buffer size: {:?}", stream_config.buffer_size);
        let sample_rate_hz = stream_config.sample_rate.0;
        let (input_stream, mut tap) =
            match self.start_capture(sample_rate_hz)? {
                Some((stream, tap)) => (Some(stream), Some(tap)),
                None => (None, None),
            };
        let channels = stream_config.channels as usize;
        let mut selector = SourceSelector::new();
        let mut last_skipped = 0;
        let output_stream = self.output_device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &OutputCallbackInfo| {
                let params = controls.snapshot();
                match tap.as_mut() {
                    Some(tap) => {
                        selector.process_block_with(
                            &params,
                            sample_rate_hz as f32,
                            || tap.next_pair(),
                            data,
                            channels,
                            &buffers,
                        );
                        let skipped = tap.skipped();
                        if skipped != last_skipped {
                            log::debug!(
                                "capture overrun: skipped {} frames ({} total)",
                                skipped - last_skipped,
                                skipped
                            );
                            last_skipped = skipped;
                        }
                    }
                    None => selector.process_block(
                        &params,
                        sample_rate_hz as f32,
                        &[],
                        0,
                        data,
                        channels,
                        &buffers,
                    ),
                }
            },
            |err| log::error!("output stream error: {}", err),
            None,
        )?;
        output_stream.play()?;
        Ok(Playback {
            sample_rate_hz,
            _output: Some(output_stream),
            _input: input_stream,
            clock: None,
        })
    }
}

/// Handle to running audio. Dropping it stops the streams (or the clock thread).
pub struct Playback {
    sample_rate_hz: u32,
    _output: Option<Stream>,
    _input: Option<Stream>,
    clock: Option<Clock>,
}

struct Clock {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("clock thread panicked");
            }
        }
    }
}

impl Playback {
    /// Run the write context from a timer thread instead of an audio device, discarding the
    /// output. Useful when there's no audio hardware. External input is silent in this mode.
    pub fn headless(
        buffers: Arc<XyBuffers>,
        controls: Arc<Controls>,
        sample_rate_hz: u32,
        block_size: usize,
    ) -> anyhow::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let block_period = Duration::from_secs_f64(
            block_size as f64 / sample_rate_hz.max(1) as f64,
        );
        log::info!(
            "headless clock: {}Hz, {} frames per block",
            sample_rate_hz,
            block_size
        );
        let handle = thread::Builder::new()
            .name("xyscope-clock".to_string())
            .spawn({
                let running = Arc::clone(&running);
                move || {
                    let mut selector = SourceSelector::new();
                    let mut output = vec![0.0; block_size * 2];
                    while running.load(Ordering::Relaxed) {
                        let params = controls.snapshot();
                        selector.process_block(
                            &params,
                            sample_rate_hz as f32,
                            &[],
                            0,
                            &mut output,
                            2,
                            &buffers,
                        );
                        thread::sleep(block_period);
                    }
                }
            })?;
        Ok(Self {
            sample_rate_hz,
            _output: None,
            _input: None,
            clock: Some(Clock {
                running,
                handle: Some(handle),
            }),
        })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn is_headless(&self) -> bool {
        self.clock.is_some()
    }
}
