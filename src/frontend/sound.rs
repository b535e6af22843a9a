use std::{
    error::Error,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use log::error;

const TONE_HZ: f32 = 440.0;
const VOLUME: f32 = 0.2;

/// A 440 Hz square wave that plays while the sound timer is running.
pub struct Sound {
    _stream: cpal::Stream,
    active: Arc<AtomicBool>,
}

impl Sound {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or("no output device available")?;
        let supported_config = device.default_output_config()?;
        let format = supported_config.sample_format();
        let config: cpal::StreamConfig = supported_config.into();
        let active = Arc::new(AtomicBool::new(false));

        let stream = match format {
            cpal::SampleFormat::I8 => Self::run::<i8>(&device, &config, &active),
            cpal::SampleFormat::I16 => Self::run::<i16>(&device, &config, &active),
            cpal::SampleFormat::I32 => Self::run::<i32>(&device, &config, &active),
            cpal::SampleFormat::I64 => Self::run::<i64>(&device, &config, &active),
            cpal::SampleFormat::U8 => Self::run::<u8>(&device, &config, &active),
            cpal::SampleFormat::U16 => Self::run::<u16>(&device, &config, &active),
            cpal::SampleFormat::U32 => Self::run::<u32>(&device, &config, &active),
            cpal::SampleFormat::U64 => Self::run::<u64>(&device, &config, &active),
            cpal::SampleFormat::F32 => Self::run::<f32>(&device, &config, &active),
            cpal::SampleFormat::F64 => Self::run::<f64>(&device, &config, &active),
            sample_format => {
                return Err(format!("Unsupported sample format '{sample_format}'").into())
            }
        }?;
        stream.play()?;

        Ok(Self {
            _stream: stream,
            active,
        })
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    fn run<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        active: &Arc<AtomicBool>,
    ) -> Result<cpal::Stream, cpal::BuildStreamError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0 as f32;
        let channels = config.channels as usize;
        let active = Arc::clone(active);

        let mut sample_clock = 0f32;
        let mut next_value = move || {
            if !active.load(Ordering::Relaxed) {
                return 0.0;
            }
            sample_clock = (sample_clock + 1.0) % sample_rate;
            if (sample_clock * TONE_HZ / sample_rate).fract() < 0.5 {
                VOLUME
            } else {
                -VOLUME
            }
        };

        let err_fn = |err| error!("an error occurred on stream: {}", err);

        device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                write_data(data, channels, &mut next_value)
            },
            err_fn,
            None,
        )
    }
}

fn write_data<T>(output: &mut [T], channels: usize, next_sample: &mut dyn FnMut() -> f32)
where
    T: Sample + FromSample<f32>,
{
    for frame in output.chunks_mut(channels) {
        let value: T = T::from_sample(next_sample());
        for sample in frame.iter_mut() {
            *sample = value;
        }
    }
}
