use clap::{Parser, ValueEnum};
use std::{fs, num::NonZeroUsize, path::PathBuf};
use xyscope_control_udp::DEFAULT_ADDR;
use xyscope_core::{DEFAULT_CAPACITY, Params, Rgb, SourceMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Source {
    External,
    Internal,
}

impl From<Source> for SourceMode {
    fn from(source: Source) -> Self {
        match source {
            Source::External => SourceMode::External,
            Source::Internal => SourceMode::Internal,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "xyscope", about = "X/Y oscilloscope")]
pub struct Args {
    #[arg(long, default_value_t = 800)]
    pub width: u32,
    #[arg(long, default_value_t = 800)]
    pub height: u32,
    /// Number of sample pairs held by the scope buffers
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: NonZeroUsize,
    /// JSON file of initial parameters. Options below override its values.
    #[arg(long)]
    pub params: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub source: Option<Source>,
    /// Frequency of the first internal oscillator in Hz
    #[arg(long)]
    pub base_freq: Option<f32>,
    /// Frequency of the second internal oscillator relative to the first
    #[arg(long)]
    pub ratio: Option<f32>,
    #[arg(long)]
    pub volume: Option<f32>,
    /// Number of sample pairs drawn in the trail
    #[arg(long)]
    pub tail_length: Option<usize>,
    #[arg(long)]
    pub thickness: Option<f32>,
    /// Gain applied to samples before they are drawn
    #[arg(long)]
    pub scale: Option<f32>,
    #[arg(long, short)]
    pub red: Option<u8>,
    #[arg(long, short)]
    pub green: Option<u8>,
    #[arg(long, short)]
    pub blue: Option<u8>,
    /// Address to listen on for color control messages
    #[arg(long, default_value_t = DEFAULT_ADDR.to_string())]
    pub control_addr: String,
    #[arg(long)]
    pub no_control: bool,
    /// Don't open the input device
    #[arg(long)]
    pub no_capture: bool,
    /// Drive the scope from a timer instead of an audio device
    #[arg(long)]
    pub no_audio: bool,
    #[arg(long)]
    pub latency_s: Option<f32>,
}

impl Args {
    /// Initial parameters: defaults, then the params file, then command-line options.
    pub fn initial_params(&self) -> anyhow::Result<Params> {
        let base = match self.params.as_ref() {
            Some(path) => {
                let json_string = fs::read_to_string(path)?;
                serde_json::from_str(json_string.as_str())?
            }
            None => Params::default(),
        };
        Ok(self.apply_overrides(base))
    }

    fn apply_overrides(&self, mut params: Params) -> Params {
        if let Some(source) = self.source {
            params.source = source.into();
        }
        if let Some(base_freq) = self.base_freq {
            params.base_freq_hz = base_freq;
        }
        if let Some(ratio) = self.ratio {
            params.ratio = ratio;
        }
        if let Some(volume) = self.volume {
            params.output_volume = volume;
        }
        if let Some(tail_length) = self.tail_length {
            params.tail_length = tail_length;
        }
        if let Some(thickness) = self.thickness {
            params.thickness = thickness;
        }
        if let Some(scale) = self.scale {
            params.display_scale = scale;
        }
        if self.red.is_some() || self.green.is_some() || self.blue.is_some() {
            let (r, g, b) = params.color.to_u8();
            params.color = Rgb::from_u8(
                self.red.unwrap_or(r),
                self.green.unwrap_or(g),
                self.blue.unwrap_or(b),
            );
        }
        params.clamped(self.capacity.get())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["xyscope"]);
        assert_eq!(args.capacity.get(), 32768);
        assert_eq!(args.control_addr, "127.0.0.1:12000");
        assert_eq!(args.initial_params().unwrap(), Params::default());
    }

    #[test]
    fn overrides_are_clamped() {
        let args = Args::parse_from([
            "xyscope",
            "--source",
            "internal",
            "--base-freq",
            "1000",
            "--tail-length",
            "4096",
            "--capacity",
            "2048",
            "-r",
            "255",
        ]);
        let params = args.initial_params().unwrap();
        assert_eq!(params.source, SourceMode::Internal);
        assert_eq!(params.base_freq_hz, 500.0);
        assert_eq!(params.tail_length, 2048);
        assert_eq!(params.color, Rgb::new(1.0, 1.0, 0.0));
    }
}
