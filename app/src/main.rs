mod args;
mod input;
mod render;

use anyhow::anyhow;
use args::Args;
use clap::Parser;
use std::sync::Arc;
use xyscope_control_udp::ControlListener;
use xyscope_core::{
    Appearance, Controls, DEFAULT_CAPACITY, Params, TrailWindow, XyBuffers,
    aspect_compensation, control::DEFAULT_QUEUE_BOUND, control_channel,
};
use xyscope_player::{Config, Playback, Player};

const HEADLESS_SAMPLE_RATE_HZ: u32 = 48_000;
const HEADLESS_BLOCK_SIZE: usize = 1024;

fn title(params: &Params) -> String {
    format!(
        "xyscope | {:?} | {:.2}Hz x{:.2} | vol {:.2} | tail {} | scale {:.2}",
        params.source,
        params.base_freq_hz,
        params.ratio,
        params.output_volume,
        params.tail_length,
        params.display_scale,
    )
}

fn start_audio(
    args: &Args,
    buffers: &Arc<XyBuffers>,
    controls: &Arc<Controls>,
) -> anyhow::Result<Playback> {
    if args.no_audio {
        return Playback::headless(
            Arc::clone(buffers),
            Arc::clone(controls),
            HEADLESS_SAMPLE_RATE_HZ,
            HEADLESS_BLOCK_SIZE,
        );
    }
    let mut config = Config {
        capture: !args.no_capture,
        ..Config::default()
    };
    if let Some(latency_s) = args.latency_s {
        config.target_latency_s = latency_s;
    }
    let player = Player::new(config)?;
    player.play(Arc::clone(buffers), Arc::clone(controls), config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let params = args.initial_params()?;
    if args.capacity != DEFAULT_CAPACITY {
        log::info!("scope buffer capacity: {}", args.capacity);
    }
    // The buffers are sized here, before either context starts, and never resized.
    let buffers = Arc::new(XyBuffers::new(args.capacity));
    let controls = Arc::new(Controls::new(params, buffers.capacity()));
    let (control_sender, control_receiver) =
        control_channel(DEFAULT_QUEUE_BOUND);
    let _control_listener = if args.no_control {
        None
    } else {
        Some(ControlListener::spawn(
            args.control_addr.as_str(),
            control_sender,
        )?)
    };
    let playback = start_audio(&args, &buffers, &controls)?;
    if playback.is_headless() {
        log::info!(
            "no audio device, generating at {} Hz",
            playback.sample_rate_hz()
        );
    }

    let sdl_context = sdl2::init().map_err(|e| anyhow!(e))?;
    let video_subsystem = sdl_context.video().map_err(|e| anyhow!(e))?;
    let window = video_subsystem
        .window(title(&params).as_str(), args.width, args.height)
        .resizable()
        .build()?;
    let mut canvas = window
        .into_canvas()
        .target_texture()
        .present_vsync()
        .build()?;
    canvas.set_blend_mode(sdl2::render::BlendMode::Blend);
    let mut event_pump = sdl_context.event_pump().map_err(|e| anyhow!(e))?;
    let mut trail = TrailWindow::new();
    let mut current_title = title(&params);
    loop {
        for event in event_pump.poll_iter() {
            if let Some(action) = input::action_for_event(&event) {
                if !input::apply(action, &controls) {
                    return Ok(());
                }
            }
        }
        control_receiver.drain_into(&controls);
        let params = controls.snapshot();
        let (width_px, height_px) =
            canvas.output_size().map_err(|e| anyhow!("{e}"))?;
        let appearance = Appearance {
            color: params.color,
            thickness: params.thickness,
            aspect: aspect_compensation(width_px, height_px),
        };
        let points = trail.update(&buffers, params.tail_length, &appearance);
        render::draw_trail(&mut canvas, points, width_px, height_px);
        canvas.present();
        let new_title = title(&params);
        if new_title != current_title {
            canvas.window_mut().set_title(new_title.as_str())?;
            current_title = new_title;
        }
    }
}
