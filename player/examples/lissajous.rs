use std::{sync::Arc, thread, time::Duration};
use xyscope_core::{Controls, Params, SourceMode, XyBuffers};
use xyscope_player::{Config, Player};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let buffers = Arc::new(XyBuffers::default());
    let controls = Arc::new(Controls::new(
        Params {
            source: SourceMode::Internal,
            base_freq_hz: 220.0,
            ratio: 1.5,
            output_volume: 0.2,
            ..Params::default()
        },
        buffers.capacity(),
    ));
    let config = Config {
        capture: false,
        ..Default::default()
    };
    let player = Player::new(config)?;
    let _playback =
        player.play(Arc::clone(&buffers), Arc::clone(&controls), config)?;
    for _ in 0..20 {
        thread::sleep(Duration::from_millis(250));
        let (x, y) = buffers.read(0);
        println!("{} pairs written, latest ({:.3}, {:.3})", buffers.written(), x, y);
    }
    Ok(())
}
