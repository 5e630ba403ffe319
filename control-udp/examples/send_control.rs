//! Sweep the scope color by sending OSC control messages.
use clap::Parser;
use std::{net::UdpSocket, thread, time::Duration};
use xyscope_control_udp::{CONTROL_ADDRESS, DEFAULT_ADDR, osc};

#[derive(Parser)]
struct Args {
    #[arg(long, default_value_t = DEFAULT_ADDR.to_string())]
    addr: String,
    #[arg(long, default_value_t = 200.0)]
    from: f32,
    #[arg(long, default_value_t = 800.0)]
    to: f32,
    #[arg(long, default_value_t = 100)]
    steps: u32,
    #[arg(long, default_value_t = 50)]
    interval_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    let mut buf = Vec::new();
    for i in 0..=args.steps {
        let value =
            args.from + (args.to - args.from) * (i as f32 / args.steps.max(1) as f32);
        osc::encode_f32(CONTROL_ADDRESS, value, &mut buf);
        socket.send_to(&buf, &args.addr)?;
        log::info!("sent {} {}", CONTROL_ADDRESS, value);
        thread::sleep(Duration::from_millis(args.interval_ms));
    }
    Ok(())
}
