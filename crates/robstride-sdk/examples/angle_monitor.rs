//! 无限角度监视 - 周期读取机械角度并解缠绕
//!
//! 以 200 ms 周期读取 0x7019（机械角度，2π 回绕）与 0x701B（机械
//! 角速度），用 `AngleTracker` 累积为连续角并打印圈数。
//!
//! # 运行
//!
//! ```bash
//! RUST_LOG=info cargo run --example angle_monitor -- can0
//! ```

use robstride_sdk::prelude::*;
use robstride_sdk::protocol::{IDX_MECH_POS, IDX_MECH_VEL};
use std::time::Duration;

const NODE: u8 = 0x7F;
const HOST: u8 = 0x00;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    robstride_sdk::init_logging();

    let interface = std::env::args().nth(1).unwrap_or_else(|| "can0".to_string());
    let adapter = SocketCanAdapter::new(interface)?;
    let mut bus = RsBus::new(adapter, HOST);

    println!("RobStride SDK - Angle Monitor (node 0x{NODE:02X})");

    // 每个节点一个 tracker；只有显式 reset 会清零累积角
    let mut tracker = AngleTracker::new();

    loop {
        match bus.read_f32(NODE, IDX_MECH_POS) {
            Ok(wrapped) => {
                let accumulated = tracker.update(wrapped);
                let vel = bus.read_f32(NODE, IDX_MECH_VEL).unwrap_or(f32::NAN);
                println!(
                    "pos={:+.3} rad  acc={:+.3} rad  turns={:+.2}  vel={:+.3} rad/s",
                    wrapped,
                    accumulated,
                    tracker.turns(),
                    vel,
                );
            },
            Err(e) => eprintln!("read mech_pos failed: {e}"),
        }

        std::thread::sleep(Duration::from_millis(200));
    }
}
