//! Velocity 模式演示 - Robust bring-up 后周期下发速度指令
//!
//! 流程：
//! - Robust 时序进入 Velocity 模式（含读回校验）
//! - 以 50 ms 周期重发速度指令
//! - 同时轮询遥测并打印
//!
//! # 运行
//!
//! ```bash
//! RUST_LOG=info cargo run --example velocity_demo -- can0
//! ```

use robstride_sdk::prelude::*;
use std::time::{Duration, Instant};

const NODE: u8 = 0x7F;
const HOST: u8 = 0x00;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    robstride_sdk::init_logging();

    let interface = std::env::args().nth(1).unwrap_or_else(|| "can0".to_string());
    let adapter = SocketCanAdapter::new(interface)?;
    let mut bus = RsBus::new(adapter, HOST);

    println!("RobStride SDK - Velocity Demo (node 0x{NODE:02X})");

    // 1. Robust bring-up：限流 5 A、加速度 20 rad/s²，增益用设备默认
    bus.enter_velocity_robust(NODE, 8.0, 5.0, 20.0, None, None)?;
    println!("bring-up OK, run-mode verified");

    // 2. 开启主动上报，便于下面轮询遥测
    bus.set_active_report(NODE, true)?;
    bus.set_report_interval(NODE, 1)?;

    // 3. 周期下发速度指令 + 轮询遥测，持续 5 秒
    let start = Instant::now();
    let mut last_command = Instant::now() - Duration::from_secs(1);
    while start.elapsed() < Duration::from_secs(5) {
        if last_command.elapsed() >= Duration::from_millis(50) {
            last_command = Instant::now();
            bus.velocity_ref(NODE, 2.0)?;
        }

        if let Some(telemetry) = bus.poll_telemetry()? {
            println!(
                "node 0x{:02X}  vel={:+.3} rad/s  torque={:+.3} Nm  temp={:.1} C  faults={}",
                telemetry.node_id,
                telemetry.vel_rad_s,
                telemetry.torque_nm,
                telemetry.temp_c,
                telemetry.faults.raw(),
            );
        }

        std::thread::sleep(Duration::from_millis(5));
    }

    // 4. 停止并退出
    bus.velocity_ref(NODE, 0.0)?;
    bus.stop(NODE, false)?;
    println!("done");

    Ok(())
}
