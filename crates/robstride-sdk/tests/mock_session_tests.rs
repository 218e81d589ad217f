//! SDK 层端到端测试（Mock 适配器）
//!
//! 通过统一入口走一遍"bring-up → 指令 → 遥测 → 解缠绕"的完整会话。

#![cfg(feature = "mock")]

use robstride_sdk::prelude::*;
use robstride_sdk::protocol::{CommandType, ExtendedId, IDX_RUN_MODE};

const HOST: u8 = 0x00;
const NODE: u8 = 0x01;

fn run_mode_response(value: u8) -> RsFrame {
    let mut payload = [0u8; 8];
    payload[0] = IDX_RUN_MODE as u8;
    payload[1] = (IDX_RUN_MODE >> 8) as u8;
    payload[4] = value;
    let id = ExtendedId::compose(CommandType::ReadParam as u8, 0x0000, HOST);
    RsFrame::new_extended(id, &payload)
}

fn telemetry_frame(angle_u16: u16) -> RsFrame {
    let data_area = (2u16 << 14) | HOST as u16; // Running，无故障
    let id = ExtendedId::compose(CommandType::Telemetry as u8, data_area, NODE);
    let [hi, lo] = angle_u16.to_be_bytes();
    RsFrame::new_extended(id, &[hi, lo, 0x80, 0x00, 0x80, 0x00, 0x01, 0x18])
}

#[test]
fn test_full_session_against_mock() {
    let mut adapter = MockCanAdapter::new();
    adapter.push_rx(run_mode_response(RunMode::Csp as u8));
    let mut bus = RsBus::new(adapter, HOST);

    // Robust bring-up 进入 CSP 并下发位置指令
    bus.enter_csp_robust(NODE, 6.0, 5.0, Some(5.0)).unwrap();
    bus.position_ref(NODE, 1.57).unwrap();

    // 遥测流经解缠绕滤波：跨越 ±π 的采样不会引起跳变
    let mut tracker = AngleTracker::new();
    let samples = [3.0f32, -3.0];
    for sample in samples {
        // 逆向套用定点编码构造角度字段
        let u = ((sample + 12.57) * 65535.0 / 25.14 + 0.5) as u16;
        bus.adapter_mut().push_rx(telemetry_frame(u));
        let telemetry = bus.poll_telemetry().unwrap().unwrap();
        tracker.update(telemetry.angle_rad);
    }

    // 3.0 → -3.0 折返后累积 ≈ 3.283，而不是 -3.0
    assert!((tracker.angle_rad() - 3.283).abs() < 2e-3, "acc = {}", tracker.angle_rad());

    // 会话期间所有出站帧都寻址目标节点
    for frame in bus.adapter_mut().sent() {
        assert_eq!(ExtendedId::parse(frame.id).destination, NODE);
    }
}
