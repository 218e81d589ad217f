//! 遥测帧（通信类型 2）解析
//!
//! 遥测帧的特殊之处在于故障位与模式状态不在负载里，而在扩展 ID 中：
//!
//! ```text
//! Bit[28:24] = 0x02（通信类型）
//! Bit[23:22] = 模式状态（2 位）
//! Bit[21:16] = 故障位（6 位）
//! Bit[15:8]  = 上位机地址
//! Bit[7:0]   = 电机节点地址
//! ```
//!
//! 负载为四个大端 16 位字段：角度/角速度/力矩（定点编码）与原始
//! 温度计数（×0.1 °C，不走定点解码）。

use crate::fixed::{POSITION, TORQUE, VELOCITY};
use crate::ids::CommandType;
use crate::{ProtocolError, RsFrame, bytes_to_u16_be};
use bilge::prelude::*;
use num_enum::TryFromPrimitive;

// ============================================================================
// 运行模式（参数 0x7005 的取值）
// ============================================================================

/// 运行模式
///
/// 注意：与遥测 ID 中的 2 位模式状态（[`MotorState`]）不同，
/// 运行模式是通过参数 0x7005 设置/读取的持久配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RunMode {
    /// 运控模式（力矩/MIT）
    Operation = 0,
    /// 位置轮廓模式（PP）
    PositionProfile = 1,
    /// 速度模式
    Velocity = 2,
    /// 电流模式
    Current = 3,
    /// 周期同步位置模式（CSP）
    Csp = 5,
}

// ============================================================================
// 遥测 ID 中的模式状态（2 位）
// ============================================================================

/// 电机当前状态（遥测 ID Bit[23:22]）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotorState {
    /// 复位状态
    Reset = 0,
    /// 标定状态
    Calibration = 1,
    /// 运行状态
    Running = 2,
    /// 未定义取值
    Unknown = 3,
}

impl From<u8> for MotorState {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => MotorState::Reset,
            1 => MotorState::Calibration,
            2 => MotorState::Running,
            _ => MotorState::Unknown,
        }
    }
}

// ============================================================================
// 故障位（6 位位域）
// ============================================================================

/// 故障位（遥测 ID Bit[21:16]）
///
/// bilge 默认 LSB first 位序：第一个字段对应 Bit 16。
#[bitsize(6)]
#[derive(FromBits, DebugBits, Clone, Copy, PartialEq, Eq)]
pub struct FaultBits {
    pub undervoltage: bool,     // Bit 16: 欠压
    pub overcurrent: bool,      // Bit 17: 过流
    pub over_temperature: bool, // Bit 18: 过温
    pub encoder_fault: bool,    // Bit 19: 磁编码器故障
    pub hall_fault: bool,       // Bit 20: HALL 故障
    pub uncalibrated: bool,     // Bit 21: 未标定
}

impl FaultBits {
    /// 是否有任一故障位置位
    pub fn any(&self) -> bool {
        u8::from(u6::from(*self)) != 0
    }

    /// 原始 6 位值
    pub fn raw(&self) -> u8 {
        u8::from(u6::from(*self))
    }
}

// ============================================================================
// 遥测记录
// ============================================================================

/// 单帧遥测的解码结果（瞬态，不在协议层保存）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    /// 电机节点地址
    pub node_id: u8,
    /// 故障位
    pub faults: FaultBits,
    /// 模式状态
    pub state: MotorState,
    /// 角度 [rad]（2π 周期回绕，连续角见 `angle` 模块）
    pub angle_rad: f32,
    /// 角速度 [rad/s]
    pub vel_rad_s: f32,
    /// 力矩 [Nm]
    pub torque_nm: f32,
    /// 温度 [°C]
    pub temp_c: f32,
}

impl TryFrom<&RsFrame> for Telemetry {
    type Error = ProtocolError;

    fn try_from(frame: &RsFrame) -> Result<Self, Self::Error> {
        if ((frame.id >> 24) & 0x1F) as u8 != CommandType::Telemetry as u8 {
            return Err(ProtocolError::InvalidCanId { id: frame.id });
        }
        if frame.len < 8 {
            return Err(ProtocolError::InvalidLength {
                expected: 8,
                actual: frame.len as usize,
            });
        }

        let u_pos = bytes_to_u16_be([frame.data[0], frame.data[1]]);
        let u_vel = bytes_to_u16_be([frame.data[2], frame.data[3]]);
        let u_torque = bytes_to_u16_be([frame.data[4], frame.data[5]]);
        let u_temp = bytes_to_u16_be([frame.data[6], frame.data[7]]);

        Ok(Telemetry {
            node_id: frame.id as u8,
            faults: FaultBits::from(u6::new(((frame.id >> 16) & 0x3F) as u8)),
            state: MotorState::from(((frame.id >> 22) & 0x03) as u8),
            angle_rad: POSITION.decode_u16(u_pos),
            vel_rad_s: VELOCITY.decode_u16(u_vel),
            torque_nm: TORQUE.decode_u16(u_torque),
            temp_c: u_temp as f32 * 0.1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ExtendedId;

    fn telemetry_frame(node: u8, state: u8, faults: u8, payload: [u8; 8]) -> RsFrame {
        let data_area =
            ((state as u16 & 0x03) << 14) | ((faults as u16 & 0x3F) << 8) | ADDR_HOST as u16;
        let id = ExtendedId::compose(CommandType::Telemetry as u8, data_area, node);
        RsFrame::new_extended(id, &payload)
    }

    const ADDR_HOST: u8 = 0x00;

    #[test]
    fn test_telemetry_decode_midpoints() {
        // 中点编码：角度/速度/力矩均为 0，温度 26.5 °C
        let frame = telemetry_frame(
            0x7F,
            2,
            0,
            [0x80, 0x00, 0x80, 0x00, 0x80, 0x00, 0x01, 0x09],
        );
        let fb = Telemetry::try_from(&frame).unwrap();

        assert_eq!(fb.node_id, 0x7F);
        assert_eq!(fb.state, MotorState::Running);
        assert!(!fb.faults.any());
        assert!(fb.angle_rad.abs() < 1e-3);
        assert!(fb.vel_rad_s.abs() < 2e-3);
        assert!(fb.torque_nm.abs() < 1e-3);
        assert!((fb.temp_c - 26.5).abs() < 1e-6);
    }

    #[test]
    fn test_telemetry_fault_bits() {
        // Bit16 欠压 + Bit21 未标定
        let frame = telemetry_frame(0x01, 0, 0b10_0001, [0x80, 0x00, 0x80, 0x00, 0x80, 0x00, 0, 0]);
        let fb = Telemetry::try_from(&frame).unwrap();

        assert!(fb.faults.any());
        assert!(fb.faults.undervoltage());
        assert!(fb.faults.uncalibrated());
        assert!(!fb.faults.overcurrent());
        assert_eq!(fb.faults.raw(), 0b10_0001);
        assert_eq!(fb.state, MotorState::Reset);
    }

    #[test]
    fn test_telemetry_rejects_wrong_command_type() {
        let id = ExtendedId::compose(CommandType::Enable as u8, 0x0000, 0x01);
        let frame = RsFrame::new_extended(id, &[0; 8]);
        assert!(Telemetry::try_from(&frame).is_err());
    }

    #[test]
    fn test_telemetry_rejects_short_payload() {
        let frame = telemetry_frame(0x01, 2, 0, [0; 8]);
        let short = RsFrame {
            len: 6,
            ..frame
        };
        assert!(Telemetry::try_from(&short).is_err());
    }

    #[test]
    fn test_telemetry_range_endpoints() {
        // 全 0 负载 → 各量程下限
        let frame = telemetry_frame(0x02, 2, 0, [0, 0, 0, 0, 0, 0, 0, 0]);
        let fb = Telemetry::try_from(&frame).unwrap();
        assert_eq!(fb.angle_rad, POSITION.min);
        assert_eq!(fb.vel_rad_s, VELOCITY.min);
        assert_eq!(fb.torque_nm, TORQUE.min);
        assert_eq!(fb.temp_c, 0.0);
    }

    #[test]
    fn test_run_mode_values() {
        assert_eq!(RunMode::try_from(0u8).unwrap(), RunMode::Operation);
        assert_eq!(RunMode::try_from(2u8).unwrap(), RunMode::Velocity);
        assert_eq!(RunMode::try_from(5u8).unwrap(), RunMode::Csp);
        assert!(RunMode::try_from(4u8).is_err());
    }
}
