//! 运控指令帧（Operation Control，通信类型 0x01）构建
//!
//! 运控指令是唯一把物理量放进扩展 ID 的指令：力矩以 16 位定点编码
//! 进入数据区 2，其余四个字段（位置/速度/Kp/Kd）以大端 16 位定点
//! 编码进入负载的固定偏移。

use crate::fixed::{GAIN_KD, GAIN_KP, POSITION, TORQUE, VELOCITY};
use crate::ids::{CommandType, ExtendedId};
use crate::{RsFrame, u16_to_bytes_be};

/// 运控指令（位置/速度/力矩前馈 + 双增益）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionCommand {
    /// 目标位置 [rad]
    pub position_rad: f32,
    /// 速度前馈 [rad/s]
    pub velocity_rad_s: f32,
    /// 力矩前馈 [Nm]（编码进扩展 ID 的数据区 2）
    pub torque_nm: f32,
    /// 位置增益 Kp
    pub kp: f32,
    /// 速度增益 Kd
    pub kd: f32,
}

impl MotionCommand {
    /// 纯位置指令（其余字段为 0）
    pub fn position(position_rad: f32, kp: f32, kd: f32) -> Self {
        Self {
            position_rad,
            velocity_rad_s: 0.0,
            torque_nm: 0.0,
            kp,
            kd,
        }
    }

    /// 转换为发往 `node` 的 CAN 帧
    pub fn to_frame(self, node: u8) -> RsFrame {
        self.to_frame_clamped(node).0
    }

    /// 转换为 CAN 帧，并返回是否有字段被量程夹取
    ///
    /// 夹取满足"永不产生非法线上值"的要求；驱动层根据返回值输出
    /// 诊断日志，使饱和对调用方可见。
    pub fn to_frame_clamped(self, node: u8) -> (RsFrame, bool) {
        let (u_pos, c0) = POSITION.encode_clamped_u16(self.position_rad);
        let (u_vel, c1) = VELOCITY.encode_clamped_u16(self.velocity_rad_s);
        let (u_kp, c2) = GAIN_KP.encode_clamped_u16(self.kp);
        let (u_kd, c3) = GAIN_KD.encode_clamped_u16(self.kd);
        let (u_torque, c4) = TORQUE.encode_clamped_u16(self.torque_nm);

        let mut data = [0u8; 8];
        data[0..2].copy_from_slice(&u16_to_bytes_be(u_pos));
        data[2..4].copy_from_slice(&u16_to_bytes_be(u_vel));
        data[4..6].copy_from_slice(&u16_to_bytes_be(u_kp));
        data[6..8].copy_from_slice(&u16_to_bytes_be(u_kd));

        let id = ExtendedId::compose(CommandType::OperationControl as u8, u_torque, node);
        (
            RsFrame::new_extended(id, &data),
            c0 || c1 || c2 || c3 || c4,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes_to_u16_be;

    #[test]
    fn test_motion_command_frame_layout() {
        let cmd = MotionCommand {
            position_rad: 0.0,
            velocity_rad_s: 0.0,
            torque_nm: 0.0,
            kp: 0.0,
            kd: 0.0,
        };
        let frame = cmd.to_frame(0x7F);

        let id = ExtendedId::parse(frame.id);
        assert_eq!(id.command(), Some(CommandType::OperationControl));
        assert_eq!(id.destination, 0x7F);
        // 力矩 0 Nm 编码为量程中点
        assert_eq!(id.data_area, 32768);

        // 位置/速度中点，增益 0
        assert_eq!(bytes_to_u16_be([frame.data[0], frame.data[1]]), 32768);
        assert_eq!(bytes_to_u16_be([frame.data[2], frame.data[3]]), 32768);
        assert_eq!(bytes_to_u16_be([frame.data[4], frame.data[5]]), 0);
        assert_eq!(bytes_to_u16_be([frame.data[6], frame.data[7]]), 0);
        assert_eq!(frame.len, 8);
        assert!(frame.is_extended);
    }

    #[test]
    fn test_motion_command_clamp_flag() {
        let cmd = MotionCommand::position(100.0, 20.0, 0.5); // 位置超程
        let (frame, clamped) = cmd.to_frame_clamped(0x01);
        assert!(clamped);
        // 饱和到量程上限
        assert_eq!(bytes_to_u16_be([frame.data[0], frame.data[1]]), 65535);

        let cmd = MotionCommand::position(1.0, 20.0, 0.5);
        let (_, clamped) = cmd.to_frame_clamped(0x01);
        assert!(!clamped);
    }
}
