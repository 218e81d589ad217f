//! 旧版 MIT 协议打包（标准帧一代）
//!
//! 与私有协议并存的历史线格式：指令/反馈走 11 位标准帧，五个物理量
//! 连续打包进 8 字节负载，其中四个 12 位字段跨字节半字节拼接。
//! 位边界必须逐位复现才能与固件互通：
//!
//! ```text
//! Byte 0-1: 位置 u16（大端）
//! Byte 2:   速度 u12 高 8 位
//! Byte 3:   速度 u12 低 4 位 | Kp u12 高 4 位
//! Byte 4:   Kp u12 低 8 位
//! Byte 5:   Kd u12 高 8 位
//! Byte 6:   Kd u12 低 4 位 | 力矩 u12 高 4 位
//! Byte 7:   力矩 u12 低 8 位
//! ```
//!
//! 本格式按设备/固件代次选用，与 `control` 模块的私有一代互为替代。

use crate::fixed::{GAIN_KD, GAIN_KP, POSITION, TORQUE, VELOCITY};
use crate::{ProtocolError, RsFrame};

/// 使能指令负载
pub const MIT_ENABLE: [u8; 8] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFC];

/// 失能指令负载
pub const MIT_DISABLE: [u8; 8] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFD];

/// 机械零位设置指令负载
pub const MIT_SET_ZERO: [u8; 8] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE];

/// MIT 一代的运控指令
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MitCommand {
    /// 目标位置 [rad]
    pub position_rad: f32,
    /// 速度前馈 [rad/s]
    pub velocity_rad_s: f32,
    /// 位置增益 Kp
    pub kp: f32,
    /// 速度增益 Kd
    pub kd: f32,
    /// 力矩前馈 [Nm]
    pub torque_nm: f32,
}

impl MitCommand {
    /// 打包为 8 字节负载（16+12+12+12+12 位布局）
    pub fn encode(&self) -> [u8; 8] {
        let pos = POSITION.encode_u16(self.position_rad);
        let vel = VELOCITY.encode_bits(self.velocity_rad_s, 12);
        let kp = GAIN_KP.encode_bits(self.kp, 12);
        let kd = GAIN_KD.encode_bits(self.kd, 12);
        let torque = TORQUE.encode_bits(self.torque_nm, 12);

        [
            (pos >> 8) as u8,
            pos as u8,
            (vel >> 4) as u8,
            (((vel & 0x0F) << 4) | (kp >> 8)) as u8,
            kp as u8,
            (kd >> 4) as u8,
            (((kd & 0x0F) << 4) | (torque >> 8)) as u8,
            torque as u8,
        ]
    }

    /// 转换为发往 `node` 的标准帧
    pub fn to_frame(self, node: u8) -> RsFrame {
        RsFrame::new_standard(node as u16, &self.encode())
    }
}

/// MIT 一代的反馈帧解码结果
///
/// 反馈帧的标准 ID 是上位机地址，负载首字节才是电机节点地址。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MitFeedback {
    /// 电机节点地址（负载 Byte 0）
    pub node_id: u8,
    /// 角度 [rad]
    pub angle_rad: f32,
    /// 角速度 [rad/s]
    pub vel_rad_s: f32,
    /// 力矩 [Nm]
    pub torque_nm: f32,
    /// 原始温度计数（×0.1 °C）
    pub temp_raw: u16,
}

impl MitFeedback {
    /// 从发往 `host` 的标准帧解析
    pub fn parse(host: u8, frame: &RsFrame) -> Result<Self, ProtocolError> {
        if frame.is_extended || frame.id != host as u32 {
            return Err(ProtocolError::InvalidCanId { id: frame.id });
        }
        if frame.len < 8 {
            return Err(ProtocolError::InvalidLength {
                expected: 8,
                actual: frame.len as usize,
            });
        }

        let d = &frame.data;
        let pos = ((d[1] as u16) << 8) | d[2] as u16;
        let vel = ((d[3] as u16) << 4) | (d[4] >> 4) as u16;
        let torque = (((d[4] & 0x0F) as u16) << 8) | d[5] as u16;
        let temp = ((d[6] as u16) << 8) | d[7] as u16;

        Ok(MitFeedback {
            node_id: d[0],
            angle_rad: POSITION.decode_u16(pos),
            vel_rad_s: VELOCITY.decode_bits(vel, 12),
            torque_nm: TORQUE.decode_bits(torque, 12),
            temp_raw: temp,
        })
    }

    /// 温度 [°C]
    pub fn temp_c(&self) -> f32 {
        self.temp_raw as f32 * 0.1
    }
}
