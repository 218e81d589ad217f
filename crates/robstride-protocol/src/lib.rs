//! # RobStride Protocol
//!
//! RS02 电机 CAN 总线私有协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: 通信类型与 29 位扩展 ID 的构建/解析
//! - `fixed`: 定点量化编解码（16 位与 12 位变体）
//! - `params`: 参数索引表与参数帧负载打包
//! - `control`: 运控指令帧（Operation Control）构建
//! - `mit`: 旧版 MIT 协议打包（标准帧一代）
//! - `feedback`: 遥测帧（通信类型 2）解析
//! - `angle`: 无限角度累积（解缠绕滤波）
//!
//! ## 字节序
//!
//! 私有协议的 16 位运控/遥测字段使用高位在前（大端字节序），
//! 参数值则以小端 4 字节写入负载尾部。本模块提供相应的转换工具。

pub mod angle;
pub mod control;
pub mod feedback;
pub mod fixed;
pub mod ids;
pub mod mit;
pub mod params;

// 重新导出常用类型
pub use angle::*;
pub use control::*;
pub use feedback::*;
pub use fixed::*;
pub use ids::*;
pub use mit::*;
pub use params::*;

use thiserror::Error;

/// CAN 2.0 帧的统一抽象
///
/// `RsFrame` 是协议层和硬件层之间的中间抽象：协议层不依赖底层 CAN
/// 实现（SocketCAN/Mock），上层通过 `CanAdapter` trait 使用统一的帧类型。
///
/// 私有协议一代使用 29 位扩展帧；旧版 MIT 一代使用 11 位标准帧，
/// 两代共用本类型，以 `is_extended` 区分。
///
/// # 设计特性
///
/// - **Copy trait**：零成本复制，适合高频 CAN 场景
/// - **固定 8 字节**：避免堆分配
/// - **无生命周期**：自包含数据结构，简化 API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RsFrame {
    /// CAN ID（标准帧或扩展帧）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,

    /// 是否为扩展帧（29-bit ID）
    pub is_extended: bool,
}

impl RsFrame {
    /// 创建标准帧（11-bit ID，旧版 MIT 一代）
    pub fn new_standard(id: u16, data: &[u8]) -> Self {
        Self::new(id as u32, data, false)
    }

    /// 创建扩展帧（29-bit ID，私有协议一代）
    pub fn new_extended(id: u32, data: &[u8]) -> Self {
        Self::new(id & 0x1FFF_FFFF, data, true)
    }

    /// 通用构造器
    fn new(id: u32, data: &[u8], is_extended: bool) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            id,
            data: fixed_data,
            len: len as u8,
            is_extended,
        }
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// 获取 CAN ID
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 获取完整数据（8 字节固定数组）
    pub fn data(&self) -> &[u8; 8] {
        &self.data
    }
}

/// 协议解析错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid CAN ID: 0x{id:X}")]
    InvalidCanId { id: u32 },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: u8 },
}

/// 字节序转换工具函数
///
/// 运控/遥测字段使用 Motorola (MSB) 高位在前（大端字节序）。
///
/// 大端字节序转 u16
pub fn bytes_to_u16_be(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// u16 转大端字节序
pub fn u16_to_bytes_be(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// 小端 4 字节转 f32（参数值域）
pub fn bytes_to_f32_le(bytes: [u8; 4]) -> f32 {
    f32::from_le_bytes(bytes)
}

/// f32 转小端 4 字节（参数值域）
pub fn f32_to_bytes_le(value: f32) -> [u8; 4] {
    value.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_extended_masks_to_29_bits() {
        let frame = RsFrame::new_extended(0xFFFF_FFFF, &[]);
        assert_eq!(frame.id, 0x1FFF_FFFF);
        assert!(frame.is_extended);
    }

    #[test]
    fn test_new_standard() {
        let frame = RsFrame::new_standard(0x7F, &[1, 2, 3]);
        assert_eq!(frame.id, 0x7F);
        assert!(!frame.is_extended);
        assert_eq!(frame.data_slice(), &[1, 2, 3]);
        assert_eq!(frame.len, 3);
    }

    #[test]
    fn test_data_truncated_to_8_bytes() {
        let frame = RsFrame::new_extended(0x123, &[0; 12]);
        assert_eq!(frame.len, 8);
    }

    #[test]
    fn test_bytes_to_u16_be() {
        assert_eq!(bytes_to_u16_be([0x12, 0x34]), 0x1234);
        assert_eq!(bytes_to_u16_be([0xFF, 0xFF]), 0xFFFF);
    }

    #[test]
    fn test_u16_to_bytes_be() {
        assert_eq!(u16_to_bytes_be(0x1234), [0x12, 0x34]);
    }

    #[test]
    fn test_f32_le_roundtrip() {
        let bytes = f32_to_bytes_le(2.5);
        assert_eq!(bytes_to_f32_le(bytes), 2.5);
    }
}
