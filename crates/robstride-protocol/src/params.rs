//! 参数索引表与参数帧负载打包
//!
//! 每个参数索引（16 位）对应设备参数表中的一个条目，类型与单位固定。
//! 参数写入/读取帧（通信类型 0x12/0x11）的负载布局：
//!
//! ```text
//! Byte 0-1: 参数索引（低字节在前）
//! Byte 2-3: 保留（0）
//! Byte 4-7: 参数值（u8/u16 零扩展；f32 小端）
//! ```
//!
//! 读应答回显索引时，不同固件批次的字节序不一致，匹配逻辑两种都接受。

use crate::{ProtocolError, f32_to_bytes_le};

// ============================================================================
// 已知参数索引
// ============================================================================

/// 运行模式（u8：0 Operation，1 PP，2 Velocity，3 Current，5 CSP）
pub const IDX_RUN_MODE: u16 = 0x7005;

/// Current 模式电流指令 Iq [A]（f32）
pub const IDX_IQ_REF: u16 = 0x7006;

/// Velocity 模式速度指令 [rad/s]（f32）
pub const IDX_SPD_REF: u16 = 0x700A;

/// 力矩上限 [Nm]（f32）
pub const IDX_LIMIT_TORQUE: u16 = 0x700B;

/// 电流环增益 Kp（f32）
pub const IDX_CUR_KP: u16 = 0x7010;

/// 电流环增益 Ki（f32）
pub const IDX_CUR_KI: u16 = 0x7011;

/// 位置指令 [rad]（f32，PP/CSP 模式共用）
pub const IDX_LOC_REF: u16 = 0x7016;

/// 速度上限 [rad/s]（f32）
pub const IDX_LIMIT_SPD: u16 = 0x7017;

/// 电流上限 [A]（f32）
pub const IDX_LIMIT_CUR: u16 = 0x7018;

/// 电流上限旧索引（老固件批次的别名，与 0x7018 成对写入）
pub const IDX_LIMIT_CUR_LEGACY: u16 = 0x2019;

/// 机械角度 [rad]（f32，只读，2π 周期回绕）
pub const IDX_MECH_POS: u16 = 0x7019;

/// 机械角速度 [rad/s]（f32，只读）
pub const IDX_MECH_VEL: u16 = 0x701B;

/// 位置环增益 Kp（f32）
pub const IDX_LOC_KP: u16 = 0x701E;

/// 速度环增益 Kp（f32）
pub const IDX_SPD_KP: u16 = 0x701F;

/// 速度环增益 Ki（f32）
pub const IDX_SPD_KI: u16 = 0x7020;

/// 主动上报周期 [tick]（u16）
///
/// 索引值依固件批次而定，见 DESIGN.md。
pub const IDX_EPSCAN_TIME: u16 = 0x7021;

/// Velocity 模式加速度 [rad/s²]（f32）
pub const IDX_ACC_RAD: u16 = 0x7022;

/// 节点 CAN 地址（u8，写入后需 SaveParams 才掉电保持）
pub const IDX_CAN_ID: u16 = 0x200A;

// ============================================================================
// 参数值
// ============================================================================

/// 参数值（按索引的固定语义类型编码）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    U8(u8),
    U16(u16),
    F32(f32),
}

impl ParamValue {
    /// 编码为负载尾部的 4 字节（小端，整数零扩展）
    pub fn to_le_bytes(self) -> [u8; 4] {
        match self {
            ParamValue::U8(v) => [v, 0, 0, 0],
            ParamValue::U16(v) => {
                let [lo, hi] = v.to_le_bytes();
                [lo, hi, 0, 0]
            },
            ParamValue::F32(v) => f32_to_bytes_le(v),
        }
    }
}

// ============================================================================
// 负载打包/解包
// ============================================================================

/// 构建参数写入帧（0x12）的 8 字节负载
pub fn write_payload(index: u16, value: ParamValue) -> [u8; 8] {
    let mut data = [0u8; 8];
    data[0] = index as u8;
    data[1] = (index >> 8) as u8;
    data[4..8].copy_from_slice(&value.to_le_bytes());
    data
}

/// 构建参数读取请求帧（0x11）的 8 字节负载（值域为 0）
pub fn read_request_payload(index: u16) -> [u8; 8] {
    let mut data = [0u8; 8];
    data[0] = index as u8;
    data[1] = (index >> 8) as u8;
    data
}

/// 检查读应答负载回显的索引是否与请求一致
///
/// 固件回显索引的字节序不一致，小端/大端任一匹配即认为一致。
pub fn echoed_index_matches(payload: &[u8], index: u16) -> bool {
    if payload.len() < 2 {
        return false;
    }
    let le = u16::from_le_bytes([payload[0], payload[1]]);
    let be = u16::from_be_bytes([payload[0], payload[1]]);
    le == index || be == index
}

/// 提取读应答负载中的 4 字节参数值（小端）
pub fn value_bytes(payload: &[u8]) -> Result<[u8; 4], ProtocolError> {
    if payload.len() < 8 {
        return Err(ProtocolError::InvalidLength {
            expected: 8,
            actual: payload.len(),
        });
    }
    Ok([payload[4], payload[5], payload[6], payload[7]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_payload_layout() {
        // run_mode = 2 (Velocity)
        let payload = write_payload(IDX_RUN_MODE, ParamValue::U8(2));
        assert_eq!(payload, [0x05, 0x70, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn test_write_payload_f32() {
        let payload = write_payload(IDX_SPD_REF, ParamValue::F32(2.0));
        assert_eq!(&payload[0..2], &[0x0A, 0x70]);
        assert_eq!(&payload[4..8], &2.0f32.to_le_bytes());
    }

    #[test]
    fn test_write_payload_u16() {
        let payload = write_payload(IDX_EPSCAN_TIME, ParamValue::U16(0x0102));
        assert_eq!(&payload[4..8], &[0x02, 0x01, 0, 0]);
    }

    #[test]
    fn test_read_request_payload() {
        let payload = read_request_payload(IDX_MECH_POS);
        assert_eq!(payload, [0x19, 0x70, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_echoed_index_matches_both_orders() {
        // 小端回显
        assert!(echoed_index_matches(&[0x05, 0x70, 0, 0, 0, 0, 0, 0], 0x7005));
        // 大端回显（固件不一致的批次）
        assert!(echoed_index_matches(&[0x70, 0x05, 0, 0, 0, 0, 0, 0], 0x7005));
        // 不匹配
        assert!(!echoed_index_matches(&[0x0A, 0x70, 0, 0, 0, 0, 0, 0], 0x7005));
        // 过短
        assert!(!echoed_index_matches(&[0x05], 0x7005));
    }

    #[test]
    fn test_value_bytes() {
        let payload = [0x05, 0x70, 0, 0, 0xDE, 0xAD, 0xBE, 0xEF];
        assert_eq!(value_bytes(&payload).unwrap(), [0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(value_bytes(&payload[..6]).is_err());
    }
}
