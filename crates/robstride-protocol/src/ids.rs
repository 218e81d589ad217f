//! 通信类型与 29 位扩展 ID 的构建/解析
//!
//! 私有协议的扩展 ID 布局：
//!
//! ```text
//! Bit[28:24] = 通信类型（5 位）
//! Bit[23:8]  = 数据区 2（16 位，语义随通信类型变化）
//! Bit[7:0]   = 目标节点地址（8 位）
//! ```
//!
//! 数据区 2 的典型用法：主机/上位机地址对（多数指令）、定点编码的
//! 力矩值（运控指令 0x01）、新节点地址（改 ID 指令 0x07）。

use num_enum::TryFromPrimitive;

// ============================================================================
// 保留节点地址
// ============================================================================

/// 广播/上位机标记地址
pub const ADDR_BROADCAST: u8 = 0x00;

/// 主控制器（Master）默认地址
pub const ADDR_MASTER: u8 = 0xFD;

/// Ping 应答的目的地址（固件回送 MCU 唯一 ID 时使用）
pub const ADDR_PING_REPLY: u8 = 0xFE;

/// 通配地址（部分固件以此回送参数应答）
pub const ADDR_ANY: u8 = 0xFF;

// ============================================================================
// 通信类型（扩展 ID Bit[28:24]）
// ============================================================================

/// 私有协议通信类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CommandType {
    /// 获取设备 ID（Ping），应答携带 64 位 MCU 唯一 ID
    Ping = 0x00,
    /// 运控指令（Operation Control）
    OperationControl = 0x01,
    /// 遥测反馈帧（电机 → 主机）
    Telemetry = 0x02,
    /// 电机使能
    Enable = 0x03,
    /// 停止 / 故障清除
    Stop = 0x04,
    /// 立即修改节点地址
    SetNodeId = 0x07,
    /// 单参数读取请求/应答
    ReadParam = 0x11,
    /// 单参数写入
    WriteParam = 0x12,
    /// 参数保存（掉电保持）
    SaveParams = 0x16,
    /// 主动上报开关
    ActiveReport = 0x18,
    /// 协议切换
    SwitchProtocol = 0x19,
}

/// 协议切换指令（0x19）的目标协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProtocolMode {
    /// 私有协议（默认）
    #[default]
    Private = 0,
    /// CANopen
    CanOpen = 1,
    /// 旧版 MIT 协议
    Mit = 2,
}

// ============================================================================
// 扩展 ID
// ============================================================================

/// 已解析的 29 位扩展 ID
///
/// `compose` 将各字段掩码到 5/16/8 位后拼接；`parse` 无条件拆出通信类型
/// 与目标地址，数据区 2 的解释留给具体指令。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedId {
    /// 通信类型原始值（5 位）
    pub command_type: u8,
    /// 数据区 2（语义随通信类型变化）
    pub data_area: u16,
    /// 目标节点地址
    pub destination: u8,
}

impl ExtendedId {
    /// 拼接 29 位扩展 ID
    ///
    /// 入参分别掩码到 5/16/8 位。掩码保证永远不会产生非法线上值；
    /// 需要感知是否发生了截断时使用 [`ExtendedId::compose_checked`]。
    pub fn compose(command_type: u8, data_area: u16, destination: u8) -> u32 {
        ((command_type as u32 & 0x1F) << 24) | ((data_area as u32) << 8) | destination as u32
    }

    /// 拼接 29 位扩展 ID，并返回是否发生了字段截断
    ///
    /// 返回值第二项为 true 表示 `command_type` 超出 5 位、被掩码修改过。
    /// （`data_area`/`destination` 的位宽与入参类型一致，不会截断。）
    pub fn compose_checked(command_type: u8, data_area: u16, destination: u8) -> (u32, bool) {
        let masked = command_type & 0x1F;
        (
            Self::compose(masked, data_area, destination),
            masked != command_type,
        )
    }

    /// 解析 29 位扩展 ID
    pub fn parse(raw: u32) -> Self {
        Self {
            command_type: ((raw >> 24) & 0x1F) as u8,
            data_area: (raw >> 8) as u16,
            destination: raw as u8,
        }
    }

    /// 还原为原始 29 位值
    pub fn raw(&self) -> u32 {
        Self::compose(self.command_type, self.data_area, self.destination)
    }

    /// 通信类型（已知类型返回枚举，未知 5 位值返回 None）
    pub fn command(&self) -> Option<CommandType> {
        CommandType::try_from(self.command_type).ok()
    }
}

/// 数据区 2 的"地址对"编码：高字节在前
///
/// 多数主机 → 电机指令使用 `master/host` 对；Ping 使用 `host/target` 对；
/// 改 ID 指令使用 `newId/host` 对。
pub fn data_area_pair(hi: u8, lo: u8) -> u16 {
    ((hi as u16) << 8) | lo as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_reference_value() {
        // 写参数指令，master=0xFD host=0x00，目标节点 0x7F
        assert_eq!(ExtendedId::compose(0x12, 0xFD00, 0x7F), 0x12FD_007F);
    }

    #[test]
    fn test_compose_masks_command_type() {
        // 超出 5 位的通信类型被掩码
        assert_eq!(
            ExtendedId::compose(0xFF, 0x0000, 0x01),
            ExtendedId::compose(0x1F, 0x0000, 0x01)
        );
        let (_, truncated) = ExtendedId::compose_checked(0xFF, 0x0000, 0x01);
        assert!(truncated);
        let (_, truncated) = ExtendedId::compose_checked(0x12, 0xFD00, 0x7F);
        assert!(!truncated);
    }

    #[test]
    fn test_parse_roundtrip() {
        for command_type in 0..=0x1Fu8 {
            for data_area in [0x0000u16, 0x0001, 0xFD00, 0xFFFF] {
                for destination in [0x00u8, 0x01, 0x7F, 0xFE, 0xFF] {
                    let raw = ExtendedId::compose(command_type, data_area, destination);
                    let parsed = ExtendedId::parse(raw);
                    assert_eq!(parsed.command_type, command_type);
                    assert_eq!(parsed.data_area, data_area);
                    assert_eq!(parsed.destination, destination);
                    assert_eq!(parsed.raw(), raw);
                }
            }
        }
    }

    #[test]
    fn test_command_lookup() {
        let id = ExtendedId::parse(0x12FD_007F);
        assert_eq!(id.command(), Some(CommandType::WriteParam));
        assert_eq!(id.destination, 0x7F);

        // 未定义的通信类型
        let id = ExtendedId::parse(0x0AFD_007F);
        assert_eq!(id.command(), None);
    }

    #[test]
    fn test_data_area_pair() {
        assert_eq!(data_area_pair(0xFD, 0x00), 0xFD00);
        assert_eq!(data_area_pair(0x00, 0x7F), 0x007F);
    }

    #[test]
    fn test_command_type_values() {
        assert_eq!(CommandType::Ping as u8, 0x00);
        assert_eq!(CommandType::Telemetry as u8, 0x02);
        assert_eq!(CommandType::ReadParam as u8, 0x11);
        assert_eq!(CommandType::WriteParam as u8, 0x12);
        assert_eq!(CommandType::SwitchProtocol as u8, 0x19);
    }
}
