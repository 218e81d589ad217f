//! 驱动层错误类型

use robstride_can::CanError;
use robstride_protocol::{ProtocolError, RunMode};
use thiserror::Error;

/// 驱动层统一错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 传输层拒绝了帧（发送失败）
    #[error("CAN error: {0}")]
    Can(#[from] CanError),

    /// 协议编解码错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 参数读取在时间窗内未等到关联应答
    #[error("Timed out waiting for parameter 0x{index:04X} response from node 0x{node:02X}")]
    ReadTimeout { node: u8, index: u16 },

    /// Ping 在时间窗内未等到设备 ID 应答
    #[error("No device ID response from node 0x{node:02X}")]
    PingTimeout { node: u8 },

    /// bring-up 序列整体失败（所有步骤均已执行）
    #[error("Bring-up into {mode:?} failed on node 0x{node:02X}")]
    BringUpFailed { node: u8, mode: RunMode },
}
