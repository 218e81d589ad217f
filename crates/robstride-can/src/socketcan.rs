//! SocketCAN CAN 适配器实现
//!
//! 基于 Linux 内核 SocketCAN 子系统，支持标准帧和扩展帧，自动过滤
//! 错误帧。
//!
//! ## 限制
//!
//! - **仅限 Linux 平台**：SocketCAN 是 Linux 内核特性
//! - **接口配置**：波特率等配置由系统工具（`ip link`）完成，不在应用层设置
//! - **权限要求**：可能需要 `dialout` 组权限或 `sudo`

use crate::{CanAdapter, CanDeviceError, CanDeviceErrorKind, CanError, RsFrame};
use socketcan::{CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Id, Socket, StandardId};
use std::io::ErrorKind;
use std::time::Duration;
use tracing::trace;

/// SocketCAN 适配器
///
/// # 示例
///
/// ```no_run
/// use robstride_can::{CanAdapter, SocketCanAdapter, RsFrame};
///
/// let mut adapter = SocketCanAdapter::new("can0").unwrap();
/// let frame = RsFrame::new_extended(0x12FD_007F, &[0; 8]);
/// adapter.send(frame).unwrap();
/// ```
#[derive(Debug)]
pub struct SocketCanAdapter {
    socket: CanSocket,
    /// 接口名称（如 "can0"）
    interface: String,
    /// 读超时时间（用于 receive 方法）
    read_timeout: Duration,
}

impl SocketCanAdapter {
    /// 打开 CAN 接口
    ///
    /// # 错误
    ///
    /// - `CanError::Device`: 接口不存在或无法打开
    /// - `CanError::Io`: 权限不足等系统调用失败
    pub fn new(interface: impl Into<String>) -> Result<Self, CanError> {
        let interface = interface.into();
        let socket = CanSocket::open(&interface).map_err(|e| {
            CanError::Device(CanDeviceError::new(
                CanDeviceErrorKind::NotFound,
                format!(
                    "cannot open CAN interface '{interface}': {e}. \
                     Check that it exists and is UP (ip link set up {interface})"
                ),
            ))
        })?;

        trace!(interface = %interface, "SocketCAN adapter opened");

        Ok(Self {
            socket,
            interface,
            read_timeout: Duration::from_millis(100),
        })
    }

    /// 接口名称
    pub fn interface(&self) -> &str {
        &self.interface
    }

    fn to_can_frame(frame: RsFrame) -> Result<CanFrame, CanError> {
        let id: Id = if frame.is_extended {
            ExtendedId::new(frame.id)
                .ok_or_else(|| {
                    CanError::Device(CanDeviceError::new(
                        CanDeviceErrorKind::InvalidFrame,
                        format!("invalid extended CAN ID: 0x{:X}", frame.id),
                    ))
                })?
                .into()
        } else {
            StandardId::new(frame.id as u16)
                .ok_or_else(|| {
                    CanError::Device(CanDeviceError::new(
                        CanDeviceErrorKind::InvalidFrame,
                        format!("invalid standard CAN ID: 0x{:X}", frame.id),
                    ))
                })?
                .into()
        };

        CanFrame::new(id, frame.data_slice()).ok_or_else(|| {
            CanError::Device(CanDeviceError::new(
                CanDeviceErrorKind::InvalidFrame,
                "cannot build CAN frame",
            ))
        })
    }

    fn from_can_frame(frame: &CanFrame) -> RsFrame {
        match frame.id() {
            Id::Standard(id) => RsFrame::new_standard(id.as_raw(), frame.data()),
            Id::Extended(id) => RsFrame::new_extended(id.as_raw(), frame.data()),
        }
    }
}

impl CanAdapter for SocketCanAdapter {
    fn send(&mut self, frame: RsFrame) -> Result<(), CanError> {
        let can_frame = Self::to_can_frame(frame)?;
        self.socket.write_frame(&can_frame).map_err(CanError::Io)
    }

    fn receive(&mut self) -> Result<RsFrame, CanError> {
        if self.read_timeout.is_zero() {
            self.socket.set_nonblocking(true).map_err(CanError::Io)?;
        } else {
            self.socket.set_nonblocking(false).map_err(CanError::Io)?;
            self.socket
                .set_read_timeout(self.read_timeout)
                .map_err(CanError::Io)?;
        }

        loop {
            match self.socket.read_frame() {
                Ok(frame @ CanFrame::Data(_)) => {
                    return Ok(Self::from_can_frame(&frame));
                },
                // 远程帧/错误帧对协议层无意义，跳过继续读
                Ok(other) => {
                    trace!(interface = %self.interface, frame = ?other, "skipping non-data frame");
                    continue;
                },
                Err(e)
                    if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
                {
                    return Err(CanError::Timeout);
                },
                Err(e) => return Err(CanError::Io(e)),
            }
        }
    }

    fn set_receive_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }
}
