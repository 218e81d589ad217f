//! `RsBus` 会话对象与单帧指令
//!
//! 每个 `RsBus` 持有一个 CAN 适配器与主机/主控地址对，方法按目标
//! 节点地址寻址单个电机。单帧指令均为"发后不理"：返回 `Ok` 仅表示
//! 传输层接受了帧，不代表设备已执行。

use crate::error::DriverError;
use robstride_can::CanAdapter;
use robstride_protocol::{
    ADDR_MASTER, ADDR_PING_REPLY, CommandType, ExtendedId, IDX_CAN_ID, MIT_DISABLE, MIT_ENABLE,
    MIT_SET_ZERO, MitCommand, MitFeedback, MotionCommand, ProtocolMode, RsFrame, Telemetry,
    data_area_pair,
};
use std::time::Duration;
use tracing::trace;

/// 参数读取的默认应答时间窗
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(300);

/// 应答轮询间隔
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// 面向单会话的总线对象
///
/// # 并发
///
/// 无内部锁；一个 `RsBus` 只能被一个逻辑线程使用。参数读取会阻塞
/// 调用方最多一个完整时间窗，承担周期性发送职责的调用方需要自行
/// 预算这段停顿。
pub struct RsBus<A: CanAdapter> {
    adapter: A,
    host_id: u8,
    master_id: u8,
    read_timeout: Duration,
}

impl<A: CanAdapter> RsBus<A> {
    /// 创建会话（主控地址默认 0xFD）
    pub fn new(adapter: A, host_id: u8) -> Self {
        Self {
            adapter,
            host_id,
            master_id: ADDR_MASTER,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// 覆盖主控地址（依实机配置）
    pub fn with_master_id(mut self, master_id: u8) -> Self {
        self.master_id = master_id;
        self
    }

    /// 覆盖参数读取时间窗
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn host_id(&self) -> u8 {
        self.host_id
    }

    pub fn master_id(&self) -> u8 {
        self.master_id
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// 访问底层适配器
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// 拆出底层适配器
    pub fn into_adapter(self) -> A {
        self.adapter
    }

    /// 多数指令的数据区 2：`master/host` 地址对
    pub(crate) fn master_pair(&self) -> u16 {
        data_area_pair(self.master_id, self.host_id)
    }

    /// 构建并发送一个扩展帧
    pub(crate) fn send_frame(
        &mut self,
        command_type: CommandType,
        data_area: u16,
        node: u8,
        payload: &[u8],
    ) -> Result<(), DriverError> {
        let id = ExtendedId::compose(command_type as u8, data_area, node);
        self.adapter.send(RsFrame::new_extended(id, payload))?;
        Ok(())
    }

    // ========================================================================
    // 单帧指令（通信类型 0/3/4/7/0x16/0x18/0x19）
    // ========================================================================

    /// Ping（通信类型 0），发后不理
    ///
    /// 应答携带 64 位 MCU 唯一 ID，需要应答时使用 [`RsBus::read_device_id`]。
    pub fn ping(&mut self, node: u8) -> Result<(), DriverError> {
        self.send_frame(
            CommandType::Ping,
            data_area_pair(self.host_id, node),
            node,
            &[0u8; 8],
        )
    }

    /// Ping 并等待 64 位 MCU 唯一 ID 应答（限时）
    ///
    /// 固件把应答发往保留地址 0xFE，数据区 2 回显电机节点地址。
    pub fn read_device_id(&mut self, node: u8) -> Result<u64, DriverError> {
        self.ping(node)?;

        let deadline = std::time::Instant::now() + self.read_timeout;
        while std::time::Instant::now() < deadline {
            let Some(frame) = self.adapter.try_receive()? else {
                spin_sleep::sleep(POLL_INTERVAL);
                continue;
            };

            let id = ExtendedId::parse(frame.id);
            if id.command() != Some(CommandType::Ping)
                || id.destination != ADDR_PING_REPLY
                || id.data_area != node as u16
                || frame.len < 8
            {
                trace!(id = frame.id, "discarding frame while waiting for device ID");
                continue;
            }
            return Ok(u64::from_be_bytes(frame.data));
        }
        Err(DriverError::PingTimeout { node })
    }

    /// 使能（通信类型 3）
    pub fn enable(&mut self, node: u8) -> Result<(), DriverError> {
        self.send_frame(CommandType::Enable, self.master_pair(), node, &[0u8; 8])
    }

    /// 停止（通信类型 4）；`clear_fault` 置位时同时清除故障
    pub fn stop(&mut self, node: u8, clear_fault: bool) -> Result<(), DriverError> {
        let mut payload = [0u8; 8];
        if clear_fault {
            payload[1] = 0x01;
        }
        self.send_frame(CommandType::Stop, self.master_pair(), node, &payload)
    }

    /// 协议切换（通信类型 0x19）
    pub fn switch_protocol(&mut self, node: u8, mode: ProtocolMode) -> Result<(), DriverError> {
        let payload = [1, 2, 3, 4, 5, 6, mode as u8, 0];
        self.send_frame(CommandType::SwitchProtocol, self.master_pair(), node, &payload)
    }

    /// 主动上报开关（通信类型 0x18）
    pub fn set_active_report(&mut self, node: u8, enabled: bool) -> Result<(), DriverError> {
        let payload = [1, 2, 3, 4, 5, 6, enabled as u8, 0];
        self.send_frame(CommandType::ActiveReport, self.master_pair(), node, &payload)
    }

    /// 立即修改节点地址（通信类型 7）
    ///
    /// 生效后设备即以 `new_id` 应答；掉电保持需另行
    /// [`RsBus::save_params`]。
    pub fn set_node_id(&mut self, node: u8, new_id: u8) -> Result<(), DriverError> {
        self.send_frame(
            CommandType::SetNodeId,
            data_area_pair(new_id, self.host_id),
            node,
            &[0u8; 8],
        )
    }

    /// 通过参数表修改节点地址（写 0x200A），可选立即持久化
    ///
    /// 与 [`RsBus::set_node_id`] 的立即改 ID 互为两种改名策略，
    /// 依固件批次选用。
    pub fn set_node_id_via_param(
        &mut self,
        node: u8,
        new_id: u8,
        persist: bool,
    ) -> Result<(), DriverError> {
        self.write_u8(node, IDX_CAN_ID, new_id)?;
        if persist {
            self.save_params(node)?;
        }
        Ok(())
    }

    /// 参数保存（通信类型 0x16，负载内容为占位字节）
    pub fn save_params(&mut self, node: u8) -> Result<(), DriverError> {
        self.send_frame(
            CommandType::SaveParams,
            data_area_pair(self.host_id, node),
            node,
            &[1, 2, 3, 4, 5, 6, 7, 8],
        )
    }

    // ========================================================================
    // 运控指令与遥测
    // ========================================================================

    /// 发送运控指令（通信类型 1）
    ///
    /// 超出量程的字段按协议饱和；发生饱和时输出一条诊断日志，
    /// 便于区分预期内的限幅与配置错误。
    pub fn motion_command(&mut self, node: u8, command: MotionCommand) -> Result<(), DriverError> {
        let (frame, clamped) = command.to_frame_clamped(node);
        if clamped {
            trace!(node, ?command, "motion command field clamped to physical range");
        }
        self.adapter.send(frame)?;
        Ok(())
    }

    /// 非阻塞拉取一帧遥测
    ///
    /// 无帧、或拉到的不是遥测帧（静默跳过）时返回 `Ok(None)`。
    pub fn poll_telemetry(&mut self) -> Result<Option<Telemetry>, DriverError> {
        let Some(frame) = self.adapter.try_receive()? else {
            return Ok(None);
        };
        match Telemetry::try_from(&frame) {
            Ok(telemetry) => Ok(Some(telemetry)),
            Err(e) => {
                trace!(id = frame.id, error = %e, "skipping non-telemetry frame");
                Ok(None)
            },
        }
    }

    // ========================================================================
    // 旧版 MIT 一代（标准帧）
    // ========================================================================

    /// MIT 一代：使能
    pub fn mit_enable(&mut self, node: u8) -> Result<(), DriverError> {
        self.adapter
            .send(RsFrame::new_standard(node as u16, &MIT_ENABLE))?;
        Ok(())
    }

    /// MIT 一代：失能
    pub fn mit_disable(&mut self, node: u8) -> Result<(), DriverError> {
        self.adapter
            .send(RsFrame::new_standard(node as u16, &MIT_DISABLE))?;
        Ok(())
    }

    /// MIT 一代：设置机械零位
    pub fn mit_set_zero(&mut self, node: u8) -> Result<(), DriverError> {
        self.adapter
            .send(RsFrame::new_standard(node as u16, &MIT_SET_ZERO))?;
        Ok(())
    }

    /// MIT 一代：运控指令
    pub fn mit_command(&mut self, node: u8, command: MitCommand) -> Result<(), DriverError> {
        self.adapter.send(command.to_frame(node))?;
        Ok(())
    }

    /// MIT 一代：非阻塞拉取一帧反馈（反馈帧以主机地址为标准 ID）
    pub fn poll_mit_feedback(&mut self) -> Result<Option<MitFeedback>, DriverError> {
        let Some(frame) = self.adapter.try_receive()? else {
            return Ok(None);
        };
        match MitFeedback::parse(self.host_id, &frame) {
            Ok(feedback) => Ok(Some(feedback)),
            Err(e) => {
                trace!(id = frame.id, error = %e, "skipping non-MIT-feedback frame");
                Ok(None)
            },
        }
    }
}
