//! 参数读写事务
//!
//! 写入（通信类型 0x12）是发后不理的单帧；读取（通信类型 0x11）
//! 发出请求后在有界时间窗内轮询入站帧，按三个条件关联应答：
//!
//! 1. 通信类型为 0x11；
//! 2. 目的地址是本机、保留标记（0x00/0xFE/0xFF）或目标节点本身
//!    （不同固件批次回送地址不一致）；
//! 3. 负载回显的索引与请求一致（小端/大端任一匹配）。
//!
//! 等待期间的非关联帧被丢弃、不入队。超时返回错误，不产生部分结果。

use crate::bus::{POLL_INTERVAL, RsBus};
use crate::error::DriverError;
use robstride_can::CanAdapter;
use robstride_protocol::{
    ADDR_ANY, ADDR_BROADCAST, ADDR_PING_REPLY, CommandType, ExtendedId, IDX_EPSCAN_TIME,
    IDX_IQ_REF, IDX_LOC_REF, IDX_RUN_MODE, IDX_SPD_REF, ParamValue, ProtocolError, RunMode,
    bytes_to_f32_le, echoed_index_matches, read_request_payload, value_bytes, write_payload,
};
use std::time::Instant;
use tracing::trace;

impl<A: CanAdapter> RsBus<A> {
    // ========================================================================
    // 写入
    // ========================================================================

    /// 写单个参数（发后不理）
    pub fn write_param(
        &mut self,
        node: u8,
        index: u16,
        value: ParamValue,
    ) -> Result<(), DriverError> {
        let payload = write_payload(index, value);
        let data_area = self.master_pair();
        self.send_frame(CommandType::WriteParam, data_area, node, &payload)
    }

    /// 写 f32 参数
    pub fn write_f32(&mut self, node: u8, index: u16, value: f32) -> Result<(), DriverError> {
        self.write_param(node, index, ParamValue::F32(value))
    }

    /// 写 u8 参数
    pub fn write_u8(&mut self, node: u8, index: u16, value: u8) -> Result<(), DriverError> {
        self.write_param(node, index, ParamValue::U8(value))
    }

    /// 设置运行模式（参数 0x7005）
    pub fn set_run_mode(&mut self, node: u8, mode: RunMode) -> Result<(), DriverError> {
        self.write_u8(node, IDX_RUN_MODE, mode as u8)
    }

    /// Velocity 模式速度指令 [rad/s]（建议 50–100 ms 周期重发）
    pub fn velocity_ref(&mut self, node: u8, spd_rad_s: f32) -> Result<(), DriverError> {
        self.write_f32(node, IDX_SPD_REF, spd_rad_s)
    }

    /// Current 模式电流指令 Iq [A]
    pub fn current_ref(&mut self, node: u8, iq_a: f32) -> Result<(), DriverError> {
        self.write_f32(node, IDX_IQ_REF, iq_a)
    }

    /// PP/CSP 模式位置指令 [rad]
    pub fn position_ref(&mut self, node: u8, pos_rad: f32) -> Result<(), DriverError> {
        self.write_f32(node, IDX_LOC_REF, pos_rad)
    }

    /// 主动上报周期 [tick]（参数写入，需先开启主动上报）
    pub fn set_report_interval(&mut self, node: u8, ticks: u16) -> Result<(), DriverError> {
        self.write_param(node, IDX_EPSCAN_TIME, ParamValue::U16(ticks))
    }

    // ========================================================================
    // 读取
    // ========================================================================

    /// 读单个参数的原始 4 字节值（限时轮询关联应答）
    pub fn read_param_raw(&mut self, node: u8, index: u16) -> Result<[u8; 4], DriverError> {
        let payload = read_request_payload(index);
        let data_area = self.master_pair();
        self.send_frame(CommandType::ReadParam, data_area, node, &payload)?;

        let deadline = Instant::now() + self.read_timeout();
        while Instant::now() < deadline {
            let Some(frame) = self.adapter_mut().try_receive()? else {
                spin_sleep::sleep(POLL_INTERVAL);
                continue;
            };

            let id = ExtendedId::parse(frame.id);
            if id.command() != Some(CommandType::ReadParam) {
                trace!(id = frame.id, "discarding frame while waiting for parameter response");
                continue;
            }
            // 应答目的地址依固件批次不一：本机、保留标记或目标节点均接受
            let dst = id.destination;
            if !(dst == self.host_id()
                || dst == ADDR_BROADCAST
                || dst == ADDR_PING_REPLY
                || dst == ADDR_ANY
                || dst == node)
            {
                trace!(id = frame.id, "discarding parameter response for other destination");
                continue;
            }
            if !echoed_index_matches(frame.data_slice(), index) {
                trace!(id = frame.id, index, "discarding parameter response with mismatched index");
                continue;
            }

            return Ok(value_bytes(frame.data_slice())?);
        }

        Err(DriverError::ReadTimeout { node, index })
    }

    /// 读 f32 参数
    pub fn read_f32(&mut self, node: u8, index: u16) -> Result<f32, DriverError> {
        Ok(bytes_to_f32_le(self.read_param_raw(node, index)?))
    }

    /// 读 u8 参数
    pub fn read_u8(&mut self, node: u8, index: u16) -> Result<u8, DriverError> {
        Ok(self.read_param_raw(node, index)?[0])
    }

    /// 读回运行模式（参数 0x7005）
    pub fn read_run_mode(&mut self, node: u8) -> Result<RunMode, DriverError> {
        let value = self.read_u8(node, IDX_RUN_MODE)?;
        RunMode::try_from(value).map_err(|_| {
            DriverError::Protocol(ProtocolError::InvalidValue {
                field: "RunMode".to_string(),
                value,
            })
        })
    }
}
