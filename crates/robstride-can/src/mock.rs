//! Mock CAN 适配器（无硬件依赖）
//!
//! 用于驱动层测试：出站帧全部记录（包括被注入失败拒绝的帧），
//! 入站帧按脚本队列依次吐出。

use crate::{CanAdapter, CanDeviceError, CanDeviceErrorKind, CanError, RsFrame};
use std::collections::VecDeque;

/// Mock 适配器
///
/// # 示例
///
/// ```
/// use robstride_can::{CanAdapter, MockCanAdapter, RsFrame};
///
/// let mut adapter = MockCanAdapter::new();
/// adapter.push_rx(RsFrame::new_extended(0x1100_00FD, &[0; 8]));
///
/// adapter.send(RsFrame::new_extended(0x1200_007F, &[0; 8])).unwrap();
/// assert_eq!(adapter.sent().len(), 1);
/// assert!(adapter.try_receive().unwrap().is_some());
/// assert!(adapter.try_receive().unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MockCanAdapter {
    /// 所有送交 `send` 的帧（含被拒绝的，按到达顺序）
    tx: Vec<RsFrame>,
    /// 脚本化的入站帧队列
    rx: VecDeque<RsFrame>,
    /// 接下来 N 次 `send` 返回失败
    fail_sends: usize,
}

impl MockCanAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个脚本化的入站帧
    pub fn push_rx(&mut self, frame: RsFrame) {
        self.rx.push_back(frame);
    }

    /// 让接下来 `n` 次 `send` 调用失败（帧仍会被记录）
    pub fn fail_next_sends(&mut self, n: usize) {
        self.fail_sends = n;
    }

    /// 所有送交过 `send` 的帧
    pub fn sent(&self) -> &[RsFrame] {
        &self.tx
    }

    /// 清空发送记录
    pub fn clear_sent(&mut self) {
        self.tx.clear();
    }
}

impl CanAdapter for MockCanAdapter {
    fn send(&mut self, frame: RsFrame) -> Result<(), CanError> {
        self.tx.push(frame);
        if self.fail_sends > 0 {
            self.fail_sends -= 1;
            return Err(CanError::Device(CanDeviceError::new(
                CanDeviceErrorKind::Backend,
                "injected send failure",
            )));
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<RsFrame, CanError> {
        self.rx.pop_front().ok_or(CanError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_sends_in_order() {
        let mut adapter = MockCanAdapter::new();
        adapter.send(RsFrame::new_extended(0x1, &[])).unwrap();
        adapter.send(RsFrame::new_extended(0x2, &[])).unwrap();

        assert_eq!(adapter.sent().len(), 2);
        assert_eq!(adapter.sent()[0].id, 0x1);
        assert_eq!(adapter.sent()[1].id, 0x2);
    }

    #[test]
    fn test_mock_injected_failures_still_recorded() {
        let mut adapter = MockCanAdapter::new();
        adapter.fail_next_sends(1);

        assert!(adapter.send(RsFrame::new_extended(0x1, &[])).is_err());
        assert!(adapter.send(RsFrame::new_extended(0x2, &[])).is_ok());
        assert_eq!(adapter.sent().len(), 2);
    }

    #[test]
    fn test_mock_rx_queue_drains() {
        let mut adapter = MockCanAdapter::new();
        adapter.push_rx(RsFrame::new_extended(0xA, &[]));

        assert_eq!(adapter.try_receive().unwrap().unwrap().id, 0xA);
        assert!(adapter.try_receive().unwrap().is_none());
    }
}
