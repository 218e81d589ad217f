//! # RobStride Driver
//!
//! 面向单会话的驱动层：在 `CanAdapter` 之上实现指令分发、参数
//! 读写事务与运行模式 bring-up 时序。
//!
//! ## 模块
//!
//! - `bus`: [`RsBus`] 会话对象与单帧指令（ping/使能/停止/改 ID 等）
//! - `param`: 参数写入（发后不理）与参数读取（限时轮询关联应答）
//! - `bringup`: 四种可驱动模式的 Simple / Robust bring-up 时序
//! - `error`: 驱动层错误类型
//!
//! ## 执行模型
//!
//! 单线程协作式：除参数读取（在有界时间窗内轮询收包）外所有操作
//! 非阻塞。`RsBus` 不做内部排队、重试或加锁，状态由调用方独占。

pub mod bringup;
pub mod bus;
pub mod error;
pub mod param;

pub use bus::RsBus;
pub use error::DriverError;

// 上层常用的协议类型
pub use robstride_protocol::{
    AngleTracker, MitCommand, MitFeedback, MotionCommand, ProtocolMode, RunMode, Telemetry,
};
