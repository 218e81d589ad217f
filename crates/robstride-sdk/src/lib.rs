//! # RobStride SDK
//!
//! RS02 电机控制 SDK 的统一入口，按层重新导出：
//!
//! - [`protocol`]: 线格式编解码（无硬件依赖）
//! - [`can`]: CAN 适配器抽象与后端
//! - [`driver`]: 会话对象、参数事务与 bring-up 时序
//!
//! ## 快速上手
//!
//! ```no_run
//! use robstride_sdk::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let adapter = SocketCanAdapter::new("can0")?;
//! let mut bus = RsBus::new(adapter, 0x00);
//!
//! bus.enter_velocity_robust(0x7F, 8.0, 5.0, 20.0, None, None)?;
//! bus.velocity_ref(0x7F, 2.0)?;
//! # Ok(())
//! # }
//! ```

pub use robstride_can as can;
pub use robstride_driver as driver;
pub use robstride_protocol as protocol;

/// 常用类型一站式导入
pub mod prelude {
    pub use robstride_can::{CanAdapter, CanError};
    #[cfg(feature = "mock")]
    pub use robstride_can::MockCanAdapter;
    #[cfg(all(target_os = "linux", feature = "socketcan"))]
    pub use robstride_can::SocketCanAdapter;
    pub use robstride_driver::{DriverError, RsBus};
    pub use robstride_protocol::{
        AngleTracker, MitCommand, MitFeedback, MotionCommand, ProtocolMode, RsFrame, RunMode,
        Telemetry,
    };
}

/// 初始化日志输出（`RUST_LOG` 控制级别）
///
/// 仅供示例/工具使用；库代码只产生 `tracing` 事件，不安装订阅器。
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
