//! 定点量化编解码
//!
//! 物理量（角度/角速度/力矩/增益）与无符号整数之间的仿射映射：
//!
//! ```text
//! encode(x) = round((x - min) / (max - min) * (2^N - 1))   （先夹取到 [min, max]）
//! decode(u) = min + u * (max - min) / (2^N - 1)
//! ```
//!
//! 编码有损：量化误差不超过 `(max - min) / (2^N - 1)`；解码结果
//! 永远落在 `[min, max]` 内。16 位变体用于私有协议的运控/遥测字段，
//! 12 位变体用于旧版 MIT 打包（见 `mit` 模块）。

/// 定点映射的物理量程
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedRange {
    pub min: f32,
    pub max: f32,
}

impl FixedRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// 量程跨度
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// 16 位编码（私有协议字段，四舍五入）
    pub fn encode_u16(&self, x: f32) -> u16 {
        self.encode_clamped_u16(x).0
    }

    /// 16 位编码，并返回输入是否被夹取
    ///
    /// 夹取是协议要求的饱和行为，但对调用方可能意味着配置错误，
    /// 因此单独暴露这一事实；驱动层据此输出诊断日志。
    pub fn encode_clamped_u16(&self, x: f32) -> (u16, bool) {
        let clamped = x.clamp(self.min, self.max);
        let u = ((clamped - self.min) * 65535.0 / self.span() + 0.5) as u16;
        (u, clamped != x)
    }

    /// 16 位解码
    pub fn decode_u16(&self, u: u16) -> f32 {
        u as f32 * self.span() / 65535.0 + self.min
    }

    /// N 位编码（N ≤ 16，旧版 MIT 打包使用的截断取整）
    pub fn encode_bits(&self, x: f32, bits: u32) -> u16 {
        let clamped = x.clamp(self.min, self.max);
        let steps = ((1u32 << bits) - 1) as f32;
        ((clamped - self.min) * steps / self.span()) as u16
    }

    /// N 位解码（N ≤ 16）
    pub fn decode_bits(&self, u: u16, bits: u32) -> f32 {
        let steps = ((1u32 << bits) - 1) as f32;
        u as f32 * self.span() / steps + self.min
    }
}

// ============================================================================
// RS02 物理量程（数据手册 MIT Dynamic Parameters）
// ============================================================================

/// 位置量程 [rad]（±4π）
pub const POSITION: FixedRange = FixedRange::new(-12.57, 12.57);

/// 角速度量程 [rad/s]
pub const VELOCITY: FixedRange = FixedRange::new(-44.0, 44.0);

/// 力矩量程 [Nm]
pub const TORQUE: FixedRange = FixedRange::new(-17.0, 17.0);

/// 位置环增益 Kp 量程
pub const GAIN_KP: FixedRange = FixedRange::new(0.0, 500.0);

/// 速度环增益 Kd 量程
pub const GAIN_KD: FixedRange = FixedRange::new(0.0, 5.0);
