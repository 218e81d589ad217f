//! 无限角度累积（解缠绕滤波）
//!
//! 机械角度参数（0x7019）与遥测角度都以 2π 为周期回绕。本模块把
//! 回绕的采样流还原为连续的累积角：相邻采样差超过 ±π 时按就近原则
//! 折返一个周期再累加。
//!
//! 状态由调用方持有（每个节点一个 tracker），不做任何周期性复位；
//! 只有显式 `reset` 会清零。

use std::f64::consts::PI;

/// 角度解缠绕状态
///
/// 未初始化创建；第一个有限采样只做初始化、不产生增量；此后每个
/// 有限采样更新累积角。非有限采样（NaN/Inf）被忽略、不改动状态。
#[derive(Debug, Clone, Copy, Default)]
pub struct AngleTracker {
    initialized: bool,
    /// 直近的回绕角采样 [rad]
    last: f32,
    /// 累积角 [rad]
    accumulated: f64,
}

impl AngleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否已被首个有效采样初始化
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// 送入一个回绕角采样，返回当前累积角 [rad]
    pub fn update(&mut self, sample_rad: f32) -> f64 {
        if !sample_rad.is_finite() {
            return self.accumulated;
        }

        if !self.initialized {
            self.initialized = true;
            self.last = sample_rad;
            self.accumulated = sample_rad as f64;
            return self.accumulated;
        }

        let mut delta = (sample_rad - self.last) as f64;
        // 就近折返（±π 为界）
        if delta > PI {
            delta -= 2.0 * PI;
        }
        if delta < -PI {
            delta += 2.0 * PI;
        }
        self.accumulated += delta;
        self.last = sample_rad;
        self.accumulated
    }

    /// 当前累积角 [rad]
    pub fn angle_rad(&self) -> f64 {
        self.accumulated
    }

    /// 累积圈数
    pub fn turns(&self) -> f64 {
        self.accumulated / (2.0 * PI)
    }

    /// 清零（回到未初始化状态）
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_initializes_without_delta() {
        let mut tracker = AngleTracker::new();
        assert!(!tracker.initialized());

        let acc = tracker.update(3.0);
        assert!(tracker.initialized());
        assert_eq!(acc, 3.0);
    }

    #[test]
    fn test_wrap_crossing_rewraps_delta() {
        // 3.0 → -3.0：原始差 -6.0 折返为 +0.283，而不是掉头 -6.0
        let mut tracker = AngleTracker::new();
        tracker.update(3.0);
        let acc = tracker.update(-3.0);

        assert!((acc - 3.283).abs() < 1e-3, "acc = {acc}");
    }

    #[test]
    fn test_continuous_rotation_accumulates_turns() {
        let mut tracker = AngleTracker::new();
        tracker.update(0.0);

        // 正向匀速转两圈，每步 0.5 rad
        let steps = (4.0 * PI / 0.5) as usize;
        let mut wrapped = 0.0f32;
        for _ in 0..steps {
            wrapped += 0.5;
            if wrapped > PI as f32 {
                wrapped -= 2.0 * PI as f32;
            }
            tracker.update(wrapped);
        }

        assert!((tracker.turns() - 2.0).abs() < 0.05, "turns = {}", tracker.turns());
    }

    #[test]
    fn test_non_finite_samples_ignored() {
        let mut tracker = AngleTracker::new();
        tracker.update(f32::NAN);
        assert!(!tracker.initialized());

        tracker.update(1.0);
        tracker.update(f32::INFINITY);
        tracker.update(f32::NAN);
        assert_eq!(tracker.angle_rad(), 1.0);

        // 状态未被污染，后续采样正常累积
        tracker.update(1.5);
        assert!((tracker.angle_rad() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_reset_returns_to_uninitialized() {
        let mut tracker = AngleTracker::new();
        tracker.update(2.0);
        tracker.update(2.5);
        tracker.reset();

        assert!(!tracker.initialized());
        assert_eq!(tracker.angle_rad(), 0.0);

        // 复位后的首个采样重新初始化
        tracker.update(-1.0);
        assert_eq!(tracker.angle_rad(), -1.0);
    }
}
