//! 运行模式 bring-up 时序
//!
//! 固件要求运行模式写入并稳定之后才接受模式相关的上限/增益参数，
//! `enable` 也必须出现在特定位置，步骤间需要几十到约 100 ms 的稳定
//! 延时。每种可驱动模式提供两种时序策略：
//!
//! - **Simple**（`enter_*`）：写运行模式 → 延时 → 写模式参数 → 使能。
//! - **Robust**（`enter_*_robust`）：停止+清故障 → 延时 → 写运行模式
//!   → 延时 → 写上限/增益（电流上限同时写新旧两个索引，兼容固件
//!   代差）→ 使能 → 延时 → 重写运行模式（部分固件在使能后复位
//!   模式）→ 延时 → 读回运行模式校验。
//!
//! 所有步骤无论早先是否失败都会执行，步骤结果按逻辑与归并为整体
//! 结果：序列尾部的重写/读回本身就是对前面半生效状态的修复，提前
//! 中止反而放弃了这层修复。失败的步骤逐条记入日志，整体失败以
//! [`DriverError::BringUpFailed`] 上报。

use crate::bus::RsBus;
use crate::error::DriverError;
use robstride_can::CanAdapter;
use robstride_protocol::{
    IDX_ACC_RAD, IDX_CUR_KI, IDX_CUR_KP, IDX_LIMIT_CUR, IDX_LIMIT_CUR_LEGACY, IDX_LIMIT_SPD,
    IDX_LIMIT_TORQUE, IDX_LOC_KP, IDX_SPD_KI, IDX_SPD_KP, ParamValue, RunMode,
};
use std::time::Duration;
use tracing::warn;

/// 停止+清故障后的稳定延时
const STOP_SETTLE: Duration = Duration::from_millis(100);

/// Simple 策略写运行模式后的稳定延时
const MODE_SETTLE: Duration = Duration::from_millis(50);

/// Robust 策略写运行模式后的稳定延时
const ROBUST_MODE_SETTLE: Duration = Duration::from_millis(30);

/// 使能后的稳定延时
const ENABLE_SETTLE: Duration = Duration::from_millis(50);

/// 记录单个步骤的结果，失败只记日志、不中断序列
fn step_ok(node: u8, step: &str, result: Result<(), DriverError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(node, step, error = %e, "bring-up step failed");
            false
        },
    }
}

/// 可选增益：`None` 或非有限值表示沿用设备默认、跳过写入
fn push_gain(params: &mut Vec<(u16, ParamValue)>, index: u16, gain: Option<f32>) {
    if let Some(value) = gain
        && value.is_finite()
    {
        params.push((index, ParamValue::F32(value)));
    }
}

impl<A: CanAdapter> RsBus<A> {
    /// Simple 策略：写运行模式 → 延时 → 写模式参数 → 使能
    fn bring_up_simple(
        &mut self,
        node: u8,
        mode: RunMode,
        params: &[(u16, ParamValue)],
    ) -> Result<(), DriverError> {
        let mut ok = step_ok(node, "write run-mode", self.set_run_mode(node, mode));
        spin_sleep::sleep(MODE_SETTLE);

        for &(index, value) in params {
            ok &= step_ok(node, "write mode parameter", self.write_param(node, index, value));
        }
        ok &= step_ok(node, "enable", self.enable(node));

        if ok {
            Ok(())
        } else {
            Err(DriverError::BringUpFailed { node, mode })
        }
    }

    /// Robust 策略：停止清故障、重写运行模式并读回校验
    fn bring_up_robust(
        &mut self,
        node: u8,
        mode: RunMode,
        params: &[(u16, ParamValue)],
    ) -> Result<(), DriverError> {
        let mut ok = step_ok(node, "stop/fault-clear", self.stop(node, true));
        spin_sleep::sleep(STOP_SETTLE);

        ok &= step_ok(node, "write run-mode", self.set_run_mode(node, mode));
        spin_sleep::sleep(ROBUST_MODE_SETTLE);

        for &(index, value) in params {
            ok &= step_ok(node, "write mode parameter", self.write_param(node, index, value));
        }

        ok &= step_ok(node, "enable", self.enable(node));
        spin_sleep::sleep(ENABLE_SETTLE);

        // 部分固件在使能后把运行模式复位，重写一次
        ok &= step_ok(node, "re-write run-mode", self.set_run_mode(node, mode));
        spin_sleep::sleep(ROBUST_MODE_SETTLE);

        match self.read_run_mode(node) {
            Ok(actual) if actual != mode => {
                warn!(node, expected = ?mode, actual = ?actual, "run-mode read-back mismatch");
                ok = false;
            },
            Ok(_) => {},
            // 读回失败不算校验失败（无应答的固件批次仍可正常运行）
            Err(e) => {
                warn!(node, error = %e, "run-mode read-back unavailable, skipping verification");
            },
        }

        if ok {
            Ok(())
        } else {
            Err(DriverError::BringUpFailed { node, mode })
        }
    }

    // ========================================================================
    // Velocity
    // ========================================================================

    /// 进入 Velocity 模式（Simple 策略）
    ///
    /// 之后以 50–100 ms 周期调用 [`RsBus::velocity_ref`]。
    pub fn enter_velocity(
        &mut self,
        node: u8,
        limit_cur_a: f32,
        acc_rad_s2: f32,
        spd_kp: Option<f32>,
        spd_ki: Option<f32>,
    ) -> Result<(), DriverError> {
        let mut params = vec![
            (IDX_LIMIT_CUR, ParamValue::F32(limit_cur_a)),
            (IDX_ACC_RAD, ParamValue::F32(acc_rad_s2)),
        ];
        push_gain(&mut params, IDX_SPD_KP, spd_kp);
        push_gain(&mut params, IDX_SPD_KI, spd_ki);
        self.bring_up_simple(node, RunMode::Velocity, &params)
    }

    /// 进入 Velocity 模式（Robust 策略）
    pub fn enter_velocity_robust(
        &mut self,
        node: u8,
        limit_torque_nm: f32,
        limit_cur_a: f32,
        acc_rad_s2: f32,
        spd_kp: Option<f32>,
        spd_ki: Option<f32>,
    ) -> Result<(), DriverError> {
        let mut params = vec![
            (IDX_LIMIT_TORQUE, ParamValue::F32(limit_torque_nm)),
            (IDX_LIMIT_CUR, ParamValue::F32(limit_cur_a)),
            (IDX_LIMIT_CUR_LEGACY, ParamValue::F32(limit_cur_a)),
            (IDX_ACC_RAD, ParamValue::F32(acc_rad_s2)),
        ];
        push_gain(&mut params, IDX_SPD_KP, spd_kp);
        push_gain(&mut params, IDX_SPD_KI, spd_ki);
        self.bring_up_robust(node, RunMode::Velocity, &params)
    }

    // ========================================================================
    // Position Profile (PP)
    // ========================================================================

    /// 进入 PP 模式（Simple 策略），之后用 [`RsBus::position_ref`] 下发位置
    pub fn enter_position_profile(
        &mut self,
        node: u8,
        limit_spd_rad_s: f32,
        loc_kp: Option<f32>,
    ) -> Result<(), DriverError> {
        let mut params = vec![(IDX_LIMIT_SPD, ParamValue::F32(limit_spd_rad_s))];
        push_gain(&mut params, IDX_LOC_KP, loc_kp);
        self.bring_up_simple(node, RunMode::PositionProfile, &params)
    }

    /// 进入 PP 模式（Robust 策略）
    pub fn enter_position_profile_robust(
        &mut self,
        node: u8,
        limit_spd_rad_s: f32,
        loc_kp: Option<f32>,
    ) -> Result<(), DriverError> {
        let mut params = vec![(IDX_LIMIT_SPD, ParamValue::F32(limit_spd_rad_s))];
        push_gain(&mut params, IDX_LOC_KP, loc_kp);
        self.bring_up_robust(node, RunMode::PositionProfile, &params)
    }

    // ========================================================================
    // Current
    // ========================================================================

    /// 进入 Current 模式（Simple 策略）
    ///
    /// 之后以 20–50 ms 周期调用 [`RsBus::current_ref`]。
    pub fn enter_current(
        &mut self,
        node: u8,
        limit_torque_nm: f32,
        cur_kp: Option<f32>,
        cur_ki: Option<f32>,
    ) -> Result<(), DriverError> {
        let mut params = vec![(IDX_LIMIT_TORQUE, ParamValue::F32(limit_torque_nm))];
        push_gain(&mut params, IDX_CUR_KP, cur_kp);
        push_gain(&mut params, IDX_CUR_KI, cur_ki);
        self.bring_up_simple(node, RunMode::Current, &params)
    }

    /// 进入 Current 模式（Robust 策略）
    pub fn enter_current_robust(
        &mut self,
        node: u8,
        limit_torque_nm: f32,
        cur_kp: Option<f32>,
        cur_ki: Option<f32>,
    ) -> Result<(), DriverError> {
        let mut params = vec![(IDX_LIMIT_TORQUE, ParamValue::F32(limit_torque_nm))];
        push_gain(&mut params, IDX_CUR_KP, cur_kp);
        push_gain(&mut params, IDX_CUR_KI, cur_ki);
        self.bring_up_robust(node, RunMode::Current, &params)
    }

    // ========================================================================
    // CSP (Cyclic Synchronous Position)
    // ========================================================================

    /// 进入 CSP 模式（Simple 策略），之后用 [`RsBus::position_ref`] 下发位置
    pub fn enter_csp(
        &mut self,
        node: u8,
        limit_spd_rad_s: f32,
        limit_cur_a: f32,
        loc_kp: Option<f32>,
    ) -> Result<(), DriverError> {
        let mut params = vec![
            (IDX_LIMIT_SPD, ParamValue::F32(limit_spd_rad_s)),
            (IDX_LIMIT_CUR, ParamValue::F32(limit_cur_a)),
        ];
        push_gain(&mut params, IDX_LOC_KP, loc_kp);
        self.bring_up_simple(node, RunMode::Csp, &params)
    }

    /// 进入 CSP 模式（Robust 策略）
    pub fn enter_csp_robust(
        &mut self,
        node: u8,
        limit_spd_rad_s: f32,
        limit_cur_a: f32,
        loc_kp: Option<f32>,
    ) -> Result<(), DriverError> {
        let mut params = vec![
            (IDX_LIMIT_SPD, ParamValue::F32(limit_spd_rad_s)),
            (IDX_LIMIT_CUR, ParamValue::F32(limit_cur_a)),
            (IDX_LIMIT_CUR_LEGACY, ParamValue::F32(limit_cur_a)),
        ];
        push_gain(&mut params, IDX_LOC_KP, loc_kp);
        self.bring_up_robust(node, RunMode::Csp, &params)
    }
}
