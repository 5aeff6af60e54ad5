// crates/mf_numerics/src/limiter/traits.rs

//! 面限制器 trait 与上下文结构
//!
//! 限制系数 β ∈ [0, 1]：β = 1 完全不限制（允许全量高阶混合），
//! β = 0 退回一阶迎风。对流插值方案在每个面上调用一次限制器，
//! 调用是纯函数，不修改任何实例状态。

use std::fmt::Debug;

use glam::DVec3;

use mf_runtime::tolerance::BIG_RATIO;
use mf_runtime::FvScalar;

use crate::mesh::FaceGeometry;

// ============================================================
// 上下文
// ============================================================

/// 面限制器计算所需的上下文
///
/// 所有量已按迎风方向整理：`connecting` 从迎风单元质心指向
/// 顺风单元质心（elem 侧迎风时即 d_CN，否则为 −d_CN）。
#[derive(Debug, Clone, Copy)]
pub struct FaceLimitContext<'a, S: FvScalar> {
    /// 迎风侧单元均值
    pub phi_upwind: S,
    /// 顺风侧单元均值
    pub phi_downwind: S,
    /// 迎风侧梯度（限制器的核心输入）
    pub grad_upwind: Option<DVec3>,
    /// 顺风侧梯度（仅个别方案使用）
    pub grad_downwind: Option<DVec3>,
    /// 迎风质心指向顺风质心的连线向量
    pub connecting: DVec3,
    /// 允许的上界（缺省时由两侧均值推出）
    pub max_value: Option<S>,
    /// 允许的下界
    pub min_value: Option<S>,
    /// 面几何
    pub face: &'a FaceGeometry,
    /// elem 侧是否迎风
    pub is_elem_upwind: bool,
}

impl<'a, S: FvScalar> FaceLimitContext<'a, S> {
    /// 按迎风侧整理 elem/neighbor 两侧数据
    pub fn from_face(
        face: &'a FaceGeometry,
        elem_value: S,
        neighbor_value: S,
        elem_grad: Option<DVec3>,
        neighbor_grad: Option<DVec3>,
        is_elem_upwind: bool,
    ) -> Self {
        let (phi_upwind, phi_downwind, grad_upwind, grad_downwind, connecting) = if is_elem_upwind
        {
            (elem_value, neighbor_value, elem_grad, neighbor_grad, face.d_cn)
        } else {
            (neighbor_value, elem_value, neighbor_grad, elem_grad, -face.d_cn)
        };
        Self {
            phi_upwind,
            phi_downwind,
            grad_upwind,
            grad_downwind,
            connecting,
            max_value: None,
            min_value: None,
            face,
            is_elem_upwind,
        }
    }

    /// 附加允许的上下界
    pub fn with_bounds(mut self, max_value: Option<S>, min_value: Option<S>) -> Self {
        self.max_value = max_value;
        self.min_value = min_value;
        self
    }

    /// 迎风侧单元质心
    #[inline]
    pub fn upwind_centroid(&self) -> DVec3 {
        if self.is_elem_upwind {
            self.face.elem_centroid
        } else {
            self.face.neighbor_centroid
        }
    }
}

// ============================================================
// Trait
// ============================================================

/// 面限制器 trait
///
/// 实现方从迎风/顺风状态计算 β ∈ [0, 1]。迎风侧梯度是限制器
/// 方案的必要输入，缺失时 debug 构建断言失败，release 构建
/// 按零投影继续（结果退向一阶）。
pub trait FaceLimiter<S: FvScalar>: Debug {
    /// 计算限制系数 β ∈ [0, 1]
    fn limit(&self, ctx: &FaceLimitContext<'_, S>) -> S;

    /// 限制器名称
    fn name(&self) -> &'static str;
}

/// 无限制（β 恒为 1）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimiter;

impl<S: FvScalar> FaceLimiter<S> for NoLimiter {
    #[inline]
    fn limit(&self, _ctx: &FaceLimitContext<'_, S>) -> S {
        S::ONE
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

// ============================================================
// 斜率比
// ============================================================

/// 斜率比 r = 2(∇φ_up · d) / (φ_down − φ_up) − 1
///
/// TVD 限制器的标准输入。分母退化（面两侧近乎均匀）时按梯度
/// 投影的符号返回 ±BIG_RATIO，避免除零又保留方向信息。
pub(crate) fn slope_ratio<S: FvScalar>(ctx: &FaceLimitContext<'_, S>, ratio_eps: f64) -> S {
    debug_assert!(ctx.grad_upwind.is_some(), "限制器方案需要迎风侧梯度");
    let proj = ctx.grad_upwind.map_or(0.0, |g| g.dot(ctx.connecting));

    let delta = ctx.phi_downwind - ctx.phi_upwind;
    if delta.primal().abs() < ratio_eps {
        let r = if proj >= 0.0 { BIG_RATIO } else { -BIG_RATIO };
        return S::from_f64(r);
    }
    S::from_f64(2.0 * proj) / delta - S::ONE
}
