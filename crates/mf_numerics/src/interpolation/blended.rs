// crates/mf_numerics/src/interpolation/blended.rs

//! 权重混合对流插值
//!
//! 限制混合的核心流程：
//!
//! 1. 按迎风判定整理两侧值与迎风梯度
//! 2. 限制器给出 β ∈ [0, 1]
//! 3. 取迎风侧几何权重 w_f，高阶余量为 1 − w_f
//! 4. 混合量 g = blending_factor · β · (1 − w_f)，
//!    limit_to_linear 时钳制到 [0, 1 − w_f]
//! 5. w_upwind = 1 − g，w_downwind = g，映射回 (w_elem, w_neighbor)
//!
//! 钳制保证混合永远不比纯线性插值更偏顺风，这是抗振荡的
//! 关键约束。输出直接作为矩阵权重，适合全隐式装配，代价是
//! 外层 Picard 迭代中梯度滞后一步。

use glam::DVec3;

use mf_runtime::FvScalar;

use crate::limiter::{FaceLimitContext, FaceLimiter, MinmodLimiter, VanLeerLimiter};
use crate::mesh::FaceGeometry;
use crate::types::{BlendedInterpConfig, DeferredCorrectionConfig};

use super::advected::{elem_is_upwind, AdvectedResult};

/// 限制混合权重，返回 (w_elem, w_neighbor)
pub(super) fn limited_blend_weights<S, L>(
    limiter: &L,
    blend: &BlendedInterpConfig,
    face: &FaceGeometry,
    elem_value: S,
    neighbor_value: S,
    elem_grad: Option<DVec3>,
    neighbor_grad: Option<DVec3>,
    mass_flux: S,
) -> (S, S)
where
    S: FvScalar,
    L: FaceLimiter<S>,
{
    let elem_up = elem_is_upwind(mass_flux);
    let ctx = FaceLimitContext::from_face(
        face,
        elem_value,
        neighbor_value,
        elem_grad,
        neighbor_grad,
        elem_up,
    );
    let beta = limiter.limit(&ctx);

    // 迎风侧几何权重与高阶余量
    let w_f = if elem_up { face.g_c } else { 1.0 - face.g_c };
    let headroom = 1.0 - w_f;

    let mut g = S::from_f64(blend.blending_factor) * beta * S::from_f64(headroom);
    if blend.limit_to_linear {
        g = g.clamp_value(S::ZERO, S::from_f64(headroom));
    }

    let w_upwind = S::ONE - g;
    if elem_up {
        (w_upwind, g)
    } else {
        (g, w_upwind)
    }
}

// ============================================================
// Minmod
// ============================================================

/// Minmod 权重混合方案
///
/// 混合权重即最终矩阵权重，无高阶/低阶拆分，无延迟校正。
#[derive(Debug, Clone, Copy)]
pub struct MinmodInterp {
    limiter: MinmodLimiter,
    blend: BlendedInterpConfig,
}

impl MinmodInterp {
    /// 按混合配置创建
    pub fn new(blend: BlendedInterpConfig) -> Self {
        Self {
            limiter: MinmodLimiter::new(),
            blend,
        }
    }

    /// 计算混合权重
    pub fn advected_interpolate<S: FvScalar>(
        &self,
        face: &FaceGeometry,
        elem_value: S,
        neighbor_value: S,
        elem_grad: Option<DVec3>,
        neighbor_grad: Option<DVec3>,
        mass_flux: S,
    ) -> AdvectedResult<S> {
        let (w_elem, w_neighbor) = limited_blend_weights(
            &self.limiter,
            &self.blend,
            face,
            elem_value,
            neighbor_value,
            elem_grad,
            neighbor_grad,
            mass_flux,
        );
        AdvectedResult::matrix_only(w_elem, w_neighbor)
    }
}

// ============================================================
// Van Leer
// ============================================================

/// Van Leer 方案（权重混合 / 延迟校正双模式）
///
/// 延迟校正关闭时等同于权重混合：矩阵权重就是限制混合。
/// 开启时矩阵权重固定为纯迎风（对角占优，隐式侧永远安全），
/// 限制混合进入高阶权重，差量乘校正系数写入显式右端。
#[derive(Debug, Clone, Copy)]
pub struct VanLeerInterp {
    limiter: VanLeerLimiter,
    blend: BlendedInterpConfig,
    deferred: DeferredCorrectionConfig,
}

impl VanLeerInterp {
    /// 按混合与延迟校正配置创建
    pub fn new(blend: BlendedInterpConfig, deferred: DeferredCorrectionConfig) -> Self {
        Self {
            limiter: VanLeerLimiter::new(),
            blend,
            deferred,
        }
    }

    /// 计算插值结果
    pub fn advected_interpolate<S: FvScalar>(
        &self,
        face: &FaceGeometry,
        elem_value: S,
        neighbor_value: S,
        elem_grad: Option<DVec3>,
        neighbor_grad: Option<DVec3>,
        mass_flux: S,
    ) -> AdvectedResult<S> {
        let high = limited_blend_weights(
            &self.limiter,
            &self.blend,
            face,
            elem_value,
            neighbor_value,
            elem_grad,
            neighbor_grad,
            mass_flux,
        );

        if !self.deferred.use_deferred_correction {
            return AdvectedResult {
                weights_matrix: high,
                weights_high: Some(high),
                rhs_correction: None,
            };
        }

        let matrix = if elem_is_upwind(mass_flux) {
            (S::ONE, S::ZERO)
        } else {
            (S::ZERO, S::ONE)
        };
        let phi_matrix = matrix.0 * elem_value + matrix.1 * neighbor_value;
        let phi_high = high.0 * elem_value + high.1 * neighbor_value;
        let rhs = S::from_f64(self.deferred.deferred_correction_factor) * (phi_matrix - phi_high);

        AdvectedResult {
            weights_matrix: matrix,
            weights_high: Some(high),
            rhs_correction: Some(rhs),
        }
    }
}
