// crates/mf_numerics/src/interpolation/advected.rs

//! 对流面插值
//!
//! 对流量的面插值输出一对矩阵权重（隐式侧系数），以及可选的
//! 高阶权重与显式右端校正。所有方案共享同一迎风判定：
//! 质量通量 ≥ 0 时 elem 侧迎风（含零通量，保证确定性）。
//!
//! 方案实例构造后不可变，逐面调用是纯函数，线程安全。
//! 标签联合派发 O(1)、无堆分配，可按值缓存在通量核里。

use glam::DVec3;

use mf_runtime::FvScalar;

use crate::limiter::VenkatakrishnanLimiter;
use crate::mesh::FaceGeometry;
use crate::types::{AdvectedInterpMethod, AdvectionConfig, ConfigError};

use super::blended::{MinmodInterp, VanLeerInterp};
use super::muscl::MusclInterp;

/// 迎风判定：质量通量 ≥ 0 时 elem 侧迎风
///
/// 非严格不等式是刻意的：零通量平局归 elem 侧，所有方案共用
/// 同一判定以保证确定性。比较只看主值，对偶数的导数不参与
/// 分支选择。
#[inline]
pub fn elem_is_upwind<S: FvScalar>(mass_flux: S) -> bool {
    mass_flux.primal() >= 0.0
}

// ============================================================
// 插值结果
// ============================================================

/// 对流插值结果
///
/// `weights_matrix` 是隐式矩阵系数：面值的矩阵贡献为
/// `w_elem·φ_C + w_neighbor·φ_N`，守恒方案满足 w_elem + w_neighbor = 1。
/// `rhs_correction` 是延迟校正的显式右端项，在隐式系统之外
/// 相加；无校正时为 `None`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvectedResult<S: FvScalar> {
    /// 隐式矩阵权重 (w_elem, w_neighbor)
    pub weights_matrix: (S, S),
    /// 高阶权重（权重混合方案输出，与矩阵权重同构）
    pub weights_high: Option<(S, S)>,
    /// 显式右端校正值
    pub rhs_correction: Option<S>,
}

impl<S: FvScalar> AdvectedResult<S> {
    /// 仅有矩阵权重的结果
    #[inline]
    pub fn matrix_only(w_elem: S, w_neighbor: S) -> Self {
        Self {
            weights_matrix: (w_elem, w_neighbor),
            weights_high: None,
            rhs_correction: None,
        }
    }

    /// 是否携带显式校正
    #[inline]
    pub fn has_correction(&self) -> bool {
        self.rhs_correction.is_some()
    }

    /// 右端校正值（无校正时为零）
    #[inline]
    pub fn rhs_face_value(&self) -> S {
        self.rhs_correction.unwrap_or(S::ZERO)
    }

    /// 矩阵权重折算的面值
    #[inline]
    pub fn matrix_value(&self, elem_value: S, neighbor_value: S) -> S {
        self.weights_matrix.0 * elem_value + self.weights_matrix.1 * neighbor_value
    }

    /// 高阶权重折算的面值
    #[inline]
    pub fn high_value(&self, elem_value: S, neighbor_value: S) -> Option<S> {
        self.weights_high
            .map(|(we, wn)| we * elem_value + wn * neighbor_value)
    }

    /// 折算最终面值：矩阵值减去右端校正
    ///
    /// 校正定义为 factor·(φ_matrix − φ_high)，因此减回去即得
    /// （可能衰减的）高阶值。
    #[inline]
    pub fn value(&self, elem_value: S, neighbor_value: S) -> S {
        self.matrix_value(elem_value, neighbor_value) - self.rhs_face_value()
    }

    /// 矩阵权重之和（守恒性检查用）
    #[inline]
    pub fn weight_sum(&self) -> S {
        self.weights_matrix.0 + self.weights_matrix.1
    }
}

// ============================================================
// 一阶迎风 / 几何平均
// ============================================================

/// 一阶迎风方案
#[derive(Debug, Clone, Copy, Default)]
pub struct UpwindInterp;

impl UpwindInterp {
    /// 计算迎风权重
    #[inline]
    pub fn advected_interpolate<S: FvScalar>(
        &self,
        _face: &FaceGeometry,
        _elem_value: S,
        _neighbor_value: S,
        _elem_grad: Option<DVec3>,
        _neighbor_grad: Option<DVec3>,
        mass_flux: S,
    ) -> AdvectedResult<S> {
        if elem_is_upwind(mass_flux) {
            AdvectedResult::matrix_only(S::ONE, S::ZERO)
        } else {
            AdvectedResult::matrix_only(S::ZERO, S::ONE)
        }
    }
}

/// 几何平均（中心差）方案
///
/// 矩阵权重与高阶权重都是 (g_C, 1−g_C)，梯度与通量被忽略。
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageInterp;

impl AverageInterp {
    /// 计算几何平均权重
    #[inline]
    pub fn advected_interpolate<S: FvScalar>(
        &self,
        face: &FaceGeometry,
        _elem_value: S,
        _neighbor_value: S,
        _elem_grad: Option<DVec3>,
        _neighbor_grad: Option<DVec3>,
        _mass_flux: S,
    ) -> AdvectedResult<S> {
        let w = S::from_f64(face.g_c);
        let weights = (w, S::ONE - w);
        AdvectedResult {
            weights_matrix: weights,
            weights_high: Some(weights),
            rhs_correction: None,
        }
    }
}

// ============================================================
// 方案派发
// ============================================================

/// 对流插值方案（标签联合）
#[derive(Debug, Clone, Copy)]
pub enum AdvectedScheme {
    /// 一阶迎风
    Upwind(UpwindInterp),
    /// 几何平均
    Average(AverageInterp),
    /// Minmod 权重混合
    Minmod(MinmodInterp),
    /// Van Leer（权重混合 / 延迟校正）
    VanLeer(VanLeerInterp),
    /// Venkatakrishnan MUSCL + 延迟校正
    Venkatakrishnan(MusclInterp),
}

impl AdvectedScheme {
    /// 计算对流插值结果
    #[inline]
    pub fn advected_interpolate<S: FvScalar>(
        &self,
        face: &FaceGeometry,
        elem_value: S,
        neighbor_value: S,
        elem_grad: Option<DVec3>,
        neighbor_grad: Option<DVec3>,
        mass_flux: S,
    ) -> AdvectedResult<S> {
        match self {
            Self::Upwind(s) => s.advected_interpolate(
                face,
                elem_value,
                neighbor_value,
                elem_grad,
                neighbor_grad,
                mass_flux,
            ),
            Self::Average(s) => s.advected_interpolate(
                face,
                elem_value,
                neighbor_value,
                elem_grad,
                neighbor_grad,
                mass_flux,
            ),
            Self::Minmod(s) => s.advected_interpolate(
                face,
                elem_value,
                neighbor_value,
                elem_grad,
                neighbor_grad,
                mass_flux,
            ),
            Self::VanLeer(s) => s.advected_interpolate(
                face,
                elem_value,
                neighbor_value,
                elem_grad,
                neighbor_grad,
                mass_flux,
            ),
            Self::Venkatakrishnan(s) => s.advected_interpolate(
                face,
                elem_value,
                neighbor_value,
                elem_grad,
                neighbor_grad,
                mass_flux,
            ),
        }
    }

    /// 折算为单个面值
    #[inline]
    pub fn advected_interpolate_value<S: FvScalar>(
        &self,
        face: &FaceGeometry,
        elem_value: S,
        neighbor_value: S,
        elem_grad: Option<DVec3>,
        neighbor_grad: Option<DVec3>,
        mass_flux: S,
    ) -> S {
        self.advected_interpolate(
            face,
            elem_value,
            neighbor_value,
            elem_grad,
            neighbor_grad,
            mass_flux,
        )
        .value(elem_value, neighbor_value)
    }

    /// 方案是否需要梯度输入
    pub fn needs_gradients(&self) -> bool {
        matches!(
            self,
            Self::Minmod(_) | Self::VanLeer(_) | Self::Venkatakrishnan(_)
        )
    }

    /// 方案名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upwind(_) => "upwind",
            Self::Average(_) => "average",
            Self::Minmod(_) => "minmod",
            Self::VanLeer(_) => "van_leer",
            Self::Venkatakrishnan(_) => "venkatakrishnan_muscl",
        }
    }
}

/// 根据配置创建对流插值方案
///
/// 配置在这里一次性校验，方案实例随后不可变。
/// `mesh_scale` 供 Venkatakrishnan 限制器的 ε² 使用。
pub fn create_advected_scheme(
    config: &AdvectionConfig,
    mesh_scale: f64,
) -> Result<AdvectedScheme, ConfigError> {
    config.validate()?;
    let scheme = match config.method {
        AdvectedInterpMethod::Upwind => AdvectedScheme::Upwind(UpwindInterp),
        AdvectedInterpMethod::Average => AdvectedScheme::Average(AverageInterp),
        AdvectedInterpMethod::Minmod => AdvectedScheme::Minmod(MinmodInterp::new(config.blend)),
        AdvectedInterpMethod::VanLeer => {
            AdvectedScheme::VanLeer(VanLeerInterp::new(config.blend, config.deferred))
        }
        AdvectedInterpMethod::Venkatakrishnan => AdvectedScheme::Venkatakrishnan(MusclInterp::new(
            VenkatakrishnanLimiter::new(config.venkat_k, mesh_scale),
            config.deferred.deferred_correction_factor,
        )),
    };
    Ok(scheme)
}
