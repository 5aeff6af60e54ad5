// crates/mf_numerics/src/interpolation/face.rs

//! 非对流面插值
//!
//! 从两侧单元均值计算面值的无状态方案。用标签联合派发，
//! 热循环逐面调用 O(1)、零堆分配。

use serde::{Deserialize, Serialize};

use mf_runtime::tolerance::DEFAULT_SIGN_EPS;
use mf_runtime::FvScalar;

use crate::mesh::FaceGeometry;

/// 几何平均（线性）插值: g_C·φ_C + (1−g_C)·φ_N
#[inline]
pub fn geometric_average<S: FvScalar>(g_c: f64, elem_value: S, neighbor_value: S) -> S {
    let w = S::from_f64(g_c);
    w * elem_value + (S::ONE - w) * neighbor_value
}

/// 调和平均插值: 1 / (g_C/φ_C + (1−g_C)/φ_N)
///
/// 要求两侧同号（debug 断言）。量值小于 `sign_eps` 时用保号
/// 下限替换，避免除零。扩散系数等正定量的面插值用它而不是
/// 几何平均，界面两侧系数悬殊时调和平均给出正确的串联阻值。
#[inline]
pub fn harmonic_average<S: FvScalar>(
    g_c: f64,
    elem_value: S,
    neighbor_value: S,
    sign_eps: f64,
) -> S {
    debug_assert!(
        elem_value.primal() * neighbor_value.primal() >= 0.0,
        "调和平均要求两侧同号"
    );
    let e = elem_value.signed_floor(sign_eps);
    let n = neighbor_value.signed_floor(sign_eps);
    let w = S::from_f64(g_c);
    S::ONE / (w / e + (S::ONE - w) / n)
}

/// 面插值方案
///
/// 标签联合保证逐面派发 O(1) 且无堆分配，可按值缓存在
/// 通量核实例里。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FaceInterpolator {
    /// 几何平均（线性混合）
    GeometricAverage,
    /// 调和平均（倒数混合，符号守卫）
    HarmonicAverage {
        /// 保号除零下限
        sign_eps: f64,
    },
}

impl Default for FaceInterpolator {
    fn default() -> Self {
        Self::GeometricAverage
    }
}

impl FaceInterpolator {
    /// 默认参数的调和平均
    pub fn harmonic() -> Self {
        Self::HarmonicAverage {
            sign_eps: DEFAULT_SIGN_EPS,
        }
    }

    /// 计算面值
    #[inline]
    pub fn interpolate<S: FvScalar>(
        &self,
        face: &FaceGeometry,
        elem_value: S,
        neighbor_value: S,
    ) -> S {
        match self {
            Self::GeometricAverage => geometric_average(face.g_c, elem_value, neighbor_value),
            Self::HarmonicAverage { sign_eps } => {
                debug_assert!(!face.is_boundary(), "调和平均仅对内部面有意义");
                harmonic_average(face.g_c, elem_value, neighbor_value, *sign_eps)
            }
        }
    }

    /// 方案名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::GeometricAverage => "geometric_average",
            Self::HarmonicAverage { .. } => "harmonic_average",
        }
    }
}
