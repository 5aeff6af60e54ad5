// crates/mf_runtime/src/tolerance.rs

//! 数值容差配置
//!
//! 插值/重构内核里出现的保护性阈值统一放在这里：调和平均的保号
//! 下限、法方程奇异判据、正性守卫余量等。它们是可配置的默认值，
//! 不是硬不变量——各配置结构体的 `Default` 引用此处的常量。

use crate::scalar::FvScalar;

/// 调和平均 / 斜率比分母的保号下限（f64 默认）
pub const DEFAULT_SIGN_EPS: f64 = 1e-14;

/// 法方程行列式奇异阈值（f64 默认）
pub const DEFAULT_DET_EPS: f64 = 1e-20;

/// 限制器斜率比分母退化阈值（f64 默认）
pub const DEFAULT_RATIO_EPS: f64 = 1e-12;

/// 正性守卫余量（f64 默认）
pub const DEFAULT_POSITIVITY_EPS: f64 = 1e-8;

/// 守恒权重求和校验容差
pub const DEFAULT_WEIGHT_SUM_TOL: f64 = 1e-12;

/// 分母退化时斜率比的封顶值
pub const BIG_RATIO: f64 = 1e6;

/// 数值容差配置（泛型化）
///
/// 通过泛型参数 `S` 支持 f32/f64 精度切换；对偶数路径使用其基础
/// 精度的默认值即可。
#[derive(Clone)]
pub struct NumericTolerance<S: FvScalar> {
    /// 保号下限（调和平均防除零）
    pub sign_eps: S,
    /// 法方程行列式奇异阈值
    pub det_eps: S,
    /// 斜率比分母退化阈值
    pub ratio_eps: S,
    /// 正性守卫余量
    pub positivity_eps: S,
}

impl<S: FvScalar> NumericTolerance<S> {
    /// 从 f64 配置创建
    pub fn from_config(sign_eps: f64, det_eps: f64, ratio_eps: f64, positivity_eps: f64) -> Self {
        Self {
            sign_eps: S::from_f64(sign_eps),
            det_eps: S::from_f64(det_eps),
            ratio_eps: S::from_f64(ratio_eps),
            positivity_eps: S::from_f64(positivity_eps),
        }
    }

    /// 行列式是否退化（按主值判断）
    #[inline]
    pub fn is_degenerate_det(&self, det: S) -> bool {
        det.abs().primal() < self.det_eps.primal()
    }

    /// 分母是否退化
    #[inline]
    pub fn is_degenerate_denominator(&self, den: S) -> bool {
        den.abs().primal() < self.ratio_eps.primal()
    }
}

impl Default for NumericTolerance<f64> {
    fn default() -> Self {
        Self {
            sign_eps: DEFAULT_SIGN_EPS,
            det_eps: DEFAULT_DET_EPS,
            ratio_eps: DEFAULT_RATIO_EPS,
            positivity_eps: DEFAULT_POSITIVITY_EPS,
        }
    }
}

impl Default for NumericTolerance<f32> {
    fn default() -> Self {
        Self {
            sign_eps: 1e-6,
            det_eps: 1e-10,
            ratio_eps: 1e-5,
            positivity_eps: 1e-4,
        }
    }
}

impl<S: FvScalar> std::fmt::Debug for NumericTolerance<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumericTolerance")
            .field("sign_eps", &self.sign_eps)
            .field("det_eps", &self.det_eps)
            .field("ratio_eps", &self.ratio_eps)
            .field("positivity_eps", &self.positivity_eps)
            .finish()
    }
}
