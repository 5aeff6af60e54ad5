// crates/mf_numerics/src/limiter/van_leer.rs

//! Van Leer 面限制器
//!
//! 光滑 TVD 限制器：β = min(1, (r + |r|) / (1 + |r|))。
//! 原始 Van Leer 函数上界为 2（压缩性分支），这里钳制到 1，
//! 保证权重混合永远落在 TVD 区间内。
//!
//! # 特点
//!
//! - 光滑可微，固定点迭代收敛性好
//! - 耗散介于 Minmod 与不限制之间
//! - 通用默认选择

use mf_runtime::tolerance::DEFAULT_RATIO_EPS;
use mf_runtime::FvScalar;

use super::traits::{slope_ratio, FaceLimitContext, FaceLimiter};

/// Van Leer 限制器
#[derive(Debug, Clone, Copy)]
pub struct VanLeerLimiter {
    /// 分母退化判定容差
    ratio_eps: f64,
}

impl Default for VanLeerLimiter {
    fn default() -> Self {
        Self {
            ratio_eps: DEFAULT_RATIO_EPS,
        }
    }
}

impl VanLeerLimiter {
    /// 创建新的 Van Leer 限制器
    pub fn new() -> Self {
        Self::default()
    }

    /// 自定义分母容差
    pub fn with_tolerance(ratio_eps: f64) -> Self {
        Self { ratio_eps }
    }
}

impl<S: FvScalar> FaceLimiter<S> for VanLeerLimiter {
    #[inline]
    fn limit(&self, ctx: &FaceLimitContext<'_, S>) -> S {
        let r = slope_ratio(ctx, self.ratio_eps);
        let abs_r = r.abs();
        ((r + abs_r) / (S::ONE + abs_r)).min(S::ONE)
    }

    fn name(&self) -> &'static str {
        "van_leer"
    }
}
