// crates/mf_numerics/src/limiter/minmod.rs

//! Minmod 面限制器
//!
//! 最耗散的经典 TVD 限制器：β = max(0, min(1, r))。
//! 间断处完全退回一阶，光滑区域有一定过度耗散，换取
//! 无条件稳定。
//!
//! # 适用场景
//!
//! - 强激波或水跃
//! - 干湿交界处
//! - 需要无条件稳定的情况

use mf_runtime::tolerance::DEFAULT_RATIO_EPS;
use mf_runtime::FvScalar;

use super::traits::{slope_ratio, FaceLimitContext, FaceLimiter};

/// Minmod 限制器
#[derive(Debug, Clone, Copy)]
pub struct MinmodLimiter {
    /// 分母退化判定容差
    ratio_eps: f64,
}

impl Default for MinmodLimiter {
    fn default() -> Self {
        Self {
            ratio_eps: DEFAULT_RATIO_EPS,
        }
    }
}

impl MinmodLimiter {
    /// 创建新的 Minmod 限制器
    pub fn new() -> Self {
        Self::default()
    }

    /// 自定义分母容差
    pub fn with_tolerance(ratio_eps: f64) -> Self {
        Self { ratio_eps }
    }
}

impl<S: FvScalar> FaceLimiter<S> for MinmodLimiter {
    #[inline]
    fn limit(&self, ctx: &FaceLimitContext<'_, S>) -> S {
        let r = slope_ratio(ctx, self.ratio_eps);
        r.max(S::ZERO).min(S::ONE)
    }

    fn name(&self) -> &'static str {
        "minmod"
    }
}
