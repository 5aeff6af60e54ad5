// crates/mf_numerics/src/limiter/venkatakrishnan.rs

//! Venkatakrishnan 面限制器
//!
//! 光滑限制器，避免 Minmod/Van Leer 在斜率比切换处的梯度突变。
//! 以面点外推增量 Δ_f = ∇φ_up · (x_f − x_up) 与允许增量 Δ_max/Δ_min
//! 为输入，用光滑函数代替硬 min 操作：
//!
//! ```text
//! β(x, y) = ((y² + ε²)x + 2x²y) / ((y² + 2x² + xy + ε²) · x)
//! ```
//!
//! ε² = (K·h)³ 控制限制强度，h 为网格特征尺度。
//!
//! # K 参数选择
//! - 0.1-0.3: 强限制，激波/溃坝
//! - 0.3-1.0: 中等限制，通用场景
//! - 1.0-5.0: 弱限制，光滑流动
//!
//! # 注意事项
//! 默认构造使用 mesh_scale=1.0，实际使用前必须用
//! `update_mesh_scale()` 按真实网格尺度更新。
//!
//! # 参考文献
//! Venkatakrishnan, V. (1993). "On the accuracy of limiters and
//! convergence to steady state solutions". AIAA Paper 93-0880.

use mf_runtime::FvScalar;

use super::traits::{FaceLimitContext, FaceLimiter};

/// Venkatakrishnan 限制器
#[derive(Debug, Clone, Copy)]
pub struct VenkatakrishnanLimiter {
    k: f64,
    eps_squared: f64,
    tol: f64,
}

impl VenkatakrishnanLimiter {
    /// 创建新的限制器
    ///
    /// # 参数
    /// - `k`: K 参数，控制限制强度
    /// - `mesh_scale`: 网格特征尺度
    pub fn new(k: f64, mesh_scale: f64) -> Self {
        let kh = k * mesh_scale;
        Self {
            k,
            eps_squared: kh * kh * kh,
            tol: 1e-12,
        }
    }

    /// 自定义退化容差
    pub fn with_tolerance(k: f64, mesh_scale: f64, tol: f64) -> Self {
        let mut limiter = Self::new(k, mesh_scale);
        limiter.tol = tol;
        limiter
    }

    /// 适合激波捕获的预设 (K=0.1)
    pub fn for_shock_capturing(mesh_scale: f64) -> Self {
        Self::new(0.1, mesh_scale)
    }

    /// 适合光滑流动的预设 (K=2.0)
    pub fn for_smooth_flow(mesh_scale: f64) -> Self {
        Self::new(2.0, mesh_scale)
    }

    /// 获取 K 参数
    #[inline]
    pub fn k(&self) -> f64 {
        self.k
    }

    /// 获取 ε²
    #[inline]
    pub fn eps_squared(&self) -> f64 {
        self.eps_squared
    }

    /// 更新网格尺度
    pub fn update_mesh_scale(&mut self, mesh_scale: f64) {
        let kh = self.k * mesh_scale;
        self.eps_squared = kh * kh * kh;
    }

    /// 光滑限制函数，x > 0
    #[inline]
    fn beta<S: FvScalar>(&self, x: S, y: S) -> S {
        let eps2 = S::from_f64(self.eps_squared);
        let x2 = x * x;
        let y2 = y * y;

        let numerator = (y2 + eps2) * x + S::TWO * x2 * y;
        let denominator = (y2 + S::TWO * x2 + x * y + eps2) * x;

        if denominator.primal().abs() < self.tol {
            S::ONE
        } else {
            (numerator / denominator).min(S::ONE)
        }
    }
}

impl Default for VenkatakrishnanLimiter {
    /// 默认 K=1.0、mesh_scale=1.0，使用前按真实尺度更新
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl<S: FvScalar> FaceLimiter<S> for VenkatakrishnanLimiter {
    fn limit(&self, ctx: &FaceLimitContext<'_, S>) -> S {
        debug_assert!(ctx.grad_upwind.is_some(), "限制器方案需要迎风侧梯度");
        let grad = match ctx.grad_upwind {
            Some(g) => g,
            None => return S::ONE,
        };

        // 倾斜校正后的面点外推增量
        let dx = ctx.face.face_point() - ctx.upwind_centroid();
        let delta = grad.dot(dx);
        if delta.abs() < self.tol {
            return S::ONE;
        }

        let delta_span = ctx.phi_downwind - ctx.phi_upwind;
        if delta > 0.0 {
            let delta_max = match ctx.max_value {
                Some(m) => m - ctx.phi_upwind,
                None => delta_span.max(S::ZERO),
            };
            if delta_max.primal() < self.tol {
                return S::ZERO;
            }
            self.beta(S::from_f64(delta), delta_max)
        } else {
            let delta_min = match ctx.min_value {
                Some(m) => m - ctx.phi_upwind,
                None => delta_span.min(S::ZERO),
            };
            if delta_min.primal() > -self.tol {
                return S::ZERO;
            }
            self.beta(S::from_f64(-delta), -delta_min)
        }
    }

    fn name(&self) -> &'static str {
        "venkatakrishnan"
    }
}
