// crates/mf_numerics/src/limiter/mod.rs

//! # 面限制器模块
//!
//! 从迎风/顺风状态计算限制系数 β ∈ [0, 1]，供对流插值方案
//! 调制高阶混合量：
//!
//! - `FaceLimiter` - 限制器 trait 定义
//! - `NoLimiter` - 无限制（β = 1）
//! - `MinmodLimiter` - Minmod（最耗散）
//! - `VanLeerLimiter` - Van Leer（光滑，默认）
//! - `VenkatakrishnanLimiter` - Venkatakrishnan（光滑，保单调）
//!
//! ## 限制器选择指南
//!
//! | 限制器 | 耗散性 | 光滑性 | 适用场景 |
//! |--------|--------|--------|----------|
//! | Minmod | 高 | 不光滑 | 强间断，需要最大稳定性 |
//! | Van Leer | 中等 | 光滑 | 通用推荐 |
//! | Venkatakrishnan | 低 | 光滑 | 定常收敛、MUSCL 重构 |

mod minmod;
mod traits;
mod van_leer;
mod venkatakrishnan;

pub use minmod::MinmodLimiter;
pub use traits::{FaceLimitContext, FaceLimiter, NoLimiter};
pub use van_leer::VanLeerLimiter;
pub use venkatakrishnan::VenkatakrishnanLimiter;

use crate::types::LimiterKind;
use mf_runtime::FvScalar;

/// 根据配置创建限制器实例
///
/// # 参数
/// * `kind` - 限制器种类
/// * `k` - Venkatakrishnan K 参数（其他种类忽略）
/// * `mesh_scale` - 网格特征尺度（Venkatakrishnan 使用）
pub fn create_limiter(
    kind: LimiterKind,
    k: f64,
    mesh_scale: f64,
) -> Box<dyn FaceLimiter<f64> + Send + Sync> {
    match kind {
        LimiterKind::None => Box::new(NoLimiter),
        LimiterKind::Minmod => Box::new(MinmodLimiter::new()),
        LimiterKind::VanLeer => Box::new(VanLeerLimiter::new()),
        LimiterKind::Venkatakrishnan => Box::new(VenkatakrishnanLimiter::new(k, mesh_scale)),
    }
}

/// 批量评估多个面的限制系数
///
/// 面循环外提前组好上下文时一次算完整批；`out` 与 `contexts`
/// 等长（debug 断言），逐位写入 β。
pub fn limit_batch<S: FvScalar, L: FaceLimiter<S> + ?Sized>(
    limiter: &L,
    contexts: &[FaceLimitContext<'_, S>],
    out: &mut [S],
) {
    debug_assert_eq!(contexts.len(), out.len(), "批量限制器输入输出长度不符");
    for (beta, ctx) in out.iter_mut().zip(contexts) {
        *beta = limiter.limit(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    use crate::mesh::FaceGeometry;

    fn unit_face() -> FaceGeometry {
        FaceGeometry::interior(
            DVec3::new(0.5, 0.5, 0.0),
            DVec3::new(1.5, 0.5, 0.0),
            DVec3::new(1.0, 0.5, 0.0),
            DVec3::X,
            1.0,
        )
    }

    #[test]
    fn test_create_limiter_names() {
        assert_eq!(create_limiter(LimiterKind::None, 1.0, 1.0).name(), "none");
        assert_eq!(
            create_limiter(LimiterKind::Minmod, 1.0, 1.0).name(),
            "minmod"
        );
        assert_eq!(
            create_limiter(LimiterKind::VanLeer, 1.0, 1.0).name(),
            "van_leer"
        );
        assert_eq!(
            create_limiter(LimiterKind::Venkatakrishnan, 5.0, 1.0).name(),
            "venkatakrishnan"
        );
    }

    #[test]
    fn test_factory_limiters_agree_on_linear_field() {
        // 线性场上所有限制器都不应限制
        let face = unit_face();
        let ctx = FaceLimitContext::from_face(&face, 0.5, 1.5, Some(DVec3::X), None, true);
        for kind in [LimiterKind::None, LimiterKind::Minmod, LimiterKind::VanLeer] {
            let limiter = create_limiter(kind, 1.0, 1.0);
            let beta = limiter.limit(&ctx);
            assert!(
                (beta - 1.0).abs() < 1e-12,
                "{} 在线性场上 β = {}",
                limiter.name(),
                beta
            );
        }
    }

    #[test]
    fn test_limit_batch_matches_single_calls() {
        let face = unit_face();
        // 三种梯度方向: 顺梯度、逆梯度、零梯度
        let contexts = [
            FaceLimitContext::from_face(&face, 0.5, 1.5, Some(DVec3::X), None, true),
            FaceLimitContext::from_face(&face, 1.5, 0.5, Some(DVec3::X), None, true),
            FaceLimitContext::from_face(&face, 1.0, 1.0, Some(DVec3::ZERO), None, true),
        ];
        let limiter = MinmodLimiter::new();
        let mut batch = [0.0_f64; 3];
        limit_batch(&limiter, &contexts, &mut batch);
        for (i, ctx) in contexts.iter().enumerate() {
            let single = limiter.limit(ctx);
            assert!(
                (batch[i] - single).abs() < 1e-15,
                "批量与逐面结果不一致: 面 {} 批量 {} 逐面 {}",
                i,
                batch[i],
                single
            );
        }
    }

    #[test]
    fn test_limit_batch_through_trait_object() {
        let face = unit_face();
        let contexts = [FaceLimitContext::from_face(
            &face,
            0.5,
            1.5,
            Some(DVec3::X),
            None,
            true,
        )];
        let limiter = create_limiter(LimiterKind::VanLeer, 1.0, 1.0);
        let mut out = [0.0_f64; 1];
        limit_batch(limiter.as_ref(), &contexts, &mut out);
        assert!((out[0] - 1.0).abs() < 1e-12, "线性场批量 β = {}", out[0]);
    }
}
