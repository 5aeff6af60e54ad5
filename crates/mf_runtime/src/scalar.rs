// crates/mf_runtime/src/scalar.rs

//! 插值标量抽象
//!
//! `FvScalar` 是数值内核对标量类型的唯一约束入口：
//! - `f32` / `f64` 直接实现，提供常规实数路径；
//! - 二元对偶数 [`crate::dual::Dual2`] 同样实现，使插值/重构例程
//!   在同一份代码上顺带产出对面两侧自由度的雅可比贡献。
//!
//! # 设计
//!
//! 与按精度密封的标量 trait 不同，本 trait 刻意保持开放（对偶数需要
//! 加入），并把约束面压缩到数值内核真正用到的运算：四则、取反、比较、
//! `abs/min/max/sqrt` 与少量保护性辅助。比较语义约定为"只看主值"，
//! 以保证实数与对偶数走完全相同的分支结构。

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// 数值内核标量 trait
///
/// 实现者：`f32`、`f64`、`Dual2<f32>`、`Dual2<f64>`。
pub trait FvScalar:
    Copy
    + Clone
    + Debug
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// 零值
    const ZERO: Self;
    /// 单位值
    const ONE: Self;
    /// 常量 2
    const TWO: Self;
    /// 常量 0.5
    const HALF: Self;

    /// 从 f64 构造（对偶数得到零导数的常量）
    fn from_f64(v: f64) -> Self;

    /// 主值（对偶数取实部）
    ///
    /// 分支判断一律基于主值，保证实数与对偶数路径分支一致。
    fn primal(self) -> f64;

    /// 绝对值
    fn abs(self) -> Self;

    /// 平方根
    fn sqrt(self) -> Self;

    /// 两者较小值（按主值比较）
    fn min(self, other: Self) -> Self;

    /// 两者较大值（按主值比较）
    fn max(self, other: Self) -> Self;

    /// 保号下限：`copysign(max(|v|, eps), v)`
    ///
    /// 调和平均与斜率比计算用它避免除零；当 `|v| >= eps` 时原样返回
    /// （导数保持），否则退化为常量 `±eps`。
    fn signed_floor(self, eps: f64) -> Self;

    /// 主值是否有限（非 NaN/Inf）
    fn is_finite_value(self) -> bool;

    /// 限制到闭区间 [lo, hi]
    #[inline]
    fn clamp_value(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }

    /// 限制到 [0, 1]
    #[inline]
    fn clamp01(self) -> Self {
        self.clamp_value(Self::ZERO, Self::ONE)
    }

    /// 主值是否接近零
    #[inline]
    fn is_near_zero(self, tol: f64) -> bool {
        self.abs().primal() < tol
    }

    /// 主值近似相等
    #[inline]
    fn approx_eq(self, other: Self, tol: f64) -> bool {
        (self - other).abs().primal() < tol
    }
}

// ============================================================
// f64 实现
// ============================================================

impl FvScalar for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const TWO: Self = 2.0;
    const HALF: Self = 0.5;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn primal(self) -> f64 {
        self
    }

    #[inline]
    fn abs(self) -> Self {
        f64::abs(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        f64::min(self, other)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        f64::max(self, other)
    }

    #[inline]
    fn signed_floor(self, eps: f64) -> Self {
        if f64::abs(self) >= eps {
            self
        } else {
            eps.copysign(self)
        }
    }

    #[inline]
    fn is_finite_value(self) -> bool {
        f64::is_finite(self)
    }
}

// ============================================================
// f32 实现
// ============================================================

impl FvScalar for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const TWO: Self = 2.0;
    const HALF: Self = 0.5;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn primal(self) -> f64 {
        self as f64
    }

    #[inline]
    fn abs(self) -> Self {
        f32::abs(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        f32::min(self, other)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        f32::max(self, other)
    }

    #[inline]
    fn signed_floor(self, eps: f64) -> Self {
        let e = eps as f32;
        if f32::abs(self) >= e {
            self
        } else {
            e.copysign(self)
        }
    }

    #[inline]
    fn is_finite_value(self) -> bool {
        f32::is_finite(self)
    }
}

// ============================================================
// 测试
// ============================================================
