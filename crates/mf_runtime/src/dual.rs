// crates/mf_runtime/src/dual.rs

//! 二元对偶数（前向自动微分）
//!
//! [`Dual2`] 携带一个主值与两个导数槽，分别对应面两侧（elem / neighbor）
//! 的自由度。把面插值的两个输入用 [`Dual2::elem_var`] / [`Dual2::neighbor_var`]
//! 播种后，插值结果的 `der` 即为面值对两侧自由度的偏导——隐式装配
//! 需要的雅可比贡献由同一条代码路径顺带产出。
//!
//! # 语义约定
//!
//! - 算术运算同时传播主值与导数（乘法/除法按积、商法则）；
//! - `PartialEq` / `PartialOrd` 只比较主值，使分支结构与实数路径一致；
//! - 退化保护（如 [`crate::scalar::FvScalar::signed_floor`] 触发替换）返回
//!   零导数常量，与被替换值不再相关。

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_traits::Float;

use crate::scalar::FvScalar;

/// elem 侧导数槽下标
pub const SLOT_ELEM: usize = 0;
/// neighbor 侧导数槽下标
pub const SLOT_NEIGHBOR: usize = 1;

/// 二元对偶数：主值 + 对 (elem, neighbor) 自由度的偏导
#[derive(Debug, Clone, Copy)]
pub struct Dual2<F> {
    /// 主值
    pub val: F,
    /// 导数槽：`der[0]` 对 elem 侧，`der[1]` 对 neighbor 侧
    pub der: [F; 2],
}

impl<F: Float> Dual2<F> {
    /// 零导数常量
    #[inline]
    pub fn constant(val: F) -> Self {
        Self {
            val,
            der: [F::zero(), F::zero()],
        }
    }

    /// 在指定槽播种单位导数
    #[inline]
    pub fn var(val: F, slot: usize) -> Self {
        debug_assert!(slot < 2, "导数槽下标只能是 0 或 1");
        let mut der = [F::zero(), F::zero()];
        der[slot] = F::one();
        Self { val, der }
    }

    /// elem 侧自变量（`der = [1, 0]`）
    #[inline]
    pub fn elem_var(val: F) -> Self {
        Self::var(val, SLOT_ELEM)
    }

    /// neighbor 侧自变量（`der = [0, 1]`）
    #[inline]
    pub fn neighbor_var(val: F) -> Self {
        Self::var(val, SLOT_NEIGHBOR)
    }

    /// 对 elem 侧自由度的偏导
    #[inline]
    pub fn d_elem(self) -> F {
        self.der[SLOT_ELEM]
    }

    /// 对 neighbor 侧自由度的偏导
    #[inline]
    pub fn d_neighbor(self) -> F {
        self.der[SLOT_NEIGHBOR]
    }
}

// ============================================================
// 算术运算
// ============================================================

impl<F: Float> Add for Dual2<F> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            val: self.val + rhs.val,
            der: [self.der[0] + rhs.der[0], self.der[1] + rhs.der[1]],
        }
    }
}

impl<F: Float> Sub for Dual2<F> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            val: self.val - rhs.val,
            der: [self.der[0] - rhs.der[0], self.der[1] - rhs.der[1]],
        }
    }
}

impl<F: Float> Mul for Dual2<F> {
    type Output = Self;

    /// 积法则：`(uv)' = u'v + uv'`
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            val: self.val * rhs.val,
            der: [
                self.der[0] * rhs.val + self.val * rhs.der[0],
                self.der[1] * rhs.val + self.val * rhs.der[1],
            ],
        }
    }
}

impl<F: Float> Div for Dual2<F> {
    type Output = Self;

    /// 商法则：`(u/v)' = (u'v - uv') / v²`
    #[inline]
    fn div(self, rhs: Self) -> Self {
        let inv = F::one() / rhs.val;
        let inv2 = inv * inv;
        Self {
            val: self.val * inv,
            der: [
                (self.der[0] * rhs.val - self.val * rhs.der[0]) * inv2,
                (self.der[1] * rhs.val - self.val * rhs.der[1]) * inv2,
            ],
        }
    }
}

impl<F: Float> Neg for Dual2<F> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            val: -self.val,
            der: [-self.der[0], -self.der[1]],
        }
    }
}

impl<F: Float> AddAssign for Dual2<F> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<F: Float> SubAssign for Dual2<F> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<F: Float> MulAssign for Dual2<F> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<F: Float> DivAssign for Dual2<F> {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

// 比较只看主值，保证与实数路径分支一致
impl<F: Float> PartialEq for Dual2<F> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl<F: Float> PartialOrd for Dual2<F> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.val.partial_cmp(&other.val)
    }
}

impl<F: Float> num_traits::Zero for Dual2<F> {
    #[inline]
    fn zero() -> Self {
        Self::constant(F::zero())
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.val.is_zero()
    }
}

impl<F: Float> num_traits::One for Dual2<F> {
    #[inline]
    fn one() -> Self {
        Self::constant(F::one())
    }
}

// ============================================================
// FvScalar 实现（按基础精度展开）
// ============================================================

macro_rules! impl_fv_scalar_for_dual {
    ($f:ty) => {
        impl FvScalar for Dual2<$f> {
            const ZERO: Self = Dual2 {
                val: 0.0,
                der: [0.0, 0.0],
            };
            const ONE: Self = Dual2 {
                val: 1.0,
                der: [0.0, 0.0],
            };
            const TWO: Self = Dual2 {
                val: 2.0,
                der: [0.0, 0.0],
            };
            const HALF: Self = Dual2 {
                val: 0.5,
                der: [0.0, 0.0],
            };

            #[inline]
            fn from_f64(v: f64) -> Self {
                Self::constant(v as $f)
            }

            #[inline]
            fn primal(self) -> f64 {
                self.val as f64
            }

            #[inline]
            fn abs(self) -> Self {
                if self.val < 0.0 {
                    -self
                } else {
                    self
                }
            }

            #[inline]
            fn sqrt(self) -> Self {
                let s = self.val.sqrt();
                // s → 0 时导数发散，截断为零导数
                if s > 0.0 && s.is_finite() {
                    let half_inv = 0.5 / s;
                    Self {
                        val: s,
                        der: [self.der[0] * half_inv, self.der[1] * half_inv],
                    }
                } else {
                    Self::constant(s)
                }
            }

            #[inline]
            fn min(self, other: Self) -> Self {
                if self.val <= other.val {
                    self
                } else {
                    other
                }
            }

            #[inline]
            fn max(self, other: Self) -> Self {
                if self.val >= other.val {
                    self
                } else {
                    other
                }
            }

            #[inline]
            fn signed_floor(self, eps: f64) -> Self {
                let e = eps as $f;
                if self.val.abs() >= e {
                    self
                } else {
                    // 替换为常量后与原值不再相关，导数归零
                    Self::constant(e.copysign(self.val))
                }
            }

            #[inline]
            fn is_finite_value(self) -> bool {
                self.val.is_finite()
            }
        }
    };
}

impl_fv_scalar_for_dual!(f32);
impl_fv_scalar_for_dual!(f64);

// ============================================================
// 测试
// ============================================================
