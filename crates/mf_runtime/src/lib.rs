// crates/mf_runtime/src/lib.rs

//! MeshFlux 数值基础层
//!
//! 为面插值与坡度重构内核提供标量抽象、自动微分与容差配置。
//!
//! # 模块概览
//!
//! - [`scalar`]: FvScalar trait（f32/f64 与对偶数共用的标量入口）
//! - [`dual`]: Dual2 二元对偶数（面两侧自由度的前向微分）
//! - [`tolerance`]: 数值容差默认值与泛型配置
//! - [`error`]: 基础层错误类型
//!
//! # 层级架构
//!
//! ```text
//! mf_numerics  ─> 面插值 / 限制器 / 坡度重构（上层）
//! mf_runtime   ─> FvScalar, Dual2, NumericTolerance（本层）
//! ```
//!
//! # 设计原则
//!
//! 1. **开放标量 trait**: 对偶数与浮点实现同一 trait，插值例程写一遍
//! 2. **主值分支**: 所有比较基于主值，实数/对偶数路径分支完全一致
//! 3. **可配置容差**: 保护阈值集中定义，配置结构体引用默认常量

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dual;
pub mod error;
pub mod scalar;
pub mod tolerance;

pub use dual::{Dual2, SLOT_ELEM, SLOT_NEIGHBOR};
pub use error::{RuntimeError, RuntimeResult};
pub use scalar::FvScalar;
pub use tolerance::NumericTolerance;

/// Prelude 模块
pub mod prelude {
    //! 常用类型预导入
    pub use crate::{Dual2, FvScalar, NumericTolerance, RuntimeError};
}
