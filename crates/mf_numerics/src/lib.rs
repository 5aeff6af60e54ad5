// crates/mf_numerics/src/lib.rs

//! MeshFlux 面插值与坡度重构内核
//!
//! 有限体积离散的空间核心：从单元均值出发，计算控制体面上的
//! 插值权重与每单元的线性坡度，供通量装配与高阶 MUSCL 外推使用。
//!
//! # 模块概览
//!
//! - [`mesh`]: SoA 面几何与网格构建器（质心、法向、g_C、非正交修正）
//! - [`fields`]: 单元均值场与坡度场的平铺存储
//! - [`types`]: 配置结构体、方案枚举与校验错误
//! - [`interpolation`]: 非对流几何插值与对流迎风/TVD/MUSCL 方案
//! - [`limiter`]: 面限制器族（β ∈ [0,1]）与工厂
//! - [`reconstruction`]: Green-Gauss / 最小二乘 / 浅水坡度重构 pass
//! - [`eos`]: 守恒量到原始量的状态方程转换
//! - [`boundary`]: 边界虚单元值提供者
//!
//! # 层级架构
//!
//! ```text
//! 求解器装配   ─> 面权重 / SlopeSnapshot（消费方）
//! mf_numerics  ─> 插值 / 限制器 / 重构（本层）
//! mf_runtime   ─> FvScalar, Dual2, NumericTolerance（基础层）
//! ```
//!
//! # 设计原则
//!
//! 1. **方案即值类型**: 插值器与重构器构造后不可变，逐面调用无锁无分配
//! 2. **标量泛型**: 面公式对 f64 与 [`mf_runtime::Dual2`] 写一遍，
//!    Jacobian 由对偶数前向传播得到
//! 3. **几何预计算**: 面几何在网格构建时算好，热循环只做点积与混合
//! 4. **失败显式**: 配置错误在构造期返回 [`types::ConfigError`]，
//!    热循环内的退化按文档化回退处理并计数

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod eos;
pub mod fields;
pub mod interpolation;
pub mod limiter;
pub mod mesh;
pub mod reconstruction;
pub mod types;

pub use boundary::{FixedGhost, GhostValueProvider, ReflectiveGhost, ZeroGradientGhost};
pub use eos::{EquationOfState, IdealGasEos, IdentityEos, ShallowWaterEos};
pub use fields::{CellFields, SlopeField};
pub use interpolation::{create_advected_scheme, AdvectedResult, AdvectedScheme, FaceInterpolator};
pub use limiter::{create_limiter, FaceLimitContext, FaceLimiter};
pub use mesh::{FaceGeometry, FvMesh, FvMeshBuilder};
pub use reconstruction::{SlopeReconstructor, SlopeScheme, SlopeSnapshot};
pub use types::{
    AdvectedInterpMethod, AdvectionConfig, ConfigError, GradientWeightModel, GreenGaussConfig,
    LeastSquaresConfig, LimiterKind, ShallowWaterReconConfig,
};

/// Prelude 模块
pub mod prelude {
    //! 常用类型预导入
    pub use crate::fields::{CellFields, SlopeField};
    pub use crate::interpolation::{AdvectedScheme, FaceInterpolator};
    pub use crate::mesh::{FvMesh, FvMeshBuilder};
    pub use crate::reconstruction::{SlopeReconstructor, SlopeScheme, SlopeSnapshot};
    pub use crate::types::{AdvectionConfig, ConfigError, LimiterKind};
    pub use mf_runtime::prelude::*;
}
