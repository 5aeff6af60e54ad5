// crates/mf_numerics/src/interpolation/mod.rs

//! # 面插值模块
//!
//! 从单元均值计算控制体面值的两族方案：
//!
//! - 非对流：[`FaceInterpolator`]（几何平均 / 调和平均），
//!   纯几何混合，无方向性
//! - 对流：[`AdvectedScheme`]（迎风 / 平均 / Minmod / Van Leer /
//!   Venkatakrishnan MUSCL），按质量通量方向选择迎风侧，
//!   输出矩阵权重与可选的延迟校正
//!
//! 两族都是构造后不可变的值类型，逐面调用 O(1) 派发、零分配，
//! 对 f64 与对偶数（Jacobian 装配）同样适用。

mod advected;
mod blended;
mod face;
mod muscl;

pub use advected::{
    create_advected_scheme, elem_is_upwind, AdvectedResult, AdvectedScheme, AverageInterp,
    UpwindInterp,
};
pub use blended::{MinmodInterp, VanLeerInterp};
pub use face::{geometric_average, harmonic_average, FaceInterpolator};
pub use muscl::MusclInterp;
