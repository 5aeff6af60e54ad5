// crates/mf_numerics/src/types.rs

//! 配置类型与校验
//!
//! 所有方案在构造时一次性校验配置，之后不可变；越界的混合/校正
//! 系数属于配置错误而非运行期数值故障。配置结构体均可序列化，
//! 便于嵌入求解器配置文件。

use serde::{Deserialize, Serialize};

use mf_runtime::tolerance::{DEFAULT_DET_EPS, DEFAULT_POSITIVITY_EPS};

// ============================================================
// 错误类型
// ============================================================

/// 配置校验错误（构造时抛出，绝不部分构造）
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// 数值超出允许区间
    #[error("配置项 {field} 超出范围: {value}（允许 [{min}, {max}]）")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },
    /// 必须为正的数值非正
    #[error("配置项 {field} 必须为正值: {value}")]
    NotPositive {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
    },
    /// 不允许为负的数值为负
    #[error("配置项 {field} 不能为负值: {value}")]
    Negative {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
    },
    /// 数组参数长度不匹配
    #[error("{what} 长度不匹配: 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        /// 数据名称
        what: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },
    /// 网格维度无效
    #[error("网格维度无效: {dim}（仅支持 1/2/3）")]
    InvalidDimension {
        /// 传入的维度
        dim: usize,
    },
    /// 面引用了越界单元
    #[error("面 {face} 引用越界单元 {cell}（单元总数 {n_cells}）")]
    CellOutOfRange {
        /// 面编号
        face: usize,
        /// 单元编号
        cell: usize,
        /// 单元总数
        n_cells: usize,
    },
    /// 面法向量退化
    #[error("面 {face} 法向量长度接近零")]
    DegenerateNormal {
        /// 面编号
        face: usize,
    },
}

pub(crate) fn check_unit_range(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}

pub(crate) fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

pub(crate) fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

// ============================================================
// 方案选择枚举
// ============================================================

/// 对流插值方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdvectedInterpMethod {
    /// 一阶迎风
    #[default]
    Upwind,
    /// 几何平均（中心差）
    Average,
    /// Minmod 权重混合
    Minmod,
    /// Van Leer（权重混合 / 延迟校正两种模式）
    VanLeer,
    /// Venkatakrishnan MUSCL + 延迟校正
    Venkatakrishnan,
}

/// 面限制器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LimiterKind {
    /// 不限制（β = 1）
    None,
    /// Minmod
    Minmod,
    /// Van Leer（默认）
    #[default]
    VanLeer,
    /// Venkatakrishnan 光滑限制器
    Venkatakrishnan,
}

/// 最小二乘距离权模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GradientWeightModel {
    /// 不加权
    None,
    /// 距离平方反比（默认）
    #[default]
    InverseDistance2,
}

// ============================================================
// 对流插值配置
// ============================================================

/// 权重混合方案配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendedInterpConfig {
    /// 混合系数 ∈ [0,1]：0 = 纯迎风，1 = 完整限制混合
    pub blending_factor: f64,
    /// 把混合量钳制到不超过线性插值（抗振荡的关键约束）
    pub limit_to_linear: bool,
}

impl Default for BlendedInterpConfig {
    fn default() -> Self {
        Self {
            blending_factor: 1.0,
            limit_to_linear: true,
        }
    }
}

impl BlendedInterpConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_range("blending_factor", self.blending_factor)
    }
}

/// 延迟校正配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeferredCorrectionConfig {
    /// 是否启用延迟校正（矩阵保持纯迎风，高阶差量进显式右端）
    pub use_deferred_correction: bool,
    /// 校正系数 ∈ [0,1]：0 = 退化为纯迎风，1 = 完整高阶值
    pub deferred_correction_factor: f64,
}

impl Default for DeferredCorrectionConfig {
    fn default() -> Self {
        Self {
            use_deferred_correction: true,
            deferred_correction_factor: 1.0,
        }
    }
}

impl DeferredCorrectionConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_range(
            "deferred_correction_factor",
            self.deferred_correction_factor,
        )
    }
}

/// 对流插值总配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvectionConfig {
    /// 方法选择
    pub method: AdvectedInterpMethod,
    /// 权重混合参数
    pub blend: BlendedInterpConfig,
    /// 延迟校正参数
    pub deferred: DeferredCorrectionConfig,
    /// Venkatakrishnan 限制器 K 参数（其他方法忽略）
    pub venkat_k: f64,
}

impl Default for AdvectionConfig {
    fn default() -> Self {
        Self {
            method: AdvectedInterpMethod::default(),
            blend: BlendedInterpConfig::default(),
            deferred: DeferredCorrectionConfig::default(),
            venkat_k: 1.0,
        }
    }
}

impl AdvectionConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.blend.validate()?;
        self.deferred.validate()?;
        check_positive("venkat_k", self.venkat_k)
    }
}

// ============================================================
// 坡度重构配置
// ============================================================

/// Green-Gauss 重构配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenGaussConfig {
    /// 是否启用并行
    pub parallel: bool,
    /// 并行阈值（单元数）
    pub parallel_threshold: usize,
}

impl Default for GreenGaussConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 1000,
        }
    }
}

impl GreenGaussConfig {
    /// 校验配置（当前无可失败项，保留统一入口）
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// 最小二乘重构配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeastSquaresConfig {
    /// 距离权模型
    pub weight_model: GradientWeightModel,
    /// 有效邻居数下限，不足时梯度置零
    pub min_neighbors: usize,
    /// Tikhonov 正则化系数（加到法方程对角）
    pub tikhonov_eps: f64,
    /// 行列式奇异阈值
    pub det_eps: f64,
    /// 是否启用并行
    pub parallel: bool,
    /// 并行阈值
    pub parallel_threshold: usize,
}

impl Default for LeastSquaresConfig {
    fn default() -> Self {
        Self {
            weight_model: GradientWeightModel::default(),
            min_neighbors: 1,
            tikhonov_eps: 0.0,
            det_eps: DEFAULT_DET_EPS,
            parallel: true,
            parallel_threshold: 1000,
        }
    }
}

impl LeastSquaresConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("tikhonov_eps", self.tikhonov_eps)?;
        check_positive("det_eps", self.det_eps)
    }
}

/// 浅水多变量重构配置
///
/// 在最小二乘之上追加干单元与正性处理：(h, hu, hv) 三个守恒量一起
/// 重构，干单元动量梯度归零，水深梯度受正性守卫限制。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShallowWaterReconConfig {
    /// 干单元水深阈值 [m]
    pub dry_depth: f64,
    /// 是否启用水深正性守卫
    pub positivity_guard: bool,
    /// 正性余量：面外推水深不得低于 dry_depth + positivity_eps
    pub positivity_eps: f64,
    /// 距离权模型
    pub weight_model: GradientWeightModel,
    /// 有效邻居数下限
    pub min_neighbors: usize,
    /// Tikhonov 正则化系数
    pub tikhonov_eps: f64,
    /// 行列式奇异阈值
    pub det_eps: f64,
    /// 是否启用并行
    pub parallel: bool,
    /// 并行阈值
    pub parallel_threshold: usize,
}

impl Default for ShallowWaterReconConfig {
    fn default() -> Self {
        Self {
            dry_depth: 1e-6,
            positivity_guard: true,
            positivity_eps: DEFAULT_POSITIVITY_EPS,
            weight_model: GradientWeightModel::default(),
            min_neighbors: 2,
            tikhonov_eps: 0.0,
            det_eps: DEFAULT_DET_EPS,
            parallel: true,
            parallel_threshold: 1000,
        }
    }
}

impl ShallowWaterReconConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("dry_depth", self.dry_depth)?;
        check_non_negative("positivity_eps", self.positivity_eps)?;
        check_non_negative("tikhonov_eps", self.tikhonov_eps)?;
        check_positive("det_eps", self.det_eps)
    }

    /// 对应的基础最小二乘配置
    pub fn least_squares(&self) -> LeastSquaresConfig {
        LeastSquaresConfig {
            weight_model: self.weight_model,
            min_neighbors: self.min_neighbors,
            tikhonov_eps: self.tikhonov_eps,
            det_eps: self.det_eps,
            parallel: self.parallel,
            parallel_threshold: self.parallel_threshold,
        }
    }
}

// ============================================================
// 测试
// ============================================================
