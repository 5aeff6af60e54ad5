// crates/mf_numerics/src/eos.rs

//! 状态方程抽象
//!
//! 重构在原始变量上进行（浅水方案除外），状态方程负责把守恒量
//! 转成原始量。实现方必须线程安全，重构 pass 会在并行扫描中
//! 共享同一个实例。

use crate::types::ConfigError;

/// 守恒量 → 原始量转换接口
pub trait EquationOfState: Send + Sync {
    /// 守恒分量个数
    fn n_conserved(&self) -> usize;

    /// 原始分量个数
    fn n_primitive(&self) -> usize;

    /// 单元守恒量转原始量
    ///
    /// `conserved` 长度为 [`n_conserved`](Self::n_conserved)，
    /// `primitive` 长度为 [`n_primitive`](Self::n_primitive)。
    fn to_primitive(&self, conserved: &[f64], primitive: &mut [f64]);

    /// 方案名称
    fn name(&self) -> &'static str;
}

// ============================================================
// 理想气体
// ============================================================

/// 理想气体状态方程
///
/// 守恒量 [ρ, ρu.., ρE]，原始量 [ρ, u.., p]。
/// p = (γ−1)(ρE − ½ρ|u|²)。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdealGasEos {
    dim: usize,
    /// 绝热指数
    pub gamma: f64,
    /// 密度下限，防止除零
    pub rho_floor: f64,
}

impl IdealGasEos {
    /// 创建指定维度的理想气体方程
    pub fn new(dim: usize) -> Result<Self, ConfigError> {
        if !(1..=3).contains(&dim) {
            return Err(ConfigError::InvalidDimension { dim });
        }
        Ok(Self {
            dim,
            gamma: 1.4,
            rho_floor: 1e-12,
        })
    }

    /// 自定义绝热指数
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }
}

impl EquationOfState for IdealGasEos {
    fn n_conserved(&self) -> usize {
        self.dim + 2
    }

    fn n_primitive(&self) -> usize {
        self.dim + 2
    }

    fn to_primitive(&self, conserved: &[f64], primitive: &mut [f64]) {
        debug_assert_eq!(conserved.len(), self.dim + 2);
        debug_assert_eq!(primitive.len(), self.dim + 2);

        let rho = conserved[0].max(self.rho_floor);
        primitive[0] = conserved[0];

        let mut kinetic = 0.0;
        for d in 0..self.dim {
            let vel = conserved[1 + d] / rho;
            primitive[1 + d] = vel;
            kinetic += 0.5 * rho * vel * vel;
        }

        let rho_e = conserved[self.dim + 1];
        primitive[self.dim + 1] = (self.gamma - 1.0) * (rho_e - kinetic);
    }

    fn name(&self) -> &'static str {
        "ideal_gas"
    }
}

// ============================================================
// 浅水方程
// ============================================================

/// 浅水状态方程
///
/// 守恒量 [h, hu, hv]，原始量 [h, u, v]。干单元速度归零。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShallowWaterEos {
    /// 干单元水深阈值 [m]
    pub dry_depth: f64,
}

impl ShallowWaterEos {
    /// 创建浅水状态方程
    pub fn new(dry_depth: f64) -> Result<Self, ConfigError> {
        if !dry_depth.is_finite() || dry_depth < 0.0 {
            return Err(ConfigError::Negative {
                field: "dry_depth",
                value: dry_depth,
            });
        }
        Ok(Self { dry_depth })
    }
}

impl Default for ShallowWaterEos {
    fn default() -> Self {
        Self { dry_depth: 1e-6 }
    }
}

impl EquationOfState for ShallowWaterEos {
    fn n_conserved(&self) -> usize {
        3
    }

    fn n_primitive(&self) -> usize {
        3
    }

    fn to_primitive(&self, conserved: &[f64], primitive: &mut [f64]) {
        debug_assert_eq!(conserved.len(), 3);
        debug_assert_eq!(primitive.len(), 3);

        let h = conserved[0];
        primitive[0] = h;
        if h <= self.dry_depth {
            primitive[1] = 0.0;
            primitive[2] = 0.0;
        } else {
            primitive[1] = conserved[1] / h;
            primitive[2] = conserved[2] / h;
        }
    }

    fn name(&self) -> &'static str {
        "shallow_water"
    }
}

// ============================================================
// 恒等转换
// ============================================================

/// 恒等状态方程：守恒量即原始量
///
/// 用于纯标量输运等无需变量变换的场景。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentityEos {
    n_fields: usize,
}

impl IdentityEos {
    /// 创建 n 分量恒等转换
    pub fn new(n_fields: usize) -> Self {
        Self { n_fields }
    }
}

impl EquationOfState for IdentityEos {
    fn n_conserved(&self) -> usize {
        self.n_fields
    }

    fn n_primitive(&self) -> usize {
        self.n_fields
    }

    fn to_primitive(&self, conserved: &[f64], primitive: &mut [f64]) {
        debug_assert_eq!(conserved.len(), self.n_fields);
        primitive.copy_from_slice(conserved);
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ideal_gas_pressure() {
        let eos = IdealGasEos::new(2).unwrap();
        // ρ=1, u=2, v=0, p=1 => ρE = p/(γ-1) + ½ρ|u|² = 2.5 + 2 = 4.5
        let conserved = [1.0, 2.0, 0.0, 4.5];
        let mut primitive = [0.0; 4];
        eos.to_primitive(&conserved, &mut primitive);
        assert!((primitive[0] - 1.0).abs() < 1e-14);
        assert!((primitive[1] - 2.0).abs() < 1e-14);
        assert!((primitive[2] - 0.0).abs() < 1e-14);
        assert!((primitive[3] - 1.0).abs() < 1e-12, "压力恢复错误: {}", primitive[3]);
    }

    #[test]
    fn test_ideal_gas_rejects_bad_dim() {
        assert!(IdealGasEos::new(0).is_err());
        assert!(IdealGasEos::new(4).is_err());
    }

    #[test]
    fn test_shallow_water_dry_cell_velocity() {
        let eos = ShallowWaterEos::new(1e-6).unwrap();
        let mut primitive = [0.0; 3];

        eos.to_primitive(&[1e-9, 0.5, -0.5], &mut primitive);
        assert_eq!(primitive, [1e-9, 0.0, 0.0], "干单元速度必须归零");

        eos.to_primitive(&[2.0, 4.0, -2.0], &mut primitive);
        assert!((primitive[1] - 2.0).abs() < 1e-14);
        assert!((primitive[2] + 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_identity_passthrough() {
        let eos = IdentityEos::new(2);
        let mut primitive = [0.0; 2];
        eos.to_primitive(&[3.0, -7.0], &mut primitive);
        assert_eq!(primitive, [3.0, -7.0]);
    }
}
