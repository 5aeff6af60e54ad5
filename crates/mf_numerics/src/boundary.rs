// crates/mf_numerics/src/boundary.rs

//! 边界虚单元值
//!
//! 重构在边界面上需要一个"面外"的状态参与差分。本模块沿用
//! 虚单元（ghost cell）技术：在边界外虚拟一个单元，由边界
//! 条件决定其守恒量，之后边界面与内部面走同一套差分公式。
//!
//! 提供方必须线程安全，重构 pass 在并行扫描中共享实例。

use std::collections::HashMap;

use glam::DVec3;

use crate::types::ConfigError;

/// 边界虚单元值提供接口
pub trait GhostValueProvider: Send + Sync {
    /// 计算一个边界面外侧虚单元的守恒量
    ///
    /// # 参数
    /// - `boundary_id`: 面所属边界编号
    /// - `cell`: 内侧单元编号
    /// - `interior`: 内侧单元守恒量
    /// - `normal`: 面外法向量（单位向量）
    /// - `ghost`: 输出缓冲，长度与 `interior` 相同
    fn ghost_value(
        &self,
        boundary_id: u32,
        cell: usize,
        interior: &[f64],
        normal: DVec3,
        ghost: &mut [f64],
    );

    /// 方案名称
    fn name(&self) -> &'static str;
}

// ============================================================
// 零梯度
// ============================================================

/// 零梯度外推：虚单元直接复制内侧状态
///
/// 对应自由出流类边界，也是默认的保守选择。
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroGradientGhost;

impl GhostValueProvider for ZeroGradientGhost {
    fn ghost_value(
        &self,
        _boundary_id: u32,
        _cell: usize,
        interior: &[f64],
        _normal: DVec3,
        ghost: &mut [f64],
    ) {
        ghost.copy_from_slice(interior);
    }

    fn name(&self) -> &'static str {
        "zero_gradient"
    }
}

// ============================================================
// 反射（固壁）
// ============================================================

/// 固壁反射：动量分量法向反射，其余分量复制
///
/// 动量向量 m 变换为 m − 2(m·n)n，切向分量保持。
#[derive(Debug, Clone, Copy)]
pub struct ReflectiveGhost {
    momentum_start: usize,
    dim: usize,
}

impl ReflectiveGhost {
    /// 创建反射提供方
    ///
    /// `momentum_start` 是动量分量在守恒量数组中的起始下标，
    /// `dim` 是动量分量个数。
    pub fn new(momentum_start: usize, dim: usize) -> Result<Self, ConfigError> {
        if !(1..=3).contains(&dim) {
            return Err(ConfigError::InvalidDimension { dim });
        }
        Ok(Self {
            momentum_start,
            dim,
        })
    }
}

impl GhostValueProvider for ReflectiveGhost {
    fn ghost_value(
        &self,
        _boundary_id: u32,
        _cell: usize,
        interior: &[f64],
        normal: DVec3,
        ghost: &mut [f64],
    ) {
        ghost.copy_from_slice(interior);

        let mut m = DVec3::ZERO;
        let n_axes = [DVec3::X, DVec3::Y, DVec3::Z];
        for d in 0..self.dim {
            m += n_axes[d] * interior[self.momentum_start + d];
        }
        let reflected = m - normal * (2.0 * m.dot(normal));
        for d in 0..self.dim {
            ghost[self.momentum_start + d] = reflected.dot(n_axes[d]);
        }
    }

    fn name(&self) -> &'static str {
        "reflective"
    }
}

// ============================================================
// 定值
// ============================================================

/// 定值边界：按边界编号查表取固定守恒量
///
/// 未注册的边界编号退化为零梯度复制。
#[derive(Debug, Clone, Default)]
pub struct FixedGhost {
    n_fields: usize,
    values: HashMap<u32, Vec<f64>>,
}

impl FixedGhost {
    /// 创建 n 分量的定值提供方
    pub fn new(n_fields: usize) -> Self {
        Self {
            n_fields,
            values: HashMap::new(),
        }
    }

    /// 注册某个边界编号的固定值
    pub fn set(&mut self, boundary_id: u32, values: Vec<f64>) -> Result<(), ConfigError> {
        if values.len() != self.n_fields {
            return Err(ConfigError::SizeMismatch {
                what: "FixedGhost 边界值",
                expected: self.n_fields,
                actual: values.len(),
            });
        }
        self.values.insert(boundary_id, values);
        Ok(())
    }

    /// 链式注册
    pub fn with_value(mut self, boundary_id: u32, values: Vec<f64>) -> Result<Self, ConfigError> {
        self.set(boundary_id, values)?;
        Ok(self)
    }
}

impl GhostValueProvider for FixedGhost {
    fn ghost_value(
        &self,
        boundary_id: u32,
        _cell: usize,
        interior: &[f64],
        _normal: DVec3,
        ghost: &mut [f64],
    ) {
        match self.values.get(&boundary_id) {
            Some(v) => ghost.copy_from_slice(v),
            None => ghost.copy_from_slice(interior),
        }
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

// ============================================================
// 测试
// ============================================================
