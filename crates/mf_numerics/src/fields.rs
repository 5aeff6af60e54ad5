// crates/mf_numerics/src/fields.rs

//! 单元场存储
//!
//! 重构子系统的输入（单元均值）与输出（单元坡度）的平坦数组容器。
//!
//! # 布局设计
//!
//! 采用单元主序布局：同一单元的所有分量连续存放，
//! ```text
//! [c0_f0, c0_f1, ..., c0_fm, c1_f0, c1_f1, ...]
//! ```
//! 重构按单元扫描并一次读写该单元的全部分量，这种布局对扫描
//! 缓存友好，也便于按单元打包交换记录。

use glam::DVec3;

use mf_runtime::{RuntimeError, RuntimeResult};

// ============================================================
// 单元标量场组
// ============================================================

/// 多分量单元场（单元主序）
#[derive(Debug, Clone, PartialEq)]
pub struct CellFields {
    n_cells: usize,
    n_fields: usize,
    data: Vec<f64>,
}

impl CellFields {
    /// 创建零初始化的场组
    pub fn new(n_cells: usize, n_fields: usize) -> Self {
        Self {
            n_cells,
            n_fields,
            data: vec![0.0; n_cells * n_fields],
        }
    }

    /// 从已有数据构建，长度必须等于 n_cells * n_fields
    pub fn from_vec(data: Vec<f64>, n_cells: usize, n_fields: usize) -> RuntimeResult<Self> {
        if data.len() != n_cells * n_fields {
            return Err(RuntimeError::SizeMismatch {
                what: "CellFields 数据",
                expected: n_cells * n_fields,
                actual: data.len(),
            });
        }
        Ok(Self {
            n_cells,
            n_fields,
            data,
        })
    }

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 分量数量
    #[inline]
    pub fn n_fields(&self) -> usize {
        self.n_fields
    }

    /// 单元的全部分量
    #[inline]
    pub fn cell(&self, cell: usize) -> &[f64] {
        let start = cell * self.n_fields;
        &self.data[start..start + self.n_fields]
    }

    /// 单元的全部分量（可变）
    #[inline]
    pub fn cell_mut(&mut self, cell: usize) -> &mut [f64] {
        let start = cell * self.n_fields;
        &mut self.data[start..start + self.n_fields]
    }

    /// 读取单个分量
    #[inline]
    pub fn get(&self, cell: usize, field: usize) -> f64 {
        debug_assert!(field < self.n_fields);
        self.data[cell * self.n_fields + field]
    }

    /// 写入单个分量
    #[inline]
    pub fn set(&mut self, cell: usize, field: usize, value: f64) {
        debug_assert!(field < self.n_fields);
        self.data[cell * self.n_fields + field] = value;
    }

    /// 底层数据（单元主序）
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// 全部分量是否有限
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

// ============================================================
// 单元坡度场
// ============================================================

/// 多分量单元坡度（梯度）场，单元主序
///
/// 每个单元每个分量一个三维梯度向量；1D/2D 问题未用到的
/// 分量恒为 0。
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeField {
    n_cells: usize,
    n_fields: usize,
    data: Vec<DVec3>,
}

impl SlopeField {
    /// 创建零初始化的坡度场
    pub fn new(n_cells: usize, n_fields: usize) -> Self {
        Self {
            n_cells,
            n_fields,
            data: vec![DVec3::ZERO; n_cells * n_fields],
        }
    }

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 分量数量
    #[inline]
    pub fn n_fields(&self) -> usize {
        self.n_fields
    }

    /// 单元的全部分量梯度
    #[inline]
    pub fn cell(&self, cell: usize) -> &[DVec3] {
        let start = cell * self.n_fields;
        &self.data[start..start + self.n_fields]
    }

    /// 单元的全部分量梯度（可变）
    #[inline]
    pub fn cell_mut(&mut self, cell: usize) -> &mut [DVec3] {
        let start = cell * self.n_fields;
        &mut self.data[start..start + self.n_fields]
    }

    /// 读取单个梯度
    #[inline]
    pub fn get(&self, cell: usize, field: usize) -> DVec3 {
        debug_assert!(field < self.n_fields);
        self.data[cell * self.n_fields + field]
    }

    /// 写入单个梯度
    #[inline]
    pub fn set(&mut self, cell: usize, field: usize, grad: DVec3) {
        debug_assert!(field < self.n_fields);
        self.data[cell * self.n_fields + field] = grad;
    }

    /// 将单元的全部梯度置零
    #[inline]
    pub fn zero_cell(&mut self, cell: usize) {
        for g in self.cell_mut(cell) {
            *g = DVec3::ZERO;
        }
    }

    /// 底层数据（单元主序）
    #[inline]
    pub fn as_slice(&self) -> &[DVec3] {
        &self.data
    }

    /// 底层数据（单元主序，可变），供并行分块写入
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [DVec3] {
        &mut self.data
    }
}

// ============================================================
// 测试
// ============================================================
