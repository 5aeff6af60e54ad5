// crates/mf_numerics/src/reconstruction/mod.rs

//! 坡度重构
//!
//! 从单元均值重构每个单元、每个分量的梯度向量，一次 pass 覆盖
//! 全网格。方案选择：
//!
//! | 方案 | 适用 | 特点 |
//! |------|------|------|
//! | `NoSlope` | 一阶格式 | 全零梯度 |
//! | `OneD` | 一维求解器 | 无操作，坡度限制在外部完成 |
//! | `GreenGauss` | 通用 | 散度定理，无退化路径 |
//! | `LeastSquares` | 通用/畸形网格 | 加权法方程，奇异时回退零梯度 |
//! | `ShallowWater` | 浅水方程 | 多变量 + 干单元 + 正性守卫 |
//!
//! 入口是 [`SlopeReconstructor`]：持有网格与协作方（状态方程、
//! 边界虚单元、交换通道），`run_pass` 发布不可变 [`SlopeSnapshot`]。
//! 各方案结构体也可单独使用，直接吃原始/守恒场与
//! [`BoundaryGhosts`] 虚单元表。

use crate::boundary::GhostValueProvider;
use crate::eos::EquationOfState;
use crate::fields::CellFields;
use crate::mesh::FvMesh;

pub mod exchange;
pub mod green_gauss;
pub mod least_squares;
mod normal_matrix;
pub mod pass;
pub mod shallow_water;

pub use exchange::{NoExchange, SlopeExchange, SlopeRecord};
pub use green_gauss::GreenGaussRecon;
pub use least_squares::LsqRecon;
pub use pass::{PassStats, ReconstructError, SlopeReconstructor, SlopeScheme, SlopeSnapshot};
pub use shallow_water::{SweCounters, SweRecon, SWE_FIELDS};

/// 边界序号哨兵
const NO_ORDINAL: u32 = u32::MAX;

// ============================================================
// 边界虚单元表
// ============================================================

/// 预计算的边界虚单元值表
///
/// 每个 pass 构建一次：对每条边界面调用一次
/// [`GhostValueProvider`]，重构内核随后按面号 O(1) 查表，
/// 避免在（可能并行的）单元扫描里反复调用边界协作方。
#[derive(Debug, Clone)]
pub struct BoundaryGhosts {
    stride: usize,
    ordinal: Vec<u32>,
    values: Vec<f64>,
}

impl BoundaryGhosts {
    /// 守恒量虚单元表（浅水方案直接在守恒量上重构）
    pub fn conserved(
        mesh: &FvMesh,
        conserved: &CellFields,
        provider: &dyn GhostValueProvider,
    ) -> Self {
        Self::build(mesh, conserved, provider, None)
    }

    /// 原始量虚单元表：虚单元守恒量经状态方程转原始量
    pub fn primitive(
        mesh: &FvMesh,
        conserved: &CellFields,
        provider: &dyn GhostValueProvider,
        eos: &dyn EquationOfState,
    ) -> Self {
        Self::build(mesh, conserved, provider, Some(eos))
    }

    fn build(
        mesh: &FvMesh,
        conserved: &CellFields,
        provider: &dyn GhostValueProvider,
        eos: Option<&dyn EquationOfState>,
    ) -> Self {
        let stride = match eos {
            Some(e) => e.n_primitive(),
            None => conserved.n_fields(),
        };
        let boundary = mesh.boundary_faces();
        let mut ordinal = vec![NO_ORDINAL; mesh.n_faces()];
        let mut values = vec![0.0; boundary.len() * stride];
        let mut ghost = vec![0.0; conserved.n_fields()];

        for (i, &face_id) in boundary.iter().enumerate() {
            let face_idx = face_id as usize;
            ordinal[face_idx] = i as u32;

            let face = mesh.face(face_idx);
            let owner = mesh.face_owner(face_idx) as usize;
            provider.ghost_value(
                mesh.face_boundary_id(face_idx),
                owner,
                conserved.cell(owner),
                face.normal,
                &mut ghost,
            );

            let out = &mut values[i * stride..(i + 1) * stride];
            match eos {
                Some(e) => e.to_primitive(&ghost, out),
                None => out.copy_from_slice(&ghost),
            }
        }

        Self {
            stride,
            ordinal,
            values,
        }
    }

    /// 分量数
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// 指定面的虚单元值；内部面或越界面返回 `None`
    #[inline]
    pub fn get(&self, face: usize) -> Option<&[f64]> {
        let ord = *self.ordinal.get(face)?;
        if ord == NO_ORDINAL {
            return None;
        }
        let start = ord as usize * self.stride;
        Some(&self.values[start..start + self.stride])
    }
}

// ============================================================
// 测试
// ============================================================
