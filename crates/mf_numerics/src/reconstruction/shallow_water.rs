// crates/mf_numerics/src/reconstruction/shallow_water.rs

//! 浅水多变量坡度重构
//!
//! 对守恒量 (h, hu, hv) 做加权最小二乘重构，并追加两条浅水
//! 专属安全规则：
//!
//! 1. **干单元**: 水深低于 `dry_depth` 的单元动量梯度归零，
//!    避免干区出现虚假动量坡度
//! 2. **正性守卫**: 逐面评估外推水深，若低于
//!    `dry_depth + positivity_eps` 则按 Barth-Jespersen 方式用
//!    单一标量 φ_s 缩放水深梯度，保证任何面外推水深不为负
//!
//! 守卫只作用于水深分量；动量梯度由干单元规则单独处理。

use glam::DVec3;
use rayon::prelude::*;

use crate::fields::{CellFields, SlopeField};
use crate::mesh::FvMesh;
use crate::types::{ConfigError, ShallowWaterReconConfig};

use super::least_squares::LsqRecon;
use super::BoundaryGhosts;

/// 守恒量分量数: (h, hu, hv)
pub const SWE_FIELDS: usize = 3;

/// 水深分量下标
const H: usize = 0;

/// 单次重构的浅水计数器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweCounters {
    /// 零梯度回退的单元数
    pub zero_gradient: usize,
    /// 干单元数
    pub dry_cells: usize,
    /// 正性守卫缩放过水深梯度的单元数
    pub positivity_limited: usize,
}

impl SweCounters {
    fn merge(self, other: Self) -> Self {
        Self {
            zero_gradient: self.zero_gradient + other.zero_gradient,
            dry_cells: self.dry_cells + other.dry_cells,
            positivity_limited: self.positivity_limited + other.positivity_limited,
        }
    }
}

/// 浅水坡度重构方案
#[derive(Debug, Clone, Copy)]
pub struct SweRecon {
    config: ShallowWaterReconConfig,
    base: LsqRecon,
}

impl SweRecon {
    /// 创建方案，校验配置
    pub fn new(config: ShallowWaterReconConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let base = LsqRecon::new(config.least_squares())?;
        Ok(Self { config, base })
    }

    /// 当前配置
    pub fn config(&self) -> &ShallowWaterReconConfig {
        &self.config
    }

    /// 对全部单元重构 (h, hu, hv) 梯度
    ///
    /// `conserved` 必须恰好 3 个分量；`ghosts` 为守恒量虚单元表。
    pub fn reconstruct(
        &self,
        mesh: &FvMesh,
        conserved: &CellFields,
        ghosts: &BoundaryGhosts,
        slopes: &mut SlopeField,
    ) -> SweCounters {
        debug_assert_eq!(conserved.n_fields(), SWE_FIELDS);
        debug_assert_eq!(slopes.n_cells(), mesh.n_cells());
        debug_assert_eq!(slopes.n_fields(), SWE_FIELDS);

        if mesh.n_cells() == 0 {
            return SweCounters::default();
        }

        let lsq = self.base.config();
        if lsq.parallel && mesh.n_cells() > lsq.parallel_threshold {
            slopes
                .as_mut_slice()
                .par_chunks_mut(SWE_FIELDS)
                .enumerate()
                .map(|(cell, row)| self.cell_slopes(mesh, conserved, ghosts, cell, row))
                .reduce(SweCounters::default, SweCounters::merge)
        } else {
            slopes
                .as_mut_slice()
                .chunks_mut(SWE_FIELDS)
                .enumerate()
                .map(|(cell, row)| self.cell_slopes(mesh, conserved, ghosts, cell, row))
                .fold(SweCounters::default(), SweCounters::merge)
        }
    }

    /// 单个单元：最小二乘 + 干单元规则 + 正性守卫
    fn cell_slopes(
        &self,
        mesh: &FvMesh,
        conserved: &CellFields,
        ghosts: &BoundaryGhosts,
        cell: usize,
        row: &mut [DVec3],
    ) -> SweCounters {
        let mut counters = SweCounters::default();
        if self.base.cell_slopes(mesh, conserved, ghosts, cell, row) {
            counters.zero_gradient = 1;
        }

        let h = conserved.get(cell, H);
        if h < self.config.dry_depth {
            row[1] = DVec3::ZERO;
            row[2] = DVec3::ZERO;
            counters.dry_cells = 1;
        }

        if self.config.positivity_guard && row[H] != DVec3::ZERO {
            let phi_s = self.depth_scale(mesh, cell, h, row[H]);
            if phi_s < 1.0 {
                row[H] *= phi_s;
                counters.positivity_limited = 1;
            }
        }
        counters
    }

    /// 水深梯度的正性缩放因子
    ///
    /// 余量 margin = h − (dry_depth + positivity_eps)。margin ≤ 0 时
    /// 单元自身已在阈值之下，任何外推都守不住，直接把水深梯度
    /// 整个清零；否则对外推越界的面取 φ_s = margin/(−Δh) 的最小值。
    /// 缩放后最坏面的水深恰好落在阈值上。
    fn depth_scale(&self, mesh: &FvMesh, cell: usize, h: f64, grad_h: DVec3) -> f64 {
        let threshold = self.config.dry_depth + self.config.positivity_eps;
        let margin = h - threshold;
        if margin <= 0.0 {
            return 0.0;
        }

        let centroid = mesh.cell_centroid(cell);
        let mut phi_s = 1.0_f64;
        for &face_id in mesh.cell_faces(cell) {
            let face = mesh.face(face_id as usize);
            let dh = grad_h.dot(face.face_centroid - centroid);
            // 越界的面必然 dh < −margin < 0
            if h + dh < threshold {
                phi_s = phi_s.min(margin / (-dh));
            }
        }
        phi_s.clamp(0.0, 1.0)
    }
}

// ============================================================
// 测试
// ============================================================
