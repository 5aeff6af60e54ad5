// crates/mf_numerics/src/reconstruction/green_gauss.rs

//! Green-Gauss 坡度重构
//!
//! 散度定理离散：单元梯度 = Σ_面 φ_f · n_out · (面积/体积)。
//! 面值 φ_f 按面到两侧质心的距离混合，边界面取内侧与虚单元的
//! 算术平均。对每个原始分量独立累加，一次扫描得到全部梯度。
//!
//! # 设计要点
//!
//! 1. **纯几何权重**: 本侧权重 = d(cell,面)/(d(cell,面)+d(neighbor,面))，
//!    互补性保证面两侧单元对同一张面算出同一个面值，通量配对守恒；
//!    两侧质心重合时退化为 0.5
//! 2. **边界即虚单元**: 边界面混合权固定 0.5，面外值来自虚单元，
//!    与内部面共用同一条累加公式
//! 3. **无退化路径**: 任何单元都能得到有限梯度，不需要零梯度回退

use glam::DVec3;
use rayon::prelude::*;

use crate::fields::{CellFields, SlopeField};
use crate::mesh::FvMesh;
use crate::types::{ConfigError, GreenGaussConfig};

use super::BoundaryGhosts;

/// 两侧质心距离和的退化阈值
const DIST_EPS: f64 = 1e-14;

/// Green-Gauss 重构方案
#[derive(Debug, Clone, Copy)]
pub struct GreenGaussRecon {
    config: GreenGaussConfig,
}

impl GreenGaussRecon {
    /// 创建方案，校验配置
    pub fn new(config: GreenGaussConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 当前配置
    pub fn config(&self) -> &GreenGaussConfig {
        &self.config
    }

    /// 对全部单元、全部分量重构梯度
    ///
    /// `primitives` 与 `ghosts` 都是原始变量；`slopes` 的形状须与
    /// `primitives` 一致（调用方负责，debug 断言把关）。
    pub fn reconstruct(
        &self,
        mesh: &FvMesh,
        primitives: &CellFields,
        ghosts: &BoundaryGhosts,
        slopes: &mut SlopeField,
    ) {
        debug_assert_eq!(slopes.n_cells(), mesh.n_cells());
        debug_assert_eq!(slopes.n_fields(), primitives.n_fields());

        let n_fields = primitives.n_fields();
        if n_fields == 0 || mesh.n_cells() == 0 {
            return;
        }

        if self.config.parallel && mesh.n_cells() > self.config.parallel_threshold {
            slopes
                .as_mut_slice()
                .par_chunks_mut(n_fields)
                .enumerate()
                .for_each(|(cell, row)| self.cell_slopes(mesh, primitives, ghosts, cell, row));
        } else {
            for (cell, row) in slopes.as_mut_slice().chunks_mut(n_fields).enumerate() {
                self.cell_slopes(mesh, primitives, ghosts, cell, row);
            }
        }
    }

    /// 单个单元的散度累加
    fn cell_slopes(
        &self,
        mesh: &FvMesh,
        primitives: &CellFields,
        ghosts: &BoundaryGhosts,
        cell: usize,
        row: &mut [DVec3],
    ) {
        for g in row.iter_mut() {
            *g = DVec3::ZERO;
        }

        let centroid = mesh.cell_centroid(cell);
        let inv_vol = 1.0 / mesh.cell_volume(cell);

        for &face_id in mesh.cell_faces(cell) {
            let face_id = face_id as usize;
            let face = mesh.face(face_id);
            let flux_dir = face.normal * (mesh.outward_sign(cell, face_id) * face.area * inv_vol);

            match mesh.cell_neighbor_across(cell, face_id) {
                Some(nbr) => {
                    let nbr = nbr as usize;
                    let d_cell = (face.face_centroid - centroid).length();
                    let d_nbr = (face.face_centroid - mesh.cell_centroid(nbr)).length();
                    let total = d_cell + d_nbr;
                    // 本侧权重 = 本侧距离占比，两侧单元算出同一个面值
                    let w = if total > DIST_EPS { d_cell / total } else { 0.5 };
                    for (f, g) in row.iter_mut().enumerate() {
                        let phi_face =
                            w * primitives.get(cell, f) + (1.0 - w) * primitives.get(nbr, f);
                        *g += phi_face * flux_dir;
                    }
                }
                None => {
                    if let Some(ghost) = ghosts.get(face_id) {
                        for (f, g) in row.iter_mut().enumerate() {
                            let phi_face = 0.5 * (primitives.get(cell, f) + ghost[f]);
                            *g += phi_face * flux_dir;
                        }
                    } else {
                        // 无虚单元数据时按内侧值外推（等价零梯度边界）
                        for (f, g) in row.iter_mut().enumerate() {
                            *g += primitives.get(cell, f) * flux_dir;
                        }
                    }
                }
            }
        }
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{FixedGhost, ZeroGradientGhost};
    use crate::mesh::FvMeshBuilder;

    /// 单个单位正方形单元，四条边界面
    fn unit_square_cell() -> FvMesh {
        let mut b = FvMeshBuilder::new(2);
        let c = b.add_cell(DVec3::new(0.5, 0.5, 0.0), 1.0);
        b.add_boundary_face(c, DVec3::new(1.0, 0.5, 0.0), DVec3::X, 1.0, 1);
        b.add_boundary_face(c, DVec3::new(0.0, 0.5, 0.0), DVec3::NEG_X, 1.0, 2);
        b.add_boundary_face(c, DVec3::new(0.5, 1.0, 0.0), DVec3::Y, 1.0, 3);
        b.add_boundary_face(c, DVec3::new(0.5, 0.0, 0.0), DVec3::NEG_Y, 1.0, 4);
        b.build().unwrap()
    }

    /// 三个单位正方形单元排成一行，上下与两端为边界
    fn strip3() -> FvMesh {
        let mut b = FvMeshBuilder::new(2);
        let c: Vec<u32> = (0..3)
            .map(|i| b.add_cell(DVec3::new(i as f64 + 0.5, 0.5, 0.0), 1.0))
            .collect();
        b.add_interior_face(c[0], c[1], DVec3::new(1.0, 0.5, 0.0), DVec3::X, 1.0);
        b.add_interior_face(c[1], c[2], DVec3::new(2.0, 0.5, 0.0), DVec3::X, 1.0);
        b.add_boundary_face(c[0], DVec3::new(0.0, 0.5, 0.0), DVec3::NEG_X, 1.0, 10);
        b.add_boundary_face(c[2], DVec3::new(3.0, 0.5, 0.0), DVec3::X, 1.0, 11);
        for i in 0..3 {
            let x = i as f64 + 0.5;
            b.add_boundary_face(c[i as usize], DVec3::new(x, 1.0, 0.0), DVec3::Y, 1.0, 20);
            b.add_boundary_face(c[i as usize], DVec3::new(x, 0.0, 0.0), DVec3::NEG_Y, 1.0, 20);
        }
        b.build().unwrap()
    }

    #[test]
    fn test_uniform_field_zero_gradient() {
        let mesh = unit_square_cell();
        let prim = CellFields::from_vec(vec![3.5], 1, 1).unwrap();
        let ghosts = BoundaryGhosts::conserved(&mesh, &prim, &ZeroGradientGhost);
        let recon = GreenGaussRecon::new(GreenGaussConfig::default()).unwrap();

        let mut slopes = SlopeField::new(1, 1);
        recon.reconstruct(&mesh, &prim, &ghosts, &mut slopes);
        assert!(
            slopes.get(0, 0).length() < 1e-14,
            "均匀场梯度应为零: {:?}",
            slopes.get(0, 0)
        );
    }

    #[test]
    fn test_linear_field_exact_on_strip() {
        // φ = x，镜像虚单元取线性场在镜像点的值，三个单元都应精确恢复 ∇φ = x̂
        let mesh = strip3();
        let prim = CellFields::from_vec(vec![0.5, 1.5, 2.5], 3, 1).unwrap();
        let ghost = FixedGhost::new(1)
            .with_value(10, vec![-0.5])
            .unwrap()
            .with_value(11, vec![3.5])
            .unwrap();
        let ghosts = BoundaryGhosts::conserved(&mesh, &prim, &ghost);
        let recon = GreenGaussRecon::new(GreenGaussConfig::default()).unwrap();

        let mut slopes = SlopeField::new(3, 1);
        recon.reconstruct(&mesh, &prim, &ghosts, &mut slopes);
        for cell in 0..3 {
            let g = slopes.get(cell, 0);
            assert!(
                (g - DVec3::X).length() < 1e-13,
                "单元 {} 梯度 {:?} 应为 x̂",
                cell,
                g
            );
        }
    }

    #[test]
    fn test_stretched_pair_shares_face_value() {
        // 两个不等宽单元：本侧距离占比权重下，共享面从两侧算出的
        // 面值都是 0.4·0.5 + 0.6·1.75 = 1.25，通量配对守恒
        let mut b = FvMeshBuilder::new(2);
        let c0 = b.add_cell(DVec3::new(0.5, 0.5, 0.0), 1.0);
        let c1 = b.add_cell(DVec3::new(1.75, 0.5, 0.0), 1.5);
        b.add_interior_face(c0, c1, DVec3::new(1.0, 0.5, 0.0), DVec3::X, 1.0);
        b.add_boundary_face(c0, DVec3::new(0.0, 0.5, 0.0), DVec3::NEG_X, 1.0, 1);
        b.add_boundary_face(c1, DVec3::new(2.5, 0.5, 0.0), DVec3::X, 1.0, 2);
        b.add_boundary_face(c0, DVec3::new(0.5, 1.0, 0.0), DVec3::Y, 1.0, 3);
        b.add_boundary_face(c0, DVec3::new(0.5, 0.0, 0.0), DVec3::NEG_Y, 1.0, 3);
        b.add_boundary_face(c1, DVec3::new(1.75, 1.0, 0.0), DVec3::Y, 1.5, 3);
        b.add_boundary_face(c1, DVec3::new(1.75, 0.0, 0.0), DVec3::NEG_Y, 1.5, 3);
        let mesh = b.build().unwrap();

        // φ = x，端部镜像虚单元取 −0.5 与 3.25
        let prim = CellFields::from_vec(vec![0.5, 1.75], 2, 1).unwrap();
        let ghost = FixedGhost::new(1)
            .with_value(1, vec![-0.5])
            .unwrap()
            .with_value(2, vec![3.25])
            .unwrap();
        let ghosts = BoundaryGhosts::conserved(&mesh, &prim, &ghost);
        let recon = GreenGaussRecon::new(GreenGaussConfig::default()).unwrap();

        let mut slopes = SlopeField::new(2, 1);
        recon.reconstruct(&mesh, &prim, &ghosts, &mut slopes);

        // c0: (1.25 − 0)/1 = 1.25；c1: (2.5 − 1.25)/1.5
        let g0 = slopes.get(0, 0);
        let g1 = slopes.get(1, 0);
        assert!((g0 - DVec3::new(1.25, 0.0, 0.0)).length() < 1e-13, "g0 = {:?}", g0);
        assert!(
            (g1 - DVec3::new(1.25 / 1.5, 0.0, 0.0)).length() < 1e-13,
            "g1 = {:?}",
            g1
        );

        // 体积加权和等于边界面通量和 = 2.5·1 − 0·1（内部面成对抵消）
        let total = g0 * 1.0 + g1 * 1.5;
        assert!((total - DVec3::new(2.5, 0.0, 0.0)).length() < 1e-13);
    }

    #[test]
    fn test_multi_field_independent() {
        // 两个分量互不串扰：φ0 = x，φ1 = 常数
        let mesh = strip3();
        let prim =
            CellFields::from_vec(vec![0.5, 7.0, 1.5, 7.0, 2.5, 7.0], 3, 2).unwrap();
        let ghost = FixedGhost::new(2)
            .with_value(10, vec![-0.5, 7.0])
            .unwrap()
            .with_value(11, vec![3.5, 7.0])
            .unwrap();
        let ghosts = BoundaryGhosts::conserved(&mesh, &prim, &ghost);
        let recon = GreenGaussRecon::new(GreenGaussConfig::default()).unwrap();

        let mut slopes = SlopeField::new(3, 2);
        recon.reconstruct(&mesh, &prim, &ghosts, &mut slopes);
        assert!((slopes.get(1, 0) - DVec3::X).length() < 1e-13);
        assert!(slopes.get(1, 1).length() < 1e-14, "常数分量梯度应为零");
    }

    #[test]
    fn test_parallel_matches_serial() {
        let mesh = strip3();
        let prim = CellFields::from_vec(vec![0.5, 1.5, 2.5], 3, 1).unwrap();
        let ghosts = BoundaryGhosts::conserved(&mesh, &prim, &ZeroGradientGhost);

        let serial = GreenGaussRecon::new(GreenGaussConfig {
            parallel: false,
            parallel_threshold: 1000,
        })
        .unwrap();
        let parallel = GreenGaussRecon::new(GreenGaussConfig {
            parallel: true,
            parallel_threshold: 0,
        })
        .unwrap();

        let mut s1 = SlopeField::new(3, 1);
        let mut s2 = SlopeField::new(3, 1);
        serial.reconstruct(&mesh, &prim, &ghosts, &mut s1);
        parallel.reconstruct(&mesh, &prim, &ghosts, &mut s2);
        assert_eq!(s1, s2, "并行与串行结果必须一致");
    }

    #[test]
    fn test_zero_gradient_ghost_flattens_boundary() {
        // 零梯度虚单元下，单个单元看到的周围全是自身值，梯度为零
        let mesh = unit_square_cell();
        let prim = CellFields::from_vec(vec![42.0], 1, 1).unwrap();
        let ghosts = BoundaryGhosts::conserved(&mesh, &prim, &ZeroGradientGhost);
        let recon = GreenGaussRecon::new(GreenGaussConfig::default()).unwrap();

        let mut slopes = SlopeField::new(1, 1);
        recon.reconstruct(&mesh, &prim, &ghosts, &mut slopes);
        assert!(slopes.get(0, 0).length() < 1e-14);
    }
}
