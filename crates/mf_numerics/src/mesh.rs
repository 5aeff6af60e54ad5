// crates/mf_numerics/src/mesh.rs

//! 有限体积网格几何
//!
//! 冻结后的只读几何视图：单元质心/体积、面几何包、CSR 邻接表。
//! 插值与重构算法只依赖本模块的访问器，不关心网格来源。
//!
//! # 设计要点
//!
//! 1. **只读**: 通过 [`FvMeshBuilder`] 一次性构建并校验，之后不可修改
//! 2. **面几何包**: 每个面预计算插值所需的全部几何量（[`FaceGeometry`]），
//!    热循环中以 `&FaceGeometry` 零拷贝传给插值核
//! 3. **哨兵约定**: `face_neighbor` 中 `u32::MAX` 表示边界面

use glam::DVec3;

use crate::types::ConfigError;

/// 边界面在 neighbor 数组中的哨兵值
pub const NO_NEIGHBOR: u32 = u32::MAX;

/// 法向量退化判定阈值
const NORMAL_LEN_EPS: f64 = 1e-14;

// ============================================================
// 面几何包
// ============================================================

/// 单个面的几何量集合
///
/// 插值核的唯一几何输入。内部面由 owner(elem) 指向 neighbor；
/// 边界面的 `neighbor_centroid` 是镜像虚单元质心，`g_c` 恒为 1。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry {
    /// elem 侧几何插值权重 g_C ∈ [0,1]
    pub g_c: f64,
    /// elem 质心指向 neighbor 质心的连线向量 d_CN
    pub d_cn: DVec3,
    /// elem（owner）单元质心
    pub elem_centroid: DVec3,
    /// neighbor 单元质心（边界面为镜像虚单元质心）
    pub neighbor_centroid: DVec3,
    /// 面质心
    pub face_centroid: DVec3,
    /// 倾斜校正向量：面质心 − 连线与面平面的交点
    pub skewness_correction: DVec3,
    /// 单位法向量，由 elem 指向 neighbor
    pub normal: DVec3,
    /// 面面积（2D 为边长，1D 为 1）
    pub area: f64,
    /// 是否存在真实邻居单元
    pub has_neighbor: bool,
}

impl FaceGeometry {
    /// 构造内部面几何
    ///
    /// `normal` 须已归一化并指向 neighbor 侧。
    pub fn interior(
        elem_centroid: DVec3,
        neighbor_centroid: DVec3,
        face_centroid: DVec3,
        normal: DVec3,
        area: f64,
    ) -> Self {
        let d_cn = neighbor_centroid - elem_centroid;
        let d_cf = (face_centroid - elem_centroid).length();
        let d_nf = (face_centroid - neighbor_centroid).length();
        let total = d_cf + d_nf;
        let g_c = if total > NORMAL_LEN_EPS {
            d_nf / total
        } else {
            0.5
        };

        // 连线与面平面的交点；正交网格上交点即面质心，校正为零
        let denom = d_cn.dot(normal);
        let skewness_correction = if denom.abs() > NORMAL_LEN_EPS {
            let t = (face_centroid - elem_centroid).dot(normal) / denom;
            let intersection = elem_centroid + d_cn * t;
            face_centroid - intersection
        } else {
            DVec3::ZERO
        };

        Self {
            g_c,
            d_cn,
            elem_centroid,
            neighbor_centroid,
            face_centroid,
            skewness_correction,
            normal,
            area,
            has_neighbor: true,
        }
    }

    /// 构造边界面几何
    ///
    /// 虚单元质心取 elem 质心关于面质心的镜像，d_CN 因而穿过面质心，
    /// 倾斜校正为零。
    pub fn boundary(elem_centroid: DVec3, face_centroid: DVec3, normal: DVec3, area: f64) -> Self {
        let to_face = face_centroid - elem_centroid;
        Self {
            g_c: 1.0,
            d_cn: to_face * 2.0,
            elem_centroid,
            neighbor_centroid: elem_centroid + to_face * 2.0,
            face_centroid,
            skewness_correction: DVec3::ZERO,
            normal,
            area,
            has_neighbor: false,
        }
    }

    /// 是否为边界面
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.has_neighbor
    }

    /// 倾斜校正后的面点（连线与面平面的交点）
    #[inline]
    pub fn face_point(&self) -> DVec3 {
        self.face_centroid - self.skewness_correction
    }
}

// ============================================================
// 冻结网格
// ============================================================

/// 有限体积冻结网格
///
/// 构建后只读。面几何按面编号存放，单元到面的邻接用
/// offsets + indices 压缩格式。
#[derive(Debug, Clone)]
pub struct FvMesh {
    /// 空间维度 (1/2/3)
    pub dim: usize,

    // ===== 单元数据 =====
    /// 单元数量
    pub n_cells: usize,
    /// 单元质心
    pub cell_centroid: Vec<DVec3>,
    /// 单元体积（2D 为面积，1D 为长度）
    pub cell_volume: Vec<f64>,
    /// 单元面索引 (压缩格式: offsets)
    pub cell_face_offsets: Vec<usize>,
    /// 单元面索引列表
    pub cell_face_indices: Vec<u32>,

    // ===== 面数据 =====
    /// 面总数
    pub n_faces: usize,
    /// 面几何包
    pub face_geom: Vec<FaceGeometry>,
    /// 面 owner 单元索引
    pub face_owner: Vec<u32>,
    /// 面 neighbor 单元索引 (NO_NEIGHBOR 表示边界)
    pub face_neighbor: Vec<u32>,
    /// 面边界 ID（内部面为 0，无意义）
    pub face_boundary_id: Vec<u32>,
    /// 内部面索引列表
    pub interior_face_indices: Vec<u32>,
    /// 边界面索引列表
    pub boundary_face_indices: Vec<u32>,
}

impl FvMesh {
    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 面总数
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.n_faces
    }

    /// 边界面数量
    #[inline]
    pub fn n_boundary_faces(&self) -> usize {
        self.boundary_face_indices.len()
    }

    /// 获取面几何包
    #[inline]
    pub fn face(&self, face: usize) -> &FaceGeometry {
        &self.face_geom[face]
    }

    /// 获取面 owner
    #[inline]
    pub fn face_owner(&self, face: usize) -> u32 {
        self.face_owner[face]
    }

    /// 获取面 neighbor
    #[inline]
    pub fn face_neighbor(&self, face: usize) -> Option<u32> {
        let n = self.face_neighbor[face];
        if n == NO_NEIGHBOR {
            None
        } else {
            Some(n)
        }
    }

    /// 判断是否为边界面
    #[inline]
    pub fn is_boundary_face(&self, face: usize) -> bool {
        self.face_neighbor[face] == NO_NEIGHBOR
    }

    /// 获取面边界 ID（内部面返回 0）
    #[inline]
    pub fn face_boundary_id(&self, face: usize) -> u32 {
        self.face_boundary_id[face]
    }

    /// 获取单元质心
    #[inline]
    pub fn cell_centroid(&self, cell: usize) -> DVec3 {
        self.cell_centroid[cell]
    }

    /// 获取单元体积
    #[inline]
    pub fn cell_volume(&self, cell: usize) -> f64 {
        self.cell_volume[cell]
    }

    /// 获取单元的面索引列表
    #[inline]
    pub fn cell_faces(&self, cell: usize) -> &[u32] {
        let start = self.cell_face_offsets[cell];
        let end = self.cell_face_offsets[cell + 1];
        &self.cell_face_indices[start..end]
    }

    /// 单元在指定面上的外法向符号（owner 侧 +1，neighbor 侧 −1）
    #[inline]
    pub fn outward_sign(&self, cell: usize, face: usize) -> f64 {
        if self.face_owner[face] as usize == cell {
            1.0
        } else {
            -1.0
        }
    }

    /// 跨过指定面的邻居单元
    #[inline]
    pub fn cell_neighbor_across(&self, cell: usize, face: usize) -> Option<u32> {
        let owner = self.face_owner[face];
        let neighbor = self.face_neighbor[face];
        if neighbor == NO_NEIGHBOR {
            None
        } else if owner as usize == cell {
            Some(neighbor)
        } else {
            Some(owner)
        }
    }

    /// 单元索引范围
    #[inline]
    pub fn cells(&self) -> std::ops::Range<usize> {
        0..self.n_cells
    }

    /// 内部面索引列表
    #[inline]
    pub fn interior_faces(&self) -> &[u32] {
        &self.interior_face_indices
    }

    /// 边界面索引列表
    #[inline]
    pub fn boundary_faces(&self) -> &[u32] {
        &self.boundary_face_indices
    }

    /// 网格特征尺度：单元体积的 dim 次方根的平均值
    ///
    /// 供 Venkatakrishnan 限制器的 ε² = (K·h)³ 使用。
    pub fn characteristic_length(&self) -> f64 {
        if self.n_cells == 0 {
            return 0.0;
        }
        let exponent = 1.0 / self.dim as f64;
        let sum: f64 = self.cell_volume.iter().map(|v| v.powf(exponent)).sum();
        sum / self.n_cells as f64
    }

    /// 验证网格完整性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3).contains(&self.dim) {
            return Err(ConfigError::InvalidDimension { dim: self.dim });
        }
        if self.cell_centroid.len() != self.n_cells {
            return Err(ConfigError::SizeMismatch {
                what: "cell_centroid",
                expected: self.n_cells,
                actual: self.cell_centroid.len(),
            });
        }
        if self.cell_volume.len() != self.n_cells {
            return Err(ConfigError::SizeMismatch {
                what: "cell_volume",
                expected: self.n_cells,
                actual: self.cell_volume.len(),
            });
        }
        if self.face_geom.len() != self.n_faces {
            return Err(ConfigError::SizeMismatch {
                what: "face_geom",
                expected: self.n_faces,
                actual: self.face_geom.len(),
            });
        }
        if self.cell_face_offsets.len() != self.n_cells + 1 {
            return Err(ConfigError::SizeMismatch {
                what: "cell_face_offsets",
                expected: self.n_cells + 1,
                actual: self.cell_face_offsets.len(),
            });
        }
        for (i, &owner) in self.face_owner.iter().enumerate() {
            if owner as usize >= self.n_cells {
                return Err(ConfigError::CellOutOfRange {
                    face: i,
                    cell: owner as usize,
                    n_cells: self.n_cells,
                });
            }
        }
        for (i, &neighbor) in self.face_neighbor.iter().enumerate() {
            if neighbor != NO_NEIGHBOR && neighbor as usize >= self.n_cells {
                return Err(ConfigError::CellOutOfRange {
                    face: i,
                    cell: neighbor as usize,
                    n_cells: self.n_cells,
                });
            }
        }
        for &vol in &self.cell_volume {
            if !vol.is_finite() || vol <= 0.0 {
                return Err(ConfigError::NotPositive {
                    field: "cell_volume",
                    value: vol,
                });
            }
        }
        Ok(())
    }
}

// ============================================================
// 构建器
// ============================================================

struct BuilderFace {
    owner: u32,
    neighbor: Option<u32>,
    centroid: DVec3,
    normal: DVec3,
    area: f64,
    boundary_id: u32,
}

/// 网格构建器
///
/// 按单元、面逐个推入，`build()` 时一次性校验并预计算面几何。
/// 法向量无需预先归一化，构建时自动归一并调整朝向
/// （owner 指向 neighbor；边界面指向域外）。
pub struct FvMeshBuilder {
    dim: usize,
    cell_centroid: Vec<DVec3>,
    cell_volume: Vec<f64>,
    faces: Vec<BuilderFace>,
}

impl FvMeshBuilder {
    /// 创建指定维度的构建器
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            cell_centroid: Vec::new(),
            cell_volume: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// 添加单元，返回单元编号
    pub fn add_cell(&mut self, centroid: DVec3, volume: f64) -> u32 {
        let id = self.cell_centroid.len() as u32;
        self.cell_centroid.push(centroid);
        self.cell_volume.push(volume);
        id
    }

    /// 添加内部面
    pub fn add_interior_face(
        &mut self,
        owner: u32,
        neighbor: u32,
        centroid: DVec3,
        normal: DVec3,
        area: f64,
    ) -> u32 {
        let id = self.faces.len() as u32;
        self.faces.push(BuilderFace {
            owner,
            neighbor: Some(neighbor),
            centroid,
            normal,
            area,
            boundary_id: 0,
        });
        id
    }

    /// 添加边界面
    pub fn add_boundary_face(
        &mut self,
        owner: u32,
        centroid: DVec3,
        normal: DVec3,
        area: f64,
        boundary_id: u32,
    ) -> u32 {
        let id = self.faces.len() as u32;
        self.faces.push(BuilderFace {
            owner,
            neighbor: None,
            centroid,
            normal,
            area,
            boundary_id,
        });
        id
    }

    /// 构建冻结网格
    pub fn build(self) -> Result<FvMesh, ConfigError> {
        if !(1..=3).contains(&self.dim) {
            return Err(ConfigError::InvalidDimension { dim: self.dim });
        }
        let n_cells = self.cell_centroid.len();
        let n_faces = self.faces.len();

        for &vol in &self.cell_volume {
            if !vol.is_finite() || vol <= 0.0 {
                return Err(ConfigError::NotPositive {
                    field: "cell_volume",
                    value: vol,
                });
            }
        }

        let mut face_geom = Vec::with_capacity(n_faces);
        let mut face_owner = Vec::with_capacity(n_faces);
        let mut face_neighbor = Vec::with_capacity(n_faces);
        let mut face_boundary_id = Vec::with_capacity(n_faces);
        let mut interior_face_indices = Vec::new();
        let mut boundary_face_indices = Vec::new();

        for (i, f) in self.faces.iter().enumerate() {
            if f.owner as usize >= n_cells {
                return Err(ConfigError::CellOutOfRange {
                    face: i,
                    cell: f.owner as usize,
                    n_cells,
                });
            }
            if let Some(nbr) = f.neighbor {
                if nbr as usize >= n_cells {
                    return Err(ConfigError::CellOutOfRange {
                        face: i,
                        cell: nbr as usize,
                        n_cells,
                    });
                }
            }
            if !f.area.is_finite() || f.area <= 0.0 {
                return Err(ConfigError::NotPositive {
                    field: "face_area",
                    value: f.area,
                });
            }

            let len = f.normal.length();
            if !len.is_finite() || len < NORMAL_LEN_EPS {
                return Err(ConfigError::DegenerateNormal { face: i });
            }
            let mut normal = f.normal / len;

            let owner_c = self.cell_centroid[f.owner as usize];
            let geom = match f.neighbor {
                Some(nbr) => {
                    let nbr_c = self.cell_centroid[nbr as usize];
                    // 法向统一为 owner 指向 neighbor
                    if normal.dot(nbr_c - owner_c) < 0.0 {
                        normal = -normal;
                    }
                    FaceGeometry::interior(owner_c, nbr_c, f.centroid, normal, f.area)
                }
                None => {
                    // 边界法向指向域外
                    if normal.dot(f.centroid - owner_c) < 0.0 {
                        normal = -normal;
                    }
                    FaceGeometry::boundary(owner_c, f.centroid, normal, f.area)
                }
            };
            face_geom.push(geom);
            face_owner.push(f.owner);
            match f.neighbor {
                Some(nbr) => {
                    face_neighbor.push(nbr);
                    interior_face_indices.push(i as u32);
                }
                None => {
                    face_neighbor.push(NO_NEIGHBOR);
                    boundary_face_indices.push(i as u32);
                }
            }
            face_boundary_id.push(f.boundary_id);
        }

        // 压缩格式的单元-面邻接表
        let mut counts = vec![0usize; n_cells];
        for f in &self.faces {
            counts[f.owner as usize] += 1;
            if let Some(nbr) = f.neighbor {
                counts[nbr as usize] += 1;
            }
        }
        let mut cell_face_offsets = vec![0usize; n_cells + 1];
        for c in 0..n_cells {
            cell_face_offsets[c + 1] = cell_face_offsets[c] + counts[c];
        }
        let mut cursor = cell_face_offsets.clone();
        let mut cell_face_indices = vec![0u32; cell_face_offsets[n_cells]];
        for (i, f) in self.faces.iter().enumerate() {
            cell_face_indices[cursor[f.owner as usize]] = i as u32;
            cursor[f.owner as usize] += 1;
            if let Some(nbr) = f.neighbor {
                cell_face_indices[cursor[nbr as usize]] = i as u32;
                cursor[nbr as usize] += 1;
            }
        }

        let mesh = FvMesh {
            dim: self.dim,
            n_cells,
            cell_centroid: self.cell_centroid,
            cell_volume: self.cell_volume,
            cell_face_offsets,
            cell_face_indices,
            n_faces,
            face_geom,
            face_owner,
            face_neighbor,
            face_boundary_id,
            interior_face_indices,
            boundary_face_indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// 两个单位正方形单元共享一条竖直面
    fn two_cell_mesh() -> FvMesh {
        let mut b = FvMeshBuilder::new(2);
        let c0 = b.add_cell(DVec3::new(0.5, 0.5, 0.0), 1.0);
        let c1 = b.add_cell(DVec3::new(1.5, 0.5, 0.0), 1.0);
        b.add_interior_face(c0, c1, DVec3::new(1.0, 0.5, 0.0), DVec3::X, 1.0);
        b.add_boundary_face(c0, DVec3::new(0.0, 0.5, 0.0), DVec3::NEG_X, 1.0, 1);
        b.add_boundary_face(c1, DVec3::new(2.0, 0.5, 0.0), DVec3::X, 1.0, 2);
        b.build().unwrap()
    }

    #[test]
    fn test_two_cell_geometry() {
        let mesh = two_cell_mesh();
        assert_eq!(mesh.n_cells(), 2);
        assert_eq!(mesh.n_faces(), 3);
        assert_eq!(mesh.n_boundary_faces(), 2);

        let face = mesh.face(0);
        assert!((face.g_c - 0.5).abs() < 1e-14, "等距面 g_C 应为 0.5");
        assert!((face.d_cn - DVec3::X).length() < 1e-14);
        assert!(face.skewness_correction.length() < 1e-14, "正交网格无倾斜校正");
        assert!(!face.is_boundary());
    }

    #[test]
    fn test_unequal_spacing_weight() {
        // elem 到面 0.5，neighbor 到面 1.5 => g_C = 1.5/2.0 = 0.75
        let mut b = FvMeshBuilder::new(2);
        let c0 = b.add_cell(DVec3::new(0.5, 0.5, 0.0), 1.0);
        let c1 = b.add_cell(DVec3::new(2.5, 0.5, 0.0), 3.0);
        b.add_interior_face(c0, c1, DVec3::new(1.0, 0.5, 0.0), DVec3::X, 1.0);
        let mesh = b.build().unwrap();
        assert!((mesh.face(0).g_c - 0.75).abs() < 1e-14);
    }

    #[test]
    fn test_normal_reoriented_toward_neighbor() {
        let mut b = FvMeshBuilder::new(2);
        let c0 = b.add_cell(DVec3::new(0.5, 0.5, 0.0), 1.0);
        let c1 = b.add_cell(DVec3::new(1.5, 0.5, 0.0), 1.0);
        // 故意传入反向、非单位长度的法向
        b.add_interior_face(c0, c1, DVec3::new(1.0, 0.5, 0.0), DVec3::new(-2.0, 0.0, 0.0), 1.0);
        let mesh = b.build().unwrap();
        assert!((mesh.face(0).normal - DVec3::X).length() < 1e-14);
    }

    #[test]
    fn test_boundary_ghost_point_is_mirror() {
        let mesh = two_cell_mesh();
        let face = mesh.face(1);
        assert!(face.is_boundary());
        assert!((face.g_c - 1.0).abs() < 1e-14);
        // 虚单元质心 = elem 质心关于面质心的镜像 (-0.5, 0.5)
        assert!((face.neighbor_centroid - DVec3::new(-0.5, 0.5, 0.0)).length() < 1e-14);
    }

    #[test]
    fn test_cell_face_adjacency() {
        let mesh = two_cell_mesh();
        assert_eq!(mesh.cell_faces(0), &[0, 1]);
        assert_eq!(mesh.cell_faces(1), &[0, 2]);
        assert_eq!(mesh.cell_neighbor_across(0, 0), Some(1));
        assert_eq!(mesh.cell_neighbor_across(1, 0), Some(0));
        assert_eq!(mesh.cell_neighbor_across(0, 1), None);
        assert!((mesh.outward_sign(0, 0) - 1.0).abs() < 1e-14);
        assert!((mesh.outward_sign(1, 0) + 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_skewed_face_correction() {
        // 面质心偏离 elem-neighbor 连线，应产生非零校正
        let mut b = FvMeshBuilder::new(2);
        let c0 = b.add_cell(DVec3::new(0.5, 0.5, 0.0), 1.0);
        let c1 = b.add_cell(DVec3::new(1.5, 0.5, 0.0), 1.0);
        b.add_interior_face(c0, c1, DVec3::new(1.0, 0.7, 0.0), DVec3::X, 1.0);
        let mesh = b.build().unwrap();
        let face = mesh.face(0);
        assert!((face.skewness_correction - DVec3::new(0.0, 0.2, 0.0)).length() < 1e-14);
        // 校正后的面点落回连线上
        assert!((face.face_point() - DVec3::new(1.0, 0.5, 0.0)).length() < 1e-14);
    }

    #[test]
    fn test_builder_rejects_bad_input() {
        let mut b = FvMeshBuilder::new(2);
        b.add_cell(DVec3::ZERO, 1.0);
        b.add_interior_face(0, 7, DVec3::X, DVec3::X, 1.0);
        assert!(matches!(
            b.build(),
            Err(ConfigError::CellOutOfRange { cell: 7, .. })
        ));

        let mut b = FvMeshBuilder::new(2);
        b.add_cell(DVec3::ZERO, -1.0);
        assert!(matches!(
            b.build(),
            Err(ConfigError::NotPositive { field: "cell_volume", .. })
        ));

        let mut b = FvMeshBuilder::new(5);
        b.add_cell(DVec3::ZERO, 1.0);
        assert!(matches!(
            b.build(),
            Err(ConfigError::InvalidDimension { dim: 5 })
        ));

        let mut b = FvMeshBuilder::new(2);
        b.add_cell(DVec3::ZERO, 1.0);
        b.add_boundary_face(0, DVec3::X, DVec3::ZERO, 1.0, 0);
        assert!(matches!(
            b.build(),
            Err(ConfigError::DegenerateNormal { face: 0 })
        ));
    }

    #[test]
    fn test_characteristic_length() {
        let mesh = two_cell_mesh();
        // 两个单位面积的 2D 单元，特征尺度 = 1
        assert!((mesh.characteristic_length() - 1.0).abs() < 1e-14);
    }
}
