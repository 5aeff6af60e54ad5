// crates/mf_numerics/src/reconstruction/pass.rs

//! 重构 pass 驱动
//!
//! 一次 pass：守恒量 → 原始均值缓存 → 逐单元坡度累加 →（可选）
//! 跨进程交换 → 定版发布。几何缓存（网格）跨 pass 复用，均值与
//! 坡度缓存每个 pass 整体重建，绝不部分更新。
//!
//! # 设计要点
//!
//! 1. **快照发布**: 定版结果打包成 [`SlopeSnapshot`]，经
//!    `RwLock<Option<Arc<_>>>` 一次写入；读者克隆 Arc，之后无锁访问
//! 2. **交换在定版前**: 边界毗邻单元的记录经 [`SlopeExchange`]
//!    往返一次，按全局单元号并入，合并幂等且可交换
//! 3. **日志只在 pass 级**: 热循环零日志，结束时一条 `debug!` 摘要

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::DVec3;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::boundary::GhostValueProvider;
use crate::eos::EquationOfState;
use crate::fields::{CellFields, SlopeField};
use crate::mesh::FvMesh;
use crate::types::{ConfigError, GreenGaussConfig, LeastSquaresConfig, ShallowWaterReconConfig};

use super::exchange::{NoExchange, SlopeExchange, SlopeRecord};
use super::green_gauss::GreenGaussRecon;
use super::least_squares::LsqRecon;
use super::shallow_water::{SweRecon, SWE_FIELDS};
use super::BoundaryGhosts;

// ============================================================
// 方案选择
// ============================================================

/// 坡度重构方案选择（含各方案参数）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SlopeScheme {
    /// 全零梯度，关闭高阶重构
    NoSlope,
    /// 1D 无操作体：坡度限制由外部一维限制器直接完成
    OneD,
    /// Green-Gauss 散度定理
    GreenGauss(GreenGaussConfig),
    /// 加权最小二乘
    LeastSquares(LeastSquaresConfig),
    /// 浅水多变量最小二乘（干单元 + 正性守卫）
    ShallowWater(ShallowWaterReconConfig),
}

impl Default for SlopeScheme {
    fn default() -> Self {
        Self::GreenGauss(GreenGaussConfig::default())
    }
}

impl SlopeScheme {
    /// 方案名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoSlope => "no_slope",
            Self::OneD => "one_d",
            Self::GreenGauss(_) => "green_gauss",
            Self::LeastSquares(_) => "least_squares",
            Self::ShallowWater(_) => "shallow_water",
        }
    }

    /// 校验方案参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::NoSlope | Self::OneD => Ok(()),
            Self::GreenGauss(cfg) => cfg.validate(),
            Self::LeastSquares(cfg) => cfg.validate(),
            Self::ShallowWater(cfg) => cfg.validate(),
        }
    }
}

enum SchemeImpl {
    NoSlope,
    OneD,
    GreenGauss(GreenGaussRecon),
    LeastSquares(LsqRecon),
    ShallowWater(SweRecon),
}

// ============================================================
// 错误与统计
// ============================================================

/// 重构 pass 错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconstructError {
    /// 输入形状或配置无效
    #[error("重构输入无效: {0}")]
    Invalid(#[from] ConfigError),
}

/// 单次 pass 的诊断统计
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassStats {
    /// 重构的单元总数
    pub cells: usize,
    /// 零梯度回退的单元数
    pub zero_gradient_cells: usize,
    /// 干单元数（仅浅水方案）
    pub dry_cells: usize,
    /// 正性守卫缩放的单元数（仅浅水方案）
    pub positivity_limited: usize,
    /// 交换并入的远端记录数
    pub exchanged_records: usize,
    /// pass 耗时
    pub elapsed: Duration,
}

// ============================================================
// 快照
// ============================================================

/// 定版的重构结果快照
///
/// 不可变；跨线程读者各持一个 Arc。`element_slope` 给出单元每个
/// 分量的梯度，`element_average` 给出同一 pass 缓存的原始变量均值。
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeSnapshot {
    slopes: SlopeField,
    averages: CellFields,
    stats: PassStats,
}

impl SlopeSnapshot {
    /// 单元的全部分量梯度
    #[inline]
    pub fn element_slope(&self, cell: usize) -> &[DVec3] {
        self.slopes.cell(cell)
    }

    /// 单元的原始变量均值
    #[inline]
    pub fn element_average(&self, cell: usize) -> &[f64] {
        self.averages.cell(cell)
    }

    /// 坡度场
    pub fn slopes(&self) -> &SlopeField {
        &self.slopes
    }

    /// 均值场
    pub fn averages(&self) -> &CellFields {
        &self.averages
    }

    /// 诊断统计
    pub fn stats(&self) -> &PassStats {
        &self.stats
    }

    /// 单元数量
    pub fn n_cells(&self) -> usize {
        self.slopes.n_cells()
    }
}

// ============================================================
// Pass 驱动
// ============================================================

/// 坡度重构驱动
///
/// 持有网格几何、方案、状态方程与边界/交换协作方；`run_pass`
/// 可重复调用，每次完整重建并发布新快照。实例自身 `Sync`，
/// 读者线程通过 [`snapshot`](Self::snapshot) 取最近定版结果。
pub struct SlopeReconstructor {
    mesh: Arc<FvMesh>,
    scheme: SchemeImpl,
    scheme_kind: SlopeScheme,
    eos: Arc<dyn EquationOfState>,
    ghost: Arc<dyn GhostValueProvider>,
    exchange: Arc<dyn SlopeExchange>,
    snapshot: RwLock<Option<Arc<SlopeSnapshot>>>,
}

impl SlopeReconstructor {
    /// 创建驱动，校验网格与方案配置
    pub fn new(
        mesh: Arc<FvMesh>,
        scheme: SlopeScheme,
        eos: Arc<dyn EquationOfState>,
        ghost: Arc<dyn GhostValueProvider>,
        exchange: Arc<dyn SlopeExchange>,
    ) -> Result<Self, ConfigError> {
        mesh.validate()?;
        let built = match scheme {
            SlopeScheme::NoSlope => SchemeImpl::NoSlope,
            SlopeScheme::OneD => SchemeImpl::OneD,
            SlopeScheme::GreenGauss(cfg) => SchemeImpl::GreenGauss(GreenGaussRecon::new(cfg)?),
            SlopeScheme::LeastSquares(cfg) => SchemeImpl::LeastSquares(LsqRecon::new(cfg)?),
            SlopeScheme::ShallowWater(cfg) => {
                if eos.n_conserved() != SWE_FIELDS {
                    return Err(ConfigError::SizeMismatch {
                        what: "浅水方案守恒分量",
                        expected: SWE_FIELDS,
                        actual: eos.n_conserved(),
                    });
                }
                SchemeImpl::ShallowWater(SweRecon::new(cfg)?)
            }
        };
        Ok(Self {
            mesh,
            scheme: built,
            scheme_kind: scheme,
            eos,
            ghost,
            exchange,
            snapshot: RwLock::new(None),
        })
    }

    /// 单进程便捷构造：交换通道为空通道
    pub fn single_process(
        mesh: Arc<FvMesh>,
        scheme: SlopeScheme,
        eos: Arc<dyn EquationOfState>,
        ghost: Arc<dyn GhostValueProvider>,
    ) -> Result<Self, ConfigError> {
        Self::new(mesh, scheme, eos, ghost, Arc::new(NoExchange))
    }

    /// 网格
    pub fn mesh(&self) -> &FvMesh {
        &self.mesh
    }

    /// 方案选择
    pub fn scheme(&self) -> SlopeScheme {
        self.scheme_kind
    }

    /// 最近一次定版的快照（尚未跑过 pass 时为 None）
    pub fn snapshot(&self) -> Option<Arc<SlopeSnapshot>> {
        self.snapshot.read().clone()
    }

    /// 执行一次完整的重构 pass 并发布快照
    ///
    /// `conserved` 是单元守恒量均值，形状须与网格和状态方程一致。
    pub fn run_pass(&self, conserved: &CellFields) -> Result<Arc<SlopeSnapshot>, ReconstructError> {
        let start = Instant::now();
        let mesh = &*self.mesh;

        if conserved.n_cells() != mesh.n_cells() {
            return Err(ConfigError::SizeMismatch {
                what: "守恒量单元数",
                expected: mesh.n_cells(),
                actual: conserved.n_cells(),
            }
            .into());
        }
        if conserved.n_fields() != self.eos.n_conserved() {
            return Err(ConfigError::SizeMismatch {
                what: "守恒量分量数",
                expected: self.eos.n_conserved(),
                actual: conserved.n_fields(),
            }
            .into());
        }

        // 每 pass 重建的均值缓存
        let mut averages = self.primitive_averages(conserved);
        let mut stats = PassStats {
            cells: mesh.n_cells(),
            ..PassStats::default()
        };

        // 逐单元累加
        let mut slopes = match &self.scheme {
            SchemeImpl::NoSlope | SchemeImpl::OneD => {
                SlopeField::new(mesh.n_cells(), self.eos.n_primitive())
            }
            SchemeImpl::GreenGauss(gg) => {
                let ghosts =
                    BoundaryGhosts::primitive(mesh, conserved, &*self.ghost, &*self.eos);
                let mut slopes = SlopeField::new(mesh.n_cells(), self.eos.n_primitive());
                gg.reconstruct(mesh, &averages, &ghosts, &mut slopes);
                slopes
            }
            SchemeImpl::LeastSquares(lsq) => {
                let ghosts =
                    BoundaryGhosts::primitive(mesh, conserved, &*self.ghost, &*self.eos);
                let mut slopes = SlopeField::new(mesh.n_cells(), self.eos.n_primitive());
                stats.zero_gradient_cells = lsq.reconstruct(mesh, &averages, &ghosts, &mut slopes);
                slopes
            }
            SchemeImpl::ShallowWater(swe) => {
                let ghosts = BoundaryGhosts::conserved(mesh, conserved, &*self.ghost);
                let mut slopes = SlopeField::new(mesh.n_cells(), SWE_FIELDS);
                let counters = swe.reconstruct(mesh, conserved, &ghosts, &mut slopes);
                stats.zero_gradient_cells = counters.zero_gradient;
                stats.dry_cells = counters.dry_cells;
                stats.positivity_limited = counters.positivity_limited;
                slopes
            }
        };

        // 交换并并入远端记录
        let local = self.boundary_records(&slopes, &averages);
        let received = self.exchange.exchange(&local);
        stats.exchanged_records = received.len();
        for rec in &received {
            self.apply_record(rec, &mut slopes, &mut averages)?;
        }

        stats.elapsed = start.elapsed();
        tracing::debug!(
            scheme = self.scheme_kind.name(),
            cells = stats.cells,
            zero_gradient = stats.zero_gradient_cells,
            dry = stats.dry_cells,
            positivity = stats.positivity_limited,
            exchanged = stats.exchanged_records,
            elapsed_ms = stats.elapsed.as_secs_f64() * 1e3,
            "坡度重构 pass 完成"
        );

        let snapshot = Arc::new(SlopeSnapshot {
            slopes,
            averages,
            stats,
        });
        *self.snapshot.write() = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// 守恒量 → 原始变量均值
    fn primitive_averages(&self, conserved: &CellFields) -> CellFields {
        let mut primitives = CellFields::new(conserved.n_cells(), self.eos.n_primitive());
        for cell in 0..conserved.n_cells() {
            self.eos
                .to_primitive(conserved.cell(cell), primitives.cell_mut(cell));
        }
        primitives
    }

    /// 参与跨进程面对的单元记录（单进程下即边界毗邻单元）
    fn boundary_records(&self, slopes: &SlopeField, averages: &CellFields) -> Vec<SlopeRecord> {
        let mut seen = vec![false; self.mesh.n_cells()];
        let mut records = Vec::new();
        for &face in self.mesh.boundary_faces() {
            let owner = self.mesh.face_owner(face as usize) as usize;
            if !seen[owner] {
                seen[owner] = true;
                records.push(SlopeRecord::from_cell(
                    owner as u64,
                    slopes.cell(owner),
                    averages.cell(owner),
                ));
            }
        }
        records
    }

    /// 把一条远端记录并入本地结果
    ///
    /// 非本地单元号直接忽略（属于其他分区的数据）；分量数不符
    /// 说明两端方案不一致，按配置错误处理。
    fn apply_record(
        &self,
        rec: &SlopeRecord,
        slopes: &mut SlopeField,
        averages: &mut CellFields,
    ) -> Result<(), ReconstructError> {
        let cell = rec.cell as usize;
        if cell >= self.mesh.n_cells() {
            return Ok(());
        }
        if rec.slopes.len() != slopes.n_fields() {
            return Err(ConfigError::SizeMismatch {
                what: "交换记录坡度分量",
                expected: slopes.n_fields(),
                actual: rec.slopes.len(),
            }
            .into());
        }
        if rec.averages.len() != averages.n_fields() {
            return Err(ConfigError::SizeMismatch {
                what: "交换记录均值分量",
                expected: averages.n_fields(),
                actual: rec.averages.len(),
            }
            .into());
        }
        for f in 0..rec.slopes.len() {
            slopes.set(cell, f, rec.slope(f));
        }
        averages.cell_mut(cell).copy_from_slice(&rec.averages);
        Ok(())
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::ZeroGradientGhost;
    use crate::eos::{IdealGasEos, IdentityEos, ShallowWaterEos};
    use crate::mesh::FvMeshBuilder;

    /// 三个单位正方形单元排成一行，闭合边界
    fn strip3() -> Arc<FvMesh> {
        let mut b = FvMeshBuilder::new(2);
        let c: Vec<u32> = (0..3)
            .map(|i| b.add_cell(DVec3::new(i as f64 + 0.5, 0.5, 0.0), 1.0))
            .collect();
        b.add_interior_face(c[0], c[1], DVec3::new(1.0, 0.5, 0.0), DVec3::X, 1.0);
        b.add_interior_face(c[1], c[2], DVec3::new(2.0, 0.5, 0.0), DVec3::X, 1.0);
        b.add_boundary_face(c[0], DVec3::new(0.0, 0.5, 0.0), DVec3::NEG_X, 1.0, 1);
        b.add_boundary_face(c[2], DVec3::new(3.0, 0.5, 0.0), DVec3::X, 1.0, 1);
        for i in 0..3usize {
            let x = i as f64 + 0.5;
            b.add_boundary_face(c[i], DVec3::new(x, 1.0, 0.0), DVec3::Y, 1.0, 2);
            b.add_boundary_face(c[i], DVec3::new(x, 0.0, 0.0), DVec3::NEG_Y, 1.0, 2);
        }
        Arc::new(b.build().unwrap())
    }

    fn identity_driver(scheme: SlopeScheme) -> SlopeReconstructor {
        SlopeReconstructor::single_process(
            strip3(),
            scheme,
            Arc::new(IdentityEos::new(1)),
            Arc::new(ZeroGradientGhost),
        )
        .unwrap()
    }

    #[test]
    fn test_no_slope_pass_zeroes_everything() {
        let driver = identity_driver(SlopeScheme::NoSlope);
        let conserved = CellFields::from_vec(vec![1.0, 2.0, 3.0], 3, 1).unwrap();
        let snap = driver.run_pass(&conserved).unwrap();

        assert_eq!(snap.stats().cells, 3);
        for cell in 0..3 {
            assert_eq!(snap.element_slope(cell), &[DVec3::ZERO]);
            assert_eq!(snap.element_average(cell), conserved.cell(cell));
        }
    }

    #[test]
    fn test_green_gauss_pass_publishes_snapshot() {
        let driver = identity_driver(SlopeScheme::default());
        assert!(driver.snapshot().is_none(), "跑 pass 之前无快照");

        let conserved = CellFields::from_vec(vec![0.5, 1.5, 2.5], 3, 1).unwrap();
        let snap = driver.run_pass(&conserved).unwrap();

        let read = driver.snapshot().unwrap();
        assert!(Arc::ptr_eq(&snap, &read), "发布的快照与返回值同源");
        // 中间单元在零梯度边界下仍是内部差分，恢复 x̂
        assert!((snap.element_slope(1)[0] - DVec3::X).length() < 1e-13);
    }

    #[test]
    fn test_pass_rejects_bad_shapes() {
        let driver = identity_driver(SlopeScheme::default());
        let wrong_cells = CellFields::new(2, 1);
        assert!(matches!(
            driver.run_pass(&wrong_cells),
            Err(ReconstructError::Invalid(ConfigError::SizeMismatch { .. }))
        ));

        let wrong_fields = CellFields::new(3, 2);
        assert!(driver.run_pass(&wrong_fields).is_err());
    }

    #[test]
    fn test_shallow_water_requires_three_conserved() {
        let err = SlopeReconstructor::single_process(
            strip3(),
            SlopeScheme::ShallowWater(ShallowWaterReconConfig::default()),
            Arc::new(IdentityEos::new(2)),
            Arc::new(ZeroGradientGhost),
        );
        assert!(matches!(
            err,
            Err(ConfigError::SizeMismatch { expected: 3, .. })
        ));
    }

    #[test]
    fn test_ideal_gas_averages_are_primitive() {
        let driver = SlopeReconstructor::single_process(
            strip3(),
            SlopeScheme::NoSlope,
            Arc::new(IdealGasEos::new(2).unwrap()),
            Arc::new(ZeroGradientGhost),
        )
        .unwrap();

        // ρ=1, u=2, v=0, p=1 => ρE=4.5（三个单元同值）
        let one = [1.0, 2.0, 0.0, 4.5];
        let mut data = Vec::new();
        for _ in 0..3 {
            data.extend_from_slice(&one);
        }
        let conserved = CellFields::from_vec(data, 3, 4).unwrap();
        let snap = driver.run_pass(&conserved).unwrap();
        let avg = snap.element_average(1);
        assert!((avg[0] - 1.0).abs() < 1e-14);
        assert!((avg[1] - 2.0).abs() < 1e-14);
        assert!((avg[3] - 1.0).abs() < 1e-12, "均值应为原始变量（压力）");
    }

    #[test]
    fn test_shallow_water_pass_reports_counters() {
        let driver = SlopeReconstructor::single_process(
            strip3(),
            SlopeScheme::ShallowWater(ShallowWaterReconConfig {
                dry_depth: 0.05,
                ..Default::default()
            }),
            Arc::new(ShallowWaterEos::new(0.05).unwrap()),
            Arc::new(ZeroGradientGhost),
        )
        .unwrap();

        // 中间单元干
        let data = vec![1.0, 0.2, 0.0, 0.01, 0.0, 0.0, 1.0, -0.2, 0.0];
        let conserved = CellFields::from_vec(data, 3, 3).unwrap();
        let snap = driver.run_pass(&conserved).unwrap();

        assert_eq!(snap.stats().dry_cells, 1);
        assert_eq!(snap.element_slope(1)[1], DVec3::ZERO, "干单元动量梯度为零");
        // 均值经浅水 EOS：干单元速度为零
        assert_eq!(snap.element_average(1), &[0.01, 0.0, 0.0]);
    }

    // ===== 交换合并 =====

    struct InjectExchange {
        records: Vec<SlopeRecord>,
    }

    impl SlopeExchange for InjectExchange {
        fn exchange(&self, _local: &[SlopeRecord]) -> Vec<SlopeRecord> {
            self.records.clone()
        }

        fn name(&self) -> &'static str {
            "inject"
        }
    }

    #[test]
    fn test_exchange_merge_overwrites_by_cell_id() {
        let rec = SlopeRecord {
            cell: 0,
            slopes: vec![[9.0, 0.0, 0.0]],
            averages: vec![77.0],
        };
        // 同一记录重复两次: 合并幂等
        let exchange = InjectExchange {
            records: vec![rec.clone(), rec.clone()],
        };
        let driver = SlopeReconstructor::new(
            strip3(),
            SlopeScheme::NoSlope,
            Arc::new(IdentityEos::new(1)),
            Arc::new(ZeroGradientGhost),
            Arc::new(exchange),
        )
        .unwrap();

        let conserved = CellFields::from_vec(vec![1.0, 2.0, 3.0], 3, 1).unwrap();
        let snap = driver.run_pass(&conserved).unwrap();

        assert_eq!(snap.stats().exchanged_records, 2);
        assert_eq!(snap.element_slope(0), &[DVec3::new(9.0, 0.0, 0.0)]);
        assert_eq!(snap.element_average(0), &[77.0]);
        // 其他单元不受影响
        assert_eq!(snap.element_slope(1), &[DVec3::ZERO]);
        assert_eq!(snap.element_average(2), &[3.0]);
    }

    #[test]
    fn test_exchange_ignores_foreign_cells() {
        // 其他分区的单元号超出本地范围，静默忽略
        let exchange = InjectExchange {
            records: vec![SlopeRecord {
                cell: 999,
                slopes: vec![[1.0, 1.0, 1.0]],
                averages: vec![1.0],
            }],
        };
        let driver = SlopeReconstructor::new(
            strip3(),
            SlopeScheme::NoSlope,
            Arc::new(IdentityEos::new(1)),
            Arc::new(ZeroGradientGhost),
            Arc::new(exchange),
        )
        .unwrap();

        let conserved = CellFields::from_vec(vec![1.0, 2.0, 3.0], 3, 1).unwrap();
        let snap = driver.run_pass(&conserved).unwrap();
        assert_eq!(snap.stats().exchanged_records, 1);
        for cell in 0..3 {
            assert_eq!(snap.element_slope(cell), &[DVec3::ZERO]);
        }
    }

    #[test]
    fn test_exchange_rejects_mismatched_record_shape() {
        let exchange = InjectExchange {
            records: vec![SlopeRecord {
                cell: 0,
                slopes: vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
                averages: vec![1.0],
            }],
        };
        let driver = SlopeReconstructor::new(
            strip3(),
            SlopeScheme::NoSlope,
            Arc::new(IdentityEos::new(1)),
            Arc::new(ZeroGradientGhost),
            Arc::new(exchange),
        )
        .unwrap();

        let conserved = CellFields::from_vec(vec![1.0, 2.0, 3.0], 3, 1).unwrap();
        assert!(driver.run_pass(&conserved).is_err(), "分量数不符应报错");
    }

    #[test]
    fn test_repeat_passes_rebuild_snapshot() {
        let driver = identity_driver(SlopeScheme::default());
        let first = driver
            .run_pass(&CellFields::from_vec(vec![0.5, 1.5, 2.5], 3, 1).unwrap())
            .unwrap();
        let second = driver
            .run_pass(&CellFields::from_vec(vec![2.5, 1.5, 0.5], 3, 1).unwrap())
            .unwrap();

        assert!(!Arc::ptr_eq(&first, &second), "每个 pass 发布新快照");
        // 旧快照保持不变（Arc 隔离），新快照反映新场
        assert!((first.element_slope(1)[0] - DVec3::X).length() < 1e-13);
        assert!((second.element_slope(1)[0] + DVec3::X).length() < 1e-13);
        let latest = driver.snapshot().unwrap();
        assert!(Arc::ptr_eq(&latest, &second));
    }
}
