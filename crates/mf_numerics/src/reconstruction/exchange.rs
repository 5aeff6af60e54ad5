// crates/mf_numerics/src/reconstruction/exchange.rs

//! 斜率交换接口
//!
//! 分区并行时，分区边界单元的斜率与均值需要在重构结束后同步。
//! 本模块只定义序列化记录与交换 trait；单进程运行用 [`NoExchange`]。
//!
//! # 设计要点
//! - 记录按单元全局编号为键，合并满足幂等与交换律：同一单元的
//!   记录来自唯一属主，重复应用或乱序应用结果不变。
//! - 斜率以 `[f64; 3]` 存储而非向量类型，保持记录可直接
//!   serde 序列化。

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// 单个单元的斜率同步记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopeRecord {
    /// 单元全局编号
    pub cell: u64,
    /// 每个场一条斜率，与快照场顺序一致
    pub slopes: Vec<[f64; 3]>,
    /// 单元原始变量均值，与斜率同序
    pub averages: Vec<f64>,
}

impl SlopeRecord {
    /// 从快照中一个单元的数据构造记录
    pub fn from_cell(cell: u64, slopes: &[DVec3], averages: &[f64]) -> Self {
        Self {
            cell,
            slopes: slopes.iter().map(|g| g.to_array()).collect(),
            averages: averages.to_vec(),
        }
    }

    /// 第 `field` 个场的斜率
    #[inline]
    pub fn slope(&self, field: usize) -> DVec3 {
        DVec3::from_array(self.slopes[field])
    }

    /// 场数
    #[inline]
    pub fn n_fields(&self) -> usize {
        self.slopes.len()
    }
}

/// 斜率交换通道
///
/// `exchange` 收到本进程拥有单元的记录，返回从其他属主收到的
/// 记录。实现方保证每个单元编号只由一个属主发出。
pub trait SlopeExchange: Send + Sync {
    /// 发送本地记录，返回收到的远端记录
    fn exchange(&self, local: &[SlopeRecord]) -> Vec<SlopeRecord>;

    /// 通道名称
    fn name(&self) -> &'static str;
}

/// 单进程空通道：不发送，也收不到任何记录
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExchange;

impl SlopeExchange for NoExchange {
    fn exchange(&self, _local: &[SlopeRecord]) -> Vec<SlopeRecord> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip_through_arrays() {
        let slopes = [DVec3::new(1.0, -2.0, 0.5), DVec3::ZERO];
        let rec = SlopeRecord::from_cell(42, &slopes, &[3.0, 4.0]);
        assert_eq!(rec.cell, 42);
        assert_eq!(rec.n_fields(), 2);
        assert_eq!(rec.slope(0), slopes[0]);
        assert_eq!(rec.slope(1), DVec3::ZERO);
        assert_eq!(rec.averages, vec![3.0, 4.0]);
    }

    #[test]
    fn test_no_exchange_returns_nothing() {
        let rec = SlopeRecord::from_cell(0, &[DVec3::X], &[1.0]);
        let ch = NoExchange;
        assert!(ch.exchange(&[rec]).is_empty());
        assert_eq!(ch.name(), "none");
    }
}
