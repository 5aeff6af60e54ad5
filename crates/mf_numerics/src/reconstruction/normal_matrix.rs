// crates/mf_numerics/src/reconstruction/normal_matrix.rs

//! 最小二乘法方程
//!
//! 对称法方程 A·∇φ = b 的累加与闭式求解。A 只依赖几何，
//! 每个单元累加一次即可供所有分量复用；1×1/2×2/3×3 用显式
//! 余子式公式求逆，不引入通用线性求解依赖。

use glam::DVec3;

/// 对称法方程矩阵（上三角存储）
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NormalMatrix {
    a11: f64,
    a12: f64,
    a13: f64,
    a22: f64,
    a23: f64,
    a33: f64,
}

impl NormalMatrix {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 累加一个采样方向: A += w · dx·dxᵀ
    #[inline]
    pub(crate) fn add_sample(&mut self, w: f64, dx: DVec3) {
        self.a11 += w * dx.x * dx.x;
        self.a12 += w * dx.x * dx.y;
        self.a13 += w * dx.x * dx.z;
        self.a22 += w * dx.y * dx.y;
        self.a23 += w * dx.y * dx.z;
        self.a33 += w * dx.z * dx.z;
    }

    /// 对角 Tikhonov 正则化
    #[inline]
    pub(crate) fn add_tikhonov(&mut self, eps: f64) {
        self.a11 += eps;
        self.a22 += eps;
        self.a33 += eps;
    }

    /// 按维度闭式求解 A·x = b
    ///
    /// 行列式低于 `det_eps` 或解非有限时返回 `None`，调用方把
    /// 该单元梯度留零（局部一阶退化，不是错误）。
    pub(crate) fn solve(&self, b: DVec3, dim: usize, det_eps: f64) -> Option<DVec3> {
        match dim {
            1 => {
                let det = self.a11;
                if det.abs() < det_eps {
                    return None;
                }
                let x = b.x / det;
                x.is_finite().then(|| DVec3::new(x, 0.0, 0.0))
            }
            2 => {
                let det = self.a11 * self.a22 - self.a12 * self.a12;
                if det.abs() < det_eps {
                    return None;
                }
                let inv = 1.0 / det;
                let x = (self.a22 * b.x - self.a12 * b.y) * inv;
                let y = (self.a11 * b.y - self.a12 * b.x) * inv;
                (x.is_finite() && y.is_finite()).then(|| DVec3::new(x, y, 0.0))
            }
            3 => {
                // 对称余子式
                let c11 = self.a22 * self.a33 - self.a23 * self.a23;
                let c12 = self.a13 * self.a23 - self.a12 * self.a33;
                let c13 = self.a12 * self.a23 - self.a13 * self.a22;
                let c22 = self.a11 * self.a33 - self.a13 * self.a13;
                let c23 = self.a12 * self.a13 - self.a11 * self.a23;
                let c33 = self.a11 * self.a22 - self.a12 * self.a12;

                let det = self.a11 * c11 + self.a12 * c12 + self.a13 * c13;
                if det.abs() < det_eps {
                    return None;
                }
                let inv = 1.0 / det;
                let x = (c11 * b.x + c12 * b.y + c13 * b.z) * inv;
                let y = (c12 * b.x + c22 * b.y + c23 * b.z) * inv;
                let z = (c13 * b.x + c23 * b.y + c33 * b.z) * inv;
                (x.is_finite() && y.is_finite() && z.is_finite())
                    .then(|| DVec3::new(x, y, z))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_1d() {
        let mut a = NormalMatrix::new();
        a.add_sample(1.0, DVec3::new(2.0, 0.0, 0.0));
        // A = 4, b = 4c => x = c
        let g = a.solve(DVec3::new(8.0, 0.0, 0.0), 1, 1e-20).unwrap();
        assert!((g.x - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_solve_2x2_diagonal() {
        let mut a = NormalMatrix::new();
        a.add_sample(1.0, DVec3::X);
        a.add_sample(1.0, DVec3::Y);
        let g = a.solve(DVec3::new(3.0, -2.0, 0.0), 2, 1e-20).unwrap();
        assert!((g - DVec3::new(3.0, -2.0, 0.0)).length() < 1e-14);
    }

    #[test]
    fn test_solve_2x2_singular() {
        // 两个共线方向：秩 1，必须拒绝
        let mut a = NormalMatrix::new();
        a.add_sample(1.0, DVec3::X);
        a.add_sample(1.0, DVec3::X * 2.0);
        assert!(a.solve(DVec3::new(1.0, 1.0, 0.0), 2, 1e-20).is_none());
    }

    #[test]
    fn test_solve_3x3_known_gradient() {
        // 线性场 φ = 1·x + 2·y + 3·z，四个独立方向精确恢复
        let grad = DVec3::new(1.0, 2.0, 3.0);
        let dirs = [
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.3, 1.0, 0.0),
            DVec3::new(-0.2, 0.4, 1.0),
            DVec3::new(1.0, 1.0, 1.0),
        ];
        let mut a = NormalMatrix::new();
        let mut b = DVec3::ZERO;
        for &dx in &dirs {
            let w = 1.0 / dx.length_squared();
            let dphi = grad.dot(dx);
            a.add_sample(w, dx);
            b += w * dphi * dx;
        }
        let g = a.solve(b, 3, 1e-20).unwrap();
        assert!((g - grad).length() < 1e-12, "恢复梯度 {:?}", g);
    }

    #[test]
    fn test_tikhonov_regularizes_singular_system() {
        let mut a = NormalMatrix::new();
        a.add_sample(1.0, DVec3::X);
        a.add_tikhonov(1e-6);
        // y 方向无采样，但正则化让系统可解且 y 分量接近零
        let g = a.solve(DVec3::new(1.0, 0.0, 0.0), 2, 1e-20).unwrap();
        assert!((g.x - 1.0).abs() < 1e-4);
        assert!(g.y.abs() < 1e-12);
    }

    #[test]
    fn test_empty_matrix_is_singular() {
        let a = NormalMatrix::new();
        assert!(a.solve(DVec3::ZERO, 2, 1e-20).is_none());
        assert!(a.solve(DVec3::ZERO, 3, 1e-20).is_none());
    }
}
