// crates/mf_runtime/src/error.rs

//! 运行时错误类型
//!
//! 基础层只定义与数据布局相关的少量错误；数值内核的配置校验错误
//! 定义在上层 crate 中。

use std::fmt;

/// 运行时错误
#[derive(Debug, Clone)]
pub enum RuntimeError {
    /// 索引越界
    IndexOutOfBounds {
        /// 索引类型名称
        index_type: &'static str,
        /// 索引值
        index: usize,
        /// 容量
        len: usize,
    },
    /// 切片长度不匹配
    SizeMismatch {
        /// 数据名称
        what: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },
    /// 数值错误（NaN/Inf）
    NonFinite {
        /// 出错位置描述
        context: String,
    },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds {
                index_type,
                index,
                len,
            } => {
                write!(f, "{}({}) 越界，长度为 {}", index_type, index, len)
            }
            Self::SizeMismatch {
                what,
                expected,
                actual,
            } => {
                write!(f, "{} 长度不匹配: 期望 {}, 实际 {}", what, expected, actual)
            }
            Self::NonFinite { context } => {
                write!(f, "数值非有限: {}", context)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// 运行时结果类型
pub type RuntimeResult<T> = Result<T, RuntimeError>;
