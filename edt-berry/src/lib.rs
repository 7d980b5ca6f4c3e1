#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 对多区域 ROI 标签体数据计算欧氏距离变换 (EDT), 并在此基础上提取边缘.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 所有三维数据均按 `(z, h, w)` 访问, 即 nifti `(i, j, k)` 的逆序.
//!   体素边长, 轴开关等三元组也遵循同样的顺序.
//! 2. 在非期望情况下, 程序会直接 panic, 而不会导致内存错误. As what Rust promises.
//!
//! # 开发计划
//!
//! ### 一维抛物线下包络 ✅
//!
//! Felzenszwalb & Huttenlocher 的 O(N) 算法, 站点位置可以不是整数.
//!
//! 实现位于 `edt-berry/src/edt/envelope.rs`.
//!
//! ### 多标签可分离 EDT ✅
//!
//! 1. 任意多个标签, 每条线按标签切分为区间分别变换. ✅
//! 2. 各向异性体素. ✅
//! 3. 视野边缘的开放/闭合策略. ✅
//! 4. 二维逐片模式 (`axi`, `cor`, `sag`). ✅
//! 5. 符号, 背景抑制与掩膜. ✅
//!
//! 实现位于 `edt-berry/src/edt`.
//!
//! ### nifti 标签体积 ✅
//!
//! 从 header 读取体素边长和方向, 对多个子体并行计算 EDT.
//!
//! 实现位于 `edt-berry/src/data`.
//!
//! ### 基于 EDT 的边缘提取 ✅
//!
//! DoG 符号 -> 二值标签 -> EDT -> 阈值化, 以及按 DoG 百分位缩放.
//!
//! 实现位于 `edt-berry/src/edge`.
//!
//! ### 完善代码文档 ✅
//!
//! 给每个 public API 提供文档, 并视情况给 private
//! API 提供文档.

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// nii 标签文件基础数据结构.
mod data;

pub use data::{orientation_from_header, LabelVolume, NiftiHeaderAttr, OpenVolumeError};

pub mod consts;

pub mod edge;

pub mod edt;

pub mod prelude;
