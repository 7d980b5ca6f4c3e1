//! 基于 EDT 的边缘提取.
//!
//! 输入是未阈值化的高斯差分 (DoG) 图. DoG 非负的体素组成区域 1, 其余为背景,
//! 对这个二值标签网格做平方 EDT (背景取负), 再按邻接阶数截取紧贴区域边界的
//! 一层体素作为边缘. DoG 滤波本身不在本模块内.

use std::str::FromStr;

use log::info;
use ndarray::{Array3, ArrayView3, Zip};

use crate::consts::{DOG_ROI, EDGE_TOLERANCE};
use crate::edt::{compute_edt, AxisMask, ConfigError, EdtOptions, EdtResult, Plane};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 取区域边界的哪一侧作为边缘.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgeSide {
    /// 负侧: 紧贴区域的背景体素. 关键字 `NEG`.
    #[default]
    Neg,

    /// 正侧: 紧贴背景的区域体素. 关键字 `POS`.
    Pos,

    /// 两侧, 输出均为正. 关键字 `BOTH`.
    Both,

    /// 两侧, 负侧输出取负. 关键字 `BOTH_SIGN`.
    BothSign,
}

impl EdgeSide {
    /// 平方 EDT 值落在该闭区间内的体素是边缘.
    pub fn window(&self, rank: NeighbourRank) -> (f32, f32) {
        let t = rank.threshold();
        match self {
            EdgeSide::Neg => (-t, 0.0),
            EdgeSide::Pos => (0.0, t),
            EdgeSide::Both | EdgeSide::BothSign => (-t, t),
        }
    }

    /// 输出是否保留负侧的符号?
    #[inline]
    pub fn keeps_sign(&self) -> bool {
        matches!(self, EdgeSide::BothSign)
    }

    /// 缩放时使用的两个百分位 (0 到 1 之间).
    fn percentiles(&self) -> (f64, f64) {
        match self {
            EdgeSide::Neg => (0.98, 0.50),
            EdgeSide::Pos => (0.02, 0.50),
            EdgeSide::Both | EdgeSide::BothSign => (0.25, 0.75),
        }
    }
}

impl FromStr for EdgeSide {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEG" => Ok(EdgeSide::Neg),
            "POS" => Ok(EdgeSide::Pos),
            "BOTH" => Ok(EdgeSide::Both),
            "BOTH_SIGN" => Ok(EdgeSide::BothSign),
            other => Err(ConfigError::UnknownEdgeSide(other.to_string())),
        }
    }
}

/// 边缘体素与区域边界之间允许的邻接关系.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum NeighbourRank {
    /// 共面.
    #[default]
    Face = 1,

    /// 共面或共棱.
    Edge = 2,

    /// 共面, 共棱或共顶点.
    Corner = 3,
}

impl NeighbourRank {
    /// 单位体素下对应的平方距离上限.
    #[inline]
    pub fn threshold(&self) -> f32 {
        *self as u8 as f32 * EDGE_TOLERANCE
    }
}

impl TryFrom<u8> for NeighbourRank {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(NeighbourRank::Face),
            2 => Ok(NeighbourRank::Edge),
            3 => Ok(NeighbourRank::Corner),
            r => Err(ConfigError::InvalidRank(r)),
        }
    }
}

/// 边缘提取选项.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeOptions {
    /// 边缘所在的一侧.
    pub side: EdgeSide,

    /// 邻接阶数.
    pub rank: NeighbourRank,

    /// 是否按 DoG 值缩放边缘. 详见 [`scale_boundaries`].
    pub scale: bool,

    /// 参与 EDT 的数组轴.
    pub axes: AxisMask,

    /// 二维模式的平面, 仅用于日志输出.
    pub plane: Option<Plane>,

    /// 日志详细程度. 0 表示不输出进度信息. 内部的 EDT 始终不输出日志.
    pub verbosity: u8,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        Self {
            side: EdgeSide::default(),
            rank: NeighbourRank::default(),
            scale: false,
            axes: AxisMask::full(),
            plane: None,
            verbosity: 1,
        }
    }
}

/// DoG 非负的体素标为 [`DOG_ROI`], 其余为 0.
pub fn dog_roi_map(dog: ArrayView3<f32>) -> Array3<u8> {
    dog.mapv(|v| if v >= 0.0 { DOG_ROI } else { 0 })
}

/// 边缘提取所用的 EDT 选项: 忽略体素边长, 背景取负, 输出平方距离, 不输出日志.
/// 二维设置沿用 `opts`.
pub fn edge_edt_options(opts: &EdgeOptions) -> EdtOptions {
    EdtOptions {
        squared: true,
        background_negative: true,
        ignore_voxdims: true,
        axes: opts.axes,
        plane: opts.plane,
        verbosity: 0,
        ..Default::default()
    }
}

/// 截取平方 EDT 中落在 `side` 窗口内的体素.
///
/// 边缘体素输出 1, 在 [`EdgeSide::BothSign`] 下负值体素输出 -1, 其余输出 0.
pub fn threshold_edt(edt: ArrayView3<f32>, rank: NeighbourRank, side: EdgeSide) -> Array3<i16> {
    let (bot, top) = side.window(rank);
    edt.mapv(|v| match (bot <= v && v <= top, side.keeps_sign() && v < 0.0) {
        (true, true) => -1,
        (true, false) => 1,
        (false, _) => 0,
    })
}

/// 从 DoG 图提取边缘, 需要时再按 DoG 值缩放.
///
/// # 返回值
///
/// DoG 图全部非负或全部为负时没有任何边界, 返回 `Err(EdtError::SingleLabel)`.
pub fn edge_boundaries(dog: ArrayView3<f32>, opts: &EdgeOptions) -> EdtResult<Array3<i16>> {
    if opts.verbosity > 0 {
        info!(
            "edge detection on {:?} grid, side {:?}, rank {}",
            dog.shape(),
            opts.side,
            opts.rank as u8
        );
    }
    let roi = dog_roi_map(dog);
    let edt = compute_edt(roi.view(), None, [1.0; 3], &edge_edt_options(opts))?;
    let bnd = threshold_edt(edt.view(), opts.rank, opts.side);

    if opts.scale {
        Ok(scale_boundaries(bnd.view(), dog, opts.side))
    } else {
        Ok(bnd)
    }
}

/// 按 DoG 值把边缘体素重新映射到 `1..=100`, 非边缘体素为 0.
///
/// 先在所有边缘体素的非零 DoG 值中取两个百分位 (线性插值):
///
/// 1. 单侧 (`Neg` 取 98% 与 50%, `Pos` 取 2% 与 50%):
///   `v = (dog - p0) / (p1 - p0)`;
/// 2. 双侧 (取 25% 与 75%): 非负 DoG 为 `dog / p75`, 负 DoG 为 `dog / p25`.
///
/// `v >= 1` 时输出 100, 否则输出 `99 max(v, 0) + 1` 的整数部分.
/// 百分位无法计算或除数为 0 时, 所有边缘体素输出 100.
/// [`EdgeSide::BothSign`] 下负 DoG 的边缘体素取负.
pub fn scale_boundaries(bnd: ArrayView3<i16>, dog: ArrayView3<f32>, side: EdgeSide) -> Array3<i16> {
    let mut values: Vec<f64> = Zip::from(&bnd)
        .and(&dog)
        .fold(Vec::new(), |mut acc, b, d| {
            if *b != 0 && *d != 0.0 {
                acc.push(*d as f64);
            }
            acc
        });
    values.sort_by(|a, b| a.total_cmp(b));

    let (p0, p1) = side.percentiles();
    let range = percentile(&values, p0).zip(percentile(&values, p1));

    let ratio = |num: f64, den: f64| if den == 0.0 { f64::INFINITY } else { num / den };
    Zip::from(&bnd).and(&dog).map_collect(|b, d| {
        if *b == 0 {
            return 0;
        }
        let d = *d as f64;
        let v = match (range, side) {
            (None, _) => f64::INFINITY,
            (Some((bot, top)), EdgeSide::Neg | EdgeSide::Pos) => ratio(d - bot, top - bot),
            (Some((bot, top)), EdgeSide::Both | EdgeSide::BothSign) => {
                if d >= 0.0 {
                    ratio(d, top)
                } else {
                    ratio(d, bot)
                }
            }
        };
        let out = if v.is_nan() || v >= 1.0 {
            100
        } else {
            (99.0 * v.max(0.0) + 1.0) as i16
        };
        if side.keeps_sign() && d < 0.0 {
            -out
        } else {
            out
        }
    })
}

/// 有序序列 `sorted` 的第 `p` 分位数, 在 `p * (n - 1)` 处线性插值. 空序列返回 `None`.
fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = p * last as f64;
    let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}
