//! 参与变换的空间轴选择.
//!
//! 数组的三个轴与解剖方向之间的关系由 [`Orientation`] 描述.
//! 二维模式下, 由 [`Plane`] 选出垂直于该平面的解剖轴,
//! 再通过方向信息找到它在数组中对应的轴并将其关闭.

use super::ConfigError;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 标准解剖轴.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnatomicalAxis {
    /// 左右方向 (R-L).
    LeftRight,

    /// 前后方向 (P-A).
    PosteriorAnterior,

    /// 上下方向 (I-S).
    InferiorSuperior,
}

impl AnatomicalAxis {
    /// 由 RAS+ 世界坐标轴下标 (`0 => x`, `1 => y`, `2 => z`) 得到解剖轴.
    ///
    /// 下标越界时返回 `None`.
    #[inline]
    pub const fn from_world_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::LeftRight),
            1 => Some(Self::PosteriorAnterior),
            2 => Some(Self::InferiorSuperior),
            _ => None,
        }
    }

    /// 由单个方向字母 (`R L A P I S`, 不区分大小写) 得到解剖轴.
    #[inline]
    pub const fn from_code(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' | 'L' => Some(Self::LeftRight),
            'A' | 'P' => Some(Self::PosteriorAnterior),
            'I' | 'S' => Some(Self::InferiorSuperior),
            _ => None,
        }
    }
}

/// 二维模式下逐片处理的平面.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Plane {
    /// 横断面 (axial), 关键字 `axi`.
    Axial,

    /// 冠状面 (coronal), 关键字 `cor`.
    Coronal,

    /// 矢状面 (sagittal), 关键字 `sag`.
    Sagittal,
}

impl Plane {
    /// 该平面的法向解剖轴, 即二维模式下被关闭的轴.
    #[inline]
    pub const fn normal(&self) -> AnatomicalAxis {
        match self {
            Plane::Axial => AnatomicalAxis::InferiorSuperior,
            Plane::Coronal => AnatomicalAxis::PosteriorAnterior,
            Plane::Sagittal => AnatomicalAxis::LeftRight,
        }
    }

    /// 平面关键字.
    #[inline]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Plane::Axial => "axi",
            Plane::Coronal => "cor",
            Plane::Sagittal => "sag",
        }
    }
}

impl FromStr for Plane {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "axi" => Ok(Plane::Axial),
            "cor" => Ok(Plane::Coronal),
            "sag" => Ok(Plane::Sagittal),
            other => Err(ConfigError::UnknownPlane(other.to_string())),
        }
    }
}

impl Display for Plane {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// 数组三个轴 (按 `ndarray` 轴序) 各自对应的解剖轴.
///
/// 该结构保证三个分量互不相同.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Orientation([AnatomicalAxis; 3]);

impl Orientation {
    /// 检查 `axes` 是否恰好是三个标准解剖轴的一个排列.
    pub fn new(axes: [AnatomicalAxis; 3]) -> Result<Self, ConfigError> {
        let [a, b, c] = axes;
        if a == b || b == c || a == c {
            return Err(ConfigError::UnresolvedOrientation);
        }
        Ok(Self(axes))
    }

    /// 获取数组第 `axis` 个轴对应的解剖轴. 越界时 panic.
    #[inline]
    pub fn axis(&self, axis: usize) -> AnatomicalAxis {
        self.0[axis]
    }

    /// 找到解剖轴 `target` 在数组中的轴序号.
    #[inline]
    pub fn position(&self, target: AnatomicalAxis) -> usize {
        // `Self::new` 已保证三个解剖轴都出现.
        self.0.iter().position(|a| *a == target).unwrap_or(0)
    }
}

/// 形如 `RAI`, `LPS` 的三字母方向码, 每个字母依次描述一个数组轴.
impl FromStr for Orientation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut axes = s.chars().map(AnatomicalAxis::from_code);
        match (axes.next(), axes.next(), axes.next(), axes.next()) {
            (Some(Some(a)), Some(Some(b)), Some(Some(c)), None) => Self::new([a, b, c]),
            _ => Err(ConfigError::UnresolvedOrientation),
        }
    }
}

/// 参与变换的数组轴开关.
///
/// 至少有一个轴处于打开状态.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisMask([bool; 3]);

impl Default for AxisMask {
    #[inline]
    fn default() -> Self {
        Self::full()
    }
}

impl AxisMask {
    /// 完整三维变换.
    #[inline]
    pub const fn full() -> Self {
        Self([true; 3])
    }

    /// 手动指定每个轴的开关. 全部关闭时返回 `Err(ConfigError::NoAxisEnabled)`.
    pub fn new(on: [bool; 3]) -> Result<Self, ConfigError> {
        if on.iter().any(|b| *b) {
            Ok(Self(on))
        } else {
            Err(ConfigError::NoAxisEnabled)
        }
    }

    /// 二维模式: 关闭 `plane` 法向在 `orientation` 下对应的数组轴,
    /// 保留张成该平面的另外两个轴.
    pub fn from_plane(plane: Plane, orientation: &Orientation) -> Self {
        let mut on = [true; 3];
        on[orientation.position(plane.normal())] = false;
        Self(on)
    }

    /// 由可选平面得到开关. `None` 代表完整三维变换.
    #[inline]
    pub fn from_optional_plane(plane: Option<Plane>, orientation: &Orientation) -> Self {
        plane.map_or_else(Self::full, |p| Self::from_plane(p, orientation))
    }

    /// 第 `axis` 个数组轴是否参与变换. 越界时返回 `false`.
    #[inline]
    pub fn is_enabled(&self, axis: usize) -> bool {
        self.0.get(axis).copied().unwrap_or(false)
    }

    /// 按升序迭代参与变换的数组轴.
    #[inline]
    pub fn enabled(&self) -> impl Iterator<Item = usize> + '_ {
        (0..3).filter(|i| self.0[*i])
    }

    /// 参与变换的轴个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.0.iter().filter(|b| **b).count()
    }

    /// 是否为完整三维变换?
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count() == 3
    }

    /// 获取原始开关数组.
    #[inline]
    pub fn as_array(&self) -> [bool; 3] {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_keywords() {
        assert_eq!("axi".parse::<Plane>(), Ok(Plane::Axial));
        assert_eq!("cor".parse::<Plane>(), Ok(Plane::Coronal));
        assert_eq!("sag".parse::<Plane>(), Ok(Plane::Sagittal));
        assert_eq!(
            "axial".parse::<Plane>(),
            Err(ConfigError::UnknownPlane("axial".to_string()))
        );
        for p in [Plane::Axial, Plane::Coronal, Plane::Sagittal] {
            assert_eq!(p.to_string().parse::<Plane>(), Ok(p));
        }
    }

    #[test]
    fn test_orientation_code() {
        let o: Orientation = "RAI".parse().unwrap();
        assert_eq!(o.axis(0), AnatomicalAxis::LeftRight);
        assert_eq!(o.axis(1), AnatomicalAxis::PosteriorAnterior);
        assert_eq!(o.axis(2), AnatomicalAxis::InferiorSuperior);

        let o: Orientation = "sla".parse().unwrap();
        assert_eq!(o.position(AnatomicalAxis::InferiorSuperior), 0);
        assert_eq!(o.position(AnatomicalAxis::PosteriorAnterior), 2);

        assert!("RLA".parse::<Orientation>().is_err());
        assert!("RA".parse::<Orientation>().is_err());
        assert!("RAIS".parse::<Orientation>().is_err());
        assert!("RXI".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_mask_from_plane() {
        // 常见的 (z, h, w) 存储: 第 0 轴为上下方向.
        let o: Orientation = "SPR".parse().unwrap();
        assert_eq!(
            AxisMask::from_plane(Plane::Axial, &o).as_array(),
            [false, true, true]
        );
        assert_eq!(
            AxisMask::from_plane(Plane::Coronal, &o).as_array(),
            [true, false, true]
        );
        assert_eq!(
            AxisMask::from_plane(Plane::Sagittal, &o).as_array(),
            [true, true, false]
        );
        assert!(AxisMask::from_optional_plane(None, &o).is_full());

        let m = AxisMask::from_plane(Plane::Coronal, &o);
        assert_eq!(m.count(), 2);
        assert_eq!(m.enabled().collect::<Vec<_>>(), vec![0, 2]);
        assert!(!m.is_enabled(1));
        assert!(!m.is_enabled(7));
    }

    #[test]
    fn test_mask_needs_an_axis() {
        assert_eq!(AxisMask::new([false; 3]), Err(ConfigError::NoAxisEnabled));
        assert_eq!(AxisMask::new([false, false, true]).unwrap().count(), 1);
        assert_eq!(AxisMask::default(), AxisMask::full());
    }
}
