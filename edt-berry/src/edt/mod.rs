//! 多区域欧氏距离变换 (EDT).
//!
//! 对标签网格中的每个体素, 计算它到最近的 "不同标签" 体素的欧氏距离.
//! 标签 0 为背景, 其余每个非零值都是一个区域 (可以由多个不连通的部分组成).
//! 支持各向异性体素, 二维逐片模式, 以及视野 (FOV) 边缘的两种处理策略.
//!
//! 算法是可分离的: 依次沿每个轴对所有一维线做 Felzenszwalb-Huttenlocher
//! 下包络变换, 每条线按标签切分为若干区间分别处理. 结果是精确的.
//!
//! # Examples
//!
//! ```
//! use edt_berry::edt::{compute_edt, EdtOptions, FovBoundary};
//! use ndarray::Array3;
//!
//! let mut labels = Array3::<u8>::zeros((1, 1, 8));
//! for w in [0, 1, 2, 6, 7] {
//!     labels[[0, 0, w]] = 1;
//! }
//! let opts = EdtOptions {
//!     squared: true,
//!     fov: FovBoundary::Open,
//!     ..Default::default()
//! };
//! let dist = compute_edt(labels.view(), None, [1.0; 3], &opts).unwrap();
//! assert_eq!(dist.as_slice().unwrap(), &[9.0f32, 4.0, 1.0, 1.0, 4.0, 1.0, 1.0, 4.0]);
//! ```

mod axes;
mod envelope;
mod error;
mod lines;
mod pass;
mod policy;

#[cfg(test)]
mod brute;

pub use axes::{AnatomicalAxis, AxisMask, Orientation, Plane};
pub use envelope::{squared_edt_1d, LowerEnvelope};
pub use error::{ConfigError, EdtError};
pub use pass::squared_distance_field;
pub use policy::annotate;

use log::info;
use ndarray::{Array3, ArrayView3};
use num::Zero;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// EDT 计算结果.
pub type EdtResult<T> = Result<T, EdtError>;

/// 可以作为区域标签的类型. `T::zero()` 代表背景.
///
/// 所有整数类型都自动满足该约束.
pub trait Label: Copy + PartialEq + Zero + Send + Sync {}

impl<T: Copy + PartialEq + Zero + Send + Sync> Label for T {}

/// 非零区域在视野边缘的处理策略. 背景 (标签 0) 在视野边缘总是开放的.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FovBoundary {
    /// 视野之外视为背景: 非零区域在视野边缘处终止,
    /// 边缘体素到视野外一格虚拟体素的距离参与比较.
    #[default]
    Closed,

    /// 视野之外是未知的: 区域向视野外无限延伸, 只有网格内的异标签体素构成边界.
    Open,
}

impl FovBoundary {
    /// 标签为 `label` 的区间在视野边缘是否闭合?
    #[inline]
    pub fn closes<T: Label>(&self, label: T) -> bool {
        matches!(self, FovBoundary::Closed) && !label.is_zero()
    }
}

/// EDT 选项.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdtOptions {
    /// 输出平方距离. 默认为 `false`, 即输出距离本身.
    pub squared: bool,

    /// 背景体素的距离取负值.
    pub background_negative: bool,

    /// 非零体素的距离取负值.
    pub foreground_negative: bool,

    /// 背景体素的输出置 0. 不能与 `background_negative` 同时使用.
    pub zero_background: bool,

    /// 非零区域在视野边缘的处理策略.
    pub fov: FovBoundary,

    /// 忽略体素边长, 所有轴都按单位间距计算.
    pub ignore_voxdims: bool,

    /// 参与变换的数组轴.
    pub axes: AxisMask,

    /// 二维模式的平面. 仅用于日志输出, 轴的选择以 `axes` 为准.
    /// 二者不一致时 (例如 `axes` 为全部三个轴), 日志按 `axes` 描述.
    pub plane: Option<Plane>,

    /// 日志详细程度. 0 表示不输出进度信息.
    pub verbosity: u8,
}

impl Default for EdtOptions {
    fn default() -> Self {
        Self {
            squared: false,
            background_negative: false,
            foreground_negative: false,
            zero_background: false,
            fov: FovBoundary::Closed,
            ignore_voxdims: false,
            axes: AxisMask::full(),
            plane: None,
            verbosity: 1,
        }
    }
}

impl EdtOptions {
    /// 检查选项之间是否冲突.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zero_background && self.background_negative {
            return Err(ConfigError::ConflictingSigns);
        }
        Ok(())
    }

    /// 切换为 `plane` 上的二维逐片模式. `orientation` 描述数据的三个数组轴.
    pub fn only_2d(mut self, plane: Plane, orientation: &Orientation) -> Self {
        self.axes = AxisMask::from_plane(plane, orientation);
        self.plane = Some(plane);
        self
    }

    /// 参与变换的轴的文字描述, 用于日志.
    ///
    /// 以 `axes` 为准: 三个轴全开时为 `3D`, `plane` 被忽略;
    /// 否则列出参与的数组轴, 有 `plane` 时附上平面名.
    pub fn describe_axes(&self) -> String {
        if self.axes.is_full() {
            return "3D".to_string();
        }
        let axes: Vec<usize> = self.axes.enabled().collect();
        match self.plane {
            Some(plane) => format!("{}D over axes {axes:?} ({plane} plane)", axes.len()),
            None => format!("{}D over axes {axes:?}", axes.len()),
        }
    }

    /// 实际参与计算的体素边长.
    #[inline]
    pub fn effective_spacing(&self, spacing: [f64; 3]) -> [f64; 3] {
        if self.ignore_voxdims {
            [1.0; 3]
        } else {
            spacing
        }
    }
}

/// 计算标签网格 `labels` 的 EDT.
///
/// `spacing` 是三个数组轴各自的体素边长. `mask` 为 `false` 的体素输出 0,
/// 但掩膜不会改变任何体素的距离.
///
/// # 返回值
///
/// 与 `labels` 形状相同的距离场. 配置冲突, 掩膜形状不符, 以及
/// [`squared_distance_field`] 的所有错误都会原样返回.
///
/// # 注意
///
/// 二维模式下只要有一个切片全是背景 (或在开放视野下只含一个标签),
/// 该切片的体素就没有边界, 整个网格返回 `Err(EdtError::Unbounded(n))`,
/// 其余切片的结果也不会返回. 需要逐片容错时, 调用方应先检查各切片,
/// 或把切片分别传入.
pub fn compute_edt<T: Label>(
    labels: ArrayView3<T>,
    mask: Option<ArrayView3<bool>>,
    spacing: [f64; 3],
    opts: &EdtOptions,
) -> EdtResult<Array3<f32>> {
    opts.validate()?;
    if let Some(m) = mask {
        if m.shape() != labels.shape() {
            let (a, b, c) = labels.dim();
            let (x, y, z) = m.dim();
            return Err(ConfigError::ShapeMismatch {
                labels: [a, b, c],
                mask: [x, y, z],
            }
            .into());
        }
    }

    let spacing = opts.effective_spacing(spacing);
    if opts.verbosity > 0 {
        info!(
            "EDT on {:?} grid, spacing {spacing:?}, {}",
            labels.shape(),
            opts.describe_axes()
        );
    }

    let dist2 = squared_distance_field(labels, spacing, opts.axes, opts.fov)?;
    let out = policy::apply_policy(dist2, labels, mask, opts);

    if opts.verbosity > 1 {
        let max = out.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        info!("EDT done, max |distance| = {max}");
    }
    Ok(out)
}
