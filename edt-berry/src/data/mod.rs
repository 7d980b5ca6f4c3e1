use std::fmt::{self, Display, Formatter};
use std::path::Path;

use ndarray::{Array3, Array4, ArrayView3, ArrayView4, Axis, Ix4};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::BACKGROUND;
use crate::edt::{compute_edt, AxisMask, ConfigError, EdtOptions, EdtResult, Orientation, Plane};
use crate::Idx3d;

mod orient;

pub use orient::orientation_from_header;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// nifti 体积数据的 header 共用属性.
///
/// 所有返回值都按 `ndarray` 轴序 `(z, h, w)` 排列, 与 nifti 的 `(i, j, k)` 顺序相反.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取单个体素的三个边长, 依次对应数组的第 0, 1, 2 轴.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 体素分辨率在三个维度上是否是各向同的?
    #[inline]
    fn is_isotropic(&self) -> bool {
        let [z, h, w] = self.pix_dim();
        z == h && z == w
    }

    /// 获取体素的实际体积值.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }

    /// 获取数组三个轴的解剖方向. 详见 [`orientation_from_header`].
    #[inline]
    fn orientation(&self) -> Result<Orientation, ConfigError> {
        orientation_from_header(self.header())
    }
}

/// 打开 nifti 标签文件时的错误.
#[derive(Debug)]
pub enum OpenVolumeError {
    /// nifti 读取错误.
    Nifti(nifti::NiftiError),

    /// 数据既不是三维也不是四维. 参数为实际维数.
    Dimensionality(usize),
}

impl Display for OpenVolumeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nifti(e) => write!(f, "cannot read nifti volume: {e}"),
            Self::Dimensionality(n) => write!(f, "expected a 3D or 4D volume, got {n}D"),
        }
    }
}

impl std::error::Error for OpenVolumeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Nifti(e) => Some(e),
            Self::Dimensionality(_) => None,
        }
    }
}

impl From<nifti::NiftiError> for OpenVolumeError {
    #[inline]
    fn from(value: nifti::NiftiError) -> Self {
        Self::Nifti(value)
    }
}

/// nii 格式的标签体积, 包括 header 和一个或多个子体 (sub-brick) 的标签.
///
/// 数据按 `(brick, z, h, w)` 存储, 标签值以 `i32` 保存, 0 为背景.
#[derive(Debug, Clone)]
pub struct LabelVolume {
    header: BoxedHeader,
    data: Array4<i32>,
}

impl NiftiHeaderAttr for LabelVolume {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl LabelVolume {
    /// 打开 nii 文件格式的标签体积. 三维数据视为只有一个子体,
    /// 四维数据的第四维为子体下标.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenVolumeError> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        // [W, H, z, (t)] -> [(t), z, H, W].
        let data = obj.into_volume().into_ndarray::<i32>()?.reversed_axes();
        let ndim = data.ndim();
        let data = match ndim {
            3 => data.insert_axis(Axis(0)),
            4 => data,
            _ => return Err(OpenVolumeError::Dimensionality(ndim)),
        };
        let data = data
            .into_dimensionality::<Ix4>()
            .map_err(|_| OpenVolumeError::Dimensionality(ndim))?
            .as_standard_layout()
            .into_owned();

        Ok(Self { header, data })
    }

    /// 根据裸标签数据直接创建实体.
    ///
    /// `data` 按 `(brick, z, h, w)` 组织, `pix_dim` 按 `[z, h, w]` 给出.
    /// header 中没有任何方向信息, 因此方向按单位矩阵推断.
    ///
    /// # 注意
    ///
    /// 该方法创建的实体仅用于实验和测试, 可用 [`Self::is_faked`] 区分.
    pub fn from_bricks(data: Array4<i32>, pix_dim: [f64; 3]) -> Self {
        let mut header = Box::<NiftiHeader>::default();
        let [z, h, w] = pix_dim;
        header.pixdim = [1.0, w as f32, h as f32, z as f32, 1.0, 1.0, 1.0, 1.0];
        header.sform_code = 0;
        header.qform_code = 0;
        header.intent_name[..4].copy_from_slice(b"fake");

        let data = data.as_standard_layout().into_owned();
        Self { header, data }
    }

    /// 判断该结构是否是由 [`Self::from_bricks`] 手动拼接的.
    pub fn is_faked(&self) -> bool {
        self.header.intent_name.starts_with(b"fake")
    }

    /// 子体个数.
    #[inline]
    pub fn len_bricks(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// 单个子体的形状 `(z, h, w)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        let (_, z, h, w) = self.data.dim();
        (z, h, w)
    }

    /// 获取第 `i` 个子体的标签视图. 越界时 panic.
    #[inline]
    pub fn brick(&self, i: usize) -> ArrayView3<'_, i32> {
        self.data.index_axis(Axis(0), i)
    }

    /// 获得全部数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView4<'_, i32> {
        self.data.view()
    }

    /// 第 `i` 个子体中非零体素组成的掩膜. 越界时 panic.
    pub fn nonzero_mask(&self, i: usize) -> Array3<bool> {
        self.brick(i).mapv(|l| l != BACKGROUND)
    }

    /// 获取 `plane` 平面二维模式下参与变换的数组轴.
    #[inline]
    pub fn plane_axes(&self, plane: Plane) -> Result<AxisMask, ConfigError> {
        Ok(AxisMask::from_plane(plane, &self.orientation()?))
    }

    /// 按 header 中的体素边长, 对每个子体计算 EDT.
    ///
    /// 所有子体共用同一个 `mask`, 其形状必须与单个子体一致.
    /// 返回值的第 `i` 项对应第 `i` 个子体; 单个子体失败不影响其他子体.
    pub fn euler_dist(
        &self,
        mask: Option<ArrayView3<'_, bool>>,
        opts: &EdtOptions,
    ) -> Vec<EdtResult<Array3<f32>>> {
        let spacing = self.pix_dim();
        if opts.verbosity > 0 {
            log::info!(
                "EDT over {} sub-brick(s) of shape {:?}",
                self.len_bricks(),
                self.shape()
            );
        }
        self.map_bricks(|brick| compute_edt(brick, mask, spacing, opts))
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        impl LabelVolume {
            /// 借助 `rayon`, 并行地对每个子体实施 `op` 操作, 结果按子体顺序收集.
            fn map_bricks<R, F>(&self, op: F) -> Vec<R>
            where
                R: Send,
                F: Fn(ArrayView3<'_, i32>) -> R + Sync + Send,
            {
                self.data.axis_iter(Axis(0)).into_par_iter().map(op).collect()
            }
        }
    } else {
        impl LabelVolume {
            fn map_bricks<R, F>(&self, op: F) -> Vec<R>
            where
                F: Fn(ArrayView3<'_, i32>) -> R,
            {
                self.data.axis_iter(Axis(0)).map(op).collect()
            }
        }
    }
}
