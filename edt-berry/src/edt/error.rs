//! 运行时错误.

use std::fmt::{self, Display, Formatter};

/// 配置错误. 一般应由调用方在调用 EDT 之前就检查出来.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 未知的二维平面关键字 (仅接受 `axi`, `cor`, `sag`).
    UnknownPlane(String),

    /// 未知的边缘侧关键字 (仅接受 `NEG`, `POS`, `BOTH`, `BOTH_SIGN`).
    UnknownEdgeSide(String),

    /// 邻接阶数必须为 1, 2 或 3.
    InvalidRank(u8),

    /// 数据方向无法对应到三个标准解剖轴.
    UnresolvedOrientation,

    /// `zero_background` 与 `background_negative` 不能同时打开.
    ConflictingSigns,

    /// 没有任何一个轴参与变换.
    NoAxisEnabled,

    /// 体素边长必须为有限正数.
    InvalidSpacing([f64; 3]),

    /// 标签与掩膜形状不一致. 分别为标签形状和掩膜形状.
    ShapeMismatch {
        /// 标签形状.
        labels: [usize; 3],
        /// 掩膜形状.
        mask: [usize; 3],
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPlane(s) => write!(f, "unknown plane `{s}`, expected axi, cor or sag"),
            Self::UnknownEdgeSide(s) => {
                write!(f, "unknown edge side `{s}`, expected NEG, POS, BOTH or BOTH_SIGN")
            }
            Self::InvalidRank(r) => write!(f, "neighbour rank must be 1, 2 or 3, got {r}"),
            Self::UnresolvedOrientation => {
                write!(f, "orientation does not map onto the three anatomical axes")
            }
            Self::ConflictingSigns => write!(
                f,
                "zeroing and negating the background cannot be combined"
            ),
            Self::NoAxisEnabled => write!(f, "no axis enabled for the transform"),
            Self::InvalidSpacing(s) => write!(f, "invalid voxel spacing {s:?}"),
            Self::ShapeMismatch { labels, mask } => {
                write!(f, "label shape {labels:?} does not match mask shape {mask:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// EDT 计算错误.
#[derive(Debug, Clone, PartialEq)]
pub enum EdtError {
    /// 配置错误.
    Config(ConfigError),

    /// 网格至少有一个维度为 0.
    EmptyGrid,

    /// 整个网格只有一种标签, 不存在任何区域边界.
    SingleLabel,

    /// 有体素在所有参与变换的轴上都找不到边界 (二维模式下整片同值时出现).
    /// 参数为这样的体素个数.
    Unbounded(usize),
}

impl Display for EdtError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::EmptyGrid => write!(f, "empty label grid"),
            Self::SingleLabel => write!(f, "label grid holds a single label, no boundary exists"),
            Self::Unbounded(n) => write!(f, "{n} voxels have no reachable boundary"),
        }
    }
}

impl std::error::Error for EdtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for EdtError {
    #[inline]
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
