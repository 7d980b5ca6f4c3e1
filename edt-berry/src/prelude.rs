//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::edge::{edge_boundaries, EdgeOptions, EdgeSide, NeighbourRank};
pub use crate::edt::{
    compute_edt, AxisMask, EdtError, EdtOptions, EdtResult, FovBoundary, Orientation, Plane,
};
pub use crate::{Idx3d, LabelVolume, NiftiHeaderAttr};
