//! 通用常量.

/// 边缘阈值的放大系数. 邻接阶数为 `r` 时, 平方距离不超过 `r * EDGE_TOLERANCE`
/// 的体素算作边缘, 以容纳浮点误差.
pub const EDGE_TOLERANCE: f32 = 1.01;

/// 标签网格中背景的值.
pub const BACKGROUND: i32 = 0;

/// 边缘提取中 DoG 非负体素的标签值.
pub const DOG_ROI: u8 = 1;
