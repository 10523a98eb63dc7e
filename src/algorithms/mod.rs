/// 测距数据处理算法模块
///
/// 该模块提供距离表生成所需的核心逻辑：
/// - 原始记录解析与按位置连续分块
/// - 按接入点挑选代表记录（首条 / 排序值最小）
/// - 基于接入点参数表的 RSSI 转距离模型
/// - 输出行与运行摘要

pub mod access_point;
pub mod record;
pub mod reducer;
pub mod results;
pub mod rssi_model;

pub use access_point::*;
pub use record::*;
pub use reducer::*;
pub use results::*;
pub use rssi_model::*;
