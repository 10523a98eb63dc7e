//! 室内 Wi-Fi 测距数据整理
//!
//! 将原始测距日志（按接入点、测试位置标记的 RSSI 与 RTT 样本）整理为按楼层场景划分的
//! 距离表，供三边定位算法使用。
//!
//! - [`algorithms`]：记录解析、位置分块、按接入点归约、RSSI 转距离模型
//! - [`table`]：场景划分与距离表读写
//! - [`ranging`]：RSSI / RTT 两条处理流程
//! - [`config`]：运行配置

pub mod algorithms;
pub mod config;
pub mod error;
pub mod ranging;
pub mod table;

pub use config::RunConfig;
pub use error::{ConfigError, RangingError, Result};
pub use ranging::{Pipeline, run_all, run_pipeline};
