/// 错误类型定义
///
/// 批处理流程采用快速失败策略：格式错误、未知接入点与 I/O 错误都会中止所在流程，不写出该流程的距离表。

use std::path::PathBuf;
use thiserror::Error;

/// 运行级错误
#[derive(Debug, Error)]
pub enum RangingError {
    /// 读写文件失败
    #[error("文件 {path} 读写失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 字段数量不足
    #[error("第 {line} 行字段数量不足: 至少需要 {expected} 个，实际 {actual} 个")]
    TooFewFields {
        line: usize,
        expected: usize,
        actual: usize,
    },

    /// 应为整数的字段无法解析
    #[error("第 {line} 行第 {field} 个字段不是整数: {value:?}")]
    InvalidInteger {
        line: usize,
        field: usize,
        value: String,
    },

    /// 距离表中的数值字段无法解析
    #[error("第 {line} 行第 {field} 个字段不是数值: {value:?}")]
    InvalidNumber {
        line: usize,
        field: usize,
        value: String,
    },

    /// 接入点不在参数表中，无法计算距离
    #[error("第 {line} 行引用了未知接入点 {bssid}")]
    UnknownAccessPoint { line: usize, bssid: String },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 配置加载与校验错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件无法读取
    #[error("无法读取配置文件 {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件无法写入
    #[error("无法写入配置文件 {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 字段取值不合法
    #[error("配置项 `{field}` 不合法: {reason}")]
    InvalidValue { field: String, reason: String },

    /// 接入点标识不是 BSSID 格式
    #[error("无效的 BSSID: {0}")]
    InvalidBssid(String),
}

impl ConfigError {
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl RangingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RangingError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RangingError>;
