/// 运行配置
///
/// 默认值对应实验数据的原始布局：资源目录下一个输入日志、四个输出距离表，
/// 前 19 个位置块属于单层实验。所有项都可以通过 JSON 文件覆盖。

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 单层实验包含的位置块数（由采集顺序决定）
pub const DEFAULT_SINGLE_FLOOR_BLOCKS: usize = 19;

/// 资源目录中可选的配置文件名
pub const CONFIG_FILE_NAME: &str = "ranging.json";

/// 运行配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 输入与输出文件所在目录
    pub resource_dir: PathBuf,
    /// 原始测距日志
    pub input_file: String,
    pub rss_one_floor: String,
    pub rss_two_floors: String,
    pub rtt_one_floor: String,
    pub rtt_two_floors: String,
    /// 前多少个位置块属于单层场景
    pub single_floor_blocks: usize,
    /// 接入点参数表 JSON，未设置时使用内置参数
    pub access_points: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            resource_dir: PathBuf::from("resources"),
            input_file: "RangingDataAll.txt".to_string(),
            rss_one_floor: "RSSOneFloor.txt".to_string(),
            rss_two_floors: "RSSTwoFloors.txt".to_string(),
            rtt_one_floor: "RTTOneFloor.txt".to_string(),
            rtt_two_floors: "RTTTwoFloors.txt".to_string(),
            single_floor_blocks: DEFAULT_SINGLE_FLOOR_BLOCKS,
            access_points: None,
        }
    }
}

impl RunConfig {
    /// 以指定资源目录创建默认配置
    pub fn with_resource_dir(dir: impl Into<PathBuf>) -> Self {
        RunConfig {
            resource_dir: dir.into(),
            ..RunConfig::default()
        }
    }

    /// 从 JSON 文件加载并校验
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::invalid_value("(file)", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 写出为格式化 JSON，必要时创建父目录
    pub fn to_json(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::invalid_value("(serialization)", e.to_string()))?;
        std::fs::write(path, json).map_err(|source| ConfigError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 加载资源目录中的 `ranging.json`，不存在时使用默认配置
    ///
    /// 资源目录始终取配置文件所在目录，文件中的 `resource_dir` 被忽略。
    pub fn discover(resource_dir: &Path) -> Result<Self, ConfigError> {
        let path = resource_dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            let mut config = Self::from_json(&path)?;
            config.resource_dir = resource_dir.to_path_buf();
            Ok(config)
        } else {
            Ok(Self::with_resource_dir(resource_dir))
        }
    }

    /// 校验文件名
    ///
    /// 文件名不能为空，四个输出文件互不相同且不能覆盖输入文件。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("input_file", &self.input_file),
            ("rss_one_floor", &self.rss_one_floor),
            ("rss_two_floors", &self.rss_two_floors),
            ("rtt_one_floor", &self.rtt_one_floor),
            ("rtt_two_floors", &self.rtt_two_floors),
        ];
        for (field, name) in names {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid_value(field, "文件名不能为空"));
            }
        }
        for (i, (field, name)) in names.iter().enumerate() {
            if let Some((other, _)) = names[..i].iter().find(|(_, n)| n == name) {
                return Err(ConfigError::invalid_value(
                    *field,
                    format!("与 `{other}` 使用了相同的文件名 {name}"),
                ));
            }
        }
        Ok(())
    }

    /// 输入日志路径
    pub fn input_path(&self) -> PathBuf {
        self.resource_dir.join(&self.input_file)
    }

    /// 资源目录下的文件路径
    pub fn resource(&self, name: &str) -> PathBuf {
        self.resource_dir.join(name)
    }

    /// 接入点参数表路径（相对路径基于资源目录）
    pub fn access_points_path(&self) -> Option<PathBuf> {
        self.access_points
            .as_ref()
            .map(|path| self.resource_dir.join(path))
    }
}
