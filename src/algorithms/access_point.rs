/// 接入点参数表
///
/// 每个接入点（按 BSSID 标识）记录 1 米处参考 RSSI 以及单层、跨层两种场景下的路径损耗指数。
/// 参数表在启动时加载一次，之后只读。

use crate::algorithms::{DistanceUnit, FloorScenario, RSSIModel};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;

/// 单个接入点的路径损耗参数
#[derive(Clone, Debug, PartialEq)]
pub struct AccessPointProfile {
    /// BSSID，如 `08:b4:b1:85:11:61`
    pub bssid: String,
    /// 1 米处参考 RSSI (dBm)
    pub reference_rssi: f64,
    /// 单层场景路径损耗指数
    pub exponent_one_floor: f64,
    /// 跨层场景路径损耗指数
    pub exponent_two_floors: f64,
}

impl AccessPointProfile {
    pub fn new(
        bssid: impl Into<String>,
        reference_rssi: f64,
        exponent_one_floor: f64,
        exponent_two_floors: f64,
    ) -> Self {
        AccessPointProfile {
            bssid: bssid.into(),
            reference_rssi,
            exponent_one_floor,
            exponent_two_floors,
        }
    }

    /// 从元组创建（简洁方式）
    pub fn from_tuple(bssid: &str, (reference_rssi, one, two): (f64, f64, f64)) -> Self {
        Self::new(bssid, reference_rssi, one, two)
    }

    /// 按场景选择路径损耗指数
    pub fn exponent(&self, scenario: FloorScenario) -> f64 {
        match scenario {
            FloorScenario::OneFloor => self.exponent_one_floor,
            FloorScenario::TwoFloors => self.exponent_two_floors,
        }
    }

    /// 该接入点在指定场景下的距离模型
    pub fn model(&self, scenario: FloorScenario, unit: DistanceUnit) -> RSSIModel {
        RSSIModel::log_normal_shadow(self.reference_rssi, self.exponent(scenario), unit)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_bssid(&self.bssid)? {
            return Err(ConfigError::InvalidBssid(self.bssid.clone()));
        }
        for (field, value) in [
            ("exponent_one_floor", self.exponent_one_floor),
            ("exponent_two_floors", self.exponent_two_floors),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid_value(
                    format!("{}.{}", self.bssid, field),
                    format!("路径损耗指数必须为正数，实际 {value}"),
                ));
            }
        }
        if !self.reference_rssi.is_finite() {
            return Err(ConfigError::invalid_value(
                format!("{}.reference_rssi", self.bssid),
                "参考 RSSI 必须是有限值",
            ));
        }
        for scenario in [FloorScenario::OneFloor, FloorScenario::TwoFloors] {
            self.model(scenario, DistanceUnit::Millimeter)
                .validate()
                .map_err(|reason| {
                    ConfigError::invalid_value(format!("{}.{}", self.bssid, scenario), reason)
                })?;
        }
        Ok(())
    }
}

/// 判断字符串是否为冒号分隔的 6 字节 BSSID
pub fn is_bssid(value: &str) -> Result<bool, ConfigError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    match PATTERN.get_or_init(|| Regex::new("^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$")) {
        Ok(pattern) => Ok(pattern.is_match(value)),
        Err(e) => Err(ConfigError::invalid_value("bssid", e.to_string())),
    }
}

/// 接入点参数表
#[derive(Clone, Debug, Default)]
pub struct AccessPointTable {
    /// BSSID -> 参数
    profiles: HashMap<String, AccessPointProfile>,
}

impl AccessPointTable {
    /// 创建空参数表
    pub fn new() -> Self {
        AccessPointTable {
            profiles: HashMap::new(),
        }
    }

    /// 实验现场六个接入点的内置参数
    pub fn builtin() -> Self {
        const PROFILES: [(&str, (f64, f64, f64)); 6] = [
            ("08:b4:b1:85:11:61", (-42.0, 2.285191613, 2.407779215)),
            ("08:b4:b1:85:12:95", (-40.0, 2.79342456, 3.431905356)),
            ("08:b4:b1:85:12:ab", (-41.0, 2.791738071, 3.566292808)),
            ("08:b4:b1:85:14:21", (-40.0, 2.861091896, 3.18002304)),
            ("08:b4:b1:85:2e:57", (-41.0, 2.499801535, 3.308775049)),
            ("08:b4:b1:85:4a:f5", (-41.0, 2.416460212, 2.552698166)),
        ];
        let profiles = PROFILES
            .iter()
            .map(|&(bssid, params)| (bssid.to_string(), AccessPointProfile::from_tuple(bssid, params)))
            .collect();
        AccessPointTable { profiles }
    }

    /// 从参数向量创建，逐个校验
    pub fn from_vec(profiles: Vec<AccessPointProfile>) -> Result<Self, ConfigError> {
        let mut table = AccessPointTable::new();
        for profile in profiles {
            table.add_profile(profile)?;
        }
        Ok(table)
    }

    /// 从 JSON 文本加载
    ///
    /// 格式: `{ "<bssid>": [参考 RSSI, 单层指数, 跨层指数], ... }`
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, (f64, f64, f64)> = serde_json::from_str(json)
            .map_err(|e| ConfigError::invalid_value("access_points", e.to_string()))?;
        Self::from_vec(
            raw.iter()
                .map(|(bssid, params)| AccessPointProfile::from_tuple(bssid, *params))
                .collect(),
        )
    }

    /// 从 JSON 文件加载
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// 序列化为 JSON，键按字典序排列
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        let raw: BTreeMap<&str, (f64, f64, f64)> = self
            .profiles
            .values()
            .map(|p| {
                (
                    p.bssid.as_str(),
                    (p.reference_rssi, p.exponent_one_floor, p.exponent_two_floors),
                )
            })
            .collect();
        serde_json::to_string_pretty(&raw)
            .map_err(|e| ConfigError::invalid_value("access_points", e.to_string()))
    }

    /// 添加接入点参数
    pub fn add_profile(&mut self, profile: AccessPointProfile) -> Result<(), ConfigError> {
        profile.validate()?;
        self.profiles.insert(profile.bssid.clone(), profile);
        Ok(())
    }

    /// 获取接入点参数
    pub fn get(&self, bssid: &str) -> Option<&AccessPointProfile> {
        self.profiles.get(bssid)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// 迭代 BSSID 和参数
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AccessPointProfile)> {
        self.profiles.iter()
    }
}
