/// RSSI 到距离转换模型
///
/// 使用对数距离路径损耗模型，按接入点与楼层场景选择参数。

use crate::algorithms::{AccessPointTable, RawRecord};
use crate::error::{RangingError, Result};
use std::fmt;

/// 定位计量单位
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistanceUnit {
    /// 米
    Meter,
    /// 毫米
    Millimeter,
}

impl DistanceUnit {
    /// 从米换算到本单位
    pub fn convert_from_meters(self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Meter => meters,
            DistanceUnit::Millimeter => meters * 1000.0,
        }
    }
}

/// 楼层场景：测试点与接入点同层或跨层
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloorScenario {
    OneFloor,
    TwoFloors,
}

impl fmt::Display for FloorScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloorScenario::OneFloor => write!(f, "单层"),
            FloorScenario::TwoFloors => write!(f, "跨层"),
        }
    }
}

/// RSSI 转距离模型
#[derive(Clone, Debug, PartialEq)]
pub struct RSSIModel {
    /// 截距 A (dBm) - 1 米处的参考功率
    pub a: f64,
    /// 斜率 B = -10n
    pub b: f64,
    /// 路径损耗指数 n
    pub n: f64,
    /// 距离单位
    pub unit: DistanceUnit,
}

impl RSSIModel {
    /// 由参考功率和路径损耗指数创建模型
    ///
    /// 公式: RSSI(d) = A - 10 * n * log10(d)
    ///
    /// # 参数
    /// - `a`: 参考功率 (dBm at 1m)
    /// - `n`: 路径损耗指数
    /// - `unit`: 距离单位
    pub fn log_normal_shadow(a: f64, n: f64, unit: DistanceUnit) -> Self {
        RSSIModel {
            a,
            b: -10.0 * n,
            n,
            unit,
        }
    }

    /// 根据 RSSI 计算距离
    ///
    /// 反解对数距离模型: d = 10^((RSSI - A) / B)，结果按模型单位给出
    pub fn rssi_to_distance(&self, rssi: i16) -> f64 {
        self.rssi_to_distance_f64(rssi as f64)
    }

    pub fn rssi_to_distance_f64(&self, rssi: f64) -> f64 {
        let exponent = (rssi - self.a) / self.b;
        let meters = 10_f64.powf(exponent);
        self.unit.convert_from_meters(meters)
    }

    /// 验证 RSSI 模型的合理性
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.b >= 0.0 {
            return Err("斜率 B 应为负数（RSSI 随距离增加而减小）".to_string());
        }
        if self.a > 0.0 {
            return Err("截距 A 通常为负（功率以 dBm 表示）".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for RSSIModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RSSI模型 A={:.2} dBm, B={:.2}, n={:.3}, 单位: {:?}",
            self.a, self.b, self.n, self.unit
        )
    }
}

/// 估算一条记录到其接入点的距离（毫米）
///
/// 接入点必须在参数表中，否则返回错误，不会退回到默认指数。
pub fn estimate_distance(
    record: &RawRecord,
    access_points: &AccessPointTable,
    scenario: FloorScenario,
) -> Result<f64> {
    let profile = access_points
        .get(record.access_point())
        .ok_or_else(|| RangingError::UnknownAccessPoint {
            line: record.line(),
            bssid: record.access_point().to_string(),
        })?;
    let model = profile.model(scenario, DistanceUnit::Millimeter);
    Ok(model.rssi_to_distance(record.rssi()?))
}
