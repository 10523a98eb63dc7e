/// 输出数据结构
///
/// 距离表的行、按场景划分的表，以及每条处理流程的运行摘要。

use crate::algorithms::FloorScenario;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// 距离表中的一行：六个投影字段加一个距离值
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceRow {
    /// 测试点坐标与接入点坐标，原样取自输入
    pub fields: Vec<String>,
    /// 距离（RSSI 为估算值，RTT 为原始字段）
    pub value: String,
}

impl DistanceRow {
    pub fn new(fields: &[String], value: String) -> Self {
        DistanceRow {
            fields: fields.to_vec(),
            value,
        }
    }

    /// 制表符拼接后的整行文本（不含换行）
    pub fn to_line(&self) -> String {
        let mut line = self.fields.join("\t");
        line.push('\t');
        line.push_str(&self.value);
        line
    }
}

/// 单个场景的距离表，每个位置块一组行
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioTable {
    pub scenario: FloorScenario,
    pub blocks: Vec<Vec<DistanceRow>>,
}

impl ScenarioTable {
    pub fn new(scenario: FloorScenario) -> Self {
        ScenarioTable {
            scenario,
            blocks: Vec::new(),
        }
    }

    pub fn push_block(&mut self, rows: Vec<DistanceRow>) {
        self.blocks.push(rows);
    }

    /// 位置块数量
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// 总行数
    pub fn row_count(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }
}

/// 一次处理流程的运行摘要
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    /// 流程名称（RSS / RTT）
    pub pipeline: String,
    /// 读取的记录数
    pub records_read: usize,
    /// 通过有效性过滤的记录数
    pub records_kept: usize,
    /// 单层场景位置块数
    pub one_floor_blocks: usize,
    /// 跨层场景位置块数
    pub two_floor_blocks: usize,
    /// 写出的总行数
    pub rows: usize,
    /// 输出文件
    pub outputs: Vec<PathBuf>,
    /// 完成时间
    pub generated_at: DateTime<Utc>,
}

impl RunSummary {
    /// 位置块总数
    pub fn blocks(&self) -> usize {
        self.one_floor_blocks + self.two_floor_blocks
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] 记录 {}/{}，位置块 {}（单层 {}，跨层 {}），输出 {} 行，完成于 {}",
            self.pipeline,
            self.records_kept,
            self.records_read,
            self.blocks(),
            self.one_floor_blocks,
            self.two_floor_blocks,
            self.rows,
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
