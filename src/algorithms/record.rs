/// 原始测距记录与位置分块
///
/// 日志每行是一条制表符分隔的测量记录。连续出现相同位置标识的记录组成一个位置块，
/// 块边界完全由文件中的先后顺序决定，而不是按标识全局归并。

use crate::error::{RangingError, Result};
use std::fs;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// 每行最少字段数
pub const MIN_FIELDS: usize = 13;
/// 接入点 BSSID 所在字段
pub const ACCESS_POINT_FIELD: usize = 2;
/// 位置标识所在字段
pub const POSITION_FIELD: usize = 3;
/// 输出表中投影的六个字段（测试点坐标与接入点坐标）
pub const PROJECTED_FIELDS: Range<usize> = 3..9;
/// RTT 推算距离所在字段
pub const RTT_DISTANCE_FIELD: usize = 10;
/// RTT 排序字段（越小越好）
pub const RANKED_FIELD: usize = 12;
/// RSSI 字段，从行尾倒数
pub const RSSI_FIELD_FROM_END: usize = 2;
/// 有效性标志字段，从行尾倒数
pub const VALIDITY_FIELD_FROM_END: usize = 3;
/// 有效性标志的真值字面量
pub const VALID_TOKEN: &str = "TRUE";

/// 单条原始记录
#[derive(Clone, Debug, PartialEq)]
pub struct RawRecord {
    /// 输入文件中的行号（从 1 开始）
    line: usize,
    fields: Vec<String>,
}

/// 同一测试位置的连续记录
pub type PositionBlock = Vec<RawRecord>;

impl RawRecord {
    /// 解析一行日志
    ///
    /// 去掉行尾空白后按制表符切分，字段不足 [`MIN_FIELDS`] 个视为格式错误。
    pub fn parse(line: usize, text: &str) -> Result<Self> {
        let fields: Vec<String> = text.trim_end().split('\t').map(str::to_string).collect();
        if fields.len() < MIN_FIELDS {
            return Err(RangingError::TooFewFields {
                line,
                expected: MIN_FIELDS,
                actual: fields.len(),
            });
        }
        Ok(RawRecord { line, fields })
    }

    /// 行号
    pub fn line(&self) -> usize {
        self.line
    }

    /// 全部字段
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// 按下标取字段
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    fn from_end(&self, offset: usize) -> &str {
        &self.fields[self.fields.len() - offset]
    }

    pub fn position_id(&self) -> &str {
        &self.fields[POSITION_FIELD]
    }

    pub fn access_point(&self) -> &str {
        &self.fields[ACCESS_POINT_FIELD]
    }

    /// 有效性标志是否恰好为 `TRUE`
    pub fn is_valid(&self) -> bool {
        self.from_end(VALIDITY_FIELD_FROM_END) == VALID_TOKEN
    }

    /// 测得的 RSSI (dBm)
    pub fn rssi(&self) -> Result<i16> {
        let index = self.fields.len() - RSSI_FIELD_FROM_END;
        self.parse_field(index)
    }

    /// RTT 排序值
    pub fn ranked_value(&self) -> Result<i64> {
        self.parse_field(RANKED_FIELD)
    }

    /// RTT 推算距离，原样输出
    pub fn rtt_distance(&self) -> &str {
        &self.fields[RTT_DISTANCE_FIELD]
    }

    /// 输出表使用的六个投影字段
    pub fn projection(&self) -> &[String] {
        &self.fields[PROJECTED_FIELDS]
    }

    fn parse_field<T: std::str::FromStr>(&self, index: usize) -> Result<T> {
        let value = &self.fields[index];
        value
            .trim()
            .parse::<T>()
            .map_err(|_| RangingError::InvalidInteger {
                line: self.line,
                field: index,
                value: value.clone(),
            })
    }
}

/// 解析整个日志文本
pub fn parse_records(text: &str) -> Result<Vec<RawRecord>> {
    text.lines()
        .enumerate()
        .map(|(index, line)| RawRecord::parse(index + 1, line))
        .collect()
}

/// 读取日志文件
///
/// 文件一次性读入内存后立即关闭。
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let text = fs::read_to_string(path).map_err(|source| RangingError::io(path, source))?;
    let records = parse_records(&text)?;
    debug!("从 {} 读取 {} 条记录", path.display(), records.len());
    Ok(records)
}

/// 位置块迭代器
///
/// 记录位置标识变化即开始新块。初始状态没有当前标识，因此第一条记录总会开启一个块。
pub struct PositionBlocks<I> {
    records: I,
    current: Option<String>,
    pending: PositionBlock,
}

impl<I> PositionBlocks<I>
where
    I: Iterator<Item = RawRecord>,
{
    pub fn new(records: I) -> Self {
        PositionBlocks {
            records,
            current: None,
            pending: Vec::new(),
        }
    }
}

impl<I> Iterator for PositionBlocks<I>
where
    I: Iterator<Item = RawRecord>,
{
    type Item = PositionBlock;

    fn next(&mut self) -> Option<PositionBlock> {
        for record in self.records.by_ref() {
            if self.current.as_deref() == Some(record.position_id()) {
                self.pending.push(record);
                continue;
            }
            self.current = Some(record.position_id().to_string());
            let finished = std::mem::replace(&mut self.pending, vec![record]);
            if !finished.is_empty() {
                return Some(finished);
            }
        }
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

/// 将记录切分为位置块
///
/// `valid_only` 为真时先丢弃有效性标志不为 `TRUE` 的记录，再做分块，
/// 被丢弃的记录既不开启也不加入任何块。
pub fn position_blocks(records: Vec<RawRecord>, valid_only: bool) -> Vec<PositionBlock> {
    if valid_only {
        PositionBlocks::new(records.into_iter().filter(RawRecord::is_valid)).collect()
    } else {
        PositionBlocks::new(records.into_iter()).collect()
    }
}
