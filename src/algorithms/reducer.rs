/// 按接入点归约位置块
///
/// 每个位置块内，同一接入点的多条记录只保留一条代表记录。

use crate::algorithms::RawRecord;
use crate::error::Result;
use indexmap::IndexMap;

/// 代表记录的选择策略
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// 取最先出现的记录（RSSI 流程）
    FirstSeen,
    /// 取排序字段最小的记录，并列时取最先出现者（RTT 流程）
    MinRanked,
}

/// 归约后的位置块：接入点 -> 代表记录，保持首次出现顺序
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReducedBlock {
    selected: IndexMap<String, RawRecord>,
}

impl ReducedBlock {
    /// 获取某接入点的代表记录
    pub fn get(&self, bssid: &str) -> Option<&RawRecord> {
        self.selected.get(bssid)
    }

    /// 接入点数量
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// 按首次出现顺序迭代接入点
    pub fn access_points(&self) -> impl Iterator<Item = &str> {
        self.selected.keys().map(String::as_str)
    }

    /// 按首次出现顺序迭代代表记录
    pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
        self.selected.values()
    }
}

/// 将位置块内的记录按接入点分组，组内保持原始顺序
pub fn group_by_access_point(block: &[RawRecord]) -> IndexMap<&str, Vec<&RawRecord>> {
    let mut groups: IndexMap<&str, Vec<&RawRecord>> = IndexMap::new();
    for record in block {
        groups.entry(record.access_point()).or_default().push(record);
    }
    groups
}

/// 归约一个位置块
///
/// `MinRanked` 策略下排序字段必须是整数，否则返回格式错误，不会跳过该记录。
pub fn reduce_block(block: &[RawRecord], policy: SelectionPolicy) -> Result<ReducedBlock> {
    let mut selected = IndexMap::new();
    for (bssid, records) in group_by_access_point(block) {
        let chosen = match policy {
            SelectionPolicy::FirstSeen => records[0],
            SelectionPolicy::MinRanked => min_ranked(&records)?,
        };
        selected.insert(bssid.to_string(), chosen.clone());
    }
    Ok(ReducedBlock { selected })
}

fn min_ranked<'a>(records: &[&'a RawRecord]) -> Result<&'a RawRecord> {
    let mut best = records[0];
    let mut best_value = best.ranked_value()?;
    for &record in &records[1..] {
        let value = record.ranked_value()?;
        // 严格小于，并列时保留先出现的记录
        if value < best_value {
            best = record;
            best_value = value;
        }
    }
    Ok(best)
}
