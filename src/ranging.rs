/// 距离表生成流程
///
/// 两条流程共用同一份输入：
/// - RSSI：每个接入点取首条记录，用路径损耗模型估算距离
/// - RTT：只保留有效记录，每个接入点取排序值最小的记录，直接输出 RTT 推算距离
///
/// 读取 → 分块 → 归约 → 按场景划分 → 写出，数据单向流动。

use crate::algorithms::{
    AccessPointTable, DistanceRow, FloorScenario, PositionBlock, RawRecord, ReducedBlock,
    RunSummary, ScenarioTable, SelectionPolicy, estimate_distance, load_records, position_blocks,
    reduce_block,
};
use crate::config::RunConfig;
use crate::error::Result;
use crate::table::{format_distance, split_scenarios, write_table_file};
use chrono::Utc;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// 处理流程
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pipeline {
    /// 信号强度估距
    Rss,
    /// 往返时间测距
    Rtt,
}

impl Pipeline {
    pub const ALL: [Pipeline; 2] = [Pipeline::Rss, Pipeline::Rtt];

    pub fn name(self) -> &'static str {
        match self {
            Pipeline::Rss => "RSS",
            Pipeline::Rtt => "RTT",
        }
    }

    /// 代表记录的选择策略
    pub fn policy(self) -> SelectionPolicy {
        match self {
            Pipeline::Rss => SelectionPolicy::FirstSeen,
            Pipeline::Rtt => SelectionPolicy::MinRanked,
        }
    }

    /// 是否在分块前过滤无效记录
    pub fn valid_only(self) -> bool {
        matches!(self, Pipeline::Rtt)
    }

    /// 单层、跨层两个输出文件
    pub fn outputs(self, config: &RunConfig) -> (PathBuf, PathBuf) {
        let (one, two) = match self {
            Pipeline::Rss => (&config.rss_one_floor, &config.rss_two_floors),
            Pipeline::Rtt => (&config.rtt_one_floor, &config.rtt_two_floors),
        };
        (config.resource(one), config.resource(two))
    }

    /// 代表记录的距离列
    fn distance_value(
        self,
        record: &RawRecord,
        access_points: &AccessPointTable,
        scenario: FloorScenario,
    ) -> Result<String> {
        match self {
            Pipeline::Rss => {
                let distance = estimate_distance(record, access_points, scenario)?;
                Ok(format_distance(distance))
            }
            Pipeline::Rtt => Ok(record.rtt_distance().to_string()),
        }
    }

    /// 把一个场景的归约块转换为距离表
    fn scenario_table(
        self,
        scenario: FloorScenario,
        blocks: &[ReducedBlock],
        access_points: &AccessPointTable,
    ) -> Result<ScenarioTable> {
        let mut table = ScenarioTable::new(scenario);
        for block in blocks {
            let rows = block
                .records()
                .map(|record| -> Result<DistanceRow> {
                    let value = self.distance_value(record, access_points, scenario)?;
                    Ok(DistanceRow::new(record.projection(), value))
                })
                .collect::<Result<Vec<_>>>()?;
            table.push_block(rows);
        }
        Ok(table)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 归约所有位置块
pub fn reduce_blocks(blocks: &[PositionBlock], policy: SelectionPolicy) -> Result<Vec<ReducedBlock>> {
    blocks.iter().map(|block| reduce_block(block, policy)).collect()
}

/// 由记录构建单层、跨层两张距离表
///
/// 全部行在返回前计算完成，任何数据错误都会在写出之前暴露。
pub fn build_tables(
    records: Vec<RawRecord>,
    pipeline: Pipeline,
    access_points: &AccessPointTable,
    single_floor_blocks: usize,
) -> Result<(ScenarioTable, ScenarioTable)> {
    let blocks = position_blocks(records, pipeline.valid_only());
    debug!("[{}] 检测到 {} 个位置块", pipeline, blocks.len());
    let reduced = reduce_blocks(&blocks, pipeline.policy())?;
    let (one_floor, two_floors) = split_scenarios(reduced, single_floor_blocks);
    let one = pipeline.scenario_table(FloorScenario::OneFloor, &one_floor, access_points)?;
    let two = pipeline.scenario_table(FloorScenario::TwoFloors, &two_floors, access_points)?;
    Ok((one, two))
}

/// 运行单条流程：读取输入、生成并写出两张距离表
pub fn run_pipeline(
    config: &RunConfig,
    pipeline: Pipeline,
    access_points: &AccessPointTable,
) -> Result<RunSummary> {
    let input = config.input_path();
    let records = load_records(&input)?;
    let records_read = records.len();
    let records_kept = if pipeline.valid_only() {
        records.iter().filter(|record| record.is_valid()).count()
    } else {
        records_read
    };
    info!(
        "[{}] 读取 {}: {} 条记录，保留 {} 条",
        pipeline,
        input.display(),
        records_read,
        records_kept
    );

    let (one, two) = build_tables(records, pipeline, access_points, config.single_floor_blocks)?;
    let (one_path, two_path) = pipeline.outputs(config);
    write_table_file(&one_path, &one)?;
    write_table_file(&two_path, &two)?;

    let summary = RunSummary {
        pipeline: pipeline.name().to_string(),
        records_read,
        records_kept,
        one_floor_blocks: one.block_count(),
        two_floor_blocks: two.block_count(),
        rows: one.row_count() + two.row_count(),
        outputs: vec![one_path, two_path],
        generated_at: Utc::now(),
    };
    info!("{}", summary);
    Ok(summary)
}

/// 加载配置指定的接入点参数表，未指定时使用内置参数
pub fn load_access_points(config: &RunConfig) -> Result<AccessPointTable> {
    match config.access_points_path() {
        Some(path) => {
            let table = AccessPointTable::from_json_file(&path)?;
            info!("从 {} 加载 {} 个接入点参数", path.display(), table.len());
            Ok(table)
        }
        None => Ok(AccessPointTable::builtin()),
    }
}

/// 依次运行 RSSI 与 RTT 两条流程
///
/// 两条流程互不依赖：一条失败不影响另一条写出结果，全部运行后返回第一个错误。
pub fn run_all(config: &RunConfig) -> Result<Vec<RunSummary>> {
    config.validate()?;
    let access_points = load_access_points(config)?;
    let mut summaries = Vec::new();
    let mut first_error = None;
    for pipeline in Pipeline::ALL {
        match run_pipeline(config, pipeline, &access_points) {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                error!("[{}] 处理失败: {}", pipeline, e);
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(summaries),
    }
}
