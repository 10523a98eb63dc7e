/// 场景划分与距离表读写
///
/// 距离表格式：每行 7 列制表符分隔（测试点 x/y/z、接入点 x/y/z、距离），
/// 每个位置块后跟一个空行，文件末尾再多一个空行。

use crate::algorithms::ScenarioTable;
use crate::error::{RangingError, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// 距离表每行的列数
pub const TABLE_COLUMNS: usize = 7;

/// 按固定下标把位置块序列切成单层前缀和跨层后缀
///
/// 下标超过块数时单层部分包含全部块，跨层部分为空。
pub fn split_scenarios<T>(mut blocks: Vec<T>, single_floor_blocks: usize) -> (Vec<T>, Vec<T>) {
    let split = single_floor_blocks.min(blocks.len());
    let rest = blocks.split_off(split);
    (blocks, rest)
}

/// 距离值的文本形式
///
/// 最短往返表示，整数值保留 `.0`，与下游解析器约定一致。
pub fn format_distance(distance: f64) -> String {
    format!("{distance:?}")
}

/// 写出一张距离表
pub fn write_table<W: Write>(writer: &mut W, table: &ScenarioTable) -> io::Result<()> {
    for block in &table.blocks {
        for row in block {
            writeln!(writer, "{}", row.to_line())?;
        }
        writeln!(writer)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// 写出距离表文件，已存在的文件会被覆盖
pub fn write_table_file(path: &Path, table: &ScenarioTable) -> Result<()> {
    let file = File::create(path).map_err(|source| RangingError::io(path, source))?;
    let mut writer = BufWriter::new(file);
    write_table(&mut writer, table)
        .and_then(|_| writer.flush())
        .map_err(|source| RangingError::io(path, source))?;
    debug!(
        "写出 {}: {} 个位置块, {} 行",
        path.display(),
        table.block_count(),
        table.row_count()
    );
    Ok(())
}

/// 距离表中的一行
#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    /// 测试点真实坐标
    pub true_position: [f64; 3],
    /// 接入点坐标
    pub access_point_position: [f64; 3],
    /// 距离（毫米）
    pub distance: f64,
}

impl TableRow {
    /// 解析一行，逗号小数点按点号处理
    pub fn parse(line: usize, text: &str) -> Result<Self> {
        let fields: Vec<&str> = text.split('\t').collect();
        if fields.len() < TABLE_COLUMNS {
            return Err(RangingError::TooFewFields {
                line,
                expected: TABLE_COLUMNS,
                actual: fields.len(),
            });
        }
        let mut values = [0.0; TABLE_COLUMNS];
        for (index, value) in values.iter_mut().enumerate() {
            let raw = fields[index].trim();
            *value = raw
                .replace(',', ".")
                .parse()
                .map_err(|_| RangingError::InvalidNumber {
                    line,
                    field: index,
                    value: raw.to_string(),
                })?;
        }
        Ok(TableRow {
            true_position: [values[0], values[1], values[2]],
            access_point_position: [values[3], values[4], values[5]],
            distance: values[6],
        })
    }

    /// 转为 (x, y, z, distance)：接入点坐标加测得距离，三边定位求解器的输入格式
    pub fn as_measurement(&self) -> (f64, f64, f64, f64) {
        let [x, y, z] = self.access_point_position;
        (x, y, z, self.distance)
    }
}

/// 读取距离表
///
/// 空行结束当前块，空块（如文件末尾的额外空行）被跳过。
pub fn read_table<R: BufRead>(reader: R) -> Result<Vec<Vec<TableRow>>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| RangingError::io("<table>", source))?;
        let text = line.trim();
        if text.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(TableRow::parse(index + 1, text)?);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    Ok(blocks)
}

/// 读取距离表文件
pub fn read_table_file(path: &Path) -> Result<Vec<Vec<TableRow>>> {
    let file = File::open(path).map_err(|source| RangingError::io(path, source))?;
    read_table(BufReader::new(file)).map_err(|err| match err {
        RangingError::Io { source, .. } => RangingError::io(path, source),
        other => other,
    })
}
