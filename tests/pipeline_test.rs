/// 端到端流程测试
///
/// 在临时目录中生成测距日志，运行两条流程并检查四个距离表。

use rangetab::algorithms::AccessPointTable;
use rangetab::config::RunConfig;
use rangetab::ranging::{Pipeline, run_all, run_pipeline};
use rangetab::table::read_table_file;
use rangetab::RangingError;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ACCESS_POINTS: [&str; 3] = ["08:b4:b1:85:11:61", "08:b4:b1:85:12:95", "08:b4:b1:85:4a:f5"];

/// 一条日志记录
fn log_line(ap: &str, position: usize, rtt_distance: u32, ranked: &str, valid: bool, rssi: i32) -> String {
    format!(
        "2021-03-01T10:00:00\tscan\t{ap}\t{x}\t{y}\t1200\t1000\t2000\t2500\t4\t{rtt_distance}\t120\t{ranked}\t{flag}\t{rssi}\t0",
        x = position * 100,
        y = 300,
        flag = if valid { "TRUE" } else { "FALSE" },
    )
}

/// 生成 `positions` 个测试位置，每个位置每个接入点三条样本
fn write_log(dir: &Path, positions: usize) {
    let mut lines = Vec::new();
    for position in 0..positions {
        for (i, ap) in ACCESS_POINTS.iter().enumerate() {
            let base = 1000 * (i as u32 + 1);
            lines.push(log_line(ap, position, base + 30, "50", true, -50));
            lines.push(log_line(ap, position, base + 10, "30", true, -60));
            lines.push(log_line(ap, position, base + 20, "40", true, -70));
        }
        // 排序值最小但无效，RTT 流程不应选中
        lines.push(log_line(ACCESS_POINTS[0], position, 1, "1", false, -30));
    }
    fs::write(dir.join("RangingDataAll.txt"), lines.join("\n") + "\n").unwrap();
}

fn count_blank_lines(path: &Path) -> usize {
    fs::read_to_string(path).unwrap().lines().filter(|l| l.is_empty()).count()
}

#[test]
fn test_run_all_writes_four_tables() {
    let dir = tempdir().expect("tempdir must be created");
    write_log(dir.path(), 21);
    let config = RunConfig::with_resource_dir(dir.path());

    let summaries = run_all(&config).unwrap();
    assert_eq!(summaries.len(), 2);
    for summary in &summaries {
        assert_eq!(summary.one_floor_blocks, 19);
        assert_eq!(summary.two_floor_blocks, 2);
        assert_eq!(summary.rows, 21 * ACCESS_POINTS.len());
        for path in &summary.outputs {
            assert!(path.is_file(), "{} 应当存在", path.display());
        }
    }
    assert_eq!(summaries[0].records_read, 21 * 10);
    assert_eq!(summaries[1].records_kept, 21 * 9);

    // N 个块对应 N 个分隔空行，再加文件末尾一个
    assert_eq!(count_blank_lines(&dir.path().join("RSSOneFloor.txt")), 20);
    assert_eq!(count_blank_lines(&dir.path().join("RTTTwoFloors.txt")), 3);
}

#[test]
fn test_rss_distances() {
    let dir = tempdir().unwrap();
    write_log(dir.path(), 21);
    let config = RunConfig::with_resource_dir(dir.path());
    run_pipeline(&config, Pipeline::Rss, &AccessPointTable::builtin()).unwrap();

    let one = read_table_file(&dir.path().join("RSSOneFloor.txt")).unwrap();
    assert_eq!(one.len(), 19);
    // 首条样本 RSSI -50，参考 -42，单层指数 2.285191613
    let expected = 1000.0 * 10_f64.powf(8.0 / (10.0 * 2.285191613));
    let row = &one[0][0];
    assert!(((row.distance - expected) / expected).abs() < 1e-9);
    assert_eq!(row.true_position, [0.0, 300.0, 1200.0]);
    assert_eq!(row.access_point_position, [1000.0, 2000.0, 2500.0]);

    let two = read_table_file(&dir.path().join("RSSTwoFloors.txt")).unwrap();
    assert_eq!(two.len(), 2);
    let expected = 1000.0 * 10_f64.powf(8.0 / (10.0 * 2.407779215));
    assert!(((two[0][0].distance - expected) / expected).abs() < 1e-9);
    assert_eq!(two[1][0].true_position[0], 2000.0);
}

#[test]
fn test_rtt_selects_lowest_ranked_valid_sample() {
    let dir = tempdir().unwrap();
    write_log(dir.path(), 3);
    let config = RunConfig::with_resource_dir(dir.path());
    let summary = run_pipeline(&config, Pipeline::Rtt, &AccessPointTable::new()).unwrap();
    assert_eq!(summary.one_floor_blocks, 3);
    assert_eq!(summary.two_floor_blocks, 0);

    let text = fs::read_to_string(dir.path().join("RTTOneFloor.txt")).unwrap();
    let first_block: Vec<&str> = text.lines().take_while(|l| !l.is_empty()).collect();
    assert_eq!(
        first_block,
        vec![
            "0\t300\t1200\t1000\t2000\t2500\t1010",
            "0\t300\t1200\t1000\t2000\t2500\t2010",
            "0\t300\t1200\t1000\t2000\t2500\t3010",
        ]
    );
    assert_eq!(fs::read_to_string(dir.path().join("RTTTwoFloors.txt")).unwrap(), "\n");
}

#[test]
fn test_custom_split_index() {
    let dir = tempdir().unwrap();
    write_log(dir.path(), 5);
    let config = RunConfig {
        single_floor_blocks: 2,
        ..RunConfig::with_resource_dir(dir.path())
    };
    let summary = run_pipeline(&config, Pipeline::Rtt, &AccessPointTable::builtin()).unwrap();
    assert_eq!((summary.one_floor_blocks, summary.two_floor_blocks), (2, 3));
}

#[test]
fn test_malformed_ranked_field_aborts_rtt_without_output() {
    let dir = tempdir().unwrap();
    let mut lines = vec![log_line(ACCESS_POINTS[0], 0, 100, "10", true, -50)];
    lines.push(log_line(ACCESS_POINTS[0], 1, 100, "ten", true, -50));
    fs::write(dir.path().join("RangingDataAll.txt"), lines.join("\n")).unwrap();
    let config = RunConfig::with_resource_dir(dir.path());

    let err = run_all(&config).unwrap_err();
    assert!(matches!(err, RangingError::InvalidInteger { line: 2, field: 12, .. }));
    // RSSI 流程不解析排序字段，照常完成
    assert!(dir.path().join("RSSOneFloor.txt").is_file());
    assert!(!dir.path().join("RTTOneFloor.txt").exists());
    assert!(!dir.path().join("RTTTwoFloors.txt").exists());
}

#[test]
fn test_unknown_access_point_aborts_rss_without_output() {
    let dir = tempdir().unwrap();
    let lines = [
        log_line(ACCESS_POINTS[0], 0, 100, "10", true, -50),
        log_line("aa:bb:cc:dd:ee:ff", 30, 100, "10", true, -50),
    ];
    fs::write(dir.path().join("RangingDataAll.txt"), lines.join("\n")).unwrap();
    let config = RunConfig::with_resource_dir(dir.path());

    let err = run_pipeline(&config, Pipeline::Rss, &AccessPointTable::builtin()).unwrap_err();
    assert!(matches!(err, RangingError::UnknownAccessPoint { line: 2, .. }));
    assert!(!dir.path().join("RSSOneFloor.txt").exists());

    // RTT 流程不依赖参数表
    run_pipeline(&config, Pipeline::Rtt, &AccessPointTable::builtin()).unwrap();
    assert!(dir.path().join("RTTOneFloor.txt").is_file());
}

#[test]
fn test_unknown_access_point_does_not_stop_rtt() {
    let dir = tempdir().unwrap();
    let lines = [
        log_line(ACCESS_POINTS[0], 0, 100, "10", true, -50),
        log_line("aa:bb:cc:dd:ee:ff", 0, 200, "20", true, -50),
    ];
    fs::write(dir.path().join("RangingDataAll.txt"), lines.join("\n")).unwrap();
    let config = RunConfig::with_resource_dir(dir.path());

    let err = run_all(&config).unwrap_err();
    assert!(matches!(err, RangingError::UnknownAccessPoint { line: 2, .. }));
    assert!(!dir.path().join("RSSOneFloor.txt").exists());
    assert!(!dir.path().join("RSSTwoFloors.txt").exists());

    let rtt = read_table_file(&dir.path().join("RTTOneFloor.txt")).unwrap();
    assert_eq!(rtt.len(), 1);
    assert_eq!(rtt[0].len(), 2);
    assert_eq!(rtt[0][1].distance, 200.0);
    assert!(dir.path().join("RTTTwoFloors.txt").is_file());
}

#[test]
fn test_short_line_is_format_error() {
    let dir = tempdir().unwrap();
    let text = format!("{}\nonly\tthree\tfields\n", log_line(ACCESS_POINTS[0], 0, 1, "1", true, -40));
    fs::write(dir.path().join("RangingDataAll.txt"), text).unwrap();
    let config = RunConfig::with_resource_dir(dir.path());

    let err = run_all(&config).unwrap_err();
    assert!(matches!(err, RangingError::TooFewFields { line: 2, actual: 3, .. }));
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = tempdir().unwrap();
    let config = RunConfig::with_resource_dir(dir.path());
    let err = run_all(&config).unwrap_err();
    assert!(matches!(err, RangingError::Io { .. }));
}

#[test]
fn test_discovered_config_and_access_points() {
    let dir = tempdir().unwrap();
    write_log(dir.path(), 2);
    fs::write(
        dir.path().join("aps.json"),
        r#"{
            "08:b4:b1:85:11:61": [-50, 2.0, 2.0],
            "08:b4:b1:85:12:95": [-50, 2.0, 2.0],
            "08:b4:b1:85:4a:f5": [-50, 2.0, 2.0]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("ranging.json"),
        r#"{ "access_points": "aps.json", "rss_one_floor": "rss1.tsv", "single_floor_blocks": 1 }"#,
    )
    .unwrap();

    let config = RunConfig::discover(dir.path()).unwrap();
    assert_eq!(config.resource_dir, dir.path());
    let summaries = run_all(&config).unwrap();
    assert_eq!(summaries[0].one_floor_blocks, 1);

    // 参考 RSSI 与测得值相同，距离恰为 1 米
    let table = read_table_file(&dir.path().join("rss1.tsv")).unwrap();
    assert!(table[0].iter().all(|row| (row.distance - 1000.0).abs() < 1e-9));
}
