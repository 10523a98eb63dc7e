/// 距离表生成程序
///
/// 读取资源目录中的测距日志，依次运行 RSSI 与 RTT 流程并写出四张距离表。

use rangetab::{RunConfig, run_all};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;

/// 默认资源目录
const RESOURCE_DIR: &str = "resources";

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .with_target(false)
        .init();

    let config = match RunConfig::discover(Path::new(RESOURCE_DIR)) {
        Ok(config) => config,
        Err(e) => {
            error!("加载配置失败: {e}");
            std::process::exit(1);
        }
    };
    info!("资源目录: {}", config.resource_dir.display());

    match run_all(&config) {
        Ok(summaries) => {
            for summary in &summaries {
                for path in &summary.outputs {
                    info!("[{}] 已写出 {}", summary.pipeline, path.display());
                }
            }
        }
        Err(e) => {
            error!("处理失败: {e}");
            std::process::exit(1);
        }
    }
}
