//! # eb-preview
//!
//! 在无界面宿主上创建一个示例卡片并挂载 electric border，输出生成的标记或滤镜状态。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p electric-host
//! cargo run -p electric-host -- --color "#7df9ff" --speed 1.5 --chaos 0.8
//! cargo run -p electric-host -- --resize 640x200 --resize 800x240 --json
//! cargo run -p electric-host -- --config electric.json -vv
//! ```

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, info};

use electric_host::{
    BoxMetrics, Document, ElectricBorder, ElectricConfig, ElectricOptions, HeadlessHost, NodeId,
};

/// 每次 resize 后最多推进的帧数
const MAX_FRAMES_PER_STEP: usize = 64;

#[derive(Parser)]
#[command(name = "eb-preview")]
#[command(about = "Electric border 预览工具 - 输出生成的节点结构与滤镜参数")]
#[command(version)]
struct Cli {
    /// 配置文件（默认：electric.json）
    #[arg(short, long, default_value = "electric.json")]
    config: PathBuf,

    /// 初始宽度（px）
    #[arg(long, default_value_t = 320.0)]
    width: f64,

    /// 初始高度（px）
    #[arg(long, default_value_t = 180.0)]
    height: f64,

    /// 描边颜色
    #[arg(long)]
    color: Option<String>,

    /// 动画速度倍率
    #[arg(long)]
    speed: Option<f64>,

    /// 混沌度
    #[arg(long)]
    chaos: Option<f64>,

    /// 边框粗细（px）
    #[arg(long)]
    thickness: Option<f64>,

    /// 依次应用的尺寸变化，形如 `640x200`，可重复
    #[arg(long = "resize", value_name = "WxH", value_parser = parse_size)]
    resizes: Vec<(f64, f64)>,

    /// 输出 JSON 格式的滤镜状态而不是标记
    #[arg(long)]
    json: bool,

    /// 日志详细程度（-v debug，-vv trace）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> ElectricOptions {
        ElectricOptions {
            color: self.color.clone(),
            speed: self.speed,
            chaos: self.chaos,
            thickness: self.thickness,
        }
    }
}

fn parse_size(text: &str) -> Result<(f64, f64), String> {
    let (width, height) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("尺寸格式应为 WxH，实际为 '{text}'"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| format!("无效的尺寸分量 '{value}'"))
    };
    Ok((parse(width)?, parse(height)?))
}

fn log_level(cli: &Cli, config: &ElectricConfig) -> Result<Level> {
    Ok(match cli.verbose {
        0 => config.log.parse_level()?,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    })
}

/// 示例卡片：标题 + 一段文字
fn sample_card(doc: &mut Document, width: f64, height: f64) -> NodeId {
    let card = doc.create_element("div");
    doc.add_class(card, "card");

    let title = doc.create_element("h2");
    let title_text = doc.create_text("Electric Border");
    doc.append_child(title, title_text);

    let body = doc.create_element("p");
    let body_text = doc.create_text("Turbulent noise displaced along the stroke.");
    doc.append_child(body, body_text);

    doc.append_child(card, title);
    doc.append_child(card, body);
    let root = doc.root();
    doc.append_child(root, card);
    doc.set_layout(card, BoxMetrics::uniform(width, height));
    card
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 订阅器安装前先用临时订阅器输出配置加载的警告
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::WARN)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || ElectricConfig::load(&cli.config));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level(&cli, &config)?)
        .init();

    config.validate().context("配置无效")?;

    let mut doc = Document::new();
    let card = sample_card(&mut doc, cli.width, cli.height);
    let host = HeadlessHost::with_policy(doc.into_shared(), config.resize);

    let options = cli.options().or(&config.defaults.to_options());
    let border = ElectricBorder::new(host.document(), card, &options, Rc::new(host.clone()))
        .context("创建 electric border 失败")?;
    host.run_until_idle(MAX_FRAMES_PER_STEP);

    for (width, height) in &cli.resizes {
        host.resize(card, *width, *height);
        let frames = host.run_until_idle(MAX_FRAMES_PER_STEP);
        info!(width, height, frames, "已应用尺寸变化");
    }

    if cli.json {
        let report = serde_json::json!({
            "filter_id": border.filter_id(),
            "parameters": border.parameters(),
            "state": border.current_filter_state(),
            "syncs": border.sync_count(),
            "restarts": host.restarts().len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", host.document().borrow().to_markup(card));
    }

    Ok(())
}
