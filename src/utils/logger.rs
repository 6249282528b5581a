use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// html5ever / selectors 在 debug 等級非常吵
const QUIET_DEPS: &str = "hyper=warn,hyper_util=warn,reqwest=info,html5ever=warn,selectors=warn,chromiumoxide=warn";

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(format!("debug,{}", QUIET_DEPS))
        } else {
            EnvFilter::new(format!("info,{}", QUIET_DEPS))
        }
    })
}

pub fn init_cli_logger(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

pub fn init_json_logger(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(), // CI 日誌使用 JSON 格式方便檢索
        )
        .try_init();
}

/// 依 CLI 旗標選擇日誌格式
pub fn init(verbose: bool, json: bool) {
    if json {
        init_json_logger(verbose);
    } else {
        init_cli_logger(verbose);
    }
}
