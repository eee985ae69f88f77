pub use json::{array, object, JsonValue};

use log::{Level, LevelFilter};
use log4rs::append::rolling_file::policy::compound::{
    roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
};
use log4rs::append::{console::ConsoleAppender, rolling_file::RollingFileAppender};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::{json::JsonEncoder, pattern::PatternEncoder};

use std::collections::HashMap;
use std::path::PathBuf;

const ROLLED_LOG_FILE_COUNT: u32 = 10;

// Example
// ```rust
//     let json_obj = json!({
//         "key_01", value_01;
//         "key_02", value_02;
//    });
// ```
#[macro_export]
macro_rules! json {
    ({$($key: expr, $value: expr); *}) => {{
        let mut evt = $crate::JsonValue::new_object();
        $(evt[$key] = $value.into();)*
        evt
    }};
}

pub struct LoggerOptions<S: std::hash::BuildHasher> {
    pub filter: String,
    pub log_to_console: bool,
    pub console_show_file_and_line: bool,
    pub log_to_file: bool,
    pub log_path: PathBuf,
    pub file_size_limit: u64, // bytes
    pub modules_level: HashMap<String, String, S>,
}

pub fn init<S: std::hash::BuildHasher>(opts: LoggerOptions<S>) {
    let console_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            if opts.console_show_file_and_line {
                "[{d} {h({l})} {t} {f}:{L}] {m}{n}"
            } else {
                "[{d} {h({l})} {t}] {m}{n}"
            },
        )))
        .build();

    let roller_pat = opts.log_path.join("assembler.{}.log");

    let mut root_builder = Root::builder();
    if opts.log_to_console {
        root_builder = root_builder.appender("console");
    }

    let mut config_builder =
        Config::builder().appender(Appender::builder().build("console", Box::new(console_appender)));

    if opts.log_to_file {
        let size_trigger = SizeTrigger::new(opts.file_size_limit);
        let roller = FixedWindowRoller::builder()
            .build(&roller_pat.to_string_lossy(), ROLLED_LOG_FILE_COUNT)
            .expect("build fixed window roller");
        let policy = CompoundPolicy::new(Box::new(size_trigger), Box::new(roller));

        let file_appender = RollingFileAppender::builder()
            .encoder(Box::new(JsonEncoder::new()))
            .build(opts.log_path.join("assembler.log"), Box::new(policy))
            .expect("build rolling file appender");

        config_builder =
            config_builder.appender(Appender::builder().build("file", Box::new(file_appender)));
        root_builder = root_builder.appender("file");
    }

    let root = root_builder.build(convert_level(opts.filter.as_ref()));

    for (module, level) in &opts.modules_level {
        let mut module_logger = Logger::builder().additive(false).appender("console");
        if opts.log_to_file {
            module_logger = module_logger.appender("file");
        }
        config_builder = config_builder.logger(module_logger.build(module, convert_level(level)));
    }
    let config = config_builder.build(root).expect("build config");

    log4rs::init_config(config).expect("init config");
}

pub fn convert_level(level: &str) -> LevelFilter {
    match level.to_uppercase().as_str() {
        "OFF" => LevelFilter::Off,
        "ERROR" => LevelFilter::Error,
        "INFO" => LevelFilter::Info,
        "WARN" => LevelFilter::Warn,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" => LevelFilter::Trace,
        f => {
            println!("invalid logger.filter {}, use INFO", f);
            LevelFilter::Info
        }
    }
}

// Usage:
// log(Level::Info, "assembler", "send0001", common_logger::object!{"tx_hash"
// : "0x..."})
pub fn log(level: Level, module: &str, event: &str, mut msg: JsonValue) {
    log::log!(target: module, level, "{}", {
        msg["event"] = event.into();
        msg
    });
}
