use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Install the terminal logger. `debug` also shows the raw api responses.
pub fn init(debug: bool) -> Result<(), SetLoggerError> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    TermLogger::init(
        level,
        ConfigBuilder::default()
            .set_time_level(LevelFilter::Off)
            .set_target_level(LevelFilter::Off)
            .add_filter_allow_str("webfaction")
            .build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}
