pub struct Logger;
impl Logger {
    /// Install the logger. Fails if a logger is already installed.
    pub fn init(level: log::LevelFilter) -> anyhow::Result<()> {
        log::set_logger(&LOGGER).map_err(|err| anyhow::anyhow!("logger: {}", err))?;
        log::set_max_level(level);
        Ok(())
    }
}
impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        println!(
            "{} {} {}:{} {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.file().unwrap_or(""),
            record.line().unwrap_or(0),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;
