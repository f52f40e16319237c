//! Various helper-utilities

use crate::{cli::Opts, config::Config};
use anyhow::Result;
use clap::crate_name;
use flexi_logger::{
    style,
    AdaptiveFormat,
    Age,
    Cleanup,
    Criterion,
    DeferredNow,
    Duplicate,
    FileSpec,
    Level,
    Logger,
    LoggerHandle,
    Naming,
    Record,
    WriteMode,
};
use serde::{de, Deserialize};
use std::{
    env,
    hash::{BuildHasherDefault, Hasher},
    io::{self, Write},
    panic,
    path::PathBuf,
};

/// Environment variable holding a log specification
pub(crate) const LOG_ENV: &str = "TILESTACK_LOG";

/// Used as a custom inner state/hasher for window ids
#[derive(Default)]
pub(crate) struct IdHasher {
    /// Current state of the hasher
    state: u64,
}

impl Hasher for IdHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = self.state.rotate_left(8).wrapping_add(u64::from(byte));
        }
    }

    #[inline]
    fn write_u32(&mut self, id: u32) {
        self.state = u64::from(id);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Type alias to build a `Hash` using [`IdHasher`]
pub(crate) type BuildIdHasher = BuildHasherDefault<IdHasher>;

/// Shorter way of testing if the user wants color for the output of `--help`
pub(crate) fn wants_color() -> bool {
    env::var_os("NO_COLOR").is_none()
}

/// Log level requested on the command line
fn level_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Expand `~` and environment variables in a path
pub(crate) fn expand_path(path: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(shellexpand::full(path)?.to_string()))
}

/// Initializes logging for this crate. The returned handle must be kept alive
pub(crate) fn initialize_logging(config: &Config, args: &Opts) -> Result<LoggerHandle> {
    /// Customize the format of the log (colored)
    fn colored_format(
        w: &mut dyn Write,
        _now: &mut DeferredNow,
        record: &Record,
    ) -> Result<(), io::Error> {
        let level = record.level();
        write!(
            w,
            "{:<5} [{}:{}]: {}",
            style(level, level),
            style(Level::Trace, record.file().unwrap_or("<unnamed>")),
            record.line().unwrap_or(0),
            &record.args()
        )
    }

    /// Customize the format of the log (uncolored)
    fn uncolored_format(
        w: &mut dyn Write,
        now: &mut DeferredNow,
        record: &Record,
    ) -> Result<(), io::Error> {
        // Labels in messages may carry escapes from `colored`
        write!(
            w,
            "[{:>}] {:<5} [{}:{}]: {}",
            now.now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.file().unwrap_or("<unnamed>"),
            record.line().unwrap_or(0),
            String::from_utf8(strip_ansi_escapes::strip(
                record.args().to_string().as_bytes()
            )?)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        )
    }

    if cfg!(debug_assertions) {
        better_panic::install();
        panic::set_hook(Box::new(|panic_info| {
            better_panic::Settings::auto().create_panic_handler()(panic_info);
        }));
    }

    let log_dir = match config.global.log_dir.as_ref() {
        Some(dir) => dir.clone(),
        None => env::temp_dir().join(crate_name!()),
    };

    let spec =
        env::var(LOG_ENV).unwrap_or_else(|_| level_from_verbosity(args.verbose).to_owned());

    let mut logger = Logger::try_with_str(spec)?
        .write_mode(WriteMode::BufferAndFlush)
        .adaptive_format_for_stderr(AdaptiveFormat::Custom(uncolored_format, colored_format))
        .set_palette(String::from("9;11;14;5;13"));

    if config.global.log_to_file {
        logger = logger
            .duplicate_to_stderr(Duplicate::All)
            .rotate(
                Criterion::AgeOrSize(Age::Day, 50_000_000),
                Naming::Numbers,
                Cleanup::KeepLogFiles(2),
            )
            .log_to_file(
                FileSpec::default()
                    .basename(crate_name!())
                    .directory(&log_dir),
            )
            .format_for_files(uncolored_format);
    }

    Ok(logger.start()?)
}

/// [`Deserialize`] something that has a shell variable
#[allow(single_use_lifetimes)]
pub(crate) fn deserialize_shellexpand<'de, D>(d: D) -> Result<Option<PathBuf>, D::Error>
where
    D: de::Deserializer<'de>,
{
    let value = Option::<PathBuf>::deserialize(d)?;

    value
        .map(|path| {
            expand_path(&path.to_string_lossy()).map_err(|e| {
                de::Error::invalid_value(
                    de::Unexpected::Str(path.to_string_lossy().as_ref()),
                    &e.to_string().as_str(),
                )
            })
        })
        .transpose()
}
