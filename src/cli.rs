//! The command line arguments

use crate::utils::wants_color;
use clap::{crate_description, crate_version, AppSettings, Parser, ValueHint};
use once_cell::sync::Lazy;
use std::{env, fs, path::PathBuf};

/// Options for the [`tilestack`] program
#[derive(Parser, Default, Clone, Debug, PartialEq)]
#[clap(
    version = crate_version!(),
    author = <String as AsRef<str>>::as_ref(&APP_AUTHORS),
    about = <String as AsRef<str>>::as_ref(&APP_ABOUT),
    after_help =  <String as AsRef<str>>::as_ref(&AFTER_HELP),
    override_usage =  <String as AsRef<str>>::as_ref(&OVERRIDE_HELP),
    max_term_width = 100,
    color = clap::ColorChoice::Auto,
    global_setting = AppSettings::DeriveDisplayOrder,
    disable_help_subcommand = true,
    hide_possible_values = true,
)]
pub(crate) struct Opts {
    /// Display debugging messages on various levels
    #[clap(
        long,
        short,
        global = true,
        parse(from_occurrences),
        long_help = "
        Set the verbosity level of the program. There are 2 extra levels after the default (INFO). \
                     If `-v` is used, DEBUG messages are displayed, and if `-vv` is used TRACE \
                     messages are displayed. The verbosity can also be set with the \
                     `TILESTACK_LOG` environment variable"
    )]
    pub(crate) verbose: u8,

    /// Location of configuration file
    #[clap(
        long,
        short,
        takes_value = true,
        number_of_values = 1,
        value_name = "file",
        value_hint = ValueHint::FilePath,
        validator = |t| {
            fs::metadata(
                PathBuf::from(t).components()
                    .collect::<Vec<_>>()
                    .len()
                    .gt(&1_usize)
                    .then(|| PathBuf::from(t))
                    .unwrap_or_else(|| env::current_dir().unwrap_or(PathBuf::from(".")).join(PathBuf::from(t))),
            )
            .map_err(|_| "must be a valid path")
            .map(|_| ())
            .map_err(|e| e.to_string())
        },
        long_help = "\
        Specify the location of the configuration file. The default location is \
                `$XDG_CONFIG_HOME/tilestack/tilestack.yml`"
    )]
    pub(crate) config: Option<PathBuf>,

    /// Print the loaded configuration and exit
    #[clap(
        name = "dump-config",
        long = "dump-config",
        short = 'D',
        takes_value = false,
        long_help = "Print the configuration after defaults and per-desktop overrides are \
                     applied, then exit"
    )]
    pub(crate) dump_config: bool,

    /// Print each snapshot as indented JSON
    #[clap(long, short = 'P', takes_value = false)]
    pub(crate) pretty: bool,

    /// Script of events to feed to the window manager
    #[clap(
        name = "script",
        value_name = "script",
        value_hint = ValueHint::FilePath,
        required_unless_present = "dump-config",
        long_help = "\
        A YAML or JSON document with a list of `steps`. Each step is one event: managing or \
                unmanaging a window, a move, a state request, a desktop change, a pointer event \
                and so on. Every `query` step prints a snapshot of the window manager. Use `-` \
                to read the script from standard input"
    )]
    pub(crate) script: Option<String>,
}

// =============== Prettify Help ==================

/// Yellow ansi code
const YELLOW: &str = "\x1b[0;33m";
/// Green ansi code
const GREEN: &str = "\x1b[0;32m";
/// Bright-cyan ansi code
const BRCYAN: &str = "\x1b[38;5;14m";
/// Bold-red ansi code
const BRED: &str = "\x1b[01;38;5;1m";
/// Reset colors
const RES: &str = "\x1b[0m";

/// Colored options used in the output of `--help`
pub(crate) static APP_ABOUT: Lazy<String> = Lazy::new(|| {
    wants_color()
        .then(|| {
            format!(
                "{}DESCRIPTION: {}{}{}",
                YELLOW,
                GREEN,
                crate_description!(),
                RES
            )
        })
        .unwrap_or_else(|| crate_description!().to_owned())
});

/// Colorized message to override the generated help message
pub(crate) static OVERRIDE_HELP: Lazy<String> = Lazy::new(|| {
    wants_color()
        .then(|| {
            format!(
                "{}tilestack{} [{}FLAGS{}/{}OPTIONS{}] <{}script{}>",
                BRED, RES, GREEN, RES, GREEN, RES, BRCYAN, RES
            )
        })
        .unwrap_or_else(|| String::from("tilestack [FLAGS/OPTIONS] <script>"))
});

/// Colorized message displayed after the help message
pub(crate) static AFTER_HELP: Lazy<String> = Lazy::new(|| {
    wants_color()
        .then(|| {
            format!(
                "See {}tilestack{} {}--help{} for longer explanations of some options.",
                BRED, RES, GREEN, RES
            )
        })
        .unwrap_or_else(|| {
            String::from("See tilestack --help for longer explanations of some options.")
        })
});

/// Authors of the app
pub(crate) static APP_AUTHORS: Lazy<String> = Lazy::new(|| {
    let authors = env!("CARGO_PKG_AUTHORS").replace(':', ", ");
    wants_color()
        .then(|| format!("{}{}{}", BRCYAN, authors, RES))
        .unwrap_or(authors)
});

#[cfg(test)]
mod tests {
    use super::Opts;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_flags() {
        let opts = Opts::try_parse_from(["tilestack", "-vv", "--pretty", "steps.yml"])
            .expect("arguments parse");
        assert_eq!(opts.verbose, 2);
        assert!(opts.pretty);
        assert_eq!(opts.script.as_deref(), Some("steps.yml"));

        let opts = Opts::try_parse_from(["tilestack", "--dump-config"]).expect("arguments parse");
        assert!(opts.dump_config);
        assert_eq!(opts.script, None);
    }

    #[test]
    fn script_is_required() {
        assert!(Opts::try_parse_from(["tilestack"]).is_err());
    }
}
