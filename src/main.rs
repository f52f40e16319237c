//! The placement and layout core of a tiling and stacking window manager,
//! driven by scripts of window-manager events

// registry -> placement -> state -> layout

#![deny(
    clippy::all,
    clippy::complexity,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    absolute_paths_not_starting_with_crate,
    anonymous_parameters,
    bad_style,
    ellipsis_inclusive_range_patterns,
    exported_private_dependencies,
    ill_formed_attribute_input,
    improper_ctypes,
    keyword_idents,
    macro_use_extern_crate,
    meta_variable_misuse,
    missing_abi,
    no_mangle_generic_items,
    non_shorthand_field_patterns,
    noop_method_call,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    semicolon_in_expressions_from_macros,
    unconditional_recursion,
    unsafe_code,
    while_true
)]
#![allow(
    clippy::redundant_pub_crate,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
)]
#![cfg_attr(
    any(test),
    allow(
        clippy::expect_fun_call,
        clippy::expect_used,
        clippy::panic,
        clippy::unwrap_used,
        clippy::wildcard_enum_match_arm,
    )
)]

mod cli;
mod client;
mod collab;
mod config;
mod core;
mod desktop;
mod error;
mod focus;
mod geometry;
mod hints;
mod input;
mod layout;
mod macros;
mod manager;
mod placement;
mod pointer;
mod query;
mod registry;
mod script;
mod state;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::{fs, io::Read};

use crate::{
    cli::Opts,
    collab::Recorder,
    config::Config,
    core::decoration::Decoration,
    manager::Manager,
    script::Script,
};

/// Read a script from a file, or from standard input when given `-`
fn read_script(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read script from stdin")?;
        return Ok(text);
    }

    let path = utils::expand_path(source)?;
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read script: '{}'", path.display()))
}

fn main() -> Result<()> {
    let args = Opts::parse();

    let config = match args.config.as_ref() {
        Some(path) => Config::load(path).unwrap_or_else(|e| tilestack_fatal!("{:#}", e)),
        None => Config::load_default().unwrap_or_else(|e| {
            tilestack_error!("{:#}", e);
            tilestack_info!("falling back to the default configuration");
            Config::default()
        }),
    };

    let _logger = utils::initialize_logging(&config, &args)?;
    log::debug!("{}: {:#?}", "Configuration options".bright_blue(), config);

    if args.dump_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let source = args.script.as_deref().unwrap_or("-");
    let script = Script::from_yaml(read_script(source)?)
        .unwrap_or_else(|e| tilestack_fatal!("{}", e));

    let backend = Recorder::new(Decoration::new(&config));
    let mut wm = Manager::new(config, backend);

    let mut snapshots = script
        .run(&mut wm)
        .unwrap_or_else(|e| tilestack_fatal!("{:#}", e));

    for call in wm.backend.drain() {
        log::trace!("{}", serde_json::to_string(&call)?);
    }

    if snapshots.is_empty() {
        snapshots.push(wm.snapshot());
    }

    for snapshot in &snapshots {
        let line = if args.pretty {
            snapshot.to_json_pretty()?
        } else {
            snapshot.to_json()?
        };
        println!("{}", line);
    }

    Ok(())
}
