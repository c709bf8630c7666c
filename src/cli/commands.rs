//! Command dispatch for the `lct` binary

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{Coercer, RawConfig};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, OutputFormat, Settings};
use crate::domain::value::render_value;
use crate::domain::{ConfigMapping, ConfigTree, Entry};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load()?;
    debug!("settings: {:?}", settings);
    match &cli.command {
        Some(Commands::Show { tree, files }) => {
            let config = load_tree(&settings, &cli.layers, files)?;
            _show(&config, *tree, settings.show_sources)
        }
        Some(Commands::Get { key, layer, files }) => {
            let config = load_tree(&settings, &cli.layers, files)?;
            _get(&config, key, layer.as_deref())
        }
        Some(Commands::Meta { key, files }) => {
            let config = load_tree(&settings, &cli.layers, files)?;
            _meta(&config, key)
        }
        Some(Commands::Dump { format, files }) => {
            let config = load_tree(&settings, &cli.layers, files)?;
            _dump(&config, format.unwrap_or(settings.format))
        }
        Some(Commands::Config { command }) => _config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "lct", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

/// Build a tree from `NAME=FILE` pairs, or from positional files mapped
/// onto the configured layers in order.
#[instrument(level = "debug", skip(settings))]
pub fn load_tree(
    settings: &Settings,
    pairs: &[(String, PathBuf)],
    files: &[PathBuf],
) -> CliResult<ConfigTree> {
    let (layers, assignments): (Vec<String>, Vec<(String, PathBuf)>) = if !pairs.is_empty() {
        if !files.is_empty() {
            return Err(CliError::InvalidArgs(
                "use either --layer NAME=FILE or positional files, not both".into(),
            ));
        }
        (
            pairs.iter().map(|(name, _)| name.clone()).collect(),
            pairs.to_vec(),
        )
    } else {
        if files.is_empty() {
            return Err(CliError::Usage(
                "no configuration files given (pass FILE... or --layer NAME=FILE)".into(),
            ));
        }
        if files.len() > settings.layers.len() {
            return Err(CliError::InvalidArgs(format!(
                "{} files given but only {} layers configured: {}",
                files.len(),
                settings.layers.len(),
                settings.layers.join(", ")
            )));
        }
        (
            settings.layers.clone(),
            settings.layers.iter().cloned().zip(files.iter().cloned()).collect(),
        )
    };

    let mut tree = ConfigTree::builder().layers(layers).build()?;
    let coercer = Coercer::default();
    for (layer, file) in assignments {
        debug!("layer {layer}: {}", file.display());
        tree.update_with(&coercer, RawConfig::File(file), Some(&layer), None)?;
    }
    Ok(tree)
}

/// Render a plain mapping in `format`.
pub fn render(mapping: &ConfigMapping, format: OutputFormat) -> CliResult<String> {
    let render_err = |reason: String| CliError::Render {
        format: format.to_string(),
        reason,
    };
    let text = match format {
        OutputFormat::Yaml => serde_yaml::to_string(mapping).map_err(|e| render_err(e.to_string()))?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(mapping).map_err(|e| render_err(e.to_string()))?
        }
        OutputFormat::Toml => toml::to_string_pretty(mapping).map_err(|e| render_err(e.to_string()))?,
    };
    Ok(text.trim_end().to_string())
}

#[instrument(level = "debug", skip(config))]
fn _show(config: &ConfigTree, as_tree: bool, show_sources: bool) -> CliResult<()> {
    if config.is_empty() {
        output::warning("configuration is empty");
        return Ok(());
    }
    if as_tree {
        output::info(&config.to_termtree());
    } else if show_sources {
        output::info(&format!("{config:#}"));
    } else {
        output::info(config);
    }
    Ok(())
}

#[instrument(level = "debug", skip(config))]
fn _get(config: &ConfigTree, key: &str, layer: Option<&str>) -> CliResult<()> {
    if layer.is_some() {
        output::info(&render_value(config.get_from_layer(key, layer)?));
        return Ok(());
    }
    match config.get(key)? {
        Entry::Value(value) => output::info(&render_value(value)),
        Entry::Tree(subtree) => output::info(&render(&subtree.to_dict(), OutputFormat::Yaml)?),
    }
    Ok(())
}

#[instrument(level = "debug", skip(config))]
fn _meta(config: &ConfigTree, key: &str) -> CliResult<()> {
    output::header(key);
    for entry in config.metadata(key)? {
        output::action(&entry.layer, &render_value(&entry.value));
        output::detail(&format!(
            "source: {}",
            entry.source.as_deref().unwrap_or("unknown")
        ));
    }
    Ok(())
}

#[instrument(level = "debug", skip(config))]
fn _dump(config: &ConfigTree, format: OutputFormat) -> CliResult<()> {
    output::info(&render(&config.to_dict(), format)?);
    Ok(())
}

fn _config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(settings.to_toml()?.trim_end()),
        ConfigCommands::Template => output::info(Settings::template().trim_end()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                output::action("global", &path.display());
                if !path.exists() {
                    output::detail("(not found)");
                }
            }
            None => output::warning("cannot determine the config directory"),
        },
    }
    Ok(())
}
