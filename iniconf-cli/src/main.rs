use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Builder as LoggerBuilder;
use iniconf::{IniStore, IniStoreBuilder, NewKeyPolicy};
use log::LevelFilter;

#[derive(Debug, Clone, ValueEnum)]
enum Verbosity {
    Warnings,
    Silent,
    Debug,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ValueType {
    String,
    Int,
    Double,
    Bool,
}

/// Read and edit .ini files without losing their comments
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path of the .ini file
    #[arg(short, long)]
    path: PathBuf,

    /// Log verbosity
    #[arg(short, long, value_enum, default_value_t = Verbosity::Warnings)]
    verbosity: Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value of a key
    Get {
        /// Section name. Leave empty for entries before the first section header.
        #[arg(short, long, default_value = "")]
        section: String,

        /// Key name
        #[arg(short, long)]
        key: String,

        /// Type to read the value as
        #[arg(long = "as", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,
    },
    /// Set the value of a key and write the file
    Set {
        /// Section name. Leave empty for entries before the first section header.
        #[arg(short, long, default_value = "")]
        section: String,

        /// Key name
        #[arg(short, long)]
        key: String,

        /// New value
        #[arg(long)]
        value: String,

        /// Type the value must parse as before it is written
        #[arg(long = "as", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,

        /// Keep keys that are not yet in the file out of it
        #[arg(long)]
        drop_new_keys: bool,
    },
    /// List sections, or the entries of one section
    List {
        /// Section to list the entries of
        #[arg(short, long)]
        section: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.verbosity {
        Verbosity::Silent => (),
        Verbosity::Warnings => LoggerBuilder::new().filter(None, LevelFilter::Warn).init(),
        Verbosity::Debug => LoggerBuilder::new().filter(None, LevelFilter::Debug).init(),
    }

    if args.path.extension().is_none_or(|extension| extension != "ini") {
        log::warn!("Specified file does not have an .ini extension!");
    }

    match args.command {
        Command::Get { section, key, value_type } => {
            let store = IniStore::open(args.path)?;
            println!("{}", read_value(&store, &section, &key, value_type)?);
        }
        Command::Set {
            section,
            key,
            value,
            value_type,
            drop_new_keys,
        } => {
            let policy = if drop_new_keys { NewKeyPolicy::Drop } else { NewKeyPolicy::Append };
            let mut store = IniStoreBuilder::new().path(args.path).new_key_policy(policy).open()?;
            write_value(&mut store, &section, &key, &value, value_type)?;
            store.commit_changes()?;
        }
        Command::List { section: None } => {
            let store = IniStore::open(args.path)?;
            for name in store.sections() {
                println!("[{name}]");
            }
        }
        Command::List { section: Some(name) } => {
            let store = IniStore::open(args.path)?;
            print!("{}", store.section(&name)?);
        }
    }

    Ok(())
}

fn read_value(store: &IniStore, section: &str, key: &str, value_type: ValueType) -> Result<String, iniconf::IniError> {
    Ok(match value_type {
        ValueType::String => store.get_value(section, key)?.to_string(),
        ValueType::Int => store.get_int_value(section, key)?.to_string(),
        ValueType::Double => store.get_double_value(section, key)?.to_string(),
        ValueType::Bool => store.get_bool_value(section, key)?.to_string(),
    })
}

fn write_value(store: &mut IniStore, section: &str, key: &str, value: &str, value_type: ValueType) -> anyhow::Result<()> {
    match value_type {
        ValueType::String => store.set_string_value(section, key, value),
        ValueType::Int => {
            let number = iniconf::parse_int(value).map_err(|error| anyhow!("'{value}' is not an integer: {error}"))?;
            store.set_int_value(section, key, number);
        }
        ValueType::Double => {
            let number = iniconf::parse_double(value).map_err(|error| anyhow!("'{value}' is not a double: {error}"))?;
            store.set_double_value(section, key, number);
        }
        ValueType::Bool => store.set_bool_value(section, key, iniconf::parse_bool(value)),
    }
    Ok(())
}
