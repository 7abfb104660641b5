//! Command line access to ordered aggregations stored in a JSON statement file.
#![forbid(unsafe_code)]

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use proxy_order::{
    config::OrderConfig, logging::init_logging, BareMember, BareResolver, Graph, MemberContext,
    MemberId, MemoryStore, OrderError, OrderedList, Term, UriTranslator,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "order-cli",
    version,
    about = "Inspect and edit the member order of an aggregation",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "JSON statement file holding the graph")]
    graph: PathBuf,

    #[arg(long, value_name = "IRI", help = "Aggregation carrying iana:first/iana:last")]
    anchor: String,

    #[arg(long, value_name = "IRI", help = "Base IRI member identifiers live under")]
    base: Option<String>,

    #[arg(long, value_name = "FILE", env = "PROXY_ORDER_CONFIG", help = "TOML config file")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "FILTER", env = "PROXY_ORDER_LOG", help = "Log filter directive")]
    log_level: Option<String>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every position with its member and node subject.
    Show,
    /// Print member identifiers in order.
    Ids,
    /// Append a member.
    Append {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Insert a member at a zero-based position; past the end appends.
    Insert {
        #[arg(value_name = "INDEX")]
        index: usize,
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Remove the member at a zero-based position.
    DeleteAt {
        #[arg(value_name = "INDEX")]
        index: usize,
    },
    /// Remove every occurrence of a member.
    Remove {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct Position {
    index: usize,
    id: Option<String>,
    subject: String,
}

#[derive(Serialize)]
struct EditReport {
    removed: usize,
    added: usize,
    ids: Vec<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = OrderConfig::load(cli.config.as_deref())?;
    let level = cli.log_level.as_deref().unwrap_or(config.log_level());
    init_logging(level)?;

    let base = cli
        .base
        .clone()
        .or_else(|| config.member_base().map(str::to_owned))
        .ok_or_else(|| {
            OrderError::InvalidArgument("--base or order.member_base is required".into())
        })?;
    let translator = UriTranslator::new(base);
    let store = Arc::new(MemoryStore::from_graph(read_graph(&cli.graph)?));
    let members = MemberContext::<BareMember>::new(Arc::new(BareResolver::new(translator.clone())));
    let mut list = OrderedList::load(
        store.clone(),
        Term::iri(cli.anchor.clone()),
        members,
        config.options(),
    )?;

    match &cli.command {
        Command::Show => {
            let mut positions = Vec::new();
            for (index, item) in list.iter().enumerate() {
                let key = item?;
                positions.push(Position {
                    index,
                    id: list.target_id(key)?.map(|id| id.to_string()),
                    subject: list.subject_of(key)?.to_string(),
                });
            }
            emit(cli.format, &positions, |positions| {
                for position in positions {
                    let id = position.id.as_deref().unwrap_or("-");
                    println!("{}\t{}\t{}", position.index, id, position.subject);
                }
            })?;
            return Ok(());
        }
        Command::Ids => {
            let ids = id_strings(list.target_ids()?);
            emit(cli.format, &ids, |ids| {
                for id in ids {
                    println!("{id}");
                }
            })?;
            return Ok(());
        }
        Command::Append { id } => {
            list.sequence().push(BareMember::new(&translator, id.as_str()))?;
        }
        Command::Insert { index, id } => {
            list.sequence()
                .insert_at(*index, BareMember::new(&translator, id.as_str()))?;
        }
        Command::DeleteAt { index } => {
            if list.sequence().delete_at(*index)?.is_none() {
                return Err(OrderError::NotFound(format!("position {index}")).into());
            }
        }
        Command::Remove { id } => {
            let member = BareMember::new(&translator, id.as_str());
            if list.sequence().delete(&member)?.is_none() {
                return Err(OrderError::NotFound(format!("member {id}")).into());
            }
        }
    }

    let delta = list.commit(store.as_ref())?;
    write_graph(&cli.graph, &store.snapshot())?;
    let report = EditReport {
        removed: delta.removed.len(),
        added: delta.added.len(),
        ids: id_strings(list.target_ids()?),
    };
    emit(cli.format, &report, |report| {
        println!(
            "Committed: -{} +{} statements; {} members",
            report.removed,
            report.added,
            report.ids.len()
        );
    })?;
    Ok(())
}

fn read_graph(path: &Path) -> proxy_order::Result<Graph> {
    if !path.exists() {
        return Ok(Graph::new());
    }
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn write_graph(path: &Path, graph: &Graph) -> proxy_order::Result<()> {
    let json = serde_json::to_string_pretty(graph)?;
    fs::write(path, json)?;
    Ok(())
}

fn id_strings(ids: Vec<MemberId>) -> Vec<String> {
    ids.into_iter().map(|id| id.to_string()).collect()
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: Fn(&T),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(value),
    }
    Ok(())
}
