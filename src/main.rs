use clap::{Parser as ClapParser, Subcommand};
use jpq::Environment;
use jpq::cli::{self, CliError, QueryOptions};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "jpq")]
#[command(about = "jpq - Query JSON documents with RFC 9535 JSONPath")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSONPath query against a JSON document
    Query {
        /// The JSONPath query to execute
        query: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Print each match as {"path": ..., "value": ...}
        #[arg(short, long)]
        nodes: bool,
    },

    /// Check a query and print its canonical form
    Parse {
        /// The JSONPath query to parse
        query: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let env = Environment::new();

    let result = match cli.command {
        Commands::Query {
            query,
            input,
            pretty,
            nodes,
        } => run_query(&env, query, input, pretty, nodes),
        Commands::Parse { query } => cli::execute_parse(&env, &query).map(|canonical| {
            println!("{}", canonical);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_query(
    env: &Environment,
    query: String,
    input: Option<String>,
    pretty: bool,
    nodes: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = QueryOptions {
        query,
        input,
        nodes,
    };

    let output = cli::execute_query(env, &options)?;
    log::debug!("{} match(es)", output.count);

    let json = if pretty {
        serde_json::to_string_pretty(&output.result)
    } else {
        serde_json::to_string(&output.result)
    }?;
    println!("{}", json);
    Ok(())
}
