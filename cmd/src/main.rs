/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

mod error;

use std::{path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::util::SubscriberInitExt;

use sta_datasource::{Config, DataSource, QueryOptions, ReqwestTransport, TestStatus};
use sta_query::{
    options::editor_options, Encoding, EntityKind, Query, ScopedVars, Variables,
};

use error::{Error, Result};

/// Compile and run SensorThings API dashboard queries from the command line.
#[derive(clap::Parser)]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    Url(UrlArgs),
    Query(QueryArgs),
    Test(TestArgs),
    Values(ValuesArgs),
    Options(OptionsArgs),
}

/// Print the request url of a query.
#[derive(clap::Args)]
struct UrlArgs {
    #[clap(long, help = "Show the query string without percent-encoding")]
    unencoded: bool,
    #[clap(long, env = "STA_BASE_URL", default_value = "")]
    base: String,
    query: PathBuf,
}

/// Fetch and transform queries, printing the resulting frames.
#[derive(clap::Args)]
struct QueryArgs {
    #[clap(long)]
    bench: bool,
    #[clap(long, help = "Return the fetched entities untransformed")]
    raw: bool,
    #[clap(long = "var", value_parser = parse_var, help = "Template variable (name=value)")]
    vars: Vec<(String, String)>,
    config: PathBuf,
    #[clap(required = true)]
    queries: Vec<PathBuf>,
}

/// Check the connection to the service.
#[derive(clap::Args)]
struct TestArgs {
    config: PathBuf,
}

/// List the options a query provides for a dashboard variable.
#[derive(clap::Args)]
struct ValuesArgs {
    #[clap(long = "var", value_parser = parse_var, help = "Template variable (name=value)")]
    vars: Vec<(String, String)>,
    config: PathBuf,
    query: PathBuf,
}

/// Print the query editor options for an entity kind.
#[derive(clap::Args)]
struct OptionsArgs {
    entity: EntityKind,
}

fn main() -> ExitCode {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish()
        .init();

    let args = Args::parse();

    let res = match &args.cmd {
        Command::Url(args) => url(args),
        Command::Query(args) => query(args),
        Command::Test(args) => block_on(test(args)),
        Command::Values(args) => block_on(values(args)),
        Command::Options(args) => options(args),
    };

    if let Err(e) = res {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)
}

fn block_on<F: std::future::Future<Output = Result<()>>>(f: F) -> Result<()> {
    runtime()?.block_on(f)
}

fn parse_var(arg: &str) -> std::result::Result<(String, String), String> {
    arg.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{arg}'"))
}

fn try_benchmark<F, R>(flag: bool, msg: &str, f: F) -> Result<R>
where
    F: FnOnce() -> Result<R>,
{
    if flag {
        let start = Instant::now();
        let r = f()?;
        eprintln!(
            "{msg} took {:.3}ms",
            Instant::now().duration_since(start).as_micros() as f64 / 1000.0
        );
        Ok(r)
    } else {
        f()
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(Error::Serialize)?
    );
    Ok(())
}

fn url(args: &UrlArgs) -> Result<()> {
    let query = Query::load(&args.query)?;
    let encoding = match args.unencoded {
        true => Encoding::Unencoded,
        false => Encoding::Encoded,
    };
    println!("{}", query.url(&args.base, encoding));
    Ok(())
}

async fn connect(path: &std::path::Path) -> Result<DataSource<ReqwestTransport>> {
    let config = Config::load(path)?;
    log::debug!("connecting to {}", config.datasource.base_url());
    let transport = ReqwestTransport::connect(&config.datasource, &config.secure).await?;
    Ok(DataSource::new(config.datasource, transport))
}

fn variables(vars: &[(String, String)]) -> Variables {
    vars.iter().cloned().collect()
}

fn query(args: &QueryArgs) -> Result<()> {
    let targets = try_benchmark(args.bench, "Loading queries", || {
        args.queries
            .iter()
            .map(|path| Ok(Query::load(path)?))
            .collect::<Result<Vec<_>>>()
    })?;

    let rt = runtime()?;
    let ds = rt
        .block_on(connect(&args.config))?
        .with_template_srv(variables(&args.vars));
    let options = QueryOptions {
        raw: args.raw,
        ..QueryOptions::default()
    };

    let frames = try_benchmark(args.bench, "Running queries", || {
        Ok(rt.block_on(ds.query(&targets, &ScopedVars::new(), &options)))
    })?;
    print_json(&frames)
}

async fn test(args: &TestArgs) -> Result<()> {
    let ds = connect(&args.config).await?;
    let result = ds.test_connection().await;
    print_json(&result)?;
    match result.status {
        TestStatus::Success => Ok(()),
        TestStatus::Error => Err(Error::ConnectionFailed),
    }
}

async fn values(args: &ValuesArgs) -> Result<()> {
    let query = Query::load(&args.query)?;
    let ds = connect(&args.config)
        .await?
        .with_template_srv(variables(&args.vars));
    print_json(&ds.resolve_template_values(&query, &ScopedVars::new()).await)
}

fn options(args: &OptionsArgs) -> Result<()> {
    print_json(&editor_options(args.entity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benchmark_returns_result() {
        assert_eq!(try_benchmark(true, "Counting", || Ok(42)).ok(), Some(42));
        assert_eq!(try_benchmark(false, "Counting", || Ok(42)).ok(), Some(42));
        assert!(matches!(
            try_benchmark(true, "Failing", || -> Result<()> { Err(Error::ConnectionFailed) }),
            Err(Error::ConnectionFailed)
        ));
    }

    #[test]
    fn options_subcommand_parses_entity() {
        let args = Args::try_parse_from(["sta", "options", "Datastreams"]).unwrap();
        assert!(matches!(
            args.cmd,
            Command::Options(OptionsArgs {
                entity: EntityKind::Datastreams
            })
        ));
    }
}
