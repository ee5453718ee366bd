use crate::router::Router;
use crate::server::{AppService, ParsedRequest};
use crate::spec::{load_routes, ParameterMeta};
use crate::tutorial;
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Command-line interface for bindrouter
///
/// Inspects route tables and runs single requests through the binding
/// pipeline without a network listener.
#[derive(Parser)]
#[command(name = "bindrouter")]
#[command(about = "Declaration-driven request router", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the route table in matching order with each parameter's origin
    Inspect {
        /// Route manifest (YAML or JSON); the built-in tutorial when omitted
        #[arg(short, long, env = "BINDR_ROUTES")]
        routes: Option<PathBuf>,
    },
    /// Run one request through the service and print status and body
    Request {
        /// HTTP method, e.g. GET
        method: String,

        /// Request target: path plus optional query string
        target: String,

        /// Route manifest (YAML or JSON); handlers echo their bound values.
        /// The built-in tutorial when omitted.
        #[arg(short, long, env = "BINDR_ROUTES")]
        routes: Option<PathBuf>,

        /// Raw request body, sent as-is
        #[arg(short, long)]
        body: Option<String>,

        /// Cookie as NAME=VALUE (repeatable)
        #[arg(long, value_name = "NAME=VALUE")]
        cookie: Vec<String>,

        /// Header as "NAME: VALUE" (repeatable)
        #[arg(short = 'H', long, value_name = "NAME: VALUE")]
        header: Vec<String>,
    },
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Returns an error if:
/// - The route manifest cannot be read, parsed or registered
/// - A `--cookie` or `--header` argument is malformed
/// - The method is not a valid HTTP method token
/// - Writing to stdout fails
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    execute(cli, &mut stdout.lock())
}

/// Run a parsed command, writing its output to `out`.
///
/// # Errors
///
/// See [`run_cli`].
pub fn execute(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    match cli.command {
        Commands::Inspect { routes } => {
            let service = load_service(routes.as_deref())?;
            describe_routes(service.router(), out)?;
            Ok(())
        }
        Commands::Request {
            method,
            target,
            routes,
            body,
            cookie,
            header,
        } => {
            let service = load_service(routes.as_deref())?;
            let headers = header
                .iter()
                .map(|h| split_pair(h, ':').with_context(|| format!("malformed header {h:?}")))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let mut request = ParsedRequest::from_parts(
                &method.to_ascii_uppercase(),
                &target,
                headers,
                body.map(String::into_bytes),
            )?;
            for c in &cookie {
                let (name, value) =
                    split_pair(c, '=').with_context(|| format!("malformed cookie {c:?}"))?;
                request = request.with_cookie(name, value);
            }

            let response = service.handle(&request);
            writeln!(out, "{}", response.status)?;
            for (name, value) in &response.headers {
                writeln!(out, "{name}: {value}")?;
            }
            writeln!(out)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&response.body)?)?;
            Ok(())
        }
    }
}

fn load_service(routes: Option<&Path>) -> anyhow::Result<AppService> {
    match routes {
        Some(path) => Ok(tutorial::echo_service(load_routes(path)?)),
        None => tutorial::build_service(),
    }
}

fn split_pair(raw: &str, sep: char) -> anyhow::Result<(String, String)> {
    let (name, value) = raw
        .split_once(sep)
        .ok_or_else(|| anyhow!("expected a '{sep}' separator"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("empty name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn describe_routes(router: &Router, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{} ({} routes, first match wins)",
        router.title(),
        router.routes().len()
    )?;
    for route in router.routes() {
        writeln!(
            out,
            "{} {} -> {}  [body: {:?}]",
            route.method, route.path_pattern, route.handler_name, route.body_layout
        )?;
        for param in &route.parameters {
            writeln!(out, "    {}", describe_param(param))?;
        }
    }
    Ok(())
}

fn describe_param(param: &ParameterMeta) -> String {
    let field = &param.field;
    let mut line = format!("{}: {} in {}", field.name, field.ty, param.location);
    if let Some(alias) = &field.alias {
        line.push_str(&format!(" as {alias:?}"));
    }
    if param.embed {
        line.push_str(" embed");
    }
    match &field.default {
        Some(default) => line.push_str(&format!(" default={default}")),
        None if field.required => line.push_str(" required"),
        None => line.push_str(" optional"),
    }
    if field.docs.deprecated {
        line.push_str(" deprecated");
    }
    line
}
