//! Purpose: `sideload` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::aot::Shell;
use serde_json::json;

use sideload::api::{
    decode_document, load_registry, to_exit_code, to_http_status, Document, Error, ErrorKind,
    ResolveOptions,
};

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(()) => 0,
        Err(err) => {
            let err = add_missing_id_hint(add_conflict_hint(err));
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    match cli.command {
        Command::Check { file, json } => check(&file, json),
        Command::Decode {
            file,
            schema,
            expected_type,
            allow_missing_id,
            pretty,
        } => decode(&file, &schema, expected_type, allow_missing_id, pretty),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "sideload", &mut io::stdout());
            Ok(())
        }
    }
}

#[derive(Parser)]
#[command(
    name = "sideload",
    version,
    about = "Validate and decode JSON:API compound documents",
    long_about = None,
    before_help = r#"Documents are validated first (data/errors shape), then resolved against a
model schema into a connected instance graph with side-loaded resources
attached to their relationships."#,
    after_help = r#"EXAMPLES
  $ sideload check response.json
  $ sideload decode response.json --schema models.json --type articles
  $ curl -s https://api.example.com/articles/1 | sideload decode - --schema models.json

LEARN MORE
  $ sideload <command> --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        arg_required_else_help = true,
        about = "Validate document shape only",
        long_about = r#"Run the document validator without resolving resources.

Reports whether the input is a well-formed JSON:API data document. A document
that carries an `errors` member is always a failure: the upstream error list
is emitted on stderr and the exit code reflects it."#,
        after_help = r#"EXAMPLES
  $ sideload check response.json
  $ sideload check --json response.json
  $ cat response.json | sideload check -"#
    )]
    Check {
        #[arg(help = "Document path (use - for stdin)", value_hint = ValueHint::FilePath)]
        file: String,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Decode a document into model instances",
        long_about = r#"Validate the document, resolve every primary resource against the schema's
model registry, and print the decoded instance graph as JSON on stdout.

Relationships whose targets appear in `included` are resolved into nested
instances (recursively); the rest keep their raw ids."#,
        after_help = r#"EXAMPLES
  $ sideload decode response.json --schema models.json
  $ sideload decode response.json --schema models.json --type articles
  $ sideload decode draft.json --schema models.json --allow-missing-id

NOTES
  - The schema file lists models: {"models": [{"type": "article", "plural": "articles", "fields": ["title"]}]}
  - Omitting "fields" copies every attribute; omitting "plural" appends an s
  - --type must match the resolved model's singular or plural name"#
    )]
    Decode {
        #[arg(help = "Document path (use - for stdin)", value_hint = ValueHint::FilePath)]
        file: String,
        #[arg(
            long,
            value_name = "PATH",
            help = "Model schema file",
            value_hint = ValueHint::FilePath
        )]
        schema: PathBuf,
        #[arg(
            long = "type",
            value_name = "NAME",
            help = "Expected type for every primary resource"
        )]
        expected_type: Option<String>,
        #[arg(
            long,
            help = "Permit primary resources without an id (client-created drafts)"
        )]
        allow_missing_id: bool,
        #[arg(long, help = "Pretty-print the decoded output")]
        pretty: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ sideload completion bash > ~/.local/share/bash-completion/completions/sideload
  $ sideload completion zsh > ~/.zfunc/_sideload"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn check(file: &str, as_json: bool) -> Result<(), Error> {
    let input = read_input(file)?;
    let document = Document::from_str(&input)?;
    if as_json {
        println!(
            "{}",
            json!({
                "status": "ok",
                "primary": document.primary_count(),
                "included": document.included().len(),
            })
        );
    } else {
        println!(
            "ok: {} primary resource(s), {} included",
            document.primary_count(),
            document.included().len()
        );
    }
    Ok(())
}

fn decode(
    file: &str,
    schema: &Path,
    expected_type: Option<String>,
    allow_missing_id: bool,
    pretty: bool,
) -> Result<(), Error> {
    let schema_input = std::fs::read_to_string(schema).map_err(|err| {
        Error::new(ErrorKind::InvalidInput)
            .with_message(format!("failed to read schema file {}", schema.display()))
            .with_source(err)
    })?;
    let registry = load_registry(&schema_input)?;

    let input = read_input(file)?;
    let document = Document::from_str(&input)?;

    let mut options = ResolveOptions::new();
    if let Some(expected_type) = expected_type {
        options = options.with_expected_type(expected_type);
    }
    if allow_missing_id {
        options = options.allow_missing_id();
    }

    let resolved = decode_document(document, &registry, &options)?;
    let value = resolved.to_value();
    if pretty {
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    } else {
        println!("{value}");
    }
    Ok(())
}

fn read_input(file: &str) -> Result<String, Error> {
    if file == "-" {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input).map_err(|err| {
            Error::new(ErrorKind::InvalidInput)
                .with_message("failed to read stdin")
                .with_source(err)
        })?;
        return Ok(input);
    }
    std::fs::read_to_string(file).map_err(|err| {
        Error::new(ErrorKind::InvalidInput)
            .with_message(format!("failed to read {file}"))
            .with_source(err)
    })
}

fn add_missing_id_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::MissingId || err.hint().is_some() {
        return err;
    }
    err.with_hint("Pass --allow-missing-id for client-created resources awaiting a server id.")
}

fn add_conflict_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::UnknownType => {
            err.with_hint("Register the type in the schema file passed via --schema.")
        }
        ErrorKind::TypeMismatch => {
            err.with_hint("Check --type against the model's singular/plural names.")
        }
        _ => err,
    }
}

fn emit_error(err: &Error) {
    let payload = json!({
        "error": {
            "kind": format!("{:?}", err.kind()),
            "message": err.message(),
            "type": err.type_name(),
            "id": err.id(),
            "relationship": err.relationship(),
            "hint": err.hint(),
            "http_status": to_http_status(err.kind()),
            "upstream": err.upstream(),
        }
    });
    eprintln!("{payload}");
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
