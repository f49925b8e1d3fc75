//! `intake-portal`: drive the site client from a terminal.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args
//!   3. Init logger (`--log-level` > `RUST_LOG` > `INTAKE_LOG_LEVEL` > info)
//!   4. Resolve the config location for the page URL and load it
//!   5. Run the requested command
//!
//! ```text
//! intake-portal [--page-url <url>] [--log-level <level>] <command>
//!
//! Commands:
//!   config                        print the resolved configuration
//!   get <path>                    print one dotted-path value
//!   format-phone <input>          print the formatted phone number
//!   send-code <phone>             request a verification code
//!   verify <phone> <code>         check a verification code
//!   submit <first> <last> <email> <phone> <evaluation-type>
//!                                 send an intake form without the verification gate
//!   demo                          interactive verify-then-submit flow on stdin
//!   contact <name> <email> <message>
//!                                 send the general contact form
//! ```

use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

use reqwest::Url;
use tracing::info;

use intake_portal::config::{ConfigEntry, ConfigResolver};
use intake_portal::env::EnvSnapshot;
use intake_portal::error::AppError;
use intake_portal::intake::{IntakeClient, IntakeForm, SUCCESS_MESSAGE};
use intake_portal::logger::{self, LogSettings};
use intake_portal::phone;
use intake_portal::session::{ContactForm, DemoSession};
use intake_portal::verification::VerificationClient;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ── CLI arg parsing ────────────────────────────────────────────────────────

struct Args {
    page_url: Option<String>,
    log_level: Option<String>,
    command: Option<String>,
    rest: Vec<String>,
}

fn parse_args() -> Args {
    let mut page_url = None;
    let mut log_level = None;
    let mut command = None;
    let mut rest = Vec::new();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--page-url" | "-p" if command.is_none() => page_url = iter.next(),
            "--log-level" | "-l" if command.is_none() => log_level = iter.next(),
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--" => {
                rest.extend(iter);
                break;
            }
            _ if command.is_none() => command = Some(arg),
            _ => rest.push(arg),
        }
    }

    Args { page_url, log_level, command, rest }
}

fn print_help() {
    eprintln!("usage: intake-portal [--page-url <url>] [--log-level <level>] <command>");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  config                     print the resolved configuration");
    eprintln!("  get <path>                 print one dotted-path value");
    eprintln!("  format-phone <input>       print the formatted phone number");
    eprintln!("  send-code <phone>          request a verification code");
    eprintln!("  verify <phone> <code>      check a verification code");
    eprintln!("  submit <first> <last> <email> <phone> <evaluation-type>");
    eprintln!("                             send an intake form directly");
    eprintln!("  demo                       interactive verify-then-submit flow");
    eprintln!("  contact <name> <email> <message>");
    eprintln!("                             send the general contact form");
    eprintln!();
    eprintln!("flags:");
    eprintln!("  --page-url,  -p <url>      page the client runs on");
    eprintln!("                             (default: $INTAKE_PAGE_URL, else ./index.html)");
    eprintln!("  --log-level, -l <level>    error|warn|info|debug|trace");
    eprintln!("  --help,      -h            print this help");
}

fn arg<'a>(rest: &'a [String], idx: usize, name: &str) -> Result<&'a str, AppError> {
    rest.get(idx)
        .map(String::as_str)
        .ok_or_else(|| AppError::Usage(format!("missing <{name}>")))
}

// ── Commands ───────────────────────────────────────────────────────────────

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();
    let env = EnvSnapshot::from_process();
    let args = parse_args();

    let Some(command) = args.command.as_deref() else {
        print_help();
        return Err(AppError::Usage("no command given".into()));
    };

    // Local-only commands need neither logging nor config.
    if command == "format-phone" {
        println!("{}", phone::format_phone(arg(&args.rest, 0, "input")?));
        return Ok(());
    }
    if command == "contact" {
        let mut form = ContactForm {
            name: arg(&args.rest, 0, "name")?.to_string(),
            email: arg(&args.rest, 1, "email")?.to_string(),
            message: arg(&args.rest, 2, "message")?.to_string(),
        };
        println!("{}", form.submit());
        return Ok(());
    }

    let log = LogSettings::resolve(args.log_level.as_deref(), &env)?;
    logger::init(&log)?;

    let page_url = page_url(args.page_url.as_deref().or_else(|| env.get("INTAKE_PAGE_URL")))?;
    let config = Arc::new(ConfigResolver::new(&page_url, env)?);
    config.load_config().await;
    info!(page = %page_url, source = ?config.source(), "config ready");

    match command {
        "config" => print_config(&config),
        "get" => {
            let path = arg(&args.rest, 0, "path")?;
            match config.get(path) {
                Some(ConfigEntry::Value(v)) => println!("{v}"),
                Some(ConfigEntry::Section(section)) => {
                    let mut keys: Vec<_> = section.iter().collect();
                    keys.sort_by(|a, b| a.0.cmp(b.0));
                    for (k, v) in keys {
                        println!("{k}: {v}");
                    }
                }
                None => return Err(AppError::Config(format!("no value at '{path}'"))),
            }
        }
        "send-code" => {
            let verifier = VerificationClient::new(config);
            verifier.send_code(arg(&args.rest, 0, "phone")?).await?;
            println!("verification code sent");
        }
        "verify" => {
            let verifier = VerificationClient::new(config);
            let phone = arg(&args.rest, 0, "phone")?;
            let code = phone::sanitize_code(arg(&args.rest, 1, "code")?);
            let verified = verifier.verify_code(phone, &code).await?;
            println!("{}", if verified { "verified" } else { "not verified" });
        }
        "submit" => {
            let form = IntakeForm {
                first_name: arg(&args.rest, 0, "first")?.to_string(),
                last_name: arg(&args.rest, 1, "last")?.to_string(),
                email: arg(&args.rest, 2, "email")?.to_string(),
                number: phone::format_phone(arg(&args.rest, 3, "phone")?),
                evaluation_type: arg(&args.rest, 4, "evaluation-type")?.to_string(),
            };
            form.validate().map_err(|e| AppError::Usage(e.to_string()))?;
            IntakeClient::new(config).submit(&form).await?;
            println!("{SUCCESS_MESSAGE}");
        }
        "demo" => run_demo(config).await?,
        other => {
            print_help();
            return Err(AppError::Usage(format!("unknown command '{other}'")));
        }
    }

    Ok(())
}

/// `--page-url` / `INTAKE_PAGE_URL`, else `index.html` in the working directory.
fn page_url(explicit: Option<&str>) -> Result<Url, AppError> {
    if let Some(raw) = explicit {
        return Url::parse(raw).map_err(|e| AppError::Config(format!("invalid page url '{raw}': {e}")));
    }
    let cwd = std::env::current_dir()?;
    Url::from_file_path(cwd.join("index.html"))
        .map_err(|()| AppError::Config(format!("cannot express {} as a URL", cwd.display())))
}

fn print_config(config: &ConfigResolver) {
    let Some(snapshot) = config.snapshot() else {
        return;
    };
    let mut sections: Vec<_> = snapshot.sections().collect();
    sections.sort_by(|a, b| a.0.cmp(b.0));
    for (name, section) in sections {
        println!("{name}:");
        let mut keys: Vec<_> = section.iter().collect();
        keys.sort_by(|a, b| a.0.cmp(b.0));
        for (k, v) in keys {
            println!("  {k}: {v}");
        }
    }
}

fn prompt(label: &str) -> Result<String, AppError> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn run_demo(config: Arc<ConfigResolver>) -> Result<(), AppError> {
    let mut session = DemoSession::new(config);
    session.open();

    loop {
        let formatted = session.edit_phone(&prompt("phone")?).to_string();
        println!("  {formatted}");
        match session.request_code().await {
            Some(notice) if notice.is_error() => println!("! {notice}"),
            Some(notice) => {
                println!("{notice}");
                break;
            }
            None => {}
        }
    }

    while !session.state().is_verified() {
        if let Some(notice) = session.enter_code(&prompt("code")?).await {
            println!("{notice}");
        }
    }

    let details = IntakeForm {
        first_name: prompt("first name")?,
        last_name: prompt("last name")?,
        email: prompt("email")?,
        number: String::new(),
        evaluation_type: prompt("evaluation type")?,
    };
    println!("{}", session.submit(details).await);
    Ok(())
}
