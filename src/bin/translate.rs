//! One-shot translation from the command line, through the same gateway the server uses
//!
//! Usage:
//!   cargo run --bin translate -- es "Hello World"
//!   cargo run --bin translate -- --source fr de "Bonjour le monde"
//!   cargo run --bin translate -- --languages
//!
//! Reads the same environment variables as the server (TRANSLATION_API_URL,
//! TRANSLATION_API_KEY, TRANSLATION_FALLBACK_URL, TRANSLATION_TIMEOUT_SECS).
//! Translation is always enabled here, regardless of TRANSLATION_ENABLED.

use anyhow::{bail, Result};
use blog_translate::config::Config;
use blog_translate::i18n::Language;
use blog_translate::translation::{Translate, TranslationGateway};
use tracing::warn;

fn print_usage() {
    println!(
        r#"Usage: translate [--source <code>] <target> <text...>
       translate --languages

Options:
  --source <code>   Source language (default: en)
  --languages       Print supported languages and exit
  -h, --help        Show this message"#
    );
}

struct Args {
    source: String,
    target: String,
    text: String,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut source = "en".to_string();
    let mut positional = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--source" | "-s" => match iter.next() {
                Some(code) => source = code.clone(),
                None => bail!("--source needs a language code"),
            },
            _ => positional.push(arg.clone()),
        }
    }

    if positional.len() < 2 {
        bail!("Expected a target language and some text");
    }

    let target = positional.remove(0);
    Ok(Args {
        source,
        target,
        text: positional.join(" "),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blog_translate=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let config = Config {
        translation_enabled: true,
        ..Config::from_env()?
    };
    let gateway = TranslationGateway::from_config(&config)?;

    if args.iter().any(|a| a == "--languages") {
        for (code, name) in gateway.discover_languages().await {
            let native = Language::from_code(&code)
                .map(|lang| lang.native_name())
                .unwrap_or_default();
            println!("{}\t{}\t{}", code, name, native);
        }
        return Ok(());
    }

    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    match Language::from_code(&args.target) {
        Ok(language) => eprintln!(
            "Translating into {} ({})",
            language.name(),
            language.native_name()
        ),
        Err(_) => warn!(
            "'{}' is not in the language selector; passing it through anyway",
            args.target
        ),
    }

    let translated = gateway.translate(&args.text, &args.source, &args.target).await;
    println!("{}", translated);

    Ok(())
}
