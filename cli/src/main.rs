//! CLI entrypoint for orderbot
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use orderbot_application::{ConversationLogger, ProcessTurnUseCase};
use orderbot_domain::{Activity, ConversationRef};
use orderbot_infrastructure::{
    ConfigLoader, JsonlConversationLogger, StoreBackend, build_classifier, build_store,
    load_welcome_card,
};
use orderbot_presentation::{ChatRepl, Cli, ConsoleSender};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    // Keep the guard alive so buffered file logs are flushed on exit
    let (file_layer, _log_guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "orderbot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    info!("Starting orderbot");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate()?;

    // === Dependency Injection ===
    let classifier = build_classifier(&config.nlu)?;
    let store = build_store(&config.store)?;
    let sender = Arc::new(ConsoleSender::new());
    let welcome_card = load_welcome_card(config.welcome.card.as_deref())?;

    let mut use_case =
        ProcessTurnUseCase::new(classifier, store.clone(), sender, config.to_bot_config())
            .with_welcome_card(welcome_card);

    let transcript = cli.transcript.clone().or(config.logging.transcript.clone());
    if let Some(path) = transcript {
        match JsonlConversationLogger::new(&path) {
            Some(logger) => {
                info!("Writing transcript to {}", logger.path().display());
                let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
                use_case = use_case.with_conversation_logger(logger);
            }
            None => warn!("Transcript disabled: could not open {}", path.display()),
        }
    }

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(
            use_case,
            store,
            config.bot.id.as_str(),
            cli.user.as_str(),
            cli.conversation.as_str(),
        );
        repl.run().await?;
        return Ok(());
    }

    // Single utterance mode - utterance is required
    let utterance = match cli.utterance {
        Some(u) => u,
        None => bail!("An utterance is required. Use --chat for interactive mode."),
    };

    if config.store.parse_backend()? == StoreBackend::Memory {
        info!("Memory store in single-utterance mode: state is not kept between runs");
    }

    let conversation = ConversationRef::new(cli.conversation.as_str(), cli.user.as_str());
    let cancel = CancellationToken::new();
    let turn = use_case.execute(Activity::message(conversation, utterance), &cancel);
    tokio::pin!(turn);

    let report = loop {
        tokio::select! {
            result = &mut turn => break result?,
            _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => cancel.cancel(),
        }
    };
    info!(
        "Turn done: intent {:?}, status {:?}, sequence {:?}",
        report.intent, report.dialog_status, report.sequence_state
    );

    Ok(())
}
