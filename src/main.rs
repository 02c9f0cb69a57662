use std::process;

use inkpress::{
    RenderRequest, RenderService,
    application::error::AppError,
    config::{self, Command, OutputFormat, RenderArgs, Settings, SummaryArgs, ValidateArgs},
    domain::{
        summary::extract_summary,
        writeup::{detect_tools, validate_content},
    },
    infra::{
        error::InfraError,
        input::{read_document, write_stdout},
        telemetry,
    },
    render_service,
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(error = %report.joined(), source = report.source, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %report.joined(), source = report.source, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    match cli_args.command {
        Command::Render(args) => run_render(&settings, args),
        Command::Validate(args) => run_validate(args),
        Command::Summary(args) => run_summary(&settings, args),
    }
}

fn run_render(settings: &Settings, args: RenderArgs) -> Result<(), AppError> {
    let content = read_document(&args.input)?;

    if let Err(violations) = validate_content(&content) {
        for violation in violations.errors() {
            warn!(
                target = "inkpress::cli",
                field = violation.field(),
                "{violation}"
            );
        }
    }

    let request = RenderRequest::new(content).with_base_url(settings.render.base_url.as_str());
    let result = render_service().render(&request);

    info!(
        target = "inkpress::cli",
        input = %args.input.display(),
        headings = result.toc.len(),
        words = result.word_count,
        read_time_minutes = result.read_time_minutes,
        languages = ?result.languages_used,
        "rendered writeup"
    );

    match args.format {
        OutputFormat::Html => write_stdout(&result.html)?,
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result).map_err(InfraError::from)?;
            write_stdout(&json)?;
        }
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let content = read_document(&args.input)?;
    validate_content(&content)?;

    let tools = detect_tools(&content);
    info!(
        target = "inkpress::cli",
        input = %args.input.display(),
        tools = tools.len(),
        "writeup passed validation"
    );

    let line = if tools.is_empty() {
        format!("{}: ok", args.input.display())
    } else {
        format!("{}: ok (tools: {})", args.input.display(), tools.join(", "))
    };
    write_stdout(&line)?;
    Ok(())
}

fn run_summary(settings: &Settings, args: SummaryArgs) -> Result<(), AppError> {
    let content = read_document(&args.input)?;
    let summary = extract_summary(&content, settings.render.summary_max_length.get());
    write_stdout(&summary)?;
    Ok(())
}
