use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use time::{
    format_description::{self, FormatItem},
    OffsetDateTime, UtcOffset,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{format, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
    FmtSubscriber,
};

/// Send the logs up to `level` to stderr, one `HH:MM:SS LEVEL message` line each.
///
/// stdout is kept for the prompts and the report.
pub fn init_logging(level: Level) -> Result<()> {
    let offset = UtcOffset::current_local_offset()
        .into_diagnostic()
        .wrap_err("Could not get current local time offset")?;

    let subscriber = FmtSubscriber::builder()
        .event_format(LineFormat::new(offset)?)
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .into_diagnostic()
        .wrap_err("Setting default subscriber failed")
}

/// Log line layout: local wall-clock time, level, then the event fields.
/// Spans are not shown, the tool never opens any.
struct LineFormat {
    offset: UtcOffset,
    clock: Vec<FormatItem<'static>>,
}

impl LineFormat {
    fn new(offset: UtcOffset) -> Result<Self> {
        let clock = format_description::parse("[hour]:[minute]:[second]").into_diagnostic()?;
        Ok(Self { offset, clock })
    }
}

/// Level right-aligned on 5 columns, then colored
fn colored(level: Level) -> String {
    let text = format!("{level:>5}");
    match level {
        Level::ERROR => text.red().to_string(),
        Level::WARN => text.yellow().to_string(),
        Level::INFO => text.green().to_string(),
        _ => text.dimmed().to_string(),
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let level = *event.metadata().level();
        let now = OffsetDateTime::now_utc()
            .to_offset(self.offset)
            .time()
            .format(&self.clock)
            .map_err(|_| std::fmt::Error)?;

        if writer.has_ansi_escapes() {
            write!(writer, "{} {} ", now.dimmed(), colored(level))?;
        } else {
            write!(writer, "{now} {level:>5} ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
