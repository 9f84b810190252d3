//! Line formatters for the text and compact log formats.

use chrono::{DateTime, Local};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// Output format: `YYYY-MM-DD HH:MM:SS.mmm | LEVEL | target | message`
///
/// ```text
/// 2026-01-15 10:30:45.120 | INFO  | hetu_cli::chain::pipeline | Broadcast transaction hash=0x12..
/// 2026-01-15 10:30:46.004 | DEBUG | hetu_cli::chain | JSON-RPC request method="eth_getTransactionReceipt"
/// ```
pub struct HetuFormatter;

/// Output format: `LEVEL module: message`, where module is the last path
/// segment of the event target.
pub struct CompactFormatter;

impl<S, N> FormatEvent<S, N> for HetuFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        writer.write_str(&text_prefix(Local::now(), *meta.level(), meta.target()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

impl<S, N> FormatEvent<S, N> for CompactFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        writer.write_str(&compact_prefix(*meta.level(), meta.target()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn text_prefix(now: DateTime<Local>, level: Level, target: &str) -> String {
    format!(
        "{} | {:<5} | {} | ",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level.as_str(),
        target
    )
}

fn compact_prefix(level: Level, target: &str) -> String {
    let module = target.rsplit("::").next().unwrap_or(target);
    format!("{} {}: ", level.as_str(), module)
}
