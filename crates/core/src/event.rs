// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-CORE - TELEMETRY SINK
//
// An optional operational-telemetry callback. Never affects correctness.
// Defaults to plain println!/eprintln! — this codebase doesn't pull in a
// logging crate anywhere it's actually exercised, so neither do we.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::sync::Arc;

#[derive(Clone)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

pub type EventSink = Arc<dyn Fn(Severity, &str) + Send + Sync>;

pub fn default_sink() -> EventSink {
    Arc::new(|severity, msg| match severity {
        Severity::Info => println!("{msg}"),
        Severity::Warn => eprintln!("⚠️  {msg}"),
        Severity::Error => eprintln!("❌ {msg}"),
    })
}

pub(crate) fn emit(sink: &EventSink, severity: Severity, msg: impl AsRef<str>) {
    sink(severity, msg.as_ref());
}
