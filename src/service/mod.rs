/// Counters and histograms recorded around the HTTP handlers.
pub mod instrumentation;

pub mod videos;
