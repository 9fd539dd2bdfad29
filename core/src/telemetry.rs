use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    pub registry: Registry,
    pub fetch_total: IntCounter,
    pub fetch_failures_total: IntCounterVec,
    pub records_emitted_total: IntCounterVec,
    pub records_rejected_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let fetch_total =
            IntCounter::new("punch_fetch_total", "Antall hentinger av punch-analysis")
                .expect("punch_fetch_total");
        let fetch_failures_total = IntCounterVec::new(
            Opts::new("punch_fetch_failures_total", "Mislykkede hentinger per feiltype"),
            &["kind"],
        )
        .expect("punch_fetch_failures_total");
        let records_emitted_total = IntCounterVec::new(
            Opts::new("punch_records_emitted_total", "Poster sendt ut fra skjemaet"),
            &["mode"],
        )
        .expect("punch_records_emitted_total");
        let records_rejected_total = IntCounter::new(
            "punch_records_rejected_total",
            "Poster avvist ved validering av hentede data",
        )
        .expect("punch_records_rejected_total");

        registry
            .register(Box::new(fetch_total.clone()))
            .expect("registrere fetch_total");
        registry
            .register(Box::new(fetch_failures_total.clone()))
            .expect("registrere fetch_failures_total");
        registry
            .register(Box::new(records_emitted_total.clone()))
            .expect("registrere records_emitted_total");
        registry
            .register(Box::new(records_rejected_total.clone()))
            .expect("registrere records_rejected_total");

        Self {
            registry,
            fetch_total,
            fetch_failures_total,
            records_emitted_total,
            records_rejected_total,
        }
    }

    /// Prometheus tekstformat.
    pub fn gather_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            log::warn!("klarte ikke å kode metrikker: {e}");
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

pub static METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

pub fn fetch_started() {
    METRICS.fetch_total.inc();
}

pub fn fetch_failed(kind: &str) {
    METRICS.fetch_failures_total.with_label_values(&[kind]).inc();
}

pub fn records_emitted(mode: &str, n: usize) {
    if n > 0 {
        METRICS.records_emitted_total.with_label_values(&[mode]).inc_by(n as u64);
    }
}

pub fn records_rejected(n: usize) {
    if n > 0 {
        METRICS.records_rejected_total.inc_by(n as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_registry_counts() {
        let m = Metrics::new();
        m.fetch_failures_total.with_label_values(&["unauthorized"]).inc();
        m.records_emitted_total.with_label_values(&["combo"]).inc_by(3);
        let text = m.gather_text();
        assert!(text.contains("punch_fetch_failures_total{kind=\"unauthorized\"} 1"));
        assert!(text.contains("punch_records_emitted_total{mode=\"combo\"} 3"));
    }
}
