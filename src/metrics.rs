//! Statement metrics and tracing spans.
//!
//! With the `metrics` feature, every executed statement is counted and timed through
//! OpenTelemetry instruments exported into a Prometheus registry. With the `tracing`
//! feature, compilation and execution run inside spans.

#[cfg(feature = "metrics")]
pub use self::prometheus_metrics::{QuarryMetrics, METRICS};

#[cfg(feature = "metrics")]
mod prometheus_metrics {
    use once_cell::sync::Lazy;
    use opentelemetry::metrics::{Counter, Histogram, MeterProvider};
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<QuarryMetrics> = Lazy::new(QuarryMetrics::init);

    pub struct QuarryMetrics {
        pub registry: Registry,
        pub statements_total: Counter<u64>,
        pub statement_duration: Histogram<f64>,
        pub statement_errors_total: Counter<u64>,
        _provider: SdkMeterProvider,
    }

    impl QuarryMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let mut builder = SdkMeterProvider::builder();
            match opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
            {
                Ok(exporter) => builder = builder.with_reader(exporter),
                Err(e) => log::warn!("prometheus exporter unavailable, statement metrics will not be exported: {e}"),
            }
            let provider = builder.build();
            let meter = provider.meter("quarry");

            let statements_total = meter
                .u64_counter("quarry_statements_total")
                .with_description("Total statements executed")
                .build();

            let statement_duration = meter
                .f64_histogram("quarry_statement_duration_seconds")
                .with_description("Duration of statement execution")
                .build();

            let statement_errors_total = meter
                .u64_counter("quarry_statement_errors_total")
                .with_description("Statements that failed to execute")
                .build();

            Self {
                registry,
                statements_total,
                statement_duration,
                statement_errors_total,
                _provider: provider,
            }
        }

        pub fn record_statement(&self, elapsed: Duration) {
            self.statements_total.add(1, &[]);
            self.statement_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_statement_error(&self) {
            self.statement_errors_total.add(1, &[]);
        }

        /// Current metrics in the Prometheus text exposition format
        pub fn gather(&self) -> Result<String, prometheus::Error> {
            TextEncoder::new().encode_to_string(&self.registry.gather())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_recorded_statements_are_exported() {
            let metrics = QuarryMetrics::init();
            metrics.record_statement(Duration::from_millis(3));
            metrics.record_statement_error();
            let text = metrics.gather().unwrap();
            assert!(text.contains("quarry_statements_total"));
            assert!(text.contains("quarry_statement_errors_total"));
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    /// Span around building one statement for an entity
    pub fn compile_statement_span(kind: &str, entity: &str) -> Span {
        tracing::debug_span!("quarry.compile", kind = kind, entity = entity)
    }

    /// Span around sending one statement to the database
    pub fn execute_statement_span(sql: &str) -> Span {
        tracing::info_span!("quarry.execute", db.statement = sql)
    }
}
