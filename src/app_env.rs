/// URL for accessing the PostgreSQL database (should contain a database name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Address and port the HTTP server binds to. Defaults to [DEFAULT_LISTEN_ADDRESS]
pub const LISTEN_ADDRESS: &str = "LISTEN_ADDRESS";
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8080";
/// Log level configuration for the application, in [EnvFilter](tracing_subscriber::EnvFilter)
/// directive syntax (e.g. "info,todo_tracker=debug")
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs traces to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";
