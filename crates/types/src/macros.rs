/// Wraps a wallet operation future with call, latency and error metrics.
#[macro_export]
macro_rules! wallet_operation_metrics {
    ($operation:expr, $body:expr) => {{
        metrics::counter!("wallet_operations_total", "operation" => $operation.to_string()).increment(1);
        let start = std::time::Instant::now();
        let result = ($body).await;
        let elapsed = start.elapsed().as_secs_f64();
        metrics::histogram!("wallet_operation_seconds", "operation" => $operation.to_string()).record(elapsed);
        if let Err(e) = &result {
            metrics::counter!(
                "wallet_operation_errors_total",
                "operation" => $operation.to_string(),
                "kind" => e.kind()
            )
            .increment(1);
        }
        result
    }};
}

#[macro_export]
macro_rules! confirmation_metrics {
    ($outcome:expr) => {{
        metrics::counter!("wallet_confirmations_total", "outcome" => $outcome).increment(1);
    }};
}
