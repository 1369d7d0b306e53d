use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

const RESPONSE_TIME_WINDOW: usize = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub requests_total: u64,
    pub requests_successful: u64,
    pub requests_failed: u64,
    pub contract_reads: u64,
    pub contract_read_errors: u64,
    pub token_info_cache_hits: u64,
    pub writes_submitted: u64,
    pub writes_confirmed: u64,
    pub writes_failed: u64,
    pub writes_rejected_busy: u64,
    pub response_time_avg_ms: f64,
    pub uptime_seconds: f64,
}

#[derive(Debug)]
pub struct MonitoringManager {
    metrics: Arc<RwLock<DashboardMetrics>>,
    start_time: DateTime<Utc>,
    response_times: Arc<RwLock<VecDeque<f64>>>,
}

impl Default for MonitoringManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitoringManager {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(DashboardMetrics::default())),
            start_time: Utc::now(),
            response_times: Arc::new(RwLock::new(VecDeque::with_capacity(RESPONSE_TIME_WINDOW))),
        }
    }

    pub async fn increment_metric(&self, metric_name: &str) {
        let mut metrics = self.metrics.write().await;

        match metric_name {
            "requests_total" => metrics.requests_total += 1,
            "requests_successful" => metrics.requests_successful += 1,
            "requests_failed" => metrics.requests_failed += 1,
            "contract_reads" => metrics.contract_reads += 1,
            "contract_read_errors" => metrics.contract_read_errors += 1,
            "token_info_cache_hits" => metrics.token_info_cache_hits += 1,
            "writes_submitted" => metrics.writes_submitted += 1,
            "writes_confirmed" => metrics.writes_confirmed += 1,
            "writes_failed" => metrics.writes_failed += 1,
            "writes_rejected_busy" => metrics.writes_rejected_busy += 1,
            _ => tracing::warn!("Unknown metric: {metric_name}"),
        }
    }

    pub async fn record_response_time(&self, response_time_ms: f64) {
        let mut response_times = self.response_times.write().await;
        if response_times.len() == RESPONSE_TIME_WINDOW {
            response_times.pop_front();
        }
        response_times.push_back(response_time_ms);

        let mut metrics = self.metrics.write().await;
        metrics.response_time_avg_ms = response_times.iter().sum::<f64>() / response_times.len() as f64;
    }

    pub async fn get_metrics(&self) -> DashboardMetrics {
        let mut metrics = self.metrics.read().await.clone();
        metrics.uptime_seconds = (Utc::now() - self.start_time).num_milliseconds() as f64 / 1000.0;
        metrics
    }

    /// Prometheus text exposition of the current counters.
    pub async fn render_prometheus(&self) -> String {
        let m = self.get_metrics().await;
        let counters: [(&str, &str, u64); 10] = [
            ("requests_total", "Total number of HTTP requests", m.requests_total),
            ("requests_successful_total", "HTTP requests answered with 2xx/3xx", m.requests_successful),
            ("requests_failed_total", "HTTP requests answered with an error", m.requests_failed),
            ("contract_reads_total", "Contract view calls issued", m.contract_reads),
            ("contract_read_errors_total", "Contract view calls that failed", m.contract_read_errors),
            ("token_info_cache_hits_total", "Token info served from cache", m.token_info_cache_hits),
            ("writes_submitted_total", "Write transactions accepted by the signer", m.writes_submitted),
            ("writes_confirmed_total", "Write transactions mined successfully", m.writes_confirmed),
            ("writes_failed_total", "Write transactions that failed or reverted", m.writes_failed),
            ("writes_rejected_busy_total", "Writes rejected while another was in flight", m.writes_rejected_busy),
        ];

        let mut out = String::new();
        for (name, help, value) in counters {
            out.push_str(&format!(
                "# HELP yeil_dashboard_{name} {help}\n# TYPE yeil_dashboard_{name} counter\nyeil_dashboard_{name} {value}\n\n"
            ));
        }
        out.push_str(&format!(
            "# HELP yeil_dashboard_response_time_avg_ms Average response time in milliseconds\n# TYPE yeil_dashboard_response_time_avg_ms gauge\nyeil_dashboard_response_time_avg_ms {}\n\n",
            m.response_time_avg_ms
        ));
        out.push_str(&format!(
            "# HELP yeil_dashboard_uptime_seconds Process uptime\n# TYPE yeil_dashboard_uptime_seconds gauge\nyeil_dashboard_uptime_seconds {}\n",
            m.uptime_seconds
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counters_and_average() {
        let manager = MonitoringManager::new();
        manager.increment_metric("requests_total").await;
        manager.increment_metric("requests_total").await;
        manager.increment_metric("writes_failed").await;
        manager.increment_metric("no_such_metric").await;
        manager.record_response_time(10.0).await;
        manager.record_response_time(30.0).await;

        let metrics = manager.get_metrics().await;
        assert_eq!(metrics.requests_total, 2);
        assert_eq!(metrics.writes_failed, 1);
        assert_eq!(metrics.response_time_avg_ms, 20.0);
    }

    #[tokio::test]
    async fn test_prometheus_output() {
        let manager = MonitoringManager::new();
        manager.increment_metric("writes_confirmed").await;
        let text = manager.render_prometheus().await;
        assert!(text.contains("# TYPE yeil_dashboard_writes_confirmed_total counter"));
        assert!(text.contains("yeil_dashboard_writes_confirmed_total 1\n"));
        assert!(text.contains("yeil_dashboard_uptime_seconds"));
    }
}
