use bizdash_core::PerformanceMetrics;

use crate::client::DailyMetricSeries;

/// The dashboard's metric buckets. Series are routed to a bucket by
/// substring containment on the upstream metric name, so
/// `SOMETHING_IMPRESSIONS_FOO` still counts as impressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricBucket {
    Impressions,
    Searches,
    Conversations,
    DirectionRequests,
    Bookings,
    WebsiteClicks,
    PhoneCalls,
}

impl MetricBucket {
    const ALL: [MetricBucket; 7] = [
        MetricBucket::Impressions,
        MetricBucket::Searches,
        MetricBucket::Conversations,
        MetricBucket::DirectionRequests,
        MetricBucket::Bookings,
        MetricBucket::WebsiteClicks,
        MetricBucket::PhoneCalls,
    ];

    fn pattern(&self) -> &'static str {
        match self {
            MetricBucket::Impressions => "IMPRESSIONS",
            MetricBucket::Searches => "SEARCHES",
            MetricBucket::Conversations => "CONVERSATIONS",
            MetricBucket::DirectionRequests => "DIRECTION",
            MetricBucket::Bookings => "BOOKINGS",
            MetricBucket::WebsiteClicks => "WEBSITE_CLICKS",
            MetricBucket::PhoneCalls => "CALL_CLICKS",
        }
    }

    /// First bucket whose pattern is contained in the metric name, if any.
    pub fn classify(metric_name: &str) -> Option<MetricBucket> {
        Self::ALL
            .iter()
            .copied()
            .find(|bucket| metric_name.contains(bucket.pattern()))
    }
}

/// Sum the daily series into the dashboard buckets. Values are upstream
/// strings; anything non-numeric contributes 0.
pub fn reduce_daily_metrics(series: &[DailyMetricSeries]) -> PerformanceMetrics {
    let mut totals = PerformanceMetrics::default();

    for s in series {
        let Some(bucket) = MetricBucket::classify(&s.metric) else {
            continue;
        };

        let sum: u64 = s
            .values
            .iter()
            .map(|v| v.parse::<u64>().unwrap_or(0))
            .sum();

        let slot = match bucket {
            MetricBucket::Impressions => &mut totals.impressions,
            MetricBucket::Searches => &mut totals.searches,
            MetricBucket::Conversations => &mut totals.conversations,
            MetricBucket::DirectionRequests => &mut totals.direction_requests,
            MetricBucket::Bookings => &mut totals.bookings,
            MetricBucket::WebsiteClicks => &mut totals.website_clicks,
            MetricBucket::PhoneCalls => &mut totals.phone_calls,
        };
        *slot += sum;
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(metric: &str, values: &[&str]) -> DailyMetricSeries {
        DailyMetricSeries {
            metric: metric.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn non_numeric_values_contribute_zero() {
        let reduced = reduce_daily_metrics(&[series("X_IMPRESSIONS_Y", &["10", "20", "abc"])]);
        assert_eq!(reduced.impressions, 30);
    }

    #[test]
    fn substring_match_tolerates_unknown_prefixes_and_suffixes() {
        let reduced =
            reduce_daily_metrics(&[series("SOMETHING_IMPRESSIONS_FOO", &["1", "2", "3"])]);
        assert_eq!(reduced.impressions, 6);
    }

    #[test]
    fn multiple_series_accumulate_into_one_bucket() {
        let reduced = reduce_daily_metrics(&[
            series("BUSINESS_IMPRESSIONS_DESKTOP_MAPS", &["5"]),
            series("BUSINESS_IMPRESSIONS_MOBILE_SEARCH", &["7"]),
        ]);
        assert_eq!(reduced.impressions, 12);
    }

    #[test]
    fn each_bucket_gets_its_own_series() {
        let reduced = reduce_daily_metrics(&[
            series("BUSINESS_CONVERSATIONS", &["4"]),
            series("BUSINESS_DIRECTION_REQUESTS", &["3"]),
            series("BUSINESS_BOOKINGS", &["2"]),
            series("WEBSITE_CLICKS", &["9"]),
            series("CALL_CLICKS", &["8"]),
        ]);
        assert_eq!(reduced.conversations, 4);
        assert_eq!(reduced.direction_requests, 3);
        assert_eq!(reduced.bookings, 2);
        assert_eq!(reduced.website_clicks, 9);
        assert_eq!(reduced.phone_calls, 8);
    }

    #[test]
    fn unknown_metric_names_are_ignored() {
        let reduced = reduce_daily_metrics(&[series("SOMETHING_ELSE", &["100"])]);
        assert_eq!(reduced, PerformanceMetrics::default());
    }
}
