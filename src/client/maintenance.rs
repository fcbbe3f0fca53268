//! Daily maintenance window.
//!
//! The service is unavailable every day from 04:00 to 07:00 service time
//! (UTC+09:00). [`MaintenanceGuard`] fails calls inside that window before
//! they reach the retry layer or the network.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use super::error::ClientError;
use super::pipeline::Dispatch;
use super::request::{RawResponse, RequestSpec};
use super::retry::RetryBudget;
use crate::region::service_timezone;

/// Window start, in hours after service-local midnight.
const WINDOW_START_HOUR: i64 = 4;
/// Window end (exclusive), in hours after service-local midnight.
const WINDOW_END_HOUR: i64 = 7;

/// Source of the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    #[must_use]
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Pins the clock to a service-local date and time; out-of-range fields
    /// fall back to the Unix epoch in service time.
    #[must_use]
    pub fn at_service_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let naive = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .unwrap_or_default();
        Self(service_local(naive).with_timezone(&Utc))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// One day's maintenance window, `[start, end)` in service time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaintenanceWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl MaintenanceWindow {
    /// The window on a service-local date.
    #[must_use]
    pub fn on(date: NaiveDate) -> Self {
        let midnight = date.and_time(NaiveTime::MIN);
        Self {
            start: service_local(midnight + TimeDelta::hours(WINDOW_START_HOUR)),
            end: service_local(midnight + TimeDelta::hours(WINDOW_END_HOUR)),
        }
    }

    /// The window on the service-local day of `now`.
    #[must_use]
    pub fn today(now: DateTime<Utc>) -> Self {
        Self::on(now.with_timezone(&service_timezone()).date_naive())
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for MaintenanceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Today's maintenance window according to `clock`.
#[must_use]
pub fn maintenance_period(clock: &dyn Clock) -> MaintenanceWindow {
    MaintenanceWindow::today(clock.now())
}

fn service_local(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    let timezone = service_timezone();
    let utc = naive - TimeDelta::seconds(i64::from(timezone.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, timezone)
}

/// Outermost layer of the pipeline.
#[derive(Debug)]
pub struct MaintenanceGuard<D> {
    inner: D,
    clock: Arc<dyn Clock>,
}

impl<D> MaintenanceGuard<D> {
    #[must_use]
    pub fn new(inner: D, clock: Arc<dyn Clock>) -> Self {
        Self { inner, clock }
    }

    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    #[must_use]
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: Dispatch> Dispatch for MaintenanceGuard<D> {
    #[instrument(level = "debug", skip_all)]
    async fn dispatch(
        &self,
        request: &RequestSpec,
        budget: &mut RetryBudget,
    ) -> Result<RawResponse, ClientError> {
        let now = self.clock.now();
        let window = MaintenanceWindow::today(now);
        if window.contains(now) {
            debug!(%window, "inside maintenance window");
            return Err(ClientError::RoutineMaintenance(window));
        }
        self.inner.dispatch(request, budget).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds_in_service_time() {
        let window = MaintenanceWindow::today(FixedClock::at_service_time(2024, 5, 1, 12, 0).now());
        assert_eq!(window.start.to_rfc3339(), "2024-05-01T04:00:00+09:00");
        assert_eq!(window.end.to_rfc3339(), "2024-05-01T07:00:00+09:00");
        assert_eq!(window.to_string(), "04:00 to 07:00");
    }

    #[test]
    fn test_window_is_half_open() {
        let window = MaintenanceWindow::on(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default());
        let at = |hour, minute| FixedClock::at_service_time(2024, 5, 1, hour, minute).now();
        assert!(!window.contains(at(3, 59)));
        assert!(window.contains(at(4, 0)));
        assert!(window.contains(at(6, 59)));
        assert!(!window.contains(at(7, 0)));
    }

    #[test]
    fn test_service_day_differs_from_utc_day() {
        // 20:30 UTC on April 30 is 05:30 on May 1 in service time.
        let now = DateTime::parse_from_rfc3339("2024-04-30T20:30:00Z")
            .map(|time| time.with_timezone(&Utc))
            .unwrap_or_default();
        let window = MaintenanceWindow::today(now);
        assert!(window.contains(now));
        assert_eq!(
            window.start.date_naive(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default()
        );
    }

    #[test]
    fn test_routine_maintenance_message() {
        let window = maintenance_period(&FixedClock::at_service_time(2024, 5, 1, 5, 0));
        assert_eq!(
            ClientError::RoutineMaintenance(window).to_string(),
            "Maintenance from 04:00 to 07:00."
        );
    }
}
