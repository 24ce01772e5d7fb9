use crate::feed::Feed;
use crate::tables::EntityKind;
use gtfs_model::{GtfsDate, Service};

/// Intersects the dates of `service` with the window `[start, end]`.
///
/// A service whose range lies entirely outside the window loses its weekly
/// pattern. Otherwise the range is clamped; the opposite bound already lies
/// inside the window, so clamping never empties it. Exceptions outside the
/// window are discarded.
pub fn clip_to_window(service: &mut Service, start: Option<GtfsDate>, end: Option<GtfsDate>) {
    let inside = |date: GtfsDate| {
        start.map_or(true, |start| date >= start) && end.map_or(true, |end| date <= end)
    };
    service.exceptions.retain(|date, _| inside(*date));

    let (Some(range_start), Some(range_end)) = (service.start_date, service.end_date) else {
        return;
    };
    let before = end.is_some_and(|end| range_start > end);
    let after = start.is_some_and(|start| range_end < start);
    if before || after {
        service.weekdays = 0;
        return;
    }
    if let Some(start) = start {
        service.start_date = Some(range_start.max(start));
    }
    if let Some(end) = end {
        service.end_date = Some(range_end.min(end));
    }
}

impl Feed {
    /// Clips every service to the configured date window, then removes the
    /// services left without an active date. Trips referencing a removed
    /// service are filtered when the trips table is read.
    pub(crate) fn apply_date_window(&mut self) {
        if !self.config.has_date_filter() {
            return;
        }
        let (start, end) = (self.config.start_date, self.config.end_date);
        for (_, service) in self.services.iter_mut() {
            clip_to_window(service, start, end);
        }

        let pruned = self.services.retain(|_, service| !service.is_empty());
        for service in pruned {
            tracing::debug!(service_id = %service.id, "pruning service without active dates");
            self.count_filtered(EntityKind::Calendar);
            self.exclusions.services.insert(service.id);
        }
    }
}
