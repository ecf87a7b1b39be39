//! Day-by-day plan extraction from the planner narrative

use tracing::{debug, warn};

use crate::model::{Activity, ActivityType, Day, Period};
use crate::text::{classify, segment_days, segment_periods, strip_bullet};

/// Parse `## Day n` / `### Period:` structure into days.
///
/// A day heading with no usable activity lines gets placeholder activities.
/// When the narrative has no day headings at all, `trip_length` placeholder
/// days are synthesized, at most `max_placeholder_days` of them.
pub fn extract_days(itinerary: &str, trip_length: u32, max_placeholder_days: u32) -> Vec<Day> {
    let segments = segment_days(itinerary);

    if segments.is_empty() {
        let count = trip_length.min(max_placeholder_days);
        if count < trip_length {
            warn!(trip_length, count, "trip length over the placeholder cap");
        }
        debug!(count, "no day headings found, synthesizing placeholder days");
        return placeholder_days(count);
    }

    segments
        .iter()
        .map(|segment| {
            let mut activities = Vec::new();
            for period in segment_periods(&segment.body) {
                activities.extend(extract_period_activities(period.period, &period.body));
            }
            if activities.is_empty() {
                activities = placeholder_activities(segment.number);
            }
            Day {
                number: segment.number,
                activities,
            }
        })
        .collect()
}

/// Classified activities for one period body
pub fn extract_period_activities(period: Period, body: &str) -> Vec<Activity> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        // Only bulleted or bolded lines carry activities; the rest is prose
        .filter(|line| line.contains("**") || line.contains('-'))
        .filter_map(|line| {
            // Inline dashes separate a label from its detail
            let description = strip_bullet(line).replace("- ", "").trim().to_string();
            if description.is_empty() {
                return None;
            }
            let class = classify(&description);
            Some(Activity {
                time: period,
                kind: class.kind,
                description: class.apply_prefix(&description),
            })
        })
        .collect()
}

/// Morning, afternoon and evening stand-ins for day `number`
pub fn placeholder_activities(number: u32) -> Vec<Activity> {
    Period::ALL
        .iter()
        .map(|period| Activity {
            time: *period,
            kind: ActivityType::Activity,
            description: format!("Day {} {} activities", number, period.as_str().to_lowercase()),
        })
        .collect()
}

/// `count` days numbered from 1, each with placeholder activities
pub fn placeholder_days(count: u32) -> Vec<Day> {
    (1..=count)
        .map(|number| Day {
            number,
            activities: placeholder_activities(number),
        })
        .collect()
}
