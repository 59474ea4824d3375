//! Helper functions shared across the UI layer.

use crate::util::validate_url_for_open;
use chrono::{DateTime, Utc};
use ratatui::layout::Rect;

use super::loop_runner::SPINNER_FRAMES;

const SPINNER: [char; SPINNER_FRAMES] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub(super) fn spinner(frame: usize) -> char {
    SPINNER[frame % SPINNER_FRAMES]
}

/// Rectangle of at most `width`x`height` centered in `area`.
pub(super) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Compact age of a publication date: "5m", "3h", "2d", or "Jan 02".
///
/// Feeds report RFC 2822 or RFC 3339 dates; anything else is shown verbatim.
pub(super) fn format_published(published: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(raw) = published.map(str::trim).filter(|p| !p.is_empty()) else {
        return String::new();
    };

    let parsed = DateTime::parse_from_rfc2822(raw).or_else(|_| DateTime::parse_from_rfc3339(raw));
    let Ok(dt) = parsed else {
        return raw.to_string();
    };

    let diff = now.timestamp() - dt.timestamp();
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }
    dt.format("%b %d").to_string()
}

/// Open an article link in the system browser.
///
/// Only http(s) links with a host are handed to the OS.
pub(super) fn open_link(link: &str) -> Result<(), String> {
    validate_url_for_open(link).map_err(|e| e.to_string())?;
    open::that(link).map_err(|e| {
        tracing::warn!(link = %link, error = %e, "Failed to open browser");
        format!("Failed to open browser: {e}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_published_rfc2822() {
        assert_eq!(
            format_published(Some("Sun, 10 Mar 2024 09:00:00 +0000"), now()),
            "3h"
        );
    }

    #[test]
    fn test_format_published_rfc3339_old_date() {
        assert_eq!(
            format_published(Some("2024-01-02T08:00:00Z"), now()),
            "Jan 02"
        );
    }

    #[test]
    fn test_format_published_unparseable_is_verbatim() {
        assert_eq!(format_published(Some("yesterday"), now()), "yesterday");
        assert_eq!(format_published(None, now()), "");
        assert_eq!(format_published(Some("  "), now()), "");
    }

    #[test]
    fn test_centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = centered_rect(area, 60, 10);
        assert_eq!(rect, Rect::new(10, 7, 60, 10));

        let small = centered_rect(Rect::new(0, 0, 30, 8), 60, 10);
        assert!(small.width <= 26 && small.height <= 6);
    }

    #[test]
    fn test_open_link_rejects_non_http() {
        assert!(open_link("javascript:alert(1)").is_err());
        assert!(open_link("file:///etc/passwd").is_err());
    }
}
