//! Transcript rendering helpers.

use super::types::Segment;

/// Formats seconds as an SRT timestamp, `HH:MM:SS,mmm`.
pub(crate) fn format_timestamp(value: f64) -> String {
    let total_ms = (value * 1000.0).round().max(0.0) as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Renders segments as SRT cues, skipping blank segments.
pub(crate) fn segments_to_srt(segments: &[Segment]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut index = 1;
    for segment in segments {
        let text = segment.text.trim();
        if text.is_empty() {
            continue;
        }
        let start = segment.start.max(0.0);
        let end = segment.end.max(start);
        lines.push(index.to_string());
        lines.push(format!(
            "{} --> {}",
            format_timestamp(start),
            format_timestamp(end)
        ));
        lines.push(text.to_string());
        lines.push(String::new());
        index += 1;
    }
    lines.join("\n").trim().to_string()
}

/// Builds the single synthetic segment used when the engine returns text but
/// no timing information.
pub(crate) fn fallback_segment(text: &str) -> Segment {
    Segment {
        start: 0.0,
        end: (text.len() as f64 * 0.03).max(0.1),
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(1.5), "00:00:01,500");
        assert_eq!(format_timestamp(3661.042), "01:01:01,042");
    }

    #[test]
    fn test_format_timestamp_clamps_negative() {
        assert_eq!(format_timestamp(-3.0), "00:00:00,000");
    }

    #[test]
    fn test_segments_to_srt() {
        let segments = vec![
            Segment {
                start: 0.0,
                end: 2.5,
                text: " hello ".to_string(),
            },
            Segment {
                start: 2.5,
                end: 4.0,
                text: "world".to_string(),
            },
        ];
        let srt = segments_to_srt(&segments);
        let expected = "1\n00:00:00,000 --> 00:00:02,500\nhello\n\n2\n00:00:02,500 --> 00:00:04,000\nworld";
        assert_eq!(srt, expected);
    }

    #[test]
    fn test_segments_to_srt_skips_blank() {
        let segments = vec![
            Segment {
                start: 0.0,
                end: 1.0,
                text: "  ".to_string(),
            },
            Segment {
                start: 1.0,
                end: 2.0,
                text: "kept".to_string(),
            },
        ];
        let srt = segments_to_srt(&segments);
        assert!(srt.starts_with("1\n"));
        assert!(srt.contains("kept"));
        assert!(!srt.contains("2\n00:"));
    }

    #[test]
    fn test_segments_to_srt_end_never_before_start() {
        let segments = vec![Segment {
            start: 5.0,
            end: 1.0,
            text: "x".to_string(),
        }];
        let srt = segments_to_srt(&segments);
        assert!(srt.contains("00:00:05,000 --> 00:00:05,000"));
    }

    #[test]
    fn test_fallback_segment() {
        let segment = fallback_segment("hi");
        assert_eq!(segment.start, 0.0);
        assert_eq!(segment.end, 0.1);

        let long = fallback_segment(&"a".repeat(100));
        assert!((long.end - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_segments_render_empty() {
        assert_eq!(segments_to_srt(&[]), "");
    }
}
