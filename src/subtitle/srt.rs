// SRT subtitle parsing
use super::validate::{split_blocks, split_lines, validate_srt, TIMECODE_LINE};
use super::SubtitleEntry;
use crate::error::{Result, VoxpipeError};
use std::time::Duration;

/// Parse an SRT document into entries.
///
/// The document must pass [`validate_srt`](super::validate_srt); the first
/// issue is reported otherwise. Indices and timecodes written with
/// non-ASCII digits pass validation but cannot be converted to numbers, so
/// they are reported here as invalid.
pub fn parse_srt(text: &str) -> Result<Vec<SubtitleEntry>> {
    if let Some(issue) = validate_srt(text).into_iter().next() {
        return Err(VoxpipeError::InvalidSubtitle(issue.to_string()));
    }

    split_blocks(text)
        .into_iter()
        .enumerate()
        .map(|(i, block)| parse_block(block, i + 1))
        .collect()
}

fn parse_block(block: &str, number: usize) -> Result<SubtitleEntry> {
    let lines = split_lines(block);

    let index: usize = lines[0].trim().parse().map_err(|e| {
        VoxpipeError::InvalidSubtitle(format!("block {}: index out of range: {}", number, e))
    })?;

    let caps = TIMECODE_LINE.captures(lines[1].trim()).ok_or_else(|| {
        VoxpipeError::InvalidSubtitle(format!("block {}: malformed timecode line", number))
    })?;
    let timestamp = |i: usize| {
        parse_timestamp(&caps[i]).ok_or_else(|| {
            VoxpipeError::InvalidSubtitle(format!(
                "block {}: unreadable timestamp {:?}",
                number, &caps[i]
            ))
        })
    };
    let start = timestamp(1)?;
    let end = timestamp(2)?;

    let text = lines[2..]
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    Ok(SubtitleEntry {
        index,
        start,
        end,
        text,
    })
}

/// Parse a single `HH:MM:SS,mmm` timestamp.
///
/// Returns `None` for malformed input and for values too large for a
/// [`Duration`].
pub fn parse_timestamp(s: &str) -> Option<Duration> {
    let (hms, millis) = s.trim().split_once(',')?;
    let mut parts = hms.split(':');
    let (h, m, sec) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || millis.len() != 3 {
        return None;
    }

    let (h, m, sec): (u64, u64, u64) = (h.parse().ok()?, m.parse().ok()?, sec.parse().ok()?);
    let millis: u64 = millis.parse().ok()?;
    let total = h
        .checked_mul(3600)?
        .checked_add(m.checked_mul(60)?)?
        .checked_add(sec)?;
    Duration::from_secs(total).checked_add(Duration::from_millis(millis))
}

pub fn format_timestamp(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Describe structural drift between a source document and its translation.
///
/// Both documents are expected to carry the same indices and timecodes.
/// Returns one note per difference; empty when they line up.
pub fn compare_structure(source: &str, translated: &str) -> Vec<String> {
    let (source, translated) = match (parse_srt(source), parse_srt(translated)) {
        (Ok(s), Ok(t)) => (s, t),
        (Err(e), _) => return vec![format!("source not comparable: {}", e)],
        (_, Err(e)) => return vec![format!("translation not comparable: {}", e)],
    };

    let mut notes = Vec::new();
    if source.len() != translated.len() {
        notes.push(format!(
            "block count differs: source {}, translation {}",
            source.len(),
            translated.len()
        ));
    }

    for (src, dst) in source.iter().zip(&translated) {
        if src.index != dst.index {
            notes.push(format!(
                "index changed from {} to {}",
                src.index, dst.index
            ));
        }
        if src.start != dst.start || src.end != dst.end {
            notes.push(format!(
                "block {}: timecode changed from {} --> {} to {} --> {}",
                src.index,
                format_timestamp(src.start),
                format_timestamp(src.end),
                format_timestamp(dst.start),
                format_timestamp(dst.end)
            ));
        }
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "1\n00:00:01,000 --> 00:00:02,500\n你好。\n\n2\n00:00:03,000 --> 00:01:04,010\n第二行\n第三行\n";

    #[test]
    fn test_parse_srt() {
        let entries = parse_srt(SOURCE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].start, Duration::from_millis(1000));
        assert_eq!(entries[0].end, Duration::from_millis(2500));
        assert_eq!(entries[0].text, "你好。");
        assert_eq!(entries[1].end, Duration::from_millis(64_010));
        assert_eq!(entries[1].text, "第二行\n第三行");
    }

    #[test]
    fn test_parse_invalid_reports_issue() {
        let err = parse_srt("1\nnot a timecode\ntext").unwrap_err();
        assert!(matches!(err, VoxpipeError::InvalidSubtitle(ref m) if m.contains("block 1")));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(Duration::from_millis(1500)),
            "00:00:01,500"
        );
        assert_eq!(
            format_timestamp(Duration::from_secs(3661) + Duration::from_millis(123)),
            "01:01:01,123"
        );
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            parse_timestamp("01:01:01,123"),
            Some(Duration::from_secs(3661) + Duration::from_millis(123))
        );
        assert_eq!(parse_timestamp("00:00:01"), None);
        assert_eq!(parse_timestamp("00:00:01,5"), None);
        assert_eq!(parse_timestamp("aa:00:01,500"), None);
    }

    #[test]
    fn test_parse_timestamp_overflow() {
        assert_eq!(parse_timestamp("18446744073709551615:00:00,000"), None);
        assert_eq!(parse_timestamp("5124095576030432:00:00,000"), None);
        assert_eq!(parse_timestamp("00:18446744073709551615:00,000"), None);
        assert!(parse_timestamp("99:59:59,999").is_some());
    }

    #[test]
    fn test_parse_non_ascii_digits_is_an_error() {
        let full_width = "1\n\u{FF10}0:00:01,000 --> 00:00:02,000\nText\n";
        let err = parse_srt(full_width).unwrap_err();
        assert!(matches!(err, VoxpipeError::InvalidSubtitle(ref m) if m.contains("unreadable timestamp")));

        let arabic_index = "\u{0661}\n00:00:01,000 --> 00:00:02,000\nText\n";
        assert!(matches!(parse_srt(arabic_index), Err(VoxpipeError::InvalidSubtitle(_))));
    }

    #[test]
    fn test_parse_bare_carriage_returns() {
        let entries = parse_srt("1\r00:00:01,000 --> 00:00:02,000\rHello\rWorld").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].end, Duration::from_secs(2));
        assert_eq!(entries[0].text, "Hello\nWorld");
    }

    #[test]
    fn test_compare_structure_matching() {
        let translated = SOURCE.replace("你好。", "Hello.");
        assert!(compare_structure(SOURCE, &translated).is_empty());
    }

    #[test]
    fn test_compare_structure_drift() {
        let translated = "1\n00:00:01,000 --> 00:00:02,000\nHello.\n";
        let notes = compare_structure(SOURCE, translated);
        assert_eq!(notes.len(), 2);
        assert!(notes[0].contains("block count differs"));
        assert!(notes[1].contains("00:00:02,500"));
    }

    #[test]
    fn test_compare_structure_invalid_translation() {
        let notes = compare_structure(SOURCE, "```srt");
        assert_eq!(notes.len(), 1);
        assert!(notes[0].starts_with("translation not comparable"));
    }
}
