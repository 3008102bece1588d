use super::error::PlanError;
use crate::config::PreviewSettings;

/// 結尾片段距離影片結束的秒數
pub const TRAILING_SNIPPET_OFFSET_SECS: f64 = 150.0;

/// 預覽中的一個片段；`ordinal` 從 1 開始連續編號，也是合併順序
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub ordinal: usize,
    pub start: f64,
    pub length: f64,
}

/// 計算要擷取的片段
///
/// 影片長度平均切成 `snippet_amount` 段，
/// `interval = duration / snippet_amount - start_time`，
/// 第 i 段起點為 `i * interval + start_time`，長度固定為 `snippet_length`。
/// `extra_snippet` 時在最後加入一段，起點為 `duration - 150`。
///
/// 不做夾值：會產生非遞增、負起點或起點落在影片結尾之後的參數直接回傳錯誤。
pub fn plan_segments(duration: f64, settings: &PreviewSettings) -> Result<Vec<Segment>, PlanError> {
    if settings.snippet_amount == 0 {
        return Err(PlanError::ZeroSnippetAmount);
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(PlanError::InvalidDuration(duration));
    }
    if !settings.snippet_length.is_finite() || settings.snippet_length <= 0.0 {
        return Err(PlanError::InvalidSnippetLength(settings.snippet_length));
    }

    let start_time = f64::from(settings.start_time);
    let interval = duration / settings.snippet_amount as f64 - start_time;
    if interval <= 0.0 {
        return Err(PlanError::NonPositiveInterval {
            start_time: settings.start_time,
            interval,
        });
    }

    let mut segments: Vec<Segment> = (1..=settings.snippet_amount)
        .map(|ordinal| Segment {
            ordinal,
            start: ordinal as f64 * interval + start_time,
            length: settings.snippet_length,
        })
        .collect();

    if let Some(segment) = segments.iter().find(|s| s.start >= duration) {
        return Err(PlanError::StartBeyondDuration {
            ordinal: segment.ordinal,
            start: segment.start,
            duration,
        });
    }

    if settings.extra_snippet {
        let start = duration - TRAILING_SNIPPET_OFFSET_SECS;
        if start < 0.0 {
            return Err(PlanError::NegativeTrailingStart { start });
        }
        segments.push(Segment {
            ordinal: settings.snippet_amount + 1,
            start,
            length: settings.snippet_length,
        });
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(start_time: u32, length: f64, amount: usize, extra: bool) -> PreviewSettings {
        PreviewSettings {
            start_time,
            snippet_length: length,
            snippet_amount: amount,
            resolution: 400,
            extra_snippet: extra,
        }
    }

    fn starts(segments: &[Segment]) -> Vec<f64> {
        segments.iter().map(|s| s.start).collect()
    }

    #[test]
    fn test_plan_even_spacing() {
        let segments = plan_segments(600.0, &settings(5, 3.0, 4, false)).unwrap();

        assert_eq!(starts(&segments), vec![150.0, 295.0, 440.0, 585.0]);
        assert!(segments.iter().all(|s| (s.length - 3.0).abs() < f64::EPSILON));
        let ordinals: Vec<usize> = segments.iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_plan_with_trailing_snippet() {
        let segments = plan_segments(600.0, &settings(5, 3.0, 4, true)).unwrap();

        assert_eq!(segments.len(), 5);
        assert_eq!(
            segments[4],
            Segment {
                ordinal: 5,
                start: 450.0,
                length: 3.0
            }
        );
        assert_eq!(starts(&segments[..4]), vec![150.0, 295.0, 440.0, 585.0]);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let s = settings(10, 0.4, 20, true);
        let first = plan_segments(3600.0, &s).unwrap();
        let second = plan_segments(3600.0, &s).unwrap();
        assert_eq!(first, second);

        for (index, segment) in first.iter().enumerate() {
            assert_eq!(segment.ordinal, index + 1);
        }
    }

    #[test]
    fn test_plan_rejects_start_at_end_of_video() {
        // 起始偏移為 0 時最後一段正好落在影片結尾
        let err = plan_segments(100.0, &settings(0, 1.0, 4, false)).unwrap_err();
        assert_eq!(
            err,
            PlanError::StartBeyondDuration {
                ordinal: 4,
                start: 100.0,
                duration: 100.0
            }
        );

        // 單一片段的起點恆等於影片長度
        assert!(matches!(
            plan_segments(600.0, &settings(5, 1.0, 1, false)),
            Err(PlanError::StartBeyondDuration { ordinal: 1, .. })
        ));
    }

    #[test]
    fn test_plan_rejects_large_start_time() {
        let err = plan_segments(100.0, &settings(25, 1.0, 4, false)).unwrap_err();
        assert!(matches!(err, PlanError::NonPositiveInterval { start_time: 25, .. }));
    }

    #[test]
    fn test_plan_rejects_short_video_trailing() {
        let err = plan_segments(120.0, &settings(5, 1.0, 4, true)).unwrap_err();
        assert!(matches!(err, PlanError::NegativeTrailingStart { .. }));

        // 不加結尾片段時同一部影片可以正常規劃
        assert_eq!(plan_segments(120.0, &settings(5, 1.0, 4, false)).unwrap().len(), 4);
    }

    #[test]
    fn test_plan_rejects_invalid_inputs() {
        assert_eq!(
            plan_segments(600.0, &settings(5, 3.0, 0, false)),
            Err(PlanError::ZeroSnippetAmount)
        );
        assert!(matches!(
            plan_segments(0.0, &settings(5, 3.0, 4, false)),
            Err(PlanError::InvalidDuration(_))
        ));
        assert!(matches!(
            plan_segments(f64::NAN, &settings(5, 3.0, 4, false)),
            Err(PlanError::InvalidDuration(_))
        ));
        assert!(matches!(
            plan_segments(600.0, &settings(5, 0.0, 4, false)),
            Err(PlanError::InvalidSnippetLength(_))
        ));
    }

    #[test]
    fn test_trailing_exactly_at_offset() {
        let segments = plan_segments(150.0, &settings(5, 1.0, 2, true)).unwrap();
        assert_eq!(starts(&segments), vec![75.0, 145.0, 0.0]);
    }
}
