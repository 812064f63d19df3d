//! Integration tests for voxpipe
//!
//! These exercise the pure components and the file-level pipelines without
//! API keys or network access.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use voxpipe::config::Config;
use voxpipe::subtitle::{compare_structure, is_valid_srt, parse_srt, validate_srt, IssueKind};
use voxpipe::text::{normalize, split_text, split_text_with, RuleSplitter, SentenceRules};
use voxpipe::translate::{translate_file, Translation, Translator};
use voxpipe::tts::{narrate, AudioClip, SpeechSynthesizer};
use voxpipe::{Result, VoxpipeError};

// ============================================================================
// Segmenter
// ============================================================================

mod segmenter_tests {
    use super::*;

    const SCRIPT: &str = "Welcome back to   Onyx Shadowing English.\n\nThis is a tiny example. \
        We want to cut it smartly! Each chunk must stay under 60 characters. Ready?";

    #[test]
    fn test_script_chunks() {
        let chunks = split_text(SCRIPT, 60);
        assert_eq!(
            chunks,
            vec![
                "Welcome back to Onyx Shadowing English.",
                "This is a tiny example. We want to cut it smartly!",
                "Each chunk must stay under 60 characters. Ready?",
            ]
        );
    }

    #[test]
    fn test_chunks_cover_normalized_text() {
        for limit in [1, 10, 25, 60, 1500] {
            let chunks = split_text(SCRIPT, limit);
            assert_eq!(chunks.join(" "), normalize(SCRIPT), "limit {}", limit);
            for chunk in &chunks {
                assert!(!chunk.is_empty());
                assert_eq!(chunk.trim(), chunk);
            }
        }
    }

    #[test]
    fn test_large_limit_gives_single_chunk() {
        assert_eq!(split_text(SCRIPT, 1500), vec![normalize(SCRIPT)]);
    }

    #[test]
    fn test_closing_quote_normalized() {
        let chunks = split_text("He said “stop.”\n\n  Then he left.", 100);
        assert_eq!(chunks, vec!["He said “stop.” Then he left."]);
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        let splitter = RuleSplitter::new(SentenceRules::english());
        let chunks = split_text_with(&splitter, "Dr. Smith arrived. Mr. Lee left.", 20);
        assert_eq!(chunks, vec!["Dr. Smith arrived.", "Mr. Lee left."]);
    }

    #[test]
    fn test_cjk_rules() {
        let splitter = RuleSplitter::new(SentenceRules::cjk());
        let chunks = split_text_with(&splitter, "你好。今天天气很好！我们走吧？", 12);
        assert_eq!(chunks, vec!["你好。 今天天气很好！", "我们走吧？"]);
    }

    #[test]
    fn test_whitespace_only_input() {
        assert!(split_text(" \t\n ", 10).is_empty());
    }
}

// ============================================================================
// Validator and SRT parsing
// ============================================================================

mod srt_tests {
    use super::*;

    const VALID: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:02,500 --> 00:00:04,000\nWorld\n";

    #[test]
    fn test_valid_document() {
        assert!(is_valid_srt(VALID));
        assert!(validate_srt(VALID).is_empty());
        assert_eq!(parse_srt(VALID).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(!is_valid_srt(""));
        assert!(!is_valid_srt("Sure! Here is your translation:\n\n1\n00:00:01,000 --> 00:00:02,000\nHi"));
        assert!(!is_valid_srt("1\n00:00:01.000 --> 00:00:02.000\nHello"));
        assert!(!is_valid_srt("1\n00:00:01,000 --> 00:00:02,000"));
    }

    #[test]
    fn test_issue_locations() {
        let doc = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\nx\n00:00:03,000 --> 00:00:04,000\nBad";
        let issues = validate_srt(doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].block, 2);
        assert_eq!(issues[0].kind, IssueKind::BadIndex("x".to_string()));
        assert!(matches!(parse_srt(doc), Err(VoxpipeError::InvalidSubtitle(_))));
    }

    #[test]
    fn test_unicode_digits_validate_but_do_not_parse() {
        let doc = "\u{0661}\n\u{FF10}0:00:01,000 --> 00:00:02,000\nText";
        assert!(is_valid_srt(doc));
        assert!(matches!(parse_srt(doc), Err(VoxpipeError::InvalidSubtitle(_))));
    }

    #[test]
    fn test_structure_drift() {
        let shifted = VALID.replace("00:00:02,500", "00:00:02,600");
        let drift = compare_structure(VALID, &shifted);
        assert_eq!(drift.len(), 1);
        assert!(drift[0].contains("block 2"));
        assert!(compare_structure(VALID, VALID).is_empty());
    }
}

// ============================================================================
// Config
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|name| match name {
            "GEMINI_API_KEY" => Some("abc".to_string()),
            "VOXPIPE_MAX_CHARS" => Some("800".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key().unwrap(), "abc");
        assert_eq!(config.max_chars, 800);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_missing_key_fails_validation() {
        assert_err!(Config::default().validate());

        let mut config = Config::default();
        config.gemini_api_key = Some("abc".to_string());
        config.max_chars = 0;
        assert_ok!(config.validate());
    }
}

// ============================================================================
// Translation pipeline
// ============================================================================

mod translate_tests {
    use super::*;

    const SOURCE: &str = "1\n00:00:01,000 --> 00:00:02,000\n你好\n";

    /// Returns a canned response and records the requested language.
    struct CannedTranslator {
        response: String,
        languages: Mutex<Vec<String>>,
    }

    impl CannedTranslator {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                languages: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Translator for CannedTranslator {
        async fn translate_srt(&self, _document: &str, target_language: &str) -> Result<Translation> {
            self.languages.lock().unwrap().push(target_language.to_string());
            Ok(Translation::from_raw(self.response.clone()))
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn write_source(dir: &TempDir) -> std::path::PathBuf {
        let input = dir.path().join("lesson.srt");
        std::fs::write(&input, SOURCE).unwrap();
        input
    }

    #[tokio::test]
    async fn test_valid_translation_written() {
        let dir = TempDir::new().unwrap();
        let input = write_source(&dir);
        let translator =
            CannedTranslator::new("  1\n00:00:01,000 --> 00:00:02,000\nHello\n\n");

        let outcome = translate_file(&translator, &input, "Brazilian Portuguese", None)
            .await
            .unwrap();

        assert_eq!(
            outcome.output_path,
            dir.path().join("lesson.Brazilian_Portuguese.srt")
        );
        assert_eq!(
            std::fs::read_to_string(&outcome.output_path).unwrap(),
            "1\n00:00:01,000 --> 00:00:02,000\nHello"
        );
        assert_eq!(
            *translator.languages.lock().unwrap(),
            vec!["Brazilian Portuguese"]
        );
    }

    #[tokio::test]
    async fn test_explicit_output_gets_srt_extension() {
        let dir = TempDir::new().unwrap();
        let input = write_source(&dir);
        let translator = CannedTranslator::new("1\n00:00:01,000 --> 00:00:02,000\nHello");

        let outcome = translate_file(&translator, &input, "English", Some(&dir.path().join("en")))
            .await
            .unwrap();
        assert_eq!(outcome.output_path, dir.path().join("en.srt"));
        assert!(outcome.output_path.exists());
    }

    #[tokio::test]
    async fn test_drift_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let input = write_source(&dir);
        let translator = CannedTranslator::new("1\n00:00:01,000 --> 00:00:03,000\nHello");

        let outcome = translate_file(&translator, &input, "English", None)
            .await
            .unwrap();
        assert_eq!(outcome.drift.len(), 1);
        assert!(outcome.output_path.exists());
    }

    #[tokio::test]
    async fn test_invalid_translation_saves_raw() {
        let dir = TempDir::new().unwrap();
        let input = write_source(&dir);
        let translator = CannedTranslator::new("I'm sorry, I cannot translate this.");

        let result = translate_file(&translator, &input, "English", None).await;

        assert!(matches!(result, Err(VoxpipeError::InvalidSubtitle(_))));
        assert!(!dir.path().join("lesson.English.srt").exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("lesson.English.srt.raw.txt")).unwrap(),
            "I'm sorry, I cannot translate this."
        );
    }

    #[tokio::test]
    async fn test_missing_input() {
        let translator = CannedTranslator::new("");
        let result =
            translate_file(&translator, Path::new("/nonexistent/lesson.srt"), "English", None)
                .await;
        assert!(matches!(result, Err(VoxpipeError::FileNotFound(_))));
        assert!(translator.languages.lock().unwrap().is_empty());
    }
}

// ============================================================================
// Narration pipeline
// ============================================================================

mod narrate_tests {
    use super::*;

    /// Alternates MIME types between calls.
    struct FlakySynth {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl SpeechSynthesizer for FlakySynth {
        async fn synthesize(&self, _text: &str) -> Result<AudioClip> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            let mime_type = if *calls % 2 == 1 { "audio/L16;rate=24000" } else { "audio/mpeg" };
            Ok(AudioClip {
                data: vec![0, 0],
                mime_type: mime_type.to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn test_mixed_formats_rejected() {
        let dir = TempDir::new().unwrap();
        let synth = FlakySynth {
            calls: Mutex::new(0),
        };
        let cancelled = AtomicBool::new(false);

        let result = narrate(
            &synth,
            "First sentence here. Second sentence here.",
            20,
            &dir.path().join("out.wav"),
            &cancelled,
            false,
        )
        .await;

        assert!(matches!(result, Err(VoxpipeError::Audio(_))));
        assert!(!dir.path().join("out.wav").exists());
    }
}
