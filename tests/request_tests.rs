use booksum::core::models::{Language, ModelProfile, SummaryRequest};
use booksum::core::validation::{INVALID_ISBN_MESSAGE, isbn_error, normalize_isbn};
use booksum::errors::SummaryError;

#[test]
fn test_reference_request_is_accepted() {
    let request = SummaryRequest::parse("978-0061120084", "en", "mistral_latest__300").unwrap();

    assert_eq!(request.isbn(), "9780061120084");
    assert_eq!(request.language(), Language::En);
    assert_eq!(request.model(), ModelProfile::MistralLatest300);
    assert_eq!(request.model().model_name(), "mistral:latest");
}

#[test]
fn test_invalid_isbn_blocks_request() {
    let invalid = ["978-006112008", "ISBN 0061120081", "0-06-112008-1-2", "97800611200844"];

    for raw in invalid {
        let err = SummaryRequest::parse(raw, "en", "mistral_latest__300").unwrap_err();
        assert_eq!(err, SummaryError::ValidationError(INVALID_ISBN_MESSAGE.to_string()));
        assert_eq!(isbn_error(raw).as_deref(), Some(INVALID_ISBN_MESSAGE));
    }
}

#[test]
fn test_valid_lengths_leave_error_slot_empty() {
    for raw in ["0-06-112008-1", "0 06 112008 1", "978 0 06 112008 4"] {
        assert!(normalize_isbn(raw).is_ok(), "should accept {raw:?}");
        assert_eq!(isbn_error(raw), None);
    }
}

#[test]
fn test_every_language_and_model_round_trips_through_its_key() {
    for language in Language::ALL {
        assert_eq!(language.code().parse::<Language>().unwrap(), language);
    }
    for profile in ModelProfile::ALL {
        assert_eq!(profile.key().parse::<ModelProfile>().unwrap(), profile);
        assert!(matches!(profile.output_length(), 300 | 1000));
    }
}

#[test]
fn test_each_request_gets_its_own_correlation_id() {
    let a = SummaryRequest::parse("0061120081", "de", "gemma3n_e2b__1000").unwrap();
    let b = SummaryRequest::parse("0061120081", "de", "gemma3n_e2b__1000").unwrap();
    assert_ne!(a.correlation_id(), b.correlation_id());
}
